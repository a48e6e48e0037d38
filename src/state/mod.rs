use crate::api::ApiClient;
use crate::models::Website;
use leptos::prelude::*;

#[derive(Clone)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,

    /// Dashboard listing, loaded from the backend.
    pub websites: RwSignal<Vec<Website>>,
    pub websites_loading: RwSignal<bool>,
    pub websites_error: RwSignal<Option<String>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            api_client: RwSignal::new(ApiClient::from_env()),
            websites: RwSignal::new(vec![]),
            websites_loading: RwSignal::new(false),
            websites_error: RwSignal::new(None),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
