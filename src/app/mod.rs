use crate::pages::{DashboardPage, GeneratorPage, Navbar, ProjectPage};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(AppState::new()));

    view! {
        <Router>
            <Navbar />
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("") view=GeneratorPage />
                <Route path=path!("dashboard") view=DashboardPage />
                <Route path=path!("project/:id") view=ProjectPage />
            </Routes>
        </Router>
    }
}
