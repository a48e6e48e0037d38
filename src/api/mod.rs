use crate::models::{Page, Website};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Network,
    Http,
    Parse,
    NotFound,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn not_found(body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::NotFound,
            message: format!("{ctx}: {}", detail_of(&body)),
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {}", detail_of(&body)),
        }
    }
}

/// FastAPI-style `{"detail": "..."}` bodies are reduced to the detail text.
fn detail_of(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let default_api_url = "http://localhost:8000".to_string();

        // `window.ENV.API_URL`, with `window.ENV.api_url` still honored.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    for key in ["API_URL", "api_url"] {
                        if let Ok(api_url) = js_sys::Reflect::get(&env, &key.into()) {
                            if let Some(url_str) = api_url.as_string() {
                                return Self {
                                    api_url: url_str.trim_end_matches('/').to_string(),
                                };
                            }
                        }
                    }
                }
            }
        }

        Self {
            api_url: default_api_url,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct GenerateRequest {
    pub description: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct GenerateResponse {
    pub website_id: String,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub homepage: Option<Page>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EditRequest {
    pub page_name: String,
    pub edit_instruction: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EditResponse {
    #[serde(default)]
    pub success: bool,
    pub updated_page: Option<Page>,
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }

    pub fn from_env() -> Self {
        Self::new(EnvConfig::new().api_url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn website_path(website_id: &str) -> String {
        format!("/api/website/{}", urlencoding::encode(website_id))
    }

    async fn request_api<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl serde::Serialize>,
        ctx: &str,
    ) -> ApiResult<T> {
        let client = reqwest::Client::new();
        let mut req = client.request(method.clone(), self.url(path));

        if let Some(b) = body {
            req = req.json(b);
        }

        log::debug!("{method} {path}");
        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            res.json().await.map_err(ApiError::parse)
        } else if res.status() == reqwest::StatusCode::NOT_FOUND {
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::not_found(body, ctx))
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            log::warn!("{method} {path} failed with {status}");
            Err(ApiError::http(status, body, ctx))
        }
    }

    /// `POST /api/generate-website`
    pub async fn generate_website(&self, description: &str) -> ApiResult<GenerateResponse> {
        let res: GenerateResponse = self
            .request_api(
                reqwest::Method::POST,
                "/api/generate-website",
                Some(&GenerateRequest {
                    description: description.to_string(),
                }),
                "Failed to generate website",
            )
            .await?;
        Ok(GenerateResponse {
            pages: res.pages.into_iter().map(Page::normalized).collect(),
            homepage: res.homepage.map(Page::normalized),
            ..res
        })
    }

    /// `GET /api/website/{id}`. A 404 maps to [`ApiErrorKind::NotFound`].
    pub async fn get_website(&self, website_id: &str) -> ApiResult<Website> {
        let data: serde_json::Value = self
            .request_api(
                reqwest::Method::GET,
                &Self::website_path(website_id),
                None::<&()>,
                "Failed to fetch website",
            )
            .await?;
        Self::parse_website_response(data)
    }

    /// `GET /api/websites`
    pub async fn list_websites(&self) -> ApiResult<Vec<Website>> {
        let data: serde_json::Value = self
            .request_api(
                reqwest::Method::GET,
                "/api/websites",
                None::<&()>,
                "Failed to load websites",
            )
            .await?;
        Ok(Self::parse_website_list_response(data))
    }

    /// `POST /api/website/{id}/edit`. Returns the updated page.
    pub async fn edit_page(
        &self,
        website_id: &str,
        page_name: &str,
        instruction: &str,
    ) -> ApiResult<Page> {
        let res: EditResponse = self
            .request_api(
                reqwest::Method::POST,
                &format!("{}/edit", Self::website_path(website_id)),
                Some(&EditRequest {
                    page_name: page_name.to_string(),
                    edit_instruction: instruction.to_string(),
                }),
                "Failed to edit website",
            )
            .await?;
        Self::parse_edit_response(res)
    }

    /// Accepts both `{"website": {...}}` and the bare website object.
    pub(crate) fn parse_website_response(data: serde_json::Value) -> ApiResult<Website> {
        let data = match data.get("website") {
            Some(inner) if inner.is_object() => inner.clone(),
            _ => data,
        };
        serde_json::from_value::<Website>(data)
            .map(Website::normalized)
            .map_err(ApiError::parse)
    }

    /// Entries that do not look like a website are skipped.
    pub(crate) fn parse_website_list_response(data: serde_json::Value) -> Vec<Website> {
        let list = data
            .get("websites")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let mut out: Vec<Website> = Vec::with_capacity(list.len());
        for item in list {
            match serde_json::from_value::<Website>(item) {
                Ok(w) if !w.id.trim().is_empty() => out.push(w),
                Ok(_) => {}
                Err(e) => log::warn!("skipping website entry: {e}"),
            }
        }
        out
    }

    pub(crate) fn parse_edit_response(res: EditResponse) -> ApiResult<Page> {
        match res.updated_page {
            Some(page) if res.success => Ok(page.normalized()),
            _ => Err(ApiError::parse("AI did not return an updated page")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_response_contract_deserialize() {
        let json = r#"{
            "website_id": "3f1c",
            "pages": [{"name": "Home", "slug": "home", "html": "<html></html>", "description": "Landing"}],
            "homepage": {"name": "Home", "slug": "home", "html": "<html></html>", "description": "Landing"}
        }"#;
        let parsed: GenerateResponse =
            serde_json::from_str(json).expect("generate response should parse");
        assert_eq!(parsed.website_id, "3f1c");
        assert_eq!(parsed.pages.len(), 1);
        assert_eq!(parsed.homepage.map(|p| p.name).as_deref(), Some("Home"));
    }

    #[test]
    fn test_generate_response_without_pages() {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"website_id": "x", "homepage": null}"#)
                .expect("should parse");
        assert!(parsed.pages.is_empty());
        assert!(parsed.homepage.is_none());
    }

    #[test]
    fn test_edit_request_serialization() {
        let v = serde_json::to_value(EditRequest {
            page_name: "About".to_string(),
            edit_instruction: "Make the heading blue".to_string(),
        })
        .expect("should serialize");
        assert_eq!(v["page_name"], "About");
        assert_eq!(v["edit_instruction"], "Make the heading blue");
    }

    #[test]
    fn test_edit_response_requires_success_and_page() {
        let ok: EditResponse = serde_json::from_str(
            r#"{"success": true, "updated_page": {"name": "About", "slug": "about", "html": "<p>x</p>"}}"#,
        )
        .expect("should parse");
        let page = ApiClient::parse_edit_response(ok).expect("page");
        assert_eq!(page.name, "About");
        assert!(page.html.starts_with("<html>"));

        let failed: EditResponse =
            serde_json::from_str(r#"{"success": false, "updated_page": null}"#).expect("parse");
        let err = ApiClient::parse_edit_response(failed).expect_err("should fail");
        assert_eq!(err.kind, ApiErrorKind::Parse);
    }

    #[test]
    fn test_parse_website_response_wrapped_and_bare() {
        let bare = serde_json::json!({
            "id": "w1",
            "name": "Bakery",
            "pages": [{"name": "Home", "slug": "home", "html": "<h1>Hi</h1>"}],
            "created_at": "2024-01-01T00:00:00"
        });
        let wrapped = serde_json::json!({ "website": bare.clone() });

        let a = ApiClient::parse_website_response(bare).expect("bare");
        let b = ApiClient::parse_website_response(wrapped).expect("wrapped");
        assert_eq!(a, b);
        assert_eq!(a.name.as_deref(), Some("Bakery"));
        assert_eq!(
            a.pages[0].html,
            "<html><head></head><body><h1>Hi</h1></body></html>"
        );
    }

    #[test]
    fn test_parse_website_response_rejects_garbage() {
        let err = ApiClient::parse_website_response(serde_json::json!({"nope": 1}))
            .expect_err("should fail");
        assert_eq!(err.kind, ApiErrorKind::Parse);
    }

    #[test]
    fn test_parse_website_list_skips_invalid_entries() {
        let data = serde_json::json!({
            "websites": [
                {"id": "w1", "pages": []},
                {"pages": []},
                {"id": "  ", "pages": []},
                {"id": "w2", "description": "Shop", "pages": []}
            ]
        });
        let sites = ApiClient::parse_website_list_response(data);
        let ids: Vec<&str> = sites.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["w1", "w2"]);
        assert!(ApiClient::parse_website_list_response(serde_json::json!({})).is_empty());
    }

    #[test]
    fn test_website_path_is_encoded() {
        assert_eq!(ApiClient::website_path("a b/c"), "/api/website/a%20b%2Fc");
    }

    #[test]
    fn test_http_error_uses_detail() {
        let e = ApiError::http(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail": "AI failed"}"#.to_string(),
            "Failed to edit website",
        );
        assert_eq!(e.kind, ApiErrorKind::Http);
        assert_eq!(
            e.to_string(),
            "Failed to edit website (500 Internal Server Error): AI failed"
        );
    }

    #[test]
    fn test_not_found_error() {
        let e = ApiError::not_found(
            r#"{"detail": "Website not found"}"#.to_string(),
            "Failed to fetch website",
        );
        assert_eq!(e.kind, ApiErrorKind::NotFound);
        assert_eq!(e.to_string(), "Failed to fetch website: Website not found");
    }

    #[test]
    fn test_api_client_new() {
        let client = ApiClient::new("http://localhost:8000".to_string());
        assert_eq!(client.url("/api/websites"), "http://localhost:8000/api/websites");
    }
}
