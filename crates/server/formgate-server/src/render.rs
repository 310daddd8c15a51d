//! Minimal server-side page rendering.
//!
//! Both pages are HTML shells that hand a JSON payload to the browser
//! bundle: the `index` page carries `{rendererData: {error}}` and the
//! `social-login` page carries `{redirectUri}`. The transitional
//! social-login page exists so the browser applies the freshly set session
//! cookie before navigating to the final target.

use axum::response::Html;
use serde_json::json;

/// Error code shown for every login failure, regardless of cause.
pub const UNABLE_CONNECT_OAUTH2: &str = "UNABLE_CONNECT_OAUTH2";

fn render(page: &str, payload: &serde_json::Value) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>formgate</title></head>\n\
         <body data-page=\"{page}\">\n<script>window.__PAGE_DATA__ = {payload};</script>\n\
         </body>\n</html>\n"
    ))
}

/// The generic connection-error page. Served with HTTP 200; causes are
/// distinguished in server logs only.
pub fn error_page() -> Html<String> {
    render(
        "index",
        &json!({ "rendererData": { "error": UNABLE_CONNECT_OAUTH2 } }),
    )
}

/// Transitional page rendered after a successful callback.
pub fn social_login_page(redirect_uri: &str) -> Html<String> {
    render("social-login", &json!({ "redirectUri": redirect_uri }))
}
