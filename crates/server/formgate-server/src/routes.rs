//! Flow controller: the two OAuth2 login entry points.
//!
//! Both handlers collapse every failure to the same generic error page. The
//! original error is logged server-side; the browser never sees a raw status
//! code or error shape.

use crate::render;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use formgate_identity_oauth2::{OAuth2Error, OAuth2Service, RedirectStore, redirect_key};
use formgate_identity_session::{SessionCredential, SessionError, SessionIssuer};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub oauth2: OAuth2Service,
    pub redirects: Arc<dyn RedirectStore>,
    pub sessions: Arc<dyn SessionIssuer>,
}

/// Build the login-flow router.
pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/auth/oauth2", get(authorize))
        .route("/auth/oauth2/callback", get(callback))
        .with_state(state)
}

#[derive(Debug, Error)]
enum FlowError {
    #[error("Missing code or state parameter")]
    MissingParams,

    #[error(transparent)]
    OAuth2(#[from] OAuth2Error),

    #[error(transparent)]
    Session(#[from] SessionError),
}

// ── Authorize ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct AuthorizeParams {
    state: Option<String>,
}

/// `GET /auth/oauth2?state=<opaque>` — redirect the browser to the provider.
async fn authorize(
    State(app): State<AppState>,
    Query(params): Query<AuthorizeParams>,
) -> Response {
    let Some(state) = params.state.filter(|s| !s.is_empty()) else {
        return render::error_page().into_response();
    };

    match app.oauth2.authorization_url(&state) {
        Ok(url) if !url.is_empty() => found_redirect(&url),
        Ok(_) => render::error_page().into_response(),
        Err(err) => {
            error!(error = %err, "Failed to build authorization URL");
            render::error_page().into_response()
        }
    }
}

/// 302 Found, as browsers expect for the provider hop.
fn found_redirect(url: &str) -> Response {
    match HeaderValue::from_str(url) {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(err) => {
            error!(error = %err, "Authorization URL is not a valid header value");
            render::error_page().into_response()
        }
    }
}

// ── Callback ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
}

/// `GET /auth/oauth2/callback?code=<string>&state=<opaque>` — complete the
/// login and render the transitional page.
async fn callback(State(app): State<AppState>, Query(params): Query<CallbackParams>) -> Response {
    match complete_login(&app, params).await {
        Ok((credential, redirect_uri)) => {
            social_login_response(&credential, &redirect_uri)
        }
        Err(err) => {
            error!(error = %err, "OAuth2 callback failed");
            render::error_page().into_response()
        }
    }
}

/// The callback sequence: authenticate, read the stashed redirect target,
/// issue the session, compute the final redirect path. Session issuance is
/// the last fallible step; no session exists if anything before it fails.
async fn complete_login(
    app: &AppState,
    params: CallbackParams,
) -> Result<(SessionCredential, String), FlowError> {
    let code = params.code.filter(|c| !c.is_empty());
    let state = params.state.filter(|s| !s.is_empty());

    let (code, state) = match (code, state) {
        (Some(code), Some(state)) => (code, state),
        _ => return Err(FlowError::MissingParams),
    };

    let user_id = app.oauth2.authenticate_user(&code).await?;

    let stashed = app.redirects.get(&redirect_key(&state)).await?;

    let credential = app.sessions.login(&user_id, &state).await?;

    let redirect_uri = match stashed {
        Some(target) if !target.is_empty() => {
            let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
            format!("/?redirect_uri={encoded}")
        }
        _ => "/".to_string(),
    };

    info!(%user_id, browser_id = %state, "OAuth2 login completed");

    Ok((credential, redirect_uri))
}

fn social_login_response(credential: &SessionCredential, redirect_uri: &str) -> Response {
    let mut response = render::social_login_page(redirect_uri).into_response();

    match HeaderValue::from_str(&credential.header_value()) {
        Ok(cookie) => {
            response.headers_mut().append(header::SET_COOKIE, cookie);
            response
        }
        Err(err) => {
            error!(error = %err, "Session cookie is not a valid header value");
            render::error_page().into_response()
        }
    }
}
