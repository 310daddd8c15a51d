use std::sync::Arc;

use formgate_identity_accounts::{InMemoryUserStore, StoreAccountResolver};
use formgate_identity_oauth2::{InMemoryRedirectStore, OAuth2Client, OAuth2Service};
use formgate_identity_session::JwtSessionIssuer;
use formgate_server::{AppState, ServerConfig, auth_routes};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();

    let client = OAuth2Client::new(config.oauth2.clone())?;
    let user_store = Arc::new(InMemoryUserStore::new());
    let resolver = Arc::new(StoreAccountResolver::new(user_store));

    let state = AppState {
        oauth2: OAuth2Service::new(client, resolver),
        redirects: Arc::new(InMemoryRedirectStore::new()),
        sessions: Arc::new(JwtSessionIssuer::new(config.session.clone())),
    };

    let app = auth_routes(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "formgate login server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
