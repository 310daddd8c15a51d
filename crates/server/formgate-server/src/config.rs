//! Environment-driven server configuration.

use chrono::Duration;
use formgate_identity_oauth2::OAuth2Config;
use formgate_identity_session::SessionConfig;
use std::env;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub oauth2: OAuth2Config,
    pub session: SessionConfig,
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl ServerConfig {
    /// Assemble configuration from process environment variables. Unset
    /// provider variables leave the OAuth2 config unconfigured, which the
    /// flow surfaces as the generic connection-error page.
    pub fn from_env() -> Self {
        let defaults = OAuth2Config::default();

        let oauth2 = OAuth2Config {
            authorization_url: env_or("OAUTH2_AUTHORIZATION_URL", ""),
            token_url: env_or("OAUTH2_TOKEN_URL", ""),
            userinfo_url: env_or("OAUTH2_USERINFO_URL", ""),
            callback_url: env_or("OAUTH2_CALLBACK_URL", ""),
            client_id: env_or("OAUTH2_CLIENT_ID", ""),
            client_secret: env_or("OAUTH2_CLIENT_SECRET", ""),
            scope: env_or("OAUTH2_SCOPE", &defaults.scope),
            user_id_field: env_or("OAUTH2_USER_ID_FIELD", &defaults.user_id_field),
            user_email_field: env_or("OAUTH2_USER_EMAIL_FIELD", &defaults.user_email_field),
            user_name_field: env_or("OAUTH2_USER_NAME_FIELD", &defaults.user_name_field),
            user_avatar_field: env_or("OAUTH2_USER_AVATAR_FIELD", &defaults.user_avatar_field),
            http_timeout_seconds: defaults.http_timeout_seconds,
        };

        let session_defaults = SessionConfig::default();
        let ttl_hours = env_or("SESSION_TTL_HOURS", "24")
            .parse::<i64>()
            .unwrap_or(24);

        let session = SessionConfig {
            jwt_secret: env_or("SESSION_JWT_SECRET", &session_defaults.jwt_secret),
            session_ttl: Duration::hours(ttl_hours),
            cookie_name: env_or("SESSION_COOKIE_NAME", &session_defaults.cookie_name),
            secure_cookies: env_or("SECURE_COOKIES", "false") == "true",
            algorithm: session_defaults.algorithm,
        };

        Self {
            listen_addr: env_or("FORMGATE_LISTEN_ADDR", "0.0.0.0:8080"),
            oauth2,
            session,
        }
    }
}
