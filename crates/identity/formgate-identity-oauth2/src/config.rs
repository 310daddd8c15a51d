//! OAuth2 provider configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the external OAuth2 provider.
///
/// The `user_*_field` entries name the properties of the provider's userinfo
/// response that map to the local identity; the defaults follow OpenID
/// Connect claim names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Config {
    pub authorization_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    /// Redirect URI registered with the provider; the browser returns here
    /// with `code` and `state`.
    pub callback_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub user_id_field: String,
    pub user_email_field: String,
    pub user_name_field: String,
    pub user_avatar_field: String,
    pub http_timeout_seconds: u64,
}

impl Default for OAuth2Config {
    fn default() -> Self {
        Self {
            authorization_url: String::new(),
            token_url: String::new(),
            userinfo_url: String::new(),
            callback_url: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            scope: "openid email profile".to_string(),
            user_id_field: "sub".to_string(),
            user_email_field: "email".to_string(),
            user_name_field: "name".to_string(),
            user_avatar_field: "picture".to_string(),
            http_timeout_seconds: 30,
        }
    }
}

impl OAuth2Config {
    /// True when every endpoint and credential needed to start the flow is
    /// set. An unconfigured provider must be detectable before any redirect
    /// is issued.
    pub fn is_configured(&self) -> bool {
        !self.authorization_url.is_empty()
            && !self.token_url.is_empty()
            && !self.userinfo_url.is_empty()
            && !self.callback_url.is_empty()
            && !self.client_id.is_empty()
    }
}
