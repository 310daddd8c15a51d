//! HTTP client for the external OAuth2 provider.

use crate::config::OAuth2Config;
use crate::error::{OAuth2Error, OAuth2Result};
use formgate_identity_core::ExternalIdentity;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

/// Token endpoint response. Only the access token is consumed; providers
/// differ on which of the remaining fields they return.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Client for the three provider interactions of the authorization-code
/// grant: redirect URL construction, code exchange, and userinfo fetch.
#[derive(Clone)]
pub struct OAuth2Client {
    http_client: Client,
    config: OAuth2Config,
}

impl OAuth2Client {
    pub fn new(config: OAuth2Config) -> OAuth2Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()
            .map_err(|e| OAuth2Error::ConfigError(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &OAuth2Config {
        &self.config
    }

    /// Build the provider authorization URL for the given opaque `state`.
    ///
    /// Pure construction, no I/O. Fails only when the provider endpoints or
    /// credentials are unset.
    pub fn authorization_url(&self, state: &str) -> OAuth2Result<String> {
        if !self.config.is_configured() {
            return Err(OAuth2Error::ConfigError(
                "OAuth2 provider is not configured".to_string(),
            ));
        }

        let mut url = Url::parse(&self.config.authorization_url)?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.callback_url)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scope)
            .append_pair("state", state);

        debug!(%state, "Generated provider authorization URL");

        Ok(url.to_string())
    }

    /// Exchange an authorization code for an access token.
    ///
    /// Transport failures, non-success statuses, and responses without an
    /// access token all collapse to [`OAuth2Error::TokenExchangeFailed`];
    /// the provider's error shape never reaches the caller.
    pub async fn exchange_code(&self, code: &str) -> OAuth2Result<String> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.callback_url.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| OAuth2Error::TokenExchangeFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Token exchange failed: {}", error_text);
            return Err(OAuth2Error::TokenExchangeFailed(format!(
                "provider returned {status}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuth2Error::TokenExchangeFailed(e.to_string()))?;

        match token_response.access_token {
            Some(token) if !token.is_empty() => {
                debug!("Successfully exchanged code for access token");
                Ok(token)
            }
            _ => {
                error!("Token response contained no access token");
                Err(OAuth2Error::TokenExchangeFailed(
                    "no access token in response".to_string(),
                ))
            }
        }
    }

    /// Fetch the provider's userinfo document and map the configured fields
    /// to an [`ExternalIdentity`].
    pub async fn user_info(&self, access_token: &str) -> OAuth2Result<ExternalIdentity> {
        let response = self
            .http_client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OAuth2Error::UserInfoFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Userinfo request failed: {}", error_text);
            return Err(OAuth2Error::UserInfoFailed(format!(
                "provider returned {status}"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OAuth2Error::UserInfoFailed(e.to_string()))?;

        let open_id = string_claim(&body, &self.config.user_id_field).ok_or_else(|| {
            error!(
                field = %self.config.user_id_field,
                "Userinfo response has no usable id field"
            );
            OAuth2Error::UserInfoFailed("missing subject id field".to_string())
        })?;

        debug!(%open_id, "Retrieved user info from provider");

        Ok(ExternalIdentity {
            open_id,
            email: string_claim(&body, &self.config.user_email_field),
            name: string_claim(&body, &self.config.user_name_field),
            avatar: string_claim(&body, &self.config.user_avatar_field),
        })
    }
}

/// Read a non-empty string claim from a userinfo document.
fn string_claim(body: &serde_json::Value, field: &str) -> Option<String> {
    body.get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
}
