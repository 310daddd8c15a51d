//! Composition of the provider client with account resolution.

use crate::client::OAuth2Client;
use crate::error::{OAuth2Error, OAuth2Result};
use formgate_identity_core::{AccountResolver, IdentityError};
use std::sync::Arc;
use tracing::info;

/// Front door for the login flow: one call takes an authorization code to a
/// local user id, or fails with a single classified error.
#[derive(Clone)]
pub struct OAuth2Service {
    client: OAuth2Client,
    resolver: Arc<dyn AccountResolver>,
}

impl OAuth2Service {
    pub fn new(client: OAuth2Client, resolver: Arc<dyn AccountResolver>) -> Self {
        Self { client, resolver }
    }

    /// Build the provider authorization URL for the given `state`.
    pub fn authorization_url(&self, state: &str) -> OAuth2Result<String> {
        self.client.authorization_url(state)
    }

    /// Run the post-callback half of the flow: exchange the code, fetch the
    /// profile, and resolve it to a local account.
    ///
    /// An identity without an email is rejected before any account lookup.
    pub async fn authenticate_user(&self, code: &str) -> OAuth2Result<String> {
        let access_token = self.client.exchange_code(code).await?;

        let identity = self.client.user_info(&access_token).await?;

        if identity.email.as_deref().is_none_or(|e| e.is_empty()) {
            return Err(OAuth2Error::IdentityError(IdentityError::EmailRequired));
        }

        let user_id = self.resolver.resolve(&identity).await?;

        info!(%user_id, open_id = %identity.open_id, "OAuth2 login resolved to local account");

        Ok(user_id)
    }
}
