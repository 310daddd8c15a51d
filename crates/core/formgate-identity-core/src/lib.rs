//! Core identity types and seam traits shared by the formgate login crates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Email is required from OAuth2 provider")]
    EmailRequired,

    #[error("User store error: {0}")]
    StoreError(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type IdentityResult<T> = Result<T, IdentityError>;

/// A verified identity returned by an external OAuth2 provider.
///
/// Transient value object: produced once per callback from the provider's
/// userinfo response and consumed by the account resolver, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalIdentity {
    /// Provider-scoped stable subject identifier.
    pub open_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

impl ExternalIdentity {
    /// Display name, falling back to the email address when the provider
    /// supplies none.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.email.as_deref())
    }
}

/// Maps a verified external identity to a local user id, creating the local
/// account if none exists for the identity's email.
#[async_trait]
pub trait AccountResolver: Send + Sync {
    async fn resolve(&self, identity: &ExternalIdentity) -> IdentityResult<String>;
}
