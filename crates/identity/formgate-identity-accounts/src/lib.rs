//! Local user accounts with find-or-create resolution by email.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use formgate_identity_core::{AccountResolver, ExternalIdentity, IdentityError, IdentityResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Persisted local account entity, keyed by `id` with a unique `email`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Attributes for a not-yet-persisted account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub email_verified: bool,
}

/// Backing store for local user accounts.
///
/// Implementations must enforce email uniqueness on `create` and report a
/// violation as [`StoreError::DuplicateEmail`] so the resolver can recover
/// from concurrent creation.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<LocalUser>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<LocalUser>, StoreError>;

    /// Insert a new user and return its generated id.
    async fn create(&self, user: NewUser) -> Result<String, StoreError>;
}

/// In-memory implementation of [`UserStore`].
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, LocalUser>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<LocalUser>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<LocalUser>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<String, StoreError> {
        let mut users = self.users.write().await;

        // Uniqueness check and insert under one write lock.
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail(user.email));
        }

        let id = Uuid::new_v4().to_string();
        users.insert(
            id.clone(),
            LocalUser {
                id: id.clone(),
                name: user.name,
                email: user.email,
                avatar: user.avatar,
                email_verified: user.email_verified,
                created_at: Utc::now(),
            },
        );

        Ok(id)
    }
}

/// Resolves an external identity to a local user id, creating the account on
/// first login.
///
/// Repeat logins return the stored id unchanged; profile fields are not
/// refreshed from the provider after first creation.
pub struct StoreAccountResolver {
    store: Arc<dyn UserStore>,
}

impl StoreAccountResolver {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    fn store_error(err: StoreError) -> IdentityError {
        IdentityError::StoreError(err.to_string())
    }
}

#[async_trait]
impl AccountResolver for StoreAccountResolver {
    async fn resolve(&self, identity: &ExternalIdentity) -> IdentityResult<String> {
        let email = identity
            .email
            .as_deref()
            .ok_or(IdentityError::EmailRequired)?;

        if let Some(user) = self
            .store
            .find_by_email(email)
            .await
            .map_err(Self::store_error)?
        {
            return Ok(user.id);
        }

        let new_user = NewUser {
            name: identity.display_name().unwrap_or(email).to_string(),
            email: email.to_string(),
            avatar: identity.avatar.clone(),
            email_verified: true,
        };

        let id = match self.store.create(new_user).await {
            Ok(id) => id,
            Err(StoreError::DuplicateEmail(_)) => {
                // A concurrent callback with the same email won the insert;
                // its record is authoritative.
                let user = self
                    .store
                    .find_by_email(email)
                    .await
                    .map_err(Self::store_error)?
                    .ok_or_else(|| IdentityError::UserNotFound(email.to_string()))?;
                return Ok(user.id);
            }
            Err(err) => return Err(Self::store_error(err)),
        };

        // Re-read the created record by id before handing the id out.
        let user = self
            .store
            .find_by_id(&id)
            .await
            .map_err(Self::store_error)?
            .ok_or_else(|| IdentityError::UserNotFound(id.clone()))?;

        info!(user_id = %user.id, "Created local account for first OAuth2 login");

        Ok(user.id)
    }
}
