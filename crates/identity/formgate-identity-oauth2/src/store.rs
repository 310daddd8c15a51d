//! Ephemeral stash of post-login redirect targets.
//!
//! The web client may record where the browser should land after login,
//! keyed by the same opaque `state` token it sends into the authorization
//! flow. The callback handler reads the stash; entries are not consumed on
//! read and stay visible until their TTL expires.

use crate::error::OAuth2Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Stash key for a login attempt's redirect target.
pub fn redirect_key(state: &str) -> String {
    format!("redirect_uri:{state}")
}

/// Key/value store with per-key expiration.
#[async_trait]
pub trait RedirectStore: Send + Sync {
    /// Store a value under `key` for `ttl_seconds`.
    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> OAuth2Result<()>;

    /// Read a value. Does not consume: repeated reads before expiry observe
    /// the same value.
    async fn get(&self, key: &str) -> OAuth2Result<Option<String>>;

    /// Drop expired entries, returning how many were removed.
    async fn cleanup_expired(&self) -> OAuth2Result<usize>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// In-memory implementation of [`RedirectStore`].
pub struct InMemoryRedirectStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryRedirectStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryRedirectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RedirectStore for InMemoryRedirectStore {
    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> OAuth2Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Utc::now() + Duration::seconds(ttl_seconds as i64),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> OAuth2Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.expires_at > Utc::now())
            .map(|entry| entry.value.clone()))
    }

    async fn cleanup_expired(&self) -> OAuth2Result<usize> {
        let mut entries = self.entries.write().await;
        let now = Utc::now();

        let expired_keys: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            entries.remove(&key);
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_does_not_consume() {
        let store = InMemoryRedirectStore::new();

        store
            .put(&redirect_key("ABC123"), "/projects/42", 300)
            .await
            .unwrap();

        let first = store.get(&redirect_key("ABC123")).await.unwrap();
        let second = store.get(&redirect_key("ABC123")).await.unwrap();

        assert_eq!(first.as_deref(), Some("/projects/42"));
        assert_eq!(second.as_deref(), Some("/projects/42"));
    }

    #[tokio::test]
    async fn test_expired_entry_is_invisible_and_cleaned() {
        let store = InMemoryRedirectStore::new();

        store
            .put(&redirect_key("ABC123"), "/projects/42", 0)
            .await
            .unwrap();

        assert!(store.get(&redirect_key("ABC123")).await.unwrap().is_none());
        assert_eq!(store.cleanup_expired().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_key() {
        let store = InMemoryRedirectStore::new();
        assert!(store.get(&redirect_key("missing")).await.unwrap().is_none());
    }
}
