//! OAuth2 authorization-code login client.
//!
//! Implements the provider-facing half of the social login flow: building
//! the authorization redirect URL, exchanging an authorization code for an
//! access token, fetching and mapping userinfo fields, and composing those
//! steps with account resolution into a single `authenticate_user` call.

mod client;
mod config;
mod error;
mod service;
mod store;

#[cfg(test)]
mod tests;

pub use client::OAuth2Client;
pub use config::OAuth2Config;
pub use error::{OAuth2Error, OAuth2Result};
pub use service::OAuth2Service;
pub use store::{InMemoryRedirectStore, RedirectStore, redirect_key};

// Re-export common types for convenience
pub use formgate_identity_core::{AccountResolver, ExternalIdentity};
