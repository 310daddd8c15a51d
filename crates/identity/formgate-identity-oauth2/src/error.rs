//! OAuth2 error types.

use formgate_identity_core::IdentityError;
use thiserror::Error;

pub type OAuth2Result<T> = Result<T, OAuth2Error>;

#[derive(Debug, Error)]
pub enum OAuth2Error {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("OAuth2 token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("Failed to fetch user information: {0}")]
    UserInfoFailed(String),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Identity error: {0}")]
    IdentityError(#[from] IdentityError),
}
