//! Session issuance with JWT token generation and validation.
//!
//! The login flow hands a resolved local user id and the browser's opaque
//! correlation token to a [`SessionIssuer`] and gets back an explicit cookie
//! directive. The HTTP layer applies the directive to the response; nothing
//! here touches a response object.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid session")]
    InvalidSession,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
    /// Opaque per-browser token supplied by the client; reused as the OAuth2
    /// `state` parameter during login.
    pub browser_id: String,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub jwt_secret: String,
    pub session_ttl: Duration,
    pub cookie_name: String,
    pub secure_cookies: bool,
    pub algorithm: Algorithm,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            session_ttl: Duration::hours(24),
            cookie_name: "formgate_session".to_string(),
            secure_cookies: false,
            algorithm: Algorithm::HS256,
        }
    }
}

/// Cookie directive carrying a freshly issued session token.
#[derive(Debug, Clone)]
pub struct SessionCredential {
    pub name: String,
    pub value: String,
    pub max_age_seconds: i64,
    pub secure: bool,
}

impl SessionCredential {
    /// Render as a `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.name, self.value, self.max_age_seconds
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Establishes an authenticated session for a resolved local user.
#[async_trait]
pub trait SessionIssuer: Send + Sync {
    async fn login(&self, user_id: &str, browser_id: &str)
    -> Result<SessionCredential, SessionError>;
}

/// JWT-backed [`SessionIssuer`].
pub struct JwtSessionIssuer {
    config: SessionConfig,
}

impl JwtSessionIssuer {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Decode and validate a previously issued session token.
    pub fn verify(&self, token: &str) -> Result<JwtClaims, SessionError> {
        let token_data = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::new(self.config.algorithm),
        )?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl SessionIssuer for JwtSessionIssuer {
    async fn login(
        &self,
        user_id: &str,
        browser_id: &str,
    ) -> Result<SessionCredential, SessionError> {
        let now = Utc::now();
        let exp = now + self.config.session_ttl;

        let claims = JwtClaims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            browser_id: browser_id.to_string(),
        };

        let token = encode(
            &Header::new(self.config.algorithm),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )?;

        Ok(SessionCredential {
            name: self.config.cookie_name.clone(),
            value: token,
            max_age_seconds: self.config.session_ttl.num_seconds(),
            secure: self.config.secure_cookies,
        })
    }
}
