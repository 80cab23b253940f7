//! Identity port - verification of opaque bearer credentials.
//!
//! Token issuance belongs to the external identity service; the core only
//! ever turns a credential into a verified principal.

use async_trait::async_trait;
use uuid::Uuid;

/// The verified caller behind a bearer credential.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: Option<String>,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify a raw bearer token and return the principal it names.
    async fn verify(&self, token: &str) -> Result<Principal, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,
}
