//! Identity provider boundary.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Verifier misconfigured: {0}")]
    Misconfigured(String),

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// What the identity provider reports for a token.
///
/// `id` may legitimately be absent; the caller decides what that means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub id: Option<String>,
    pub username: Option<String>,
}

/// Maps a bearer token to an identity, or fails.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError>;
}
