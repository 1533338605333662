use std::sync::Arc;

use crate::error::AppError;
use crate::metrics::AUTH_FAILURES_TOTAL;

use super::IdentityVerifier;

/// The verified caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub id: String,
}

/// Gatekeeper run before every notification operation.
///
/// A verifier failure and a verified identity without an id are the same
/// outcome here: `AppError::Forbidden` with one fixed message.
#[derive(Clone)]
pub struct AuthorizationGuard {
    verifier: Arc<dyn IdentityVerifier>,
}

impl AuthorizationGuard {
    pub fn new(verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { verifier }
    }

    pub async fn authorize(&self, token: &str) -> Result<CallerIdentity, AppError> {
        let id = match self.verifier.verify(token).await {
            Ok(identity) => identity.id.filter(|id| !id.trim().is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Token verification failed");
                None
            }
        };

        match id {
            Some(id) => Ok(CallerIdentity { id }),
            None => {
                AUTH_FAILURES_TOTAL.inc();
                Err(AppError::forbidden())
            }
        }
    }
}
