//! Target normalization.

use std::sync::Arc;

use crate::directory::{DirectoryError, TargetDirectory, TargetIdentity};
use crate::metrics::TARGET_LOOKUPS_TOTAL;

use super::error::NotificationError;
use super::types::{RawTarget, Target};

const MISSING_IDENTITY: &str = "Payload.targets must contain at least user_id or external_id";

/// The identity field a lookup is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    UserId,
    ExternalId,
}

impl IdentityField {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityField::UserId => "user_id",
            IdentityField::ExternalId => "external_id",
        }
    }

    async fn lookup(
        self,
        directory: &dyn TargetDirectory,
        id: &str,
    ) -> Result<Option<TargetIdentity>, DirectoryError> {
        match self {
            IdentityField::UserId => directory.lookup_by_user_id(id).await,
            IdentityField::ExternalId => directory.lookup_by_external_id(id).await,
        }
    }
}

/// Turns raw request targets into canonical `Target`s.
///
/// With `strict` set, a target whose missing half cannot be looked up is
/// rejected; otherwise it is kept partially filled.
#[derive(Clone)]
pub struct TargetResolver {
    directory: Arc<dyn TargetDirectory>,
    strict: bool,
}

impl TargetResolver {
    pub fn new(directory: Arc<dyn TargetDirectory>, strict: bool) -> Self {
        Self { directory, strict }
    }

    pub async fn resolve(&self, raw: &RawTarget) -> Result<Target, NotificationError> {
        let (field, id) = match raw.normalized() {
            (Some(user_id), Some(external_id)) => return Ok(Target::new(user_id, external_id)),
            (Some(user_id), None) => (IdentityField::UserId, user_id),
            (None, Some(external_id)) => (IdentityField::ExternalId, external_id),
            (None, None) => {
                return Err(NotificationError::InvalidTarget(MISSING_IDENTITY.to_string()))
            }
        };

        let found = match field.lookup(self.directory.as_ref(), id).await {
            Ok(found) => {
                let outcome = if found.is_some() { "hit" } else { "miss" };
                TARGET_LOOKUPS_TOTAL
                    .with_label_values(&[field.as_str(), outcome])
                    .inc();
                found
            }
            Err(e) => {
                TARGET_LOOKUPS_TOTAL
                    .with_label_values(&[field.as_str(), "error"])
                    .inc();
                tracing::warn!(
                    field = field.as_str(),
                    id = %id,
                    error = %e,
                    "Target lookup failed"
                );
                None
            }
        };

        // The supplied id is authoritative; only the missing half is taken.
        let target = match (field, found) {
            (IdentityField::UserId, Some(identity)) => Target::new(id, identity.external_id),
            (IdentityField::ExternalId, Some(identity)) => Target::new(identity.user_id, id),
            (IdentityField::UserId, None) => Target {
                user_id: Some(id.to_string()),
                external_id: None,
            },
            (IdentityField::ExternalId, None) => Target {
                user_id: None,
                external_id: Some(id.to_string()),
            },
        };

        if self.strict && !target.is_complete() {
            return Err(NotificationError::InvalidTarget(format!(
                "Unable to resolve target with {}: {}",
                field.as_str(),
                id
            )));
        }

        Ok(target)
    }

    /// Resolve every target, keeping input order. Stops at the first failure.
    pub async fn resolve_all(&self, raw: &[RawTarget]) -> Result<Vec<Target>, NotificationError> {
        let mut targets = Vec::with_capacity(raw.len());
        for target in raw {
            targets.push(self.resolve(target).await?);
        }
        Ok(targets)
    }
}
