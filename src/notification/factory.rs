use std::sync::Arc;

use serde_json::Value;

use super::error::NotificationError;
use super::registry::{VariantConstructor, VariantRegistry};
use super::resolver::TargetResolver;
use super::types::{CreateNotificationRequest, NewNotification};

/// Builds unsaved notifications from create requests.
///
/// Side-effect free apart from the directory lookups made by the resolver.
#[derive(Clone)]
pub struct NotificationFactory {
    registry: Arc<VariantRegistry>,
    resolver: TargetResolver,
}

impl NotificationFactory {
    pub fn new(registry: Arc<VariantRegistry>, resolver: TargetResolver) -> Self {
        Self { registry, resolver }
    }

    pub fn registry(&self) -> &VariantRegistry {
        &self.registry
    }

    /// Build from an undecoded JSON payload.
    ///
    /// The discriminator is checked before anything else is decoded, so an
    /// unsupported type is reported even when the rest of the payload is
    /// malformed.
    pub async fn create_from_payload(
        &self,
        payload: Value,
    ) -> Result<NewNotification, NotificationError> {
        let construct = self.registry.lookup_value(payload.get("notification_type"))?;

        let request: CreateNotificationRequest = serde_json::from_value(payload).map_err(|e| {
            NotificationError::Validation(format!("Input payload validation failed: {}", e))
        })?;

        self.build(construct, &request).await
    }

    pub async fn create(
        &self,
        request: &CreateNotificationRequest,
    ) -> Result<NewNotification, NotificationError> {
        // Discriminator first: no lookups for an unknown type.
        let construct = self.registry.lookup(&request.notification_type)?;
        self.build(construct, request).await
    }

    async fn build(
        &self,
        construct: VariantConstructor,
        request: &CreateNotificationRequest,
    ) -> Result<NewNotification, NotificationError> {
        let raw_targets = match request.targets.as_deref() {
            None => {
                return Err(NotificationError::Validation(
                    "'targets' is a required property".to_string(),
                ))
            }
            Some([]) => {
                return Err(NotificationError::Validation(
                    "targets must not be empty".to_string(),
                ))
            }
            Some(targets) => targets,
        };

        let targets = self.resolver.resolve_all(raw_targets).await?;
        let variant = construct(&request.fields)?;

        Ok(NewNotification { targets, variant })
    }
}
