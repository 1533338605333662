use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recipient of a notification, in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Service-side user id
    pub user_id: Option<String>,
    /// Identity provider id
    pub external_id: Option<String>,
}

impl Target {
    pub fn new(user_id: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            external_id: Some(external_id.into()),
        }
    }

    pub fn has_identity(&self) -> bool {
        self.user_id.is_some() || self.external_id.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.user_id.is_some() && self.external_id.is_some()
    }
}

/// A target exactly as it arrived in a create request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTarget {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, alias = "keycloak_id")]
    pub external_id: Option<String>,
}

impl RawTarget {
    /// Blank values count as missing.
    pub fn normalized(&self) -> (Option<&str>, Option<&str>) {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }

        (present(&self.user_id), present(&self.external_id))
    }
}

/// Closed set of notification schemas.
///
/// Persisted and serialized with the `notification_type` tag next to the
/// shared fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notification_type", rename_all = "kebab-case")]
pub enum NotificationVariant {
    Base,
    ListInvite { list_id: String },
}

impl NotificationVariant {
    pub fn discriminator(&self) -> &'static str {
        match self {
            NotificationVariant::Base => "base",
            NotificationVariant::ListInvite { .. } => "list-invite",
        }
    }

    pub fn list_id(&self) -> Option<&str> {
        match self {
            NotificationVariant::ListInvite { list_id } => Some(list_id),
            NotificationVariant::Base => None,
        }
    }
}

/// A notification that has been built but not stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub targets: Vec<Target>,
    pub variant: NotificationVariant,
}

impl NewNotification {
    /// Document-level schema check, run by stores before writing.
    pub fn validate(&self) -> Result<(), String> {
        if self.targets.is_empty() {
            return Err("targets must not be empty".to_string());
        }

        if let Some(position) = self.targets.iter().position(|t| !t.has_identity()) {
            return Err(format!(
                "targets[{}] must contain at least user_id or external_id",
                position
            ));
        }

        if let NotificationVariant::ListInvite { list_id } = &self.variant {
            if list_id.trim().is_empty() {
                return Err("list_id is required".to_string());
            }
        }

        Ok(())
    }

    pub fn into_stored(self, id: String, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id,
            targets: self.targets,
            last_accessed: None,
            created_at,
            variant: self.variant,
        }
    }
}

/// A persisted notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub targets: Vec<Target>,
    pub last_accessed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn notification_type(&self) -> &'static str {
        self.variant.discriminator()
    }

    pub fn is_addressed_to(&self, user_id: &str) -> bool {
        self.targets
            .iter()
            .any(|t| t.user_id.as_deref() == Some(user_id))
    }
}

/// Body of a create request.
///
/// Everything besides `targets` and `notification_type` lands in
/// `fields` and is interpreted by the variant constructor.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotificationRequest {
    #[serde(default)]
    pub targets: Option<Vec<RawTarget>>,
    pub notification_type: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_variant_tagging() {
        let value = serde_json::to_value(NotificationVariant::ListInvite {
            list_id: "L1".to_string(),
        })
        .unwrap();
        assert_eq!(value, json!({"notification_type": "list-invite", "list_id": "L1"}));

        let base: NotificationVariant =
            serde_json::from_value(json!({"notification_type": "base"})).unwrap();
        assert_eq!(base, NotificationVariant::Base);
    }

    #[test]
    fn test_notification_serializes_flat() {
        let notification = NewNotification {
            targets: vec![Target::new("u1", "k1")],
            variant: NotificationVariant::ListInvite {
                list_id: "L1".to_string(),
            },
        }
        .into_stored("n-1".to_string(), Utc::now());

        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["id"], "n-1");
        assert_eq!(value["notification_type"], "list-invite");
        assert_eq!(value["list_id"], "L1");
        assert_eq!(value["targets"][0], json!({"user_id": "u1", "external_id": "k1"}));
        assert!(value["last_accessed"].is_null());
    }

    #[test]
    fn test_create_request_fields_and_alias() {
        let request: CreateNotificationRequest = serde_json::from_value(json!({
            "targets": [{"keycloak_id": "k1"}],
            "notification_type": "list-invite",
            "list_id": "L1"
        }))
        .unwrap();

        assert_eq!(request.notification_type, "list-invite");
        let targets = request.targets.unwrap();
        assert_eq!(targets[0].external_id.as_deref(), Some("k1"));
        assert_eq!(request.fields.get("list_id"), Some(&json!("L1")));
        assert!(!request.fields.contains_key("targets"));
        assert!(!request.fields.contains_key("notification_type"));
    }

    #[test]
    fn test_raw_target_blank_values_are_missing() {
        let raw = RawTarget {
            user_id: Some("  ".to_string()),
            external_id: Some("k1".to_string()),
        };
        assert_eq!(raw.normalized(), (None, Some("k1")));
    }

    #[test]
    fn test_new_notification_validation() {
        let mut notification = NewNotification {
            targets: vec![],
            variant: NotificationVariant::Base,
        };
        assert!(notification.validate().is_err());

        notification.targets.push(Target {
            user_id: None,
            external_id: None,
        });
        assert!(notification.validate().unwrap_err().contains("targets[0]"));

        notification.targets[0].user_id = Some("u1".to_string());
        assert!(notification.validate().is_ok());

        notification.variant = NotificationVariant::ListInvite {
            list_id: String::new(),
        };
        assert!(notification.validate().is_err());
    }
}
