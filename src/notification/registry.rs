//! Discriminator → variant constructor table.
//!
//! Keys are kebab-case and matched exactly (case-sensitive, no trimming).

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::error::NotificationError;
use super::types::NotificationVariant;

/// Builds a variant from the payload fields that are not shared by all
/// notifications.
pub type VariantConstructor = fn(&Map<String, Value>) -> Result<NotificationVariant, NotificationError>;

pub const BASE: &str = "base";
pub const LIST_INVITE: &str = "list-invite";

/// Immutable after construction; shared read-only across requests.
pub struct VariantRegistry {
    constructors: HashMap<&'static str, VariantConstructor>,
}

impl Default for VariantRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl VariantRegistry {
    /// The registry with every known variant.
    pub fn builtin() -> Self {
        let mut constructors: HashMap<&'static str, VariantConstructor> = HashMap::new();
        constructors.insert(BASE, build_base);
        constructors.insert(LIST_INVITE, build_list_invite);

        Self { constructors }
    }

    pub fn lookup(&self, discriminator: &str) -> Result<VariantConstructor, NotificationError> {
        self.constructors.get(discriminator).copied().ok_or_else(|| {
            NotificationError::NotificationType(format!(
                "notification_type: {} is not supported.",
                discriminator
            ))
        })
    }

    /// Look up the raw `notification_type` value of a payload.
    ///
    /// A missing, null or non-string value is an unsupported type, not a
    /// malformed payload.
    pub fn lookup_value(
        &self,
        discriminator: Option<&Value>,
    ) -> Result<VariantConstructor, NotificationError> {
        match discriminator {
            Some(Value::String(key)) => self.lookup(key),
            other => Err(NotificationError::NotificationType(format!(
                "notification_type: {} is not supported.",
                other.unwrap_or(&Value::Null)
            ))),
        }
    }

    pub fn contains(&self, discriminator: &str) -> bool {
        self.constructors.contains_key(discriminator)
    }

    /// Registered discriminators, sorted.
    pub fn discriminators(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.constructors.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

fn build_base(fields: &Map<String, Value>) -> Result<NotificationVariant, NotificationError> {
    reject_undeclared(fields, &[], BASE)?;
    Ok(NotificationVariant::Base)
}

fn build_list_invite(fields: &Map<String, Value>) -> Result<NotificationVariant, NotificationError> {
    reject_undeclared(fields, &["list_id"], LIST_INVITE)?;
    let list_id = required_string(fields, "list_id", LIST_INVITE)?;
    Ok(NotificationVariant::ListInvite { list_id })
}

fn reject_undeclared(
    fields: &Map<String, Value>,
    declared: &[&str],
    discriminator: &str,
) -> Result<(), NotificationError> {
    // null values are treated as "not sent"
    let undeclared = fields
        .iter()
        .find(|(key, value)| !value.is_null() && !declared.contains(&key.as_str()));

    match undeclared {
        Some((key, _)) => Err(NotificationError::Validation(format!(
            "field {} is not allowed for notification_type {}",
            key, discriminator
        ))),
        None => Ok(()),
    }
}

fn required_string(
    fields: &Map<String, Value>,
    name: &str,
    discriminator: &str,
) -> Result<String, NotificationError> {
    match fields.get(name) {
        None | Some(Value::Null) => Err(NotificationError::Validation(format!(
            "{} is required for notification_type {}",
            name, discriminator
        ))),
        Some(Value::String(s)) if s.trim().is_empty() => Err(NotificationError::Validation(
            format!("{} must not be empty", name),
        )),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(NotificationError::Validation(format!(
            "{} must be a string",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_builtin_discriminators() {
        let registry = VariantRegistry::builtin();
        assert_eq!(registry.discriminators(), vec!["base", "list-invite"]);
        assert!(registry.contains("base"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = VariantRegistry::builtin();

        for key in ["List-Invite", "BASE", " base", "list_invite", ""] {
            let err = registry.lookup(key).unwrap_err();
            assert_eq!(
                err,
                NotificationError::NotificationType(format!(
                    "notification_type: {} is not supported.",
                    key
                ))
            );
        }
    }

    #[test]
    fn test_lookup_value_rejects_non_strings() {
        let registry = VariantRegistry::builtin();

        assert!(registry.lookup_value(Some(&json!("list-invite"))).is_ok());

        let cases = [
            (None, "notification_type: null is not supported."),
            (Some(json!(null)), "notification_type: null is not supported."),
            (Some(json!(7)), "notification_type: 7 is not supported."),
            (Some(json!(["base"])), "notification_type: [\"base\"] is not supported."),
        ];

        for (value, expected) in cases {
            assert_eq!(
                registry.lookup_value(value.as_ref()).unwrap_err(),
                NotificationError::NotificationType(expected.to_string())
            );
        }
    }

    #[test]
    fn test_build_list_invite() {
        let registry = VariantRegistry::builtin();
        let construct = registry.lookup("list-invite").unwrap();

        let variant = construct(&fields(json!({"list_id": "L1"}))).unwrap();
        assert_eq!(
            variant,
            NotificationVariant::ListInvite {
                list_id: "L1".to_string()
            }
        );
    }

    #[test]
    fn test_list_invite_requires_list_id() {
        let construct = VariantRegistry::builtin().lookup("list-invite").unwrap();

        for payload in [json!({}), json!({"list_id": null}), json!({"list_id": ""}), json!({"list_id": 7})] {
            assert!(matches!(
                construct(&fields(payload)),
                Err(NotificationError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_base_rejects_variant_fields() {
        let construct = VariantRegistry::builtin().lookup("base").unwrap();

        assert_eq!(construct(&Map::new()).unwrap(), NotificationVariant::Base);
        assert_eq!(
            construct(&fields(json!({"list_id": null}))).unwrap(),
            NotificationVariant::Base
        );
        assert!(matches!(
            construct(&fields(json!({"list_id": "L1"}))),
            Err(NotificationError::Validation(msg)) if msg.contains("list_id")
        ));
    }
}
