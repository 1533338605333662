//! Notification domain.
//!
//! - `types`: wire and stored shapes (`Notification`, `Target`, variants)
//! - `registry`: discriminator → variant constructor
//! - `resolver`: completes partially identified targets from the directory
//! - `factory`: turns a create request into an unsaved notification
//! - `service`: the authorized list/delete/create operations

mod error;
mod factory;
mod registry;
mod resolver;
mod service;
mod types;

pub use error::NotificationError;
pub use factory::NotificationFactory;
pub use registry::{VariantConstructor, VariantRegistry, BASE, LIST_INVITE};
pub use resolver::{IdentityField, TargetResolver};
pub use service::NotificationService;
pub use types::{
    CreateNotificationRequest, NewNotification, Notification, NotificationVariant, RawTarget,
    Target,
};
