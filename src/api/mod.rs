//! API layer - HTTP endpoint handlers.

mod health;
mod metrics;
mod notifications;
mod routes;

pub use health::health;
pub use metrics::prometheus_metrics;
pub use notifications::{create_notification, delete_notification, list_notifications};
pub use routes::api_routes;
