use axum::{routing::get, Router};

use crate::server::AppState;

use super::health::health;
use super::metrics::prometheus_metrics;
use super::notifications::{create_notification, delete_notification, list_notifications};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .nest(
            "/api/v1",
            Router::new().route(
                "/notifications",
                get(list_notifications)
                    .post(create_notification)
                    .delete(delete_notification),
            ),
        )
}
