//! Prometheus metrics for the notification service.
//!
//! - Operation metrics (created, listed, deleted, errors by kind)
//! - Authorization failures
//! - Target directory lookups

mod helpers;

pub use helpers::{encode_metrics, OperationMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter, IntCounterVec,
    IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "orodha";

lazy_static! {
    // ============================================================================
    // Notification Metrics
    // ============================================================================

    /// Notifications created, by notification type
    pub static ref NOTIFICATIONS_CREATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_notifications_created_total", METRIC_PREFIX),
        "Total notifications created",
        &["notification_type"]
    ).unwrap();

    /// Notifications deleted
    pub static ref NOTIFICATIONS_DELETED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_notifications_deleted_total", METRIC_PREFIX),
        "Total notifications deleted"
    ).unwrap();

    /// Notifications returned by list requests
    pub static ref NOTIFICATIONS_LISTED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_notifications_listed_total", METRIC_PREFIX),
        "Total notifications returned by list requests"
    ).unwrap();

    /// Stored notifications (refreshed on scrape)
    pub static ref NOTIFICATIONS_STORED: IntGauge = register_int_gauge!(
        format!("{}_notifications_stored", METRIC_PREFIX),
        "Number of stored notifications"
    ).unwrap();

    /// Failed operations by operation and error kind
    pub static ref OPERATION_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_operation_errors_total", METRIC_PREFIX),
        "Total failed notification operations",
        &["operation", "kind"]
    ).unwrap();

    // ============================================================================
    // Auth Metrics
    // ============================================================================

    /// Requests rejected by the authorization guard
    pub static ref AUTH_FAILURES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_auth_failures_total", METRIC_PREFIX),
        "Total requests rejected by authorization"
    ).unwrap();

    // ============================================================================
    // Directory Metrics
    // ============================================================================

    /// Target lookups by identity field and outcome (hit, miss, error)
    pub static ref TARGET_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_target_lookups_total", METRIC_PREFIX),
        "Total target directory lookups",
        &["field", "outcome"]
    ).unwrap();
}
