//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use crate::error::AppError;

use super::{
    NOTIFICATIONS_CREATED_TOTAL, NOTIFICATIONS_DELETED_TOTAL, NOTIFICATIONS_LISTED_TOTAL,
    OPERATION_ERRORS_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording notification operation metrics
pub struct OperationMetrics;

impl OperationMetrics {
    pub fn record_created(notification_type: &str) {
        NOTIFICATIONS_CREATED_TOTAL
            .with_label_values(&[notification_type])
            .inc();
    }

    pub fn record_listed(count: usize) {
        NOTIFICATIONS_LISTED_TOTAL.inc_by(count as u64);
    }

    pub fn record_deleted() {
        NOTIFICATIONS_DELETED_TOTAL.inc();
    }

    pub fn record_error(operation: &str, error: &AppError) {
        OPERATION_ERRORS_TOTAL
            .with_label_values(&[operation, error.kind()])
            .inc();
    }
}
