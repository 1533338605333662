use thiserror::Error;

use crate::error::AppError;

/// Failures while turning a request payload into a notification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotificationError {
    /// A target carried no usable identity (or could not be completed in strict mode)
    #[error("{0}")]
    InvalidTarget(String),

    /// Unregistered discriminator
    #[error("{0}")]
    NotificationType(String),

    /// Missing or malformed payload / variant field
    #[error("{0}")]
    Validation(String),
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::InvalidTarget(msg) | NotificationError::Validation(msg) => {
                AppError::BadRequest(msg)
            }
            NotificationError::NotificationType(msg) => AppError::NotificationType(msg),
        }
    }
}
