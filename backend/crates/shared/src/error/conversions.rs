//! Error conversions - From implementations for client error types
//!
//! Classifies quota API transport failures into [`AppError`].

use super::app_error::AppError;
use super::kind::ErrorKind;

// ============================================================================
// reqwest conversions
// ============================================================================

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return AppError::new(ErrorKind::RequestTimeout, "Quota API timed out").with_source(err);
        }
        if err.is_connect() {
            return AppError::service_unavailable("Quota API unreachable").with_source(err);
        }
        match err.status() {
            Some(status) => {
                AppError::from_status(status.as_u16(), "Quota API request failed").with_source(err)
            }
            None => AppError::internal("Quota API request failed").with_source(err),
        }
    }
}
