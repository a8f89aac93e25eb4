//! Guest Error Types
//!
//! This module provides guest-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! None of these are fatal: every caller in this crate degrades to a
//! usable default after logging.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Guest-specific result type alias
pub type GuestResult<T> = Result<T, GuestError>;

/// Guest-specific error variants
#[derive(Debug, Error)]
pub enum GuestError {
    /// Token does not match `fp_<hash>_<timestamp>`
    #[error("Invalid device fingerprint: {0}")]
    InvalidFingerprint(String),

    /// Countdown target could not be parsed as an instant
    #[error("Invalid countdown target: {0}")]
    InvalidCountdownTarget(String),

    /// Quota service refused the request because the guest quota is used up
    #[error("Guest quota exceeded")]
    QuotaExceeded,

    /// Quota service answered with an undecodable body
    #[error("Invalid quota response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    /// Transport or status failure talking to the quota service
    #[error("Quota API error: {0}")]
    Api(#[from] AppError),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GuestError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GuestError::InvalidFingerprint(_) | GuestError::InvalidCountdownTarget(_) => {
                ErrorKind::BadRequest
            }
            GuestError::QuotaExceeded => ErrorKind::TooManyRequests,
            GuestError::InvalidResponse(_) => ErrorKind::InternalServerError,
            GuestError::Api(e) => e.kind(),
            GuestError::Config(_) => ErrorKind::InternalServerError,
        }
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            GuestError::Api(e) if e.is_transient() => {
                tracing::warn!(error = %e, "Quota API temporarily unavailable");
            }
            GuestError::Api(e) if e.kind().is_server_error() => {
                tracing::warn!(error = %e, status = e.status_code(), "Quota API request failed");
            }
            GuestError::Api(e) => {
                tracing::warn!(error = %e, status = e.status_code(), "Quota API rejected the request");
            }
            GuestError::InvalidResponse(e) => {
                tracing::warn!(error = %e, "Quota API returned an undecodable body");
            }
            GuestError::QuotaExceeded => {
                tracing::info!("Guest quota exceeded");
            }
            _ => {
                tracing::debug!(error = %self, "Guest error");
            }
        }
    }
}

impl From<GuestError> for AppError {
    fn from(err: GuestError) -> Self {
        match err {
            GuestError::Api(app) => app,
            GuestError::QuotaExceeded => AppError::too_many_requests("Guest quota exceeded")
                .with_action("Sign up to remove guest limits"),
            other => {
                let kind = other.kind();
                let message = other.to_string();
                AppError::new(kind, message)
            }
        }
    }
}

impl From<reqwest::Error> for GuestError {
    fn from(err: reqwest::Error) -> Self {
        GuestError::Api(AppError::from(err))
    }
}
