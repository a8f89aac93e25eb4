//! Guest Identity and Quota Module
//!
//! Clean Architecture structure:
//! - `domain/` - Fingerprint hashing, quota derivation, countdown math
//! - `application/` - Use cases (fingerprint cache, quota loading, countdown presenter)
//! - `infra/` - Quota API client
//! - `presentation/` - Identity header and guest banner view model
//!
//! ## Identity Model
//! - Unauthenticated visitors are keyed by a best-effort device fingerprint
//! - The fingerprint is generated once per browsing session and cached in session storage
//! - Storage failures never surface: the client degrades to a fresh fingerprint per call
//! - Quota counters are owned by the server; the client only derives remaining figures

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::GuestConfig;
pub use application::countdown::{CompletionCallback, CountdownPresenter};
pub use application::fingerprint_cache::GetFingerprintUseCase;
pub use application::generate_fingerprint::FingerprintGenerator;
pub use application::load_quota::LoadQuotaUseCase;
pub use application::preferences::Preferences;
pub use domain::entities::{CountdownState, CountdownView, GuestQuotaInfo, QuotaState};
pub use domain::services::derive_quota_state;
pub use domain::value_objects::DeviceFingerprint;
pub use error::{GuestError, GuestResult};
pub use infra::quota_api::HttpQuotaSource;
pub use presentation::banner::GuestBanner;

// Re-export kernel error types for unified error handling
pub use kernel::error::{app_error::AppError, kind::ErrorKind};

#[cfg(test)]
mod tests;
