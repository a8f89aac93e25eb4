//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of vocabulary shared by the
//! guest client crates:
//! - Common error type and its classification
//! - Error classification for responses coming back from the quota API
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all crates.

pub mod error {
    pub mod app_error;
    #[cfg(feature = "reqwest")]
    pub mod conversions;
    pub mod kind;
}
