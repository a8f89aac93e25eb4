//! Application Layer - Use cases

pub mod config;
pub mod countdown;
pub mod fingerprint_cache;
pub mod generate_fingerprint;
pub mod load_quota;
pub mod preferences;
