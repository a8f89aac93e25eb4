//! Application Configuration
//!
//! Configuration for the guest identity and quota layer.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{GuestError, GuestResult};

/// Guest application configuration
#[derive(Debug, Clone)]
pub struct GuestConfig {
    /// Session-scoped storage key of the cached fingerprint
    pub fingerprint_storage_key: String,
    /// Persistent-scoped storage key of locale/currency preferences
    pub preferences_storage_key: String,
    /// Request header carrying the fingerprint to the quota API
    pub fingerprint_header: String,
    /// Quota API base URL
    pub api_base_url: String,
    /// Quota API request timeout
    pub request_timeout: Duration,
    /// Countdown refresh cadence
    pub countdown_tick: Duration,
    /// File backing the persistent storage scope
    pub preferences_path: PathBuf,
    /// Rendering-entropy surface size
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Default for GuestConfig {
    fn default() -> Self {
        Self {
            fingerprint_storage_key: "guest_fingerprint".to_string(),
            preferences_storage_key: "user_preferences".to_string(),
            fingerprint_header: "X-Device-Fingerprint".to_string(),
            api_base_url: "http://localhost:31113/api".to_string(),
            request_timeout: Duration::from_secs(10),
            countdown_tick: Duration::from_secs(1),
            preferences_path: PathBuf::from(".guest/storage.json"),
            canvas_width: 200,
            canvas_height: 50,
        }
    }
}

impl GuestConfig {
    /// Load overrides from `GUEST_*` environment variables
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> GuestResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var("GUEST_API_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(path) = env::var("GUEST_STORAGE_PATH") {
            config.preferences_path = PathBuf::from(path);
        }
        if let Ok(header) = env::var("GUEST_FINGERPRINT_HEADER") {
            config.fingerprint_header = header;
        }
        if let Ok(ms) = env::var("GUEST_TICK_MS") {
            config.countdown_tick = Duration::from_millis(parse_positive("GUEST_TICK_MS", &ms)?);
        }
        if let Ok(secs) = env::var("GUEST_TIMEOUT_SECS") {
            config.request_timeout =
                Duration::from_secs(parse_positive("GUEST_TIMEOUT_SECS", &secs)?);
        }

        Ok(config)
    }

    /// Endpoint returning the guest usage counters
    pub fn quota_endpoint(&self) -> String {
        format!("{}/guest/quota", self.api_base_url.trim_end_matches('/'))
    }
}

fn parse_positive(name: &str, value: &str) -> GuestResult<u64> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(GuestError::Config(format!("{name} must be positive"))),
        Ok(n) => Ok(n),
        Err(e) => Err(GuestError::Config(format!("{name}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_endpoint_joins_cleanly() {
        let config = GuestConfig {
            api_base_url: "https://goals.example/api/".to_string(),
            ..GuestConfig::default()
        };
        assert_eq!(config.quota_endpoint(), "https://goals.example/api/guest/quota");
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive("X", " 250 ").unwrap(), 250);
        assert!(matches!(parse_positive("X", "0"), Err(GuestError::Config(_))));
        assert!(matches!(parse_positive("X", "-1"), Err(GuestError::Config(_))));
    }
}
