//! Domain Value Objects
//!
//! Immutable value types for the guest identity domain.

use std::fmt;
use std::str::FromStr;

use platform::encoding::to_base36;
use serde::{Deserialize, Serialize};

use crate::error::GuestError;

/// Prefix of every device fingerprint token
pub const FINGERPRINT_PREFIX: &str = "fp_";

/// Substituted for a text signal that is absent
pub const UNKNOWN_SIGNAL: &str = "unknown";

/// Rendering signal used inside embedded contexts, where rendering is skipped
pub const IFRAME_CANVAS_SENTINEL: &str = "iframe-canvas";

/// Rendering signal used when rendering fails
pub const CANVAS_ERROR_SENTINEL: &str = "canvas-error";

/// Device fingerprint - `fp_<hash base36>_<timestamp base36>`
///
/// Best-effort anonymous identity. Not a security boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceFingerprint(String);

impl DeviceFingerprint {
    /// Build from the hash magnitude and the generation timestamp
    pub fn from_parts(hash_magnitude: u32, timestamp_ms: u64) -> Self {
        Self(format!(
            "{}{}_{}",
            FINGERPRINT_PREFIX,
            to_base36(u64::from(hash_magnitude)),
            to_base36(timestamp_ms)
        ))
    }

    /// Parse and validate a token against `fp_[0-9a-z]+_[0-9a-z]+`
    pub fn parse(s: &str) -> Result<Self, GuestError> {
        let invalid = || GuestError::InvalidFingerprint(s.to_string());
        let rest = s.strip_prefix(FINGERPRINT_PREFIX).ok_or_else(invalid)?;
        let (hash, timestamp) = rest.split_once('_').ok_or_else(invalid)?;
        let is_token = |t: &str| {
            !t.is_empty()
                && t
                    .bytes()
                    .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
        };
        if !is_token(hash) || !is_token(timestamp) {
            return Err(invalid());
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base-36 hash component
    pub fn hash_token(&self) -> &str {
        self.parts().0
    }

    /// Base-36 timestamp component
    pub fn timestamp_token(&self) -> &str {
        self.parts().1
    }

    fn parts(&self) -> (&str, &str) {
        self.0[FINGERPRINT_PREFIX.len()..]
            .split_once('_')
            .unwrap_or_default()
    }
}

impl fmt::Display for DeviceFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceFingerprint {
    type Err = GuestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DeviceFingerprint {
    type Error = GuestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DeviceFingerprint> for String {
    fn from(fp: DeviceFingerprint) -> Self {
        fp.0
    }
}

/// Coarse browser family derived from the user agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum BrowserFamily {
    #[display("Chrome")]
    Chrome,
    #[display("Firefox")]
    Firefox,
    #[display("Safari")]
    Safari,
    #[display("Edge")]
    Edge,
    #[display("Other")]
    Other,
}

/// A user-agent substring and the family it selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserRule {
    pub pattern: &'static str,
    pub family: BrowserFamily,
}

impl BrowserRule {
    pub const fn new(pattern: &'static str, family: BrowserFamily) -> Self {
        Self { pattern, family }
    }
}

/// Detection rules in priority order, first match wins.
///
/// Edge user agents also contain `Chrome`, so they report as Chrome.
pub const BROWSER_RULES: &[BrowserRule] = &[
    BrowserRule::new("Chrome", BrowserFamily::Chrome),
    BrowserRule::new("Firefox", BrowserFamily::Firefox),
    BrowserRule::new("Safari", BrowserFamily::Safari),
    BrowserRule::new("Edge", BrowserFamily::Edge),
];
