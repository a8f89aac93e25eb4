//! Generate Fingerprint Use Case
//!
//! Derives a device fingerprint from environment signals. Nothing here
//! fails outward: each unavailable signal is replaced by a constant.

use std::sync::Arc;

use chrono::Utc;
use platform::canvas::Rgba;
use platform::client::SignalSource;

use crate::application::config::GuestConfig;
use crate::domain::services::{detect_browser_family, rolling_hash};
use crate::domain::value_objects::{
    BROWSER_RULES, CANVAS_ERROR_SENTINEL, DeviceFingerprint, IFRAME_CANVAS_SENTINEL,
    UNKNOWN_SIGNAL,
};

/// Joins the collected signals before hashing
pub const SIGNAL_DELIMITER: &str = "|";

/// Number of trailing data-URL characters kept as the rendering signal
const CANVAS_SIGNAL_LEN: usize = 50;

const CANVAS_TEXT: &str = "GoalTracker guest fingerprint";
const CANVAS_FONT: &str = "14px Arial";

/// Fingerprint generator
pub struct FingerprintGenerator<S>
where
    S: SignalSource,
{
    signals: Arc<S>,
    canvas_size: (u32, u32),
}

impl<S> FingerprintGenerator<S>
where
    S: SignalSource,
{
    pub fn new(signals: Arc<S>, config: &GuestConfig) -> Self {
        Self {
            signals,
            canvas_size: (config.canvas_width, config.canvas_height),
        }
    }

    /// Generate a fingerprint stamped with the current time
    pub fn generate(&self) -> DeviceFingerprint {
        let now_ms = Utc::now().timestamp_millis().max(0) as u64;
        self.generate_at(now_ms)
    }

    /// Generate a fingerprint stamped with `timestamp_ms`
    pub fn generate_at(&self, timestamp_ms: u64) -> DeviceFingerprint {
        let joined = self.collect_signals().join(SIGNAL_DELIMITER);
        let hash = rolling_hash(&joined);
        DeviceFingerprint::from_parts(hash.unsigned_abs(), timestamp_ms)
    }

    /// Signals in hashing order
    pub fn collect_signals(&self) -> Vec<String> {
        let signals = &self.signals;
        let screen = signals.screen().ok();

        vec![
            screen
                .map(|s| format!("{}x{}", s.width, s.height))
                .unwrap_or_else(|| UNKNOWN_SIGNAL.to_string()),
            screen
                .map(|s| s.color_depth)
                .unwrap_or(0)
                .to_string(),
            signals
                .timezone_offset_minutes()
                .unwrap_or(0)
                .to_string(),
            signals
                .language()
                .unwrap_or_else(|| UNKNOWN_SIGNAL.to_string()),
            signals
                .platform()
                .unwrap_or_else(|| UNKNOWN_SIGNAL.to_string()),
            detect_browser_family(&signals.user_agent().unwrap_or_default(), BROWSER_RULES)
                .to_string(),
            self.canvas_signal(),
            signals.hardware_concurrency().unwrap_or(0).to_string(),
        ]
    }

    /// Tail of a fixed drawing's data URL, or a sentinel
    fn canvas_signal(&self) -> String {
        if self.signals.is_embedded() {
            return IFRAME_CANVAS_SENTINEL.to_string();
        }
        match self.render_canvas() {
            Ok(url) => {
                let start = url.len().saturating_sub(CANVAS_SIGNAL_LEN);
                url.get(start..).unwrap_or(&url).to_string()
            }
            Err(e) => {
                tracing::debug!(error = %e, "Canvas signal unavailable");
                CANVAS_ERROR_SENTINEL.to_string()
            }
        }
    }

    fn render_canvas(&self) -> Result<String, platform::client::SignalError> {
        let (width, height) = self.canvas_size;
        let mut surface = self.signals.raster_surface(width, height)?;
        surface.set_font(CANVAS_FONT);
        surface.set_fill(Rgba::rgb(255, 102, 0));
        surface.fill_rect(125, 1, 62, 20)?;
        surface.set_fill(Rgba::rgb(0, 102, 153));
        surface.fill_text(CANVAS_TEXT, 2, 15)?;
        surface.set_fill(Rgba::rgba(102, 204, 0, 0.7));
        surface.fill_text(CANVAS_TEXT, 4, 17)?;
        surface.to_data_url()
    }
}
