//! Client environment signals
//!
//! Common access to the characteristics of the environment an
//! unauthenticated client runs in. Every signal is individually fallible so
//! that callers can substitute a constant when one is unavailable.

use chrono::Local;
use thiserror::Error;

use crate::canvas::{RasterSurface, SoftwareCanvas};

/// Screen characteristics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenInfo {
    pub width: u32,
    pub height: u32,
    pub color_depth: u32,
}

impl ScreenInfo {
    pub fn new(width: u32, height: u32, color_depth: u32) -> Self {
        Self {
            width,
            height,
            color_depth,
        }
    }

    /// Parse `"<width>x<height>"`, with an optional `"x<depth>"` suffix
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().split('x');
        let width = parts.next()?.trim().parse().ok()?;
        let height = parts.next()?.trim().parse().ok()?;
        let color_depth = match parts.next() {
            Some(depth) => depth.trim().parse().ok()?,
            None => 24,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(width, height, color_depth))
    }
}

/// Error when reading an environment signal
#[derive(Debug, Clone, Error)]
pub enum SignalError {
    #[error("Signal unavailable: {0}")]
    Unavailable(&'static str),

    #[error("Raster surface error: {0}")]
    Raster(String),
}

/// Source of environment signals
pub trait SignalSource: Send + Sync {
    fn screen(&self) -> Result<ScreenInfo, SignalError>;

    /// Minutes to add to local time to get UTC (positive west of UTC)
    fn timezone_offset_minutes(&self) -> Result<i32, SignalError>;

    fn language(&self) -> Option<String>;

    fn platform(&self) -> Option<String>;

    fn user_agent(&self) -> Option<String>;

    /// Whether we run inside a nested/embedded context
    fn is_embedded(&self) -> bool;

    fn raster_surface(&self, width: u32, height: u32)
    -> Result<Box<dyn RasterSurface>, SignalError>;

    fn hardware_concurrency(&self) -> Option<u32>;
}

/// Signals read from the host process
///
/// Screen geometry has no host equivalent and must be supplied
/// explicitly; everything else is detected.
#[derive(Debug, Clone, Default)]
pub struct HostSignals {
    screen: Option<ScreenInfo>,
    user_agent: Option<String>,
    language: Option<String>,
    embedded: bool,
}

impl HostSignals {
    /// Detect language from the POSIX locale variables
    pub fn detect() -> Self {
        let language = ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find_map(|value| locale_to_language_tag(&value));
        Self {
            language,
            ..Self::default()
        }
    }

    pub fn with_screen(mut self, screen: ScreenInfo) -> Self {
        self.screen = Some(screen);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn embedded(mut self, embedded: bool) -> Self {
        self.embedded = embedded;
        self
    }
}

impl SignalSource for HostSignals {
    fn screen(&self) -> Result<ScreenInfo, SignalError> {
        self.screen.ok_or(SignalError::Unavailable("screen"))
    }

    fn timezone_offset_minutes(&self) -> Result<i32, SignalError> {
        Ok(-Local::now().offset().local_minus_utc() / 60)
    }

    fn language(&self) -> Option<String> {
        self.language.clone()
    }

    fn platform(&self) -> Option<String> {
        Some(format!(
            "{} {}",
            std::env::consts::OS,
            std::env::consts::ARCH
        ))
    }

    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }

    fn is_embedded(&self) -> bool {
        self.embedded
    }

    fn raster_surface(
        &self,
        width: u32,
        height: u32,
    ) -> Result<Box<dyn RasterSurface>, SignalError> {
        Ok(Box::new(SoftwareCanvas::new(width, height)?))
    }

    fn hardware_concurrency(&self) -> Option<u32> {
        std::thread::available_parallelism()
            .ok()
            .map(|n| u32::try_from(n.get()).unwrap_or(u32::MAX))
    }
}

/// Convert a POSIX locale (`en_US.UTF-8`) to a language tag (`en-US`)
///
/// Returns `None` for the `C`/`POSIX` locales and empty values.
pub fn locale_to_language_tag(locale: &str) -> Option<String> {
    let base = locale.split(['.', '@']).next()?.trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}
