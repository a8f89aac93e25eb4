//! Domain Entities
//!
//! Quota counters reported by the server and the state derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Daily goal-creation limit assumed before the server answers
pub const DEFAULT_DAILY_LIMIT: u32 = 3;

/// PDF download limit assumed before the server answers
pub const DEFAULT_PDF_LIMIT: u32 = 1;

fn default_daily_limit() -> u32 {
    DEFAULT_DAILY_LIMIT
}

fn default_pdf_limit() -> u32 {
    DEFAULT_PDF_LIMIT
}

/// Guest usage counters as reported by the quota service
///
/// Read-only on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestQuotaInfo {
    /// Goals created today
    #[serde(default)]
    pub daily_count: u32,
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    #[serde(default)]
    pub pdf_downloads: u32,
    #[serde(default = "default_pdf_limit")]
    pub pdf_limit: u32,
}

impl Default for GuestQuotaInfo {
    fn default() -> Self {
        Self {
            daily_count: 0,
            daily_limit: DEFAULT_DAILY_LIMIT,
            pdf_downloads: 0,
            pdf_limit: DEFAULT_PDF_LIMIT,
        }
    }
}

/// Remaining quota figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaState {
    pub daily_remaining: u32,
    pub pdf_remaining: u32,
    pub daily_exhausted: bool,
    pub pdf_exhausted: bool,
}

impl QuotaState {
    /// Whether any guest action is locked out
    pub fn any_exhausted(&self) -> bool {
        self.daily_exhausted || self.pdf_exhausted
    }
}

/// Remaining time split for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownState {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub total_remaining_ms: i64,
}

impl fmt::Display for CountdownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours > 0 {
            write!(f, "{:02}:", self.hours)?;
        }
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

/// What a countdown currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownView {
    Counting(CountdownState),
    Complete,
}

impl CountdownView {
    /// Text shown once the countdown has finished
    pub const COMPLETE_TEXT: &'static str = "Available now";

    pub fn is_complete(&self) -> bool {
        matches!(self, CountdownView::Complete)
    }

    /// Remaining time, zeroed once complete
    pub fn state(&self) -> CountdownState {
        match self {
            CountdownView::Counting(state) => *state,
            CountdownView::Complete => CountdownState {
                hours: 0,
                minutes: 0,
                seconds: 0,
                total_remaining_ms: 0,
            },
        }
    }
}

impl fmt::Display for CountdownView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountdownView::Counting(state) => fmt::Display::fmt(state, f),
            CountdownView::Complete => f.write_str(Self::COMPLETE_TEXT),
        }
    }
}
