//! Guest banner view model
//!
//! What the guest banner and limit popup show, derived from the quota state
//! and, while locked out, the reset countdown.

use derive_more::Display;
use serde::Serialize;

use crate::domain::entities::{CountdownView, QuotaState};

/// Shown whenever a guest limit applies
pub const SIGN_UP_CTA: &str = "Sign up to remove guest limits";

/// Banner status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BannerStatus {
    #[display("available")]
    Available,
    #[display("daily_limit_reached")]
    DailyLimitReached,
    #[display("pdf_limit_reached")]
    PdfLimitReached,
}

/// Guest banner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestBanner {
    pub status: BannerStatus,
    pub headline: String,
    /// Reset countdown text, only while locked out
    pub detail: Option<String>,
    pub call_to_action: &'static str,
    pub daily_remaining: u32,
    pub pdf_remaining: u32,
}

impl GuestBanner {
    pub fn build(state: &QuotaState, countdown: Option<&CountdownView>) -> Self {
        let status = if !state.any_exhausted() {
            BannerStatus::Available
        } else if state.daily_exhausted {
            BannerStatus::DailyLimitReached
        } else {
            BannerStatus::PdfLimitReached
        };

        let headline = match status {
            BannerStatus::Available => format!(
                "{} left today, {} left",
                plural(state.daily_remaining, "free goal", "free goals"),
                plural(state.pdf_remaining, "PDF download", "PDF downloads"),
            ),
            BannerStatus::DailyLimitReached => "You've used all free goals for today".to_string(),
            BannerStatus::PdfLimitReached => "You've used your free PDF download".to_string(),
        };

        let detail = match (status, countdown) {
            (BannerStatus::Available, _) | (_, None) => None,
            (_, Some(view)) if view.is_complete() => Some(view.to_string()),
            (_, Some(view)) => Some(format!("Resets in {view}")),
        };

        Self {
            status,
            headline,
            detail,
            call_to_action: SIGN_UP_CTA,
            daily_remaining: state.daily_remaining,
            pdf_remaining: state.pdf_remaining,
        }
    }

    pub fn is_locked_out(&self) -> bool {
        self.status != BannerStatus::Available
    }
}

fn plural(count: u32, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}
