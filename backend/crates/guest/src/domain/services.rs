//! Domain Services
//!
//! Pure domain logic: fingerprint hashing, browser detection, quota
//! derivation and countdown arithmetic.

use chrono::{DateTime, Days, NaiveTime, Utc};

use crate::domain::entities::{CountdownState, CountdownView, GuestQuotaInfo, QuotaState};
use crate::domain::value_objects::{BrowserFamily, BrowserRule};

const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_SECOND: i64 = 1_000;

/// 32-bit polynomial rolling hash over UTF-16 code units
///
/// `hash = ((hash << 5) - hash) + code`, truncated to a signed 32-bit
/// integer after every step.
pub fn rolling_hash(input: &str) -> i32 {
    input.encode_utf16().fold(0i32, |hash, code| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(code))
    })
}

/// Match a user agent against ordered rules, first match wins
pub fn detect_browser_family(user_agent: &str, rules: &[BrowserRule]) -> BrowserFamily {
    rules
        .iter()
        .find(|rule| user_agent.contains(rule.pattern))
        .map(|rule| rule.family)
        .unwrap_or(BrowserFamily::Other)
}

/// Derive remaining quota from server counters
///
/// `None` means the counters have not loaded yet; default limits with zero
/// usage are assumed. Remaining figures never go below zero.
pub fn derive_quota_state(info: Option<&GuestQuotaInfo>) -> QuotaState {
    let info = info.copied().unwrap_or_default();
    let daily_remaining = info.daily_limit.saturating_sub(info.daily_count);
    let pdf_remaining = info.pdf_limit.saturating_sub(info.pdf_downloads);
    QuotaState {
        daily_remaining,
        pdf_remaining,
        daily_exhausted: daily_remaining == 0,
        pdf_exhausted: pdf_remaining == 0,
    }
}

/// Split a remaining duration into a countdown view
///
/// Non-positive durations collapse to [`CountdownView::Complete`].
pub fn countdown_view(remaining_ms: i64) -> CountdownView {
    if remaining_ms <= 0 {
        return CountdownView::Complete;
    }
    CountdownView::Counting(CountdownState {
        hours: (remaining_ms / MS_PER_HOUR) as u64,
        minutes: ((remaining_ms % MS_PER_HOUR) / MS_PER_MINUTE) as u64,
        seconds: ((remaining_ms % MS_PER_MINUTE) / MS_PER_SECOND) as u64,
        total_remaining_ms: remaining_ms,
    })
}

/// Next instant the daily guest counters reset (UTC midnight)
pub fn next_daily_reset(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .checked_add_days(Days::new(1))
        .map(|day| day.and_time(NaiveTime::MIN).and_utc())
        .unwrap_or(now)
}
