use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

/// Smallest lookback a stats query may ask for.
pub const MIN_SINCE_MIN: i64 = 5;
/// Largest lookback a stats query may ask for (30 days).
pub const MAX_SINCE_MIN: i64 = 60 * 24 * 30;
/// Dashboard deployment default (30 days).
pub const DASHBOARD_DEFAULT_SINCE_MIN: i64 = MAX_SINCE_MIN;
/// Edge deployment default (24 hours).
pub const EDGE_DEFAULT_SINCE_MIN: i64 = 60 * 24;

/// The (site, time range) scope every derived statistic is computed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    pub site: String,
    /// Inclusive lower bound in epoch milliseconds.
    pub since_ts: i64,
    pub since_min: i64,
}

impl Window {
    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.since_ts
    }
}

/// Resolve a raw `sinceMin` query value into a concrete window.
///
/// Absent or non-numeric input takes `default_min`. The result is clamped to
/// `[MIN_SINCE_MIN, MAX_SINCE_MIN]`.
pub fn resolve_window(
    site: &str,
    raw_since_min: Option<&str>,
    default_min: i64,
    now_ms: i64,
) -> Window {
    let since_min = raw_since_min
        .and_then(parse_minutes)
        .unwrap_or(default_min)
        .clamp(MIN_SINCE_MIN, MAX_SINCE_MIN);
    Window {
        site: site.to_string(),
        since_ts: now_ms - since_min * 60_000,
        since_min,
    }
}

fn parse_minutes(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok().filter(|f| f.is_finite())?;
    // Saturating float → int cast; the clamp that follows bounds it anyway.
    Some(f.trunc() as i64)
}

/// Hour bucket key `YYYY-MM-DD HH:00:00` for `ts` in the given timezone.
///
/// Returns an empty key when `ts` is outside chrono's representable range.
pub fn hour_bucket(ts: i64, tz: Tz) -> String {
    match DateTime::from_timestamp_millis(ts) {
        Some(utc) => utc.with_timezone(&tz).format("%Y-%m-%d %H:00:00").to_string(),
        None => String::new(),
    }
}
