use crate::types::SearchResult;

pub const FALLBACK_DESCRIPTION: &str = "Visual match found";
pub const NO_RESULTS_MESSAGE: &str = "No relevant moments found.";

/// Format seconds as MM:SS of the wall-clock time that many seconds after midnight.
///
/// Hours are dropped, so `3725.0` renders as `02:05`. Fractional milliseconds are truncated.
pub fn format_timestamp(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "--:--".to_string();
    }
    let millis = (seconds * 1000.0).floor() as i64;
    let within_hour = millis.div_euclid(1000).rem_euclid(3600);
    format!("{:02}:{:02}", within_hour / 60, within_hour % 60)
}

/// Whole seconds, rounding halves up (`-2.5` becomes `-2`).
pub fn round_seconds(seconds: f64) -> i64 {
    let whole = seconds.floor();
    // `seconds - whole` is exact, unlike `seconds + 0.5`.
    if seconds - whole >= 0.5 {
        whole as i64 + 1
    } else {
        whole as i64
    }
}

pub fn format_score(score: f64) -> String {
    format!("{:.3}", score)
}

pub fn description_or_fallback(result: &SearchResult) -> &str {
    match result.description.as_deref() {
        Some(text) if !text.is_empty() => text,
        _ => FALLBACK_DESCRIPTION,
    }
}

/// `00:05 (5s)`
pub fn format_time_label(result: &SearchResult) -> String {
    format!(
        "{} ({}s)",
        format_timestamp(result.timestamp),
        round_seconds(result.timestamp)
    )
}
