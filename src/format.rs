//! Latency display formatting

const MS_PER_SECOND: u64 = 1000;
const MS_PER_MINUTE: u64 = MS_PER_SECOND * 60;
const MS_PER_HOUR: u64 = MS_PER_MINUTE * 60;
const MS_PER_DAY: u64 = MS_PER_HOUR * 24;

/// A millisecond count decomposed into display components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedDuration {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub millis: u64,
    /// Non-zero components joined in descending order ("1m 30s 500ms");
    /// empty for a zero duration
    pub text: String,
}

/// Decompose a duration in milliseconds into d/h/m/s/ms components
pub fn format_duration(total_ms: u64) -> FormattedDuration {
    let days = total_ms / MS_PER_DAY;
    let mut rest = total_ms % MS_PER_DAY;

    let hours = rest / MS_PER_HOUR;
    rest %= MS_PER_HOUR;

    let minutes = rest / MS_PER_MINUTE;
    rest %= MS_PER_MINUTE;

    let seconds = rest / MS_PER_SECOND;
    let millis = rest % MS_PER_SECOND;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 {
        parts.push(format!("{}s", seconds));
    }
    if millis > 0 {
        parts.push(format!("{}ms", millis));
    }

    FormattedDuration {
        days,
        hours,
        minutes,
        seconds,
        millis,
        text: parts.join(" "),
    }
}
