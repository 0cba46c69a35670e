//! Number formatting for report tables.

/// Placeholder shown for missing or suppressed values.
pub const MISSING: &str = "-";

/// Format a request rate for the raw results table (e.g., "1234.50").
pub fn format_rate(value: f64) -> String {
    format!("{:.2}", value)
}

/// Format a normalized latency in milliseconds with autoscaling.
/// - < 1ms: "XXXus" (e.g., "420us")
/// - 1ms - 999ms: "X.XXms" (e.g., "1.25ms")
/// - >= 1s: "X.XXs" (e.g., "1.20s")
pub fn format_latency_ms(ms: f64) -> String {
    if ms < 1.0 {
        format!("{:.0}us", ms * 1_000.0)
    } else if ms < 1_000.0 {
        format!("{:.2}ms", ms)
    } else {
        format!("{:.2}s", ms / 1_000.0)
    }
}

/// Format a relative delta in percent with an explicit sign, or the
/// placeholder when the delta could not be computed.
pub fn format_delta(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:+.1}", v),
        None => MISSING.to_string(),
    }
}
