//! Parsers for the unit-suffixed strings wrk prints for latency and transfer.
//!
//! Latency is normalized to milliseconds and transfer rate to kilobytes per
//! second. A value without a recognized suffix is taken as already being in
//! the target unit.

use std::num::ParseFloatError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid number '{value}'")]
pub struct UnitError {
    pub value: String,
    /// `None` when the text parsed but is NaN or infinite.
    pub source: Option<ParseFloatError>,
}

/// Parse a latency like `"1500us"`, `"2ms"` or `"0.5s"` into milliseconds.
pub fn parse_latency(value: &str) -> Result<f64, UnitError> {
    // "us" and "ms" must be checked before the bare "s" suffix
    if let Some(num) = value.strip_suffix("us") {
        return number(value, num).map(|v| v / 1000.0);
    }
    if let Some(num) = value.strip_suffix("ms") {
        return number(value, num);
    }
    if let Some(num) = value.strip_suffix('s') {
        return number(value, num).map(|v| v * 1000.0);
    }
    number(value, value)
}

/// Parse a transfer rate like `"2048B"`, `"3KB"` or `"1MB"` into KB/sec.
pub fn parse_transfer(value: &str) -> Result<f64, UnitError> {
    if let Some(num) = value.strip_suffix("MB") {
        return number(value, num).map(|v| v * 1024.0);
    }
    if let Some(num) = value.strip_suffix("KB") {
        return number(value, num);
    }
    if let Some(num) = value.strip_suffix('B') {
        return number(value, num).map(|v| v / 1024.0);
    }
    number(value, value)
}

/// Parse a plain finite number. `NaN` and `inf` are rejected even though
/// `f64::from_str` accepts them.
pub fn parse_number(value: &str) -> Result<f64, UnitError> {
    number(value, value)
}

fn number(original: &str, num: &str) -> Result<f64, UnitError> {
    let v = num.trim().parse::<f64>().map_err(|source| UnitError {
        value: original.to_string(),
        source: Some(source),
    })?;
    if !v.is_finite() {
        return Err(UnitError {
            value: original.to_string(),
            source: None,
        });
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_latency_units() {
        assert!(close(parse_latency("1500us").unwrap(), 1.5));
        assert!(close(parse_latency("2ms").unwrap(), 2.0));
        assert!(close(parse_latency("0.5s").unwrap(), 500.0));
        assert!(close(parse_latency("100us").unwrap(), 0.1));
        assert!(close(parse_latency("0.001s").unwrap(), 1.0));
    }

    #[test]
    fn test_latency_unitless() {
        assert!(close(parse_latency("12.5").unwrap(), 12.5));
    }

    #[test]
    fn test_transfer_units() {
        assert!(close(parse_transfer("2048B").unwrap(), 2.0));
        assert!(close(parse_transfer("3KB").unwrap(), 3.0));
        assert!(close(parse_transfer("1MB").unwrap(), 1024.0));
        assert!(close(parse_transfer("0.001MB").unwrap(), 1.024));
        assert!(close(parse_transfer("7").unwrap(), 7.0));
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert!(close(parse_transfer("1.5 MB").unwrap(), 1536.0));
        assert!(close(parse_latency(" 3ms").unwrap(), 3.0));
    }

    #[test]
    fn test_invalid_number() {
        let err = parse_latency("fastms").unwrap_err();
        assert_eq!(err.value, "fastms");
        assert!(parse_transfer("").is_err());
        assert!(parse_transfer("KB").is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        for value in ["NaN", "inf", "-inf", "infinity"] {
            let err = parse_number(value).unwrap_err();
            assert_eq!(err.value, value);
            assert_eq!(err.source, None);
        }

        let err = parse_latency("NaNms").unwrap_err();
        assert_eq!(err.value, "NaNms");
        assert!(parse_latency("infs").is_err());
        assert!(parse_transfer("infMB").is_err());
        assert!(close(parse_number(" 42.5 ").unwrap(), 42.5));
    }
}
