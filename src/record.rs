//! Typed benchmark records.
//!
//! Raw CSV rows are converted into [`BenchmarkRecord`] immediately after
//! loading so that every later stage works on typed fields.

use crate::error::ReportError;
use crate::loader::RawRow;
use crate::units::{parse_latency, parse_number, parse_transfer};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, ParseError, Utc};
use serde::Serialize;

/// Offset used for every displayed time in the report (UTC+8).
pub const DISPLAY_OFFSET_SECS: i32 = 8 * 3600;

/// Format used for every displayed time in the report.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Suffix carried by every endpoint name in the results file.
pub const ENDPOINT_SUFFIX: &str = ".php";

/// A single measurement for one server/endpoint pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRecord {
    pub timestamp: String,
    pub server: String,
    pub endpoint: String,
    pub requests_sec: f64,
    /// Average latency.
    pub latency_ms: f64,
    pub latency_p50_ms: Option<f64>,
    pub latency_p75_ms: Option<f64>,
    pub latency_p90_ms: Option<f64>,
    pub latency_p99_ms: Option<f64>,
    pub transfer_kb_sec: f64,
    // verbatim strings for the raw results table
    pub latency_avg: String,
    pub latency_p50: String,
    pub latency_p75: String,
    pub latency_p90: String,
    pub latency_p99: String,
    pub transfer_sec: String,
}

impl BenchmarkRecord {
    /// Normalize one raw row. `row` is the 1-based data row number used in
    /// error messages.
    pub fn from_raw(row: usize, raw: &RawRow) -> Result<Self, ReportError> {
        let required = |column: &'static str| -> Result<&str, ReportError> {
            raw.get(column)
                .map(String::as_str)
                .ok_or(ReportError::MissingColumn { row, column })
        };
        let optional = |column: &str| raw.get(column).cloned().unwrap_or_default();

        let requests = required("requests_sec")?;
        let requests_sec = parse_number(requests).map_err(|e| ReportError::InvalidNumber {
            row,
            field: "requests_sec",
            value: e.value,
        })?;

        let latency_avg = required("latency_avg")?.to_string();
        let latency_ms = latency(row, "latency_avg", &latency_avg)?;

        let transfer_sec = raw
            .get("transfer_sec")
            .cloned()
            .unwrap_or_else(|| "0".to_string());
        let transfer_kb_sec =
            parse_transfer(&transfer_sec).map_err(|e| ReportError::InvalidNumber {
                row,
                field: "transfer_sec",
                value: e.value,
            })?;

        let latency_p50 = optional("latency_p50");
        let latency_p75 = optional("latency_p75");
        let latency_p90 = optional("latency_p90");
        let latency_p99 = optional("latency_p99");

        Ok(Self {
            timestamp: display_timestamp(required("timestamp")?),
            server: required("server")?.to_string(),
            endpoint: required("endpoint")?.to_string(),
            requests_sec,
            latency_ms,
            latency_p50_ms: percentile(row, "latency_p50", &latency_p50)?,
            latency_p75_ms: percentile(row, "latency_p75", &latency_p75)?,
            latency_p90_ms: percentile(row, "latency_p90", &latency_p90)?,
            latency_p99_ms: percentile(row, "latency_p99", &latency_p99)?,
            transfer_kb_sec,
            latency_avg,
            latency_p50,
            latency_p75,
            latency_p90,
            latency_p99,
            transfer_sec,
        })
    }

    /// Whether any latency percentile is present.
    pub fn has_percentiles(&self) -> bool {
        self.latency_p50_ms.is_some()
            || self.latency_p75_ms.is_some()
            || self.latency_p90_ms.is_some()
            || self.latency_p99_ms.is_some()
    }
}

fn latency(row: usize, field: &'static str, value: &str) -> Result<f64, ReportError> {
    parse_latency(value).map_err(|e| ReportError::InvalidNumber {
        row,
        field,
        value: e.value,
    })
}

/// An empty cell means the percentile was not measured.
fn percentile(row: usize, field: &'static str, value: &str) -> Result<Option<f64>, ReportError> {
    if value.is_empty() {
        return Ok(None);
    }
    latency(row, field, value).map(Some)
}

/// Normalize every raw row, failing on the first malformed one.
pub fn normalize(rows: &[RawRow]) -> Result<Vec<BenchmarkRecord>, ReportError> {
    rows.iter()
        .enumerate()
        .map(|(i, raw)| BenchmarkRecord::from_raw(i + 1, raw))
        .collect()
}

/// Render a results timestamp in UTC+8, falling back to the raw string when
/// it cannot be parsed.
pub fn display_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Ok(dt) => to_display(dt),
        Err(e) => {
            tracing::debug!("keeping raw timestamp '{}': {}", raw, e);
            raw.to_string()
        }
    }
}

/// Format an instant as the report's UTC+8 display string.
pub fn to_display<Tz: chrono::TimeZone>(dt: DateTime<Tz>) -> String {
    dt.with_timezone(&display_offset())
        .format(DISPLAY_FORMAT)
        .to_string()
}

/// The report's display offset, UTC+8.
pub fn display_offset() -> FixedOffset {
    FixedOffset::east_opt(DISPLAY_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Parse an ISO-8601 timestamp. A trailing `Z` means UTC; a timestamp
/// without an offset is taken to be UTC as well.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ParseError> {
    let s = raw.trim();
    let s = match s.strip_suffix('Z') {
        Some(rest) => format!("{rest}+00:00"),
        None => s.to_string(),
    };

    let mut last_err = None;

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        match DateTime::parse_from_str(&s, fmt) {
            Ok(dt) => return Ok(dt.with_timezone(&Utc)),
            Err(e) => last_err = Some(e),
        }
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        match NaiveDateTime::parse_from_str(&s, fmt) {
            Ok(naive) => return Ok(naive.and_utc()),
            Err(e) => last_err = Some(e),
        }
    }

    match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        Ok(date) => Ok(date.and_time(chrono::NaiveTime::MIN).and_utc()),
        Err(e) => Err(last_err.unwrap_or(e)),
    }
}

/// Endpoint name without the `.php` suffix, used as chart labels.
pub fn endpoint_label(endpoint: &str) -> &str {
    endpoint.strip_suffix(ENDPOINT_SUFFIX).unwrap_or(endpoint)
}

/// Endpoint name for tables and notices, e.g. `CPU`, `I/O`, `JSON`.
pub fn endpoint_display(endpoint: &str) -> String {
    match EndpointKind::from_endpoint(endpoint) {
        EndpointKind::Io => "I/O".to_string(),
        _ => endpoint_label(endpoint).to_uppercase(),
    }
}

/// The workload class an endpoint exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Cpu,
    Io,
    Json,
    Other,
}

impl EndpointKind {
    pub fn from_endpoint(endpoint: &str) -> Self {
        match endpoint_label(endpoint).to_ascii_lowercase().as_str() {
            "cpu" => EndpointKind::Cpu,
            "io" => EndpointKind::Io,
            "json" => EndpointKind::Json,
            _ => EndpointKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointKind::Cpu => "cpu",
            EndpointKind::Io => "io",
            EndpointKind::Json => "json",
            EndpointKind::Other => "other",
        }
    }
}
