//! Results discovery and CSV loading.
//!
//! Each benchmark run writes `results.csv` into its own directory under the
//! results root. Directory names encode the run's start time, so the newest
//! run sorts last lexicographically.

use crate::error::ReportError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the results file inside each run directory.
pub const RESULTS_FILE: &str = "results.csv";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// One CSV record keyed by header name.
pub type RawRow = BTreeMap<String, String>;

/// Text encodings tried, in order, when reading a results file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8 without a byte-order mark.
    Utf8,
    /// UTF-8 with a leading byte-order mark (written by some spreadsheet tools).
    Utf8Bom,
    /// ISO-8859-1. Every byte sequence is valid, so this always succeeds.
    Latin1,
}

impl Encoding {
    pub const PRIORITY: [Encoding; 3] = [Encoding::Utf8, Encoding::Utf8Bom, Encoding::Latin1];

    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Utf8Bom => "utf-8-sig",
            Encoding::Latin1 => "latin-1",
        }
    }

    /// Decode `bytes`, returning `None` if they are not valid in this encoding.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Encoding::Utf8 => {
                if bytes.starts_with(UTF8_BOM) {
                    return None;
                }
                std::str::from_utf8(bytes).ok().map(str::to_string)
            }
            Encoding::Utf8Bom => {
                let rest = bytes.strip_prefix(UTF8_BOM)?;
                std::str::from_utf8(rest).ok().map(str::to_string)
            }
            Encoding::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

/// Decode file contents with the first encoding that accepts them.
pub fn decode(path: &Path, bytes: &[u8]) -> Result<(String, Encoding), ReportError> {
    for encoding in Encoding::PRIORITY {
        if let Some(text) = encoding.decode(bytes) {
            return Ok((text, encoding));
        }
        tracing::debug!("{} is not {}", path.display(), encoding.as_str());
    }
    Err(ReportError::Decode {
        path: path.to_path_buf(),
    })
}

/// Load all records of a results file as header-keyed rows.
pub fn load_rows(path: &Path) -> Result<Vec<RawRow>, ReportError> {
    let bytes = fs::read(path)?;
    let (text, encoding) = decode(path, &bytes)?;
    tracing::debug!("decoded {} as {}", path.display(), encoding.as_str());
    parse_rows(&text)
}

/// Parse CSV text with a header row into header-keyed rows.
///
/// Records shorter than the header are accepted; their missing cells are
/// simply absent from the row.
pub fn parse_rows(text: &str) -> Result<Vec<RawRow>, ReportError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Check whether the header of a results file has both p50 and p99 columns.
///
/// Unreadable or undecodable files are treated as lacking percentiles.
pub fn has_percentile_columns(path: &Path) -> bool {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(_) => return false,
    };
    let text = match decode(path, &bytes) {
        Ok((text, _)) => text,
        Err(_) => return false,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    match reader.headers() {
        Ok(header) => {
            header.iter().any(|h| h == "latency_p50") && header.iter().any(|h| h == "latency_p99")
        }
        Err(_) => false,
    }
}

/// Find the results file to report on.
///
/// Candidates are `<root>/<run>/results.csv`, newest run directory first
/// (reverse lexicographic by name). The newest candidate with percentile
/// columns is preferred; otherwise the newest candidate is returned.
/// Returns `None` when the root does not exist or holds no results.
pub fn find_latest_results(root: &Path) -> Option<PathBuf> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("cannot read results root {}: {}", root.display(), e);
            return None;
        }
    };

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path().join(RESULTS_FILE))
        .filter(|path| path.is_file())
        .collect();

    if candidates.is_empty() {
        return None;
    }

    candidates.sort_unstable_by(|a, b| b.cmp(a));

    if let Some(path) = candidates.iter().find(|p| has_percentile_columns(p)) {
        tracing::debug!("selected {} (has percentile columns)", path.display());
        return Some(path.clone());
    }

    tracing::debug!(
        "no results with percentile columns, using newest {}",
        candidates[0].display()
    );
    candidates.into_iter().next()
}
