//! Bilingual HTML reports for PHP server benchmark runs.
//!
//! A benchmark run leaves a `results.csv` (and optionally a `config.json`)
//! in its own directory. This crate finds the latest run, normalizes the
//! measurements, derives winners, deltas and interpretations for each
//! endpoint, and writes a single self-contained HTML page.

pub mod charts;
pub mod config;
pub mod error;
pub mod insight;
pub mod interpret;
pub mod loader;
pub mod logging;
pub mod record;
pub mod report;
pub mod run_config;
pub mod texts;
pub mod units;
pub mod warnings;

pub use config::Settings;
pub use error::ReportError;
pub use record::BenchmarkRecord;
pub use report::ReportGenerator;
pub use texts::{Lang, TextCatalog};
