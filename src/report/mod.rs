//! Report generation.

pub mod format;
pub mod html;
pub mod payload;

use crate::config::Settings;
use crate::error::ReportError;
use crate::loader::{find_latest_results, load_rows};
use crate::record::{display_offset, normalize, to_display};
use crate::run_config::RunConfig;
use crate::texts::TextCatalog;
use chrono::{DateTime, Utc};
use payload::{Meta, ReportPayload};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Builds one report from the latest (or a given) results file.
pub struct ReportGenerator {
    settings: Settings,
    catalog: TextCatalog,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
}

impl ReportGenerator {
    pub fn new(settings: Settings, catalog: TextCatalog) -> Self {
        Self {
            settings,
            catalog,
            input: None,
            output: None,
        }
    }

    /// Use this results file instead of discovering the latest one.
    pub fn with_input(mut self, path: PathBuf) -> Self {
        self.input = Some(path);
        self
    }

    /// Write the report to this path instead of a timestamped file in the
    /// reports directory.
    pub fn with_output(mut self, path: PathBuf) -> Self {
        self.output = Some(path);
        self
    }

    /// Generate the report and return the path it was written to.
    pub fn generate(&self) -> Result<PathBuf, ReportError> {
        self.generate_at(Utc::now())
    }

    pub fn generate_at(&self, now: DateTime<Utc>) -> Result<PathBuf, ReportError> {
        let csv_path = self.results_file()?;
        tracing::info!("loading {}", csv_path.display());

        let rows = load_rows(&csv_path)?;
        let records = normalize(&rows)?;
        if records.is_empty() {
            tracing::warn!("{} has no data rows", csv_path.display());
        } else {
            tracing::info!("loaded {} records", records.len());
        }

        let run_dir = csv_path.parent().unwrap_or_else(|| Path::new("."));
        let run_config = RunConfig::load(run_dir);

        let meta = Meta::new(to_display(now), &csv_path, &run_config);
        let payload = ReportPayload::build(
            meta,
            records,
            &self.settings.servers,
            &self.catalog,
            run_config,
        );
        if !payload.warnings.is_empty() {
            tracing::warn!("{} zero-valued measurements", payload.warnings.len());
        }
        if !payload.has_pctl {
            tracing::warn!("results have no latency percentiles");
        }

        let page = html::render(&payload, &self.catalog, &self.settings.report)?;

        let output = match &self.output {
            Some(path) => path.clone(),
            None => self.settings.paths.reports_dir.join(report_file_name(now)),
        };
        write_once(&output, page.as_bytes())?;
        tracing::info!("report written to {}", output.display());

        Ok(output)
    }

    fn results_file(&self) -> Result<PathBuf, ReportError> {
        if let Some(path) = &self.input {
            return Ok(path.clone());
        }
        let root = &self.settings.paths.results_dir;
        find_latest_results(root).ok_or_else(|| ReportError::NoResults { root: root.clone() })
    }
}

/// `report_<YYYYmmdd_HHMMSS>.html` in UTC+8.
pub fn report_file_name(now: DateTime<Utc>) -> String {
    format!(
        "report_{}.html",
        now.with_timezone(&display_offset()).format("%Y%m%d_%H%M%S")
    )
}

/// Write `contents` to `path` through a temporary file in the same
/// directory, so the destination either holds the complete report or is
/// left untouched.
fn write_once(path: &Path, contents: &[u8]) -> Result<(), ReportError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}
