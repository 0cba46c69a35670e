//! The data embedded in the report page.

use crate::charts::{ChartData, group_by_endpoint, hist_requests, has_percentiles};
use crate::config::{Server, ServerPair};
use crate::insight::{Insight, insights_for};
use crate::interpret::{Interpretation, interpretations_for};
use crate::record::BenchmarkRecord;
use crate::run_config::RunConfig;
use crate::texts::{Lang, TextCatalog};
use crate::warnings::{ZeroMetricWarning, find_zero_metrics};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meta {
    /// Generation time, UTC+8.
    pub generated_at: String,
    /// Results file the report was built from, relative to the results root's
    /// parent (e.g. `results/20260222_120000/results.csv`).
    pub source: String,
    pub test_time: Option<String>,
}

impl Meta {
    pub fn new(generated_at: String, csv_path: &Path, run_config: &RunConfig) -> Self {
        Self {
            generated_at,
            source: source_label(csv_path),
            test_time: run_config.test_time.clone(),
        }
    }
}

/// The last three components of `path`, joined with `/`.
pub fn source_label(path: &Path) -> String {
    let parts: Vec<_> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    let start = parts.len().saturating_sub(3);
    parts[start..].join("/")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPayload {
    pub meta: Meta,
    /// Compared servers, primary first.
    pub servers: Vec<Server>,
    /// Sorted endpoint names as they appear in the results file.
    pub endpoints: Vec<String>,
    pub charts: ChartData,
    pub hist_requests: BTreeMap<String, Vec<f64>>,
    pub insights: Vec<Insight>,
    /// Interpretations keyed by language code.
    pub interpretations: BTreeMap<&'static str, Vec<Interpretation>>,
    pub has_pctl: bool,
    pub rows: Vec<BenchmarkRecord>,
    pub run_config: RunConfig,
    pub warnings: Vec<ZeroMetricWarning>,
}

impl ReportPayload {
    pub fn build(
        meta: Meta,
        records: Vec<BenchmarkRecord>,
        servers: &ServerPair,
        catalog: &TextCatalog,
        run_config: RunConfig,
    ) -> Self {
        let groups = group_by_endpoint(&records);
        let endpoints = groups.keys().map(|e| e.to_string()).collect();
        let insights = insights_for(&groups, servers);
        let interpretations = Lang::ALL
            .iter()
            .map(|lang| {
                (
                    lang.code(),
                    interpretations_for(&groups, servers, catalog.get(*lang)),
                )
            })
            .collect();

        Self {
            meta,
            servers: servers.iter().cloned().collect(),
            endpoints,
            charts: ChartData::build(&records, servers),
            hist_requests: hist_requests(&records, servers),
            insights,
            interpretations,
            has_pctl: has_percentiles(&records),
            warnings: find_zero_metrics(&records, servers),
            rows: records,
            run_config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::full_row;

    #[test]
    fn test_source_label() {
        assert_eq!(
            source_label(Path::new("/data/bench/results/20260222_120000/results.csv")),
            "results/20260222_120000/results.csv"
        );
        assert_eq!(source_label(Path::new("results.csv")), "results.csv");
    }

    #[test]
    fn test_payload_shape() {
        let records = vec![
            BenchmarkRecord::from_raw(1, &full_row("xampp", "json.php")).unwrap(),
            BenchmarkRecord::from_raw(2, &full_row("nginx_multi", "cpu.php")).unwrap(),
        ];
        let run_config = RunConfig::default();
        let meta = Meta::new(
            "2026-02-22 20:00:00".to_string(),
            Path::new("results/run/results.csv"),
            &run_config,
        );
        let payload = ReportPayload::build(
            meta,
            records,
            &ServerPair::default(),
            &TextCatalog::load().unwrap(),
            run_config,
        );

        assert_eq!(payload.endpoints, ["cpu.php", "json.php"]);
        assert_eq!(payload.insights.len(), 2);
        assert_eq!(payload.interpretations["en"].len(), 2);
        assert_eq!(payload.interpretations["zh"].len(), 2);
        assert!(payload.has_pctl);
        assert!(payload.warnings.is_empty());
        assert_eq!(payload.rows.len(), 2);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["meta"]["source"], "results/run/results.csv");
        assert!(json["meta"]["test_time"].is_null());
        assert_eq!(json["servers"][0]["id"], "xampp");
        assert_eq!(json["servers"][1]["label"], "NGINX (Multi-core)");
        assert_eq!(json["charts"]["requests_sec"]["labels"][1], "json");
        assert_eq!(json["interpretations"]["en"][0]["endpoint_type"], "cpu");
        assert_eq!(json["run_config"]["connections"], 50);
    }
}
