//! End-to-end tests for report generation.
//!
//! Each test builds a scratch results tree in a temporary directory, runs
//! the generator against it, and inspects the written page.

use std::fs;
use std::path::{Path, PathBuf};

use bench_report::loader::{find_latest_results, load_rows};
use bench_report::{ReportError, ReportGenerator, Settings, TextCatalog};
use tempfile::TempDir;

// ── Fixtures ────────────────────────────────────────────────────────────

const HEADER_PCTL: &str = "timestamp,server,endpoint,requests_sec,latency_avg,latency_p50,latency_p75,latency_p90,latency_p99,transfer_sec";
const HEADER_PLAIN: &str = "timestamp,server,endpoint,requests_sec,latency_avg,transfer_sec";

fn pctl_csv() -> String {
    [
        HEADER_PCTL,
        "2026-02-22T04:00:00Z,xampp,cpu.php,100.0,10ms,8ms,9ms,15ms,40ms,1MB",
        "2026-02-22T04:00:00Z,nginx_multi,cpu.php,80.0,15ms,12ms,14ms,20ms,60ms,800KB",
        "2026-02-22T04:01:00Z,xampp,io.php,50.0,2ms,1ms,1.5ms,3ms,1.2s,20KB",
        "2026-02-22T04:01:00Z,nginx_multi,io.php,90.0,4ms,3ms,3.5ms,5ms,80ms,36KB",
        "2026-02-22T04:02:00Z,xampp,json.php,0,120ms,,,,,0B",
        "2026-02-22T04:02:00Z,nginx_multi,json.php,123.4,18.5ms,10ms,12ms,20ms,90ms,45.6KB",
    ]
    .join("\n")
}

fn plain_csv() -> String {
    [
        HEADER_PLAIN,
        "2026-02-23T04:00:00Z,xampp,cpu.php,100.0,10ms,1MB",
        "2026-02-23T04:00:00Z,nginx_multi,cpu.php,80.0,15ms,800KB",
    ]
    .join("\n")
}

fn write_run(root: &Path, run: &str, csv: &[u8]) -> PathBuf {
    let dir = root.join(run);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("results.csv");
    fs::write(&path, csv).unwrap();
    path
}

fn generator(root: &TempDir) -> ReportGenerator {
    let mut settings = Settings::default();
    settings.paths.results_dir = root.path().join("results");
    settings.paths.reports_dir = root.path().join("reports");
    ReportGenerator::new(settings, TextCatalog::load().unwrap())
}

/// Extract and parse the embedded payload from a generated page.
fn embedded_payload(html: &str) -> serde_json::Value {
    let start = html.find("const payload = ").unwrap() + "const payload = ".len();
    let end = start + html[start..].find(";\n").unwrap();
    serde_json::from_str(&html[start..end]).unwrap()
}

// ── Discovery ───────────────────────────────────────────────────────────

#[test]
fn empty_root_reports_no_results() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("results").join("20260222_120000")).unwrap();

    let err = generator(&tmp).generate().unwrap_err();
    assert!(matches!(err, ReportError::NoResults { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn newest_run_with_percentiles_is_preferred() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("results");
    let older = write_run(&root, "20260222_120000", pctl_csv().as_bytes());
    write_run(&root, "20260223_120000", plain_csv().as_bytes());

    assert_eq!(find_latest_results(&root), Some(older));
}

#[test]
fn newest_run_is_used_when_none_have_percentiles() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("results");
    write_run(&root, "20260222_120000", plain_csv().as_bytes());
    let newer = write_run(&root, "20260223_120000", plain_csv().as_bytes());
    // a run directory without results is ignored
    fs::create_dir_all(root.join("20260224_120000")).unwrap();

    assert_eq!(find_latest_results(&root), Some(newer));
}

// ── Encodings ───────────────────────────────────────────────────────────

#[test]
fn bom_prefixed_file_loads() {
    let tmp = TempDir::new().unwrap();
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(plain_csv().as_bytes());
    let path = write_run(tmp.path(), "run", &bytes);

    let rows = load_rows(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["timestamp"], "2026-02-23T04:00:00Z");
}

#[test]
fn latin1_file_loads() {
    let tmp = TempDir::new().unwrap();
    let mut bytes = HEADER_PLAIN.as_bytes().to_vec();
    bytes.extend_from_slice(b"\n2026-02-23T04:00:00Z,caf\xE9,cpu.php,1.0,1ms,1KB\n");
    let path = write_run(tmp.path(), "run", &bytes);

    let rows = load_rows(&path).unwrap();
    assert_eq!(rows[0]["server"], "café");
}

// ── Generation ──────────────────────────────────────────────────────────

#[test]
fn generates_complete_report() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("results");
    let csv = write_run(&root, "20260222_120000", pctl_csv().as_bytes());
    fs::write(
        csv.parent().unwrap().join("config.json"),
        r#"{"duration": 180, "connections": 300, "test_time": "2026-02-22T12:00:00Z"}"#,
    )
    .unwrap();

    let path = generator(&tmp).generate().unwrap();
    assert_eq!(path.parent().unwrap(), tmp.path().join("reports"));
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("report_") && name.ends_with(".html"));

    let html = fs::read_to_string(&path).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("plotly-2.27.0"));
    assert!(html.contains("katex@0.16.9"));
    for id in ["chart-req", "chart-lat", "chart-xfer", "chart-pctl", "chart-hist", "chart-delta"] {
        assert!(html.contains(&format!("id=\"{id}\"")), "missing {id}");
    }
    assert!(html.contains("<strong>3m</strong>"));
    assert!(html.contains("<strong>300</strong>"));
    assert!(html.contains(r#"class="card warning-card""#));
    assert!(html.contains(r#"<td class="metric-warning""#));
    assert!(html.contains("const TEXTS = "));

    let payload = embedded_payload(&html);
    assert_eq!(payload["meta"]["source"], "results/20260222_120000/results.csv");
    assert_eq!(payload["meta"]["test_time"], "2026-02-22T12:00:00Z");
    assert_eq!(payload["has_pctl"], true);
    assert_eq!(payload["endpoints"][0], "cpu.php");
    assert_eq!(payload["rows"][0]["timestamp"], "2026-02-22 12:00:00");

    let insights = payload["insights"].as_array().unwrap();
    assert_eq!(insights.len(), 3);
    assert_eq!(insights[0]["req_winner"], "xampp");
    assert!((insights[0]["req_delta"].as_f64().unwrap() - 25.0).abs() < 1e-9);

    let deltas = payload["charts"]["throughput_delta_pct"]["values"]
        .as_array()
        .unwrap();
    assert!(deltas[2].as_f64().unwrap() < 0.0);

    let en = payload["interpretations"]["en"].as_array().unwrap();
    let zh = payload["interpretations"]["zh"].as_array().unwrap();
    assert_eq!(en.len(), 3);
    assert_eq!(zh.len(), 3);
    // io.php has a 1.2s p99 on xampp
    let catalog = TextCatalog::load().unwrap();
    let tail = &catalog.get(bench_report::Lang::En).interp_tail;
    assert!(en[1]["text"].as_str().unwrap().contains(tail.as_str()));

    let warnings = payload["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["server_label"], "XAMPP");
    assert_eq!(warnings[0]["endpoint"], "JSON");
}

#[test]
fn explicit_input_and_output() {
    let tmp = TempDir::new().unwrap();
    let csv = write_run(tmp.path(), "elsewhere", plain_csv().as_bytes());
    let out = tmp.path().join("out").join("report.html");

    let path = generator(&tmp)
        .with_input(csv)
        .with_output(out.clone())
        .generate()
        .unwrap();
    assert_eq!(path, out);

    let html = fs::read_to_string(&out).unwrap();
    let payload = embedded_payload(&html);
    assert_eq!(payload["has_pctl"], false);
    assert_eq!(payload["run_config"]["duration"], 10);
    assert!(payload["meta"]["test_time"].is_null());
    assert!(!html.contains(r#"class="card warning-card""#));
}

#[test]
fn hostile_values_are_escaped() {
    let tmp = TempDir::new().unwrap();
    let csv = format!(
        "{}\n2026-02-23T04:00:00Z,xampp,</script><script>x.php,1.0,1ms,1KB\n",
        HEADER_PLAIN
    );
    let input = write_run(tmp.path(), "run", csv.as_bytes());

    let path = generator(&tmp).with_input(input).generate().unwrap();
    let html = fs::read_to_string(path).unwrap();
    assert!(!html.contains("</script><script>x"));
    assert!(html.contains("&lt;/SCRIPT&gt;&lt;SCRIPT&gt;X"));
}

#[test]
fn malformed_number_aborts() {
    let tmp = TempDir::new().unwrap();
    let csv = format!("{}\n2026-02-23T04:00:00Z,xampp,cpu.php,fast,1ms,1KB\n", HEADER_PLAIN);
    let input = write_run(tmp.path(), "run", csv.as_bytes());

    let err = generator(&tmp).with_input(input).generate().unwrap_err();
    assert!(matches!(err, ReportError::InvalidNumber { field: "requests_sec", .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(!tmp.path().join("reports").exists());
}

#[test]
fn non_finite_numbers_abort() {
    let tmp = TempDir::new().unwrap();
    let csv = [
        HEADER_PLAIN,
        "2026-02-23T04:00:00Z,xampp,cpu.php,NaN,10ms,1KB",
        "2026-02-23T04:00:00Z,nginx_multi,cpu.php,100,15ms,1KB",
    ]
    .join("\n");
    let input = write_run(tmp.path(), "run", csv.as_bytes());

    let err = generator(&tmp).with_input(input).generate().unwrap_err();
    assert!(matches!(err, ReportError::InvalidNumber { field: "requests_sec", .. }));
    assert_eq!(err.exit_code(), 2);

    let csv = format!("{}\n2026-02-23T04:00:00Z,xampp,cpu.php,100,NaNms,1KB\n", HEADER_PLAIN);
    let input = write_run(tmp.path(), "run2", csv.as_bytes());
    let err = generator(&tmp).with_input(input).generate().unwrap_err();
    assert!(matches!(err, ReportError::InvalidNumber { field: "latency_avg", .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(!tmp.path().join("reports").exists());
}
