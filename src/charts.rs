//! Chart series derived from benchmark records.
//!
//! Every series is aligned by endpoint: index `i` of any array refers to the
//! `i`th endpoint in sorted order. A server without a record for an endpoint
//! contributes `null`, which Plotly draws as a gap.

use crate::config::ServerPair;
use crate::record::{BenchmarkRecord, endpoint_label};
use serde::Serialize;
use std::collections::BTreeMap;

/// Records grouped by endpoint. Iteration order is the sorted endpoint list.
pub type EndpointGroups<'a> = BTreeMap<&'a str, Vec<&'a BenchmarkRecord>>;

pub fn group_by_endpoint(records: &[BenchmarkRecord]) -> EndpointGroups<'_> {
    let mut groups: EndpointGroups<'_> = BTreeMap::new();
    for record in records {
        groups.entry(record.endpoint.as_str()).or_default().push(record);
    }
    groups
}

/// First record in `group` for `server`. Duplicates are not an error; later
/// ones are ignored.
pub fn lookup<'a>(group: &[&'a BenchmarkRecord], server: &str) -> Option<&'a BenchmarkRecord> {
    group.iter().copied().find(|r| r.server == server)
}

/// Percent change of `value` relative to `base`, or `None` when `base` is
/// not strictly positive.
pub fn relative_delta(value: f64, base: f64) -> Option<f64> {
    if base > 0.0 {
        Some((value - base) / base * 100.0)
    } else {
        None
    }
}

/// One metric per server, keyed by server id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupedSeries {
    pub labels: Vec<String>,
    #[serde(flatten)]
    pub series: BTreeMap<String, Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Percentiles {
    pub p50: Vec<Option<f64>>,
    pub p75: Vec<Option<f64>>,
    pub p90: Vec<Option<f64>>,
    pub p99: Vec<Option<f64>>,
}

impl Percentiles {
    fn push(&mut self, record: Option<&BenchmarkRecord>) {
        self.p50.push(record.and_then(|r| r.latency_p50_ms));
        self.p75.push(record.and_then(|r| r.latency_p75_ms));
        self.p90.push(record.and_then(|r| r.latency_p90_ms));
        self.p99.push(record.and_then(|r| r.latency_p99_ms));
    }
}

/// Latency percentiles per server, keyed by server id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PercentileSeries {
    pub labels: Vec<String>,
    #[serde(flatten)]
    pub series: BTreeMap<String, Percentiles>,
}

/// Primary throughput relative to baseline, in percent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeltaSeries {
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub requests_sec: GroupedSeries,
    pub latency_ms: GroupedSeries,
    pub transfer_kb_sec: GroupedSeries,
    pub latency_pctl: PercentileSeries,
    pub throughput_delta_pct: DeltaSeries,
}

impl ChartData {
    pub fn build(records: &[BenchmarkRecord], servers: &ServerPair) -> Self {
        let groups = group_by_endpoint(records);
        let labels: Vec<String> = groups
            .keys()
            .map(|e| endpoint_label(e).to_string())
            .collect();

        let mut charts = ChartData {
            requests_sec: GroupedSeries::with_labels(&labels),
            latency_ms: GroupedSeries::with_labels(&labels),
            transfer_kb_sec: GroupedSeries::with_labels(&labels),
            latency_pctl: PercentileSeries {
                labels: labels.clone(),
                series: BTreeMap::new(),
            },
            throughput_delta_pct: DeltaSeries {
                labels: labels.clone(),
                values: Vec::with_capacity(labels.len()),
            },
        };

        for server in servers.iter() {
            let id = server.id.as_str();
            let mut requests = Vec::with_capacity(labels.len());
            let mut latency = Vec::with_capacity(labels.len());
            let mut transfer = Vec::with_capacity(labels.len());
            let mut pctl = Percentiles::default();

            for group in groups.values() {
                let record = lookup(group, id);
                requests.push(record.map(|r| r.requests_sec));
                latency.push(record.map(|r| r.latency_ms));
                transfer.push(record.map(|r| r.transfer_kb_sec));
                pctl.push(record);
            }

            charts.requests_sec.series.insert(id.to_string(), requests);
            charts.latency_ms.series.insert(id.to_string(), latency);
            charts.transfer_kb_sec.series.insert(id.to_string(), transfer);
            charts.latency_pctl.series.insert(id.to_string(), pctl);
        }

        for group in groups.values() {
            let primary = lookup(group, &servers.primary.id);
            let baseline = lookup(group, &servers.baseline.id);
            let delta = match (primary, baseline) {
                (Some(p), Some(b)) => relative_delta(p.requests_sec, b.requests_sec),
                _ => None,
            };
            charts.throughput_delta_pct.values.push(delta);
        }

        charts
    }
}

impl GroupedSeries {
    fn with_labels(labels: &[String]) -> Self {
        Self {
            labels: labels.to_vec(),
            series: BTreeMap::new(),
        }
    }
}

/// Raw throughput samples per server id, in input order.
pub fn hist_requests(
    records: &[BenchmarkRecord],
    servers: &ServerPair,
) -> BTreeMap<String, Vec<f64>> {
    servers
        .iter()
        .map(|server| {
            let samples = records
                .iter()
                .filter(|r| r.server == server.id)
                .map(|r| r.requests_sec)
                .collect();
            (server.id.clone(), samples)
        })
        .collect()
}

pub fn has_percentiles(records: &[BenchmarkRecord]) -> bool {
    records.iter().any(BenchmarkRecord::has_percentiles)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::record::tests::{full_row, raw};

    /// A record with the given throughput and average latency.
    pub(crate) fn record(server: &str, endpoint: &str, rps: f64, lat_ms: f64) -> BenchmarkRecord {
        let rps = rps.to_string();
        let lat = format!("{lat_ms}ms");
        let row = raw(&[
            ("timestamp", "2026-02-22T04:00:00Z"),
            ("server", server),
            ("endpoint", endpoint),
            ("requests_sec", &rps),
            ("latency_avg", &lat),
            ("transfer_sec", "10KB"),
        ]);
        BenchmarkRecord::from_raw(1, &row).unwrap()
    }

    #[test]
    fn test_grouping_sorts_endpoints() {
        let records = vec![
            record("xampp", "json.php", 1.0, 1.0),
            record("xampp", "cpu.php", 1.0, 1.0),
            record("nginx_multi", "io.php", 1.0, 1.0),
        ];
        let groups = group_by_endpoint(&records);
        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, ["cpu.php", "io.php", "json.php"]);
    }

    #[test]
    fn test_lookup_takes_first_duplicate() {
        let records = vec![
            record("xampp", "cpu.php", 10.0, 1.0),
            record("xampp", "cpu.php", 20.0, 1.0),
        ];
        let groups = group_by_endpoint(&records);
        let found = lookup(&groups["cpu.php"], "xampp").unwrap();
        assert_eq!(found.requests_sec, 10.0);
        assert!(lookup(&groups["cpu.php"], "nginx_multi").is_none());
    }

    #[test]
    fn test_series_aligned_with_gaps() {
        let records = vec![
            record("xampp", "cpu.php", 100.0, 2.0),
            record("nginx_multi", "cpu.php", 80.0, 3.0),
            record("nginx_multi", "io.php", 50.0, 4.0),
        ];
        let charts = ChartData::build(&records, &ServerPair::default());

        assert_eq!(charts.requests_sec.labels, ["cpu", "io"]);
        assert_eq!(charts.requests_sec.series["xampp"], [Some(100.0), None]);
        assert_eq!(
            charts.requests_sec.series["nginx_multi"],
            [Some(80.0), Some(50.0)]
        );
        assert_eq!(charts.latency_ms.series["xampp"], [Some(2.0), None]);
        assert_eq!(charts.transfer_kb_sec.series["nginx_multi"], [Some(10.0), Some(10.0)]);

        let pctl = &charts.latency_pctl.series["xampp"];
        assert_eq!(pctl.p99.len(), 2);
        assert_eq!(pctl.p99, [None, None]);
    }

    #[test]
    fn test_delta_series() {
        let records = vec![
            record("xampp", "cpu.php", 100.0, 1.0),
            record("nginx_multi", "cpu.php", 80.0, 1.0),
            // baseline throughput of zero yields no delta
            record("xampp", "io.php", 10.0, 1.0),
            record("nginx_multi", "io.php", 0.0, 1.0),
            // no baseline record
            record("xampp", "json.php", 10.0, 1.0),
        ];
        let charts = ChartData::build(&records, &ServerPair::default());
        let values = &charts.throughput_delta_pct.values;
        assert_eq!(values.len(), 3);
        assert!((values[0].unwrap() - 25.0).abs() < 1e-9);
        assert_eq!(values[1], None);
        assert_eq!(values[2], None);
    }

    #[test]
    fn test_percentile_series_from_full_rows() {
        let records = vec![
            BenchmarkRecord::from_raw(1, &full_row("xampp", "cpu.php")).unwrap(),
            BenchmarkRecord::from_raw(2, &full_row("nginx_multi", "io.php")).unwrap(),
        ];
        assert!(has_percentiles(&records));

        let charts = ChartData::build(&records, &ServerPair::default());
        let xampp = &charts.latency_pctl.series["xampp"];
        assert_eq!(xampp.p50, [Some(1.0), None]);
        assert_eq!(xampp.p75, [None, None]);
        let nginx = &charts.latency_pctl.series["nginx_multi"];
        assert_eq!(nginx.p99, [None, Some(1200.0)]);
    }

    #[test]
    fn test_serialized_shape() {
        let records = vec![record("xampp", "cpu.php", 100.0, 2.0)];
        let charts = ChartData::build(&records, &ServerPair::default());
        let json = serde_json::to_value(&charts).unwrap();
        assert_eq!(json["requests_sec"]["labels"][0], "cpu");
        assert_eq!(json["requests_sec"]["xampp"][0], 100.0);
        assert!(json["requests_sec"]["nginx_multi"][0].is_null());
        assert!(json["latency_pctl"]["xampp"]["p90"].is_array());
        assert!(json["throughput_delta_pct"]["values"][0].is_null());
    }

    #[test]
    fn test_hist_requests() {
        let records = vec![
            record("xampp", "cpu.php", 3.0, 1.0),
            record("nginx_multi", "cpu.php", 4.0, 1.0),
            record("xampp", "io.php", 1.0, 1.0),
            record("apache", "io.php", 9.0, 1.0),
        ];
        let hist = hist_requests(&records, &ServerPair::default());
        assert_eq!(hist["xampp"], [3.0, 1.0]);
        assert_eq!(hist["nginx_multi"], [4.0]);
        assert!(!hist.contains_key("apache"));
    }

    #[test]
    fn test_any_percentile_counts() {
        let mut p75_only = record("xampp", "cpu.php", 1.0, 1.0);
        assert!(!has_percentiles(std::slice::from_ref(&p75_only)));
        p75_only.latency_p75_ms = Some(2.0);
        assert!(has_percentiles(&[p75_only]));
    }

    #[test]
    fn test_empty_input() {
        let charts = ChartData::build(&[], &ServerPair::default());
        assert!(charts.requests_sec.labels.is_empty());
        assert!(charts.requests_sec.series["xampp"].is_empty());
        assert!(!has_percentiles(&[]));
    }
}
