//! Detection of zero-valued measurements.
//!
//! A server that returns nothing but errors or times out under load can
//! report exactly zero throughput. Such rows would otherwise look like an
//! overwhelming win for the other server, so they are called out instead.

use crate::config::ServerPair;
use crate::record::{BenchmarkRecord, EndpointKind, endpoint_display};
use crate::texts::{Texts, fill};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZeroMetricWarning {
    /// Endpoint display name, e.g. `JSON`.
    pub endpoint: String,
    pub endpoint_type: EndpointKind,
    pub server: String,
    pub server_label: String,
    pub requests_zero: bool,
    pub transfer_zero: bool,
    pub requests_sec: f64,
    pub transfer_kb_sec: f64,
}

/// One warning per record with zero throughput or zero transfer, in input
/// order.
pub fn find_zero_metrics(
    records: &[BenchmarkRecord],
    servers: &ServerPair,
) -> Vec<ZeroMetricWarning> {
    records
        .iter()
        .filter_map(|record| {
            let requests_zero = record.requests_sec == 0.0;
            let transfer_zero = record.transfer_kb_sec == 0.0;
            if !requests_zero && !transfer_zero {
                return None;
            }

            let server_label = servers
                .get(&record.server)
                .map(|s| s.label.clone())
                .unwrap_or_else(|| record.server.clone());

            Some(ZeroMetricWarning {
                endpoint: endpoint_display(&record.endpoint),
                endpoint_type: EndpointKind::from_endpoint(&record.endpoint),
                server: record.server.clone(),
                server_label,
                requests_zero,
                transfer_zero,
                requests_sec: record.requests_sec,
                transfer_kb_sec: record.transfer_kb_sec,
            })
        })
        .collect()
}

impl ZeroMetricWarning {
    /// Sentences describing this warning, ending with a note on the likely
    /// cause for the endpoint's workload.
    pub fn describe(&self, texts: &Texts, connections: u64) -> Vec<String> {
        let subject = [
            ("server", self.server_label.as_str()),
            ("endpoint", self.endpoint.as_str()),
        ];

        let mut lines = Vec::with_capacity(3);
        if self.requests_zero {
            lines.push(fill(&texts.warning_requests_zero, &subject));
        }
        if self.transfer_zero {
            lines.push(fill(&texts.warning_transfer_zero, &subject));
        }

        let note = match self.endpoint_type {
            EndpointKind::Cpu => &texts.warning_note_cpu,
            EndpointKind::Io => &texts.warning_note_io,
            EndpointKind::Json => &texts.warning_note_json,
            EndpointKind::Other => &texts.warning_note_other,
        };
        let connections = connections.to_string();
        lines.push(fill(note, &[("connections", connections.as_str())]));

        lines
    }
}
