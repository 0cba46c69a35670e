//! Per-endpoint winners and deltas.

use crate::charts::{EndpointGroups, group_by_endpoint, lookup, relative_delta};
use crate::config::{Server, ServerPair};
use crate::record::BenchmarkRecord;
use serde::{Serialize, Serializer};

/// Sentinel shown when no server has a record for an endpoint.
pub const NOT_APPLICABLE: &str = "N/A";

/// Winner of one metric on one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Winner {
    /// Server id of the winning configuration.
    Server(String),
    NotApplicable,
}

impl Winner {
    pub fn as_str(&self) -> &str {
        match self {
            Winner::Server(id) => id,
            Winner::NotApplicable => NOT_APPLICABLE,
        }
    }
}

impl From<Option<&Server>> for Winner {
    fn from(server: Option<&Server>) -> Self {
        match server {
            Some(s) => Winner::Server(s.id.clone()),
            None => Winner::NotApplicable,
        }
    }
}

impl Serialize for Winner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub endpoint: String,
    pub req_winner: Winner,
    /// Primary throughput relative to baseline, in percent.
    pub req_delta: Option<f64>,
    pub lat_winner: Winner,
    /// Primary average latency relative to baseline, in percent.
    pub lat_delta: Option<f64>,
}

/// Servers that have a record for one endpoint, primary first.
pub fn contenders<'r, 's>(
    group: &[&'r BenchmarkRecord],
    servers: &'s ServerPair,
) -> Vec<(&'s Server, &'r BenchmarkRecord)> {
    servers
        .iter()
        .filter_map(|server| lookup(group, &server.id).map(|r| (server, r)))
        .collect()
}

/// Server with the strictly highest throughput. On a tie the server
/// enumerated first keeps the win.
pub fn throughput_winner<'s>(contenders: &[(&'s Server, &BenchmarkRecord)]) -> Option<&'s Server> {
    best(contenders, |r| r.requests_sec, |value, best| value > best)
}

/// Server with the strictly lowest average latency. On a tie the server
/// enumerated first keeps the win.
pub fn latency_winner<'s>(contenders: &[(&'s Server, &BenchmarkRecord)]) -> Option<&'s Server> {
    best(contenders, |r| r.latency_ms, |value, best| value < best)
}

fn best<'s>(
    contenders: &[(&'s Server, &BenchmarkRecord)],
    metric: impl Fn(&BenchmarkRecord) -> f64,
    better: impl Fn(f64, f64) -> bool,
) -> Option<&'s Server> {
    let mut winner: Option<(&'s Server, f64)> = None;
    for (server, record) in contenders {
        let value = metric(record);
        match winner {
            Some((_, current)) if !better(value, current) => {}
            _ => winner = Some((*server, value)),
        }
    }
    winner.map(|(server, _)| server)
}

pub fn build_insights(records: &[BenchmarkRecord], servers: &ServerPair) -> Vec<Insight> {
    insights_for(&group_by_endpoint(records), servers)
}

pub(crate) fn insights_for(groups: &EndpointGroups<'_>, servers: &ServerPair) -> Vec<Insight> {
    groups
        .iter()
        .map(|(endpoint, group)| {
            let contenders = contenders(group, servers);
            let primary = lookup(group, &servers.primary.id);
            let baseline = lookup(group, &servers.baseline.id);

            let (req_delta, lat_delta) = match (primary, baseline) {
                (Some(p), Some(b)) => (
                    relative_delta(p.requests_sec, b.requests_sec),
                    relative_delta(p.latency_ms, b.latency_ms),
                ),
                _ => (None, None),
            };

            Insight {
                endpoint: endpoint.to_string(),
                req_winner: throughput_winner(&contenders).into(),
                req_delta,
                lat_winner: latency_winner(&contenders).into(),
                lat_delta,
            }
        })
        .collect()
}
