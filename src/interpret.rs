//! Plain-language interpretation of each endpoint's results.

use crate::charts::{EndpointGroups, group_by_endpoint, lookup, relative_delta};
use crate::config::{Server, ServerPair};
use crate::insight::{NOT_APPLICABLE, contenders, latency_winner, throughput_winner};
use crate::record::{BenchmarkRecord, EndpointKind, endpoint_label};
use crate::texts::{Texts, fill};
use serde::Serialize;

/// p99 latency (ms) at or above which the tail warning is added.
pub const TAIL_LATENCY_MS: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interpretation {
    /// Endpoint label without the `.php` suffix.
    pub endpoint: String,
    pub text: String,
    /// One-line summary of the throughput lead, when it can be computed.
    pub finding: Option<String>,
    pub endpoint_type: EndpointKind,
}

pub fn build_interpretations(
    records: &[BenchmarkRecord],
    servers: &ServerPair,
    texts: &Texts,
) -> Vec<Interpretation> {
    interpretations_for(&group_by_endpoint(records), servers, texts)
}

pub(crate) fn interpretations_for(
    groups: &EndpointGroups<'_>,
    servers: &ServerPair,
    texts: &Texts,
) -> Vec<Interpretation> {
    groups
        .iter()
        .map(|(endpoint, group)| {
            let contenders = contenders(group, servers);
            let req_winner = throughput_winner(&contenders);
            let lat_winner = latency_winner(&contenders);

            let mut parts = Vec::with_capacity(3);
            parts.push(fill(
                &texts.interp_compare,
                &[
                    ("req_winner", label(req_winner)),
                    ("lat_winner", label(lat_winner)),
                ],
            ));

            // with no contenders there is no winner to recommend
            match (req_winner, lat_winner) {
                (None, None) => {}
                (r, l) if r == l => parts.push(fill(
                    &texts.interp_consistent,
                    &[("winner", label(r))],
                )),
                _ => parts.push(texts.interp_tradeoff.clone()),
            }

            let p99_max = contenders
                .iter()
                .filter_map(|(_, r)| r.latency_p99_ms)
                .reduce(f64::max);
            match p99_max {
                Some(max) if max >= TAIL_LATENCY_MS => parts.push(texts.interp_tail.clone()),
                Some(_) => {}
                None => parts.push(texts.interp_p99_missing.clone()),
            }

            Interpretation {
                endpoint: endpoint_label(endpoint).to_string(),
                text: parts.join(" "),
                finding: finding(group, servers, texts),
                endpoint_type: EndpointKind::from_endpoint(endpoint),
            }
        })
        .collect()
}

fn label(server: Option<&Server>) -> &str {
    server.map(|s| s.label.as_str()).unwrap_or(NOT_APPLICABLE)
}

/// The throughput winner's lead over the other server, relative to the
/// other server. Requires both records and a positive losing throughput.
fn finding(group: &[&BenchmarkRecord], servers: &ServerPair, texts: &Texts) -> Option<String> {
    let primary = lookup(group, &servers.primary.id)?;
    let baseline = lookup(group, &servers.baseline.id)?;

    let (winner, lead) = if primary.requests_sec >= baseline.requests_sec {
        (
            &servers.primary,
            relative_delta(primary.requests_sec, baseline.requests_sec)?,
        )
    } else {
        (
            &servers.baseline,
            relative_delta(baseline.requests_sec, primary.requests_sec)?,
        )
    };

    let lead = format!("{lead:.1}");
    Some(fill(
        &texts.interp_finding,
        &[("winner", winner.label.as_str()), ("delta", lead.as_str())],
    ))
}
