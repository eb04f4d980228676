//! Grouping, confidence scoring, severity classification.
//!
//! Aggregation is idempotent: the same multiset of findings produces the
//! same records no matter how the input is ordered, because every derived
//! collection is a stable sort over a set union and the representative
//! controller is chosen lexicographically rather than by arrival order.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;

use crate::compose::{compose_path, extract_params, resolve_constants};
use crate::findings::RawFinding;

/// Confidence assigned when a single detector tag supports the endpoint.
pub const BASELINE_CONFIDENCE: u8 = 50;
/// Confidence when two or more independent detector tags corroborate.
pub const CORROBORATED_CONFIDENCE: u8 = 100;

/// Marker detectors put in `extra` when a mapping is reachable without
/// authentication.
pub const NO_AUTH_MARKER: &str = "no-auth";

/// Heuristic risk classification of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => write!(f, "HIGH"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::Low => write!(f, "LOW"),
        }
    }
}

/// One row of the final catalog.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedRecord {
    pub endpoint: String,
    pub method: String,
    pub confidence: u8,
    pub severity: Severity,
    pub params: Vec<String>,
    pub controller: String,
    pub sources: Vec<String>,
    pub locations: Vec<String>,
}

/// A finding whose path has been composed and whose symbolic tokens have
/// been resolved. Identity lives in `method`/`full_path`.
#[derive(Debug, Clone)]
pub(crate) struct ComposedFinding {
    pub(crate) finding: RawFinding,
    pub(crate) method: String,
    pub(crate) full_path: String,
}

/// Compose one raw finding against the global context path and constant
/// table. Total: symbolic tokens that stay unresolved are kept under a
/// marker, and the method falls back to `ALL` rather than being dropped.
pub(crate) fn compose_finding(
    finding: RawFinding,
    context_path: &str,
    constants: &HashMap<String, String>,
) -> ComposedFinding {
    let endpoint = resolve_constants(&finding.endpoint, constants);
    let base = resolve_constants(&finding.base_path, constants);
    let full_path = compose_path(context_path, &base, &endpoint);
    let method = finding.method.trim().to_uppercase();
    let method = if method.is_empty() { "ALL".to_string() } else { method };
    ComposedFinding {
        finding,
        method,
        full_path,
    }
}

/// Fold composed findings into one record per `(method, full_path)`.
pub(crate) fn aggregate(composed: Vec<ComposedFinding>) -> Vec<AggregatedRecord> {
    // BTreeMap keeps the grouping itself order-independent.
    let mut groups: BTreeMap<(String, String), Vec<ComposedFinding>> = BTreeMap::new();
    for c in composed {
        groups
            .entry((c.method.clone(), c.full_path.clone()))
            .or_default()
            .push(c);
    }

    let mut records = Vec::with_capacity(groups.len());
    for ((method, full_path), members) in groups {
        let sources: BTreeSet<String> = members
            .iter()
            .map(|m| m.finding.source_tag.to_string())
            .collect();
        let locations: BTreeSet<String> =
            members.iter().map(|m| m.finding.location()).collect();
        let controller = members
            .iter()
            .map(|m| m.finding.controller.as_str())
            .filter(|c| !c.is_empty())
            .min()
            .unwrap_or("")
            .to_string();
        let no_auth = members
            .iter()
            .any(|m| m.finding.extra.as_deref() == Some(NO_AUTH_MARKER));
        let confidence = if sources.len() >= 2 {
            CORROBORATED_CONFIDENCE
        } else {
            BASELINE_CONFIDENCE
        };

        records.push(AggregatedRecord {
            params: extract_params(&full_path),
            severity: classify_severity(&method, no_auth),
            endpoint: full_path,
            method,
            confidence,
            controller,
            sources: sources.into_iter().collect(),
            locations: locations.into_iter().collect(),
        });
    }
    records
}

/// Raw mode: one record per finding, path-composed but unmerged.
pub(crate) fn raw_records(composed: Vec<ComposedFinding>) -> Vec<AggregatedRecord> {
    composed
        .into_iter()
        .map(|c| {
            let no_auth = c.finding.extra.as_deref() == Some(NO_AUTH_MARKER);
            AggregatedRecord {
                params: extract_params(&c.full_path),
                severity: classify_severity(&c.method, no_auth),
                endpoint: c.full_path,
                confidence: BASELINE_CONFIDENCE,
                controller: c.finding.controller.clone(),
                sources: vec![c.finding.source_tag.to_string()],
                locations: vec![c.finding.location()],
                method: c.method,
            }
        })
        .collect()
}

/// Deterministic renderer-facing order: method, then path. Locations
/// break ties so raw-mode output is reproducible regardless of the
/// order findings arrived from the workers.
pub(crate) fn sort_records(records: &mut [AggregatedRecord]) {
    records.sort_by(|a, b| {
        a.method
            .cmp(&b.method)
            .then_with(|| a.endpoint.cmp(&b.endpoint))
            .then_with(|| a.locations.cmp(&b.locations))
    });
}

/// Drop wildcard records already covered by a concrete one: a record
/// whose endpoint ends in `*` adds nothing when some non-wildcard
/// endpoint starts with its prefix.
pub(crate) fn suppress_covered_wildcards(
    records: Vec<AggregatedRecord>,
) -> Vec<AggregatedRecord> {
    let concrete: Vec<String> = records
        .iter()
        .filter(|r| !r.endpoint.contains('*'))
        .map(|r| r.endpoint.clone())
        .collect();
    records
        .into_iter()
        .filter(|r| {
            if !r.endpoint.contains('*') {
                return true;
            }
            let prefix = r.endpoint.trim_end_matches('*');
            !concrete.iter().any(|e| e.starts_with(prefix))
        })
        .collect()
}

/// Pure function of the normalized method and observed auth markers.
fn classify_severity(method: &str, no_auth: bool) -> Severity {
    if no_auth {
        return Severity::High;
    }
    match method {
        "DELETE" | "PATCH" => Severity::High,
        "POST" | "PUT" => Severity::Medium,
        _ => Severity::Low,
    }
}
