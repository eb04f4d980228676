//! Crawl pipeline driver and parallel detector fan-out.
//!
//! Every (unit, detector) pair is independent, so detection runs across a
//! rayon pool with results funneled through a bounded channel into a
//! single collector. Per-pair failures are contained: a detector error or
//! a malformed finding costs exactly that pair its findings, nothing else.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::aggregate::{
    aggregate, compose_finding, raw_records, sort_records, suppress_covered_wildcards,
    AggregatedRecord, ComposedFinding,
};
use crate::constants::{collect_constants, context_path_from_units};
use crate::detectors::{default_registry, Detector};
use crate::error::CrawlError;
use crate::findings::{RawFinding, TextUnit};
use crate::options::{CrawlOptions, CrawlStats};
use crate::walk::collect_units;

/// Result of one crawl: the sorted catalog plus run counters.
#[derive(Debug)]
pub struct CrawlReport {
    pub records: Vec<AggregatedRecord>,
    pub stats: CrawlStats,
}

/// Crawl with the built-in detector registry.
pub fn crawl(inputs: &[PathBuf], opts: &CrawlOptions) -> Result<CrawlReport, CrawlError> {
    crawl_with_registry(inputs, opts, &default_registry())
}

/// Crawl with an explicit registry. The registry is immutable for the
/// run; callers extend detection by building their own list.
pub fn crawl_with_registry(
    inputs: &[PathBuf],
    opts: &CrawlOptions,
    registry: &[Box<dyn Detector>],
) -> Result<CrawlReport, CrawlError> {
    let mut stats = CrawlStats::default();
    let units = collect_units(inputs, opts, &mut stats)?;
    stats.units_scanned = units.len();

    let constants = collect_constants(&units);
    let context_path = opts
        .context_path
        .clone()
        .or_else(|| context_path_from_units(&units))
        .unwrap_or_default();

    let findings = run_detectors(&units, registry, opts, &mut stats);
    let composed: Vec<ComposedFinding> = findings
        .into_iter()
        .map(|f| compose_finding(f, &context_path, &constants))
        .collect();

    let mut records = if opts.raw {
        raw_records(composed)
    } else {
        suppress_covered_wildcards(aggregate(composed))
    };
    sort_records(&mut records);
    stats.records_emitted = records.len();

    info!(
        units_scanned = stats.units_scanned,
        units_skipped = stats.units_skipped,
        detector_failures = stats.detector_failures,
        findings_dropped = stats.findings_dropped,
        records = stats.records_emitted,
        "crawl complete"
    );
    Ok(CrawlReport { records, stats })
}

/// Apply every registered detector to every unit.
fn run_detectors(
    units: &[TextUnit],
    registry: &[Box<dyn Detector>],
    opts: &CrawlOptions,
    stats: &mut CrawlStats,
) -> Vec<RawFinding> {
    let threads = opts.threads.unwrap_or_else(num_cpus::get).max(1);
    if threads == 1 || units.len() < 2 {
        let mut findings = Vec::new();
        for unit in units {
            let (mut found, failures, dropped) = detect_unit(unit, registry);
            findings.append(&mut found);
            stats.detector_failures += failures;
            stats.findings_dropped += dropped;
        }
        return findings;
    }

    // Workers fan out over units; the collector on this thread drains the
    // channel until every sender is gone.
    type Msg = (Vec<RawFinding>, usize, usize);
    let (tx, rx) = crossbeam_channel::bounded::<Msg>(256);
    let mut findings = Vec::new();

    std::thread::scope(|scope| {
        scope.spawn(move || {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .expect("build rayon pool");
            pool.install(|| {
                use rayon::prelude::*;
                units.par_iter().for_each_with(tx, |tx, unit| {
                    let _ = tx.send(detect_unit(unit, registry));
                });
            });
        });

        while let Ok((mut found, failures, dropped)) = rx.recv() {
            findings.append(&mut found);
            stats.detector_failures += failures;
            stats.findings_dropped += dropped;
        }
    });
    findings
}

/// Run the full registry against one unit, isolating each detector.
/// Returns (valid findings, detector failures, malformed drops).
fn detect_unit(unit: &TextUnit, registry: &[Box<dyn Detector>]) -> (Vec<RawFinding>, usize, usize) {
    let mut findings = Vec::new();
    let mut failures = 0;
    let mut dropped = 0;
    for detector in registry {
        match detector.detect(&unit.origin, &unit.text) {
            Ok(records) => {
                for record in records {
                    if record.is_valid() {
                        findings.push(record);
                    } else {
                        warn!(
                            tag = detector.tag(),
                            origin = %unit.origin,
                            "malformed finding dropped"
                        );
                        dropped += 1;
                    }
                }
            }
            Err(err) => {
                warn!(
                    tag = detector.tag(),
                    origin = %unit.origin,
                    %err,
                    "detector failed, ignoring this unit for it"
                );
                failures += 1;
            }
        }
    }
    (findings, failures, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct AlwaysFails;
    impl Detector for AlwaysFails {
        fn tag(&self) -> &'static str {
            "always-fails"
        }
        fn detect(&self, _origin: &str, _text: &str) -> anyhow::Result<Vec<RawFinding>> {
            Err(anyhow!("intentional failure"))
        }
    }

    struct EmitsMalformed;
    impl Detector for EmitsMalformed {
        fn tag(&self) -> &'static str {
            "emits-malformed"
        }
        fn detect(&self, origin: &str, _text: &str) -> anyhow::Result<Vec<RawFinding>> {
            Ok(vec![RawFinding {
                endpoint: String::new(),
                method: "GET".into(),
                controller: String::new(),
                base_path: String::new(),
                source_tag: "emits-malformed",
                origin: origin.into(),
                line: 1,
                extra: None,
            }])
        }
    }

    fn unit(origin: &str, text: &str) -> TextUnit {
        TextUnit {
            origin: origin.into(),
            text: text.into(),
        }
    }

    #[test]
    fn failing_detector_does_not_suppress_siblings() {
        let mut registry: Vec<Box<dyn Detector>> = vec![Box::new(AlwaysFails)];
        registry.push(crate::detectors::default_registry().remove(0));
        let units = [unit(
            "A.java",
            "@RestController\nclass A {\n@GetMapping(\"/ok\")\nvoid f() {}\n}",
        )];
        let (findings, failures, dropped) = detect_unit(&units[0], &registry);
        assert_eq!(failures, 1);
        assert_eq!(dropped, 0);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].endpoint, r#""/ok""#);
    }

    #[test]
    fn malformed_findings_are_dropped_and_counted() {
        let registry: Vec<Box<dyn Detector>> = vec![Box::new(EmitsMalformed)];
        let (findings, failures, dropped) = detect_unit(&unit("A.java", "x"), &registry);
        assert!(findings.is_empty());
        assert_eq!(failures, 0);
        assert_eq!(dropped, 1);
    }
}
