//! Static endpoint discovery for Java/Spring source trees.
//!
//! Walks directories, archives and files, decodes each entry, runs a
//! fixed registry of pattern detectors over the text, then composes and
//! aggregates the observations into a deduplicated, confidence-scored,
//! severity-classified endpoint catalog.
//!
//! Guarantees the pipeline is built around:
//! - a single buggy detector or unreadable file never aborts a run;
//! - composing the same path fragments always yields the same full path;
//! - aggregating the same findings in any order yields the same catalog.

mod aggregate;
mod compose;
mod constants;
mod decode;
mod detectors;
mod error;
mod findings;
mod options;
mod scan;
mod walk;

pub use aggregate::{
    AggregatedRecord, Severity, BASELINE_CONFIDENCE, CORROBORATED_CONFIDENCE, NO_AUTH_MARKER,
};
pub use compose::{compose_path, extract_params, resolve_constants, UNRESOLVED_PREFIX};
pub use detectors::{default_registry, Detector};
pub use error::CrawlError;
pub use findings::RawFinding;
pub use options::{CrawlOptions, CrawlStats};
pub use scan::{crawl, crawl_with_registry, CrawlReport};
