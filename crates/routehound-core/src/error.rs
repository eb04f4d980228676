//! Crawl error taxonomy.
//!
//! Only configuration-level problems are fatal. Everything underneath the
//! orchestration boundary (unreadable entries, detector panics turned into
//! errors, malformed findings) is recovered locally with a warning and
//! tracked in `CrawlStats`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can abort a crawl before any output is produced.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// No readable input at all, or an input argument that cannot be used.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// A recoverable per-entry ingestion failure. Logged and skipped, never
/// propagated past the walker.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("unreadable file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bad archive {path}: {reason}")]
    Archive { path: PathBuf, reason: String },
}
