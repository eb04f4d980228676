//! Crawl options and run statistics.

/// Options controlling a single crawl.
#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    /// Global context path prepended to every composed endpoint. When
    /// `None`, the crawl recovers `server.servlet.context-path` from any
    /// scanned `.properties`/`.yml` unit, falling back to no prefix.
    pub context_path: Option<String>,
    /// Bypass aggregation: one record per raw finding, path-composed but
    /// unmerged and unscored. Audit/debug surface, not the scored catalog.
    pub raw: bool,
    /// Maximum entry size in bytes; larger entries are skipped.
    pub max_file_size: Option<u64>,
    /// Worker threads: `None` means one per CPU core.
    pub threads: Option<usize>,
}

/// Counters surfaced in the end-of-run summary.
#[derive(Debug, Default, Clone)]
pub struct CrawlStats {
    pub units_scanned: usize,
    pub units_skipped: usize,
    pub detector_failures: usize,
    pub findings_dropped: usize,
    pub records_emitted: usize,
}
