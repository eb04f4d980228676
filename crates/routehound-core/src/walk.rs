//! Input enumeration: directories, archives, single files.
//!
//! Produces decoded `TextUnit`s. A single unreadable entry never aborts the
//! run: it is logged and counted, and the walk continues. Only a run with
//! zero readable units is fatal.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::decode::decode_bytes;
use crate::error::{CrawlError, IngestionError};
use crate::findings::TextUnit;
use crate::options::{CrawlOptions, CrawlStats};

/// Extensions worth decoding. Everything else is passed over silently:
/// binaries and build artifacts carry no routing idioms we scan for.
const SOURCE_EXTENSIONS: &[&str] = &[
    "java", "kt", "xml", "jsp", "jspx", "html", "ftl", "properties", "yml", "yaml",
];

const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "war", "jar"];

fn has_extension(path: &Path, set: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| set.iter().any(|s| e.eq_ignore_ascii_case(s)))
        .unwrap_or(false)
}

/// Expand every input into decoded text units.
pub(crate) fn collect_units(
    inputs: &[PathBuf],
    opts: &CrawlOptions,
    stats: &mut CrawlStats,
) -> Result<Vec<TextUnit>, CrawlError> {
    if inputs.is_empty() {
        return Err(CrawlError::Configuration("no input paths given".into()));
    }

    let mut units = Vec::new();
    for input in inputs {
        if input.is_dir() {
            collect_dir(input, opts, stats, &mut units);
        } else if has_extension(input, ARCHIVE_EXTENSIONS) {
            collect_archive(input, opts, stats, &mut units);
        } else if input.is_file() {
            collect_file(input, opts, stats, &mut units);
        } else {
            warn!(input = %input.display(), "input path does not exist, skipping");
            stats.units_skipped += 1;
        }
    }

    if units.is_empty() {
        return Err(CrawlError::Configuration(
            "no readable source units in any input".into(),
        ));
    }
    Ok(units)
}

fn collect_dir(dir: &Path, opts: &CrawlOptions, stats: &mut CrawlStats, units: &mut Vec<TextUnit>) {
    for entry in WalkDir::new(dir) {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!(%err, "walk error, skipping entry");
                stats.units_skipped += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if has_extension(path, ARCHIVE_EXTENSIONS) {
            collect_archive(path, opts, stats, units);
        } else if has_extension(path, SOURCE_EXTENSIONS) {
            collect_file(path, opts, stats, units);
        }
    }
}

fn collect_file(path: &Path, opts: &CrawlOptions, stats: &mut CrawlStats, units: &mut Vec<TextUnit>) {
    if let Some(max) = opts.max_file_size {
        if let Ok(md) = std::fs::metadata(path) {
            if md.len() > max {
                stats.units_skipped += 1;
                return;
            }
        }
    }
    match std::fs::read(path) {
        Ok(raw) => units.push(TextUnit {
            origin: path.display().to_string(),
            text: decode_bytes(&raw),
        }),
        Err(source) => {
            let err = IngestionError::Read {
                path: path.to_path_buf(),
                source,
            };
            warn!(%err, "skipping");
            stats.units_skipped += 1;
        }
    }
}

/// Expand a zip-shaped archive (`.zip`/`.war`/`.jar`) into member units.
/// Member origins are `archive!member` so locations stay human-readable.
fn collect_archive(
    path: &Path,
    opts: &CrawlOptions,
    stats: &mut CrawlStats,
    units: &mut Vec<TextUnit>,
) {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(source) => {
            let err = IngestionError::Read {
                path: path.to_path_buf(),
                source,
            };
            warn!(%err, "skipping");
            stats.units_skipped += 1;
            return;
        }
    };
    let mut archive = match zip::ZipArchive::new(file) {
        Ok(a) => a,
        Err(source) => {
            let err = IngestionError::Archive {
                path: path.to_path_buf(),
                reason: source.to_string(),
            };
            warn!(%err, "skipping");
            stats.units_skipped += 1;
            return;
        }
    };

    for i in 0..archive.len() {
        let mut member = match archive.by_index(i) {
            Ok(m) => m,
            Err(err) => {
                warn!(path = %path.display(), index = i, %err, "bad archive member, skipping");
                stats.units_skipped += 1;
                continue;
            }
        };
        if member.is_dir() {
            continue;
        }
        let name = member.name().to_string();
        if !has_extension(Path::new(&name), SOURCE_EXTENSIONS) {
            continue;
        }
        if let Some(max) = opts.max_file_size {
            if member.size() > max {
                stats.units_skipped += 1;
                continue;
            }
        }
        let mut raw = Vec::with_capacity(member.size() as usize);
        if let Err(err) = member.read_to_end(&mut raw) {
            warn!(path = %path.display(), member = %name, %err, "unreadable member, skipping");
            stats.units_skipped += 1;
            continue;
        }
        units.push(TextUnit {
            origin: format!("{}!{}", path.display(), name),
            text: decode_bytes(&raw),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert!(has_extension(Path::new("A.JAVA"), SOURCE_EXTENSIONS));
        assert!(has_extension(Path::new("app.War"), ARCHIVE_EXTENSIONS));
        assert!(!has_extension(Path::new("a.class"), SOURCE_EXTENSIONS));
        assert!(!has_extension(Path::new("Makefile"), SOURCE_EXTENSIONS));
    }

    #[test]
    fn empty_inputs_are_a_configuration_error() {
        let mut stats = CrawlStats::default();
        let err = collect_units(&[], &CrawlOptions::default(), &mut stats);
        assert!(matches!(err, Err(CrawlError::Configuration(_))));
    }

    #[test]
    fn missing_path_alone_is_fatal_but_counted() {
        let mut stats = CrawlStats::default();
        let err = collect_units(
            &[PathBuf::from("/nonexistent/rh-test")],
            &CrawlOptions::default(),
            &mut stats,
        );
        assert!(matches!(err, Err(CrawlError::Configuration(_))));
        assert_eq!(stats.units_skipped, 1);
    }
}
