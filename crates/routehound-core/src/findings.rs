//! Raw detector observations.

/// One decoded input, ready for detection.
#[derive(Debug, Clone)]
pub(crate) struct TextUnit {
    /// Stable, human-readable identifier: a file path, or
    /// `archive.war!member/path` for an archive member.
    pub(crate) origin: String,
    pub(crate) text: String,
}

/// A single detector's observation of a candidate endpoint, before path
/// composition and aggregation. Ephemeral: produced per (detector, unit)
/// pair and consumed once by the aggregator.
#[derive(Debug, Clone)]
pub struct RawFinding {
    /// Path as observed; may contain unresolved symbolic tokens.
    pub endpoint: String,
    /// HTTP verb, or `ALL` when the idiom does not pin one down.
    pub method: String,
    /// Originating class/servlet name, empty when unknown.
    pub controller: String,
    /// Class-level or context-level fragment composed in front of
    /// `endpoint`, empty when the idiom has no hierarchy.
    pub base_path: String,
    /// Tag of the detector that produced this finding.
    pub source_tag: &'static str,
    /// Identifier of the scanned file or archive member.
    pub origin: String,
    /// Best-effort 1-based line number.
    pub line: usize,
    /// Detector-specific marker, e.g. an absent-authentication note.
    pub extra: Option<String>,
}

impl RawFinding {
    /// Required-field contract. A finding missing any of these is dropped
    /// by the orchestrator with a warning instead of being propagated.
    pub fn is_valid(&self) -> bool {
        !self.endpoint.is_empty()
            && !self.method.is_empty()
            && !self.source_tag.is_empty()
            && !self.origin.is_empty()
            && self.line >= 1
    }

    /// `origin:line` as rendered into `locations`.
    pub(crate) fn location(&self) -> String {
        format!("{}:{}", self.origin, self.line)
    }
}

/// 1-based line number of a byte offset into `text`.
pub(crate) fn line_of_offset(text: &str, offset: usize) -> usize {
    text[..offset.min(text.len())].bytes().filter(|&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding() -> RawFinding {
        RawFinding {
            endpoint: "/users".into(),
            method: "GET".into(),
            controller: String::new(),
            base_path: String::new(),
            source_tag: "spring-annotations",
            origin: "src/A.java".into(),
            line: 3,
            extra: None,
        }
    }

    #[test]
    fn required_fields_enforced() {
        assert!(finding().is_valid());
        let mut f = finding();
        f.endpoint.clear();
        assert!(!f.is_valid());
        let mut f = finding();
        f.line = 0;
        assert!(!f.is_valid());
    }

    #[test]
    fn line_of_offset_is_one_based() {
        let text = "a\nb\nc";
        assert_eq!(line_of_offset(text, 0), 1);
        assert_eq!(line_of_offset(text, 2), 2);
        assert_eq!(line_of_offset(text, 4), 3);
        assert_eq!(line_of_offset(text, 100), 3);
    }
}
