//! Detection strategies.
//!
//! Each strategy is a named, stateless capability over one routing idiom.
//! The registry is a fixed ordered list built once at process start; new
//! idioms are added by extending [`default_registry`], never by ambient
//! discovery.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::findings::RawFinding;

mod actuator;
mod cors;
mod jaxrs;
mod security;
mod servlet;
mod spring;
mod struts;
mod views;
mod web_xml;
mod webflux;

/// One pattern-detection strategy. Implementations must be pure over their
/// input: no shared mutable state, so the orchestrator may fan invocations
/// out across threads.
pub trait Detector: Send + Sync {
    /// Stable identifier recorded as `source_tag` on every finding.
    fn tag(&self) -> &'static str;

    /// Scan one decoded unit. An `Err` is isolated per (unit, detector)
    /// pair by the orchestrator and contributes zero findings.
    fn detect(&self, origin: &str, text: &str) -> Result<Vec<RawFinding>>;
}

/// The built-in strategies, in a fixed order.
pub fn default_registry() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(spring::SpringAnnotations),
        Box::new(jaxrs::JaxrsPath),
        Box::new(servlet::ServletRegistration),
        Box::new(webflux::WebfluxRoutes),
        Box::new(web_xml::WebXml),
        Box::new(struts::StrutsConfig),
        Box::new(views::ViewTemplates),
        Box::new(security::SecurityMatchers),
        Box::new(actuator::ActuatorEndpoints),
        Box::new(cors::CorsMappings),
    ]
}

static ATTR_ARRAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:value|path|urlPatterns)\s*=\s*\{([^}]*)\}"#).unwrap()
});
static ATTR_SINGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:value|path|urlPatterns)\s*=\s*([^,{][^,]*)"#).unwrap()
});
// Anchored to a declaration so the word "class" in prose or strings
// does not produce a controller name.
static CLASS_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s*(?:(?:public|protected|private|final|abstract|static)\s+)*class\s+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .unwrap()
});

/// Extract raw path expressions from annotation arguments.
///
/// Handles the common Java attribute shapes: a leading positional literal
/// or constant reference, `value =`/`path =`/`urlPatterns =` with a single
/// expression, and brace-delimited arrays. Returned expressions are left
/// unevaluated (quotes, `+` concatenation, constant names) for the
/// composer to resolve; an empty mapping collapses to `"/"` so the
/// finding still names the enclosing base path.
pub(crate) fn annotation_paths(args: &str) -> Vec<String> {
    let args = args.trim();
    let exprs: Vec<String> = if let Some(caps) = ATTR_ARRAY.captures(args) {
        caps[1]
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    } else if let Some(caps) = ATTR_SINGLE.captures(args) {
        vec![caps[1].trim().to_string()]
    } else if let Some(inner) = args.strip_prefix('{') {
        // Positional array: split inside the braces, not before them.
        inner
            .split('}')
            .next()
            .unwrap_or("")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    } else {
        // Positional form: everything up to the first top-level comma.
        let head = args.split(',').next().unwrap_or("").trim();
        if head.is_empty() || head.contains('=') {
            Vec::new()
        } else {
            vec![head.to_string()]
        }
    };
    if exprs.is_empty() {
        vec!["/".to_string()]
    } else {
        exprs
    }
}

/// First declared class name, or the origin's file stem as a fallback
/// controller identity.
pub(crate) fn controller_name(origin: &str, text: &str) -> String {
    if let Some(caps) = CLASS_DECL.captures(text) {
        return caps[1].to_string();
    }
    file_stem(origin)
}

/// Byte offset of the first class declaration, if any. Annotations before
/// it are class-level, annotations after it are method-level.
pub(crate) fn class_decl_offset(text: &str) -> Option<usize> {
    CLASS_DECL.find(text).map(|m| m.start())
}

/// File stem of an origin, archive-member aware.
pub(crate) fn file_stem(origin: &str) -> String {
    let tail = origin.rsplit(['/', '\\', '!']).next().unwrap_or(origin);
    tail.rsplit_once('.')
        .map(|(stem, _)| stem.to_string())
        .unwrap_or_else(|| tail.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_literal() {
        assert_eq!(annotation_paths(r#""/users""#), vec![r#""/users""#]);
    }

    #[test]
    fn named_value_attribute() {
        assert_eq!(
            annotation_paths(r#"value = "/users", method = RequestMethod.GET"#),
            vec![r#""/users""#]
        );
    }

    #[test]
    fn array_of_paths() {
        assert_eq!(
            annotation_paths(r#"path = {"/a", "/b"}"#),
            vec![r#""/a""#, r#""/b""#]
        );
    }

    #[test]
    fn positional_array_keeps_every_path() {
        assert_eq!(
            annotation_paths(r#"{"/a", "/b"}"#),
            vec![r#""/a""#, r#""/b""#]
        );
    }

    #[test]
    fn constant_reference_survives_unevaluated() {
        assert_eq!(annotation_paths("USERS_PATH"), vec!["USERS_PATH"]);
        assert_eq!(
            annotation_paths(r#"value = USERS_PATH + "/{id}""#),
            vec![r#"USERS_PATH + "/{id}""#]
        );
    }

    #[test]
    fn empty_args_collapse_to_root() {
        assert_eq!(annotation_paths(""), vec!["/"]);
        assert_eq!(annotation_paths("method = RequestMethod.GET"), vec!["/"]);
    }

    #[test]
    fn controller_falls_back_to_file_stem() {
        assert_eq!(controller_name("a/b/Foo.java", "class Bar {}"), "Bar");
        assert_eq!(controller_name("a/b/Foo.java", "no class here"), "Foo");
        assert_eq!(
            controller_name("a/b/Foo.java", "// this class handles requests"),
            "Foo"
        );
        assert_eq!(
            controller_name("a/b/Foo.java", "  public final class Inner {}"),
            "Inner"
        );
        assert_eq!(file_stem("app.war!WEB-INF/web.xml"), "web");
    }
}
