//! Spring MVC mapping annotations.
//!
//! Covers class-level `@RequestMapping` base paths, the method-level
//! mapping shortcuts, `method = RequestMethod.X` overrides, path arrays,
//! constant references, and nearby permit-all markers.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::{annotation_paths, class_decl_offset, controller_name, Detector};
use crate::aggregate::NO_AUTH_MARKER;
use crate::findings::{line_of_offset, RawFinding};

static MAPPING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"@(GetMapping|PostMapping|PutMapping|DeleteMapping|PatchMapping|RequestMapping)\b(?:\s*\(([^)]*)\))?",
    )
    .unwrap()
});
static REQUEST_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"RequestMethod\.([A-Z]+)").unwrap());

/// Window scanned backwards from a mapping for an authentication bypass
/// marker sitting on the same handler.
const AUTH_LOOKBEHIND: usize = 250;

pub(crate) struct SpringAnnotations;

impl Detector for SpringAnnotations {
    fn tag(&self) -> &'static str {
        "spring-annotations"
    }

    fn detect(&self, origin: &str, text: &str) -> Result<Vec<RawFinding>> {
        if !text.contains("Mapping") {
            return Ok(Vec::new());
        }

        let controller = controller_name(origin, text);
        let class_offset = class_decl_offset(text);
        let mut base_path = String::new();
        let mut findings = Vec::new();

        for caps in MAPPING.captures_iter(text) {
            let whole = caps.get(0).expect("group 0");
            let name = &caps[1];
            let args = caps.get(2).map(|m| m.as_str()).unwrap_or("");

            // A @RequestMapping ahead of the class declaration is the
            // class-level prefix, not an endpoint of its own.
            let class_level = name == "RequestMapping"
                && class_offset.map(|off| whole.start() < off).unwrap_or(false);
            if class_level {
                if let Some(expr) = annotation_paths(args).into_iter().next() {
                    if expr != "/" {
                        base_path = expr;
                    }
                }
                continue;
            }

            let methods: Vec<String> = if name == "RequestMapping" {
                let verbs: Vec<String> = REQUEST_METHOD
                    .captures_iter(args)
                    .map(|c| c[1].to_string())
                    .collect();
                if verbs.is_empty() {
                    vec!["ALL".to_string()]
                } else {
                    verbs
                }
            } else {
                vec![name.trim_end_matches("Mapping").to_uppercase()]
            };

            let line = line_of_offset(text, whole.start());
            let extra = permit_all_nearby(text, whole.start());
            for expr in annotation_paths(args) {
                for method in &methods {
                    findings.push(RawFinding {
                        endpoint: expr.clone(),
                        method: method.clone(),
                        controller: controller.clone(),
                        base_path: base_path.clone(),
                        source_tag: self.tag(),
                        origin: origin.to_string(),
                        line,
                        extra: extra.clone(),
                    });
                }
            }
        }
        Ok(findings)
    }
}

fn permit_all_nearby(text: &str, offset: usize) -> Option<String> {
    let start = offset.saturating_sub(AUTH_LOOKBEHIND);
    // Clamp to a char boundary; the window start is best-effort anyway.
    let mut start = start;
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    let window = &text[start..offset];
    if window.contains("@PermitAll")
        || window.contains("permitAll()")
        || window.contains("@AllowAnonymous")
    {
        Some(NO_AUTH_MARKER.to_string())
    } else {
        None
    }
}
