//! `@CrossOrigin` mappings.
//!
//! Reports Spring handler mappings that are CORS-exposed, either by a
//! class-level `@CrossOrigin` covering every handler or by a method-level
//! annotation next to the mapping. The allowed origins, when literal, are
//! carried in `extra`.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::{annotation_paths, class_decl_offset, controller_name, Detector};
use crate::findings::{line_of_offset, RawFinding};

static MAPPING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"@(GetMapping|PostMapping|PutMapping|DeleteMapping|PatchMapping|RequestMapping)\b(?:\s*\(([^)]*)\))?",
    )
    .unwrap()
});
static REQUEST_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"RequestMethod\.([A-Z]+)").unwrap());
static CROSS_ORIGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@CrossOrigin\b(?:\s*\(([^)]*)\))?").unwrap());
static ORIGINS_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"origins\s*=\s*\{?\s*"([^"]+)""#).unwrap());

/// Window scanned backwards from a mapping for a method-level
/// `@CrossOrigin` on the same handler.
const CORS_LOOKBEHIND: usize = 250;

pub(crate) struct CorsMappings;

impl Detector for CorsMappings {
    fn tag(&self) -> &'static str {
        "cors-mappings"
    }

    fn detect(&self, origin: &str, text: &str) -> Result<Vec<RawFinding>> {
        if !text.contains("@CrossOrigin") {
            return Ok(Vec::new());
        }

        let controller = controller_name(origin, text);
        let class_offset = class_decl_offset(text);
        let class_cors = CROSS_ORIGIN
            .captures_iter(text)
            .find(|caps| {
                let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
                class_offset.map(|off| start < off).unwrap_or(false)
            })
            .map(|caps| caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default());

        let mut base_path = String::new();
        let mut findings = Vec::new();

        for caps in MAPPING.captures_iter(text) {
            let whole = caps.get(0).expect("group 0");
            let name = &caps[1];
            let args = caps.get(2).map(|m| m.as_str()).unwrap_or("");

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

            // Method-level @CrossOrigin overrides the class-level one.
            let cors_args = cors_nearby(text, whole.start()).or_else(|| class_cors.clone());
            let Some(cors_args) = cors_args else {
                continue;
            };
            let extra = ORIGINS_ATTR
                .captures(&cors_args)
                .map(|c| format!("cors-origins={}", &c[1]));

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

/// Arguments of a method-level `@CrossOrigin` just before the mapping.
/// Another mapping annotation in between means the `@CrossOrigin`
/// belongs to the previous handler.
fn cors_nearby(text: &str, offset: usize) -> Option<String> {
    let mut lo = offset.saturating_sub(CORS_LOOKBEHIND);
    while lo > 0 && !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let window = &text[lo..offset];
    let caps = CROSS_ORIGIN.captures_iter(window).last()?;
    let cors_start = caps.get(0).expect("group 0").start();
    if MAPPING.find_iter(window).any(|m| m.start() > cors_start) {
        return None;
    }
    Some(caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_level_cross_origin_covers_every_handler() {
        let text = r#"
@CrossOrigin(origins = "https://app.example.com")
@RestController
@RequestMapping("/api/widgets")
public class WidgetController {
    @GetMapping
    public List<Widget> list() { return all(); }

    @PostMapping
    public Widget create(@RequestBody Widget w) { return save(w); }
}
"#;
        let findings = CorsMappings.detect("src/WidgetController.java", text).unwrap();
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.base_path == r#""/api/widgets""#));
        assert!(findings
            .iter()
            .all(|f| f.extra.as_deref() == Some("cors-origins=https://app.example.com")));
        assert_eq!(findings[0].method, "GET");
        assert_eq!(findings[1].method, "POST");
    }

    #[test]
    fn method_level_annotation_only_marks_its_handler() {
        let text = r#"
@RestController
public class MixedController {
    @CrossOrigin(origins = "*")
    @GetMapping("/open")
    public String open() { return "x"; }

    @GetMapping("/closed")
    public String closed() { return "y"; }
}
"#;
        let findings = CorsMappings.detect("src/MixedController.java", text).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].endpoint, r#""/open""#);
        assert_eq!(findings[0].extra.as_deref(), Some("cors-origins=*"));
    }

    #[test]
    fn bare_cross_origin_still_reports_the_mapping() {
        let text = r#"
@RestController
public class OpenController {
    @CrossOrigin
    @DeleteMapping("/widgets/{id}")
    public void remove(@PathVariable Long id) {}
}
"#;
        let findings = CorsMappings.detect("src/OpenController.java", text).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].method, "DELETE");
        assert_eq!(findings[0].extra, None);
    }

    #[test]
    fn files_without_cross_origin_yield_nothing() {
        let text = r#"
@RestController
public class PlainController {
    @GetMapping("/plain")
    public String plain() { return "x"; }
}
"#;
        assert!(CorsMappings.detect("src/P.java", text).unwrap().is_empty());
    }
}
