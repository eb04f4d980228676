//! JAX-RS `@Path` resources.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::{annotation_paths, class_decl_offset, controller_name, Detector};
use crate::findings::{line_of_offset, RawFinding};

static PATH_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@Path\s*\(([^)]*)\)").unwrap());
static VERB_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(GET|POST|PUT|DELETE|PATCH|HEAD|OPTIONS)\b").unwrap());

/// How far around a method-level `@Path` we look for the verb annotation.
const VERB_WINDOW: usize = 200;

pub(crate) struct JaxrsPath;

impl Detector for JaxrsPath {
    fn tag(&self) -> &'static str {
        "jaxrs-path"
    }

    fn detect(&self, origin: &str, text: &str) -> Result<Vec<RawFinding>> {
        if !text.contains("@Path") {
            return Ok(Vec::new());
        }

        let controller = controller_name(origin, text);
        let class_offset = class_decl_offset(text);
        let mut base_path = String::new();
        let mut findings = Vec::new();

        for caps in PATH_ANNOTATION.captures_iter(text) {
            let whole = caps.get(0).expect("group 0");
            let exprs = annotation_paths(&caps[1]);
            let class_level = class_offset.map(|off| whole.start() < off).unwrap_or(false);
            let line = line_of_offset(text, whole.start());

            if class_level {
                if let Some(expr) = exprs.into_iter().next() {
                    // The resource root is itself reachable.
                    findings.push(RawFinding {
                        endpoint: expr.clone(),
                        method: "ALL".to_string(),
                        controller: controller.clone(),
                        base_path: String::new(),
                        source_tag: self.tag(),
                        origin: origin.to_string(),
                        line,
                        extra: None,
                    });
                    base_path = expr;
                }
                continue;
            }

            let method = verb_near(text, whole.start(), whole.end());
            for expr in exprs {
                findings.push(RawFinding {
                    endpoint: expr,
                    method: method.clone(),
                    controller: controller.clone(),
                    base_path: base_path.clone(),
                    source_tag: self.tag(),
                    origin: origin.to_string(),
                    line,
                    extra: None,
                });
            }
        }
        Ok(findings)
    }
}

/// Verb annotation adjacent to a method-level `@Path`; JAX-RS allows it
/// on either side, so both directions are scanned.
fn verb_near(text: &str, start: usize, end: usize) -> String {
    let mut lo = start.saturating_sub(VERB_WINDOW);
    while lo > 0 && !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + VERB_WINDOW).min(text.len());
    while hi < text.len() && !text.is_char_boundary(hi) {
        hi += 1;
    }
    // Nearest verb above wins; otherwise the first one below.
    if let Some(caps) = VERB_ANNOTATION.captures_iter(&text[lo..start]).last() {
        return caps[1].to_string();
    }
    VERB_ANNOTATION
        .captures(&text[end..hi])
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "ALL".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESOURCE: &str = r#"
@Path("/orders")
public class OrderResource {

    @GET
    @Path("/{id}")
    public Order one(@PathParam("id") long id) { return find(id); }

    @POST
    @Path(ORDERS_BULK)
    public void bulk(List<Order> orders) { saveAll(orders); }
}
"#;

    fn detect(text: &str) -> Vec<RawFinding> {
        JaxrsPath.detect("src/OrderResource.java", text).unwrap()
    }

    #[test]
    fn class_path_becomes_base_for_method_paths() {
        let findings = detect(RESOURCE);
        assert_eq!(findings.len(), 3);
        assert_eq!(findings[0].endpoint, r#""/orders""#);
        assert_eq!(findings[0].method, "ALL");
        assert_eq!(findings[1].base_path, r#""/orders""#);
        assert_eq!(findings[1].endpoint, r#""/{id}""#);
        assert_eq!(findings[1].method, "GET");
    }

    #[test]
    fn constant_path_stays_symbolic() {
        let findings = detect(RESOURCE);
        assert_eq!(findings[2].endpoint, "ORDERS_BULK");
        assert_eq!(findings[2].method, "POST");
    }

    #[test]
    fn no_annotation_no_findings() {
        assert!(detect("class Plain {}").is_empty());
    }
}
