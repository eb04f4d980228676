//! Functional WebFlux router builders.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::{controller_name, Detector};
use crate::findings::{line_of_offset, RawFinding};

// `route(GET("/p"), …)`, `.andRoute(POST("/p"), …)`,
// `RequestPredicates.GET("/p")`, `.GET("/p", handler)`.
static PREDICATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(GET|POST|PUT|DELETE|PATCH|HEAD|OPTIONS)\s*\(\s*"([^"]+)""#).unwrap()
});

pub(crate) struct WebfluxRoutes;

impl Detector for WebfluxRoutes {
    fn tag(&self) -> &'static str {
        "webflux-routes"
    }

    fn detect(&self, origin: &str, text: &str) -> Result<Vec<RawFinding>> {
        // Uppercase predicate calls show up in plenty of non-router code;
        // only files that visibly build router functions are scanned.
        if !(text.contains("RouterFunction")
            || text.contains("RequestPredicates")
            || text.contains("andRoute"))
        {
            return Ok(Vec::new());
        }

        let controller = controller_name(origin, text);
        let mut findings = Vec::new();
        for caps in PREDICATE.captures_iter(text) {
            let whole = caps.get(0).expect("group 0");
            findings.push(RawFinding {
                endpoint: format!("\"{}\"", &caps[2]),
                method: caps[1].to_string(),
                controller: controller.clone(),
                base_path: String::new(),
                source_tag: self.tag(),
                origin: origin.to_string(),
                line: line_of_offset(text, whole.start()),
                extra: None,
            });
        }
        Ok(findings)
    }
}
