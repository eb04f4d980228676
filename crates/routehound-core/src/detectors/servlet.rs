//! Servlet registrations: `@WebServlet`/`@WebFilter` annotations and the
//! programmatic `addServlet(...).addMapping(...)` /
//! `ServletRegistrationBean` idioms.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::{annotation_paths, Detector};
use crate::findings::{line_of_offset, RawFinding};

static WEB_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(WebServlet|WebFilter)\s*\(([^)]*)\)").unwrap());
static ADD_MAPPING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\.addMapping\s*\(\s*"([^"]+)""#).unwrap());
static ADD_SERVLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\.addServlet\s*\(\s*"([^"]+)""#).unwrap());
static REGISTRATION_BEAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"new\s+ServletRegistrationBean(?:<[^>]*>)?\s*\(\s*new\s+(\w+)\s*\(\s*\)\s*,\s*"([^"]+)""#)
        .unwrap()
});

/// Distance scanned back from `addMapping` for the `addServlet` call that
/// names the servlet.
const SERVLET_LOOKBEHIND: usize = 300;

pub(crate) struct ServletRegistration;

impl Detector for ServletRegistration {
    fn tag(&self) -> &'static str {
        "servlet-registration"
    }

    fn detect(&self, origin: &str, text: &str) -> Result<Vec<RawFinding>> {
        let mut findings = Vec::new();

        for caps in WEB_ANNOTATION.captures_iter(text) {
            let whole = caps.get(0).expect("group 0");
            let line = line_of_offset(text, whole.start());
            for expr in annotation_paths(&caps[2]) {
                findings.push(self.finding(origin, expr, String::new(), line));
            }
        }

        for caps in ADD_MAPPING.captures_iter(text) {
            let whole = caps.get(0).expect("group 0");
            let controller = servlet_name_behind(text, whole.start());
            let line = line_of_offset(text, whole.start());
            findings.push(self.finding(origin, quote(&caps[1]), controller, line));
        }

        for caps in REGISTRATION_BEAN.captures_iter(text) {
            let whole = caps.get(0).expect("group 0");
            let line = line_of_offset(text, whole.start());
            findings.push(self.finding(origin, quote(&caps[2]), caps[1].to_string(), line));
        }

        Ok(findings)
    }
}

impl ServletRegistration {
    fn finding(&self, origin: &str, endpoint: String, controller: String, line: usize) -> RawFinding {
        RawFinding {
            endpoint,
            method: "ALL".to_string(),
            controller,
            base_path: String::new(),
            source_tag: self.tag(),
            origin: origin.to_string(),
            line,
            extra: None,
        }
    }
}

fn quote(literal: &str) -> String {
    format!("\"{literal}\"")
}

fn servlet_name_behind(text: &str, offset: usize) -> String {
    let mut lo = offset.saturating_sub(SERVLET_LOOKBEHIND);
    while lo > 0 && !text.is_char_boundary(lo) {
        lo -= 1;
    }
    ADD_SERVLET
        .captures_iter(&text[lo..offset])
        .last()
        .map(|c| c[1].to_string())
        .unwrap_or_default()
}
