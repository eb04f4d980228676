//! Spring Boot Actuator endpoints.
//!
//! Four idioms surface actuator paths: `@Endpoint(id = …)` classes with
//! their operation annotations, `management.endpoints.web.exposure.include`
//! lists in properties or YAML, and security config referencing
//! `EndpointRequest.to(XEndpoint.class)`. The base path defaults to
//! `/actuator` and can be overridden per configuration unit.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::{controller_name, Detector};
use crate::findings::{line_of_offset, RawFinding};

static ENDPOINT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"@Endpoint\s*\(\s*id\s*=\s*"(\w+)""#).unwrap());
static PROPS_BASE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*management\.endpoints\.web\.base-path\s*=\s*(\S+)").unwrap()
});
static YAML_BASE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*base-path\s*:\s*(\S+)").unwrap());
static PROPS_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*management\.endpoints\.web\.exposure\.include\s*=\s*(.+)$").unwrap()
});
static YAML_EXPOSURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*exposure\s*:\s*$").unwrap());
static YAML_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*include\s*:\s*(.+)$").unwrap());
static ENDPOINT_REQUEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"EndpointRequest\.to\(\s*(\w+)Endpoint\.class\s*\)").unwrap());

const DEFAULT_BASE: &str = "/actuator";
/// Window after `@Endpoint` scanned for operation annotations.
const OPERATION_WINDOW: usize = 200;

pub(crate) struct ActuatorEndpoints;

impl Detector for ActuatorEndpoints {
    fn tag(&self) -> &'static str {
        "actuator-endpoints"
    }

    fn detect(&self, origin: &str, text: &str) -> Result<Vec<RawFinding>> {
        if !(text.contains("@Endpoint")
            || text.contains("management.endpoints")
            || text.contains("EndpointRequest")
            || (is_yaml(origin) && text.contains("exposure")))
        {
            return Ok(Vec::new());
        }

        let base = base_path(origin, text);
        let mut findings = Vec::new();

        for caps in ENDPOINT_ID.captures_iter(text) {
            let whole = caps.get(0).expect("group 0");
            findings.push(RawFinding {
                endpoint: format!("\"{}/{}\"", base, &caps[1]),
                method: operation_verb(text, whole.end()),
                controller: controller_name(origin, text),
                base_path: String::new(),
                source_tag: self.tag(),
                origin: origin.to_string(),
                line: line_of_offset(text, whole.start()),
                extra: None,
            });
        }

        if is_properties(origin) {
            for caps in PROPS_INCLUDE.captures_iter(text) {
                let whole = caps.get(0).expect("group 0");
                let line = line_of_offset(text, whole.start());
                for id in caps[1].split(',') {
                    findings.push(self.exposure(origin, &base, id, line));
                }
            }
        } else if is_yaml(origin) {
            for (id, line) in yaml_exposure_includes(text) {
                findings.push(self.exposure(origin, &base, &id, line));
            }
        }

        for caps in ENDPOINT_REQUEST.captures_iter(text) {
            let whole = caps.get(0).expect("group 0");
            findings.push(RawFinding {
                endpoint: format!("\"{}/{}\"", base, lower_camel(&caps[1])),
                method: "ALL".to_string(),
                controller: String::new(),
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

impl ActuatorEndpoints {
    fn exposure(&self, origin: &str, base: &str, id: &str, line: usize) -> RawFinding {
        RawFinding {
            endpoint: format!("\"{}/{}\"", base, id.trim()),
            method: "ALL".to_string(),
            controller: String::new(),
            base_path: String::new(),
            source_tag: self.tag(),
            origin: origin.to_string(),
            line,
            extra: None,
        }
    }
}

fn is_properties(origin: &str) -> bool {
    origin.to_ascii_lowercase().ends_with(".properties")
}

fn is_yaml(origin: &str) -> bool {
    let lower = origin.to_ascii_lowercase();
    lower.ends_with(".yml") || lower.ends_with(".yaml")
}

/// Configured actuator base path of this unit, default `/actuator`.
/// Only the unit's own configuration can override it.
fn base_path(origin: &str, text: &str) -> String {
    let caps = if is_properties(origin) {
        PROPS_BASE_PATH.captures(text)
    } else if is_yaml(origin) {
        YAML_BASE_PATH.captures(text)
    } else {
        None
    };
    caps.map(|c| c[1].trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_BASE.to_string())
}

/// Verb implied by the single operation annotation following the
/// `@Endpoint` declaration; ambiguous or absent operations stay `ALL`.
fn operation_verb(text: &str, offset: usize) -> String {
    let mut hi = (offset + OPERATION_WINDOW).min(text.len());
    while hi < text.len() && !text.is_char_boundary(hi) {
        hi += 1;
    }
    let window = &text[offset..hi];
    let verbs: Vec<&str> = [
        ("@ReadOperation", "GET"),
        ("@WriteOperation", "POST"),
        ("@DeleteOperation", "DELETE"),
    ]
    .iter()
    .filter(|(marker, _)| window.contains(marker))
    .map(|(_, verb)| *verb)
    .collect();
    match verbs.as_slice() {
        [one] => (*one).to_string(),
        _ => "ALL".to_string(),
    }
}

/// `(exposure include id, 1-based line)` pairs from a YAML
/// `management.endpoints.web.exposure.include` block.
fn yaml_exposure_includes(text: &str) -> Vec<(String, usize)> {
    let mut out = Vec::new();
    let mut in_exposure = false;
    for (idx, line) in text.lines().enumerate() {
        if YAML_EXPOSURE.is_match(line) {
            in_exposure = true;
            continue;
        }
        if in_exposure {
            if let Some(caps) = YAML_INCLUDE.captures(line) {
                for id in caps[1].split(',') {
                    let id = id.trim().trim_matches(['"', '\'']).to_string();
                    if !id.is_empty() {
                        out.push((id, idx + 1));
                    }
                }
            }
            if !line.starts_with(' ') {
                in_exposure = false;
            }
        }
    }
    out
}

fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
