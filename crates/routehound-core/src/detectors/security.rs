//! Spring Security matcher configuration.
//!
//! `antMatchers`/`requestMatchers` patterns name paths the application
//! explicitly guards or opens; a trailing `permitAll()` marks the path as
//! reachable without authentication.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::{controller_name, Detector};
use crate::aggregate::NO_AUTH_MARKER;
use crate::findings::{line_of_offset, RawFinding};

static MATCHER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:antMatchers|requestMatchers|mvcMatchers)\s*\(\s*(?:HttpMethod\.([A-Z]+)\s*,\s*)?"([^"]+)""#,
    )
    .unwrap()
});

/// Window after a matcher call checked for `.permitAll()`.
const PERMIT_LOOKAHEAD: usize = 120;

pub(crate) struct SecurityMatchers;

impl Detector for SecurityMatchers {
    fn tag(&self) -> &'static str {
        "security-matchers"
    }

    fn detect(&self, origin: &str, text: &str) -> Result<Vec<RawFinding>> {
        if !(text.contains("antMatchers")
            || text.contains("requestMatchers")
            || text.contains("mvcMatchers"))
        {
            return Ok(Vec::new());
        }

        let controller = controller_name(origin, text);
        let mut findings = Vec::new();
        for caps in MATCHER.captures_iter(text) {
            let whole = caps.get(0).expect("group 0");
            let method = caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "ALL".to_string());
            let extra = permit_all_ahead(text, whole.end());
            findings.push(RawFinding {
                endpoint: format!("\"{}\"", &caps[2]),
                method,
                controller: controller.clone(),
                base_path: String::new(),
                source_tag: self.tag(),
                origin: origin.to_string(),
                line: line_of_offset(text, whole.start()),
                extra,
            });
        }
        Ok(findings)
    }
}

fn permit_all_ahead(text: &str, offset: usize) -> Option<String> {
    let mut hi = (offset + PERMIT_LOOKAHEAD).min(text.len());
    while hi < text.len() && !text.is_char_boundary(hi) {
        hi += 1;
    }
    if text[offset..hi].contains("permitAll") {
        Some(NO_AUTH_MARKER.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
public class SecurityConfig {
    protected void configure(HttpSecurity http) throws Exception {
        http.authorizeRequests()
            .antMatchers("/public/**").permitAll()
            .antMatchers(HttpMethod.DELETE, "/admin/users/{id}").hasRole("ADMIN")
            .requestMatchers("/internal/health").authenticated();
    }
}
"#;

    fn detect() -> Vec<RawFinding> {
        SecurityMatchers.detect("src/SecurityConfig.java", CONFIG).unwrap()
    }

    #[test]
    fn matcher_paths_and_verbs_are_captured() {
        let findings = detect();
        assert_eq!(findings.len(), 3);
        assert_eq!(findings[0].endpoint, r#""/public/**""#);
        assert_eq!(findings[0].method, "ALL");
        assert_eq!(findings[1].method, "DELETE");
        assert_eq!(findings[1].endpoint, r#""/admin/users/{id}""#);
        assert_eq!(findings[2].method, "ALL");
    }

    #[test]
    fn permit_all_is_flagged_only_where_present() {
        let findings = detect();
        assert_eq!(findings[0].extra.as_deref(), Some(NO_AUTH_MARKER));
        assert_eq!(findings[1].extra, None);
        assert_eq!(findings[2].extra, None);
    }
}
