//! Legacy Struts mappings: XML action descriptors and `@Action`
//! annotations.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::{annotation_paths, controller_name, Detector};
use crate::findings::{line_of_offset, RawFinding};

static XML_ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<action\b[^>]*?\b(?:path|name)\s*=\s*"([^"]+)"[^>]*>"#).unwrap()
});
static ACTION_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bclass\s*=\s*"([^"]+)""#).unwrap());
static ACTION_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@Action\s*\(([^)]*)\)").unwrap());

pub(crate) struct StrutsConfig;

impl Detector for StrutsConfig {
    fn tag(&self) -> &'static str {
        "struts-config"
    }

    fn detect(&self, origin: &str, text: &str) -> Result<Vec<RawFinding>> {
        let mut findings = Vec::new();

        if text.contains("<action") {
            for caps in XML_ACTION.captures_iter(text) {
                let whole = caps.get(0).expect("group 0");
                let controller = ACTION_CLASS
                    .captures(whole.as_str())
                    .map(|c| c[1].rsplit('.').next().unwrap_or(&c[1]).to_string())
                    .unwrap_or_default();
                findings.push(RawFinding {
                    endpoint: format!("\"{}\"", &caps[1]),
                    method: "ALL".to_string(),
                    controller,
                    base_path: String::new(),
                    source_tag: self.tag(),
                    origin: origin.to_string(),
                    line: line_of_offset(text, whole.start()),
                    extra: None,
                });
            }
        }

        if text.contains("@Action") {
            let controller = controller_name(origin, text);
            for caps in ACTION_ANNOTATION.captures_iter(text) {
                let whole = caps.get(0).expect("group 0");
                let line = line_of_offset(text, whole.start());
                for expr in annotation_paths(&caps[1]) {
                    findings.push(RawFinding {
                        endpoint: expr,
                        method: "ALL".to_string(),
                        controller: controller.clone(),
                        base_path: String::new(),
                        source_tag: self.tag(),
                        origin: origin.to_string(),
                        line,
                        extra: None,
                    });
                }
            }
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn struts_xml_actions_are_found() {
        let text = r#"
<struts-config>
  <action-mappings>
    <action path="/login" type="com.example.LoginAction" class="com.example.LoginAction"/>
    <action path="/logout" class="com.example.LogoutAction"/>
  </action-mappings>
</struts-config>
"#;
        let findings = StrutsConfig.detect("struts-config.xml", text).unwrap();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].endpoint, r#""/login""#);
        assert_eq!(findings[0].controller, "LoginAction");
        assert_eq!(findings[1].endpoint, r#""/logout""#);
    }

    #[test]
    fn action_annotations_are_found() {
        let text = r#"
public class AccountAction {
    @Action("/account/view")
    public String view() { return SUCCESS; }
}
"#;
        let findings = StrutsConfig.detect("src/AccountAction.java", text).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].endpoint, r#""/account/view""#);
        assert_eq!(findings[0].controller, "AccountAction");
    }
}
