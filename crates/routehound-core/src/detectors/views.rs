//! Static view and template bindings: links and form targets pointing at
//! `.jsp`/`.ftl` views, `<jsp:include>` pages, and MVC
//! `addViewController`/`addResourceHandler` registrations. Weak signals
//! on their own, but they corroborate paths other strategies find.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::Detector;
use crate::findings::{line_of_offset, RawFinding};

static VIEW_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:href|action)\s*=\s*"([^"]+\.(?:jsp|ftl))""#).unwrap()
});
static JSP_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<jsp:include\s+page\s*=\s*"([^"]+)""#).unwrap());
static HANDLER_REGISTRATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:addViewController|addResourceHandler)\s*\(\s*"([^"]+)""#).unwrap()
});

pub(crate) struct ViewTemplates;

impl Detector for ViewTemplates {
    fn tag(&self) -> &'static str {
        "view-templates"
    }

    fn detect(&self, origin: &str, text: &str) -> Result<Vec<RawFinding>> {
        let mut findings = Vec::new();
        for regex in [&*VIEW_TARGET, &*JSP_INCLUDE, &*HANDLER_REGISTRATION] {
            for caps in regex.captures_iter(text) {
                let whole = caps.get(0).expect("group 0");
                findings.push(RawFinding {
                    endpoint: format!("\"{}\"", &caps[1]),
                    method: "GET".to_string(),
                    controller: String::new(),
                    base_path: String::new(),
                    source_tag: self.tag(),
                    origin: origin.to_string(),
                    line: line_of_offset(text, whole.start()),
                    extra: None,
                });
            }
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_links_and_includes_are_found() {
        let text = r#"
<html>
  <a href="/app/reports/summary.jsp">Summary</a>
  <form action="/app/orders/new.ftl" method="post"></form>
  <jsp:include page="/fragments/header.jsp" />
</html>
"#;
        let findings = ViewTemplates.detect("webapp/index.jsp", text).unwrap();
        assert_eq!(findings.len(), 3);
        assert_eq!(findings[0].endpoint, r#""/app/reports/summary.jsp""#);
        assert_eq!(findings[1].endpoint, r#""/app/orders/new.ftl""#);
        assert_eq!(findings[2].endpoint, r#""/fragments/header.jsp""#);
        assert!(findings.iter().all(|f| f.method == "GET"));
    }

    #[test]
    fn mvc_handler_registrations_are_found() {
        let text = r#"
public class WebConfig implements WebMvcConfigurer {
    public void addViewControllers(ViewControllerRegistry registry) {
        registry.addViewController("/login").setViewName("login");
    }
    public void addResourceHandlers(ResourceHandlerRegistry registry) {
        registry.addResourceHandler("/static/**").addResourceLocations("classpath:/static/");
    }
}
"#;
        let findings = ViewTemplates.detect("src/WebConfig.java", text).unwrap();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].endpoint, r#""/login""#);
        assert_eq!(findings[1].endpoint, r#""/static/**""#);
    }

    #[test]
    fn non_view_links_are_ignored() {
        let text = r#"<a href="https://example.com/page.html">x</a>"#;
        assert!(ViewTemplates.detect("a.html", text).unwrap().is_empty());
    }
}
