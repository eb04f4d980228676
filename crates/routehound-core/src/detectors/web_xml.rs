//! `web.xml` deployment descriptors.
//!
//! Event-driven pass over `<servlet-mapping>` / `<filter-mapping>`
//! elements; every `<url-pattern>` becomes a finding, with the mapped
//! servlet or filter name as the controller.

use anyhow::Result;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::Detector;
use crate::findings::{line_of_offset, RawFinding};

pub(crate) struct WebXml;

impl Detector for WebXml {
    fn tag(&self) -> &'static str {
        "web-xml"
    }

    fn detect(&self, origin: &str, text: &str) -> Result<Vec<RawFinding>> {
        if !(text.contains("<web-app") || text.contains("<web-fragment")) {
            return Ok(Vec::new());
        }

        let mut reader = Reader::from_reader(text.as_bytes());
        let mut buf = Vec::new();

        let mut findings = Vec::new();
        let mut in_mapping = false;
        let mut current_tag: Option<String> = None;
        // (pattern, line) entries seen inside the current mapping element;
        // the servlet-name may arrive before or after them.
        let mut patterns: Vec<(String, usize)> = Vec::new();
        let mut name = String::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if tag == "servlet-mapping" || tag == "filter-mapping" {
                        in_mapping = true;
                        patterns.clear();
                        name.clear();
                        current_tag = None;
                    } else if in_mapping {
                        current_tag = Some(tag);
                    }
                }
                Ok(Event::End(e)) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if in_mapping && (tag == "servlet-mapping" || tag == "filter-mapping") {
                        for (pattern, line) in patterns.drain(..) {
                            findings.push(RawFinding {
                                endpoint: format!("\"{pattern}\""),
                                method: "ALL".to_string(),
                                controller: name.clone(),
                                base_path: String::new(),
                                source_tag: self.tag(),
                                origin: origin.to_string(),
                                line,
                                extra: None,
                            });
                        }
                        in_mapping = false;
                    }
                    current_tag = None;
                }
                Ok(Event::Text(t)) => {
                    if in_mapping {
                        let value = reader
                            .decoder()
                            .decode(t.as_ref())
                            .unwrap_or_default()
                            .trim()
                            .to_string();
                        match current_tag.as_deref() {
                            Some("url-pattern") if !value.is_empty() => {
                                let line =
                                    line_of_offset(text, reader.buffer_position() as usize);
                                patterns.push((value, line));
                            }
                            Some("servlet-name") | Some("filter-name") => {
                                name = value;
                            }
                            _ => {}
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(err) => return Err(err.into()),
                _ => {}
            }
            buf.clear();
        }
        Ok(findings)
    }
}
