//! Scan-wide symbol table and context-path recovery.
//!
//! Constant declarations are collected across every unit before detection
//! runs, so a detector in one file can reference a constant declared in
//! another. Resolution itself happens during path composition.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::findings::TextUnit;

static CONSTANT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:public\s+)?static\s+final\s+String\s+([A-Za-z_][A-Za-z0-9_]*)\s*=\s*"([^"]*)""#)
        .unwrap()
});

static PROPERTIES_CONTEXT_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*server\.servlet\.context-path\s*=\s*(\S+)").unwrap()
});

static YAML_CONTEXT_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*context-path\s*:\s*(\S+)").unwrap());

/// Declared `static final String` constants, keyed by name. On duplicate
/// names the first declaration wins; which file declared it does not
/// matter for path substitution.
pub(crate) fn collect_constants(units: &[TextUnit]) -> HashMap<String, String> {
    let mut table = HashMap::new();
    for unit in units {
        for caps in CONSTANT_DECL.captures_iter(&unit.text) {
            table
                .entry(caps[1].to_string())
                .or_insert_with(|| caps[2].to_string());
        }
    }
    table
}

/// `server.servlet.context-path` from `.properties` or `.yml`/`.yaml`
/// units, if any declares one.
pub(crate) fn context_path_from_units(units: &[TextUnit]) -> Option<String> {
    for unit in units {
        let lower = unit.origin.to_ascii_lowercase();
        let caps = if lower.ends_with(".properties") {
            PROPERTIES_CONTEXT_PATH.captures(&unit.text)
        } else if lower.ends_with(".yml") || lower.ends_with(".yaml") {
            YAML_CONTEXT_PATH.captures(&unit.text)
        } else {
            None
        };
        if let Some(caps) = caps {
            let value = caps[1].trim_matches(['"', '\'']).to_string();
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(origin: &str, text: &str) -> TextUnit {
        TextUnit {
            origin: origin.into(),
            text: text.into(),
        }
    }

    #[test]
    fn collects_constants_across_units() {
        let units = vec![
            unit(
                "A.java",
                r#"public static final String USERS_PATH = "/users";"#,
            ),
            unit("B.java", r#"static final String HEALTH = "/health";"#),
        ];
        let table = collect_constants(&units);
        assert_eq!(table["USERS_PATH"], "/users");
        assert_eq!(table["HEALTH"], "/health");
    }

    #[test]
    fn first_declaration_wins_on_duplicates() {
        let units = vec![
            unit("A.java", r#"public static final String P = "/a";"#),
            unit("B.java", r#"public static final String P = "/b";"#),
        ];
        assert_eq!(collect_constants(&units)["P"], "/a");
    }

    #[test]
    fn context_path_from_properties() {
        let units = vec![unit(
            "application.properties",
            "server.port=8080\nserver.servlet.context-path=/api\n",
        )];
        assert_eq!(context_path_from_units(&units).as_deref(), Some("/api"));
    }

    #[test]
    fn context_path_from_yaml() {
        let units = vec![unit(
            "application.yml",
            "server:\n  servlet:\n    context-path: /svc\n",
        )];
        assert_eq!(context_path_from_units(&units).as_deref(), Some("/svc"));
    }

    #[test]
    fn no_context_path_in_java_units() {
        let units = vec![unit("A.java", "server.servlet.context-path=/api")];
        assert_eq!(context_path_from_units(&units), None);
    }
}
