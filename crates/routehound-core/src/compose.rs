//! Path composition, parameter extraction, constant resolution.
//!
//! Normalization is total: any `(context, base, endpoint)` triple composes
//! to exactly one `full_path`, and unresolvable symbolic tokens are kept
//! under an `<unresolved:NAME>` marker instead of failing.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Marker wrapped around a symbolic token that no scanned declaration
/// resolves.
pub const UNRESOLVED_PREFIX: &str = "<unresolved:";

static PARAM_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^/{}]+)\}").unwrap());

// Constant references follow the Java UPPER_SNAKE convention; lowercase
// tokens are plain path literals.
static CONSTANT_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap());

/// Compose a full path from optional context, base and endpoint fragments.
/// Exactly one slash separates fragments; one trailing slash is stripped
/// from the result; the root path stays `/`.
pub fn compose_path(context: &str, base: &str, endpoint: &str) -> String {
    let mut out = String::new();
    for fragment in [context, base, endpoint] {
        let trimmed = fragment.trim().trim_matches('/');
        if trimmed.is_empty() {
            continue;
        }
        out.push('/');
        out.push_str(trimmed);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Brace-delimited placeholder names, in order of first appearance.
pub fn extract_params(full_path: &str) -> Vec<String> {
    let mut params = Vec::new();
    for caps in PARAM_PLACEHOLDER.captures_iter(full_path) {
        let name = caps[1].to_string();
        if !params.contains(&name) {
            params.push(name);
        }
    }
    params
}

/// Substitute symbolic tokens in a raw endpoint expression.
///
/// Detectors hand over whatever sat inside the mapping annotation, which
/// may be a quoted literal, a bare constant reference, or a `+`
/// concatenation of both (`USERS_PATH + "/{id}"`). Unknown tokens come
/// back as `<unresolved:NAME>`; anything else passes through unchanged.
pub fn resolve_constants(raw: &str, table: &HashMap<String, String>) -> String {
    let trimmed = raw.trim();
    if !trimmed.contains('+') {
        return resolve_token(trimmed, table);
    }
    // Split on concatenation only; a `+` inside a quoted literal is part
    // of the path.
    let mut out = String::new();
    let mut token = String::new();
    let mut in_quotes = false;
    for c in trimmed.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                token.push(c);
            }
            '+' if !in_quotes => {
                out.push_str(&resolve_token(token.trim(), table));
                token.clear();
            }
            _ => token.push(c),
        }
    }
    out.push_str(&resolve_token(token.trim(), table));
    out
}

fn resolve_token(token: &str, table: &HashMap<String, String>) -> String {
    let token = token.trim();
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        return token[1..token.len() - 1].to_string();
    }
    if CONSTANT_REF.is_match(token) {
        return match table.get(token) {
            Some(value) => value.clone(),
            None => format!("{UNRESOLVED_PREFIX}{token}>"),
        };
    }
    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_and_endpoint_compose_with_single_slashes() {
        assert_eq!(compose_path("", "/api", "/users/{id}"), "/api/users/{id}");
        assert_eq!(compose_path("", "/api/", "users"), "/api/users");
        assert_eq!(compose_path("/ctx", "/api", "/users/"), "/ctx/api/users");
    }

    #[test]
    fn empty_fragments_yield_root() {
        assert_eq!(compose_path("", "", ""), "/");
        assert_eq!(compose_path("", "", "/"), "/");
    }

    #[test]
    fn empty_endpoint_keeps_base() {
        assert_eq!(compose_path("", "/api/v1/users", ""), "/api/v1/users");
    }

    #[test]
    fn composition_is_deterministic() {
        let a = compose_path("/ctx", "/api", "/users/{id}");
        let b = compose_path("/ctx", "/api", "/users/{id}");
        assert_eq!(a, b);
    }

    #[test]
    fn params_in_first_appearance_order() {
        assert_eq!(
            extract_params("/api/{org}/users/{id}/posts/{id}"),
            vec!["org".to_string(), "id".to_string()]
        );
        assert!(extract_params("/api/users").is_empty());
    }

    #[test]
    fn declared_constant_resolves() {
        let mut table = HashMap::new();
        table.insert("USERS_PATH".to_string(), "/users".to_string());
        assert_eq!(resolve_constants("USERS_PATH", &table), "/users");
        assert_eq!(
            resolve_constants(r#"USERS_PATH + "/{id}""#, &table),
            "/users/{id}"
        );
    }

    #[test]
    fn unknown_constant_keeps_marker_instead_of_failing() {
        let table = HashMap::new();
        assert_eq!(
            resolve_constants("UNKNOWN_CONST", &table),
            "<unresolved:UNKNOWN_CONST>"
        );
        assert_eq!(
            resolve_constants(r#"UNKNOWN_CONST + "/x""#, &table),
            "<unresolved:UNKNOWN_CONST>/x"
        );
    }

    #[test]
    fn plus_inside_quotes_is_not_concatenation() {
        let mut table = HashMap::new();
        table.insert("P".to_string(), "/p".to_string());
        assert_eq!(resolve_constants(r#""/a+b""#, &table), "/a+b");
        assert_eq!(resolve_constants(r#"P + "/x+y""#, &table), "/p/x+y");
    }

    #[test]
    fn plain_paths_pass_through() {
        let table = HashMap::new();
        assert_eq!(resolve_constants("/users/{id}", &table), "/users/{id}");
        assert_eq!(resolve_constants("users", &table), "users");
        assert_eq!(resolve_constants(r#""/quoted""#, &table), "/quoted");
    }
}
