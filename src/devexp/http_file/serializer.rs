//! Request document writer
//!
//! Output parses back to the same requests, with one deliberate exception:
//! bootstrap request bodies are written with their credential values blanked.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use tracing::info;

use crate::devexp::redact::redact;
use crate::errors::Result;
use crate::models::request::PRE_AUTH_MARKER;
use crate::models::{Document, Request, VariableTable};

/// Render a whole document
pub fn serialize(document: &Document) -> String {
    serialize_requests(&document.requests, &document.variables)
}

/// Render requests under a single shared variable block
pub fn serialize_requests(requests: &[Request], variables: &VariableTable) -> String {
    let mut out = String::new();

    if !variables.is_empty() {
        for (name, value) in variables.iter() {
            let _ = writeln!(out, "@{} = {}", name, quote_value(value));
        }
        out.push('\n');
    }

    for request in requests {
        write_request(&mut out, request);
    }

    out
}

fn write_request(out: &mut String, request: &Request) {
    let bootstrap = request.is_bootstrap();

    if bootstrap {
        let _ = writeln!(out, "### {}", PRE_AUTH_MARKER);
        if let Some(path) = request
            .pre_auth
            .as_ref()
            .map(|p| p.response_path.trim())
            .filter(|p| !p.is_empty())
        {
            let _ = writeln!(out, "# @responsePath {}", path);
        }
    } else {
        let _ = writeln!(out, "### {}", request.display_name());
    }

    let _ = writeln!(out, "{} {}", request.method, request.full_url());

    for (name, value) in request.headers.iter() {
        if name.trim().is_empty() || value.trim().is_empty() {
            continue;
        }
        let _ = writeln!(out, "{}: {}", name, value);
    }

    let body = if bootstrap {
        redact(&request.body)
    } else {
        request.body.clone()
    };

    if !body.trim().is_empty() {
        out.push('\n');
        out.push_str(&body);
        out.push('\n');
    }
    out.push('\n');
}

/// Write a document to disk atomically.
///
/// The live pre-auth settings are folded back first; credentials never are.
pub fn save_http_file(path: &Path, document: &Document) -> Result<()> {
    let mut document = document.clone();
    document.sync_pre_auth();
    let text = serialize(&document);

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    file.persist(path).map_err(|e| e.error)?;

    info!(path = %path.display(), requests = document.len(), "Saved request document");
    Ok(())
}

/// Quote a declaration value the parser would otherwise trim or unquote
fn quote_value(value: &str) -> String {
    let needs_quotes = value != value.trim()
        || (value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\''))));

    if needs_quotes {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devexp::http_file::parse_http_content;
    use crate::http::Method;
    use crate::models::{PreAuthConfig, QueryParam};

    #[test]
    fn test_serialize_layout() {
        let mut request = Request::new(Method::Post, "https://api.example.com/users");
        request.name = "Create user".to_string();
        request.headers.insert("Content-Type", "application/json");
        request.body = "{\"name\": \"John\"}".to_string();
        let variables: VariableTable = vec![("host", "https://api.example.com")].into_iter().collect();

        let text = serialize_requests(&[request], &variables);
        assert_eq!(
            text,
            "@host = https://api.example.com\n\
             \n\
             ### Create user\n\
             POST https://api.example.com/users\n\
             Content-Type: application/json\n\
             \n\
             {\"name\": \"John\"}\n\
             \n"
        );
    }

    #[test]
    fn test_no_variable_block_when_empty() {
        let request = Request::new(Method::Get, "https://x/y");
        let text = serialize_requests(&[request], &VariableTable::new());
        assert!(text.starts_with("### GET /y\n"));
    }

    #[test]
    fn test_blank_body_omitted() {
        let mut request = Request::new(Method::Get, "https://x/y");
        request.name = "Y".to_string();
        request.body = "  \n ".to_string();
        let text = serialize_requests(&[request], &VariableTable::new());
        assert_eq!(text, "### Y\nGET https://x/y\n\n");
    }

    #[test]
    fn test_skips_empty_headers() {
        let mut request = Request::new(Method::Get, "https://x");
        request.name = "X".to_string();
        request.headers.insert("Accept", "");
        request.headers.insert("X-Id", "1");
        let text = serialize_requests(&[request], &VariableTable::new());
        assert!(!text.contains("Accept"));
        assert!(text.contains("X-Id: 1\n"));
    }

    #[test]
    fn test_query_encoding_keeps_placeholders() {
        let mut request = Request::new(Method::Get, "{{host}}/search");
        request.name = "Search".to_string();
        request.query_params.push(QueryParam::new("q", "{{search}} and more"));
        let mut disabled = QueryParam::new("debug", "1");
        disabled.enabled = false;
        request.query_params.push(disabled);

        let text = serialize_requests(&[request], &VariableTable::new());
        assert!(text.contains("GET {{host}}/search?q={{search}}%20and%20more\n"));
        assert!(!text.contains("debug"));
    }

    #[test]
    fn test_spaced_placeholders_survive_round_trip() {
        let mut request = Request::new(Method::Get, "{{ host }}/s");
        request.name = "S".to_string();
        request.query_params.push(QueryParam::new("q", "{{ search }}"));

        let text = serialize_requests(&[request], &VariableTable::new());
        assert_eq!(text, "### S\nGET {{ host }}/s?q={{ search }}\n\n");

        let parsed = parse_http_content(&text);
        let request = &parsed.requests[0];
        assert_eq!(request.url, "{{ host }}/s");
        assert_eq!(request.query_params, vec![QueryParam::new("q", "{{ search }}")]);
    }

    #[test]
    fn test_bootstrap_is_redacted() {
        let mut request = Request::new(Method::Post, "https://x/login");
        request.name = "Login".to_string();
        request.is_pre_auth_request = true;
        request.pre_auth = Some(PreAuthConfig {
            response_path: "data.token".to_string(),
            ..PreAuthConfig::seeded()
        });
        request.body = r#"{"username":"bob","password":"secret"}"#.to_string();

        let text = serialize_requests(&[request], &VariableTable::new());
        assert!(text.starts_with("### @PRE-AUTH\n# @responsePath data.token\nPOST https://x/login\n"));
        assert!(text.contains(r#"{"username":"","password":""}"#));
        assert!(!text.contains("secret"));
        assert!(!text.contains("bob"));
    }

    #[test]
    fn test_quoted_variable_values_survive() {
        let variables: VariableTable =
            vec![("pad", " x "), ("quoted", "\"q\""), ("empty", "")].into_iter().collect();
        let text = serialize_requests(&[], &variables);
        let parsed = parse_http_content(&text);
        assert_eq!(parsed.variables, variables);
    }

    #[test]
    fn test_save_http_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.http");

        let mut request = Request::new(Method::Post, "https://x/login");
        request.is_pre_auth_request = true;
        request.body = "username=bob&password=pw".to_string();
        let mut document = Document::new(vec![request], VariableTable::new());
        if let Some(live) = document.current_pre_auth_mut() {
            live.response_path = "token".to_string();
            live.password = Some("pw".to_string());
        }

        save_http_file(&path, &document).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("# @responsePath token\n"));
        assert!(written.contains("username=&password=\n"));
        assert!(!written.contains("pw"));
    }

    #[test]
    fn test_round_trip() {
        let content = "@host = https://api.example.com\n\
                       \n\
                       ### List\n\
                       GET {{host}}/users?page=2&q=a%20b\n\
                       Accept: application/json\n\
                       \n\
                       ### Create\n\
                       POST {{host}}/users\n\
                       Content-Type: application/json\n\
                       \n\
                       {\n  \"name\": \"John\",\n\n  \"tags\": []\n}\n";
        let first = parse_http_content(content);
        let second = parse_http_content(&serialize(&first));

        assert_eq!(first.variables, second.variables);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.requests.iter().zip(&second.requests) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.method, b.method);
            assert_eq!(a.url, b.url);
            assert_eq!(a.query_params, b.query_params);
            assert_eq!(a.headers, b.headers);
            assert_eq!(a.body, b.body);
            assert_eq!(a.body_type, b.body_type);
        }
    }
}
