//! cURL command import
//!
//! Turns a pasted curl command into a [`Request`]. Parsing never fails:
//! anything unrecognised is skipped and missing pieces keep their defaults
//! (GET, empty URL, no headers, empty body).
//!
//! # Example
//!
//! ```
//! use restbook::devexp::curl_import::parse_curl;
//!
//! let request = parse_curl(r#"curl -X POST https://api.example.com/users -H 'Content-Type: application/json' -d '{"name":"John"}'"#);
//! assert_eq!(request.method.as_str(), "POST");
//! assert_eq!(request.url, "https://api.example.com/users");
//! assert_eq!(request.body, r#"{"name":"John"}"#);
//! ```

use crate::devexp::encode::{percent_decode, smart_encode};
use crate::http::Method;
use crate::mime::{detect_body_type, is_form_urlencoded};
use crate::models::{Headers, Request};

/// Name given to every request created from a curl command
pub const IMPORTED_REQUEST_NAME: &str = "Imported from cURL";

/// Flags whose argument is consumed and otherwise ignored
const FLAGS_WITH_ARGS: &[&str] = &[
    "-u", "--user", "-o", "--output", "-A", "--user-agent", "-b", "--cookie", "-c",
    "--cookie-jar", "-x", "--proxy", "-e", "--referer", "-F", "--form", "-m", "--max-time",
    "--connect-timeout", "-w", "--write-out", "-T", "--upload-file", "-E", "--cert", "--key",
    "--cacert", "--max-redirs", "-r", "--range", "--resolve", "--retry", "--limit-rate",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataKind {
    /// `-d`, `--data`, `--data-raw`, `--data-binary`
    Raw,
    /// `--data-urlencode`
    Urlencode,
}

/// Parse a curl command into a request
pub fn parse_curl(cmd: &str) -> Request {
    let tokens = tokenize_curl(cmd);
    let mut i = usize::from(
        tokens
            .first()
            .is_some_and(|t| t.eq_ignore_ascii_case("curl")),
    );

    let mut method: Option<Method> = None;
    let mut after_method: Option<String> = None;
    let mut positional: Option<String> = None;
    let mut location: Option<String> = None;
    let mut headers = Headers::new();
    let mut data: Vec<(DataKind, String)> = Vec::new();

    while i < tokens.len() {
        let token = tokens[i].as_str();
        let next = tokens.get(i + 1).map(String::as_str);

        if let Some(glued) = token.strip_prefix("-X").filter(|m| !m.is_empty()) {
            if method.is_none() {
                method = Some(glued.parse().unwrap_or_default());
                after_method = next.filter(|t| looks_like_url(t)).map(clean_url);
            }
            i += 1;
            continue;
        }

        match token {
            "-X" | "--request" => {
                if let Some(value) = next {
                    if method.is_none() {
                        method = Some(value.parse().unwrap_or_default());
                        after_method = tokens
                            .get(i + 2)
                            .map(String::as_str)
                            .filter(|t| looks_like_url(t))
                            .map(clean_url);
                    }
                    i += 1;
                }
            }
            "-H" | "--header" => {
                if let Some(value) = next {
                    if let Some((name, value)) = parse_header(value) {
                        headers.insert(name, value);
                    }
                    i += 1;
                }
            }
            "-d" | "--data" | "--data-raw" | "--data-binary" | "--data-ascii" => {
                if let Some(value) = next {
                    data.push((DataKind::Raw, value.to_string()));
                    i += 1;
                }
            }
            "--data-urlencode" => {
                if let Some(value) = next {
                    data.push((DataKind::Urlencode, value.to_string()));
                    i += 1;
                }
            }
            "-L" | "--location" => {
                if let Some(value) = next.filter(|t| looks_like_url(t)) {
                    location.get_or_insert_with(|| clean_url(value));
                    i += 1;
                }
            }
            "--url" => {
                if let Some(value) = next {
                    positional.get_or_insert_with(|| clean_url(value));
                    i += 1;
                }
            }
            t if FLAGS_WITH_ARGS.contains(&t) => {
                i += 1;
            }
            t if t.starts_with('-') && t.len() > 1 => {}
            t => {
                if positional.is_none() && looks_like_url(t) {
                    positional = Some(clean_url(t));
                }
            }
        }
        i += 1;
    }

    let url = after_method.or(positional).or(location).unwrap_or_default();

    let form = data.iter().any(|(kind, _)| *kind == DataKind::Urlencode)
        || is_form_urlencoded(&headers);
    let body = if form {
        form_body(&data)
    } else {
        data.into_iter()
            .map(|(_, segment)| segment)
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut request = Request::new(method.unwrap_or_default(), &url);
    request.name = IMPORTED_REQUEST_NAME.to_string();
    request.body_type = detect_body_type(&headers, &body);
    request.headers = headers;
    request.body = body;
    request
}

/// Tokenize a curl command the way a POSIX shell would.
///
/// Line continuations (`\` or PowerShell's backtick before a newline) act
/// as whitespace. An unterminated quote runs to the end of input.
fn tokenize_curl(cmd: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut started = false;
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut chars = cmd.chars().peekable();

    while let Some(c) = chars.next() {
        if in_single_quote {
            if c == '\'' {
                in_single_quote = false;
            } else {
                current.push(c);
            }
            continue;
        }

        if in_double_quote {
            match c {
                '"' => in_double_quote = false,
                '\\' => match chars.peek().copied() {
                    Some(next @ ('"' | '\\' | '$' | '`')) => {
                        current.push(next);
                        chars.next();
                    }
                    Some('\n') => {
                        chars.next();
                    }
                    _ => current.push('\\'),
                },
                _ => current.push(c),
            }
            continue;
        }

        match c {
            '\'' => {
                in_single_quote = true;
                started = true;
            }
            '"' => {
                in_double_quote = true;
                started = true;
            }
            '\\' | '`' if is_continuation(&mut chars) => {
                if started {
                    tokens.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                    started = true;
                }
            }
            c if c.is_whitespace() => {
                if started {
                    tokens.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            _ => {
                current.push(c);
                started = true;
            }
        }
    }

    if started {
        tokens.push(current);
    }

    tokens
}

/// Consume a line break following a continuation character, if present
fn is_continuation(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> bool {
    match chars.peek() {
        Some('\n') => {
            chars.next();
            true
        }
        Some('\r') => {
            chars.next();
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            true
        }
        _ => false,
    }
}

/// Parse header in format "Name: Value"
fn parse_header(header: &str) -> Option<(String, String)> {
    let (name, value) = header.split_once(':')?;
    let name = name.trim();
    let value = strip_wrapping_quotes(value.trim()).trim();
    if name.is_empty() || value.is_empty() {
        return None;
    }
    Some((name.to_string(), value.to_string()))
}

/// Strip one matching pair of surrounding quotes
fn strip_wrapping_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = s
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    s
}

fn clean_url(s: &str) -> String {
    strip_wrapping_quotes(s.trim()).to_string()
}

fn looks_like_url(token: &str) -> bool {
    let t = strip_wrapping_quotes(token.trim()).to_ascii_lowercase();
    t.starts_with("http://") || t.starts_with("https://") || t.starts_with("{{")
}

/// Encode a `key=value` pair (or a bare value) for a form body
fn encode_form_pair(segment: &str) -> String {
    match segment.split_once('=') {
        Some((key, value)) => format!("{}={}", smart_encode(key), smart_encode(value)),
        None => smart_encode(segment),
    }
}

fn decode_form_text(s: &str) -> String {
    percent_decode(&s.replace('+', " "))
}

fn form_body(data: &[(DataKind, String)]) -> String {
    let mut pairs: Vec<String> = Vec::new();

    for (kind, segment) in data {
        match kind {
            DataKind::Urlencode => pairs.push(encode_form_pair(segment)),
            DataKind::Raw => {
                for pair in segment.split('&').filter(|p| !p.is_empty()) {
                    let decoded = match pair.split_once('=') {
                        Some((key, value)) => {
                            format!("{}={}", decode_form_text(key), decode_form_text(value))
                        }
                        None => decode_form_text(pair),
                    };
                    pairs.push(encode_form_pair(&decoded));
                }
            }
        }
    }

    pairs.join("&")
}
