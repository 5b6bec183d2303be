//! Request document parser
//!
//! The grammar is line oriented. [`DocumentParser`] holds the state carried
//! from one line to the next and is advanced one line at a time by
//! [`DocumentParser::step`], so the grammar can be exercised line by line.
//!
//! ```http
//! @host = https://api.example.com
//!
//! ### Create user
//! POST {{host}}/users
//! Content-Type: application/json
//!
//! {"name": "John"}
//! ```

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::errors::Result;
use crate::http::{parse_method_line, Method};
use crate::mime::detect_body_type;
use crate::models::request::is_pre_auth_marker;
use crate::models::{Document, PreAuthConfig, Request, VariableTable};

/// URL of the request synthesized for an empty document
pub const DEFAULT_REQUEST_URL: &str = "https://api.example.com";

/// Name of the request synthesized for an empty document
pub const DEFAULT_REQUEST_NAME: &str = "New Request";

static DECLARATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@([\w.-]+)\s*=\s*(.*?)\s*$").expect("Invalid declaration regex")
});

static RESPONSE_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#+\s*@responsePath\s+(\S+)").expect("Invalid responsePath regex")
});

/// Where the parser is relative to the request being built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// No request line seen yet for the open request (or no request open)
    BetweenRequests,
    /// Method line seen; header lines until the first blank line
    InHeaders,
    /// Everything up to the next separator is body text
    InBody,
}

/// Line-at-a-time parser for request documents
#[derive(Debug)]
pub struct DocumentParser {
    state: ParseState,
    current: Option<Request>,
    pending_comments: Vec<String>,
    body_lines: Vec<String>,
    variables: VariableTable,
    requests: Vec<Request>,
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::BetweenRequests,
            current: None,
            pending_comments: Vec::new(),
            body_lines: Vec::new(),
            variables: VariableTable::new(),
            requests: Vec::new(),
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// The request currently being built, if any
    pub fn current(&self) -> Option<&Request> {
        self.current.as_ref()
    }

    pub fn pending_comments(&self) -> &[String] {
        &self.pending_comments
    }

    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    /// Requests flushed so far
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Consume one line of input and return the resulting state
    pub fn step(&mut self, line: &str) -> ParseState {
        let trimmed = line.trim();

        if let Some((name, value)) = parse_declaration(trimmed) {
            self.variables.declare(name, value);
            return self.state;
        }

        if trimmed.starts_with("###") {
            self.start_request(trimmed.trim_start_matches('#').trim());
            return self.state;
        }

        if self.state == ParseState::InBody {
            self.body_lines.push(line.to_string());
            return self.state;
        }

        if trimmed.starts_with('#') {
            self.comment(trimmed);
            return self.state;
        }

        if let Some((method, target)) = parse_method_line(trimmed) {
            self.method_line(method, target);
            return self.state;
        }

        if self.state == ParseState::InHeaders {
            if trimmed.is_empty() {
                self.state = ParseState::InBody;
            } else if !trimmed.starts_with("//") {
                self.header_line(trimmed);
            }
        }

        self.state
    }

    /// Flush the last request and build the document
    pub fn finish(mut self) -> Document {
        self.flush();

        if self.requests.is_empty() {
            let mut request = Request::new(Method::Get, DEFAULT_REQUEST_URL);
            request.name = DEFAULT_REQUEST_NAME.to_string();
            self.requests.push(request);
        }

        debug!(
            requests = self.requests.len(),
            variables = self.variables.len(),
            "Parsed request document"
        );

        Document::new(self.requests, self.variables)
    }

    fn start_request(&mut self, trailing: &str) {
        self.flush();

        let mut request = Request {
            name: if trailing.is_empty() {
                self.pending_comments.join(" ")
            } else {
                trailing.to_string()
            },
            ..Request::default()
        };

        if is_pre_auth_marker(trailing) {
            request.is_pre_auth_request = true;
            request.pre_auth = Some(PreAuthConfig::seeded());
        }

        self.current = Some(request);
        self.pending_comments.clear();
        self.body_lines.clear();
        self.state = ParseState::BetweenRequests;
    }

    fn comment(&mut self, trimmed: &str) {
        match self.current.as_mut() {
            None => {
                let text = trimmed.trim_start_matches('#').trim();
                if !text.is_empty() {
                    self.pending_comments.push(text.to_string());
                }
            }
            Some(request) if request.is_pre_auth_request => {
                if let Some(caps) = RESPONSE_PATH_RE.captures(trimmed) {
                    let pre_auth = request.pre_auth.get_or_insert_with(PreAuthConfig::seeded);
                    pre_auth.response_path = caps[1].to_string();
                }
            }
            Some(_) => {}
        }
    }

    fn method_line(&mut self, method: Method, target: &str) {
        let pending = &mut self.pending_comments;
        let request = self.current.get_or_insert_with(|| {
            let name = pending.join(" ");
            pending.clear();
            Request {
                name,
                ..Request::default()
            }
        });

        if request.url.is_empty() {
            request.method = method;
            request.set_target(target);
            self.state = ParseState::InHeaders;
        }
    }

    fn header_line(&mut self, trimmed: &str) {
        let Some(request) = self.current.as_mut() else {
            return;
        };
        if let Some((name, value)) = parse_header_line(trimmed) {
            request.headers.insert(name, value);
        }
    }

    fn flush(&mut self) {
        let body_lines = std::mem::take(&mut self.body_lines);
        let Some(mut request) = self.current.take() else {
            return;
        };
        if request.url.is_empty() {
            return;
        }

        let end = body_lines
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .map_or(0, |i| i + 1);
        request.body = body_lines[..end].join("\n");
        request.body_type = detect_body_type(&request.headers, &request.body);
        request.ensure_name();

        self.requests.push(request);
    }
}

/// Parse `@name = value`, stripping one pair of surrounding quotes
pub fn parse_declaration(line: &str) -> Option<(&str, &str)> {
    let caps = DECLARATION_RE.captures(line)?;
    let name = caps.get(1)?.as_str();
    let value = caps.get(2)?.as_str();
    Some((name, strip_quotes(value)))
}

fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Parse `Name: value`; both sides must be non-empty
fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() || value.is_empty() {
        return None;
    }
    Some((name, value))
}

/// Parse request document content. Never fails.
pub fn parse_http_content(content: &str) -> Document {
    let mut parser = DocumentParser::new();
    for line in content.lines() {
        parser.step(line);
    }
    parser.finish()
}

/// Read and parse a request document from disk
pub fn parse_http_file(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path)?;
    Ok(parse_http_content(&content))
}

/// Collect only the variable declarations of a document
pub fn parse_variables(content: &str) -> VariableTable {
    content
        .lines()
        .filter_map(|line| parse_declaration(line.trim()))
        .collect()
}
