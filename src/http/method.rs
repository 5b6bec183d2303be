//! HTTP methods understood by a request document

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Matches a document method line: `METHOD target [anything]`.
///
/// The target runs to the first whitespace outside a `{{ name }}` placeholder.
static METHOD_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(GET|POST|PUT|DELETE|PATCH|HEAD|OPTIONS)\s+((?:\{\{\s*\w+\s*\}\}|\S)+)")
        .expect("Invalid method line regex")
});

/// HTTP method of a saved request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

/// All supported methods, in display order
pub const STANDARD_METHODS: &[Method] = &[
    Method::Get,
    Method::Post,
    Method::Put,
    Method::Delete,
    Method::Patch,
    Method::Head,
    Method::Options,
];

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }

    /// Whether the transport sends a body for this method
    pub fn carries_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the supported methods
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported HTTP method: {}", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        STANDARD_METHODS
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
            Method::Head => reqwest::Method::HEAD,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// Check if a string is a supported HTTP method (case-insensitive)
pub fn is_standard(method: &str) -> bool {
    method.parse::<Method>().is_ok()
}

/// Split a method line into method and target.
///
/// Anything after the target (an `HTTP/1.1` suffix, say) is ignored.
pub fn parse_method_line(line: &str) -> Option<(Method, &str)> {
    let caps = METHOD_LINE_RE.captures(line)?;
    let method = caps.get(1)?.as_str().parse().ok()?;
    let target = caps.get(2)?.as_str();
    Some((method, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_standard() {
        assert!(is_standard("GET"));
        assert!(is_standard("get"));
        assert!(is_standard("Post"));
        assert!(!is_standard("TRACE"));
        assert!(!is_standard("CUSTOM"));
    }

    #[test]
    fn test_display_round_trips() {
        for method in STANDARD_METHODS {
            assert_eq!(method.to_string().parse::<Method>(), Ok(*method));
        }
    }

    #[test]
    fn test_parse_method_line() {
        assert_eq!(
            parse_method_line("POST https://x/y HTTP/1.1"),
            Some((Method::Post, "https://x/y"))
        );
        assert_eq!(
            parse_method_line("delete {{host}}/items/1"),
            Some((Method::Delete, "{{host}}/items/1"))
        );
        assert_eq!(
            parse_method_line("GET {{ host }}/users?q={{ term }} HTTP/1.1"),
            Some((Method::Get, "{{ host }}/users?q={{ term }}"))
        );
        assert_eq!(parse_method_line("GET"), None);
        assert_eq!(parse_method_line("GETTER https://x"), None);
        assert_eq!(parse_method_line("Content-Type: application/json"), None);
    }

    #[test]
    fn test_carries_body() {
        assert!(Method::Post.carries_body());
        assert!(Method::Patch.carries_body());
        assert!(!Method::Get.carries_body());
        assert!(!Method::Delete.carries_body());
    }
}
