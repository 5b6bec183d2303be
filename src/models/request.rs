//! Saved request types
//!
//! A [`Request`] is one HTTP call as it lives in a request document. Headers
//! and query parameters keep the order the user entered them in, because
//! that is the order they are rendered and written back.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::devexp::encode::smart_encode;
use crate::http::Method;

/// Name given to a request when nothing better can be derived
pub const UNNAMED_REQUEST: &str = "Unnamed Request";

/// Separator trailing text that marks the bootstrap request
pub const PRE_AUTH_MARKER: &str = "@PRE-AUTH";

/// One `key=value` entry of a query string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    pub key: String,
    pub value: String,
    /// Disabled entries are kept for editing but left out of the composed URL
    pub enabled: bool,
}

impl QueryParam {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }
}

/// Advisory body classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    Json,
    #[default]
    Text,
    Urlencoded,
    Xml,
    Html,
    Javascript,
}

impl BodyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyType::Json => "json",
            BodyType::Text => "text",
            BodyType::Urlencoded => "urlencoded",
            BodyType::Xml => "xml",
            BodyType::Html => "html",
            BodyType::Javascript => "javascript",
        }
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(BodyType::Json),
            "text" => Ok(BodyType::Text),
            "urlencoded" => Ok(BodyType::Urlencoded),
            "xml" => Ok(BodyType::Xml),
            "html" => Ok(BodyType::Html),
            "javascript" => Ok(BodyType::Javascript),
            other => Err(format!("unknown body type: {}", other)),
        }
    }
}

/// Ordered header map with case-insensitive lookups.
///
/// Names keep the spelling they were first entered with; inserting the
/// same name in another case replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(IndexMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.0.keys().position(|k| k.eq_ignore_ascii_case(name))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => {
                if let Some((_, existing)) = self.0.get_index_mut(idx) {
                    *existing = value;
                }
            }
            None => {
                self.0.insert(name, value);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|idx| self.0.get_index(idx))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.position(name)?;
        self.0.shift_remove_index(idx).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut String> {
        self.0.values_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get("content-type")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

/// How to obtain a token before the real request executes
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreAuthConfig {
    pub enabled: bool,
    /// Curl command template, usually with `{{username}}` / `{{password}}`
    pub curl_command: String,
    /// Dot path into the JSON response locating the value to capture
    pub response_path: String,
    /// Overrides the `username` document variable when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Overrides the `password` document variable when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl PreAuthConfig {
    /// Config attached to a freshly parsed `### @PRE-AUTH` request
    pub fn seeded() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.curl_command.trim().is_empty() && !self.response_path.trim().is_empty()
    }
}

// Credentials must never reach logs
impl fmt::Debug for PreAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreAuthConfig")
            .field("enabled", &self.enabled)
            .field("curl_command", &self.curl_command)
            .field("response_path", &self.response_path)
            .field("username", &self.username.as_ref().map(|_| "[REDACTED]"))
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// One saved HTTP call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Regenerated on every parse; never written to the document
    pub id: Uuid,
    pub name: String,
    pub method: Method,
    /// Base URL without query string
    pub url: String,
    pub query_params: Vec<QueryParam>,
    pub headers: Headers,
    /// Raw body text, line breaks and indentation preserved
    pub body: String,
    pub body_type: BodyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_auth: Option<PreAuthConfig>,
    #[serde(default)]
    pub is_pre_auth_request: bool,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            method: Method::Get,
            url: String::new(),
            query_params: Vec::new(),
            headers: Headers::new(),
            body: String::new(),
            body_type: BodyType::Text,
            pre_auth: None,
            is_pre_auth_request: false,
        }
    }
}

impl Request {
    /// Create a request from a method and a target that may carry a query string
    pub fn new(method: Method, target: &str) -> Self {
        let mut request = Self {
            method,
            ..Self::default()
        };
        request.set_target(target);
        request
    }

    /// Set URL and query parameters from a target such as `https://x/y?a=1`
    pub fn set_target(&mut self, target: &str) {
        let (url, query_params) = split_target(target);
        self.url = url;
        self.query_params = query_params;
    }

    /// Base URL with the enabled query parameters re-attached
    pub fn full_url(&self) -> String {
        let query = self
            .query_params
            .iter()
            .filter(|p| p.enabled && !p.key.is_empty())
            .map(|p| format!("{}={}", smart_encode(&p.key), smart_encode(&p.value)))
            .collect::<Vec<_>>()
            .join("&");

        if query.is_empty() {
            self.url.clone()
        } else {
            format!("{}?{}", self.url, query)
        }
    }

    /// True for the document's authentication bootstrap step
    pub fn is_bootstrap(&self) -> bool {
        self.is_pre_auth_request || is_pre_auth_marker(&self.name)
    }

    /// `METHOD /path` label used when a request has no explicit name
    pub fn route_name(&self) -> String {
        if self.url.is_empty() {
            return String::new();
        }

        let route = if self.url.contains("{{") {
            self.url.clone()
        } else {
            match Url::parse(&self.url) {
                Ok(parsed) => {
                    let path = parsed.path();
                    if path.is_empty() {
                        self.url.clone()
                    } else {
                        path.to_string()
                    }
                }
                Err(_) => self.url.clone(),
            }
        };

        format!("{} {}", self.method, route)
    }

    /// The explicit name, else the route, else the generic placeholder
    pub fn display_name(&self) -> String {
        let name = self.name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
        let route = self.route_name();
        if route.is_empty() {
            UNNAMED_REQUEST.to_string()
        } else {
            route
        }
    }

    /// Fill an empty name from the URL, or with the generic placeholder
    pub fn ensure_name(&mut self) {
        if self.name.trim().is_empty() {
            self.name = self.display_name();
        }
    }
}

/// Whether a name or separator text denotes the bootstrap request.
///
/// Comparison ignores case and all whitespace.
pub fn is_pre_auth_marker(text: &str) -> bool {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    compact.eq_ignore_ascii_case(PRE_AUTH_MARKER)
}

/// Split a request target at the first `?` into base URL and decoded query params
pub fn split_target(target: &str) -> (String, Vec<QueryParam>) {
    match target.split_once('?') {
        Some((base, query)) => {
            let params = url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| QueryParam::new(k.into_owned(), v.into_owned()))
                .collect();
            (base.to_string(), params)
        }
        None => (target.to_string(), Vec::new()),
    }
}
