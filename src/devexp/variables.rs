//! `{{variable}}` templating
//!
//! Placeholders are `{{`, optional whitespace, one or more word characters,
//! optional whitespace, `}}`. Substitution is partial: a placeholder with no
//! declared value is left exactly as written.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::models::{Request, VariableTable};

/// Matches a placeholder and captures the variable name
pub static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("Invalid placeholder regex")
});

/// Replace every declared placeholder with its value.
///
/// Single pass: substituted values are not scanned again.
pub fn substitute(text: &str, variables: &VariableTable) -> String {
    substitute_cow(text, variables).into_owned()
}

fn substitute_cow<'a>(text: &'a str, variables: &VariableTable) -> Cow<'a, str> {
    if !text.contains("{{") {
        return Cow::Borrowed(text);
    }
    PLACEHOLDER_RE.replace_all(text, |caps: &Captures| {
        let name = &caps[1];
        match variables.get(name) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// Count placeholders for `name` in a piece of text
pub fn count_in(text: &str, name: &str) -> usize {
    PLACEHOLDER_RE
        .captures_iter(text)
        .filter(|caps| &caps[1] == name)
        .count()
}

/// Occurrences of `name` across the composed URL, header values and body
pub fn count_usages(request: &Request, name: &str) -> usize {
    let url = count_in(&request.full_url(), name);
    let headers: usize = request.headers.iter().map(|(_, v)| count_in(v, name)).sum();
    let body = count_in(&request.body, name);
    url + headers + body
}

/// Check if a string contains a `{{variable}}` placeholder
pub fn has_variables(s: &str) -> bool {
    PLACEHOLDER_RE.is_match(s)
}

/// Distinct variable names referenced in `text`, in order of first use
pub fn find_placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(text) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Variable names a request references but `variables` does not declare
pub fn undefined_variables(request: &Request, variables: &VariableTable) -> Vec<String> {
    let mut text = request.full_url();
    for (_, value) in request.headers.iter() {
        text.push('\n');
        text.push_str(value);
    }
    text.push('\n');
    text.push_str(&request.body);

    find_placeholders(&text)
        .into_iter()
        .filter(|name| !variables.contains(name))
        .collect()
}

/// Substituted copy of a request, ready to hand to the transport
pub fn substitute_request(request: &Request, variables: &VariableTable) -> Request {
    let mut resolved = request.clone();
    resolved.url = substitute(&request.url, variables);
    for param in &mut resolved.query_params {
        param.key = substitute(&param.key, variables);
        param.value = substitute(&param.value, variables);
    }
    for value in resolved.headers.values_mut() {
        *value = substitute(value, variables);
    }
    resolved.body = substitute(&request.body, variables);
    resolved
}

/// Layered variable lookup used when sending.
///
/// Layers are applied in order, so later layers win: configuration
/// (environment, then user), then document variables, then session values
/// such as a captured `auth` token.
#[derive(Debug, Clone, Default)]
pub struct VariableScope {
    resolved: VariableTable,
}

impl VariableScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(mut self, variables: &VariableTable) -> Self {
        self.resolved.merge(variables);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.resolved.declare(name, value);
    }

    pub fn variables(&self) -> &VariableTable {
        &self.resolved
    }

    pub fn substitute(&self, text: &str) -> String {
        substitute(text, &self.resolved)
    }

    pub fn resolve(&self, request: &Request) -> Request {
        substitute_request(request, &self.resolved)
    }
}
