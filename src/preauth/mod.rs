//! Pre-auth execution
//!
//! Runs the document's bootstrap request (kept as a curl command template)
//! and pulls one value out of its JSON response, typically a token that
//! later requests reference as `{{auth}}`.

use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::client::HttpClient;
use crate::devexp::curl_import::parse_curl;
use crate::devexp::variables::substitute;
use crate::errors::{RestbookError, Result};
use crate::models::{PreAuthConfig, VariableTable};

/// Session variable the captured value is stored under
pub const AUTH_VARIABLE: &str = "auth";

/// Execute the bootstrap call and extract the configured response value
pub async fn execute_pre_auth(
    client: &HttpClient,
    config: &PreAuthConfig,
    variables: &VariableTable,
) -> Result<String> {
    if !config.is_complete() {
        return Err(RestbookError::PreAuth("incomplete configuration".to_string()));
    }

    let mut scope = variables.clone();
    if let Some(username) = config.username.as_deref().filter(|u| !u.is_empty()) {
        scope.declare("username", username);
    }
    if let Some(password) = config.password.as_deref().filter(|p| !p.is_empty()) {
        scope.declare("password", password);
    }

    debug!(
        has_username = scope.contains("username"),
        has_password = scope.contains("password"),
        "Running pre-auth"
    );

    let command = substitute(&config.curl_command, &scope);
    let request = parse_curl(&command);
    if request.url.is_empty() {
        return Err(RestbookError::PreAuth("curl command has no URL".to_string()));
    }

    let response = client.send(&request).await;
    if response.is_error {
        let reason = if response.status == 0 {
            response.status_text
        } else {
            format!("status {} {}", response.status, response.status_text)
        };
        return Err(RestbookError::PreAuth(reason.trim().to_string()));
    }

    let value = extract_response_value(&response.data, &config.response_path)?;
    info!(path = %config.response_path, "Pre-auth value captured");
    Ok(value)
}

/// Extract the value at a dot path. Strings come back bare, anything
/// else as compact JSON.
pub fn extract_response_value(data: &JsonValue, path: &str) -> Result<String> {
    let missing = || RestbookError::ResponsePath {
        path: path.to_string(),
    };

    match json_path(data, path).ok_or_else(missing)? {
        JsonValue::Null => Err(missing()),
        JsonValue::String(s) => Ok(s.clone()),
        other => Ok(other.to_string()),
    }
}

/// Resolve `a.b[0].c`, `a.b.0.c` or `$.a.b` against a JSON value
pub fn json_path<'a>(data: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.trim();
    let path = path
        .strip_prefix("$.")
        .or_else(|| path.strip_prefix('$'))
        .unwrap_or(path);

    let mut current = data;
    for segment in path.split('.') {
        if segment.is_empty() {
            continue;
        }

        let (key, indices) = match segment.find('[') {
            Some(pos) => segment.split_at(pos),
            None => (segment, ""),
        };

        if !key.is_empty() {
            current = match current {
                JsonValue::Array(items) => items.get(key.parse::<usize>().ok()?)?,
                other => other.get(key)?,
            };
        }

        for index in indices.split('[').skip(1) {
            let index = index.strip_suffix(']')?.trim().parse::<usize>().ok()?;
            current = current.as_array()?.get(index)?;
        }
    }

    Some(current)
}
