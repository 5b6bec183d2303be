//! HTTP request sending
//!
//! A thin layer over reqwest. [`HttpClient::send`] never fails: transport
//! problems come back as an [`HttpResponse`] with status 0 and `is_error`
//! set, so callers handle every outcome the same way.

use std::time::{Duration, Instant};

use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::models::{BodyType, Request};

pub const USER_AGENT_STRING: &str = concat!("restbook/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const MAX_REDIRECTS: usize = 5;

/// Client construction options
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    /// Accept invalid TLS certificates (self-signed dev servers, intercepting proxies)
    pub insecure: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            insecure: false,
        }
    }
}

/// Outcome of one send, successful or not
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    /// 0 when no response was received
    pub status: u16,
    pub status_text: String,
    pub headers: IndexMap<String, String>,
    /// Parsed JSON, or the body text as a JSON string
    pub data: JsonValue,
    pub duration_ms: u64,
    /// Transport failure or a 4xx/5xx status
    pub is_error: bool,
}

impl HttpResponse {
    fn transport_error(message: String, duration_ms: u64) -> Self {
        Self {
            status: 0,
            status_text: message.clone(),
            headers: IndexMap::new(),
            data: json!({ "error": message }),
            duration_ms,
            is_error: true,
        }
    }

    /// Body as display text: pretty JSON, or the raw string
    pub fn body_text(&self) -> String {
        match &self.data {
            JsonValue::String(s) => s.clone(),
            JsonValue::Null => String::new(),
            other => serde_json::to_string_pretty(other).unwrap_or_default(),
        }
    }
}

/// Reusable client for sending document requests
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT_STRING)
            .timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .danger_accept_invalid_certs(options.insecure)
            .build()?;
        Ok(Self { client })
    }

    /// Send a fully substituted request
    pub async fn send(&self, request: &Request) -> HttpResponse {
        let url = request.full_url();
        let start = Instant::now();

        info!(method = %request.method, url = %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method.into(), &url)
            .headers(build_headers(request));

        if request.method.carries_body() && !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let result = builder.send().await;
        match result {
            Ok(response) => {
                let response = read_response(response, start).await;
                debug!(status = response.status, duration_ms = response.duration_ms, "Received response");
                response
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Request failed");
                HttpResponse::transport_error(message, elapsed_ms(start))
            }
        }
    }
}

/// Header map for the wire. Invalid names or values are skipped, and a
/// `Content-Type` is implied for JSON and form bodies that lack one.
fn build_headers(request: &Request) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for (name, value) in request.headers.iter() {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => warn!(header = %name, "Skipping invalid header"),
        }
    }

    if !headers.contains_key(CONTENT_TYPE) && request.method.carries_body() && !request.body.is_empty() {
        let implied = match request.body_type {
            BodyType::Json => HeaderValue::from_str(::mime::APPLICATION_JSON.essence_str()).ok(),
            BodyType::Urlencoded => {
                HeaderValue::from_str(::mime::APPLICATION_WWW_FORM_URLENCODED.essence_str()).ok()
            }
            _ => None,
        };
        if let Some(value) = implied {
            headers.insert(CONTENT_TYPE, value);
        }
    }

    headers
}

async fn read_response(response: Response, start: Instant) -> HttpResponse {
    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
        .collect();

    let data = match response.text().await {
        Ok(text) => serde_json::from_str(&text).unwrap_or(JsonValue::String(text)),
        Err(e) => json!({ "error": e.to_string() }),
    };

    HttpResponse {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        headers,
        data,
        duration_ms: elapsed_ms(start),
        is_error: status.is_client_error() || status.is_server_error(),
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> HttpClient {
        HttpClient::new(&ClientOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn test_send_json_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(query_param("page", "2"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": [1, 2]})))
            .mount(&server)
            .await;

        let mut request = Request::new(Method::Get, &format!("{}/users?page=2", server.uri()));
        request.headers.insert("Accept", "application/json");

        let response = client().send(&request).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.status_text, "OK");
        assert!(!response.is_error);
        assert_eq!(response.data, json!({"users": [1, 2]}));
    }

    #[tokio::test]
    async fn test_body_sent_with_implied_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/items"))
            .and(header("content-type", "application/json"))
            .and(body_string(r#"{"a":1}"#))
            .respond_with(ResponseTemplate::new(201).set_body_string("created"))
            .mount(&server)
            .await;

        let mut request = Request::new(Method::Post, &format!("{}/items", server.uri()));
        request.body = r#"{"a":1}"#.to_string();
        request.body_type = BodyType::Json;

        let response = client().send(&request).await;
        assert_eq!(response.status, 201);
        assert_eq!(response.data, JsonValue::String("created".to_string()));
    }

    #[tokio::test]
    async fn test_error_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let request = Request::new(Method::Delete, &format!("{}/missing", server.uri()));
        let response = client().send(&request).await;
        assert_eq!(response.status, 404);
        assert!(response.is_error);
    }

    #[tokio::test]
    async fn test_transport_error_never_fails() {
        let request = Request::new(Method::Get, "http://127.0.0.1:1/unreachable");
        let response = client().send(&request).await;
        assert_eq!(response.status, 0);
        assert!(response.is_error);
        assert!(response.data.get("error").is_some());
    }

    #[tokio::test]
    async fn test_unresolved_placeholder_url_is_transport_error() {
        let request = Request::new(Method::Get, "{{host}}/x");
        let response = client().send(&request).await;
        assert_eq!(response.status, 0);
        assert!(response.is_error);
    }

    #[test]
    fn test_body_text() {
        let response = HttpResponse::transport_error("boom".to_string(), 3);
        assert!(response.body_text().contains("\"error\": \"boom\""));
    }
}
