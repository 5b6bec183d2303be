//! Postman collection (v2.x) import
//!
//! Only the parts of the collection format needed to rebuild requests are
//! modelled; everything else in the JSON is ignored.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::devexp::encode::smart_encode;
use crate::http::Method;
use crate::mime::detect_body_type;
use crate::models::{BodyType, Headers, Request};

/// Name of a top-level request without one
pub const UNNAMED_ITEM: &str = "Imported Request";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Collection {
    pub info: Option<Info>,
    pub item: Vec<Item>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Info {
    pub name: Option<String>,
}

/// A folder (has `item`) or a request (has `request`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Item {
    pub name: Option<String>,
    pub item: Option<Vec<Item>>,
    pub request: Option<RequestSpec>,
}

/// A request given as a bare URL string or a full object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RequestSpec {
    Url(String),
    Full(ItemRequest),
}

impl RequestSpec {
    fn to_item_request(&self) -> ItemRequest {
        match self {
            RequestSpec::Url(url) => ItemRequest {
                url: Some(Url::Raw(url.clone())),
                ..ItemRequest::default()
            },
            RequestSpec::Full(request) => request.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ItemRequest {
    pub method: Option<String>,
    pub url: Option<Url>,
    pub header: Vec<KeyValue>,
    pub body: Option<Body>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Url {
    Raw(String),
    Parts(UrlParts),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UrlParts {
    pub raw: Option<String>,
    pub protocol: Option<String>,
    pub host: Option<StringOrList>,
    pub port: Option<JsonValue>,
    pub path: Option<StringOrList>,
    pub query: Vec<KeyValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    fn join(&self, sep: &str) -> String {
        match self {
            StringOrList::One(s) => s.clone(),
            StringOrList::Many(parts) => parts.join(sep),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KeyValue {
    pub key: Option<String>,
    pub value: Option<String>,
    pub disabled: bool,
}

impl KeyValue {
    fn enabled_pair(&self) -> Option<(&str, &str)> {
        if self.disabled {
            return None;
        }
        Some((self.key.as_deref()?, self.value.as_deref().unwrap_or("")))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Body {
    pub mode: Option<String>,
    pub raw: Option<String>,
    pub urlencoded: Vec<KeyValue>,
}

impl UrlParts {
    fn build(&self) -> String {
        if let Some(raw) = self.raw.as_deref().filter(|r| !r.is_empty()) {
            return raw.to_string();
        }

        let mut url = String::new();
        if let Some(protocol) = &self.protocol {
            url.push_str(protocol);
            url.push_str("://");
        }
        if let Some(host) = &self.host {
            url.push_str(&host.join("."));
        }
        match &self.port {
            Some(JsonValue::String(port)) if !port.is_empty() => {
                url.push(':');
                url.push_str(port);
            }
            Some(JsonValue::Number(port)) => {
                url.push(':');
                url.push_str(&port.to_string());
            }
            _ => {}
        }
        if let Some(path) = &self.path {
            url.push('/');
            url.push_str(&path.join("/"));
        }

        let query = encode_pairs(&self.query);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        url
    }
}

fn encode_pairs(pairs: &[KeyValue]) -> String {
    pairs
        .iter()
        .filter_map(KeyValue::enabled_pair)
        .map(|(k, v)| format!("{}={}", smart_encode(k), smart_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Flatten a collection into requests, folders first-to-last
pub fn collection_requests(collection: &Collection) -> Vec<Request> {
    let mut requests = Vec::new();
    walk(&collection.item, "", &mut requests);
    requests
}

fn walk(items: &[Item], prefix: &str, out: &mut Vec<Request>) {
    for item in items {
        if let Some(children) = &item.item {
            let folder = item.name.as_deref().unwrap_or("Folder");
            let nested = if prefix.is_empty() {
                folder.to_string()
            } else {
                format!("{} / {}", prefix, folder)
            };
            walk(children, &nested, out);
        } else if let Some(request) = &item.request {
            let name = match (prefix.is_empty(), item.name.as_deref()) {
                (true, Some(name)) => name.to_string(),
                (true, None) => UNNAMED_ITEM.to_string(),
                (false, name) => format!("{} / {}", prefix, name.unwrap_or("Request")),
            };
            out.push(convert(&request.to_item_request(), name));
        }
    }
}

fn convert(source: &ItemRequest, name: String) -> Request {
    let method = source
        .method
        .as_deref()
        .and_then(|m| m.parse::<Method>().ok())
        .unwrap_or_default();

    let url = match &source.url {
        Some(Url::Raw(raw)) => raw.clone(),
        Some(Url::Parts(parts)) => parts.build(),
        None => String::new(),
    };

    let headers: Headers = source
        .header
        .iter()
        .filter_map(KeyValue::enabled_pair)
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .collect();

    let (body, body_type) = match &source.body {
        Some(body) if body.mode.as_deref() == Some("raw") => {
            let raw = body.raw.clone().unwrap_or_default();
            let body_type = detect_body_type(&headers, &raw);
            (raw, body_type)
        }
        Some(body) if body.mode.as_deref() == Some("urlencoded") => {
            (encode_pairs(&body.urlencoded), BodyType::Urlencoded)
        }
        _ => (String::new(), BodyType::Text),
    };

    let mut request = Request::new(method, &url);
    request.name = name;
    request.headers = headers;
    request.body = body;
    request.body_type = body_type;
    request
}
