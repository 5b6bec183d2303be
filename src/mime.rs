//! Body type detection
//!
//! An explicit `Content-Type` header wins; without one the trimmed body is
//! sniffed.

use crate::models::{BodyType, Headers};

/// Classify a body from its headers and content
///
/// # Examples
/// ```
/// use restbook::mime::detect_body_type;
/// use restbook::models::{BodyType, Headers};
///
/// assert_eq!(detect_body_type(&Headers::new(), r#"{"a": 1}"#), BodyType::Json);
/// assert_eq!(detect_body_type(&Headers::new(), "a=1&b=2"), BodyType::Urlencoded);
/// ```
pub fn detect_body_type(headers: &Headers, body: &str) -> BodyType {
    if let Some(body_type) = headers.content_type().and_then(body_type_from_content_type) {
        return body_type;
    }
    sniff_body(body)
}

/// Map a `Content-Type` value to a body type by substring match
pub fn body_type_from_content_type(content_type: &str) -> Option<BodyType> {
    let ct = content_type.to_ascii_lowercase();

    if ct.contains(mime::APPLICATION_JSON.essence_str()) {
        Some(BodyType::Json)
    } else if ct.contains(mime::APPLICATION_WWW_FORM_URLENCODED.essence_str()) {
        Some(BodyType::Urlencoded)
    } else if ct.contains(mime::XML.as_str()) {
        Some(BodyType::Xml)
    } else if ct.contains(mime::HTML.as_str()) {
        Some(BodyType::Html)
    } else if ct.contains(mime::JAVASCRIPT.as_str()) {
        Some(BodyType::Javascript)
    } else {
        None
    }
}

/// Guess a body type from content alone
pub fn sniff_body(body: &str) -> BodyType {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return BodyType::Text;
    }

    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde::de::IgnoredAny>(trimmed).is_ok()
    {
        return BodyType::Json;
    }

    if trimmed.starts_with('<') {
        return BodyType::Xml;
    }

    if trimmed.contains('=') && trimmed.contains('&') {
        return BodyType::Urlencoded;
    }

    BodyType::Text
}

/// Whether headers declare a form-urlencoded body
pub fn is_form_urlencoded(headers: &Headers) -> bool {
    headers
        .content_type()
        .and_then(body_type_from_content_type)
        == Some(BodyType::Urlencoded)
}
