//! Request document (`.http`) support
//!
//! A document holds any number of requests separated by `###` lines, plus
//! `@name = value` variable declarations shared by all of them:
//!
//! ```http
//! @host = https://api.example.com
//!
//! ### @PRE-AUTH
//! # @responsePath data.token
//! POST {{host}}/login
//! Content-Type: application/json
//!
//! {"username": "", "password": ""}
//!
//! ### List users
//! GET {{host}}/users?page=1
//! Authorization: Bearer {{auth}}
//! ```

mod parser;
mod serializer;

pub use parser::{
    parse_declaration, parse_http_content, parse_http_file, parse_variables, DocumentParser,
    ParseState, DEFAULT_REQUEST_NAME, DEFAULT_REQUEST_URL,
};
pub use serializer::{save_http_file, serialize, serialize_requests};

use crate::models::Document;

/// One row of `--list` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    /// 1-based position in the document
    pub index: usize,
    pub name: String,
    pub method: String,
    pub url: String,
    pub bootstrap: bool,
}

/// Summaries of every request in a document
pub fn list_requests(document: &Document) -> Vec<RequestSummary> {
    document
        .requests
        .iter()
        .enumerate()
        .map(|(i, r)| RequestSummary {
            index: i + 1,
            name: r.name.clone(),
            method: r.method.to_string(),
            url: r.full_url(),
            bootstrap: r.is_bootstrap(),
        })
        .collect()
}
