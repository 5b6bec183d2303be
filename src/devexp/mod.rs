//! Request authoring tools
//!
//! - **http_file**: parse and write `.http` request documents
//! - **variables**: `{{name}}` templating
//! - **encode**: percent-encoding that keeps placeholders intact
//! - **redact**: credential removal for bootstrap bodies
//! - **curl / curl_import**: curl command export and import
//! - **import / postman**: import routing and Postman collections
//!
//! ```bash
//! # Print curl commands for every request in a document
//! restbook --curl api.http
//!
//! # Append a pasted curl command to a document
//! restbook --import "curl -X POST https://api.example.com/users -d '{\"name\":\"John\"}'" api.http
//! ```

pub mod curl;
pub mod curl_import;
pub mod encode;
pub mod http_file;
pub mod import;
pub mod postman;
pub mod redact;
pub mod variables;

pub use curl::{build_curl, build_pre_auth_curl, CurlDialect};
pub use curl_import::parse_curl;
pub use encode::smart_encode;
pub use http_file::{parse_http_content, parse_http_file, serialize};
pub use import::import_requests;
pub use redact::redact;
pub use variables::{count_usages, has_variables, substitute, VariableScope};
