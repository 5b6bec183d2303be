//! HTTP client functionality

pub mod http;

pub use http::{ClientOptions, HttpClient, HttpResponse, USER_AGENT_STRING};
