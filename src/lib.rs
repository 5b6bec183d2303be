//! restbook library interface
//!
//! Reads and writes `.http` request documents, converts requests to and from
//! curl commands, imports Postman collections and replays requests with
//! layered variables and an optional pre-auth step.
//!
//! # Module Organization
//!
//! - [`models`] - Requests, documents and variable tables
//! - [`devexp`] - `.http` parsing and serializing, curl, import, encoding, redaction
//! - [`client`] - HTTP execution
//! - [`preauth`] - Bootstrap request execution and token capture
//! - [`config`] - Environments, users and locales
//! - [`errors`] - Error types (RestbookError, Result)
//! - [`status`] - Exit status codes (ExitStatus)
//! - [`core`] - Main execution logic

pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod core;
pub mod devexp;
pub mod errors;
pub mod http;
pub mod logging;
pub mod mime;
pub mod models;
pub mod preauth;
pub mod signals;
pub mod status;
