//! Core data types
//!
//! [`IndexMap`](indexmap::IndexMap) backs every user-facing dictionary so
//! headers, query parameters and variables come back out in the order they
//! were written.

pub mod document;
pub mod request;
pub mod variables;

pub use document::Document;
pub use request::{BodyType, Headers, PreAuthConfig, QueryParam, Request};
pub use variables::VariableTable;
