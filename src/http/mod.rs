//! HTTP protocol types
//!
//! Provides the method enum shared by the document grammar, the curl
//! subsystem and the transport.

mod method;

pub use method::*;
