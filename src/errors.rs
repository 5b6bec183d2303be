//! Error types for restbook
//!
//! Parsing, serializing and curl import are total and never produce these;
//! errors come from I/O, configuration, import routing and the network.

use thiserror::Error;

/// Main error type for restbook
#[derive(Error, Debug)]
pub enum RestbookError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported import format. Provide a Postman collection (JSON) or a curl command.")]
    UnsupportedImport,

    #[error("Invalid import: {0}")]
    InvalidImport(String),

    #[error("Could not extract a value at response path '{path}'")]
    ResponsePath { path: String },

    #[error("Pre-auth failed: {0}")]
    PreAuth(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("No request matches '{0}'")]
    RequestNotFound(String),

    #[error("Invalid argument: {0}")]
    Argument(String),
}

pub type Result<T> = std::result::Result<T, RestbookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_reason() {
        let err = RestbookError::ResponsePath { path: "data.token".to_string() };
        assert_eq!(err.to_string(), "Could not extract a value at response path 'data.token'");

        assert!(RestbookError::UnsupportedImport.to_string().starts_with("Unsupported import format"));
        assert_eq!(
            RestbookError::RequestNotFound("login".to_string()).to_string(),
            "No request matches 'login'"
        );
    }

    #[test]
    fn test_from_io() {
        let err: RestbookError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, RestbookError::Io(_)));
    }
}
