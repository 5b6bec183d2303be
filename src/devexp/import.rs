//! Import routing
//!
//! Pasted or loaded content is either a Postman collection (JSON object) or
//! a curl command. Anything else is rejected as a whole; there is no
//! partial import.

use tracing::{debug, info};

use crate::devexp::curl_import::parse_curl;
use crate::devexp::postman::{collection_requests, Collection};
use crate::errors::{RestbookError, Result};
use crate::models::Request;

/// Detected shape of import content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Postman,
    Curl,
}

/// Classify content without parsing it
pub fn detect_format(content: &str) -> Option<ImportFormat> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('{') {
        Some(ImportFormat::Postman)
    } else if trimmed
        .get(..4)
        .is_some_and(|head| head.eq_ignore_ascii_case("curl"))
    {
        Some(ImportFormat::Curl)
    } else {
        None
    }
}

/// Turn import content into requests
pub fn import_requests(content: &str) -> Result<Vec<Request>> {
    let trimmed = content.trim();

    let requests = match detect_format(trimmed) {
        Some(ImportFormat::Postman) => {
            let collection: Collection = serde_json::from_str(trimmed)
                .map_err(|e| RestbookError::InvalidImport(format!("invalid JSON: {}", e)))?;
            debug!(
                collection = collection.info.as_ref().and_then(|i| i.name.as_deref()).unwrap_or(""),
                "Importing Postman collection"
            );
            collection_requests(&collection)
        }
        Some(ImportFormat::Curl) => vec![parse_curl(trimmed)],
        None => return Err(RestbookError::UnsupportedImport),
    };

    info!(count = requests.len(), "Imported requests");
    Ok(requests)
}
