//! Error message normalization.
//!
//! Every failed request becomes one human-readable message. Priority order:
//! the server's `message` field, then the transport's own message, then
//! [`FALLBACK_ERROR_MESSAGE`].

use serde::Deserialize;
use showcase_core::{CatalogError, FALLBACK_ERROR_MESSAGE};

#[derive(Deserialize)]
struct ServerError {
    message: Option<String>,
}

/// Extract the server-supplied `message` field from an error body.
pub fn server_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ServerError>(body)
        .ok()
        .and_then(|e| e.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

/// Pick the first non-empty message in priority order.
pub fn normalize_message(server: Option<String>, transport: Option<String>) -> String {
    server
        .into_iter()
        .chain(transport)
        .find(|m| !m.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

/// Build the error for a non-2xx response.
pub fn status_error(status: u16, body: &[u8]) -> CatalogError {
    let transport = format!("Request failed with status code {}", status);
    CatalogError::transport(normalize_message(server_message(body), Some(transport)), Some(status))
}
