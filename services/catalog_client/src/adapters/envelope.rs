//! services/catalog_client/src/adapters/envelope.rs
//!
//! Decoding for the one backend endpoint that wraps its payload as
//! `{"body": "<json encoded as a string>"}`. Nothing outside this module sees the wrapper.

use book_catalog_core::ports::{Operation, PortError, PortResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Deserialize)]
struct Envelope {
    body: String,
}

/// Parses the outer envelope, then parses its `body` string as `T`.
pub fn decode_enveloped<T: DeserializeOwned>(operation: Operation, raw: &[u8]) -> PortResult<T> {
    let envelope: Envelope = serde_json::from_slice(raw).map_err(|e| PortError::ServerError {
        operation,
        status: 200,
        detail: format!("malformed envelope: {}", e),
    })?;

    serde_json::from_str(&envelope.body).map_err(|e| PortError::ServerError {
        operation,
        status: 200,
        detail: format!("malformed envelope body: {}", e),
    })
}
