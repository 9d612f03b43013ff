//! Error types surfaced by the storage client

use crate::transport::TransportError;
use hyper::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors returned by every client operation
#[derive(Error, Debug)]
pub enum StorageError {
    /// Missing or unusable credentials at construction time
    #[error("{0}")]
    Configuration(String),

    /// A required per-operation field was not supplied. Nothing was sent.
    #[error("{field} is required for {operation} operation")]
    Validation {
        field: &'static str,
        operation: &'static str,
    },

    /// Unknown signed-URL operation tag
    #[error("Unsupported operation type: {0}")]
    UnsupportedOperation(String),

    /// The server answered with a non-success status
    #[error("API Error {status}: {message}")]
    Api { status: u16, message: String },

    /// No response was received; the transport error is passed through untouched
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Response body did not match the requested shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Request body could not be serialized. Nothing was sent.
    #[error("Encode error: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub(crate) fn missing(field: &'static str, operation: &'static str) -> Self {
        StorageError::Validation { field, operation }
    }

    /// Build an `Api` error from a failed response.
    ///
    /// Uses the JSON `message` field when the body carries a non-empty one,
    /// otherwise the body re-serialized as JSON in the server's key order,
    /// otherwise the raw text.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let message = match serde_json::from_slice::<Value>(body) {
            Ok(value) => match value.get("message") {
                Some(Value::String(message)) if !message.is_empty() => message.clone(),
                _ => value.to_string(),
            },
            Err(_) => String::from_utf8_lossy(body).into_owned(),
        };

        StorageError::Api {
            status: status.as_u16(),
            message,
        }
    }

    /// HTTP status for `Api` errors
    pub fn status(&self) -> Option<u16> {
        match self {
            StorageError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for errors raised before any request was dispatched
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            StorageError::Configuration(_)
                | StorageError::Validation { .. }
                | StorageError::UnsupportedOperation(_)
                | StorageError::Encode(_)
        )
    }
}
