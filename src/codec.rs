//! Error serialization boundary.
//!
//! Errors raised inside the worker cross the channel as [`SerializedError`]
//! payloads and are rebuilt on the host by an [`ErrorCodec`]. The codec
//! consults a registry of custom constructors keyed by error kind; kinds
//! without a registered constructor fall back to the generic
//! [`RemoteError`], which preserves the original kind, message, and
//! structured data.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Boxed host-side error produced by deserialization.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Constructor rebuilding a host-side error from a payload of its kind.
pub type ErrorConstructor = Arc<dyn Fn(&SerializedError) -> BoxError + Send + Sync>;

/// Transmissible form of an error raised inside the worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedError {
    /// Error kind name, used to select a constructor on the host.
    pub kind: String,
    /// Display message of the original error.
    pub message: String,
    /// Structured payload carried by the original error.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl SerializedError {
    /// Capture a worker-side error into its transmissible form.
    pub fn from_error(error: &dyn WireError) -> Self {
        Self {
            kind: error.kind().to_owned(),
            message: error.to_string(),
            data: error.data(),
        }
    }

    /// Payload for an error with no structured data.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            data: Value::Null,
        }
    }
}

/// Worker-side errors that can cross the channel.
///
/// `kind` selects the constructor the host will use to rebuild the error;
/// `data` carries any structured payload the host should see beyond the
/// display message.
pub trait WireError: Error {
    fn kind(&self) -> &str {
        "Error"
    }

    fn data(&self) -> Value {
        Value::Null
    }
}

impl WireError for std::io::Error {}

/// Host-side form of a worker error whose kind has no registered
/// constructor. Displays as the original message; the kind and any
/// structured data remain available as fields.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct RemoteError {
    /// Kind name reported by the worker.
    pub kind: String,
    /// Display message of the original error.
    pub message: String,
    /// Structured payload of the original error.
    pub data: Value,
}

impl From<SerializedError> for RemoteError {
    fn from(payload: SerializedError) -> Self {
        Self {
            kind: payload.kind,
            message: payload.message,
            data: payload.data,
        }
    }
}

/// Deserializer for error payloads arriving from the worker.
///
/// Holds the custom-constructor registry supplied at initialization; the
/// registry is read-only for the lifetime of the instance.
pub struct ErrorCodec {
    constructors: HashMap<String, ErrorConstructor>,
}

impl ErrorCodec {
    pub fn new(constructors: HashMap<String, ErrorConstructor>) -> Self {
        Self { constructors }
    }

    /// Rebuild a host-side error from its payload. Never fails: unknown
    /// kinds become a [`RemoteError`].
    pub fn deserialize(&self, payload: SerializedError) -> BoxError {
        match self.constructors.get(&payload.kind) {
            Some(constructor) => constructor(&payload),
            None => Box::new(RemoteError::from(payload)),
        }
    }
}

impl fmt::Debug for ErrorCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorCodec")
            .field("constructors", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}
