//! Envelope types exchanged between the host and the worker.
//!
//! The shapes mirror the wire protocol: one call envelope per invocation,
//! exactly one response envelope per call envelope (eventually), and a
//! single init envelope sent strictly before any response.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ulid::Ulid;

use crate::codec::SerializedError;

/// Call envelope sent to the worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEnvelope {
    /// Unique call ID for correlating the eventual response.
    pub id: Ulid,
    /// Name of the bound function to invoke.
    pub function: String,
    /// Positional arguments, already in wire form.
    pub args: Vec<Value>,
}

/// Response envelope received from the worker.
///
/// Exactly one of `result` / `error` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Call ID this response corresponds to.
    pub id: Ulid,
    /// Result value (present on success).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Serialized error (present on failure).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SerializedError>,
}

impl ResponseEnvelope {
    pub fn success(id: Ulid, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Ulid, error: SerializedError) -> Self {
        Self {
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Init envelope announcing the outcome of the worker's load phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitEnvelope {
    /// Present when the load phase failed; the worker serves no calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SerializedError>,
}

/// Messages carried on the worker→host channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerMessage {
    Init(InitEnvelope),
    Response(ResponseEnvelope),
}
