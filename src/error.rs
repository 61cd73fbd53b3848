//! Host-side error types.

use std::io;

use thiserror::Error;

use crate::codec::BoxError;

/// Result type for workerize operations.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors surfaced to callers on the host side.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The spawn primitive failed to start the worker.
    #[error("failed to spawn worker: {0}")]
    SpawnFailed(#[source] io::Error),

    /// A module in the table failed to load; the instance is never usable.
    /// Wraps the deserialized load error.
    #[error("worker failed to initialize: {0}")]
    InitFailed(#[source] BoxError),

    /// The worker exited before announcing the outcome of its load phase.
    #[error("worker exited before completing initialization")]
    ChannelClosed,

    /// A call was dispatched after the worker exited, or the worker exited
    /// while the call was still in flight.
    #[error("workerized function was called after worker has exited")]
    WorkerExited,

    /// The target function failed inside the worker. Wraps the deserialized
    /// invocation error.
    #[error("{0}")]
    Function(#[source] BoxError),

    /// A successful result did not decode into the requested type.
    #[error("failed to deserialize result: {0}")]
    DeserializeFailed(#[source] serde_json::Error),
}

impl WorkerError {
    /// Check if this error indicates the worker is gone.
    pub fn is_worker_exited(&self) -> bool {
        matches!(self, Self::WorkerExited | Self::ChannelClosed)
    }

    /// The deserialized worker-side error, when this error carries one.
    pub fn remote_source(&self) -> Option<&BoxError> {
        match self {
            Self::InitFailed(source) | Self::Function(source) => Some(source),
            _ => None,
        }
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for WorkerError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::WorkerExited
    }
}
