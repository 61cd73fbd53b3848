//! Host-side call dispatch and response demultiplexing.
//!
//! The dispatcher owns the pending-call registry: one single-shot waiter
//! per correlation ID, inserted when a call is dispatched and removed when
//! its response arrives, when the send fails, or when the worker exits. A
//! dedicated demultiplexer task owns the worker→host message stream and
//! routes every response by ID lookup; no call ever observes another
//! call's response.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};

use serde_json::Value;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::{oneshot, Mutex};
use ulid::Ulid;

use crate::codec::ErrorCodec;
use crate::error::{WorkerError, WorkerResult};
use crate::id::CorrelationIds;
use crate::lifecycle::Lifecycle;
use crate::protocol::{CallEnvelope, WorkerMessage};

pub(crate) struct Dispatcher {
    /// Call sender; revoked (taken) on terminate, on worker exit, and when
    /// the instance drops, so later sends fail fast. Synchronous so it can
    /// be revoked from `Drop`.
    calls: std::sync::Mutex<Option<UnboundedSender<CallEnvelope>>>,
    /// Pending-call registry: at most one entry per ID, never reused.
    pending: Mutex<HashMap<Ulid, oneshot::Sender<WorkerResult<Value>>>>,
    ids: CorrelationIds,
    lifecycle: Lifecycle,
    codec: ErrorCodec,
}

impl Dispatcher {
    pub(crate) fn new(
        calls: UnboundedSender<CallEnvelope>,
        codec: ErrorCodec,
        lifecycle: Lifecycle,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: std::sync::Mutex::new(Some(calls)),
            pending: Mutex::new(HashMap::new()),
            ids: CorrelationIds::new(),
            lifecycle,
            codec,
        })
    }

    pub(crate) fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Dispatch one call and suspend until its response arrives or the
    /// worker exits.
    pub(crate) async fn call(&self, function: &str, args: Vec<Value>) -> WorkerResult<Value> {
        if self.lifecycle.is_exited() {
            return Err(WorkerError::WorkerExited);
        }

        let id = self.ids.next();
        let (waiter, response) = oneshot::channel();
        self.pending.lock().await.insert(id, waiter);

        let envelope = CallEnvelope {
            id,
            function: function.to_owned(),
            args,
        };
        let sent = {
            let calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            match calls.as_ref() {
                Some(calls) => calls.send(envelope).is_ok(),
                None => false,
            }
        };
        if !sent {
            // Worker went away between the precondition check and the send;
            // the entry must not linger in the registry.
            self.pending.lock().await.remove(&id);
            return Err(WorkerError::WorkerExited);
        }

        match response.await {
            Ok(outcome) => outcome,
            // Demultiplexer dropped without answering: worker torn down.
            Err(_) => Err(WorkerError::WorkerExited),
        }
    }

    /// Revoke the call sender. Subsequent sends fail fast, and the worker's
    /// serve loop ends once the already-sent envelopes are consumed.
    pub(crate) fn revoke_calls(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Run the demultiplexer: route each response to its waiter; when the
    /// stream closes (worker exit), stop accepting calls, flip the
    /// lifecycle, and force-reject everything still pending.
    pub(crate) async fn demultiplex(self: Arc<Self>, mut messages: UnboundedReceiver<WorkerMessage>) {
        while let Some(message) = messages.recv().await {
            match message {
                WorkerMessage::Response(response) => {
                    let waiter = self.pending.lock().await.remove(&response.id);
                    match waiter {
                        Some(waiter) => {
                            let outcome = match (response.result, response.error) {
                                (_, Some(error)) => {
                                    Err(WorkerError::Function(self.codec.deserialize(error)))
                                }
                                (result, None) => Ok(result.unwrap_or(Value::Null)),
                            };
                            let _ = waiter.send(outcome);
                        }
                        None => tracing::debug!(id = %response.id, "response for unknown call id"),
                    }
                }
                WorkerMessage::Init(_) => {
                    tracing::warn!("init envelope received after initialization");
                }
            }
        }

        self.revoke_calls();
        self.lifecycle.mark_exited();
        let drained: Vec<_> = self.pending.lock().await.drain().collect();
        if !drained.is_empty() {
            tracing::debug!(calls = drained.len(), "worker exited with calls in flight");
        }
        for (_, waiter) in drained {
            let _ = waiter.send(Err(WorkerError::WorkerExited));
        }
    }
}
