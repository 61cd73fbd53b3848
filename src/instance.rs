//! The workerize facade: initialization, callable proxies, termination.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::codec::{ErrorCodec, ErrorConstructor};
use crate::dispatcher::Dispatcher;
use crate::error::{WorkerError, WorkerResult};
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::loader::ModuleLoader;
use crate::protocol::WorkerMessage;
use crate::spawn::spawn_worker;
use crate::ModuleTable;

/// Options recognized at initialization.
#[derive(Default)]
pub struct Options {
    /// Constructors for rebuilding custom error kinds on the host, keyed by
    /// kind name. Consulted for every deserialization during the instance's
    /// lifetime; kinds without an entry fall back to
    /// [`RemoteError`](crate::RemoteError).
    pub custom_error_constructors: HashMap<String, ErrorConstructor>,
}

/// Initialize a worker serving the given module table.
///
/// Suspends until the worker announces the outcome of its load phase. On
/// success the returned [`Workerized`] exposes one callable proxy per
/// table entry plus a handle for termination.
///
/// # Errors
///
/// - [`WorkerError::SpawnFailed`] if the worker could not be started.
/// - [`WorkerError::InitFailed`] if a module failed to load; wraps the
///   deserialized load error. The worker winds down on its own.
/// - [`WorkerError::ChannelClosed`] if the worker died before announcing
///   anything.
pub async fn workerize<L: ModuleLoader>(
    modules: ModuleTable,
    loader: L,
    options: Options,
) -> WorkerResult<Workerized> {
    let codec = ErrorCodec::new(options.custom_error_constructors);

    let channel = spawn_worker(modules.clone(), loader).map_err(WorkerError::SpawnFailed)?;
    let mut messages = channel.messages;

    // The init envelope is strictly ordered before any response envelope.
    let init = loop {
        match messages.recv().await {
            Some(WorkerMessage::Init(init)) => break init,
            Some(WorkerMessage::Response(response)) => {
                tracing::warn!(id = %response.id, "response envelope before init envelope");
            }
            None => return Err(WorkerError::ChannelClosed),
        }
    };
    if let Some(error) = init.error {
        return Err(WorkerError::InitFailed(codec.deserialize(error)));
    }

    let lifecycle = Lifecycle::new();
    lifecycle.mark_ready();
    let dispatcher = Dispatcher::new(channel.calls, codec, lifecycle);
    tokio::spawn(Arc::clone(&dispatcher).demultiplex(messages));

    let functions = modules
        .into_keys()
        .map(|name| {
            let function = WorkerFunction {
                name: name.clone(),
                dispatcher: Arc::clone(&dispatcher),
            };
            (name, function)
        })
        .collect();

    Ok(Workerized {
        functions,
        handle: WorkerHandle { dispatcher },
    })
}

/// A successfully initialized workerize instance.
///
/// Dropping it without terminating closes the call channel, which also
/// winds the worker down.
pub struct Workerized {
    functions: HashMap<String, WorkerFunction>,
    handle: WorkerHandle,
}

impl Workerized {
    /// The callable proxies, one per module-table entry.
    pub fn functions(&self) -> &HashMap<String, WorkerFunction> {
        &self.functions
    }

    /// Look up one callable proxy by name.
    pub fn function(&self, name: &str) -> Option<&WorkerFunction> {
        self.functions.get(name)
    }

    /// Invoke a function by name, bypassing the proxy map. Names outside
    /// the module table are answered by the worker with a
    /// `FunctionNotFound` error.
    pub async fn call(&self, function: &str, args: Vec<Value>) -> WorkerResult<Value> {
        self.handle.dispatcher.call(function, args).await
    }

    /// The handle for lifecycle observation and termination.
    pub fn handle(&self) -> &WorkerHandle {
        &self.handle
    }

    /// Tear the worker down; see [`WorkerHandle::terminate`].
    pub async fn terminate(&self) {
        self.handle.terminate().await;
    }
}

impl Drop for Workerized {
    fn drop(&mut self) {
        // Without this, the demultiplexer task's reference to the
        // dispatcher would keep the call channel open and the worker
        // thread alive indefinitely.
        self.handle.dispatcher.revoke_calls();
    }
}

/// One workerized function, callable from the host. Cheap to clone; clones
/// share the instance's dispatcher.
#[derive(Clone)]
pub struct WorkerFunction {
    name: String,
    dispatcher: Arc<Dispatcher>,
}

impl WorkerFunction {
    /// The function's name in the module table.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the function inside the worker and suspend until its
    /// response.
    ///
    /// # Errors
    ///
    /// - [`WorkerError::WorkerExited`] if the worker has exited, or exits
    ///   while the call is in flight.
    /// - [`WorkerError::Function`] if the function failed; wraps the
    ///   deserialized invocation error.
    pub async fn call(&self, args: Vec<Value>) -> WorkerResult<Value> {
        self.dispatcher.call(&self.name, args).await
    }

    /// Invoke the function and decode its result into `R`.
    pub async fn call_as<R: DeserializeOwned>(&self, args: Vec<Value>) -> WorkerResult<R> {
        let result = self.call(args).await?;
        serde_json::from_value(result).map_err(WorkerError::DeserializeFailed)
    }
}

/// Handle to the worker's lifecycle.
#[derive(Clone)]
pub struct WorkerHandle {
    dispatcher: Arc<Dispatcher>,
}

impl WorkerHandle {
    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.dispatcher.lifecycle().state()
    }

    pub fn is_exited(&self) -> bool {
        self.dispatcher.lifecycle().is_exited()
    }

    /// Request teardown and suspend until the worker is gone.
    ///
    /// Idempotent and safe to invoke concurrently: the first call revokes
    /// the call channel, and every call waits for the terminal state.
    /// Calls still in flight are rejected with
    /// [`WorkerError::WorkerExited`].
    pub async fn terminate(&self) {
        self.dispatcher.revoke_calls();
        self.dispatcher.lifecycle().exited().await;
    }
}
