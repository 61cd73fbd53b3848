//! Worker-side bootstrap protocol.
//!
//! Two phases: load every module in the table (announcing success or the
//! first failure through the init envelope), then serve call envelopes
//! until the call channel closes. Invocation failures are converted into
//! response envelopes; nothing a bound function does can crash the worker.

use std::collections::HashMap;
use std::rc::Rc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::codec::SerializedError;
use crate::loader::{BoundFunction, ModuleLoader};
use crate::protocol::{CallEnvelope, InitEnvelope, ResponseEnvelope, WorkerMessage};
use crate::ModuleTable;

/// Run the bootstrap protocol to completion.
///
/// Must run inside a [`tokio::task::LocalSet`]: invocation futures are
/// worker-thread-local, and each call is served on its own local task so a
/// suspended invocation does not block later envelopes. Responses therefore
/// complete in whatever order the invocations finish.
pub(crate) async fn run<L: ModuleLoader>(
    modules: ModuleTable,
    loader: L,
    mut calls: UnboundedReceiver<CallEnvelope>,
    messages: UnboundedSender<WorkerMessage>,
) {
    let mut functions: HashMap<String, BoundFunction> = HashMap::with_capacity(modules.len());
    for (name, locator) in modules {
        match loader.load(&locator) {
            Ok(function) => {
                functions.insert(name, function);
            }
            Err(error) => {
                tracing::debug!(%locator, "module load failed");
                let _ = messages.send(WorkerMessage::Init(InitEnvelope {
                    error: Some(SerializedError::from_error(error.as_ref())),
                }));
                return;
            }
        }
    }
    let _ = messages.send(WorkerMessage::Init(InitEnvelope { error: None }));

    let functions = Rc::new(functions);
    while let Some(call) = calls.recv().await {
        tracing::trace!(id = %call.id, function = %call.function, "serving call");
        let functions = Rc::clone(&functions);
        let messages = messages.clone();
        tokio::task::spawn_local(async move {
            let response = match functions.get(&call.function) {
                Some(function) => match function(call.args).await {
                    Ok(result) => ResponseEnvelope::success(call.id, result),
                    Err(error) => {
                        ResponseEnvelope::failure(call.id, SerializedError::from_error(error.as_ref()))
                    }
                },
                None => ResponseEnvelope::failure(
                    call.id,
                    SerializedError::new(
                        "FunctionNotFound",
                        format!("no function named `{}`", call.function),
                    ),
                ),
            };
            let _ = messages.send(WorkerMessage::Response(response));
        });
    }
    tracing::debug!("call channel closed, worker winding down");
}
