//! The spawn primitive: start an isolated worker and wire up its channel.
//!
//! The worker is a dedicated OS thread driving its own single-threaded
//! runtime; the only link to the host is the channel pair returned here.
//! There is no join: the thread winds down once the call channel closes,
//! and the host observes the exit as closure of the message channel. This
//! module is the extension point for other isolation mechanisms.

use std::io;
use std::thread;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::bootstrap;
use crate::codec::SerializedError;
use crate::loader::ModuleLoader;
use crate::protocol::{CallEnvelope, InitEnvelope, WorkerMessage};
use crate::ModuleTable;

/// Channel pair linking the host to a spawned worker.
pub(crate) struct WorkerChannel {
    /// Host→worker call envelopes. Dropping the sender tears the worker
    /// down.
    pub calls: UnboundedSender<CallEnvelope>,
    /// Worker→host messages: one init envelope, then response envelopes.
    /// Closure of this stream is the worker exit signal.
    pub messages: UnboundedReceiver<WorkerMessage>,
}

/// Spawn the worker thread and hand back the channel pair.
pub(crate) fn spawn_worker<L: ModuleLoader>(
    modules: ModuleTable,
    loader: L,
) -> io::Result<WorkerChannel> {
    let (call_tx, call_rx) = mpsc::unbounded_channel();
    let (message_tx, message_rx) = mpsc::unbounded_channel();

    thread::Builder::new()
        .name("workerize-worker".into())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
            {
                Ok(runtime) => runtime,
                Err(error) => {
                    // The host is waiting on the init envelope; report the
                    // failure there instead of dying silently.
                    let _ = message_tx.send(WorkerMessage::Init(InitEnvelope {
                        error: Some(SerializedError::from_error(&error)),
                    }));
                    return;
                }
            };
            let local = tokio::task::LocalSet::new();
            runtime.block_on(local.run_until(bootstrap::run(modules, loader, call_rx, message_tx)));
        })?;

    Ok(WorkerChannel {
        calls: call_tx,
        messages: message_rx,
    })
}
