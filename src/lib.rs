//! # workerize
//!
//! Run named functions inside an isolated worker while calling them as
//! local async functions.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Host (Tokio)                         │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │  Workerized: WorkerFunction proxies + WorkerHandle     │  │
//! │  │  Dispatcher: pending-call registry keyed by ULID,      │  │
//! │  │              demultiplexer task, lifecycle gate        │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │             call envelopes │ ▲ init + response envelopes     │
//! └────────────────────────────┼─┼───────────────────────────────┘
//!                              ▼ │
//! ┌──────────────────────────────────────────────────────────────┐
//! │           Worker (dedicated thread, local runtime)           │
//! │   bootstrap: load the module table, announce readiness or    │
//! │   the load failure, then serve calls until torn down         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Many concurrent calls multiplex over the single channel pair; each call
//! is matched to its response by correlation ID, and responses may arrive
//! in any order. Errors raised inside the worker cross the boundary as
//! serialized payloads and are rebuilt on the host, optionally through
//! caller-supplied constructors for custom error kinds.
//!
//! ## Example
//!
//! ```ignore
//! use serde_json::json;
//! use workerize::{bind, workerize, FunctionRegistry, Options};
//!
//! let loader = FunctionRegistry::new().with(
//!     "modules/double",
//!     bind(|args| async move {
//!         let n = args[0].as_i64().unwrap_or(0);
//!         Ok(json!(n * 2))
//!     }),
//! );
//! let instance = workerize(
//!     [("double".to_owned(), "modules/double".to_owned())].into(),
//!     loader,
//!     Options::default(),
//! )
//! .await?;
//!
//! let doubled = instance.function("double").unwrap().call(vec![json!(21)]).await?;
//! instance.terminate().await;
//! ```

use std::collections::HashMap;

pub mod codec;
pub mod error;
pub mod lifecycle;
pub mod loader;
pub mod protocol;

mod bootstrap;
mod dispatcher;
mod id;
mod instance;
mod spawn;

pub use codec::{BoxError, ErrorCodec, ErrorConstructor, RemoteError, SerializedError, WireError};
pub use error::{WorkerError, WorkerResult};
pub use instance::{workerize, Options, WorkerFunction, WorkerHandle, Workerized};
pub use lifecycle::LifecycleState;
pub use loader::{bind, BoundFunction, DynWireError, FunctionArgs, FunctionRegistry, ModuleLoader};

/// Function name → opaque module locator, fixed at initialization.
pub type ModuleTable = HashMap<String, String>;
