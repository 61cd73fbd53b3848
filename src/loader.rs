//! Module loading boundary.
//!
//! Resolving a module locator into something callable is an external
//! concern: the worker only needs `load(locator) -> callable`. The
//! [`ModuleLoader`] trait is that seam; [`FunctionRegistry`] is the
//! in-process implementation shipped with the crate, mapping locator
//! strings to pre-bound functions.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::LocalBoxFuture;
use serde_json::Value;

use crate::codec::WireError;

/// Arguments passed to a bound function, in wire form.
pub type FunctionArgs = Vec<Value>;

/// Error raised by module loading or by a bound function.
pub type DynWireError = Box<dyn WireError>;

/// A module bound to a function name, ready to invoke inside the worker.
///
/// The closure itself is `Send + Sync` so tables can be assembled on the
/// host and moved into the worker; the future it returns is
/// worker-thread-local and never crosses threads.
pub type BoundFunction =
    Arc<dyn Fn(FunctionArgs) -> LocalBoxFuture<'static, Result<Value, DynWireError>> + Send + Sync>;

/// Adapt an async closure into a [`BoundFunction`].
pub fn bind<F, Fut>(function: F) -> BoundFunction
where
    F: Fn(FunctionArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, DynWireError>> + 'static,
{
    Arc::new(move |args| Box::pin(function(args)))
}

/// Resolves module locators into callables inside the worker.
///
/// Implementations run on the worker thread during the load phase; a load
/// failure aborts initialization and is reported back to the host.
pub trait ModuleLoader: Send + 'static {
    fn load(&self, locator: &str) -> Result<BoundFunction, DynWireError>;
}

/// In-process [`ModuleLoader`] backed by a registry of bound functions.
#[derive(Default, Clone)]
pub struct FunctionRegistry {
    modules: HashMap<String, BoundFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `function` under `locator`, replacing any previous entry.
    pub fn with(mut self, locator: impl Into<String>, function: BoundFunction) -> Self {
        self.modules.insert(locator.into(), function);
        self
    }
}

impl ModuleLoader for FunctionRegistry {
    fn load(&self, locator: &str) -> Result<BoundFunction, DynWireError> {
        self.modules.get(locator).cloned().ok_or_else(|| {
            Box::new(ModuleNotFound {
                locator: locator.to_owned(),
            }) as DynWireError
        })
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Load error for a locator absent from the registry.
#[derive(Debug, thiserror::Error)]
#[error("no module registered for locator `{locator}`")]
pub struct ModuleNotFound {
    pub locator: String,
}

impl WireError for ModuleNotFound {
    fn kind(&self) -> &str {
        "ModuleNotFound"
    }
}
