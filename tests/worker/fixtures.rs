#![allow(dead_code)]

//! Shared fixtures: an in-process module loader with sample functions and
//! the error types they raise.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use workerize::{
    bind, BoundFunction, DynWireError, ErrorConstructor, FunctionRegistry, ModuleLoader,
    ModuleTable, WireError,
};

pub const SAMPLE_FN: &str = "fixtures/sample-fn";
pub const ECHO_FN: &str = "fixtures/echo";
pub const SLOW_ECHO_FN: &str = "fixtures/slow-echo";
pub const NEVER_RETURNS_FN: &str = "fixtures/never-returns";
pub const THROWS_ERROR_WITH_DATA: &str = "fixtures/throws-error-with-nested-properties";
pub const THROWS_CUSTOM_ERROR: &str = "fixtures/throws-some-custom-error";
pub const SYNTAX_ERROR: &str = "fixtures/syntax-error";

/// Build a module table from `(function name, locator)` pairs.
pub fn table(entries: &[(&str, &str)]) -> ModuleTable {
    entries
        .iter()
        .map(|(name, locator)| ((*name).to_owned(), (*locator).to_owned()))
        .collect()
}

#[derive(Debug, thiserror::Error)]
#[error("a custom bad thing has happened")]
pub struct SomeCustomError {
    pub code: u32,
}

impl WireError for SomeCustomError {
    fn kind(&self) -> &str {
        "SomeCustomError"
    }

    fn data(&self) -> Value {
        json!({ "code": self.code })
    }
}

/// Host-side constructor rebuilding [`SomeCustomError`] from its payload.
pub fn some_custom_error_constructor() -> ErrorConstructor {
    Arc::new(|payload| {
        Box::new(SomeCustomError {
            code: payload.data["code"].as_u64().unwrap_or(0) as u32,
        })
    })
}

#[derive(Debug, thiserror::Error)]
#[error("something bad happened")]
pub struct ErrorWithData;

impl WireError for ErrorWithData {
    fn data(&self) -> Value {
        json!({ "foo": { "bar": "baz" } })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unexpected token at line {line}")]
pub struct SyntaxError {
    pub line: u32,
}

impl WireError for SyntaxError {
    fn kind(&self) -> &str {
        "SyntaxError"
    }

    fn data(&self) -> Value {
        json!({ "line": self.line })
    }
}

/// Host-side constructor rebuilding [`SyntaxError`] from its payload.
pub fn syntax_error_constructor() -> ErrorConstructor {
    Arc::new(|payload| {
        Box::new(SyntaxError {
            line: payload.data["line"].as_u64().unwrap_or(0) as u32,
        })
    })
}

/// Loader understanding the fixture locators. Loading [`SYNTAX_ERROR`]
/// fails the way a module with a parse error would.
pub struct FixtureLoader {
    registry: FunctionRegistry,
}

impl ModuleLoader for FixtureLoader {
    fn load(&self, locator: &str) -> Result<BoundFunction, DynWireError> {
        if locator == SYNTAX_ERROR {
            return Err(Box::new(SyntaxError { line: 3 }));
        }
        self.registry.load(locator)
    }
}

pub fn fixture_loader() -> FixtureLoader {
    let registry = FunctionRegistry::new()
        .with(
            SAMPLE_FN,
            bind(|args| async move {
                Ok(json!({ "jankNumber": 32.75, "inputArgs": args }))
            }),
        )
        .with(
            ECHO_FN,
            bind(|args| async move { Ok(args.into_iter().next().unwrap_or(Value::Null)) }),
        )
        .with(
            SLOW_ECHO_FN,
            bind(|args| async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(args.into_iter().next().unwrap_or(Value::Null))
            }),
        )
        .with(
            NEVER_RETURNS_FN,
            bind(|_args| async move {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Value::Null)
            }),
        )
        .with(
            THROWS_ERROR_WITH_DATA,
            bind(|_args| async move { Err(Box::new(ErrorWithData) as DynWireError) }),
        )
        .with(
            THROWS_CUSTOM_ERROR,
            bind(|_args| async move { Err(Box::new(SomeCustomError { code: 418 }) as DynWireError) }),
        );
    FixtureLoader { registry }
}
