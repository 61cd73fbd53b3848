//! Initialization outcomes: load failures reject, success yields proxies.

mod fixtures;

use std::collections::HashMap;

use fixtures::*;
use workerize::{workerize, LifecycleState, Options, RemoteError, WorkerError};

#[tokio::test]
async fn test_load_failure_rejects_initialization() {
    let outcome = workerize(
        table(&[("syntax_error_fn", SYNTAX_ERROR)]),
        fixture_loader(),
        Options::default(),
    )
    .await;

    let error = match outcome {
        Err(WorkerError::InitFailed(error)) => error,
        other => panic!("expected an initialization failure, got {:?}", other.map(|_| ())),
    };
    let remote = error.downcast_ref::<RemoteError>().unwrap();
    assert_eq!(remote.kind, "SyntaxError");
    assert_eq!(remote.message, "unexpected token at line 3");
}

#[tokio::test]
async fn test_load_failure_rebuilds_registered_error_kind() {
    let mut constructors = HashMap::new();
    constructors.insert("SyntaxError".to_owned(), syntax_error_constructor());

    let outcome = workerize(
        table(&[("syntax_error_fn", SYNTAX_ERROR)]),
        fixture_loader(),
        Options {
            custom_error_constructors: constructors,
        },
    )
    .await;

    let error = match outcome {
        Err(WorkerError::InitFailed(error)) => error,
        other => panic!("expected an initialization failure, got {:?}", other.map(|_| ())),
    };
    let syntax = error.downcast_ref::<SyntaxError>().unwrap();
    assert_eq!(syntax.line, 3);
}

#[tokio::test]
async fn test_one_bad_module_fails_the_whole_table() {
    let outcome = workerize(
        table(&[("echo", ECHO_FN), ("syntax_error_fn", SYNTAX_ERROR)]),
        fixture_loader(),
        Options::default(),
    )
    .await;

    assert!(matches!(outcome, Err(WorkerError::InitFailed(_))));
}

#[tokio::test]
async fn test_unknown_locator_rejects_initialization() {
    let outcome = workerize(
        table(&[("missing", "fixtures/not-registered")]),
        fixture_loader(),
        Options::default(),
    )
    .await;

    let error = match outcome {
        Err(WorkerError::InitFailed(error)) => error,
        other => panic!("expected an initialization failure, got {:?}", other.map(|_| ())),
    };
    assert_eq!(error.downcast_ref::<RemoteError>().unwrap().kind, "ModuleNotFound");
}

#[tokio::test]
async fn test_successful_initialization_exposes_declared_functions() {
    let instance = workerize(
        table(&[("echo", ECHO_FN), ("sample_fn", SAMPLE_FN)]),
        fixture_loader(),
        Options::default(),
    )
    .await
    .unwrap();

    assert_eq!(instance.functions().len(), 2);
    assert!(instance.function("echo").is_some());
    assert!(instance.function("sample_fn").is_some());
    assert!(instance.function("undeclared").is_none());
    assert_eq!(instance.handle().state(), LifecycleState::Ready);

    instance.terminate().await;
}
