//! Query console and export flows

use crate::common::{FakeGateway, dispatcher, drive, profile, signed_in_app};
use querydeck::api::{QueryResult, SqlRequest};
use querydeck::app::{Action, AppEvent, StatusLevel};
use querydeck::console::{NO_CONNECTION_MESSAGE, QueryStatus};
use querydeck::error::ApiError;
use querydeck::export::ExportFormat;
use serde_json::json;
use std::sync::Arc;

fn select_one() -> QueryResult {
    QueryResult {
        columns: vec!["x".to_string()],
        rows: vec![json!({"x": 1}).as_object().unwrap().clone()],
        row_count: 1,
        message: None,
    }
}

#[tokio::test]
async fn test_query_without_selection_is_local() {
    let gateway = Arc::new(FakeGateway::new());
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = signed_in_app(&dispatcher).await;

    assert_eq!(app.run_query(), Action::None);
    assert_eq!(app.console.error(), Some(NO_CONNECTION_MESSAGE));
    assert_eq!(gateway.calls("sql"), 0);
}

#[tokio::test]
async fn test_second_run_while_running_sends_nothing() {
    let gateway = Arc::new(FakeGateway::with_profiles(vec![profile(1, "A")]));
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = signed_in_app(&dispatcher).await;

    let first = app.run_query();
    assert!(matches!(first, Action::ExecuteQuery { .. }));
    let editor_before = app.console.editor.content();
    assert_eq!(app.run_query(), Action::None);
    assert_eq!(app.console.status(), QueryStatus::Running);
    assert_eq!(app.console.editor.content(), editor_before);

    drive(&mut app, &dispatcher, first).await;
    assert_eq!(gateway.calls("sql"), 1);
    assert_eq!(app.console.status(), QueryStatus::Succeeded);
}

#[tokio::test]
async fn test_select_one_exports_csv() {
    let gateway = Arc::new(FakeGateway::with_profiles(vec![profile(1, "A")]));
    gateway.set_query_result(select_one());
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = signed_in_app(&dispatcher).await;

    app.console.editor.set_content("SELECT 1");
    let action = app.run_query();
    drive(&mut app, &dispatcher, action).await;
    assert_eq!(
        gateway.last_sql(),
        Some(SqlRequest {
            connection_id: 1,
            query: "SELECT 1".to_string(),
        })
    );

    let action = app.export(ExportFormat::Csv);
    match &action {
        Action::Export {
            format, content, ..
        } => {
            assert_eq!(*format, ExportFormat::Csv);
            assert_eq!(content, "x\n1");
        }
        other => panic!("expected export, got {other:?}"),
    }
    drive(&mut app, &dispatcher, action).await;

    let status = app.status_message.clone().unwrap();
    assert_eq!(status.level, StatusLevel::Success);
    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].extension().unwrap(), "csv");
    assert_eq!(std::fs::read_to_string(&entries[0]).unwrap(), "x\n1");
}

#[tokio::test]
async fn test_export_disabled_for_zero_rows() {
    let gateway = Arc::new(FakeGateway::with_profiles(vec![profile(1, "A")]));
    gateway.set_query_result(QueryResult {
        columns: vec!["x".to_string()],
        rows: vec![],
        row_count: 0,
        message: None,
    });
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = signed_in_app(&dispatcher).await;

    let action = app.run_query();
    drive(&mut app, &dispatcher, action).await;
    assert!(!app.console.can_export());
    for format in [ExportFormat::Csv, ExportFormat::Json, ExportFormat::Yaml] {
        assert_eq!(app.export(format), Action::None);
    }
}

#[tokio::test]
async fn test_query_failure_shows_detail() {
    let gateway = Arc::new(FakeGateway::with_profiles(vec![profile(1, "A")]));
    gateway.fail_next(
        "sql",
        ApiError::Status {
            status: 400,
            detail: Some("syntax error at or near \"SELEC\"".to_string()),
        },
    );
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = signed_in_app(&dispatcher).await;

    let action = app.run_query();
    drive(&mut app, &dispatcher, action).await;
    assert_eq!(app.console.status(), QueryStatus::Failed);
    assert_eq!(
        app.console.error(),
        Some("syntax error at or near \"SELEC\"")
    );
    assert!(app.console.result().is_none());
}

#[tokio::test]
async fn test_late_query_result_after_logout_dropped() {
    let gateway = Arc::new(FakeGateway::with_profiles(vec![profile(1, "A")]));
    gateway.set_query_result(select_one());
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = signed_in_app(&dispatcher).await;

    let action = app.run_query();
    let completion = dispatcher.perform(action).await.unwrap();
    assert!(matches!(completion, AppEvent::QueryCompleted { .. }));

    app.logout();
    app.session.start(crate::common::session());
    app.handle_event(completion).unwrap();
    assert!(app.console.result().is_none());
    assert_eq!(app.console.status(), QueryStatus::Idle);
}

#[tokio::test]
async fn test_export_finishing_after_logout_is_dropped() {
    let gateway = Arc::new(FakeGateway::with_profiles(vec![profile(1, "A")]));
    gateway.set_query_result(select_one());
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = signed_in_app(&dispatcher).await;

    let action = app.run_query();
    drive(&mut app, &dispatcher, action).await;
    let export = app.export(ExportFormat::Csv);
    let completion = dispatcher.perform(export).await.unwrap();
    assert!(matches!(completion, AppEvent::ExportFinished { .. }));

    app.logout();
    app.status_message = None;
    app.handle_event(completion).unwrap();
    assert!(!app.session.is_authenticated());
    assert!(app.status_message.is_none());
}
