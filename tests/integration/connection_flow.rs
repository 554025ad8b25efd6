//! Connection store and editor flows

use crate::common::{FakeGateway, dispatcher, drive, profile, signed_in_app};
use querydeck::app::{Action, App};
use querydeck::connections::{BLANK_TEST_MESSAGE, FormKind, REQUIRED_FIELDS_MESSAGE};
use querydeck::error::ApiError;
use std::collections::HashSet;
use std::sync::Arc;

/// Selection is null only for an empty list and otherwise names a member;
/// ids are unique.
fn assert_store_invariants(app: &App) {
    let ids: Vec<_> = app.store.profiles().iter().map(|p| p.id).collect();
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len(), "duplicate ids in {ids:?}");
    match app.store.selection() {
        None => assert!(ids.is_empty(), "no selection with {ids:?}"),
        Some(id) => assert!(ids.contains(&id), "selection {id} not in {ids:?}"),
    }
}

#[tokio::test]
async fn test_refresh_then_delete_clears_selection() {
    let gateway = Arc::new(FakeGateway::with_profiles(vec![profile(1, "A")]));
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = signed_in_app(&dispatcher).await;
    assert_eq!(app.store.selection(), Some(1));

    app.request_delete(1);
    let action = app.confirm_delete();
    drive(&mut app, &dispatcher, action).await;

    assert_eq!(gateway.calls("delete"), 1);
    assert_eq!(app.store.selection(), None);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_mutation_sequence_keeps_invariants() {
    let gateway = Arc::new(FakeGateway::with_profiles(vec![
        profile(1, "A"),
        profile(2, "B"),
    ]));
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = signed_in_app(&dispatcher).await;
    assert_store_invariants(&app);

    // Deterministic pseudo-random mix of creates, updates, deletes and refreshes
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    for step in 0..60 {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        let ids: Vec<_> = app.store.profiles().iter().map(|p| p.id).collect();
        let pick = ids.get((seed as usize / 4) % ids.len().max(1)).copied();

        let action = match (seed % 4, pick) {
            (0, _) | (_, None) => {
                app.connection_editor
                    .form_mut(FormKind::Create)
                    .unwrap()
                    .set_fields(&format!("conn {step}"), "postgresql://h/db");
                app.submit_create()
            }
            (1, Some(id)) => {
                app.start_edit(id);
                app.connection_editor
                    .form_mut(FormKind::Edit)
                    .unwrap()
                    .set_fields(&format!("renamed {step}"), "postgresql://h/other");
                app.submit_update()
            }
            (2, Some(id)) => {
                app.request_delete(id);
                app.confirm_delete()
            }
            _ => app.refresh_connections(),
        };
        drive(&mut app, &dispatcher, action).await;
        assert_store_invariants(&app);
        if let Some(target) = app.connection_editor.edit_target() {
            assert!(app.store.contains(target));
        }
    }
}

#[tokio::test]
async fn test_blank_create_never_reaches_gateway() {
    let gateway = Arc::new(FakeGateway::new());
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = signed_in_app(&dispatcher).await;

    for (name, connection_string) in [("", "x"), ("x", ""), ("   ", "x")] {
        app.connection_editor
            .form_mut(FormKind::Create)
            .unwrap()
            .set_fields(name, connection_string);
        assert_eq!(app.submit_create(), Action::None);
        assert_eq!(
            app.connection_editor.create_form().error(),
            Some(REQUIRED_FIELDS_MESSAGE)
        );
    }
    assert_eq!(gateway.calls("create"), 0);
}

#[tokio::test]
async fn test_create_failure_keeps_draft() {
    let gateway = Arc::new(FakeGateway::new());
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = signed_in_app(&dispatcher).await;

    gateway.fail_next(
        "create",
        ApiError::Status {
            status: 400,
            detail: Some("Connection name already exists".to_string()),
        },
    );
    app.connection_editor
        .form_mut(FormKind::Create)
        .unwrap()
        .set_fields("dup", "postgresql://h/db");
    let action = app.submit_create();
    drive(&mut app, &dispatcher, action).await;

    let form = app.connection_editor.create_form();
    assert_eq!(form.error(), Some("Connection name already exists"));
    assert_eq!(form.name().value(), "dup");
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_deleting_edit_target_clears_draft() {
    let gateway = Arc::new(FakeGateway::with_profiles(vec![
        profile(1, "A"),
        profile(2, "B"),
    ]));
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = signed_in_app(&dispatcher).await;

    app.start_edit(2);
    app.request_delete(2);
    let action = app.confirm_delete();
    drive(&mut app, &dispatcher, action).await;

    assert_eq!(app.connection_editor.edit_target(), None);
    assert!(app.connection_editor.edit_session().is_none());
    assert_eq!(app.store.selection(), Some(1));
}

#[tokio::test]
async fn test_delete_failure_shows_alert_and_keeps_profile() {
    let gateway = Arc::new(FakeGateway::with_profiles(vec![profile(1, "A")]));
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = signed_in_app(&dispatcher).await;

    gateway.fail_next("delete", ApiError::Transport("connection refused".to_string()));
    app.request_delete(1);
    let action = app.confirm_delete();
    drive(&mut app, &dispatcher, action).await;

    assert_eq!(
        app.overlay,
        Some(querydeck::app::Overlay::Alert("connection refused".to_string()))
    );
    assert!(app.store.contains(1));
}

#[tokio::test]
async fn test_blank_connection_test_is_local() {
    let gateway = Arc::new(FakeGateway::new());
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = signed_in_app(&dispatcher).await;

    app.connection_editor
        .form_mut(FormKind::Create)
        .unwrap()
        .set_fields("name", "   ");
    assert_eq!(app.test_connection(FormKind::Create), Action::None);

    let outcome = app.connection_editor.create_form().test_outcome().unwrap();
    assert!(!outcome.ok);
    assert_eq!(outcome.message, BLANK_TEST_MESSAGE);
    assert_eq!(gateway.calls("test"), 0);
}

#[tokio::test]
async fn test_connection_test_failure_becomes_outcome() {
    let gateway = Arc::new(FakeGateway::new());
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = signed_in_app(&dispatcher).await;

    gateway.fail_next(
        "test",
        ApiError::Status {
            status: 400,
            detail: Some("could not translate host name".to_string()),
        },
    );
    app.connection_editor
        .form_mut(FormKind::Create)
        .unwrap()
        .set_fields("", "postgresql://nowhere/db");
    let action = app.test_connection(FormKind::Create);
    drive(&mut app, &dispatcher, action).await;

    let outcome = app.connection_editor.create_form().test_outcome().unwrap();
    assert!(!outcome.ok);
    assert_eq!(outcome.message, "could not translate host name");
    assert!(!app.connection_editor.create_form().is_testing());
}

#[tokio::test]
async fn test_refresh_failure_reports_and_keeps_list() {
    let gateway = Arc::new(FakeGateway::with_profiles(vec![profile(1, "A")]));
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = signed_in_app(&dispatcher).await;

    gateway.fail_next(
        "list",
        ApiError::Status {
            status: 500,
            detail: None,
        },
    );
    let action = app.refresh_connections();
    drive(&mut app, &dispatcher, action).await;

    assert_eq!(app.store.error(), Some("Request failed with status code 500"));
    assert_eq!(app.store.len(), 1);
    assert_eq!(app.store.selection(), Some(1));
}
