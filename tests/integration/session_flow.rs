//! Sign-in, sign-up, restore and logout

use crate::common::{FakeGateway, dispatcher, drive, profile, session};
use querydeck::app::{App, Page, PanelFocus};
use querydeck::auth::{AuthField, AuthMode, LOGIN_FAILED_MESSAGE};
use querydeck::config::Settings;
use querydeck::error::ApiError;
use querydeck::session::{FileTokenStore, MemoryTokenStore, SessionController};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use querydeck::app::AppEvent;
use std::sync::Arc;

fn type_str(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_event(AppEvent::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::NONE,
        )))
        .unwrap();
    }
}

fn press(app: &mut App, code: KeyCode) -> querydeck::app::Action {
    app.handle_event(AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
        .unwrap()
}

#[tokio::test]
async fn test_login_loads_connections() {
    let gateway = Arc::new(FakeGateway::with_profiles(vec![profile(1, "A")]));
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = App::default();

    type_str(&mut app, "ada@example.com");
    press(&mut app, KeyCode::Tab);
    type_str(&mut app, "secret");
    let action = press(&mut app, KeyCode::Enter);
    drive(&mut app, &dispatcher, action).await;

    assert!(app.session.is_authenticated());
    assert_eq!(gateway.calls("login"), 1);
    assert_eq!(gateway.calls("list"), 1);
    assert_eq!(app.store.selection(), Some(1));
    assert_eq!(app.context(), PanelFocus::QueryEditor);
}

#[tokio::test]
async fn test_signup_registers_then_logs_in() {
    let gateway = Arc::new(FakeGateway::new());
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = App::default();

    app.auth.set_mode(AuthMode::Signup);
    assert_eq!(app.auth.focus(), AuthField::FullName);
    type_str(&mut app, "Ada Lovelace");
    press(&mut app, KeyCode::Down);
    type_str(&mut app, "ada@example.com");
    press(&mut app, KeyCode::Down);
    type_str(&mut app, "secret");
    let action = press(&mut app, KeyCode::Enter);
    drive(&mut app, &dispatcher, action).await;

    assert_eq!(gateway.calls("register"), 1);
    assert_eq!(gateway.calls("login"), 1);
    assert!(app.session.is_authenticated());
}

#[tokio::test]
async fn test_failed_login_without_detail_uses_fallback() {
    let gateway = Arc::new(FakeGateway::new());
    gateway.fail_next(
        "login",
        ApiError::Status {
            status: 500,
            detail: None,
        },
    );
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = App::default();

    type_str(&mut app, "ada@example.com");
    press(&mut app, KeyCode::Tab);
    type_str(&mut app, "wrong");
    let action = press(&mut app, KeyCode::Enter);
    drive(&mut app, &dispatcher, action).await;

    assert!(!app.session.is_authenticated());
    assert_eq!(app.auth.error(), Some(LOGIN_FAILED_MESSAGE));
    assert_eq!(gateway.calls("list"), 0);
}

#[tokio::test]
async fn test_logout_twice_resets_once() {
    let gateway = Arc::new(FakeGateway::with_profiles(vec![profile(1, "A")]));
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let mut app = crate::common::signed_in_app(&dispatcher).await;
    app.page = Page::Settings;

    assert!(app.logout());
    assert!(!app.logout());
    assert!(!app.session.is_authenticated());
    assert!(!app.session.is_logging_out());
    assert_eq!(app.page, Page::Console);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_remembered_session_restored() {
    let dir = tempfile::tempdir().unwrap();
    let token_path = dir.path().join("session");

    let mut first = SessionController::new(
        Box::new(FileTokenStore::new(&token_path)),
        Box::new(MemoryTokenStore::new()),
        true,
    );
    first.start(session());
    assert!(token_path.exists());

    let gateway = Arc::new(FakeGateway::with_profiles(vec![profile(1, "A")]));
    let dispatcher = dispatcher(gateway.clone(), dir.path());
    let restored = SessionController::new(
        Box::new(FileTokenStore::new(&token_path)),
        Box::new(MemoryTokenStore::new()),
        true,
    );
    let mut app = App::new(restored, &Settings::default());
    let action = app.restore_session();
    drive(&mut app, &dispatcher, action).await;

    assert!(app.session.is_authenticated());
    assert_eq!(app.store.selection(), Some(1));

    app.logout();
    assert!(!token_path.exists());
}
