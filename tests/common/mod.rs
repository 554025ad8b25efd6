//! Common test utilities and helpers
//!
//! Shared test infrastructure for integration tests: a scripted in-memory
//! gateway and helpers that drive `App` through its actions.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use querydeck::api::{
    AuthenticatedUser, ConnectionDraft, ConnectionId, ConnectionProfile, Gateway, LoginPayload,
    QueryResult, RegisterPayload, Session, SqlRequest, TestOutcome,
};
use querydeck::app::{Action, App};
use querydeck::dispatch::Dispatcher;
use querydeck::error::{ApiError, ApiResult};
use querydeck::export::ExportSink;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Backend stand-in holding profiles in memory and counting calls
#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    profiles: Vec<ConnectionProfile>,
    next_id: ConnectionId,
    calls: HashMap<&'static str, usize>,
    /// Next failure to return from a named operation
    failures: HashMap<&'static str, ApiError>,
    query_result: Option<QueryResult>,
    last_sql: Option<SqlRequest>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: Vec<ConnectionProfile>) -> Self {
        let gateway = Self::new();
        {
            let mut state = gateway.state.lock().unwrap();
            state.next_id = profiles.iter().map(|p| p.id).max().unwrap_or(0);
            state.profiles = profiles;
        }
        gateway
    }

    /// Make the next call to `operation` fail with `error`
    pub fn fail_next(&self, operation: &'static str, error: ApiError) {
        self.state.lock().unwrap().failures.insert(operation, error);
    }

    pub fn set_query_result(&self, result: QueryResult) {
        self.state.lock().unwrap().query_result = Some(result);
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn last_sql(&self) -> Option<SqlRequest> {
        self.state.lock().unwrap().last_sql.clone()
    }

    fn enter(&self, operation: &'static str) -> ApiResult<std::sync::MutexGuard<'_, FakeState>> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(operation).or_default() += 1;
        match state.failures.remove(operation) {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn list_connections(&self) -> ApiResult<Vec<ConnectionProfile>> {
        let state = self.enter("list")?;
        Ok(state.profiles.clone())
    }

    async fn create_connection(&self, draft: &ConnectionDraft) -> ApiResult<ConnectionProfile> {
        let mut state = self.enter("create")?;
        state.next_id += 1;
        let profile = ConnectionProfile {
            id: state.next_id,
            name: draft.name.clone(),
            connection_string: draft.connection_string.clone(),
            created_at: Utc::now(),
        };
        state.profiles.insert(0, profile.clone());
        Ok(profile)
    }

    async fn update_connection(
        &self,
        id: ConnectionId,
        draft: &ConnectionDraft,
    ) -> ApiResult<ConnectionProfile> {
        let mut state = self.enter("update")?;
        let profile = state
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ApiError::Status {
                status: 404,
                detail: Some("Connection not found".to_string()),
            })?;
        profile.name = draft.name.clone();
        profile.connection_string = draft.connection_string.clone();
        Ok(profile.clone())
    }

    async fn delete_connection(&self, id: ConnectionId) -> ApiResult<()> {
        let mut state = self.enter("delete")?;
        state.profiles.retain(|p| p.id != id);
        Ok(())
    }

    async fn test_connection(&self, connection_string: &str) -> ApiResult<TestOutcome> {
        let _state = self.enter("test")?;
        Ok(TestOutcome {
            ok: connection_string.starts_with("postgresql://"),
            message: "Connection successful".to_string(),
        })
    }

    async fn run_sql(&self, request: &SqlRequest) -> ApiResult<QueryResult> {
        let mut state = self.enter("sql")?;
        state.last_sql = Some(request.clone());
        Ok(state.query_result.clone().unwrap_or_default())
    }

    async fn login(&self, payload: &LoginPayload) -> ApiResult<Session> {
        let _state = self.enter("login")?;
        Ok(Session {
            message: "Login successful".to_string(),
            user: user(&payload.email, "Test User"),
        })
    }

    async fn register(&self, payload: &RegisterPayload) -> ApiResult<AuthenticatedUser> {
        let _state = self.enter("register")?;
        Ok(user(&payload.email, &payload.full_name))
    }
}

fn user(email: &str, full_name: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        id: 1,
        email: email.to_string(),
        full_name: full_name.to_string(),
        is_active: true,
        created_at: Utc::now(),
    }
}

pub fn profile(id: ConnectionId, name: &str) -> ConnectionProfile {
    ConnectionProfile {
        id,
        name: name.to_string(),
        connection_string: format!("postgresql://localhost/{name}"),
        created_at: Utc::now(),
    }
}

pub fn session() -> Session {
    Session {
        message: "Login successful".to_string(),
        user: user("ada@example.com", "Ada Lovelace"),
    }
}

/// Dispatcher over `gateway` exporting into `dir` without opening files
pub fn dispatcher(gateway: Arc<FakeGateway>, dir: &std::path::Path) -> Dispatcher {
    Dispatcher::new(gateway, ExportSink::new(dir, false))
}

/// Perform `action` and feed completions back into `app` until the chain
/// of follow-up actions runs out. Returns the number of actions performed.
pub async fn drive(app: &mut App, dispatcher: &Dispatcher, action: Action) -> usize {
    let mut performed = 0;
    let mut next = action;
    while let Some(event) = dispatcher.perform(next).await {
        performed += 1;
        next = app.handle_event(event).unwrap();
    }
    performed
}

/// Signed-in app with the connection list loaded from the gateway
pub async fn signed_in_app(dispatcher: &Dispatcher) -> App {
    let mut app = App::default();
    app.session.start(session());
    let refresh = app.refresh_connections();
    drive(&mut app, dispatcher, refresh).await;
    app
}
