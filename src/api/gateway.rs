//! Remote gateway trait
//!
//! Defines the interface to the backend service. This abstraction allows for:
//! - An HTTP implementation for real use
//! - Easy testing with in-memory fakes
//! - Consistent error handling

use crate::api::types::{
    AuthenticatedUser, ConnectionDraft, ConnectionId, ConnectionProfile, LoginPayload,
    QueryResult, RegisterPayload, Session, SqlRequest, TestOutcome,
};
use crate::error::ApiResult;
use async_trait::async_trait;

/// Typed request/response functions against the backing service
///
/// Implementations never panic on remote failures; everything comes back as
/// an `ApiError` for the caller to convert into a message.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch every saved connection profile
    async fn list_connections(&self) -> ApiResult<Vec<ConnectionProfile>>;

    /// Persist a new profile and return it with its assigned id
    async fn create_connection(&self, draft: &ConnectionDraft) -> ApiResult<ConnectionProfile>;

    /// Replace the name and connection string of an existing profile
    async fn update_connection(
        &self,
        id: ConnectionId,
        draft: &ConnectionDraft,
    ) -> ApiResult<ConnectionProfile>;

    /// Remove a profile
    async fn delete_connection(&self, id: ConnectionId) -> ApiResult<()>;

    /// Probe a connection string without saving it
    async fn test_connection(&self, connection_string: &str) -> ApiResult<TestOutcome>;

    /// Execute a statement against a saved profile
    async fn run_sql(&self, request: &SqlRequest) -> ApiResult<QueryResult>;

    /// Exchange credentials for a session
    async fn login(&self, payload: &LoginPayload) -> ApiResult<Session>;

    /// Create an account
    async fn register(&self, payload: &RegisterPayload) -> ApiResult<AuthenticatedUser>;
}
