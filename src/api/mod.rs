//! Remote gateway layer
//!
//! This module provides a trait-based abstraction over the backend API,
//! allowing the HTTP client to be swapped for fakes in tests.

pub mod gateway;
pub mod http;
pub mod types;

// Re-export main types
pub use gateway::Gateway;
pub use http::HttpGateway;
pub use types::{
    AuthenticatedUser, ConnectionDraft, ConnectionId, ConnectionProfile, LoginPayload,
    QueryResult, RegisterPayload, Row, Session, SqlRequest, TestOutcome, display_value,
};
