//! Integration test runner
//!
//! Drives `App` end to end through the `Dispatcher` against an in-memory
//! gateway. No backend or terminal is needed:
//!
//!     cargo test --test integration

mod common;

#[path = "integration/connection_flow.rs"]
mod connection_flow;

#[path = "integration/console_flow.rs"]
mod console_flow;

#[path = "integration/session_flow.rs"]
mod session_flow;
