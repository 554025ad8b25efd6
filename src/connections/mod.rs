//! Connection management
//!
//! The store holds the confirmed profile collection and the selection; the
//! editor holds the create/edit drafts and their transient test and
//! submission state.

pub mod editor;
pub mod store;

pub use editor::{ConnectionEditor, ConnectionForm, EditSession, FormField, FormKind};
pub use store::{ConnectionStore, LOAD_FAILED_MESSAGE};

/// Shown when a form is submitted with a blank name or connection string
pub const REQUIRED_FIELDS_MESSAGE: &str = "Both name and connection string are required.";

/// Outcome of testing a blank connection string
pub const BLANK_TEST_MESSAGE: &str = "Enter a connection string to test.";

/// Confirmation prompt shown before a delete is dispatched
pub const DELETE_PROMPT: &str = "Delete this connection? This action cannot be undone.";
