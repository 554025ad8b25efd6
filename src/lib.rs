//! querydeck - A keyboard-driven SQL console for the terminal
//!
//! querydeck is a terminal client for a remote SQL execution service. It
//! manages saved connection profiles, runs ad-hoc statements against the
//! selected profile and exports results, all through the service's HTTP API.
//!
//! # Features
//!
//! - **Connections**: Create, edit, test and delete saved connection profiles
//! - **Query Console**: Multi-line editor with run-on-Ctrl+Enter and a results grid
//! - **Export**: Download results as CSV, JSON or YAML
//! - **Sessions**: Sign in or sign up, optionally remembered across restarts
//!
//! # Architecture
//!
//! - [`api`]: Wire types and the `Gateway` trait with its HTTP implementation
//! - [`app`]: Application state machine; events in, actions out
//! - [`dispatch`]: Executes actions against the gateway and the export sink
//! - [`connections`]: Connection store and create/edit forms
//! - [`console`]: Query console run state
//! - [`export`]: CSV/JSON/YAML serialization and file delivery
//! - [`auth`]: Sign-in / sign-up form
//! - [`session`]: Session lifecycle and token storage
//! - [`ticket`]: Request tickets that discard late completions
//! - [`config`]: Application settings
//! - [`ui`]: Terminal user interface components
//! - [`tui`]: Terminal setup and the event loop
//! - [`error`]: Error types and result aliases

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod connections;
pub mod console;
pub mod dispatch;
pub mod error;
pub mod export;
pub mod keymap;
pub mod session;
pub mod ticket;
pub mod tui;
pub mod ui;

pub use error::{ApiError, ConfigError, ExportError, QuerydeckError, Result, StorageError};
