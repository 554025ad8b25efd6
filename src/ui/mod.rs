//! Terminal UI components
//!
//! All UI widgets and rendering logic using ratatui. Widgets own only
//! presentation state (cursor, scroll); the domain state they draw lives in
//! `App` and is passed in at render time.

pub mod editor;
pub mod forms;
pub mod input;
pub mod layout;
pub mod login;
pub mod overlay;
pub mod render;
pub mod results;
pub mod theme;
