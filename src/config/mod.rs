//! Configuration management
//!
//! Handles loading user settings and resolving on-disk locations.

pub mod settings;

pub use settings::{API_URL_ENV, Settings, config_dir, load_settings, load_settings_from};
