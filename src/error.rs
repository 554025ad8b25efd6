//! Error types for querydeck
//!
//! This module defines the error hierarchy used throughout the application.
//! We use `thiserror` for library-style errors with clear error chains.

use std::io;

/// Fallback shown when a failure carries no usable message at all
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Main error type for the querydeck application
#[derive(Debug, thiserror::Error)]
pub enum QuerydeckError {
    /// Remote gateway errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Session token storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Terminal/UI errors
    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Remote gateway errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a non-success status
    #[error("Request failed with status code {status}")]
    Status {
        status: u16,
        /// `detail` field of the response body, if any
        detail: Option<String>,
    },

    /// The request never produced a response (connect, timeout, TLS...)
    #[error("{0}")]
    Transport(String),

    /// The response body did not match the expected shape
    #[error("Invalid response from server: {0}")]
    Decode(String),

    /// Client could not be constructed
    #[error("Invalid client configuration: {0}")]
    Client(String),
}

impl ApiError {
    /// Structured error detail from the response body, when the backend sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => Some(detail.as_str()),
            _ => None,
        }
    }

    /// Whether the failure came from the HTTP exchange itself (a response
    /// with an error status, or no response at all).
    pub fn is_http(&self) -> bool {
        matches!(self, ApiError::Status { .. } | ApiError::Transport(_))
    }

    /// User-facing message: the body detail, else the error text, else a
    /// fixed default.
    pub fn user_message(&self) -> String {
        if let Some(detail) = self.detail() {
            return detail.to_string();
        }
        let text = self.to_string();
        if text.trim().is_empty() {
            DEFAULT_ERROR_MESSAGE.to_string()
        } else {
            text
        }
    }
}

/// Configuration loading/parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Home directory not found
    #[error("Could not determine home directory")]
    NoHomeDir,

    /// Config file could not be read
    #[error("Failed to read configuration: {0}")]
    Read(#[from] io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Session token storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Underlying file operation failed
    #[error("Token file error: {0}")]
    Io(#[from] io::Error),

    /// Stored token could not be decoded
    #[error("Stored session is corrupt: {0}")]
    Corrupt(String),
}

/// Result export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Nothing exportable in the current result
    #[error("No rows to export")]
    Empty,

    /// Serialization failed
    #[error("Failed to serialize {format}: {message}")]
    Serialize {
        format: &'static str,
        message: String,
    },

    /// Writing the export file failed
    #[error("Failed to write export: {0}")]
    Io(#[from] io::Error),

    /// Handing the file to the OS viewer failed
    #[error("Failed to open export: {0}")]
    Open(String),
}

/// Specialized Result type for querydeck operations
pub type Result<T> = std::result::Result<T, QuerydeckError>;

/// Specialized Result type for gateway operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Specialized Result type for config operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized Result type for token storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Specialized Result type for export operations
pub type ExportResult<T> = std::result::Result<T, ExportError>;
