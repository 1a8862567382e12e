//! Domain error types

use thiserror::Error;

/// Error when the command line is incomplete
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgParseError {
    #[error("Missing value for {0}")]
    MissingValue(String),

    #[error("Missing required flag {0}")]
    MissingRequired(String),
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },
}

/// Why notification permission is unavailable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionDenial {
    #[error("Permission dialog timed out. The dialog may not have appeared.")]
    TimedOut,

    /// Refused at the consent prompt
    #[error("{}", denied_message(.reason))]
    Denied { reason: Option<String> },

    /// Refused before this run; no prompt is shown again
    #[error("Notification permission denied.")]
    PreviouslyDenied,
}

fn denied_message(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!("Permission denied: {reason}"),
        None => "Notification permission not granted.".to_string(),
    }
}
