//! Error handling for VipGate
//!
//! This module defines the main error type used throughout the application
//! and classifies errors by recoverability and severity.

use thiserror::Error;

/// Main error type for the VipGate bot
#[derive(Error, Debug)]
pub enum VipGateError {
    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings source error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for VipGate operations
pub type Result<T> = std::result::Result<T, VipGateError>;

impl VipGateError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            VipGateError::Telegram(_) => true,
            VipGateError::Config(_) => false,
            VipGateError::Settings(_) => false,
            VipGateError::PermissionDenied(_) => false,
            VipGateError::InvalidStateTransition { .. } => false,
            VipGateError::Serialization(_) => false,
            VipGateError::Io(_) => true,
            VipGateError::UrlParse(_) => false,
            VipGateError::InvalidInput(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            VipGateError::Config(_) | VipGateError::Settings(_) => ErrorSeverity::Critical,
            VipGateError::PermissionDenied(_) => ErrorSeverity::Warning,
            VipGateError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
