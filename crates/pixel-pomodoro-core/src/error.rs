//! Core error types for pixel-pomodoro-core.
//!
//! The countdown itself performs no I/O, so the hierarchy is small: invalid
//! configuration, failures loading or saving the config file, and faults
//! raised while the tick driver is running.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pixel-pomodoro-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The shared session state lock was poisoned by a panicking holder
    #[error("Session state lock poisoned")]
    LockPoisoned,

    /// The tick driver was started outside a Tokio runtime
    #[error("No async runtime available: {0}")]
    NoRuntime(String),

    /// A tick callback reported a failure
    #[error("Tick callback failed: {0}")]
    TickFault(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Could not determine where the configuration lives
    #[error("Cannot resolve data directory: {0}")]
    DataDir(String),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for CoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        CoreError::LockPoisoned
    }
}

impl From<tokio::runtime::TryCurrentError> for CoreError {
    fn from(err: tokio::runtime::TryCurrentError) -> Self {
        CoreError::NoRuntime(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_wraps_into_core_error() {
        let err: CoreError = ConfigError::invalid("timer.work_secs", "must be positive").into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid configuration value for 'timer.work_secs': must be positive"
        );
    }

    #[test]
    fn poisoned_lock_maps_to_lock_poisoned() {
        let lock = std::sync::Arc::new(std::sync::Mutex::new(0u8));
        let cloned = lock.clone();
        let _ = std::thread::spawn(move || {
            let _guard = cloned.lock().unwrap();
            panic!("poison");
        })
        .join();
        let err: CoreError = lock.lock().unwrap_err().into();
        assert!(matches!(err, CoreError::LockPoisoned));
    }
}
