//! Core error types for pomoweb-core.
//!
//! None of these are fatal to the cycle: settings problems fall back to
//! defaults, ticker problems fall back to an in-process interval and
//! notification problems are logged and dropped. They still get proper
//! types so callers that *do* care (the CLI `settings` commands) can report them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomoweb-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings-related errors
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Background ticker errors
    #[error("Ticker error: {0}")]
    Ticker(#[from] TickerError),

    /// Notification delivery errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// The engine event loop has shut down.
    #[error("Cycle engine is no longer running")]
    EngineClosed,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings-specific errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read the settings file
    #[error("Failed to load settings from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to write the settings file
    #[error("Failed to save settings to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Persisted record could not be parsed
    #[error("Failed to parse settings: {0}")]
    ParseFailed(String),

    /// Key does not name a settings field
    #[error("Unknown settings key: {0}")]
    UnknownKey(String),

    /// Value has the wrong type for the key
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Could not determine or create the data directory
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Background ticker errors.
#[derive(Error, Debug)]
pub enum TickerError {
    /// The dedicated worker thread could not be spawned
    #[error("Failed to spawn ticker worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// Neither a worker thread nor a tokio runtime is available
    #[error("No tokio runtime available for the fallback ticker")]
    NoRuntime,
}

/// Notification delivery errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The notification backend rejected or failed the request
    #[error("{backend} failed to deliver notification: {message}")]
    Delivery { backend: &'static str, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
