//! Error types for isoscope.

use thiserror::Error;

/// The main error type for isoscope operations.
#[derive(Error, Debug)]
pub enum IsoscopeError {
    /// Sample buffer length does not match the grid dimensions.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// The scalar field description is unusable (zero dimension, bad spacing).
    #[error("invalid scalar field: {0}")]
    InvalidField(String),

    /// Options that load but cannot drive a session.
    #[error("invalid options: {0}")]
    InvalidConfig(String),

    /// A volume file header could not be parsed.
    #[error("invalid header in '{path}': {reason}")]
    InvalidHeader { path: String, reason: String },

    /// The volume file uses a feature the readers do not handle.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A render pass failed.
    #[error("render error: {0}")]
    Render(String),

    /// The window event loop could not be created or run.
    #[error("event loop error: {0}")]
    EventLoop(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for isoscope operations.
pub type Result<T> = std::result::Result<T, IsoscopeError>;
