//! Error types for the Iris batch engine.
//!
//! Setup problems (configuration, discovery) surface as [`IrisError`] and stop
//! a run before it starts. Everything that can go wrong while resolving a
//! single image is a [`TaskError`], which the driver records against that
//! image and then moves on.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Iris operations.
#[derive(Error, Debug)]
pub enum IrisError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The input directory could not be enumerated
    #[error("Cannot read input directory {path}: {message}")]
    Discovery { path: PathBuf, message: String },

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// No API key was supplied for the selected provider
    #[error("{provider} API key not set. Pass --api-key or set {env_hint}.")]
    MissingApiKey {
        provider: &'static str,
        env_hint: &'static str,
    },
}

/// Terminal failure of a single image task.
///
/// Rate limiting on its own is not an error: it is an
/// [`AttemptOutcome`](crate::provider::AttemptOutcome) that the retry policy
/// absorbs, and only becomes [`TaskError::RetryExhausted`] once the budget
/// is spent.
#[derive(Error, Debug)]
pub enum TaskError {
    /// The source image could not be read
    #[error("Failed to read image {path}: {source}")]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every allowed attempt was answered with HTTP 429
    #[error("Still rate limited after {attempts} attempts")]
    RetryExhausted { attempts: u32 },

    /// Non-429 HTTP status, transport failure, or unparseable response body
    #[error("{message}")]
    Request {
        message: String,
        status_code: Option<u16>,
    },

    /// The result could not be written to the output directory
    #[error("Failed to write {path}: {message}")]
    Persistence { path: PathBuf, message: String },

    /// The run was interrupted while this task was in flight
    #[error("Interrupted before completion")]
    Interrupted,
}

impl TaskError {
    /// Short machine-friendly name of the failure kind, used in summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskError::Encoding { .. } => "encoding",
            TaskError::RetryExhausted { .. } => "retry_exhausted",
            TaskError::Request { .. } => "request",
            TaskError::Persistence { .. } => "persistence",
            TaskError::Interrupted => "interrupted",
        }
    }
}

/// Convenience type alias for Iris results.
pub type Result<T> = std::result::Result<T, IrisError>;

/// Convenience type alias for per-task results.
pub type TaskResult<T> = std::result::Result<T, TaskError>;
