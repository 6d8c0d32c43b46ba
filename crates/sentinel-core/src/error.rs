use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by Chat Sentinel.
#[derive(Error, Debug)]
pub enum SentinelError {
    /// An owner record file could not be written to disk.
    #[error("Failed to write owner record {path}: {source}")]
    RecordWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed or serialised.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A schedule time string is not a valid `HH:MM`.
    #[error("Invalid schedule time: {0}")]
    InvalidScheduleTime(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the sentinel crates.
pub type Result<T> = std::result::Result<T, SentinelError>;
