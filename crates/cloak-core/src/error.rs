use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the dashboard crates.
///
/// Decoding and aggregation are total over their inputs, so every variant
/// here belongs to the edges of the pipeline: fetching the raw table,
/// configuration, and serialising the view for a renderer.
#[derive(Error, Debug)]
pub enum CloakError {
    /// The raw table file could not be opened or read from disk.
    #[error("Failed to read table {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The table source failed to deliver text (network or format failure).
    #[error("Failed to fetch table: {0}")]
    Fetch(String),

    /// A view or model could not be serialised to JSON.
    #[error("Failed to serialise JSON: {0}")]
    Json(#[from] serde_json::Error),

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

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, CloakError>;
