//! Error types for bids-events
//!
//! Every error is raised within the scope of a single run and surfaces at the
//! run boundary; the batch driver records it and moves on to the next run.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// bids-events error types
#[derive(Error, Debug)]
pub enum Error {
    /// Log file is not a tab-delimited table with the required columns
    #[error("Malformed log: {0}")]
    MalformedLog(String),

    /// Start and/or end marker never occurs in the log
    #[error("Required marker(s) missing from log: {labels:?}")]
    MissingMarker {
        /// Normalized labels that were not found
        labels: Vec<String>,
    },

    /// A marker label matches more than one row, so the time axis is undefined
    #[error("Marker {label} is ambiguous: {count} rows match, expected exactly one")]
    AmbiguousMarker {
        /// Normalized marker label
        label: String,
        /// Number of matching rows
        count: usize,
    },

    /// An event precedes the start marker
    #[error("Trial {trial} has negative onset {onset}s (event precedes the start marker)")]
    NegativeOnset {
        /// Trial index of the offending row
        trial: i64,
        /// Onset in seconds
        onset: f64,
    },

    /// Run configuration, quirk registry or naming table is inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Batch manifest could not be decoded
    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow reader/writer error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
