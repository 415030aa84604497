//! Error types for Trueno-DFPlot
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trueno-DFPlot error types
#[derive(Error, Debug)]
pub enum Error {
    /// A single experiment has no dataframe with the requested name
    ///
    /// Recoverable: the aggregator skips the experiment and records a warning.
    #[error("Experiment {experiment_id} does not have a dataframe named '{name}'")]
    DataframeNotFound {
        /// Experiment that was queried
        experiment_id: String,
        /// Requested dataframe name
        name: String,
    },

    /// No experiment contributed the requested dataframe (fatal at load)
    #[error("No dataframe with name '{name}' found!\nLog a dataframe named '{name}' to at least one experiment before plotting.")]
    NoDataFound {
        /// Requested dataframe name
        name: String,
    },

    /// A dataframe's schema differs from the first loaded dataframe
    #[error("Schema mismatch in experiment {experiment_id}: expected {expected}, got {found}\nUse SchemaPolicy::Pad to fill missing columns with nulls.")]
    SchemaMismatch {
        /// Experiment whose dataframe did not match
        experiment_id: String,
        /// Column layout of the first loaded dataframe
        expected: String,
        /// Column layout of the offending dataframe
        found: String,
    },

    /// Column missing from a table
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Experiment missing from a store
    #[error("Experiment not found: {0}")]
    ExperimentNotFound(String),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage error (Parquet/Arrow)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow/Parquet error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
