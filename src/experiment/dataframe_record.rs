//! Dataframe Record - a named table logged to an experiment

use std::path::Path;

use arrow::compute;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// A named 2D table belonging to one experiment.
///
/// The table itself is held as a single Arrow `RecordBatch`. Cloning a
/// record is cheap: column buffers are reference counted.
#[derive(Debug, Clone, PartialEq)]
pub struct DataframeRecord {
    experiment_id: String,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    data: RecordBatch,
}

impl DataframeRecord {
    /// Create a new dataframe record.
    ///
    /// # Arguments
    ///
    /// * `experiment_id` - ID of the owning experiment
    /// * `name` - Dataframe name, unique within the experiment
    /// * `data` - The logged table
    #[must_use]
    pub fn new(
        experiment_id: impl Into<String>,
        name: impl Into<String>,
        data: RecordBatch,
    ) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            name: name.into(),
            description: None,
            created_at: Utc::now(),
            data,
        }
    }

    /// Load a dataframe record from a Parquet file.
    ///
    /// All row groups are read and concatenated into one batch.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or parsed
    pub fn from_parquet<P: AsRef<Path>>(
        experiment_id: impl Into<String>,
        name: impl Into<String>,
        path: P,
    ) -> Result<Self> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
        use std::fs::File;

        let file = File::open(path.as_ref()).map_err(|e| {
            Error::StorageError(format!("Failed to open Parquet file: {e}"))
        })?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| {
            Error::StorageError(format!("Failed to parse Parquet file: {e}"))
        })?;
        let schema = builder.schema().clone();

        let reader = builder.build().map_err(|e| {
            Error::StorageError(format!("Failed to create Parquet reader: {e}"))
        })?;

        let mut batches = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| {
                Error::StorageError(format!("Failed to read record batch: {e}"))
            })?;
            batches.push(batch);
        }

        let data = compute::concat_batches(&schema, &batches)
            .map_err(|e| Error::StorageError(format!("Failed to combine batches: {e}")))?;

        Ok(Self::new(experiment_id, name, data))
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Get the owning experiment ID.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the dataframe name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the logged table.
    #[must_use]
    pub const fn data(&self) -> &RecordBatch {
        &self.data
    }

    /// Number of rows in the logged table.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.data.num_rows()
    }
}
