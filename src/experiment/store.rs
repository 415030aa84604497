//! Experiment Store - in-memory storage for experiments and their dataframes
//!
//! This module provides the storage layer the dataframe plot reads from.
//! Lookups go through the [`ExperimentRef`] seam so the aggregator never
//! depends on this concrete store.

use std::collections::HashMap;
use std::path::Path;

use arrow::record_batch::RecordBatch;

use super::{DataframeRecord, ExperimentRecord, ExperimentRef};
use crate::{Error, Result};

/// In-memory store for experiments and the dataframes logged to them.
///
/// ## Design
///
/// Experiments are kept in insertion order (dashboards list them that way)
/// with a hash index for O(1) lookups by ID. Dataframes are keyed by
/// `(experiment_id, name)`; logging a dataframe under an existing name
/// replaces it.
#[derive(Debug, Default)]
pub struct ExperimentStore {
    experiments: Vec<ExperimentRecord>,
    index: HashMap<String, usize>,
    dataframes: HashMap<(String, String), DataframeRecord>,
}

impl ExperimentStore {
    /// Create a new empty experiment store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the store is empty (no experiments and no dataframes).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty() && self.dataframes.is_empty()
    }

    /// Get the number of experiments in the store.
    #[must_use]
    pub fn experiment_count(&self) -> usize {
        self.experiments.len()
    }

    /// Get the number of dataframes across all experiments.
    #[must_use]
    pub fn dataframe_count(&self) -> usize {
        self.dataframes.len()
    }

    /// Add an experiment to the store.
    ///
    /// Re-adding an existing ID replaces the record but keeps its position.
    pub fn add_experiment(&mut self, experiment: ExperimentRecord) {
        if let Some(&pos) = self.index.get(experiment.experiment_id()) {
            self.experiments[pos] = experiment;
        } else {
            self.index
                .insert(experiment.experiment_id().to_string(), self.experiments.len());
            self.experiments.push(experiment);
        }
    }

    /// Get an experiment record by ID.
    #[must_use]
    pub fn get_experiment(&self, experiment_id: &str) -> Option<&ExperimentRecord> {
        self.index.get(experiment_id).map(|&pos| &self.experiments[pos])
    }

    /// Log a dataframe to its experiment.
    ///
    /// # Errors
    /// Returns `ExperimentNotFound` if the owning experiment was never added
    pub fn log_dataframe(&mut self, dataframe: DataframeRecord) -> Result<()> {
        if !self.index.contains_key(dataframe.experiment_id()) {
            return Err(Error::ExperimentNotFound(dataframe.experiment_id().to_string()));
        }

        let key = (
            dataframe.experiment_id().to_string(),
            dataframe.name().to_string(),
        );
        self.dataframes.insert(key, dataframe);
        Ok(())
    }

    /// Log a dataframe read from a Parquet file.
    ///
    /// # Errors
    /// Returns error if the experiment is unknown or the file cannot be read
    pub fn log_dataframe_parquet<P: AsRef<Path>>(
        &mut self,
        experiment_id: &str,
        name: &str,
        path: P,
    ) -> Result<()> {
        if !self.index.contains_key(experiment_id) {
            return Err(Error::ExperimentNotFound(experiment_id.to_string()));
        }
        let dataframe = DataframeRecord::from_parquet(experiment_id, name, path)?;
        self.log_dataframe(dataframe)
    }

    /// Get a logged dataframe.
    ///
    /// # Errors
    /// Returns `DataframeNotFound` if the experiment has no dataframe named `name`
    pub fn get_dataframe(&self, experiment_id: &str, name: &str) -> Result<&DataframeRecord> {
        self.dataframes
            .get(&(experiment_id.to_string(), name.to_string()))
            .ok_or_else(|| Error::DataframeNotFound {
                experiment_id: experiment_id.to_string(),
                name: name.to_string(),
            })
    }

    /// Names of the dataframes logged to an experiment, sorted.
    #[must_use]
    pub fn dataframe_names(&self, experiment_id: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .dataframes
            .values()
            .filter(|d| d.experiment_id() == experiment_id)
            .map(DataframeRecord::name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Get a handle to one experiment.
    ///
    /// # Errors
    /// Returns `ExperimentNotFound` if the ID is unknown
    pub fn experiment(&self, experiment_id: &str) -> Result<StoredExperiment<'_>> {
        self.get_experiment(experiment_id)
            .map(|record| StoredExperiment { record, store: self })
            .ok_or_else(|| Error::ExperimentNotFound(experiment_id.to_string()))
    }

    /// Handles to every experiment, in insertion order.
    #[must_use]
    pub fn experiments(&self) -> Vec<StoredExperiment<'_>> {
        self.experiments
            .iter()
            .map(|record| StoredExperiment { record, store: self })
            .collect()
    }
}

/// Borrowed handle pairing an experiment record with the store it lives in.
#[derive(Debug, Clone, Copy)]
pub struct StoredExperiment<'a> {
    record: &'a ExperimentRecord,
    store: &'a ExperimentStore,
}

impl<'a> StoredExperiment<'a> {
    /// Get the underlying experiment record.
    #[must_use]
    pub const fn record(&self) -> &'a ExperimentRecord {
        self.record
    }
}

impl ExperimentRef for StoredExperiment<'_> {
    fn id(&self) -> &str {
        self.record.experiment_id()
    }

    fn dataframe(&self, name: &str) -> Result<RecordBatch> {
        self.store
            .get_dataframe(self.record.experiment_id(), name)
            .map(|d| d.data().clone())
    }
}
