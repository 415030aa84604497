//! Experiment Record - a tracked run that dataframes are logged to

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Experiment Record represents one recorded experiment.
///
/// Dataframes are attached to an experiment by ID in the
/// [`ExperimentStore`](super::ExperimentStore).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExperimentRecord {
    experiment_id: String,
    name: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    config: Option<serde_json::Value>,
}

impl ExperimentRecord {
    /// Create a new, unnamed experiment record with the given ID.
    #[must_use]
    pub fn new(experiment_id: impl Into<String>) -> Self {
        Self::builder(experiment_id).build()
    }

    /// Create a builder for constructing an experiment record with optional fields.
    #[must_use]
    pub fn builder(experiment_id: impl Into<String>) -> ExperimentRecordBuilder {
        ExperimentRecordBuilder::new(experiment_id)
    }

    /// Get the experiment ID.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the human-readable name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Get the experiment tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the experiment configuration (hyperparameters etc.), if any.
    #[must_use]
    pub const fn config(&self) -> Option<&serde_json::Value> {
        self.config.as_ref()
    }
}

/// Builder for `ExperimentRecord`.
#[derive(Debug)]
pub struct ExperimentRecordBuilder {
    experiment_id: String,
    name: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    config: Option<serde_json::Value>,
}

impl ExperimentRecordBuilder {
    /// Create a new builder with the required ID.
    #[must_use]
    pub fn new(experiment_id: impl Into<String>) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            name: None,
            description: None,
            tags: Vec::new(),
            created_at: Utc::now(),
            config: None,
        }
    }

    /// Set the human-readable name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a tag. Duplicate tags are ignored.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Set the experiment configuration.
    #[must_use]
    pub fn config(mut self, config: serde_json::Value) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a custom creation timestamp (useful for deserialization/testing).
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Build the `ExperimentRecord`.
    #[must_use]
    pub fn build(self) -> ExperimentRecord {
        ExperimentRecord {
            experiment_id: self.experiment_id,
            name: self.name,
            description: self.description,
            tags: self.tags,
            created_at: self.created_at,
            config: self.config,
        }
    }
}
