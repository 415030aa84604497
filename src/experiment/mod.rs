//! Experiment tracking data the dataframe plot reads from
//!
//! ## Schema Overview
//!
//! ```text
//! ExperimentRecord (1) ──< DataframeRecord (N) [named Arrow tables]
//! ```
//!
//! The plot itself only sees experiments through [`ExperimentRef`]: an
//! identifier plus the capability to fetch a named table. [`ExperimentStore`]
//! is the in-memory implementation; anything else that can answer
//! "give me dataframe `name` for this experiment" can stand in for it.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{Float64Array, Int64Array, RecordBatch};
//! use arrow::datatypes::{DataType, Field, Schema};
//! use trueno_dfplot::experiment::{
//!     DataframeRecord, ExperimentRecord, ExperimentRef, ExperimentStore,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Arc::new(Schema::new(vec![
//!     Field::new("step", DataType::Int64, false),
//!     Field::new("loss", DataType::Float64, false),
//! ]));
//! let table = RecordBatch::try_new(
//!     schema,
//!     vec![
//!         Arc::new(Int64Array::from(vec![0, 1, 2])),
//!         Arc::new(Float64Array::from(vec![0.9, 0.5, 0.3])),
//!     ],
//! )?;
//!
//! let mut store = ExperimentStore::new();
//! store.add_experiment(ExperimentRecord::new("exp-001"));
//! store.log_dataframe(DataframeRecord::new("exp-001", "loss_curve", table))?;
//!
//! let experiment = store.experiment("exp-001")?;
//! assert_eq!(experiment.dataframe("loss_curve")?.num_rows(), 3);
//! # Ok(())
//! # }
//! ```

mod dataframe_record;
mod experiment_record;
mod store;

pub use dataframe_record::DataframeRecord;
pub use experiment_record::{ExperimentRecord, ExperimentRecordBuilder};
pub use store::{ExperimentStore, StoredExperiment};

use arrow::record_batch::RecordBatch;

use crate::Result;

/// Read-only handle to one experiment.
///
/// Implementors own nothing the plot mutates; the aggregator only asks for
/// the identifier and one named table.
pub trait ExperimentRef {
    /// Experiment identifier, used to tag every row of its table.
    fn id(&self) -> &str;

    /// Fetch the dataframe logged under `name`.
    ///
    /// # Errors
    /// Returns `Error::DataframeNotFound` when the experiment has no such
    /// dataframe. Other errors are treated as fatal by the aggregator.
    fn dataframe(&self, name: &str) -> Result<RecordBatch>;
}

impl<T: ExperimentRef + ?Sized> ExperimentRef for &T {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn dataframe(&self, name: &str) -> Result<RecordBatch> {
        (**self).dataframe(name)
    }
}

impl<T: ExperimentRef + ?Sized> ExperimentRef for Box<T> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn dataframe(&self, name: &str) -> Result<RecordBatch> {
        (**self).dataframe(name)
    }
}
