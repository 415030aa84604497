//! # Trueno-DFPlot: Experiment Dataframes on One Chart
//!
//! **Version**: 0.1.0
//!
//! Trueno-DFPlot overlays a dataframe that many experiments logged under the
//! same name onto a single chart for a web dashboard. It merges the
//! per-experiment Arrow tables into one provenance-tagged table, then
//! renders a Plotly-compatible figure for whichever experiments are
//! currently selected.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Jidoka**: Missing data stops the line. No dataframe anywhere is a
//!   hard error at load, never an empty chart
//! - **Poka-Yoke**: Options are frozen at load; renders cannot mutate shared state
//! - **Genchi Genbutsu**: Skipped experiments are logged and reported, not hidden
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{Float64Array, Int64Array, RecordBatch};
//! use arrow::datatypes::{DataType, Field, Schema};
//! use trueno_dfplot::experiment::{DataframeRecord, ExperimentRecord, ExperimentStore};
//! use trueno_dfplot::DataframePlot;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Arc::new(Schema::new(vec![
//!     Field::new("step", DataType::Int64, false),
//!     Field::new("loss", DataType::Float64, false),
//! ]));
//!
//! let mut store = ExperimentStore::new();
//! for (id, scale) in [("exp-001", 1.0), ("exp-002", 0.5)] {
//!     let table = RecordBatch::try_new(
//!         schema.clone(),
//!         vec![
//!             Arc::new(Int64Array::from(vec![0, 1, 2])),
//!             Arc::new(Float64Array::from(vec![scale, scale / 2.0, scale / 4.0])),
//!         ],
//!     )?;
//!     store.add_experiment(ExperimentRecord::new(id));
//!     store.log_dataframe(DataframeRecord::new(id, "loss_curve", table))?;
//! }
//!
//! let plot = DataframePlot::builder("loss_curve").load(&store.experiments())?;
//! let output = plot.render::<&str>(None)?;
//!
//! assert_eq!(output.figure.data.len(), 2);
//! assert_eq!(output.header, "showing dataframe 'loss_curve' over 2 experiments");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod color;
pub mod error;
pub mod experiment;
pub mod plot;
pub mod table;
pub mod view;
pub mod widget;

pub use error::{Error, Result};
pub use table::{CombinedTable, LoadReport, SchemaPolicy, EXPERIMENT_ID_COLUMN};
pub use widget::{
    CallbackSpec, DataframePlot, DataframePlotBuilder, Dependency, PlotConfig, RenderOutput,
};
