//! Chart production: options, routines and the figure they emit
//!
//! A [`PlottingRoutine`] turns a table plus x/y column names into a
//! [`Figure`]; [`Figure::with_dashboard_style`] then applies the fixed
//! margin, background and legend-label conventions of the dashboard.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{Float64Array, Int64Array, RecordBatch, StringArray};
//! use arrow::datatypes::{DataType, Field, Schema};
//! use trueno_dfplot::plot::{PlotKind, PlotOptions, PlottingRoutine};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Arc::new(Schema::new(vec![
//!     Field::new("step", DataType::Int64, false),
//!     Field::new("loss", DataType::Float64, false),
//!     Field::new("experiment_id", DataType::Utf8, false),
//! ]));
//! let table = RecordBatch::try_new(
//!     schema,
//!     vec![
//!         Arc::new(Int64Array::from(vec![0, 1, 0, 1])),
//!         Arc::new(Float64Array::from(vec![0.9, 0.4, 0.8, 0.5])),
//!         Arc::new(StringArray::from(vec!["exp-a", "exp-a", "exp-b", "exp-b"])),
//!     ],
//! )?;
//!
//! let options = PlotOptions::new().with_experiment_defaults(2);
//! let figure = PlotKind::Line
//!     .plot(&table, "step", "loss", &options)?
//!     .with_dashboard_style();
//!
//! assert_eq!(figure.legend_labels(), vec!["exp-a", "exp-b"]);
//! # Ok(())
//! # }
//! ```

mod figure;
pub mod options;
mod routine;

pub use figure::{
    truncate_label, Axis, Figure, Layout, Legend, LineStyle, Margin, Marker, Title, Trace,
    TraceType, FIGURE_TOP_MARGIN, LEGEND_LABEL_CHARS,
};
pub use options::PlotOptions;
pub use routine::{PlotKind, PlottingRoutine};
