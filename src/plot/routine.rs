//! Plotting routines: (table, x, y, options) -> figure

use std::fmt;

use arrow::array::{
    Array, BooleanArray, Float32Array, Float64Array, Int16Array, Int32Array, Int64Array,
    Int8Array, LargeStringArray, RecordBatch, StringArray, UInt16Array, UInt32Array, UInt64Array,
    UInt8Array,
};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::figure::{Axis, Figure, Layout, Legend, LineStyle, Marker, Title, Trace, TraceType};
use super::options::PlotOptions;
use crate::color::experiment_colorscale;
use crate::{Error, Result};

/// Turns a table and two column names into a figure.
///
/// Implementations must be deterministic: the same inputs always produce
/// the same figure. The widget shares one routine across every render.
pub trait PlottingRoutine: fmt::Debug + Send + Sync {
    /// Plot `y` against `x`.
    ///
    /// # Errors
    /// Returns error if a referenced column is missing or cannot be plotted
    fn plot(&self, data: &RecordBatch, x: &str, y: &str, options: &PlotOptions) -> Result<Figure>;
}

/// Built-in routines.
///
/// Rows are split into one trace per distinct value of the `color` option
/// column, in order of first appearance, and coloured from
/// `color_discrete_sequence` (cycling when there are more traces than
/// colours).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
    /// Connected lines
    #[default]
    Line,
    /// Unconnected markers
    Scatter,
    /// Vertical bars
    Bar,
}

impl PlottingRoutine for PlotKind {
    fn plot(&self, data: &RecordBatch, x: &str, y: &str, options: &PlotOptions) -> Result<Figure> {
        let xs = column_values(data, x)?;
        let ys = column_values(data, y)?;

        let color = options.color();
        let groups = match color {
            Some(column) => group_rows(&column_values(data, column)?),
            None => vec![(String::new(), (0..data.num_rows()).collect())],
        };

        let palette: Vec<String> = match options.color_discrete_sequence() {
            Some(colors) if !colors.is_empty() => colors.into_iter().map(str::to_string).collect(),
            _ => experiment_colorscale(groups.len()),
        };

        let traces = groups
            .into_iter()
            .enumerate()
            .map(|(i, (name, rows))| {
                let paint = palette[i % palette.len()].clone();
                self.trace(name, &rows, &xs, &ys, paint, color.is_some(), options)
            })
            .collect();

        let layout = Layout {
            title: options.title().map(Title::new),
            xaxis: Some(Axis { title: Title::new(x) }),
            yaxis: Some(Axis { title: Title::new(y) }),
            legend: color.map(|c| Legend { title: Title::new(c) }),
            ..Layout::default()
        };

        Ok(Figure { data: traces, layout })
    }
}

impl PlotKind {
    #[allow(clippy::too_many_arguments)]
    fn trace(
        self,
        name: String,
        rows: &[usize],
        xs: &[Value],
        ys: &[Value],
        color: String,
        showlegend: bool,
        options: &PlotOptions,
    ) -> Trace {
        let (kind, mode, marker, line) = match self {
            Self::Line => {
                let mode = if options.markers() { "lines+markers" } else { "lines" };
                (TraceType::Scatter, Some(mode), None, Some(LineStyle { color }))
            }
            Self::Scatter => (TraceType::Scatter, Some("markers"), Some(Marker { color }), None),
            Self::Bar => (TraceType::Bar, None, Some(Marker { color }), None),
        };

        Trace {
            kind,
            legendgroup: name.clone(),
            name,
            mode: mode.map(str::to_string),
            x: rows.iter().map(|&r| xs[r].clone()).collect(),
            y: rows.iter().map(|&r| ys[r].clone()).collect(),
            showlegend,
            marker,
            line,
            opacity: options.opacity(),
        }
    }
}

/// Row indices per distinct label, in order of first appearance.
///
/// Nulls form their own group, shown with an empty name.
fn group_rows(labels: &[Value]) -> Vec<(String, Vec<usize>)> {
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    let mut index: FxHashMap<Option<String>, usize> = FxHashMap::default();

    for (row, value) in labels.iter().enumerate() {
        let key = match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        };
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key.unwrap_or_default(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row);
    }
    groups
}

macro_rules! downcast_values {
    ($column:expr, $ty:ty) => {{
        let values = $column.as_any().downcast_ref::<$ty>().ok_or_else(|| {
            Error::Other(format!("Failed to downcast to {}", stringify!($ty)))
        })?;
        values.iter().map(|v| v.map_or(Value::Null, Value::from)).collect()
    }};
}

/// A column as JSON values; nulls (and NaN) become `null`.
///
/// Types without a natural JSON form (dates, decimals, ...) are rendered
/// with Arrow's display formatting.
fn column_values(data: &RecordBatch, name: &str) -> Result<Vec<Value>> {
    let column = data
        .column_by_name(name)
        .ok_or_else(|| Error::ColumnNotFound(name.to_string()))?;

    let values: Vec<Value> = match column.data_type() {
        DataType::Boolean => downcast_values!(column, BooleanArray),
        DataType::Int8 => downcast_values!(column, Int8Array),
        DataType::Int16 => downcast_values!(column, Int16Array),
        DataType::Int32 => downcast_values!(column, Int32Array),
        DataType::Int64 => downcast_values!(column, Int64Array),
        DataType::UInt8 => downcast_values!(column, UInt8Array),
        DataType::UInt16 => downcast_values!(column, UInt16Array),
        DataType::UInt32 => downcast_values!(column, UInt32Array),
        DataType::UInt64 => downcast_values!(column, UInt64Array),
        DataType::Float32 => downcast_values!(column, Float32Array),
        DataType::Float64 => downcast_values!(column, Float64Array),
        DataType::Utf8 => downcast_values!(column, StringArray),
        DataType::LargeUtf8 => downcast_values!(column, LargeStringArray),
        _ => (0..column.len())
            .map(|row| -> Result<Value> {
                if column.is_null(row) {
                    Ok(Value::Null)
                } else {
                    Ok(Value::String(array_value_to_string(column, row)?))
                }
            })
            .collect::<Result<Vec<_>>>()?,
    };
    Ok(values)
}
