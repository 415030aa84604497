//! Renderable figure description
//!
//! Serialises to the Plotly figure JSON schema (`{"data": [...], "layout": {...}}`)
//! so any Plotly front end can draw it unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::PLOT_BACKGROUND_BLUE;
use crate::Result;

/// Top margin applied to every dashboard figure, in pixels.
pub const FIGURE_TOP_MARGIN: u32 = 30;

/// Legend labels are cut to this many characters.
pub const LEGEND_LABEL_CHARS: usize = 7;

/// A chart: traces plus layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    /// One entry per series.
    pub data: Vec<Trace>,
    /// Axes, margins, colours and titles.
    pub layout: Layout,
}

/// Plotly trace type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceType {
    /// Lines and/or markers
    #[default]
    Scatter,
    /// Vertical bars
    Bar,
}

/// One series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Trace type.
    #[serde(rename = "type")]
    pub kind: TraceType,
    /// Legend label.
    pub name: String,
    /// `lines`, `markers` or `lines+markers` (scatter only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// X values.
    pub x: Vec<Value>,
    /// Y values.
    pub y: Vec<Value>,
    /// Traces sharing a group toggle together in the legend.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub legendgroup: String,
    /// Whether the trace gets a legend entry.
    pub showlegend: bool,
    /// Marker styling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    /// Line styling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    /// Trace opacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// Marker styling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// CSS colour.
    pub color: String,
}

/// Line styling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStyle {
    /// CSS colour.
    pub color: String,
}

/// Figure layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Figure title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    /// Outer margins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    /// Plot area background colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_bgcolor: Option<String>,
    /// X axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    /// Y axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    /// Legend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
}

/// Text title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    /// Title text.
    pub text: String,
}

impl Title {
    /// Title with the given text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Margins in pixels; unset sides keep the renderer default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margin {
    /// Top.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<u32>,
    /// Bottom.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<u32>,
    /// Left.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l: Option<u32>,
    /// Right.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<u32>,
}

/// Axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    /// Axis title.
    pub title: Title,
}

/// Legend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legend {
    /// Legend title.
    pub title: Title,
}

impl Figure {
    /// Apply the dashboard look: fixed top margin, background colour and
    /// legend labels cut to [`LEGEND_LABEL_CHARS`].
    ///
    /// Other margins and `legendgroup` are left alone, so traces whose
    /// shortened labels collide still toggle independently.
    #[must_use]
    pub fn with_dashboard_style(mut self) -> Self {
        let margin = self.layout.margin.get_or_insert_with(Margin::default);
        margin.t = Some(FIGURE_TOP_MARGIN);
        self.layout.plot_bgcolor = Some(PLOT_BACKGROUND_BLUE.to_string());

        for trace in &mut self.data {
            trace.name = truncate_label(&trace.name);
        }
        self
    }

    /// Legend labels, in trace order.
    #[must_use]
    pub fn legend_labels(&self) -> Vec<&str> {
        self.data.iter().map(|t| t.name.as_str()).collect()
    }

    /// Serialise to Plotly figure JSON.
    ///
    /// # Errors
    /// Returns error if serialisation fails
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// First [`LEGEND_LABEL_CHARS`] characters of `label`.
#[must_use]
pub fn truncate_label(label: &str) -> String {
    label.chars().take(LEGEND_LABEL_CHARS).collect()
}
