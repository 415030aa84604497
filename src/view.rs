//! Static view description rendered once by the host dashboard
//!
//! The tree mirrors the components a Dash/React front end would mount:
//! a hidden trigger that fires the first render, a header with a summary
//! line, and the chart wrapped in a loading indicator.

use serde::{Deserialize, Serialize};

use crate::color::LIGHT_BLUE;

/// Hidden element whose first update triggers the initial render.
pub const TRIGGER_ID: &str = "dummy-callback-trigger";
/// Header text element.
pub const HEADER_ID: &str = "header-text";
/// Chart element.
pub const GRAPH_ID: &str = "dataframe-plot";
/// Outer container.
pub const CONTAINER_ID: &str = "dataframe-plot-layout-container";
/// Companion experiment table whose selected rows drive the chart.
pub const EXPERIMENT_TABLE_ID: &str = "experiment-table";
/// CSS class of the header row.
pub const HEADER_ROW_CLASS: &str = "header-row";

/// One node of the view tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "component")]
pub enum ViewNode {
    /// Generic container
    Div {
        /// Element ID
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Child nodes
        #[serde(default)]
        children: Vec<ViewNode>,
    },
    /// Layout row
    Row {
        /// CSS class
        #[serde(default, skip_serializing_if = "Option::is_none")]
        class_name: Option<String>,
        /// Child nodes
        #[serde(default)]
        children: Vec<ViewNode>,
    },
    /// Heading text
    Heading {
        /// Heading level (1-6)
        level: u8,
        /// Element ID
        id: String,
        /// Text content
        text: String,
    },
    /// Spinner shown while its children are recomputed
    Loading {
        /// Spinner colour
        color: String,
        /// Child nodes
        children: Vec<ViewNode>,
    },
    /// Chart placeholder; the figure arrives through the render output
    Graph {
        /// Element ID
        id: String,
    },
}

impl ViewNode {
    /// Element ID, for nodes that carry one.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Div { id, .. } => id.as_deref(),
            Self::Heading { id, .. } | Self::Graph { id } => Some(id.as_str()),
            Self::Row { .. } | Self::Loading { .. } => None,
        }
    }

    /// Child nodes (empty for leaves).
    #[must_use]
    pub fn children(&self) -> &[ViewNode] {
        match self {
            Self::Div { children, .. }
            | Self::Row { children, .. }
            | Self::Loading { children, .. } => children.as_slice(),
            Self::Heading { .. } | Self::Graph { .. } => &[],
        }
    }

    /// Depth-first search by element ID.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&ViewNode> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }
}

/// `showing dataframe '<name>' over <k> experiment(s)`.
#[must_use]
pub fn header_text(dataframe_name: &str, experiment_count: usize) -> String {
    let plural = if experiment_count == 1 { "" } else { "s" };
    format!("showing dataframe '{dataframe_name}' over {experiment_count} experiment{plural}")
}

/// Build the static view for a dataframe plot over `experiment_count` experiments.
#[must_use]
pub fn build_layout(dataframe_name: &str, experiment_count: usize) -> ViewNode {
    ViewNode::Div {
        id: Some(CONTAINER_ID.to_string()),
        children: vec![
            ViewNode::Div {
                id: Some(TRIGGER_ID.to_string()),
                children: Vec::new(),
            },
            ViewNode::Row {
                class_name: Some(HEADER_ROW_CLASS.to_string()),
                children: vec![ViewNode::Heading {
                    level: 5,
                    id: HEADER_ID.to_string(),
                    text: header_text(dataframe_name, experiment_count),
                }],
            },
            ViewNode::Loading {
                color: LIGHT_BLUE.to_string(),
                children: vec![ViewNode::Graph {
                    id: GRAPH_ID.to_string(),
                }],
            },
        ],
    }
}
