//! Keyword options passed to a plotting routine

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::experiment_colorscale;
use crate::table::EXPERIMENT_ID_COLUMN;
use crate::Result;

/// Column whose values split rows into separately coloured traces.
pub const COLOR: &str = "color";
/// Colours assigned to traces in order, cycling when exhausted.
pub const COLOR_DISCRETE_SEQUENCE: &str = "color_discrete_sequence";
/// Figure title.
pub const TITLE: &str = "title";
/// Draw point markers on line traces.
pub const MARKERS: &str = "markers";
/// Trace opacity, 0.0 to 1.0.
pub const OPACITY: &str = "opacity";

/// Option name to JSON value, ordered by name.
///
/// Options are plain data: unknown names are kept and ignored by the
/// built-in routines so custom routines can read their own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlotOptions(BTreeMap<String, Value>);

impl PlotOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON object.
    ///
    /// # Errors
    /// Returns error if `json` is not an object
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set an option, replacing any previous value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set an option in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Raw option value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Whether an option is set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of options set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no options are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate options in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The `color` column, if set to a string.
    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.get(COLOR).and_then(Value::as_str)
    }

    /// The `color_discrete_sequence`, if set to an array of strings.
    ///
    /// Non-string entries are skipped.
    #[must_use]
    pub fn color_discrete_sequence(&self) -> Option<Vec<&str>> {
        self.get(COLOR_DISCRETE_SEQUENCE)
            .and_then(Value::as_array)
            .map(|colors| colors.iter().filter_map(Value::as_str).collect())
    }

    /// The figure `title`, if set.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.get(TITLE).and_then(Value::as_str)
    }

    /// Whether line traces should draw markers (default false).
    #[must_use]
    pub fn markers(&self) -> bool {
        self.get(MARKERS).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Trace `opacity`, clamped to 0.0..=1.0.
    #[must_use]
    pub fn opacity(&self) -> Option<f64> {
        self.get(OPACITY)
            .and_then(Value::as_f64)
            .map(|o| o.clamp(0.0, 1.0))
    }

    /// Fill in colour-by-experiment defaults that are not already set.
    ///
    /// `color` defaults to the `experiment_id` column and
    /// `color_discrete_sequence` to a Blues sample sized to
    /// `experiment_count`. Explicit values are never overwritten.
    #[must_use]
    pub fn with_experiment_defaults(mut self, experiment_count: usize) -> Self {
        if !self.contains(COLOR) {
            self.insert(COLOR, EXPERIMENT_ID_COLUMN);
        }
        if !self.contains(COLOR_DISCRETE_SEQUENCE) {
            self.insert(COLOR_DISCRETE_SEQUENCE, experiment_colorscale(experiment_count));
        }
        self
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PlotOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
