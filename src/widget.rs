//! The dataframe plot widget
//!
//! Lifecycle:
//!
//! 1. [`DataframePlot::builder`] collects configuration.
//! 2. [`DataframePlotBuilder::load`] fetches and combines the dataframes,
//!    resolves axes and freezes the plotting options. This is the only
//!    step that touches experiment data.
//! 3. The loaded [`DataframePlot`] is immutable. [`DataframePlot::layout`]
//!    describes the static view and [`DataframePlot::render`] maps a
//!    selection to a figure and header text. Both take `&self`, so one
//!    loaded widget can be shared (e.g. in an `Arc`) by every session.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::experiment::ExperimentRef;
use crate::plot::{Figure, PlotKind, PlotOptions, PlottingRoutine};
use crate::table::{CombinedTable, LoadReport, SchemaPolicy};
use crate::view::{self, ViewNode, EXPERIMENT_TABLE_ID, GRAPH_ID, HEADER_ID, TRIGGER_ID};
use crate::{Error, Result};

/// Builder for [`DataframePlot`].
#[derive(Debug, Clone)]
pub struct DataframePlotBuilder {
    dataframe_name: String,
    routine: Arc<dyn PlottingRoutine>,
    options: PlotOptions,
    x: Option<String>,
    y: Option<String>,
    link_experiment_table: bool,
    schema_policy: SchemaPolicy,
}

impl DataframePlotBuilder {
    /// Create a builder for the dataframe named `dataframe_name`.
    #[must_use]
    pub fn new(dataframe_name: impl Into<String>) -> Self {
        Self {
            dataframe_name: dataframe_name.into(),
            routine: Arc::new(PlotKind::default()),
            options: PlotOptions::new(),
            x: None,
            y: None,
            link_experiment_table: false,
            schema_policy: SchemaPolicy::default(),
        }
    }

    /// Use a built-in plotting routine (default: line).
    #[must_use]
    pub fn plot_kind(mut self, kind: PlotKind) -> Self {
        self.routine = Arc::new(kind);
        self
    }

    /// Use a custom plotting routine.
    #[must_use]
    pub fn plotting_routine(mut self, routine: Arc<dyn PlottingRoutine>) -> Self {
        self.routine = routine;
        self
    }

    /// Replace all plotting options.
    #[must_use]
    pub fn options(mut self, options: PlotOptions) -> Self {
        self.options = options;
        self
    }

    /// Set one plotting option.
    #[must_use]
    pub fn option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name, value);
        self
    }

    /// Column for the x axis (default: first column of the first dataframe).
    #[must_use]
    pub fn x(mut self, column: impl Into<String>) -> Self {
        self.x = Some(column.into());
        self
    }

    /// Column for the y axis (default: second column of the first dataframe).
    #[must_use]
    pub fn y(mut self, column: impl Into<String>) -> Self {
        self.y = Some(column.into());
        self
    }

    /// Drive the plotted experiment set from the companion experiment table.
    #[must_use]
    pub const fn link_experiment_table(mut self, link: bool) -> Self {
        self.link_experiment_table = link;
        self
    }

    /// How to combine dataframes whose columns differ (default: strict).
    #[must_use]
    pub const fn schema_policy(mut self, policy: SchemaPolicy) -> Self {
        self.schema_policy = policy;
        self
    }

    /// Fetch, combine and validate; produce the immutable widget.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No experiment has the dataframe (`NoDataFound`)
    /// - Dataframe schemas conflict (`SchemaMismatch`)
    /// - An axis cannot be inferred (`InvalidInput`) or names a missing
    ///   column, as does a `color` option (`ColumnNotFound`)
    pub fn load<E: ExperimentRef>(self, experiments: &[E]) -> Result<DataframePlot> {
        if self.dataframe_name.is_empty() {
            return Err(Error::InvalidInput("dataframe name must not be empty".to_string()));
        }

        let (table, report) =
            CombinedTable::load(experiments, &self.dataframe_name, self.schema_policy)?;

        let defaults = table.default_axes();
        let x = match self.x {
            Some(x) => x,
            None => defaults.map(|(x, _)| x.to_string()).ok_or_else(|| {
                Error::InvalidInput("cannot infer x column from an empty dataframe".to_string())
            })?,
        };
        let y = match self.y {
            Some(y) => y,
            None => defaults.map(|(_, y)| y.to_string()).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "cannot infer y column: dataframe '{}' has fewer than two columns",
                    self.dataframe_name
                ))
            })?,
        };
        table.require_column(&x)?;
        table.require_column(&y)?;

        let options = self.options.with_experiment_defaults(experiments.len());
        if let Some(color) = options.color() {
            table.require_column(color)?;
        }

        let experiment_ids = experiments.iter().map(|e| e.id().to_string()).collect();

        info!(
            dataframe = %self.dataframe_name,
            experiments = experiments.len(),
            skipped = report.skipped().len(),
            rows = table.num_rows(),
            %x,
            %y,
            "dataframe plot loaded"
        );

        Ok(DataframePlot {
            dataframe_name: self.dataframe_name,
            experiment_ids,
            table,
            report,
            config: PlotConfig {
                x,
                y,
                routine: self.routine,
                options,
            },
            link_experiment_table: self.link_experiment_table,
        })
    }
}

/// Resolved, frozen plotting configuration.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    x: String,
    y: String,
    routine: Arc<dyn PlottingRoutine>,
    options: PlotOptions,
}

impl PlotConfig {
    /// X axis column.
    #[must_use]
    pub fn x(&self) -> &str {
        &self.x
    }

    /// Y axis column.
    #[must_use]
    pub fn y(&self) -> &str {
        &self.y
    }

    /// Plotting routine.
    #[must_use]
    pub fn routine(&self) -> &dyn PlottingRoutine {
        self.routine.as_ref()
    }

    /// Plotting options, defaults included.
    #[must_use]
    pub const fn options(&self) -> &PlotOptions {
        &self.options
    }
}

/// A component property the host wires to the render function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Element ID
    pub component_id: String,
    /// Property name on that element
    pub property: String,
}

impl Dependency {
    fn new(component_id: &str, property: &str) -> Self {
        Self {
            component_id: component_id.to_string(),
            property: property.to_string(),
        }
    }
}

/// Declared inputs and outputs of the render function.
///
/// The host calls [`DataframePlot::handle_callback`] with one argument per
/// input, in order, and routes the results to the outputs, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackSpec {
    /// Events that trigger a render.
    pub inputs: Vec<Dependency>,
    /// Properties updated by a render: figure, then header text.
    pub outputs: Vec<Dependency>,
}

/// Result of one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOutput {
    /// Chart for the graph element.
    pub figure: Figure,
    /// Text for the header element.
    pub header: String,
}

/// Dataframes logged to many experiments, overlaid on one chart.
#[derive(Debug, Clone)]
pub struct DataframePlot {
    dataframe_name: String,
    experiment_ids: Vec<String>,
    table: CombinedTable,
    report: LoadReport,
    config: PlotConfig,
    link_experiment_table: bool,
}

impl DataframePlot {
    /// Start configuring a plot of the dataframe named `dataframe_name`.
    #[must_use]
    pub fn builder(dataframe_name: impl Into<String>) -> DataframePlotBuilder {
        DataframePlotBuilder::new(dataframe_name)
    }

    /// Dataframe name.
    #[must_use]
    pub fn dataframe_name(&self) -> &str {
        &self.dataframe_name
    }

    /// Every experiment passed to `load`, including skipped ones.
    #[must_use]
    pub fn experiment_ids(&self) -> &[String] {
        &self.experiment_ids
    }

    /// Combined table.
    #[must_use]
    pub const fn table(&self) -> &CombinedTable {
        &self.table
    }

    /// What happened during load.
    #[must_use]
    pub const fn load_report(&self) -> &LoadReport {
        &self.report
    }

    /// Resolved plotting configuration.
    #[must_use]
    pub const fn config(&self) -> &PlotConfig {
        &self.config
    }

    /// Whether the companion experiment table drives the selection.
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        self.link_experiment_table
    }

    /// Static view: trigger, header, chart.
    #[must_use]
    pub fn layout(&self) -> ViewNode {
        view::build_layout(&self.dataframe_name, self.experiment_ids.len())
    }

    /// Inputs and outputs the host must wire to [`Self::handle_callback`].
    #[must_use]
    pub fn callback(&self) -> CallbackSpec {
        let mut inputs = vec![Dependency::new(TRIGGER_ID, "children")];
        if self.link_experiment_table {
            inputs.push(Dependency::new(
                EXPERIMENT_TABLE_ID,
                "derived_virtual_selected_row_ids",
            ));
        }

        CallbackSpec {
            inputs,
            outputs: vec![
                Dependency::new(GRAPH_ID, "figure"),
                Dependency::new(HEADER_ID, "children"),
            ],
        }
    }

    /// Render for the given selection.
    ///
    /// When linked to the experiment table, `selection` is the table's
    /// selected IDs and `None` means nothing is selected. When not linked,
    /// `selection` is ignored and every experiment is shown.
    ///
    /// Deterministic: equal inputs give equal outputs.
    ///
    /// # Errors
    /// Returns error if the plotting routine fails
    pub fn render<S: AsRef<str>>(&self, selection: Option<&[S]>) -> Result<RenderOutput> {
        // Unlinked renders count experiments as configured, like the layout.
        let active: Vec<&str> = if self.link_experiment_table {
            dedup(selection.unwrap_or_default().iter().map(AsRef::as_ref).collect())
        } else {
            self.experiment_ids.iter().map(String::as_str).collect()
        };

        let data = self.table.select(active.as_slice())?;
        let figure = self
            .config
            .routine
            .plot(&data, &self.config.x, &self.config.y, &self.config.options)?
            .with_dashboard_style();
        let header = view::header_text(&self.dataframe_name, active.len());

        debug!(
            dataframe = %self.dataframe_name,
            selected = active.len(),
            rows = data.num_rows(),
            traces = figure.data.len(),
            "rendered dataframe plot"
        );

        Ok(RenderOutput { figure, header })
    }

    /// Render from raw callback arguments, one per [`CallbackSpec`] input.
    ///
    /// The trigger value is ignored. When linked, the last argument is the
    /// selected row IDs: `null` means none, strings are used as-is and other
    /// scalars by their JSON text.
    ///
    /// # Errors
    /// Returns error if the argument count does not match the declared
    /// inputs, the selection is neither an array nor `null`, or rendering fails
    pub fn handle_callback(&self, args: &[Value]) -> Result<RenderOutput> {
        let expected = if self.link_experiment_table { 2 } else { 1 };
        if args.len() != expected {
            return Err(Error::InvalidInput(format!(
                "expected {expected} callback argument(s), got {}",
                args.len()
            )));
        }

        if !self.link_experiment_table {
            return self.render::<&str>(None);
        }

        let selection: Vec<String> = match &args[expected - 1] {
            Value::Null => Vec::new(),
            Value::Array(ids) => ids
                .iter()
                .map(|id| match id {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            other => {
                return Err(Error::InvalidInput(format!(
                    "selected row IDs must be an array or null, got {other}"
                )))
            }
        };
        self.render(Some(selection.as_slice()))
    }
}

/// Drop repeated IDs, keeping first occurrences in order.
fn dedup(ids: Vec<&str>) -> Vec<&str> {
    let mut seen = rustc_hash::FxHashSet::default();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
