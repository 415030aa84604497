//! End-to-end tests for the dataframe plot widget
//!
//! Store -> load -> layout/callback -> render, exercised the way a
//! dashboard host drives it.

use std::io;
use std::sync::{Arc, Mutex};

use arrow::array::{Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use serde_json::json;
use tracing_subscriber::fmt::MakeWriter;
use trueno_dfplot::experiment::{DataframeRecord, ExperimentRecord, ExperimentStore};
use trueno_dfplot::plot::options::{COLOR, COLOR_DISCRETE_SEQUENCE};
use trueno_dfplot::plot::{Figure, PlotKind, PlotOptions, PlottingRoutine, Trace, FIGURE_TOP_MARGIN};
use trueno_dfplot::view::{ViewNode, EXPERIMENT_TABLE_ID, HEADER_ID, TRIGGER_ID};
use trueno_dfplot::{DataframePlot, Error, SchemaPolicy, EXPERIMENT_ID_COLUMN};

// =============================================================================
// Fixtures
// =============================================================================

#[allow(clippy::cast_precision_loss)]
fn loss_table(rows: i64) -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("step", DataType::Int64, false),
        Field::new("loss", DataType::Float64, false),
        Field::new("accuracy", DataType::Float64, false),
    ]);
    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(Int64Array::from_iter_values(0..rows)),
            Arc::new(Float64Array::from_iter_values((0..rows).map(|i| 1.0 / (i as f64 + 1.0)))),
            Arc::new(Float64Array::from_iter_values((0..rows).map(|i| i as f64 / 10.0))),
        ],
    )
    .unwrap()
}

/// One experiment per entry; `None` means no `loss` dataframe is logged.
fn store_with(experiments: &[(&str, Option<i64>)]) -> ExperimentStore {
    let mut store = ExperimentStore::new();
    for &(id, rows) in experiments {
        store.add_experiment(ExperimentRecord::new(id));
        if let Some(rows) = rows {
            store
                .log_dataframe(DataframeRecord::new(id, "loss", loss_table(rows)))
                .unwrap();
        }
    }
    store
}

fn ids_column(batch: &RecordBatch) -> Vec<String> {
    batch
        .column_by_name(EXPERIMENT_ID_COLUMN)
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap()
        .iter()
        .map(|v| v.unwrap().to_string())
        .collect()
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

// =============================================================================
// Aggregation
// =============================================================================

#[test]
fn test_row_count_is_sum_of_experiments() {
    let store = store_with(&[("exp-a", Some(2)), ("exp-b", Some(3)), ("exp-c", Some(4))]);
    let plot = DataframePlot::builder("loss").load(&store.experiments()).unwrap();

    assert_eq!(plot.table().num_rows(), 9);
    let ids = ids_column(plot.table().data());
    assert_eq!(ids.iter().filter(|id| *id == "exp-a").count(), 2);
    assert_eq!(ids.iter().filter(|id| *id == "exp-b").count(), 3);
    assert_eq!(ids.iter().filter(|id| *id == "exp-c").count(), 4);
    assert_eq!(&ids[..3], ["exp-a", "exp-a", "exp-b"]);
}

#[test]
fn test_missing_dataframe_is_skipped_with_warning() {
    let store = store_with(&[("exp-a", Some(2)), ("exp-b", None), ("exp-c", Some(1))]);
    let experiments = store.experiments();

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let plot = tracing::subscriber::with_default(subscriber, || {
        DataframePlot::builder("loss").load(&experiments)
    })
    .unwrap();

    assert_eq!(plot.table().num_rows(), 3);
    assert_eq!(plot.table().experiment_ids(), ["exp-a".to_string(), "exp-c".to_string()]);
    assert_eq!(plot.load_report().skipped(), ["exp-b".to_string()]);

    let logs = logs.contents();
    assert!(logs.contains("WARN"));
    assert!(logs.contains("exp-b"));
    assert!(!logs.contains("exp-a"));
}

#[test]
fn test_no_dataframe_anywhere_fails_load() {
    let store = store_with(&[("exp-a", None), ("exp-b", None)]);
    let err = DataframePlot::builder("loss").load(&store.experiments()).unwrap_err();

    assert!(matches!(err, Error::NoDataFound { ref name } if name == "loss"));
    assert!(err.to_string().contains("No dataframe with name 'loss' found!"));
}

#[test]
fn test_mismatched_schema_rejected_unless_padding() {
    let mut store = store_with(&[("exp-a", Some(2))]);
    store.add_experiment(ExperimentRecord::new("exp-b"));
    let other = Schema::new(vec![
        Field::new("step", DataType::Int64, false),
        Field::new("loss", DataType::Float64, false),
    ]);
    let narrow = RecordBatch::try_new(
        Arc::new(other),
        vec![
            Arc::new(Int64Array::from(vec![0])),
            Arc::new(Float64Array::from(vec![0.7])),
        ],
    )
    .unwrap();
    store.log_dataframe(DataframeRecord::new("exp-b", "loss", narrow)).unwrap();

    let err = DataframePlot::builder("loss").load(&store.experiments()).unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { ref experiment_id, .. } if experiment_id == "exp-b"));

    let plot = DataframePlot::builder("loss")
        .schema_policy(SchemaPolicy::Pad)
        .load(&store.experiments())
        .unwrap();
    assert_eq!(plot.table().num_rows(), 3);
    assert_eq!(
        plot.table().data().column_by_name("accuracy").unwrap().null_count(),
        1
    );
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_default_axes_are_first_two_columns() {
    let store = store_with(&[("exp-a", None), ("exp-b", Some(2))]);
    let plot = DataframePlot::builder("loss").load(&store.experiments()).unwrap();

    assert_eq!(plot.config().x(), "step");
    assert_eq!(plot.config().y(), "loss");
}

#[test]
fn test_explicit_axes_override_inference() {
    let store = store_with(&[("exp-a", Some(2))]);
    let plot = DataframePlot::builder("loss")
        .y("accuracy")
        .load(&store.experiments())
        .unwrap();
    assert_eq!(plot.config().x(), "step");
    assert_eq!(plot.config().y(), "accuracy");

    let err = DataframePlot::builder("loss")
        .x("epoch")
        .load(&store.experiments())
        .unwrap_err();
    assert!(matches!(err, Error::ColumnNotFound(ref c) if c == "epoch"));
}

#[test]
fn test_single_column_dataframe_infers_provenance_as_y() {
    let mut store = ExperimentStore::new();
    store.add_experiment(ExperimentRecord::new("exp-a"));
    let schema = Schema::new(vec![Field::new("step", DataType::Int64, false)]);
    let batch =
        RecordBatch::try_new(Arc::new(schema), vec![Arc::new(Int64Array::from(vec![1, 2]))]).unwrap();
    store.log_dataframe(DataframeRecord::new("exp-a", "steps", batch)).unwrap();

    let plot = DataframePlot::builder("steps").load(&store.experiments()).unwrap();
    assert_eq!(plot.config().y(), EXPERIMENT_ID_COLUMN);
}

#[test]
fn test_color_defaults_sized_to_all_experiments() {
    let store = store_with(&[("a", Some(1)), ("b", None), ("c", Some(1)), ("d", Some(1))]);
    let plot = DataframePlot::builder("loss").load(&store.experiments()).unwrap();

    let options = plot.config().options();
    assert_eq!(options.color(), Some(EXPERIMENT_ID_COLUMN));
    assert_eq!(options.color_discrete_sequence().unwrap().len(), 4);
}

#[test]
fn test_explicit_color_options_survive_load() {
    let store = store_with(&[("a", Some(1)), ("b", Some(1))]);
    let plot = DataframePlot::builder("loss")
        .options(PlotOptions::new().with(COLOR_DISCRETE_SEQUENCE, json!(["#000000"])))
        .load(&store.experiments())
        .unwrap();

    let output = plot.render::<&str>(None).unwrap();
    assert!(output
        .figure
        .data
        .iter()
        .all(|t| t.line.as_ref().unwrap().color == "#000000"));

    let err = DataframePlot::builder("loss")
        .option(COLOR, "run_group")
        .load(&store.experiments())
        .unwrap_err();
    assert!(matches!(err, Error::ColumnNotFound(ref c) if c == "run_group"));
}

// =============================================================================
// Layout and callback declaration
// =============================================================================

#[test]
fn test_layout_header_counts_configured_experiments() {
    let store = store_with(&[("a", Some(1)), ("b", None)]);
    let plot = DataframePlot::builder("loss").load(&store.experiments()).unwrap();

    match plot.layout().find(HEADER_ID) {
        Some(ViewNode::Heading { text, .. }) => {
            assert_eq!(text, "showing dataframe 'loss' over 2 experiments");
        }
        other => panic!("unexpected header node: {other:?}"),
    }
}

#[test]
fn test_callback_inputs_follow_linking() {
    let store = store_with(&[("a", Some(1))]);

    let unlinked = DataframePlot::builder("loss").load(&store.experiments()).unwrap();
    let callback = unlinked.callback();
    assert_eq!(callback.inputs.len(), 1);
    assert_eq!(callback.inputs[0].component_id, TRIGGER_ID);
    assert_eq!(callback.outputs.len(), 2);
    assert_eq!(callback.outputs[0].property, "figure");

    let linked = DataframePlot::builder("loss")
        .link_experiment_table(true)
        .load(&store.experiments())
        .unwrap();
    let callback = linked.callback();
    assert_eq!(callback.inputs.len(), 2);
    assert_eq!(callback.inputs[1].component_id, EXPERIMENT_TABLE_ID);
    assert_eq!(callback.inputs[1].property, "derived_virtual_selected_row_ids");
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_unlinked_render_shows_all_experiments() {
    let store = store_with(&[("exp-a", Some(2)), ("exp-b", Some(2))]);
    let plot = DataframePlot::builder("loss").load(&store.experiments()).unwrap();

    let output = plot.render(Some(&["exp-a"][..])).unwrap();
    assert_eq!(output.figure.data.len(), 2);
    assert_eq!(output.header, "showing dataframe 'loss' over 2 experiments");
    assert_eq!(output.figure.layout.margin.unwrap().t, Some(FIGURE_TOP_MARGIN));
}

#[test]
fn test_unlinked_header_matches_layout_for_repeated_experiment() {
    let store = store_with(&[("exp-a", Some(2))]);
    let experiments = vec![store.experiment("exp-a").unwrap(), store.experiment("exp-a").unwrap()];
    let plot = DataframePlot::builder("loss").load(&experiments).unwrap();

    let output = plot.render::<&str>(None).unwrap();
    assert_eq!(output.header, "showing dataframe 'loss' over 2 experiments");
    match plot.layout().find(HEADER_ID) {
        Some(ViewNode::Heading { text, .. }) => assert_eq!(text, &output.header),
        other => panic!("unexpected header node: {other:?}"),
    }
    assert_eq!(plot.table().num_rows(), 4);
    assert_eq!(output.figure.data[0].x.len(), 4);
}

#[test]
fn test_linked_empty_selection_renders_nothing() {
    let store = store_with(&[("exp-a", Some(2)), ("exp-b", Some(2))]);
    let plot = DataframePlot::builder("loss")
        .link_experiment_table(true)
        .load(&store.experiments())
        .unwrap();

    let output = plot.render::<&str>(Some(&[])).unwrap();
    assert!(output.figure.data.is_empty());
    assert_eq!(output.header, "showing dataframe 'loss' over 0 experiments");

    let output = plot.render::<&str>(None).unwrap();
    assert!(output.figure.data.is_empty());
    assert_eq!(output.header, "showing dataframe 'loss' over 0 experiments");
}

#[test]
fn test_linked_single_selection() {
    let store = store_with(&[("exp-a", Some(2)), ("exp-b", Some(3))]);
    let plot = DataframePlot::builder("loss")
        .link_experiment_table(true)
        .load(&store.experiments())
        .unwrap();

    let output = plot.render(Some(&["exp-b".to_string()][..])).unwrap();
    assert_eq!(output.header, "showing dataframe 'loss' over 1 experiment");
    assert_eq!(output.figure.data.len(), 1);
    assert_eq!(output.figure.data[0].name, "exp-b");
    assert_eq!(output.figure.data[0].x.len(), 3);
}

#[test]
fn test_legend_labels_truncated() {
    let long_a = "3f2a9c1d-77e0-4b6e-9f1a-aaaaaaaaaaaa";
    let long_b = "3f2a9c1d-77e0-4b6e-9f1a-bbbbbbbbbbbb";
    let store = store_with(&[(long_a, Some(2)), (long_b, Some(2)), ("short", Some(1))]);
    let plot = DataframePlot::builder("loss").load(&store.experiments()).unwrap();

    let figure = plot.render::<&str>(None).unwrap().figure;
    assert!(figure.legend_labels().iter().all(|l| l.chars().count() <= 7));
    assert_eq!(figure.legend_labels(), vec!["3f2a9c1", "3f2a9c1", "short"]);
    // Collapsed labels still toggle separately.
    assert_ne!(figure.data[0].legendgroup, figure.data[1].legendgroup);
}

#[test]
fn test_render_is_deterministic() {
    let store = store_with(&[("exp-a", Some(5)), ("exp-b", Some(5))]);
    let plot = DataframePlot::builder("loss")
        .link_experiment_table(true)
        .load(&store.experiments())
        .unwrap();

    let selection = ["exp-b", "exp-a"];
    let first = plot.render(Some(&selection[..])).unwrap();
    let second = plot.render(Some(&selection[..])).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.figure.to_json().unwrap(), second.figure.to_json().unwrap());
}

#[test]
fn test_duplicate_selection_counts_once() {
    let store = store_with(&[("exp-a", Some(1)), ("exp-b", Some(1))]);
    let plot = DataframePlot::builder("loss")
        .link_experiment_table(true)
        .load(&store.experiments())
        .unwrap();

    let output = plot.render(Some(&["exp-a", "exp-a"][..])).unwrap();
    assert_eq!(output.header, "showing dataframe 'loss' over 1 experiment");
}

#[test]
fn test_handle_callback_arguments() {
    let store = store_with(&[("1", Some(1)), ("exp-b", Some(1))]);
    let linked = DataframePlot::builder("loss")
        .link_experiment_table(true)
        .load(&store.experiments())
        .unwrap();

    let output = linked.handle_callback(&[json!(null), json!([1, "exp-b"])]).unwrap();
    assert_eq!(output.figure.legend_labels(), vec!["1", "exp-b"]);

    let output = linked.handle_callback(&[json!(null), json!(null)]).unwrap();
    assert!(output.figure.data.is_empty());

    assert!(matches!(
        linked.handle_callback(&[json!(null)]),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        linked.handle_callback(&[json!(null), json!("exp-b")]),
        Err(Error::InvalidInput(_))
    ));

    let unlinked = DataframePlot::builder("loss").load(&store.experiments()).unwrap();
    let output = unlinked.handle_callback(&[json!("")]).unwrap();
    assert_eq!(output.figure.data.len(), 2);
}

#[derive(Debug)]
struct FixedRoutine;

impl PlottingRoutine for FixedRoutine {
    fn plot(&self, data: &RecordBatch, x: &str, y: &str, _options: &PlotOptions) -> trueno_dfplot::Result<Figure> {
        Ok(Figure {
            data: vec![Trace {
                name: format!("{y} vs {x} over {} rows", data.num_rows()),
                ..Trace::default()
            }],
            ..Figure::default()
        })
    }
}

#[test]
fn test_custom_routine_is_post_processed() {
    let store = store_with(&[("exp-a", Some(3))]);
    let plot = DataframePlot::builder("loss")
        .plotting_routine(Arc::new(FixedRoutine))
        .load(&store.experiments())
        .unwrap();

    let figure = plot.render::<&str>(None).unwrap().figure;
    assert_eq!(figure.legend_labels(), vec!["loss vs"]);
    assert!(figure.layout.plot_bgcolor.is_some());
}

#[test]
fn test_bar_kind() {
    let store = store_with(&[("exp-a", Some(3))]);
    let plot = DataframePlot::builder("loss")
        .plot_kind(PlotKind::Bar)
        .load(&store.experiments())
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&plot.render::<&str>(None).unwrap().figure.to_json().unwrap()).unwrap();
    assert_eq!(json["data"][0]["type"], "bar");
}

#[test]
fn test_shared_across_sessions() {
    let store = store_with(&[("exp-a", Some(4)), ("exp-b", Some(4))]);
    let plot = Arc::new(DataframePlot::builder("loss").load(&store.experiments()).unwrap());
    let expected = plot.render::<&str>(None).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let plot = Arc::clone(&plot);
            std::thread::spawn(move || plot.render::<&str>(None).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_parquet_backed_experiments() {
    use parquet::arrow::ArrowWriter;

    let dir = tempfile::tempdir().unwrap();
    let mut store = ExperimentStore::new();
    for (id, rows) in [("exp-a", 3), ("exp-b", 5)] {
        let path = dir.path().join(format!("{id}.parquet"));
        let batch = loss_table(rows);
        let mut writer =
            ArrowWriter::try_new(std::fs::File::create(&path).unwrap(), batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        store.add_experiment(ExperimentRecord::new(id));
        store.log_dataframe_parquet(id, "loss", &path).unwrap();
    }

    let plot = DataframePlot::builder("loss").load(&store.experiments()).unwrap();
    assert_eq!(plot.table().num_rows(), 8);
    assert_eq!(plot.render::<&str>(None).unwrap().figure.data.len(), 2);
}
