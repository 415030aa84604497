//! Overlay Dashboard Example
//!
//! Logs a `loss_curve` dataframe to three of four experiments, loads the
//! dataframe plot, and walks through what a dashboard host would do:
//! mount the layout, render on page load, re-render on a selection change.
//!
//! Run with: cargo run --example overlay_dashboard
//! Verbose:  RUST_LOG=trueno_dfplot=debug cargo run --example overlay_dashboard

use std::sync::Arc;

use anyhow::Context;
use arrow::array::{Float64Array, Int64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use trueno_dfplot::experiment::{DataframeRecord, ExperimentRecord, ExperimentStore};
use trueno_dfplot::plot::options::{MARKERS, TITLE};
use trueno_dfplot::DataframePlot;

#[allow(clippy::cast_precision_loss)]
fn loss_curve(epochs: i64, learning_rate: f64) -> anyhow::Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("epoch", DataType::Int64, false),
        Field::new("loss", DataType::Float64, false),
    ]));
    let loss = (0..epochs).map(|e| 2.5 / (e as f64 * learning_rate * 100.0 + 1.0) + 0.1);

    Ok(RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from_iter_values(0..epochs)),
            Arc::new(Float64Array::from_iter_values(loss)),
        ],
    )?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Trueno-DFPlot Overlay Dashboard ===\n");

    // -------------------------------------------------------------------------
    // 1. Log experiments and their loss curves
    // -------------------------------------------------------------------------
    println!("1. Logging experiments...");

    let mut store = ExperimentStore::new();
    for (id, learning_rate) in [
        ("resnet-lr-0.001", Some(0.001)),
        ("resnet-lr-0.010", Some(0.01)),
        ("resnet-lr-0.100", None),
        ("resnet-lr-0.050", Some(0.05)),
    ] {
        let experiment = ExperimentRecord::builder(id)
            .name("ResNet50 sweep")
            .tag("sweep")
            .config(json!({ "learning_rate": learning_rate }))
            .build();
        store.add_experiment(experiment);

        if let Some(lr) = learning_rate {
            store
                .log_dataframe(DataframeRecord::new(id, "loss_curve", loss_curve(10, lr)?))
                .with_context(|| format!("logging loss_curve for {id}"))?;
        }
        println!("   {id}: dataframes {:?}", store.dataframe_names(id));
    }

    // -------------------------------------------------------------------------
    // 2. Load the plot (one experiment is skipped with a warning)
    // -------------------------------------------------------------------------
    println!("\n2. Loading dataframe plot...");

    let plot = DataframePlot::builder("loss_curve")
        .option(TITLE, "Loss by learning rate")
        .option(MARKERS, true)
        .link_experiment_table(true)
        .load(&store.experiments())
        .context("loading loss_curve plot")?;

    println!("   Rows combined: {}", plot.table().num_rows());
    println!("   Skipped: {:?}", plot.load_report().skipped());
    println!("   Axes: x={} y={}", plot.config().x(), plot.config().y());

    // -------------------------------------------------------------------------
    // 3. What the host mounts and wires
    // -------------------------------------------------------------------------
    println!("\n3. Layout and callback...");
    println!("   {}", serde_json::to_string(&plot.layout())?);
    println!("   {}", serde_json::to_string(&plot.callback())?);

    // -------------------------------------------------------------------------
    // 4. Page load, then the user selects two rows in the experiment table
    // -------------------------------------------------------------------------
    println!("\n4. Rendering...");

    let initial = plot.handle_callback(&[json!(null), json!(null)])?;
    println!("   Page load: {} ({} traces)", initial.header, initial.figure.data.len());

    let selected = plot.handle_callback(&[
        json!(null),
        json!(["resnet-lr-0.001", "resnet-lr-0.050"]),
    ])?;
    println!(
        "   Selection: {} (legend {:?})",
        selected.header,
        selected.figure.legend_labels()
    );
    println!("   Figure JSON: {} bytes", selected.figure.to_json()?.len());

    println!("\n=== Done ===");
    Ok(())
}
