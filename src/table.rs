//! Combined table: one named dataframe merged across many experiments
//!
//! Every experiment's copy of the dataframe is tagged with an
//! `experiment_id` column and the tagged tables are concatenated in
//! experiment order into a single Arrow `RecordBatch`.
//!
//! Append-only: the combined table is built once at load and only read
//! afterwards, so it can be shared between concurrent renders.

use std::sync::Arc;

use arrow::array::{new_null_array, Array, ArrayRef, BooleanArray, RecordBatch, StringArray};
use arrow::compute;
use arrow::datatypes::{DataType, Field, FieldRef, Schema, SchemaRef};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::experiment::ExperimentRef;
use crate::{Error, Result};

/// Name of the provenance column added to every row.
pub const EXPERIMENT_ID_COLUMN: &str = "experiment_id";

/// How to treat dataframes whose columns differ between experiments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchemaPolicy {
    /// Every dataframe must carry the same column names and types
    #[default]
    Strict,
    /// Union the columns in first-seen order; absent columns become nulls
    Pad,
}

/// What happened while loading, for callers that want more than logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    loaded: Vec<String>,
    skipped: Vec<String>,
}

impl LoadReport {
    /// Experiments that contributed rows, in load order.
    #[must_use]
    pub fn loaded(&self) -> &[String] {
        &self.loaded
    }

    /// Experiments skipped because they lack the named dataframe.
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}

/// Provenance-tagged union of one named dataframe across experiments.
#[derive(Debug, Clone)]
pub struct CombinedTable {
    dataframe_name: String,
    data: RecordBatch,
    experiment_ids: Vec<String>,
    first_columns: Vec<String>,
}

impl CombinedTable {
    /// Fetch `dataframe_name` from every experiment and concatenate the results.
    ///
    /// Experiments without the dataframe are skipped with a warning and
    /// listed in the returned [`LoadReport`].
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No experiment has the dataframe (`NoDataFound`)
    /// - Schemas differ under `SchemaPolicy::Strict`, or a column changes
    ///   type under `SchemaPolicy::Pad` (`SchemaMismatch`)
    /// - An experiment fails with anything other than `DataframeNotFound`
    pub fn load<E: ExperimentRef>(
        experiments: &[E],
        dataframe_name: &str,
        policy: SchemaPolicy,
    ) -> Result<(Self, LoadReport)> {
        let mut report = LoadReport::default();
        let mut tagged = Vec::with_capacity(experiments.len());

        for experiment in experiments {
            let batch = match experiment.dataframe(dataframe_name) {
                Ok(batch) => batch,
                Err(err @ Error::DataframeNotFound { .. }) => {
                    warn!(
                        experiment_id = experiment.id(),
                        dataframe = dataframe_name,
                        "skipping experiment: {err}"
                    );
                    report.skipped.push(experiment.id().to_string());
                    continue;
                }
                Err(err) => return Err(err),
            };

            tagged.push((experiment.id().to_string(), tag(&batch, experiment.id())?));
            report.loaded.push(experiment.id().to_string());
        }

        let Some((_, first)) = tagged.first() else {
            return Err(Error::NoDataFound {
                name: dataframe_name.to_string(),
            });
        };
        let first_columns = column_names(&first.schema());

        let schema = unify_schemas(&tagged, policy)?;
        let conformed = tagged
            .iter()
            .map(|(_, batch)| conform(batch, &schema))
            .collect::<Result<Vec<_>>>()?;

        let data = compute::concat_batches(&schema, &conformed)
            .map_err(|e| Error::StorageError(format!("Failed to combine batches: {e}")))?;

        debug!(
            dataframe = dataframe_name,
            rows = data.num_rows(),
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            "combined dataframes"
        );

        let table = Self {
            dataframe_name: dataframe_name.to_string(),
            data,
            experiment_ids: report.loaded.clone(),
            first_columns,
        };
        Ok((table, report))
    }

    /// Name of the dataframe this table combines.
    #[must_use]
    pub fn dataframe_name(&self) -> &str {
        &self.dataframe_name
    }

    /// The combined rows, including the `experiment_id` column.
    #[must_use]
    pub const fn data(&self) -> &RecordBatch {
        &self.data
    }

    /// Total row count across experiments.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.data.num_rows()
    }

    /// Experiments that contributed rows, in append order.
    #[must_use]
    pub fn experiment_ids(&self) -> &[String] {
        &self.experiment_ids
    }

    /// Column order of the first loaded dataframe (after tagging).
    #[must_use]
    pub fn first_columns(&self) -> &[String] {
        &self.first_columns
    }

    /// Default `(x, y)`: the first two columns of the first loaded dataframe.
    ///
    /// `None` if that dataframe had fewer than two columns.
    #[must_use]
    pub fn default_axes(&self) -> Option<(&str, &str)> {
        match self.first_columns.as_slice() {
            [x, y, ..] => Some((x.as_str(), y.as_str())),
            _ => None,
        }
    }

    /// Check that a column exists in the combined schema.
    ///
    /// # Errors
    /// Returns `ColumnNotFound` if it does not
    pub fn require_column(&self, name: &str) -> Result<()> {
        self.data
            .schema()
            .index_of(name)
            .map(|_| ())
            .map_err(|_| Error::ColumnNotFound(name.to_string()))
    }

    /// Rows whose `experiment_id` is in `selected`, in original order.
    ///
    /// Unknown identifiers match nothing; an empty selection yields an
    /// empty table with the full schema.
    ///
    /// # Errors
    /// Returns error if the provenance column is missing or not Utf8
    pub fn select<S: AsRef<str>>(&self, selected: &[S]) -> Result<RecordBatch> {
        let wanted: FxHashSet<&str> = selected.iter().map(AsRef::as_ref).collect();

        let column = self
            .data
            .column_by_name(EXPERIMENT_ID_COLUMN)
            .ok_or_else(|| Error::ColumnNotFound(EXPERIMENT_ID_COLUMN.to_string()))?;
        let ids = column
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| Error::Other("Failed to downcast to StringArray".to_string()))?;

        let mask: BooleanArray = ids
            .iter()
            .map(|id| Some(id.is_some_and(|id| wanted.contains(id))))
            .collect();

        compute::filter_record_batch(&self.data, &mask)
            .map_err(|e| Error::StorageError(format!("Failed to apply filter: {e}")))
    }
}

/// Add (or overwrite) the provenance column.
fn tag(batch: &RecordBatch, experiment_id: &str) -> Result<RecordBatch> {
    let ids: ArrayRef = Arc::new(StringArray::from(vec![experiment_id; batch.num_rows()]));
    let field: FieldRef = Arc::new(Field::new(EXPERIMENT_ID_COLUMN, DataType::Utf8, false));

    let schema = batch.schema();
    let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
    let mut columns = batch.columns().to_vec();

    if let Ok(pos) = schema.index_of(EXPERIMENT_ID_COLUMN) {
        fields[pos] = field;
        columns[pos] = ids;
    } else {
        fields.push(field);
        columns.push(ids);
    }

    let schema = Schema::new_with_metadata(fields, schema.metadata().clone());
    Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
}

fn column_names(schema: &Schema) -> Vec<String> {
    schema.fields().iter().map(|f| f.name().clone()).collect()
}

fn describe(schema: &Schema) -> String {
    let columns: Vec<String> = schema
        .fields()
        .iter()
        .map(|f| format!("{}: {}", f.name(), f.data_type()))
        .collect();
    format!("[{}]", columns.join(", "))
}

/// Same column names and types, in any order.
fn same_columns(a: &Schema, b: &Schema) -> bool {
    a.fields().len() == b.fields().len()
        && a.fields().iter().all(|f| {
            b.field_with_name(f.name())
                .is_ok_and(|other| other.data_type() == f.data_type())
        })
}

fn unify_schemas(tagged: &[(String, RecordBatch)], policy: SchemaPolicy) -> Result<SchemaRef> {
    let first = tagged[0].1.schema();
    let mut fields: Vec<Field> = first.fields().iter().map(|f| f.as_ref().clone()).collect();

    for (experiment_id, batch) in &tagged[1..] {
        let schema = batch.schema();
        let mismatch = || Error::SchemaMismatch {
            experiment_id: experiment_id.clone(),
            expected: describe(&first),
            found: describe(&schema),
        };

        if policy == SchemaPolicy::Strict && !same_columns(&first, &schema) {
            return Err(mismatch());
        }

        for field in schema.fields() {
            match fields.iter_mut().find(|u| u.name() == field.name()) {
                Some(existing) if existing.data_type() != field.data_type() => {
                    return Err(mismatch());
                }
                Some(existing) => {
                    if field.is_nullable() && !existing.is_nullable() {
                        *existing = existing.clone().with_nullable(true);
                    }
                }
                None => fields.push(field.as_ref().clone()),
            }
        }
    }

    // Columns some tables lack are padded with nulls.
    for field in &mut fields {
        let everywhere = tagged
            .iter()
            .all(|(_, batch)| batch.schema().index_of(field.name()).is_ok());
        if !everywhere {
            *field = field.clone().with_nullable(true);
        }
    }

    Ok(Arc::new(Schema::new_with_metadata(fields, first.metadata().clone())))
}

/// Reorder (and pad) a tagged batch to the unified schema.
fn conform(batch: &RecordBatch, schema: &SchemaRef) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = schema
        .fields()
        .iter()
        .map(|field| {
            batch
                .column_by_name(field.name())
                .cloned()
                .unwrap_or_else(|| new_null_array(field.data_type(), batch.num_rows()))
        })
        .collect();

    Ok(RecordBatch::try_new(schema.clone(), columns)?)
}
