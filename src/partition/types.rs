//! Partition spec and partitioned batches

use super::escape::{escape_value, unescape_value};
use crate::error::{Error, Result};
use arrow::array::{Array, ArrayRef, StringArray, UInt32Array};
use arrow::compute::{cast_with_options, take_record_batch, CastOptions};
use arrow::datatypes::{DataType, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The rows of one partition, with partition columns stripped
#[derive(Debug, Clone)]
pub struct PartitionedBatch {
    /// Partition values in column order, `None` for null
    pub values: Vec<Option<String>>,
    /// Relative directory (`year=2018/month=11`), empty when unpartitioned
    pub directory: String,
    /// Data columns only
    pub batch: RecordBatch,
}

/// Ordered partition columns of a relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSpec {
    relation: String,
    columns: Vec<String>,
}

impl PartitionSpec {
    /// Create a spec for `relation` partitioned by `columns`, outermost first
    pub fn new(relation: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            relation: relation.into(),
            columns: columns.iter().map(ToString::to_string).collect(),
        }
    }

    /// Whether the relation has any partition columns
    pub fn is_partitioned(&self) -> bool {
        !self.columns.is_empty()
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::partition(&self.relation, message)
    }

    /// Relative directory for a tuple of partition values
    pub fn directory(&self, values: &[Option<String>]) -> String {
        self.columns
            .iter()
            .zip(values)
            .map(|(column, value)| format!("{column}={}", escape_value(value.as_deref())))
            .collect::<Vec<_>>()
            .join("/")
    }

    fn partition_indices(&self, schema: &Schema) -> Result<Vec<usize>> {
        self.columns
            .iter()
            .map(|column| {
                schema
                    .index_of(column)
                    .map_err(|_| self.error(format!("partition column '{column}' is not in the schema")))
            })
            .collect()
    }

    /// Schema of the stored files: `schema` without the partition columns
    pub fn data_schema(&self, schema: &Schema) -> Result<SchemaRef> {
        self.partition_indices(schema)?;
        let fields: Vec<_> = schema
            .fields()
            .iter()
            .filter(|f| !self.columns.contains(f.name()))
            .cloned()
            .collect();
        Ok(Arc::new(Schema::new(fields)))
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Split a batch into one batch per distinct tuple of partition values
    ///
    /// Groups come out sorted by their values; rows keep their order inside
    /// each group. An unpartitioned spec yields the whole batch as one group,
    /// even when it is empty.
    pub fn split(&self, batch: &RecordBatch) -> Result<Vec<PartitionedBatch>> {
        if !self.is_partitioned() {
            return Ok(vec![PartitionedBatch {
                values: Vec::new(),
                directory: String::new(),
                batch: batch.clone(),
            }]);
        }

        let schema = batch.schema();
        let partition_indices = self.partition_indices(&schema)?;
        let data_indices: Vec<usize> = (0..schema.fields().len())
            .filter(|i| !partition_indices.contains(i))
            .collect();
        let data = batch.project(&data_indices)?;

        let key_columns: Vec<&dyn Array> = partition_indices
            .iter()
            .map(|&i| batch.column(i).as_ref())
            .collect();

        let mut groups: BTreeMap<Vec<Option<String>>, Vec<u32>> = BTreeMap::new();
        for row in 0..batch.num_rows() {
            let key = key_columns
                .iter()
                .map(|column| {
                    if column.is_null(row) {
                        Ok(None)
                    } else {
                        array_value_to_string(*column, row).map(Some)
                    }
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let row = u32::try_from(row)
                .map_err(|_| self.error("batch has too many rows to partition"))?;
            groups.entry(key).or_default().push(row);
        }

        groups
            .into_iter()
            .map(|(values, rows)| {
                let batch = take_record_batch(&data, &UInt32Array::from(rows))?;
                Ok(PartitionedBatch {
                    directory: self.directory(&values),
                    values,
                    batch,
                })
            })
            .collect()
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// Parse partition values from a file path relative to the relation root
    ///
    /// The directories must be exactly the partition columns, in order.
    pub fn parse_directory(&self, path: &str) -> Result<Vec<Option<String>>> {
        let segments: Vec<&str> = path.split('/').collect();
        let directories = &segments[..segments.len().saturating_sub(1)];

        if directories.len() != self.columns.len() {
            return Err(self.error(format!(
                "expected {} partition directories in '{path}', found {}",
                self.columns.len(),
                directories.len()
            )));
        }

        self.columns
            .iter()
            .zip(directories)
            .map(|(column, segment)| match segment.split_once('=') {
                Some((key, value)) if key == column => Ok(unescape_value(value)),
                _ => Err(self.error(format!(
                    "expected '{column}=<value>' in '{path}', found '{segment}'"
                ))),
            })
            .collect()
    }

    /// Rebuild a full-schema batch from stored data columns and path values
    ///
    /// Partition values are cast from their path text to the type `schema`
    /// declares for the column.
    pub fn restore(
        &self,
        data: &RecordBatch,
        values: &[Option<String>],
        schema: &SchemaRef,
    ) -> Result<RecordBatch> {
        let rows = data.num_rows();
        let cast_options = CastOptions {
            safe: false,
            ..Default::default()
        };

        let columns = schema
            .fields()
            .iter()
            .map(|field| {
                if let Some(pos) = self.columns.iter().position(|c| c == field.name()) {
                    let value = values.get(pos).cloned().flatten();
                    let text: ArrayRef = Arc::new(StringArray::from(vec![value.as_deref(); rows]));
                    if field.data_type() == &DataType::Utf8 {
                        Ok(text)
                    } else {
                        cast_with_options(&text, field.data_type(), &cast_options).map_err(|e| {
                            self.error(format!(
                                "partition value {value:?} is not a valid {} for '{}': {e}",
                                field.data_type(),
                                field.name()
                            ))
                        })
                    }
                } else {
                    data.column_by_name(field.name()).cloned().ok_or_else(|| {
                        self.error(format!("stored file is missing column '{}'", field.name()))
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RecordBatch::try_new(schema.clone(), columns)?)
    }
}
