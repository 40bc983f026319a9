//! Sink trait and typed helpers

use crate::error::Result;
use crate::model::Relation;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;

/// Outcome of one relation write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Relation name
    pub relation: String,
    /// Rows written
    pub rows: usize,
    /// Data files written
    pub files: usize,
    /// Distinct partition directories written
    pub partitions: usize,
}

/// Output collaborator: full-overwrite writes and read-back of relations
#[async_trait]
pub trait RelationSink: Send + Sync {
    /// Replace everything stored for `relation` with `batch`
    ///
    /// `batch` carries the full relation schema; `partition_by` names the
    /// columns that become directories. Failures are `SinkWriteFailure`.
    async fn write(
        &self,
        relation: &str,
        batch: &RecordBatch,
        partition_by: &[&str],
    ) -> Result<WriteSummary>;

    /// Read a committed relation back with the given full schema
    ///
    /// A relation that was never committed is `InputNotFound`.
    async fn read(
        &self,
        relation: &str,
        schema: SchemaRef,
        partition_by: &[&str],
    ) -> Result<Vec<RecordBatch>>;
}

/// Write typed rows of a relation
pub async fn write_relation<R: Relation>(
    sink: &dyn RelationSink,
    rows: &[R],
) -> Result<WriteSummary> {
    let batch = R::to_batch(rows)?;
    sink.write(R::NAME, &batch, R::PARTITION_BY).await
}

/// Read typed rows of a relation
pub async fn read_relation<R: Relation>(sink: &dyn RelationSink) -> Result<Vec<R>> {
    let batches = sink.read(R::NAME, R::schema(), R::PARTITION_BY).await?;
    let mut rows = Vec::new();
    for batch in &batches {
        rows.extend(R::from_batch(batch)?);
    }
    Ok(rows)
}
