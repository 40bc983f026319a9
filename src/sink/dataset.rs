//! Parquet dataset sink over an object store location

use super::types::{RelationSink, WriteSummary};
use crate::config::SinkSettings;
use crate::error::{Error, Result};
use crate::output::{decode_batches, ParquetWriter, ParquetWriterConfig};
use crate::partition::PartitionSpec;
use crate::storage::Location;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Manifest written last when a relation is committed
///
/// Lists the relation's data files, one path per line relative to the
/// relation root. Readers load exactly these files.
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Root of the per-run staging area
pub const STAGING_DIR: &str = "_temporary";

/// Writes relations as Hive-partitioned Parquet below an output root
#[derive(Debug, Clone)]
pub struct ParquetSink {
    location: Location,
    writer_config: ParquetWriterConfig,
    max_rows_per_file: Option<usize>,
    run_id: String,
}

impl ParquetSink {
    /// Create a sink with a fresh run id
    pub fn new(location: Location, settings: &SinkSettings) -> Self {
        let writer_config = ParquetWriterConfig::new()
            .with_compression(settings.compression)
            .with_row_group_size(settings.row_group_size);
        Self {
            location,
            writer_config,
            max_rows_per_file: settings.max_rows_per_file,
            run_id: new_run_id(),
        }
    }

    /// Use a fixed run id (file names and staging directory derive from it)
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// Identifier of this run
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    fn staging_root(&self, relation: &str) -> String {
        format!("{STAGING_DIR}/{}/{relation}", self.run_id)
    }

    fn file_name(&self, index: usize) -> String {
        format!(
            "part-{index:05}-{}.{}",
            self.run_id,
            self.writer_config.file_extension()
        )
    }

    fn chunk_rows(&self, rows: usize) -> usize {
        self.max_rows_per_file.unwrap_or(rows).max(1)
    }

    /// Encode every partition into staged files, returning their paths
    /// relative to the relation root
    async fn stage(
        &self,
        relation: &str,
        batch: &RecordBatch,
        spec: &PartitionSpec,
    ) -> Result<(Vec<String>, usize)> {
        let data_schema = spec.data_schema(&batch.schema())?;
        let parts = spec.split(batch)?;
        let staging = self.staging_root(relation);

        let mut files = Vec::new();
        for part in &parts {
            let rows = part.batch.num_rows();
            let chunk = self.chunk_rows(rows);
            let mut offset = 0;
            loop {
                let len = chunk.min(rows - offset);
                let mut writer = ParquetWriter::new(&data_schema, &self.writer_config);
                writer.write(&part.batch.slice(offset, len))?;
                let data: Bytes = writer.finish()?;

                let name = self.file_name(files.len());
                let relative = if part.directory.is_empty() {
                    name
                } else {
                    format!("{}/{name}", part.directory)
                };
                self.location.put(&format!("{staging}/{relative}"), data).await?;
                debug!(relation, file = %relative, rows = len, "Staged file");
                files.push(relative);

                offset += len;
                if offset >= rows {
                    break;
                }
            }
        }

        Ok((files, parts.len()))
    }

    /// Files listed by the committed manifest, `None` if never committed
    async fn committed_files(&self, relation: &str) -> Result<Option<Vec<String>>> {
        let marker = format!("{relation}/{SUCCESS_MARKER}");
        let Some(body) = self.location.get_if_exists(&marker).await? else {
            return Ok(None);
        };
        let body = std::str::from_utf8(&body).map_err(|e| {
            Error::decode(format!(
                "{}: manifest is not valid UTF-8: {e}",
                self.location.display_path(&marker)
            ))
        })?;
        Ok(Some(
            body.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(ToString::to_string)
                .collect(),
        ))
    }

    /// Publish the staged files and swap the manifest
    ///
    /// New files carry the run id in their names, so moving them next to the
    /// previous output is invisible to readers until `_SUCCESS` is replaced.
    /// On failure the previous manifest and its files are left untouched.
    async fn commit(&self, relation: &str, files: &[String]) -> Result<()> {
        let previous: BTreeSet<String> = self
            .committed_files(relation)
            .await?
            .unwrap_or_default()
            .into_iter()
            .collect();

        let staging = self.staging_root(relation);
        let mut moved: Vec<&str> = Vec::with_capacity(files.len());
        for file in files {
            let renamed = self
                .location
                .rename(&format!("{staging}/{file}"), &format!("{relation}/{file}"))
                .await;
            if let Err(e) = renamed {
                self.unpublish(relation, &moved, &previous).await;
                return Err(e);
            }
            moved.push(file);
        }

        let manifest = Bytes::from(files.iter().map(|f| format!("{f}\n")).collect::<String>());
        if let Err(e) = self
            .location
            .put(&format!("{relation}/{SUCCESS_MARKER}"), manifest)
            .await
        {
            self.unpublish(relation, &moved, &previous).await;
            return Err(e);
        }

        self.remove_stale(relation, files).await;
        Ok(())
    }

    /// Remove files moved by a failed commit that the live manifest does not list
    async fn unpublish(&self, relation: &str, moved: &[&str], previous: &BTreeSet<String>) {
        for file in moved.iter().filter(|f| !previous.contains(**f)) {
            if let Err(e) = self.location.delete(&format!("{relation}/{file}")).await {
                warn!(relation, file = %file, error = %e, "Failed to remove unpublished file");
            }
        }
    }

    /// Delete everything below the relation the new manifest does not list
    async fn remove_stale(&self, relation: &str, files: &[String]) {
        let root = format!("{relation}/");
        let keep: BTreeSet<&str> = files.iter().map(String::as_str).collect();

        let listed = match self.location.list(relation).await {
            Ok(listed) => listed,
            Err(e) => {
                warn!(relation, error = %e, "Failed to list previous output");
                return;
            }
        };

        let mut removed = 0;
        for path in &listed {
            let Some(file) = path.strip_prefix(&root) else {
                continue;
            };
            if file == SUCCESS_MARKER || keep.contains(file) {
                continue;
            }
            match self.location.delete(path).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(relation, file = %file, error = %e, "Failed to remove stale file"),
            }
        }
        debug!(relation, removed, "Removed previous output");
    }

    async fn discard_staging(&self, relation: &str) {
        let staging = self.staging_root(relation);
        if let Err(e) = self.location.delete_prefix(&staging).await {
            warn!(relation, error = %e, "Failed to clean up staging area");
        }
    }
}

fn new_run_id() -> String {
    format!(
        "{}-{}",
        Utc::now().format("%Y%m%dT%H%M%S%3fZ"),
        std::process::id()
    )
}

fn as_sink_failure(relation: &str, error: Error) -> Error {
    match error {
        Error::SinkWriteFailure { .. } => error,
        other => Error::sink_write(relation, other.to_string()),
    }
}

#[async_trait]
impl RelationSink for ParquetSink {
    async fn write(
        &self,
        relation: &str,
        batch: &RecordBatch,
        partition_by: &[&str],
    ) -> Result<WriteSummary> {
        let spec = PartitionSpec::new(relation, partition_by);

        let (files, partitions) = match self.stage(relation, batch, &spec).await {
            Ok(staged) => staged,
            Err(e) => {
                self.discard_staging(relation).await;
                return Err(as_sink_failure(relation, e));
            }
        };

        let committed = self.commit(relation, &files).await;
        self.discard_staging(relation).await;
        committed.map_err(|e| as_sink_failure(relation, e))?;

        let summary = WriteSummary {
            relation: relation.to_string(),
            rows: batch.num_rows(),
            files: files.len(),
            partitions,
        };
        info!(
            relation,
            rows = summary.rows,
            files = summary.files,
            partitions = summary.partitions,
            path = %self.location.display_path(relation),
            "Committed relation"
        );
        Ok(summary)
    }

    async fn read(
        &self,
        relation: &str,
        schema: SchemaRef,
        partition_by: &[&str],
    ) -> Result<Vec<RecordBatch>> {
        let spec = PartitionSpec::new(relation, partition_by);
        let Some(files) = self.committed_files(relation).await? else {
            return Err(Error::input_not_found(
                self.location.display_path(&format!("{relation}/{SUCCESS_MARKER}")),
            ));
        };

        let mut batches = Vec::new();
        for file in &files {
            let values = spec.parse_directory(file)?;
            let data = self.location.get(&format!("{relation}/{file}")).await?;
            for stored in decode_batches(data)? {
                batches.push(spec.restore(&stored, &values, &schema)?);
            }
        }

        let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
        debug!(relation, rows, "Read relation");
        Ok(batches)
    }
}
