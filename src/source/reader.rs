//! Reading records from object storage

use super::pattern::PathPattern;
use crate::decode::{JsonlDecoder, RecordDecoder};
use crate::error::{Error, Result};
use crate::storage::Location;
use crate::types::JsonObject;
use async_trait::async_trait;
use tracing::{debug, info};

/// A raw record and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    /// Index of the file in lexicographic order among the matches
    pub shard: usize,
    /// Path of the file relative to the input root
    pub file: String,
    /// 1-based line number within the file
    pub line: usize,
    /// Top-level fields
    pub fields: JsonObject,
}

impl SourceRecord {
    /// `file:line`, used to point errors at a record
    pub fn context(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

/// Anything that can produce the records matching a path pattern
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Read every record matching `pattern`, in arrival order
    ///
    /// Fails with `InputNotFound` when nothing matches or the matching files
    /// hold no records.
    async fn read(&self, pattern: &PathPattern) -> Result<Vec<SourceRecord>>;
}

/// JSON Lines files below an input [`Location`]
#[derive(Debug, Clone)]
pub struct JsonSource {
    location: Location,
    decoder: JsonlDecoder,
}

impl JsonSource {
    /// Create a source rooted at `location`
    pub fn new(location: Location) -> Self {
        Self {
            location,
            decoder: JsonlDecoder::new(),
        }
    }

    async fn matching_files(&self, pattern: &PathPattern) -> Result<Vec<String>> {
        let listed = self.location.list(pattern.literal_prefix()).await?;
        Ok(listed
            .into_iter()
            .filter(|path| pattern.matches(path))
            .collect())
    }

    async fn read_file(&self, shard: usize, file: &str) -> Result<Vec<SourceRecord>> {
        let bytes = self.location.get(file).await?;
        let display = self.location.display_path(file);

        let body = std::str::from_utf8(&bytes)
            .map_err(|e| Error::decode(format!("{display}: file is not valid UTF-8: {e}")))?;

        let decoded = self.decoder.decode(body).map_err(|e| match e {
            Error::Decode { message } => Error::decode(format!("{display}: {message}")),
            other => other,
        })?;

        Ok(decoded
            .into_iter()
            .map(|record| SourceRecord {
                shard,
                file: file.to_string(),
                line: record.line,
                fields: record.fields,
            })
            .collect())
    }
}

#[async_trait]
impl RecordSource for JsonSource {
    async fn read(&self, pattern: &PathPattern) -> Result<Vec<SourceRecord>> {
        let files = self.matching_files(pattern).await?;
        if files.is_empty() {
            return Err(Error::input_not_found(
                self.location.display_path(pattern.as_str()),
            ));
        }

        let mut records = Vec::new();
        for (shard, file) in files.iter().enumerate() {
            let batch = self.read_file(shard, file).await?;
            debug!(file = %file, shard, records = batch.len(), "Read source file");
            records.extend(batch);
        }

        if records.is_empty() {
            return Err(Error::input_not_found(
                self.location.display_path(pattern.as_str()),
            ));
        }

        info!(
            pattern = %pattern,
            files = files.len(),
            records = records.len(),
            "Loaded source records"
        );
        Ok(records)
    }
}
