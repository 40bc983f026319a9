//! Parquet encoding
//!
//! Encodes Arrow RecordBatches into in-memory Parquet files and decodes
//! them back. The bytes are handed to the object store by the sink.

use crate::error::{Error, Result};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Compression codec for output files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParquetCompression {
    #[default]
    Snappy,
    Zstd,
    Gzip,
    Uncompressed,
}

impl ParquetCompression {
    /// Codec tag used in output file names (`part-00000-x.snappy.parquet`)
    pub fn file_tag(self) -> Option<&'static str> {
        match self {
            ParquetCompression::Snappy => Some("snappy"),
            ParquetCompression::Zstd => Some("zstd"),
            ParquetCompression::Gzip => Some("gz"),
            ParquetCompression::Uncompressed => None,
        }
    }

    fn codec(self) -> Compression {
        match self {
            ParquetCompression::Snappy => Compression::SNAPPY,
            ParquetCompression::Zstd => Compression::ZSTD(ZstdLevel::default()),
            ParquetCompression::Gzip => Compression::GZIP(GzipLevel::default()),
            ParquetCompression::Uncompressed => Compression::UNCOMPRESSED,
        }
    }
}

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: ParquetCompression,
    row_group_size: usize,
    dictionary_enabled: bool,
    statistics_enabled: bool,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: ParquetCompression::Snappy,
            row_group_size: 1024 * 1024, // 1M rows
            dictionary_enabled: true,
            statistics_enabled: true,
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set compression codec
    #[must_use]
    pub fn with_compression(mut self, compression: ParquetCompression) -> Self {
        self.compression = compression;
        self
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Enable or disable dictionary encoding
    #[must_use]
    pub fn with_dictionary(mut self, enabled: bool) -> Self {
        self.dictionary_enabled = enabled;
        self
    }

    /// Enable or disable statistics
    #[must_use]
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics_enabled = enabled;
        self
    }

    /// Get row group size
    #[must_use]
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Get dictionary encoding enabled
    #[must_use]
    pub fn is_dictionary_enabled(&self) -> bool {
        self.dictionary_enabled
    }

    /// Get statistics enabled
    #[must_use]
    pub fn is_statistics_enabled(&self) -> bool {
        self.statistics_enabled
    }

    /// File name suffix for files written with this config
    pub fn file_extension(&self) -> String {
        match self.compression.file_tag() {
            Some(tag) => format!("{tag}.parquet"),
            None => "parquet".to_string(),
        }
    }

    fn build_properties(&self) -> WriterProperties {
        let mut builder = WriterProperties::builder()
            .set_compression(self.compression.codec())
            .set_max_row_group_size(self.row_group_size);

        if !self.dictionary_enabled {
            builder = builder.set_dictionary_enabled(false);
        }

        if !self.statistics_enabled {
            builder =
                builder.set_statistics_enabled(parquet::file::properties::EnabledStatistics::None);
        }

        builder.build()
    }
}

/// Parquet writer producing a file in memory
pub struct ParquetWriter {
    buffer: Vec<u8>,
    schema: Arc<Schema>,
    props: WriterProperties,
    batches: Vec<RecordBatch>,
    rows_written: usize,
}

impl ParquetWriter {
    /// Create a new Parquet writer for the given schema
    pub fn new(schema: &Schema, config: &ParquetWriterConfig) -> Self {
        Self {
            buffer: Vec::new(),
            schema: Arc::new(schema.clone()),
            props: config.build_properties(),
            batches: Vec::new(),
            rows_written: 0,
        }
    }

    /// Queue a RecordBatch for the file
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        if batch.schema().fields() != self.schema.fields() {
            return Err(Error::output(format!(
                "Batch schema does not match writer schema: {:?}",
                batch.schema()
            )));
        }
        self.rows_written += batch.num_rows();
        self.batches.push(batch.clone());
        Ok(())
    }

    /// Get the number of rows written so far
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Encode the queued batches and return the finished file
    pub fn finish(mut self) -> Result<Bytes> {
        let mut writer = ArrowWriter::try_new(
            &mut self.buffer,
            Arc::clone(&self.schema),
            Some(self.props.clone()),
        )
        .map_err(|e| Error::output(format!("Failed to create Parquet writer: {e}")))?;

        for batch in &self.batches {
            writer
                .write(batch)
                .map_err(|e| Error::output(format!("Failed to write batch: {e}")))?;
        }

        writer
            .close()
            .map_err(|e| Error::output(format!("Failed to close Parquet writer: {e}")))?;

        Ok(Bytes::from(self.buffer))
    }
}

/// Encode a single RecordBatch as a Parquet file
pub fn encode_batch(batch: &RecordBatch, config: Option<&ParquetWriterConfig>) -> Result<Bytes> {
    let default_config = ParquetWriterConfig::default();
    let config = config.unwrap_or(&default_config);

    let mut writer = ParquetWriter::new(batch.schema().as_ref(), config);
    writer.write(batch)?;
    writer.finish()
}

/// Decode a Parquet file into RecordBatches
pub fn decode_batches(data: Bytes) -> Result<Vec<RecordBatch>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(data)?.build()?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(batches)
}
