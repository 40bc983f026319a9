//! Output module
//!
//! Handles Parquet encoding of Arrow RecordBatches.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Configuring Parquet compression, row groups, dictionary and statistics
//! - Encoding batches into in-memory Parquet files
//! - Decoding Parquet files back into batches

mod writer;

pub use writer::{
    decode_batches, encode_batch, ParquetCompression, ParquetWriter, ParquetWriterConfig,
};
