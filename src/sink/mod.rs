//! Relation sink module
//!
//! Persists relations as Parquet datasets below an output root and reads
//! them back.
//!
//! # Overview
//!
//! - [`RelationSink`]: write a relation with full-overwrite semantics, read
//!   a committed relation back
//! - [`ParquetSink`]: Hive-partitioned Parquet files in an object store,
//!   written through a staging area and committed by swapping a `_SUCCESS`
//!   manifest of the data files
//! - [`write_relation`] / [`read_relation`]: typed helpers over any sink
//!
//! # Layout
//!
//! ```text
//! {output}/songs/year=2000/artist_id=A1/part-00000-{run_id}.snappy.parquet
//! {output}/songs/_SUCCESS
//! {output}/_temporary/{run_id}/songs/...   (only while a write is staging)
//! ```

mod dataset;
mod types;

pub use dataset::{ParquetSink, STAGING_DIR, SUCCESS_MARKER};
pub use types::{read_relation, write_relation, RelationSink, WriteSummary};
