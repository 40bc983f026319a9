//! Relation model
//!
//! Typed rows for every relation the pipeline reads or writes, and their
//! Arrow representation.
//!
//! # Overview
//!
//! - Source rows: [`Song`], [`Artist`] (catalog feed) and [`ActivityEvent`]
//!   (activity log), built from raw records with strict field checks
//! - Derived rows: [`User`], [`TimeRow`] and the [`Songplay`] fact
//! - [`Relation`]: name, schema, partition columns and batch conversion for
//!   everything the sink persists

mod activity;
mod catalog;
mod columns;
mod fact;
mod fields;

pub use activity::{start_time_from_ts, ActivityEvent, TimeRow, User};
pub use catalog::{Artist, Song};
pub use fact::Songplay;
pub use fields::FieldReader;

use crate::error::Result;
use arrow::datatypes::{DataType, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;

/// A relation persisted by the sink
pub trait Relation: Sized {
    /// Directory name of the relation below the output root
    const NAME: &'static str;

    /// Partition columns, outermost first
    const PARTITION_BY: &'static [&'static str];

    /// Full Arrow schema, partition columns included
    fn schema() -> SchemaRef;

    /// Convert rows into a batch with [`Relation::schema`]
    fn to_batch(rows: &[Self]) -> Result<RecordBatch>;

    /// Convert a batch (columns looked up by name) back into rows
    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>>;
}

/// Arrow type of every `start_time` column
pub fn utc_timestamp_type() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
}
