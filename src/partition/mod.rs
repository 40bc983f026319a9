//! Partition layout module
//!
//! Hive-style `column=value` directory layout for partitioned relations.
//!
//! # Overview
//!
//! - [`PartitionSpec`]: the ordered partition columns of one relation
//! - Splitting a batch into one batch per distinct partition value tuple,
//!   with the partition columns removed from the data
//! - Parsing the partition values back out of a file path and restoring
//!   them as typed columns
//! - [`escape_value`] / [`unescape_value`]: path-safe partition values, with
//!   nulls written as [`DEFAULT_PARTITION_NAME`]

mod escape;
mod types;

pub use escape::{escape_value, unescape_value, DEFAULT_PARTITION_NAME};
pub use types::{PartitionSpec, PartitionedBatch};
