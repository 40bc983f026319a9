//! Record source module
//!
//! Reads source records matching a path pattern below an input root.
//!
//! # Overview
//!
//! - [`PathPattern`]: glob-style pattern (`*` and `?` within one segment)
//! - [`RecordSource`]: trait for anything that yields records for a pattern
//! - [`JsonSource`]: JSON Lines files in an object store [`Location`]
//!
//! Matching files are read in lexicographic order. The position of a file in
//! that order is its shard index, and records keep their file order within a
//! shard, which together define arrival order for deduplication and ids.
//!
//! [`Location`]: crate::storage::Location

mod pattern;
mod reader;

pub use pattern::PathPattern;
pub use reader::{JsonSource, RecordSource, SourceRecord};

#[cfg(test)]
mod tests;
