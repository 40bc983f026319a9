//! Record decoder module
//!
//! Supports: JSON Lines
//!
//! # Overview
//!
//! Turns the body of one input file into JSON objects, each tagged with the
//! line it came from so later stages can point at the offending record.

mod jsonl;
mod types;

pub(crate) use jsonl::json_type_name;
pub use jsonl::JsonlDecoder;
pub use types::{DecodedRecord, RecordDecoder};

#[cfg(test)]
mod tests;
