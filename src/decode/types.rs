//! Decoder types and traits

use crate::error::Result;
use crate::types::JsonObject;

/// One decoded record and the 1-based line it was read from
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    /// Line number within the file
    pub line: usize,
    /// Top-level fields of the record
    pub fields: JsonObject,
}

/// Trait for decoding file bodies into records
pub trait RecordDecoder: Send + Sync {
    /// Decode a file body into records, in file order
    fn decode(&self, body: &str) -> Result<Vec<DecodedRecord>>;
}
