//! JSON Lines decoder

use super::types::{DecodedRecord, RecordDecoder};
use crate::error::{Error, Result};
use serde_json::Value;

/// JSON Lines decoder (one JSON object per line)
///
/// Blank lines are skipped. Anything else that is not a JSON object fails
/// the whole file with a `Decode` error naming the line.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonlDecoder;

impl JsonlDecoder {
    /// Create a new JSONL decoder
    pub fn new() -> Self {
        Self
    }
}

impl RecordDecoder for JsonlDecoder {
    fn decode(&self, body: &str) -> Result<Vec<DecodedRecord>> {
        let mut records = Vec::new();

        for (index, line) in body.lines().enumerate() {
            let line_num = index + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let value: Value = serde_json::from_str(line).map_err(|e| {
                Error::decode(format!("Failed to parse JSONL at line {line_num}: {e}"))
            })?;

            match value {
                Value::Object(fields) => records.push(DecodedRecord {
                    line: line_num,
                    fields,
                }),
                other => {
                    return Err(Error::decode(format!(
                        "Expected a JSON object at line {line_num}, found {}",
                        json_type_name(&other)
                    )))
                }
            }
        }

        Ok(records)
    }
}

/// Name of a JSON value's type, for error messages
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
