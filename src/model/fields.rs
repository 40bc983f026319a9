//! Strict field extraction from loosely-typed source records

use crate::decode::json_type_name;
use crate::error::{Error, Result};
use crate::source::SourceRecord;
use crate::types::{JsonValue, OptionStringExt};
use std::str::FromStr;

/// Typed access to the fields of one [`SourceRecord`]
///
/// Absent and `null` fields are treated alike. Required accessors fail with
/// `SchemaMismatch` naming the record (`file:line`) and the field.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    record: &'a SourceRecord,
}

impl<'a> FieldReader<'a> {
    /// Wrap a source record
    pub fn new(record: &'a SourceRecord) -> Self {
        Self { record }
    }

    /// `file:line` of the wrapped record
    pub fn context(&self) -> String {
        self.record.context()
    }

    /// Raw value of a field, `None` when absent or null
    pub fn value(&self, name: &str) -> Option<&'a JsonValue> {
        self.record.fields.get(name).filter(|v| !v.is_null())
    }

    /// First non-null value among several spellings of a field
    fn value_of_any(&self, names: &[&'static str]) -> Option<(&'static str, &'a JsonValue)> {
        names
            .iter()
            .find_map(|name| self.value(name).map(|v| (*name, v)))
    }

    fn missing(&self, name: &str) -> Error {
        Error::schema_mismatch(self.context(), name, "required field is missing or null")
    }

    fn wrong_type(&self, name: &str, expected: &str, found: &JsonValue) -> Error {
        Error::schema_mismatch(
            self.context(),
            name,
            format!("expected {expected}, found {}", json_type_name(found)),
        )
    }

    // ========================================================================
    // Strings
    // ========================================================================

    /// Required string field
    pub fn required_str(&self, name: &str) -> Result<String> {
        match self.value(name) {
            Some(JsonValue::String(s)) => Ok(s.clone()),
            Some(other) => Err(self.wrong_type(name, "string", other)),
            None => Err(self.missing(name)),
        }
    }

    /// Optional string field, trying each spelling in turn
    pub fn optional_str(&self, names: &[&'static str]) -> Result<Option<String>> {
        match self.value_of_any(names) {
            Some((_, JsonValue::String(s))) => Ok(Some(s.clone())),
            Some((name, other)) => Err(self.wrong_type(name, "string", other)),
            None => Ok(None),
        }
    }

    /// Required identifier given either as a string or an integer
    ///
    /// Integers are normalised to their decimal form. Empty strings are rejected.
    pub fn required_id(&self, name: &str) -> Result<String> {
        let id = match self.value(name) {
            Some(JsonValue::String(s)) => s.trim().to_string(),
            Some(JsonValue::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
            Some(other) => return Err(self.wrong_type(name, "string or integer", other)),
            None => return Err(self.missing(name)),
        };
        if id.is_empty() {
            return Err(Error::schema_mismatch(
                self.context(),
                name,
                "identifier is empty",
            ));
        }
        Ok(id)
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    /// Required integer field
    pub fn required_i64(&self, name: &str) -> Result<i64> {
        match self.value(name) {
            Some(v @ JsonValue::Number(n)) => n
                .as_i64()
                .ok_or_else(|| self.wrong_type(name, "integer", v)),
            Some(other) => Err(self.wrong_type(name, "integer", other)),
            None => Err(self.missing(name)),
        }
    }

    /// Required numeric field (integers are widened)
    pub fn required_f64(&self, name: &str) -> Result<f64> {
        match self.value(name) {
            Some(v @ JsonValue::Number(n)) => n
                .as_f64()
                .ok_or_else(|| self.wrong_type(name, "number", v)),
            Some(other) => Err(self.wrong_type(name, "number", other)),
            None => Err(self.missing(name)),
        }
    }

    /// Optional numeric field, trying each spelling in turn
    pub fn optional_f64(&self, names: &[&'static str]) -> Result<Option<f64>> {
        match self.value_of_any(names) {
            Some((name, v @ JsonValue::Number(n))) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.wrong_type(name, "number", v)),
            Some((name, other)) => Err(self.wrong_type(name, "number", other)),
            None => Ok(None),
        }
    }

    // ========================================================================
    // Enumerations
    // ========================================================================

    /// Required string field parsed into an enum
    pub fn required_parsed<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr<Err = String>,
    {
        let raw = self.required_str(name)?;
        raw.parse()
            .map_err(|message: String| Error::schema_mismatch(self.context(), name, message))
    }

    /// Optional string field parsed into an enum; empty strings count as absent
    pub fn optional_parsed<T>(&self, name: &'static str) -> Result<Option<T>>
    where
        T: FromStr<Err = String>,
    {
        match self.optional_str(&[name])?.none_if_empty() {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|message: String| Error::schema_mismatch(self.context(), name, message)),
            None => Ok(None),
        }
    }
}
