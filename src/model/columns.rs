//! Arrow column access for turning batches back into rows

use crate::error::{Error, Result};
use arrow::array::{
    Array, Float64Array, Int32Array, Int64Array, StringArray, TimestampMicrosecondArray,
};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};

/// Typed column lookup by name within one relation's batch
pub(crate) struct Columns<'a> {
    relation: &'static str,
    batch: &'a RecordBatch,
}

impl<'a> Columns<'a> {
    pub(crate) fn new(relation: &'static str, batch: &'a RecordBatch) -> Self {
        Self { relation, batch }
    }

    fn get<T: Array + 'static>(&self, name: &str, expected: &str) -> Result<&'a T> {
        let column = self.batch.column_by_name(name).ok_or_else(|| {
            Error::schema_mismatch(self.relation, name, "column is missing from batch")
        })?;
        column.as_any().downcast_ref::<T>().ok_or_else(|| {
            Error::schema_mismatch(
                self.relation,
                name,
                format!("expected {expected} column, found {}", column.data_type()),
            )
        })
    }

    pub(crate) fn strings(&self, name: &str) -> Result<&'a StringArray> {
        self.get(name, "Utf8")
    }

    pub(crate) fn i32s(&self, name: &str) -> Result<&'a Int32Array> {
        self.get(name, "Int32")
    }

    pub(crate) fn i64s(&self, name: &str) -> Result<&'a Int64Array> {
        self.get(name, "Int64")
    }

    pub(crate) fn f64s(&self, name: &str) -> Result<&'a Float64Array> {
        self.get(name, "Float64")
    }

    pub(crate) fn timestamps(&self, name: &str) -> Result<&'a TimestampMicrosecondArray> {
        self.get(name, "Timestamp(Microsecond)")
    }

    fn null_in(&self, name: &str, row: usize) -> Error {
        Error::schema_mismatch(
            self.relation,
            name,
            format!("unexpected null at row {row}"),
        )
    }

    pub(crate) fn required_string(
        &self,
        array: &StringArray,
        name: &str,
        row: usize,
    ) -> Result<String> {
        optional_string(array, row).ok_or_else(|| self.null_in(name, row))
    }

    pub(crate) fn required_i32(&self, array: &Int32Array, name: &str, row: usize) -> Result<i32> {
        if array.is_null(row) {
            return Err(self.null_in(name, row));
        }
        Ok(array.value(row))
    }

    pub(crate) fn required_i64(&self, array: &Int64Array, name: &str, row: usize) -> Result<i64> {
        if array.is_null(row) {
            return Err(self.null_in(name, row));
        }
        Ok(array.value(row))
    }

    pub(crate) fn required_f64(
        &self,
        array: &Float64Array,
        name: &str,
        row: usize,
    ) -> Result<f64> {
        if array.is_null(row) {
            return Err(self.null_in(name, row));
        }
        Ok(array.value(row))
    }

    pub(crate) fn required_timestamp(
        &self,
        array: &TimestampMicrosecondArray,
        name: &str,
        row: usize,
    ) -> Result<DateTime<Utc>> {
        if array.is_null(row) {
            return Err(self.null_in(name, row));
        }
        let micros = array.value(row);
        DateTime::from_timestamp_micros(micros).ok_or_else(|| {
            Error::schema_mismatch(
                self.relation,
                name,
                format!("timestamp {micros}us is out of range"),
            )
        })
    }
}

pub(crate) fn optional_string(array: &StringArray, row: usize) -> Option<String> {
    (!array.is_null(row)).then(|| array.value(row).to_string())
}

pub(crate) fn optional_f64(array: &Float64Array, row: usize) -> Option<f64> {
    (!array.is_null(row)).then(|| array.value(row))
}
