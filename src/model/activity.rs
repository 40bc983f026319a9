//! Activity log rows and the dimensions derived from them

use super::columns::{optional_string, Columns};
use super::fields::FieldReader;
use super::{utc_timestamp_type, Relation};
use crate::error::{Error, Result};
use crate::source::SourceRecord;
use crate::types::{Gender, JsonValue, Level};
use arrow::array::{ArrayRef, Int32Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::sync::Arc;

// ============================================================================
// Timestamp Derivation
// ============================================================================

/// Convert an epoch-milliseconds `ts` value into a UTC instant
///
/// Integers are exact. Floats are scaled to microseconds and rounded.
/// Missing, non-numeric, negative, non-finite and out-of-range values are
/// `MalformedTimestamp`.
pub fn start_time_from_ts(ts: Option<&JsonValue>, record: &str) -> Result<DateTime<Utc>> {
    let micros = match ts {
        None | Some(JsonValue::Null) => {
            return Err(Error::malformed_timestamp(record, "ts is missing"))
        }
        Some(JsonValue::Number(n)) => {
            if let Some(millis) = n.as_i64() {
                if millis < 0 {
                    return Err(Error::malformed_timestamp(
                        record,
                        format!("ts {millis} is negative"),
                    ));
                }
                millis.checked_mul(1000).ok_or_else(|| {
                    Error::malformed_timestamp(record, format!("ts {millis} is out of range"))
                })?
            } else {
                let millis = n.as_f64().unwrap_or(f64::NAN);
                if !millis.is_finite() || millis < 0.0 {
                    return Err(Error::malformed_timestamp(
                        record,
                        format!("ts {n} is negative or not finite"),
                    ));
                }
                let scaled = (millis * 1000.0).round();
                if scaled >= i64::MAX as f64 {
                    return Err(Error::malformed_timestamp(
                        record,
                        format!("ts {n} is out of range"),
                    ));
                }
                scaled as i64
            }
        }
        Some(other) => {
            return Err(Error::malformed_timestamp(
                record,
                format!("ts must be numeric, found {other}"),
            ))
        }
    };

    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| Error::malformed_timestamp(record, format!("ts {micros}us is out of range")))
}

// ============================================================================
// Activity Event
// ============================================================================

/// A `NextSong` event from the activity log
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEvent {
    /// Input file index the event came from
    pub shard: usize,
    /// `file:line` of the source record
    pub record: String,
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub level: Level,
    pub song: Option<String>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
    pub start_time: DateTime<Utc>,
}

impl ActivityEvent {
    /// Build an event from a log record that already passed the page filter
    pub fn from_record(record: &SourceRecord) -> Result<Self> {
        let fields = FieldReader::new(record);
        let context = fields.context();
        Ok(Self {
            shard: record.shard,
            user_id: fields.required_id("userId")?,
            first_name: fields.optional_str(&["firstName"])?,
            last_name: fields.optional_str(&["lastName"])?,
            gender: fields.optional_parsed("gender")?,
            level: fields.required_parsed("level")?,
            song: fields.optional_str(&["song"])?,
            session_id: fields.required_i64("sessionId")?,
            location: fields.optional_str(&["location"])?,
            user_agent: fields.optional_str(&["userAgent"])?,
            start_time: start_time_from_ts(fields.value("ts"), &context)?,
            record: context,
        })
    }
}

// ============================================================================
// User
// ============================================================================

/// A listener, as seen on one of their events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub level: Level,
}

impl From<&ActivityEvent> for User {
    fn from(event: &ActivityEvent) -> Self {
        Self {
            user_id: event.user_id.clone(),
            first_name: event.first_name.clone(),
            last_name: event.last_name.clone(),
            gender: event.gender,
            level: event.level,
        }
    }
}

impl Relation for User {
    const NAME: &'static str = "users";
    const PARTITION_BY: &'static [&'static str] = &[];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("user_id", DataType::Utf8, false),
            Field::new("first_name", DataType::Utf8, true),
            Field::new("last_name", DataType::Utf8, true),
            Field::new("gender", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, false),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| &r.user_id))),
            Arc::new(rows.iter().map(|r| r.first_name.as_deref()).collect::<StringArray>()),
            Arc::new(rows.iter().map(|r| r.last_name.as_deref()).collect::<StringArray>()),
            Arc::new(
                rows.iter()
                    .map(|r| r.gender.map(Gender::as_str))
                    .collect::<StringArray>(),
            ),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.level.as_str()),
            )),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let cols = Columns::new(Self::NAME, batch);
        let user_id = cols.strings("user_id")?;
        let first_name = cols.strings("first_name")?;
        let last_name = cols.strings("last_name")?;
        let gender = cols.strings("gender")?;
        let level = cols.strings("level")?;

        (0..batch.num_rows())
            .map(|i| {
                let gender = optional_string(gender, i)
                    .map(|g| g.parse::<Gender>())
                    .transpose()
                    .map_err(|e| Error::schema_mismatch(Self::NAME, "gender", e))?;
                let level = cols
                    .required_string(level, "level", i)?
                    .parse::<Level>()
                    .map_err(|e| Error::schema_mismatch(Self::NAME, "level", e))?;
                Ok(Self {
                    user_id: cols.required_string(user_id, "user_id", i)?,
                    first_name: optional_string(first_name, i),
                    last_name: optional_string(last_name, i),
                    gender,
                    level,
                })
            })
            .collect()
    }
}

// ============================================================================
// Time
// ============================================================================

/// Calendar breakdown of one distinct `start_time`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRow {
    pub start_time: DateTime<Utc>,
    pub hour: i32,
    pub day: i32,
    /// ISO 8601 week number
    pub week: i32,
    pub month: i32,
    pub year: i32,
    /// Abbreviated English day name (`Mon` .. `Sun`)
    pub weekday: String,
}

impl TimeRow {
    /// Derive every calendar column from a UTC instant
    pub fn from_start_time(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            hour: start_time.hour() as i32,
            day: start_time.day() as i32,
            week: start_time.iso_week().week() as i32,
            month: start_time.month() as i32,
            year: start_time.year(),
            weekday: start_time.format("%a").to_string(),
        }
    }
}

impl Relation for TimeRow {
    const NAME: &'static str = "time";
    const PARTITION_BY: &'static [&'static str] = &["year", "month"];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("start_time", utc_timestamp_type(), false),
            Field::new("hour", DataType::Int32, false),
            Field::new("day", DataType::Int32, false),
            Field::new("week", DataType::Int32, false),
            Field::new("month", DataType::Int32, false),
            Field::new("year", DataType::Int32, false),
            Field::new("weekday", DataType::Utf8, false),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let start_time = TimestampMicrosecondArray::from_iter_values(
            rows.iter().map(|r| r.start_time.timestamp_micros()),
        )
        .with_timezone("UTC");
        let columns: Vec<ArrayRef> = vec![
            Arc::new(start_time),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.hour))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.day))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.week))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.month))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| &r.weekday))),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let cols = Columns::new(Self::NAME, batch);
        let start_time = cols.timestamps("start_time")?;
        let hour = cols.i32s("hour")?;
        let day = cols.i32s("day")?;
        let week = cols.i32s("week")?;
        let month = cols.i32s("month")?;
        let year = cols.i32s("year")?;
        let weekday = cols.strings("weekday")?;

        (0..batch.num_rows())
            .map(|i| {
                Ok(Self {
                    start_time: cols.required_timestamp(start_time, "start_time", i)?,
                    hour: cols.required_i32(hour, "hour", i)?,
                    day: cols.required_i32(day, "day", i)?,
                    week: cols.required_i32(week, "week", i)?,
                    month: cols.required_i32(month, "month", i)?,
                    year: cols.required_i32(year, "year", i)?,
                    weekday: cols.required_string(weekday, "weekday", i)?,
                })
            })
            .collect()
    }
}
