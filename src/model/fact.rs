//! Songplay fact rows

use super::columns::{optional_string, Columns};
use super::{utc_timestamp_type, Relation};
use crate::error::{Error, Result};
use crate::types::Level;
use arrow::array::{ArrayRef, Int32Array, Int64Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// One play of a catalog song by a listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Songplay {
    pub songplay_id: i64,
    pub start_time: DateTime<Utc>,
    pub year: i32,
    pub month: i32,
    pub user_id: String,
    pub level: Level,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl Relation for Songplay {
    const NAME: &'static str = "songplays";
    const PARTITION_BY: &'static [&'static str] = &["year", "month"];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("songplay_id", DataType::Int64, false),
            Field::new("start_time", utc_timestamp_type(), false),
            Field::new("year", DataType::Int32, false),
            Field::new("month", DataType::Int32, false),
            Field::new("user_id", DataType::Utf8, false),
            Field::new("level", DataType::Utf8, false),
            Field::new("song_id", DataType::Utf8, true),
            Field::new("artist_id", DataType::Utf8, true),
            Field::new("session_id", DataType::Int64, false),
            Field::new("location", DataType::Utf8, true),
            Field::new("user_agent", DataType::Utf8, true),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let start_time = TimestampMicrosecondArray::from_iter_values(
            rows.iter().map(|r| r.start_time.timestamp_micros()),
        )
        .with_timezone("UTC");
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.songplay_id))),
            Arc::new(start_time),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.month))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| &r.user_id))),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.level.as_str()),
            )),
            Arc::new(rows.iter().map(|r| r.song_id.as_deref()).collect::<StringArray>()),
            Arc::new(rows.iter().map(|r| r.artist_id.as_deref()).collect::<StringArray>()),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.session_id))),
            Arc::new(rows.iter().map(|r| r.location.as_deref()).collect::<StringArray>()),
            Arc::new(rows.iter().map(|r| r.user_agent.as_deref()).collect::<StringArray>()),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let cols = Columns::new(Self::NAME, batch);
        let songplay_id = cols.i64s("songplay_id")?;
        let start_time = cols.timestamps("start_time")?;
        let year = cols.i32s("year")?;
        let month = cols.i32s("month")?;
        let user_id = cols.strings("user_id")?;
        let level = cols.strings("level")?;
        let song_id = cols.strings("song_id")?;
        let artist_id = cols.strings("artist_id")?;
        let session_id = cols.i64s("session_id")?;
        let location = cols.strings("location")?;
        let user_agent = cols.strings("user_agent")?;

        (0..batch.num_rows())
            .map(|i| {
                let level = cols
                    .required_string(level, "level", i)?
                    .parse::<Level>()
                    .map_err(|e| Error::schema_mismatch(Self::NAME, "level", e))?;
                Ok(Self {
                    songplay_id: cols.required_i64(songplay_id, "songplay_id", i)?,
                    start_time: cols.required_timestamp(start_time, "start_time", i)?,
                    year: cols.required_i32(year, "year", i)?,
                    month: cols.required_i32(month, "month", i)?,
                    user_id: cols.required_string(user_id, "user_id", i)?,
                    level,
                    song_id: optional_string(song_id, i),
                    artist_id: optional_string(artist_id, i),
                    session_id: cols.required_i64(session_id, "session_id", i)?,
                    location: optional_string(location, i),
                    user_agent: optional_string(user_agent, i),
                })
            })
            .collect()
    }
}
