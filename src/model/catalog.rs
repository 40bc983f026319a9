//! Song catalog rows

use super::columns::{optional_f64, optional_string, Columns};
use super::fields::FieldReader;
use super::Relation;
use crate::error::Result;
use crate::source::SourceRecord;
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

// ============================================================================
// Song
// ============================================================================

/// One song of the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i64,
    pub duration: f64,
}

impl Song {
    /// Project a catalog record onto the song columns
    pub fn from_record(record: &SourceRecord) -> Result<Self> {
        let fields = FieldReader::new(record);
        Ok(Self {
            song_id: fields.required_str("song_id")?,
            title: fields.required_str("title")?,
            artist_id: fields.required_str("artist_id")?,
            year: fields.required_i64("year")?,
            duration: fields.required_f64("duration")?,
        })
    }
}

impl Relation for Song {
    const NAME: &'static str = "songs";
    const PARTITION_BY: &'static [&'static str] = &["year", "artist_id"];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("song_id", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, false),
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("year", DataType::Int64, false),
            Field::new("duration", DataType::Float64, false),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| &r.song_id))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| &r.title))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| &r.artist_id))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.year))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.duration))),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let cols = Columns::new(Self::NAME, batch);
        let song_id = cols.strings("song_id")?;
        let title = cols.strings("title")?;
        let artist_id = cols.strings("artist_id")?;
        let year = cols.i64s("year")?;
        let duration = cols.f64s("duration")?;

        (0..batch.num_rows())
            .map(|i| {
                Ok(Self {
                    song_id: cols.required_string(song_id, "song_id", i)?,
                    title: cols.required_string(title, "title", i)?,
                    artist_id: cols.required_string(artist_id, "artist_id", i)?,
                    year: cols.required_i64(year, "year", i)?,
                    duration: cols.required_f64(duration, "duration", i)?,
                })
            })
            .collect()
    }
}

// ============================================================================
// Artist
// ============================================================================

/// One artist, as described by a catalog record
#[derive(Debug, Clone, PartialEq)]
pub struct Artist {
    pub artist_id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Artist {
    /// Project a catalog record onto the artist columns
    ///
    /// Catalog files prefix the descriptive fields with `artist_`; the bare
    /// names are accepted as well.
    pub fn from_record(record: &SourceRecord) -> Result<Self> {
        let fields = FieldReader::new(record);
        Ok(Self {
            artist_id: fields.required_str("artist_id")?,
            name: fields.optional_str(&["artist_name", "name"])?,
            location: fields.optional_str(&["artist_location", "location"])?,
            latitude: fields.optional_f64(&["artist_latitude", "latitude"])?,
            longitude: fields.optional_f64(&["artist_longitude", "longitude"])?,
        })
    }
}

impl Relation for Artist {
    const NAME: &'static str = "artists";
    const PARTITION_BY: &'static [&'static str] = &[];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("latitude", DataType::Float64, true),
            Field::new("longitude", DataType::Float64, true),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| &r.artist_id))),
            Arc::new(rows.iter().map(|r| r.name.as_deref()).collect::<StringArray>()),
            Arc::new(rows.iter().map(|r| r.location.as_deref()).collect::<StringArray>()),
            Arc::new(rows.iter().map(|r| r.latitude).collect::<Float64Array>()),
            Arc::new(rows.iter().map(|r| r.longitude).collect::<Float64Array>()),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let cols = Columns::new(Self::NAME, batch);
        let artist_id = cols.strings("artist_id")?;
        let name = cols.strings("name")?;
        let location = cols.strings("location")?;
        let latitude = cols.f64s("latitude")?;
        let longitude = cols.f64s("longitude")?;

        (0..batch.num_rows())
            .map(|i| {
                Ok(Self {
                    artist_id: cols.required_string(artist_id, "artist_id", i)?,
                    name: optional_string(name, i),
                    location: optional_string(location, i),
                    latitude: optional_f64(latitude, i),
                    longitude: optional_f64(longitude, i),
                })
            })
            .collect()
    }
}
