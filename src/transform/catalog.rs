//! Catalog extraction: songs and artists

use super::dedup::dedup_by_key;
use crate::error::Result;
use crate::model::{Artist, Song};
use crate::source::SourceRecord;
use crate::types::DedupPolicy;
use tracing::debug;

/// Relations derived from the song catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogTables {
    /// One row per catalog record
    pub songs: Vec<Song>,
    /// One row per `artist_id`
    pub artists: Vec<Artist>,
}

/// Project catalog records onto `songs` and deduplicated `artists`
pub fn extract_catalog(records: &[SourceRecord], policy: DedupPolicy) -> Result<CatalogTables> {
    let songs = records
        .iter()
        .map(Song::from_record)
        .collect::<Result<Vec<_>>>()?;

    let artists = records
        .iter()
        .map(Artist::from_record)
        .collect::<Result<Vec<_>>>()?;
    let total_artists = artists.len();
    let artists = dedup_by_key(artists, policy, |a| a.artist_id.clone());

    debug!(
        songs = songs.len(),
        artists = artists.len(),
        duplicates = total_artists - artists.len(),
        "Extracted catalog"
    );
    Ok(CatalogTables { songs, artists })
}
