//! Fact building: songplays

use super::ids::SongplayIds;
use crate::error::{Error, Result};
use crate::model::{ActivityEvent, Song, Songplay};
use chrono::Datelike;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Songplays and the number of events the join dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactOutput {
    pub songplays: Vec<Songplay>,
    /// Events with no song title or no catalog match
    pub unmatched: usize,
}

/// Join events to songs on `song == title`
///
/// Inner join: events without a match are counted, not emitted. An event
/// whose title maps to more than one distinct `(song_id, artist_id)` fails
/// with `JoinKeyAmbiguous`.
pub fn build_songplays(events: &[ActivityEvent], songs: &[Song]) -> Result<FactOutput> {
    let mut by_title: HashMap<&str, BTreeSet<(&str, &str)>> = HashMap::new();
    for song in songs {
        by_title
            .entry(song.title.as_str())
            .or_default()
            .insert((song.song_id.as_str(), song.artist_id.as_str()));
    }

    let mut ids = SongplayIds::new();
    let mut songplays = Vec::new();
    let mut unmatched = 0;

    for event in events {
        let Some(candidates) = event.song.as_deref().and_then(|title| by_title.get(title)) else {
            unmatched += 1;
            continue;
        };

        if candidates.len() > 1 {
            return Err(Error::JoinKeyAmbiguous {
                title: event.song.clone().unwrap_or_default(),
                record: event.record.clone(),
                candidates: candidates.len(),
            });
        }
        let Some(&(song_id, artist_id)) = candidates.iter().next() else {
            unmatched += 1;
            continue;
        };

        songplays.push(Songplay {
            songplay_id: ids.next_id(event.shard),
            start_time: event.start_time,
            year: event.start_time.year(),
            month: event.start_time.month() as i32,
            user_id: event.user_id.clone(),
            level: event.level,
            song_id: Some(song_id.to_string()),
            artist_id: Some(artist_id.to_string()),
            session_id: event.session_id,
            location: event.location.clone(),
            user_agent: event.user_agent.clone(),
        });
    }

    if unmatched > 0 {
        warn!(
            unmatched,
            matched = songplays.len(),
            "Dropped events with no catalog match"
        );
    }
    debug!(songplays = songplays.len(), "Built songplays");
    Ok(FactOutput {
        songplays,
        unmatched,
    })
}
