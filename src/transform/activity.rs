//! Activity extraction: the `NextSong` filter, users and time

use super::dedup::dedup_by_key;
use crate::error::Result;
use crate::model::{ActivityEvent, TimeRow, User};
use crate::source::SourceRecord;
use crate::types::DedupPolicy;
use tracing::debug;

/// `page` value of a song play
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// Whether a raw log record is a song play
///
/// An absent or null `page` is not.
pub fn is_next_song(record: &SourceRecord) -> bool {
    record
        .fields
        .get("page")
        .and_then(|page| page.as_str())
        .is_some_and(|page| page == NEXT_SONG_PAGE)
}

/// Relations derived from the activity log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityTables {
    /// Every `NextSong` event, in arrival order
    pub events: Vec<ActivityEvent>,
    /// One row per `user_id`
    pub users: Vec<User>,
    /// One row per distinct `start_time`
    pub time: Vec<TimeRow>,
    /// Records dropped by the page filter
    pub filtered_out: usize,
}

/// Filter log records to song plays and derive `users` and `time`
///
/// Only records that pass the filter are validated.
pub fn extract_activity(records: &[SourceRecord], policy: DedupPolicy) -> Result<ActivityTables> {
    let events = records
        .iter()
        .filter(|record| is_next_song(record))
        .map(ActivityEvent::from_record)
        .collect::<Result<Vec<_>>>()?;
    let filtered_out = records.len() - events.len();

    let users = dedup_by_key(
        events.iter().map(User::from).collect(),
        policy,
        |u: &User| u.user_id.clone(),
    );

    let time = dedup_by_key(
        events
            .iter()
            .map(|e| TimeRow::from_start_time(e.start_time))
            .collect(),
        policy,
        |t: &TimeRow| t.start_time,
    );

    debug!(
        events = events.len(),
        filtered_out,
        users = users.len(),
        time = time.len(),
        "Extracted activity"
    );
    Ok(ActivityTables {
        events,
        users,
        time,
        filtered_out,
    })
}
