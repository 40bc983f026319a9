//! Transformation module
//!
//! The set-oriented core that turns source records into the five output
//! relations. Nothing here touches storage.
//!
//! # Overview
//!
//! - [`extract_catalog`]: catalog records to `songs` and deduplicated `artists`
//! - [`extract_activity`]: `NextSong` filter, deduplicated `users`, `start_time`
//!   derivation and the `time` dimension
//! - [`build_songplays`]: title join of events against `songs` with
//!   shard-local surrogate keys
//! - [`dedup_by_key`]: explicit survivor policy for duplicate keys

mod activity;
mod catalog;
mod dedup;
mod fact;
mod ids;

pub use activity::{extract_activity, is_next_song, ActivityTables, NEXT_SONG_PAGE};
pub use catalog::{extract_catalog, CatalogTables};
pub use dedup::dedup_by_key;
pub use fact::{build_songplays, FactOutput};
pub use ids::{songplay_id, SongplayIds, SHARD_SHIFT};
