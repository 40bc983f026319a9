//! Songplay surrogate keys

use std::collections::HashMap;

/// Bits reserved for the row counter inside a shard
pub const SHARD_SHIFT: u32 = 33;

/// Surrogate key for the `row`-th emitted row of `shard`
///
/// Unique within a run and increasing within a shard. Not contiguous
/// across shards.
pub fn songplay_id(shard: usize, row: usize) -> i64 {
    ((shard as i64) << SHARD_SHIFT) + row as i64
}

/// Per-shard counters handing out [`songplay_id`]s
#[derive(Debug, Default)]
pub struct SongplayIds {
    next_row: HashMap<usize, usize>,
}

impl SongplayIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id for `shard`
    pub fn next_id(&mut self, shard: usize) -> i64 {
        let row = self.next_row.entry(shard).or_insert(0);
        let id = songplay_id(shard, *row);
        *row += 1;
        id
    }
}
