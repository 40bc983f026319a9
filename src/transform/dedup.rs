//! Key-based deduplication

use crate::types::DedupPolicy;
use std::collections::HashMap;
use std::hash::Hash;

/// Keep one row per key according to `policy`
///
/// Survivors are returned in order of the first appearance of their key, so
/// applying the same dedup to its own output changes nothing.
pub fn dedup_by_key<T, K, F>(rows: Vec<T>, policy: DedupPolicy, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut positions: HashMap<K, usize> = HashMap::with_capacity(rows.len());
    let mut survivors: Vec<T> = Vec::with_capacity(rows.len());

    for row in rows {
        match positions.get(&key(&row)) {
            Some(&pos) => {
                if policy == DedupPolicy::KeepLast {
                    survivors[pos] = row;
                }
            }
            None => {
                positions.insert(key(&row), survivors.len());
                survivors.push(row);
            }
        }
    }

    survivors
}
