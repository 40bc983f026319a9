//! Engine types
//!
//! Settings and run statistics for the pipeline.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::sink::WriteSummary;
use crate::source::PathPattern;
use crate::types::DedupPolicy;
use std::collections::BTreeMap;

/// What the pipeline reads and how it deduplicates
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Catalog files below the input root
    pub song_pattern: PathPattern,
    /// Activity log files below the input root
    pub log_pattern: PathPattern,
    /// Survivor policy for artists, users and time
    pub dedup: DedupPolicy,
}

impl PipelineSettings {
    /// Compile the patterns and policy of a config
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            song_pattern: PathPattern::parse(&config.song_pattern)?,
            log_pattern: PathPattern::parse(&config.log_pattern)?,
            dedup: config.dedup,
        })
    }

    /// Set the dedup policy
    #[must_use]
    pub fn with_dedup(mut self, dedup: DedupPolicy) -> Self {
        self.dedup = dedup;
        self
    }
}

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Catalog records read
    pub catalog_records: usize,
    /// Activity records read
    pub activity_records: usize,
    /// Activity records dropped by the page filter
    pub filtered_out: usize,
    /// Song play events with no catalog match
    pub unmatched: usize,
    /// Write summaries by relation
    pub written: BTreeMap<String, WriteSummary>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl RunStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed relation
    pub fn add_write(&mut self, summary: WriteSummary) {
        self.written.insert(summary.relation.clone(), summary);
    }

    /// Rows written for a relation (0 if it was not written)
    pub fn rows_written(&self, relation: &str) -> usize {
        self.written.get(relation).map_or(0, |s| s.rows)
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
