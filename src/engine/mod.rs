//! Execution engine module
//!
//! Sequences the pipeline stages against a source and a sink.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Pipeline` - runs catalog, activity and fact stages in order
//! - `PipelineSettings` - compiled path patterns and dedup policy
//! - `RunStats` - per-run counters and write summaries
//!
//! Every write is awaited before the next stage starts, and the fact stage
//! reads `songs` back from the sink rather than reusing the in-memory rows.
//! Errors are tagged with the stage they came from.

mod types;

pub use types::{PipelineSettings, RunStats};

use crate::config::PipelineConfig;
use crate::error::{Result, ResultExt, Stage};
use crate::model::{Song, Songplay, TimeRow, User};
use crate::sink::{read_relation, write_relation, ParquetSink, RelationSink};
use crate::source::{JsonSource, RecordSource};
use crate::storage::Location;
use crate::transform::{build_songplays, extract_activity, extract_catalog};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// The song play ETL pipeline
pub struct Pipeline {
    /// Input collaborator
    source: Arc<dyn RecordSource>,
    /// Output collaborator
    sink: Arc<dyn RelationSink>,
    /// Patterns and dedup policy
    settings: PipelineSettings,
}

impl Pipeline {
    /// Create a pipeline over an explicit source and sink
    pub fn new(
        source: Arc<dyn RecordSource>,
        sink: Arc<dyn RelationSink>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            sink,
            settings,
        }
    }

    /// Open the configured input and output locations
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let settings = PipelineSettings::from_config(config)?;

        let input = Location::open_input(config.input()?, &config.credentials)?;
        let output = Location::open_output(config.output()?, &config.credentials)?;
        info!(input = %input.url(), output = %output.url(), "Opened locations");

        let sink = ParquetSink::new(output, &config.sink);
        info!(run_id = %sink.run_id(), "Starting run");

        Ok(Self::new(
            Arc::new(JsonSource::new(input)),
            Arc::new(sink),
            settings,
        ))
    }

    /// Run every stage, stopping at the first failure
    pub async fn run(&self) -> Result<RunStats> {
        let start = Instant::now();
        let mut stats = RunStats::new();

        self.process_song_data(&mut stats).await?;
        self.process_log_data(&mut stats).await?;

        stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            duration_ms = stats.duration_ms,
            relations = stats.written.len(),
            unmatched = stats.unmatched,
            "Pipeline completed"
        );
        Ok(stats)
    }

    /// Catalog stage: write `songs` and `artists`
    pub async fn process_song_data(&self, stats: &mut RunStats) -> Result<()> {
        let start = Instant::now();
        info!(pattern = %self.settings.song_pattern, "Catalog stage started");

        let records = self
            .source
            .read(&self.settings.song_pattern)
            .await
            .stage(Stage::Catalog)?;
        stats.catalog_records = records.len();

        let tables = extract_catalog(&records, self.settings.dedup).stage(Stage::Catalog)?;

        let summary = write_relation(self.sink.as_ref(), &tables.songs)
            .await
            .stage(Stage::Catalog)?;
        stats.add_write(summary);
        let summary = write_relation(self.sink.as_ref(), &tables.artists)
            .await
            .stage(Stage::Catalog)?;
        stats.add_write(summary);

        info!(
            records = records.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Catalog stage finished"
        );
        Ok(())
    }

    /// Activity and fact stages: write `users`, `time` and `songplays`
    ///
    /// Requires a committed `songs` relation in the sink.
    pub async fn process_log_data(&self, stats: &mut RunStats) -> Result<()> {
        let start = Instant::now();
        info!(pattern = %self.settings.log_pattern, "Activity stage started");

        let records = self
            .source
            .read(&self.settings.log_pattern)
            .await
            .stage(Stage::Activity)?;
        stats.activity_records = records.len();

        let tables = extract_activity(&records, self.settings.dedup).stage(Stage::Activity)?;
        stats.filtered_out = tables.filtered_out;

        let summary = write_relation::<User>(self.sink.as_ref(), &tables.users)
            .await
            .stage(Stage::Activity)?;
        stats.add_write(summary);
        let summary = write_relation::<TimeRow>(self.sink.as_ref(), &tables.time)
            .await
            .stage(Stage::Activity)?;
        stats.add_write(summary);

        info!(
            records = records.len(),
            events = tables.events.len(),
            filtered_out = tables.filtered_out,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Activity stage finished"
        );

        let start = Instant::now();
        info!("Fact stage started");

        let songs: Vec<Song> = read_relation(self.sink.as_ref())
            .await
            .stage(Stage::Fact)?;
        let fact = build_songplays(&tables.events, &songs).stage(Stage::Fact)?;
        stats.unmatched = fact.unmatched;

        let summary = write_relation::<Songplay>(self.sink.as_ref(), &fact.songplays)
            .await
            .stage(Stage::Fact)?;
        stats.add_write(summary);

        info!(
            songs = songs.len(),
            songplays = fact.songplays.len(),
            unmatched = fact.unmatched,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fact stage finished"
        );
        Ok(())
    }
}
