//! CLI runner - loads configuration and runs the pipeline

use crate::cli::commands::Cli;
use crate::config::PipelineConfig;
use crate::engine::{Pipeline, RunStats};
use crate::error::Result;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Merge the config file (if any) with command-line overrides
    pub fn config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.cli.config {
            Some(path) => {
                debug!(path = %path.display(), "Loading config file");
                PipelineConfig::from_file(path)?
            }
            None => PipelineConfig::default(),
        };

        if let Some(input) = &self.cli.input {
            config = config.with_input(input);
        }
        if let Some(output) = &self.cli.output {
            config = config.with_output(output);
        }

        config.validate()?;
        Ok(config)
    }

    /// Run the pipeline end to end
    pub async fn run(&self) -> Result<RunStats> {
        let config = self.config()?;
        let pipeline = Pipeline::from_config(&config)?;
        let stats = pipeline.run().await?;

        for summary in stats.written.values() {
            info!(
                relation = %summary.relation,
                rows = summary.rows,
                files = summary.files,
                partitions = summary.partitions,
                "Relation written"
            );
        }
        info!(
            catalog_records = stats.catalog_records,
            activity_records = stats.activity_records,
            filtered_out = stats.filtered_out,
            unmatched = stats.unmatched,
            duration_ms = stats.duration_ms,
            "Run summary"
        );
        Ok(stats)
    }
}
