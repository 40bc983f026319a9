//! CLI module
//!
//! Command-line interface for running the pipeline.
//!
//! # Usage
//!
//! ```text
//! songlake --input s3a://udacity-dend/ --output s3a://my-bucket/lake/
//! songlake -C songlake.yaml --verbose
//! ```

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::Runner;
