// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]

//! # songlake
//!
//! Song play data lake ETL: turns a song catalog feed and a user activity
//! log into five Parquet relations laid out for analytical queries.
//!
//! ## Relations
//!
//! | Relation    | Source                  | Partitioned by        |
//! |-------------|-------------------------|-----------------------|
//! | `songs`     | catalog                 | `year`, `artist_id`   |
//! | `artists`   | catalog, one per artist | -                     |
//! | `users`     | `NextSong` events       | -                     |
//! | `time`      | `NextSong` timestamps   | `year`, `month`       |
//! | `songplays` | events joined to songs  | `year`, `month`       |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use songlake::config::PipelineConfig;
//! use songlake::engine::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> songlake::Result<()> {
//!     let config = PipelineConfig::new("s3a://udacity-dend/", "/tmp/lake/");
//!     let stats = Pipeline::from_config(&config)?.run().await?;
//!     println!("{} songplays", stats.rows_written("songplays"));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────────────────────┐   ┌──────────────┐
//! │    Source    │   │             Transform             │   │     Sink     │
//! ├──────────────┤   ├───────────┬───────────┬───────────┤   ├──────────────┤
//! │ PathPattern  │──▶│ Catalog   │ Activity  │ Fact      │──▶│ Partition    │
//! │ JSONL decode │   │ songs     │ users     │ songplays │   │ Parquet      │
//! │ object_store │   │ artists   │ time      │           │   │ _SUCCESS     │
//! └──────────────┘   └───────────┴───────────┴─────▲─────┘   └──────┬───────┘
//!                                                  └── songs read back ┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Pipeline configuration
pub mod config;

/// Object storage locations
pub mod storage;

/// Record decoders (JSON Lines)
pub mod decode;

/// Input collaborator: path patterns and record sources
pub mod source;

/// Typed relations and their Arrow schemas
pub mod model;

/// Parquet encoding
pub mod output;

/// Hive-style partition layout
pub mod partition;

/// Output collaborator: relation sinks
pub mod sink;

/// Catalog, activity and fact transformations
pub mod transform;

/// Pipeline execution engine
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use engine::{Pipeline, RunStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
