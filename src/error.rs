//! Error types for songlake
//!
//! This module defines the error hierarchy for the whole pipeline.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Nothing in the pipeline recovers from an error locally: every failure
//! aborts the run and travels up to the entry point, tagged with the stage
//! it came from.

use std::fmt;
use thiserror::Error;

/// Pipeline stage an error originated in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Song catalog extraction (songs, artists)
    Catalog,
    /// Activity log extraction (users, time)
    Activity,
    /// Songplay fact table construction
    Fact,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Catalog => "catalog",
            Stage::Activity => "activity",
            Stage::Fact => "fact",
        };
        f.write_str(name)
    }
}

/// Coarse classification of an error, independent of stage wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InputNotFound,
    SchemaMismatch,
    MalformedTimestamp,
    JoinKeyAmbiguous,
    SinkWriteFailure,
    Config,
    Decode,
    Storage,
    Other,
}

/// The main error type for songlake
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Pipeline Errors
    // ============================================================================
    #[error("No input records found matching '{pattern}'")]
    InputNotFound { pattern: String },

    #[error("Schema mismatch in {record}: field '{field}': {message}")]
    SchemaMismatch {
        record: String,
        field: String,
        message: String,
    },

    #[error("Malformed timestamp in {record}: {message}")]
    MalformedTimestamp { record: String, message: String },

    #[error("Ambiguous join key '{title}' for {record}: matches {candidates} catalog songs")]
    JoinKeyAmbiguous {
        title: String,
        record: String,
        candidates: usize,
    },

    #[error("Failed to write relation '{relation}': {message}")]
    SinkWriteFailure { relation: String, message: String },

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to decode input: {message}")]
    Decode { message: String },

    #[error("Partition error for relation '{relation}': {message}")]
    Partition { relation: String, message: String },

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // Storage Errors
    // ============================================================================
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an input-not-found error
    pub fn input_not_found(pattern: impl Into<String>) -> Self {
        Self::InputNotFound {
            pattern: pattern.into(),
        }
    }

    /// Create a schema mismatch error
    pub fn schema_mismatch(
        record: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SchemaMismatch {
            record: record.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a malformed timestamp error
    pub fn malformed_timestamp(record: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedTimestamp {
            record: record.into(),
            message: message.into(),
        }
    }

    /// Create a sink write failure
    pub fn sink_write(relation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWriteFailure {
            relation: relation.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a partition error
    pub fn partition(relation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Partition {
            relation: relation.into(),
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Tag this error with the stage it came from
    ///
    /// Errors that already carry a stage keep the innermost one.
    #[must_use]
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            Error::Stage { .. } => self,
            other => Error::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage the error originated in, if known
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Classify the error, looking through stage wrapping
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Stage { source, .. } => source.kind(),
            Error::InputNotFound { .. } => ErrorKind::InputNotFound,
            Error::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            Error::MalformedTimestamp { .. } => ErrorKind::MalformedTimestamp,
            Error::JoinKeyAmbiguous { .. } => ErrorKind::JoinKeyAmbiguous,
            Error::SinkWriteFailure { .. } => ErrorKind::SinkWriteFailure,
            Error::Config { .. } | Error::YamlParse(_) | Error::InvalidUrl(_) => ErrorKind::Config,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::ObjectStore(_) => ErrorKind::Storage,
            _ => ErrorKind::Other,
        }
    }
}

/// Result type alias for songlake
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for tagging errors with their stage
pub trait ResultExt<T> {
    /// Tag the error with the stage it came from
    fn stage(self, stage: Stage) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn stage(self, stage: Stage) -> Result<T> {
        self.map_err(|e| e.into().in_stage(stage))
    }
}
