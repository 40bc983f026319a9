//! Pipeline configuration
//!
//! Configuration is read from an optional YAML file and then overridden by
//! command-line flags. Storage credentials live in an explicit
//! [`StorageCredentials`] value that is handed to the storage layer; they
//! are never exported into the process environment.

use crate::error::{Error, Result};
use crate::output::ParquetCompression;
use crate::types::DedupPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default pattern for song-catalog files, relative to the input root
pub const DEFAULT_SONG_PATTERN: &str = "song_data/*/*/*/*.json";

/// Default pattern for activity-log files, relative to the input root
pub const DEFAULT_LOG_PATTERN: &str = "log_data/*/*/*.json";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root location of the raw JSON input
    pub input: Option<String>,

    /// Root location the relations are written under
    pub output: Option<String>,

    /// Glob pattern for song-catalog files
    pub song_pattern: String,

    /// Glob pattern for activity-log files
    pub log_pattern: String,

    /// Survivor policy for artist and user de-duplication
    pub dedup: DedupPolicy,

    /// Object storage credentials
    pub credentials: StorageCredentials,

    /// Output file settings
    pub sink: SinkSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            song_pattern: DEFAULT_SONG_PATTERN.to_string(),
            log_pattern: DEFAULT_LOG_PATTERN.to_string(),
            dedup: DedupPolicy::default(),
            credentials: StorageCredentials::default(),
            sink: SinkSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a config for the given input and output locations
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: Some(input.into()),
            output: Some(output.into()),
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Override the input location
    #[must_use]
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Override the output location
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Set the dedup policy
    #[must_use]
    pub fn with_dedup(mut self, dedup: DedupPolicy) -> Self {
        self.dedup = dedup;
        self
    }

    /// Input root, required
    pub fn input(&self) -> Result<&str> {
        self.input
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::config("input location is not set (use --input)"))
    }

    /// Output root, required
    pub fn output(&self) -> Result<&str> {
        self.output
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::config("output location is not set (use --output)"))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.input()?;
        self.output()?;

        if self.song_pattern.trim().is_empty() {
            return Err(Error::config("song_pattern must not be empty"));
        }
        if self.log_pattern.trim().is_empty() {
            return Err(Error::config("log_pattern must not be empty"));
        }

        self.credentials.validate()?;
        self.sink.validate()
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Credentials for S3-compatible object storage
///
/// When no key pair is given the storage builder falls back to its own
/// default credential chain (environment, instance profile).
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageCredentials {
    /// Access key id
    pub access_key_id: Option<String>,

    /// Secret access key
    pub secret_access_key: Option<String>,

    /// Optional session token for temporary credentials
    pub session_token: Option<String>,

    /// Region of the bucket
    pub region: Option<String>,

    /// Custom endpoint (S3-compatible stores)
    pub endpoint: Option<String>,
}

impl StorageCredentials {
    /// Create credentials from a key pair
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: Some(access_key_id.into()),
            secret_access_key: Some(secret_access_key.into()),
            ..Self::default()
        }
    }

    /// Set the region
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Whether an explicit key pair is present
    pub fn has_key_pair(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }

    fn validate(&self) -> Result<()> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(_), None) => Err(Error::config(
                "credentials.access_key_id is set without credentials.secret_access_key",
            )),
            (None, Some(_)) => Err(Error::config(
                "credentials.secret_access_key is set without credentials.access_key_id",
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

// ============================================================================
// Sink Settings
// ============================================================================

/// Output file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkSettings {
    /// Parquet compression codec
    pub compression: ParquetCompression,

    /// Maximum rows per Parquet row group
    pub row_group_size: usize,

    /// Split a partition into several files above this many rows
    pub max_rows_per_file: Option<usize>,
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self {
            compression: ParquetCompression::default(),
            row_group_size: 1024 * 1024,
            max_rows_per_file: None,
        }
    }
}

impl SinkSettings {
    fn validate(&self) -> Result<()> {
        if self.row_group_size == 0 {
            return Err(Error::config("sink.row_group_size must be greater than 0"));
        }
        if self.max_rows_per_file == Some(0) {
            return Err(Error::config(
                "sink.max_rows_per_file must be greater than 0",
            ));
        }
        Ok(())
    }
}
