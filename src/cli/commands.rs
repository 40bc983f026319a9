//! CLI arguments

use clap::Parser;
use std::path::PathBuf;

/// Song play data lake ETL
///
/// Reads the song catalog and activity logs below the input root and writes
/// the songs, artists, users, time and songplays relations below the output
/// root as partitioned Parquet.
#[derive(Parser, Debug)]
#[command(name = "songlake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input root (local path or s3://, s3a://, gs://, az:// URL)
    #[arg(short, long)]
    pub input: Option<String>,

    /// Output root (local path or s3://, s3a://, gs://, az:// URL)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Configuration file (YAML)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
