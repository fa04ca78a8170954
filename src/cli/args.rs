//! Command-line argument definitions for tsdata
//!
//! This module defines the CLI interface using the clap derive API. Flags
//! override values loaded from a `--config` file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::services::text_tokenizer::Delimiter;
use crate::constants::{DEFAULT_PARALLEL_WORKERS, MAX_BATCH_SIZE, MAX_PARALLEL_WORKERS};
use crate::{Error, Result};

/// CLI arguments for the tsdata converter
///
/// Converts delimited instrument logs into validated, typed records and
/// writes them as time-series line protocol.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tsdata",
    version,
    about = "Convert delimited instrument logs into time-series line protocol",
    long_about = "Reads CSV/TSV exports and whitespace-separated instrument logs, validates every \
                  record against a typed schema (strict or lax), and writes newline-terminated \
                  line protocol with ascending timestamps."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Convert input files to line protocol
    Convert(ConvertArgs),
    /// Validate and normalize a schema file
    CheckSchema(CheckSchemaArgs),
}

/// Arguments for the convert command
#[derive(Debug, Clone, Parser)]
pub struct ConvertArgs {
    /// Input files or glob patterns
    #[arg(value_name = "INPUT", required = true, num_args = 1..)]
    pub inputs: Vec<String>,

    /// Schema as a JSON file path or inline JSON object
    ///
    /// Maps column names to one of: text, category, float, integer, boolean,
    /// time. Column order in the JSON is kept.
    #[arg(short = 's', long = "schema", value_name = "FILE|JSON")]
    pub schema: Option<String>,

    /// Measurement name written on every point
    #[arg(short = 'm', long = "measurement", value_name = "NAME")]
    pub measurement: Option<String>,

    /// JSON configuration file; flags override its values
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Field delimiter: a literal string, `tab`, or `whitespace`
    #[arg(short = 'd', long = "delimiter", value_name = "DELIM")]
    pub delimiter: Option<Delimiter>,

    /// Null out malformed values instead of failing
    #[arg(long = "lax")]
    pub lax: bool,

    /// Tokens meaning "no value" (comma-separated, replaces the default `NA`)
    #[arg(long = "missing", value_name = "LIST", value_delimiter = ',')]
    pub missing: Option<Vec<String>>,

    /// Column names (comma-separated); every line is then data
    #[arg(long = "names", value_name = "LIST", value_delimiter = ',')]
    pub names: Option<Vec<String>>,

    /// Skip records whose field count differs from the header
    #[arg(long = "drop-mismatched")]
    pub drop_mismatched: bool,

    /// First physical line to read (zero-based, inclusive)
    #[arg(long = "start", value_name = "LINE")]
    pub start: Option<usize>,

    /// Physical line to stop at (zero-based, exclusive)
    #[arg(long = "end", value_name = "LINE")]
    pub end: Option<usize>,

    /// Keep blank lines between records
    #[arg(long = "keep-blank")]
    pub keep_blank: bool,

    /// Keep blank lines at the end of the input
    #[arg(long = "keep-final-blank")]
    pub keep_final_blank: bool,

    /// Allow timestamps to go backwards
    #[arg(long = "no-order-check")]
    pub no_order_check: bool,

    /// Points per output batch
    #[arg(short = 'b', long = "batch-size", value_name = "COUNT")]
    pub batch_size: Option<usize>,

    /// Directory for `<input stem>.lp` output files
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "DIR",
        default_value = "."
    )]
    pub output_dir: PathBuf,

    /// Number of files converted concurrently
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "COUNT",
        default_value_t = DEFAULT_PARALLEL_WORKERS
    )]
    pub workers: usize,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl ConvertArgs {
    /// Validate argument combinations clap cannot express
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::configuration(
                "Number of workers must be greater than 0",
            ));
        }
        if self.workers > MAX_PARALLEL_WORKERS {
            return Err(Error::configuration(format!(
                "Number of workers cannot exceed {}",
                MAX_PARALLEL_WORKERS
            )));
        }

        if let Some(batch_size) = self.batch_size {
            if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
                return Err(Error::configuration(format!(
                    "Batch size must be between 1 and {}",
                    MAX_BATCH_SIZE
                )));
            }
        }

        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end < start {
                return Err(Error::configuration(format!(
                    "--end ({}) cannot precede --start ({})",
                    end, start
                )));
            }
        }

        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(Error::configuration(format!(
                "Output path is not a directory: {}",
                self.output_dir.display()
            )));
        }

        Ok(())
    }

    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }

    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Arguments for the check-schema command
#[derive(Debug, Clone, Parser)]
pub struct CheckSchemaArgs {
    /// Schema as a JSON file path or inline JSON object
    #[arg(value_name = "FILE|JSON")]
    pub schema: String,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

impl CheckSchemaArgs {
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, false)
    }
}

fn log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
