//! Command implementations for the tsdata CLI
//!
//! Each command lives in its own module:
//! - `convert`: input files to line protocol files
//! - `check_schema`: schema validation and normalization

pub mod check_schema;
pub mod convert;
pub mod shared;

pub use shared::ProcessingStats;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Args, Commands};
use crate::{Error, Result};

/// Dispatch to the selected subcommand
pub async fn run(args: Args, cancel: CancellationToken) -> Result<ProcessingStats> {
    match args.command {
        Some(Commands::Convert(convert_args)) => convert::run_convert(convert_args, cancel).await,
        Some(Commands::CheckSchema(check_args)) => check_schema::run_check_schema(check_args),
        None => Err(Error::configuration("No command given")),
    }
}
