//! Check-schema command implementation

use colored::*;
use tracing::info;

use super::shared::{ProcessingStats, load_schema, setup_logging};
use crate::app::services::schema::validate_schema;
use crate::cli::args::CheckSchemaArgs;
use crate::{Error, Result};

/// Validate a schema and print its normalized form as JSON
///
/// An unknown type tag is reported with the offending column and fails the
/// command.
pub fn run_check_schema(args: CheckSchemaArgs) -> Result<ProcessingStats> {
    setup_logging(args.get_log_level(), false)?;

    let raw = load_schema(&args.schema)?;
    let check = validate_schema(&raw);

    if let Some((column, tag)) = raw.first_invalid() {
        eprintln!(
            "{} column '{}' has unknown type '{}'",
            "Invalid schema:".bright_red().bold(),
            column.bright_white(),
            tag.bright_red()
        );
        return Err(Error::invalid_schema_type(column, tag));
    }

    info!("Schema has {} columns", check.schema.len());
    let normalized = serde_json::to_string_pretty(&check.schema)?;
    println!("{}", normalized);
    eprintln!(
        "{} {} columns",
        "Schema OK:".bright_green().bold(),
        check.schema.len().to_string().bright_white()
    );

    Ok(ProcessingStats::default())
}
