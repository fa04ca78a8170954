//! Convert command implementation
//!
//! Each input file runs through its own pipeline instance; up to `--workers`
//! files are converted concurrently.

use std::path::{Path, PathBuf};
use std::time::Instant;

use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{HumanDuration, ProgressBar};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::shared::{
    ProcessingStats, create_progress_bar, expand_inputs, load_configuration, plan_outputs,
    setup_logging,
};
use crate::app::services::pipeline::{Pipeline, PipelineStats};
use crate::app::services::sink::LineProtocolFileSink;
use crate::cli::args::ConvertArgs;
use crate::constants::CLEAN_RUN_SUCCESS_RATE;
use crate::{Error, Result};

/// Outcome of converting one input file
struct FileOutcome {
    input: PathBuf,
    output: PathBuf,
    result: Result<PipelineStats>,
}

/// Convert command runner
///
/// 1. Set up logging and layered configuration
/// 2. Resolve input files
/// 3. Convert files concurrently with progress reporting
/// 4. Print a summary
pub async fn run_convert(args: ConvertArgs, cancel: CancellationToken) -> Result<ProcessingStats> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet)?;
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = load_configuration(&args)?;
    let pipeline = Pipeline::new(config)?;

    let inputs = expand_inputs(&args.inputs)?;
    let plan = plan_outputs(inputs, &args.output_dir)?;
    info!(
        "Converting {} files into {} with {} workers",
        plan.len(),
        args.output_dir.display(),
        args.workers
    );

    let progress = args
        .show_progress()
        .then(|| create_progress_bar(plan.len() as u64, "converting"));

    let outcomes: Vec<FileOutcome> = stream::iter(plan)
        .map(|(input, output)| convert_file(&pipeline, input, output, &cancel, progress.as_ref()))
        .buffer_unordered(args.workers)
        .collect()
        .await;

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    if cancel.is_cancelled() {
        return Err(Error::processing_interrupted(
            "Conversion cancelled by user",
        ));
    }

    let mut stats = ProcessingStats::default();
    for outcome in outcomes {
        match outcome.result {
            Ok(file_stats) => {
                stats.files_processed += 1;
                stats
                    .outputs
                    .push((outcome.output, file_stats.sink.points_written));
                stats.totals.merge(&file_stats);
            }
            Err(e) => {
                stats.files_failed += 1;
                error!("{}: {}", outcome.input.display(), e);
                eprintln!(
                    "{} {}: {:#}",
                    "Failed".bright_red().bold(),
                    outcome.input.display(),
                    e
                );
            }
        }
    }
    stats.outputs.sort();
    stats.processing_time = start_time.elapsed();

    if !args.quiet {
        print_summary(&stats);
    }
    Ok(stats)
}

async fn convert_file(
    pipeline: &Pipeline,
    input: PathBuf,
    output: PathBuf,
    cancel: &CancellationToken,
    progress: Option<&ProgressBar>,
) -> FileOutcome {
    let result = run_one(pipeline, &input, &output, cancel).await;

    if let Some(pb) = progress {
        pb.inc(1);
        if let Some(name) = input.file_name() {
            pb.set_message(name.to_string_lossy().into_owned());
        }
    }

    FileOutcome {
        input,
        output,
        result,
    }
}

async fn run_one(
    pipeline: &Pipeline,
    input: &Path,
    output: &Path,
    cancel: &CancellationToken,
) -> Result<PipelineStats> {
    let mut sink = LineProtocolFileSink::create(output).await?;
    pipeline.run_file(input, &mut sink, cancel).await
}

fn print_summary(stats: &ProcessingStats) {
    let totals = &stats.totals;

    println!("\n{}", "Conversion Summary".bright_green().bold());
    println!(
        "  {} {}",
        "Time elapsed:".bright_cyan(),
        HumanDuration(stats.processing_time).to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files converted:".bright_cyan(),
        stats.files_processed.to_string().bright_white()
    );
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {}",
        "Lines read:".bright_cyan(),
        totals.lines_read.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Points written:".bright_cyan(),
        totals.sink.points_written.to_string().bright_white().bold()
    );
    if totals.records_dropped > 0 {
        println!(
            "  {} {}",
            "Records dropped:".bright_yellow(),
            totals.records_dropped.to_string().bright_yellow()
        );
    }
    if totals.validation.values_degraded > 0 {
        println!(
            "  {} {}",
            "Values nulled:".bright_yellow(),
            totals.validation.values_degraded.to_string().bright_yellow()
        );
    }

    let rate = format!("{:.1}%", totals.success_rate());
    let rate = if totals.success_rate() >= CLEAN_RUN_SUCCESS_RATE {
        rate.bright_green()
    } else {
        rate.bright_yellow()
    };
    println!("  {} {}", "Success rate:".bright_cyan(), rate);

    for (path, points) in &stats.outputs {
        println!("    {} ({} points)", path.display(), points);
    }
}
