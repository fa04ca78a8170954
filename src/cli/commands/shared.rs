//! Shared components for CLI commands
//!
//! Logging setup, configuration layering, input discovery and progress
//! reporting used by the command implementations.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use crate::app::services::document_validator::{
    ColumnCountPolicy, HeaderSource, MissingValues, ValidationMode,
};
use crate::app::services::pipeline::PipelineStats;
use crate::app::services::schema::RawSchema;
use crate::cli::args::ConvertArgs;
use crate::config::PipelineConfig;
use crate::constants::LINE_PROTOCOL_EXTENSION;
use crate::{Error, Result};

/// Totals reported by a command run
#[derive(Debug, Clone, Default)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub files_failed: usize,

    /// Counters summed over every successful file
    pub totals: PipelineStats,

    pub processing_time: Duration,

    /// Output files with the number of points written to each
    pub outputs: Vec<(PathBuf, usize)>,
}

impl ProcessingStats {
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }
}

/// Set up structured logging on stderr
///
/// `RUST_LOG` wins over the level derived from `-v`/`-q`.
pub fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tsdata={}", log_level)));

    let result = if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Read a schema from a JSON file, or parse it inline when it looks like JSON
pub fn load_schema(source: &str) -> Result<RawSchema> {
    read_schema(source).map_err(|e| Error::configuration(format!("{:#}", e)))
}

fn read_schema(source: &str) -> anyhow::Result<RawSchema> {
    let text = if source.trim_start().starts_with('{') {
        source.to_string()
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read schema file {}", source))?
    };

    serde_json::from_str(&text).with_context(|| format!("Invalid schema JSON in {}", source))
}

/// Layer configuration: defaults, then `--config` file, then flags
pub fn load_configuration(args: &ConvertArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config_file {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(schema) = &args.schema {
        config.schema = load_schema(schema)?;
    }
    if let Some(measurement) = &args.measurement {
        config.measurement = measurement.clone();
    }
    if let Some(delimiter) = &args.delimiter {
        config.delimiter = delimiter.clone();
    }
    if args.lax {
        config.mode = ValidationMode::Lax;
    }
    if let Some(missing) = &args.missing {
        config.missing_values = MissingValues::new(missing.iter().cloned());
    }
    if let Some(names) = &args.names {
        config.header = HeaderSource::Names(names.clone());
    }
    if args.drop_mismatched {
        config.column_count = ColumnCountPolicy::Drop;
    }
    if let Some(start) = args.start {
        config.lines.start = start;
    }
    if args.end.is_some() {
        config.lines.end = args.end;
    }
    if args.keep_blank {
        config.lines.drop_internal_blank = false;
    }
    if args.keep_final_blank {
        config.lines.drop_final_blank = false;
    }
    if args.no_order_check {
        config.check_order = false;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }

    if config.host.is_some() || config.database.is_some() {
        return Err(Error::configuration(
            "Database targets need a client library; the command line writes line protocol files",
        ));
    }

    Ok(config)
}

/// Expand input arguments into files, treating each as a glob pattern
///
/// A file named more than once, by overlapping patterns or a pattern and a
/// literal path, is kept once at its first position.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();
    let mut add = |path: PathBuf| {
        let key = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if seen.insert(key) {
            files.push(path);
        }
    };

    for pattern in patterns {
        let literal = Path::new(pattern);
        if literal.is_file() {
            add(literal.to_path_buf());
            continue;
        }

        let entries = glob::glob(pattern).map_err(|e| {
            Error::configuration(format!("Invalid input pattern '{}': {}", pattern, e))
        })?;

        let mut matched = 0;
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => {
                    matched += 1;
                    add(path);
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable path: {}", e),
            }
        }

        if matched == 0 {
            return Err(Error::configuration(format!(
                "No input files match '{}'",
                pattern
            )));
        }
    }

    debug!("Resolved {} input files", files.len());
    Ok(files)
}

/// `<output_dir>/<input stem>.lp`
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}.{}", stem, LINE_PROTOCOL_EXTENSION))
}

/// Pair every input with its output file
///
/// Inputs sharing a file stem (`a/log.csv` and `b/log.csv`, or `run.csv` and
/// `run.txt`) would write the same output file, so any clash fails the run
/// before conversion starts.
pub fn plan_outputs(inputs: Vec<PathBuf>, output_dir: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut plan = Vec::with_capacity(inputs.len());

    for input in inputs {
        let output = output_path_for(&input, output_dir);
        if let Some(first) = claimed.get(&output) {
            return Err(Error::configuration(format!(
                "Inputs {} and {} would both write {}; rename one or convert them separately",
                first.display(),
                input.display(),
                output.display()
            )));
        }
        claimed.insert(output.clone(), input.clone());
        plan.push((input, output));
    }

    Ok(plan)
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    use crate::cli::args::{Args, Commands};

    fn convert_args(argv: &[&str]) -> ConvertArgs {
        match Args::try_parse_from(argv).unwrap().command {
            Some(Commands::Convert(args)) => args,
            other => panic!("expected convert command, got {:?}", other),
        }
    }

    #[test]
    fn test_load_schema_inline_and_file() {
        let inline = load_schema(r#"{"time": "time", "v": "Float"}"#).unwrap();
        assert_eq!(inline.get("v"), Some("Float"));

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("schema.json");
        std::fs::write(&path, r#"{"b": "text", "a": "integer"}"#).unwrap();
        let from_file = load_schema(path.to_str().unwrap()).unwrap();
        let keys: Vec<&str> = from_file.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);

        let missing = load_schema("/definitely/not/here.json").unwrap_err();
        assert!(missing.to_string().contains("Failed to read schema file"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"measurement": "from_file", "schema": {"time": "time"}, "batch_size": 7}"#,
        )
        .unwrap();

        let args = convert_args(&[
            "tsdata",
            "convert",
            "x.csv",
            "-c",
            path.to_str().unwrap(),
            "-m",
            "from_flag",
            "--keep-blank",
            "--drop-mismatched",
        ]);
        let config = load_configuration(&args).unwrap();

        assert_eq!(config.measurement, "from_flag");
        assert_eq!(config.batch_size, 7);
        assert!(!config.lines.drop_internal_blank);
        assert_eq!(config.column_count, ColumnCountPolicy::Drop);
        assert_eq!(config.schema.get("time"), Some("time"));
    }

    #[test]
    fn test_database_target_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"host": "localhost", "database": "ships"}"#).unwrap();

        let args = convert_args(&["tsdata", "convert", "x.csv", "-c", path.to_str().unwrap()]);
        assert!(matches!(
            load_configuration(&args),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_expand_inputs() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["a.csv", "b.csv", "c.txt"] {
            std::fs::write(temp_dir.path().join(name), "x\n").unwrap();
        }

        let pattern = temp_dir.path().join("*.csv").to_string_lossy().into_owned();
        let files = expand_inputs(&[pattern]).unwrap();
        assert_eq!(files.len(), 2);

        let literal = temp_dir.path().join("c.txt").to_string_lossy().into_owned();
        assert_eq!(expand_inputs(&[literal]).unwrap().len(), 1);

        let nothing = temp_dir.path().join("*.tsv").to_string_lossy().into_owned();
        assert!(expand_inputs(&[nothing]).is_err());
    }

    #[test]
    fn test_expand_inputs_keeps_each_file_once() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["a.csv", "b.csv"] {
            std::fs::write(temp_dir.path().join(name), "x\n").unwrap();
        }

        let pattern = temp_dir.path().join("*.csv").to_string_lossy().into_owned();
        let literal = temp_dir.path().join("a.csv").to_string_lossy().into_owned();
        let files = expand_inputs(&[pattern.clone(), literal, pattern]).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.csv"));
        assert!(files[1].ends_with("b.csv"));
    }

    #[test]
    fn test_plan_outputs_rejects_shared_stems() {
        let out = Path::new("out");

        let nested = vec![PathBuf::from("a/log.csv"), PathBuf::from("b/log.csv")];
        match plan_outputs(nested, out) {
            Err(Error::Configuration { message }) => {
                assert!(message.contains("a/log.csv"), "{}", message);
                assert!(message.contains("b/log.csv"), "{}", message);
            }
            other => panic!("expected configuration error, got {:?}", other),
        }

        let extensions = vec![PathBuf::from("run.csv"), PathBuf::from("run.txt")];
        assert!(plan_outputs(extensions, out).is_err());

        let distinct = vec![PathBuf::from("a/log.csv"), PathBuf::from("a/ctd.csv")];
        let plan = plan_outputs(distinct, out).unwrap();
        assert_eq!(plan[0].1, PathBuf::from("out/log.lp"));
        assert_eq!(plan[1].1, PathBuf::from("out/ctd.lp"));
    }

    #[test]
    fn test_output_path_for() {
        assert_eq!(
            output_path_for(Path::new("/data/run 1.csv"), Path::new("out")),
            PathBuf::from("out/run 1.lp")
        );
    }
}
