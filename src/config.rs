//! Configuration management and validation.
//!
//! [`PipelineConfig`] carries everything one conversion needs: the schema and
//! measurement, tokenizing and validation policy, batching, and the sink
//! target. It loads from JSON with key order preserved, so the schema keeps
//! the column order written in the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::services::document_validator::{
    ColumnCountPolicy, HeaderSource, MissingValues, ValidationMode,
};
use crate::app::services::line_protocol::validate_measurement;
use crate::app::services::schema::{RawSchema, Schema};
use crate::app::services::sink::Downsample;
use crate::app::services::text_tokenizer::{Delimiter, LineOptions};
use crate::constants::{DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE};
use crate::{Error, Result};

/// Where encoded points go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    /// Line protocol text file
    File(PathBuf),

    /// Time-series database reached through a client
    Database {
        host: String,
        database: String,
        downsample: Option<Downsample>,
    },
}

/// Configuration for one conversion pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Measurement name written on every point
    pub measurement: String,

    /// Column name -> type tag, in column order
    pub schema: RawSchema,

    /// Strict rejects malformed values; lax nulls them
    pub mode: ValidationMode,

    /// Tokens read as "no value"
    pub missing_values: MissingValues,

    pub delimiter: Delimiter,

    pub header: HeaderSource,

    /// Policy for records whose field count differs from the header
    pub column_count: ColumnCountPolicy,

    /// Line window and blank-line policy
    pub lines: LineOptions,

    /// Fail on timestamps that go backwards
    pub check_order: bool,

    /// Points per sink batch
    pub batch_size: usize,

    /// Line protocol output file
    pub output_file: Option<PathBuf>,

    /// Database host; requires `database`
    pub host: Option<String>,

    pub database: Option<String>,

    /// Aggregation after each database batch write
    pub downsample: Option<Downsample>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            measurement: String::new(),
            schema: RawSchema::new(),
            mode: ValidationMode::Strict,
            missing_values: MissingValues::default(),
            delimiter: Delimiter::comma(),
            header: HeaderSource::First,
            column_count: ColumnCountPolicy::Reject,
            lines: LineOptions::default(),
            check_order: true,
            batch_size: DEFAULT_BATCH_SIZE,
            output_file: None,
            host: None,
            database: None,
            downsample: None,
        }
    }
}

impl PipelineConfig {
    pub fn new(measurement: impl Into<String>, schema: RawSchema) -> Self {
        Self {
            measurement: measurement.into(),
            schema,
            ..Self::default()
        }
    }

    /// Load a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read config {}", path.display()), e))?;
        let config: Self = serde_json::from_str(&text).map_err(|e| Error::Serialization {
            message: format!("Invalid config file {}", path.display()),
            source: e,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn with_measurement(mut self, measurement: impl Into<String>) -> Self {
        self.measurement = measurement.into();
        self
    }

    pub fn with_schema(mut self, schema: RawSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_missing_values(mut self, missing_values: MissingValues) -> Self {
        self.missing_values = missing_values;
        self
    }

    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_header(mut self, header: HeaderSource) -> Self {
        self.header = header;
        self
    }

    pub fn with_column_count(mut self, policy: ColumnCountPolicy) -> Self {
        self.column_count = policy;
        self
    }

    pub fn with_lines(mut self, lines: LineOptions) -> Self {
        self.lines = lines;
        self
    }

    pub fn with_check_order(mut self, check_order: bool) -> Self {
        self.check_order = check_order;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Target a line protocol file, clearing any database target
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self.host = None;
        self.database = None;
        self
    }

    /// Target a database, clearing any file target
    pub fn with_database(mut self, host: impl Into<String>, database: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self.database = Some(database.into());
        self.output_file = None;
        self
    }

    pub fn with_downsample(mut self, downsample: Option<Downsample>) -> Self {
        self.downsample = downsample;
        self
    }

    /// Resolve the typed schema, failing on the first unknown type tag
    pub fn typed_schema(&self) -> Result<Schema> {
        Schema::from_raw(&self.schema)
    }

    /// Validate everything that can be checked before reading input
    ///
    /// The sink target is checked separately by [`sink_target`](Self::sink_target)
    /// because command-line runs fill it in per input file.
    pub fn validate(&self) -> Result<()> {
        validate_measurement(&self.measurement)?;

        let schema = self.typed_schema()?;
        if schema.is_empty() {
            return Err(Error::configuration("Schema must define at least one column"));
        }
        if schema.time_columns().next().is_none() {
            return Err(Error::configuration(
                "Schema must define a time column for point timestamps",
            ));
        }

        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(Error::configuration(format!(
                "Batch size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, self.batch_size
            )));
        }

        // [n, n) is a valid empty window
        if let Some(end) = self.lines.end {
            if end < self.lines.start {
                return Err(Error::configuration(format!(
                    "Line window end ({}) cannot precede start ({})",
                    end, self.lines.start
                )));
            }
        }

        if let HeaderSource::Names(names) = &self.header {
            if names.is_empty() {
                return Err(Error::configuration("Explicit header names cannot be empty"));
            }
        }

        if let Some(downsample) = &self.downsample {
            downsample.validate()?;
        }

        Ok(())
    }

    /// Exactly one of an output file or a host and database pair
    pub fn sink_target(&self) -> Result<SinkTarget> {
        match (&self.output_file, &self.host, &self.database) {
            (Some(path), None, None) => {
                if self.downsample.is_some() {
                    return Err(Error::configuration(
                        "Downsampling requires a database target",
                    ));
                }
                Ok(SinkTarget::File(path.clone()))
            }
            (None, Some(host), Some(database)) => Ok(SinkTarget::Database {
                host: host.clone(),
                database: database.clone(),
                downsample: self.downsample.clone(),
            }),
            (None, None, None) => Err(Error::configuration(
                "No sink target: set an output file or a host and database",
            )),
            (Some(_), _, _) => Err(Error::configuration(
                "Output file and database target are mutually exclusive",
            )),
            (None, _, _) => Err(Error::configuration(
                "Database target needs both host and database",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::FieldType;
    use tempfile::TempDir;

    fn ship_schema() -> RawSchema {
        [("time", "time"), ("ship", "category"), ("speed", "float")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert!(config.check_order);
        assert_eq!(config.mode, ValidationMode::Strict);
        assert_eq!(config.delimiter, Delimiter::comma());
        assert!(config.lines.drop_internal_blank);
        assert!(config.lines.drop_final_blank);
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        let config = PipelineConfig::new("ship_log", ship_schema());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_inputs() {
        let bad_measurement = PipelineConfig::new("ship log", ship_schema());
        assert!(matches!(
            bad_measurement.validate(),
            Err(Error::InvalidMeasurement { .. })
        ));

        let mut bad_schema = ship_schema();
        bad_schema.insert("depth", "decimal");
        let config = PipelineConfig::new("ship_log", bad_schema);
        match config.validate() {
            Err(Error::InvalidSchemaType { column, value }) => {
                assert_eq!(column, "depth");
                assert_eq!(value, "decimal");
            }
            other => panic!("expected invalid schema type, got {:?}", other),
        }

        let no_time: RawSchema = [("ship", "category")].into_iter().collect();
        assert!(PipelineConfig::new("ship_log", no_time).validate().is_err());

        let zero_batch = PipelineConfig::new("ship_log", ship_schema()).with_batch_size(0);
        assert!(zero_batch.validate().is_err());

        let window = PipelineConfig::new("ship_log", ship_schema())
            .with_lines(LineOptions::default().with_window(5, Some(4)));
        assert!(window.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_empty_line_window() {
        let config = PipelineConfig::new("ship_log", ship_schema())
            .with_lines(LineOptions::default().with_window(5, Some(5)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sink_target_exclusivity() {
        let base = PipelineConfig::new("ship_log", ship_schema());
        assert!(base.sink_target().is_err());

        let file = base.clone().with_output_file("out.lp");
        assert_eq!(
            file.sink_target().unwrap(),
            SinkTarget::File(PathBuf::from("out.lp"))
        );

        let db = base.clone().with_database("localhost", "ships");
        assert!(matches!(
            db.sink_target().unwrap(),
            SinkTarget::Database { .. }
        ));

        let mut both = file.clone();
        both.host = Some("localhost".to_string());
        both.database = Some("ships".to_string());
        assert!(both.sink_target().is_err());

        let mut host_only = base.clone();
        host_only.host = Some("localhost".to_string());
        assert!(host_only.sink_target().is_err());

        let downsampled_file = file.with_downsample(Some(Downsample::new("1m", "agg").unwrap()));
        assert!(downsampled_file.sink_target().is_err());
    }

    #[test]
    fn test_from_file_preserves_schema_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "measurement": "ctd",
                "schema": {"zeta": "Float", "alpha": "category", "time": "time"},
                "mode": "lax",
                "missing_values": ["NA", "NaN"],
                "delimiter": "whitespace",
                "header": {"names": ["zeta", "alpha", "time"]},
                "column_count": "drop",
                "lines": {"start": 2},
                "batch_size": 500,
                "output_file": "ctd.lp"
            }"#,
        )
        .unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.measurement, "ctd");
        assert_eq!(config.mode, ValidationMode::Lax);
        assert_eq!(config.delimiter, Delimiter::Whitespace);
        assert_eq!(config.column_count, ColumnCountPolicy::Drop);
        assert_eq!(config.lines.start, 2);
        assert!(config.lines.drop_internal_blank);
        assert!(config.check_order);
        assert!(config.missing_values.contains("NaN"));

        let schema = config.typed_schema().unwrap();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "time"]);
        assert_eq!(schema.field_type("zeta"), Some(FieldType::Float));
    }

    #[test]
    fn test_from_file_reports_bad_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            PipelineConfig::from_file(&path),
            Err(Error::Serialization { .. })
        ));
    }
}
