//! pflux - Command-line interface for Pointer Flux
//!
//! Commands:
//! - tensorize: Run the standard pipeline over a capture directory
//! - validate: Report which capture files segment cleanly
//! - schema: Print the canonical output columns

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use pointer_flux::segmenter::{release_indices, PathSegmenter};
use pointer_flux::{
    CanonicalSchema, CaptureDataset, ComputeError, PipelineConfig, RecordStore, Tensor,
    FLUX_VERSION, PRODUCER_NAME,
};

/// pflux - Gesture tensors from pointer-device capture logs
#[derive(Parser)]
#[command(name = "pflux")]
#[command(version = FLUX_VERSION)]
#[command(about = "Turn pointer capture logs into fixed-schema tensors", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run segment → wrangle → tensorize over every capture file
    Tensorize {
        /// Capture directory
        #[arg(short, long)]
        dir: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        format: OutputFormat,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Log and skip files that fail instead of aborting
        #[arg(long)]
        skip_invalid: bool,
    },

    /// Check every capture file loads and segments
    Validate {
        /// Capture directory
        #[arg(short, long)]
        dir: PathBuf,

        /// Output report as JSON
        #[arg(long)]
        json: bool,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the canonical output columns
    Schema {
        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as a JSON array
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one capture file per line)
    Ndjson,
    /// JSON array of capture records
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PfluxCliError> {
    match cli.command {
        Commands::Tensorize {
            dir,
            output,
            format,
            config,
            skip_invalid,
        } => cmd_tensorize(&dir, &output, format, config.as_deref(), skip_invalid),

        Commands::Validate { dir, json, config } => cmd_validate(&dir, json, config.as_deref()),

        Commands::Schema { config, json } => cmd_schema(config.as_deref(), json),
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, PfluxCliError> {
    match path {
        Some(path) => Ok(PipelineConfig::load(path)?),
        None => Ok(PipelineConfig::default()),
    }
}

fn cmd_tensorize(
    dir: &Path,
    output: &Path,
    format: OutputFormat,
    config: Option<&Path>,
    skip_invalid: bool,
) -> Result<(), PfluxCliError> {
    let config = load_config(config)?;
    let columns = config.wrangle.schema().columns().to_vec();
    let dataset = CaptureDataset::from_config(dir, &config)?;

    if dataset.is_empty() {
        return Err(PfluxCliError::NoCaptures(dir.to_path_buf()));
    }

    let mut records: Vec<TensorRecord> = Vec::new();
    let mut skipped = 0;

    for (path, result) in dataset.iter() {
        match result {
            Ok(tensors) => records.push(TensorRecord::new(&path, &columns, &tensors)),
            // I/O failures still abort; only malformed captures are skippable
            Err(e) if skip_invalid && e.is_data_error() => {
                warn!("Skipping {}: {}", path.display(), e);
                skipped += 1;
            }
            Err(e) => return Err(PfluxCliError::Capture { path, source: e }),
        }
    }

    if skipped > 0 {
        warn!(
            "{} of {} capture files skipped",
            skipped,
            skipped + records.len()
        );
    }

    let output_data = format_output(&records, &format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(dir: &Path, json: bool, config: Option<&Path>) -> Result<(), PfluxCliError> {
    let config = load_config(config)?;
    let store = RecordStore::open_with_extension(dir, config.extension())?;
    let segmenter = PathSegmenter::new();

    let files: Vec<FileReport> = (0..store.count())
        .map(|index| {
            let file = store
                .file_path(index)
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            let checked = store.get(index).and_then(|frame| {
                let releases = release_indices(&frame)?.len();
                let paths = segmenter.segment(&frame)?.len();
                Ok((frame.len(), releases, paths))
            });
            match checked {
                Ok((rows, releases, paths)) => FileReport {
                    file,
                    rows: Some(rows),
                    releases: Some(releases),
                    paths: Some(paths),
                    error: None,
                },
                Err(e) => FileReport {
                    file,
                    rows: None,
                    releases: None,
                    paths: None,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect();

    let invalid_files = files.iter().filter(|f| f.error.is_some()).count();
    let report = ValidationReport {
        producer: PRODUCER_NAME.to_string(),
        version: FLUX_VERSION.to_string(),
        total_files: files.len(),
        valid_files: files.len() - invalid_files,
        invalid_files,
        files,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Directory:     {}", dir.display());
        println!("Total files:   {}", report.total_files);
        println!("Valid files:   {}", report.valid_files);
        println!("Invalid files: {}", report.invalid_files);

        if !report.files.is_empty() {
            println!();
            for file in &report.files {
                match (&file.error, file.rows, file.releases, file.paths) {
                    (Some(error), ..) => println!("  ✗ {}: {}", file.file, error),
                    (None, Some(rows), Some(releases), Some(paths)) => println!(
                        "  ✓ {}: {} rows, {} releases, {} paths",
                        file.file, rows, releases, paths
                    ),
                    _ => println!("  ? {}", file.file),
                }
            }
        }
    }

    if report.invalid_files > 0 {
        Err(PfluxCliError::ValidationFailed(report.invalid_files))
    } else {
        Ok(())
    }
}

fn cmd_schema(config: Option<&Path>, json: bool) -> Result<(), PfluxCliError> {
    let config = load_config(config)?;
    let schema: CanonicalSchema = config.wrangle.schema();

    if json {
        println!("{}", serde_json::to_string_pretty(schema.columns())?);
    } else {
        for column in schema.columns() {
            println!("{}", column);
        }
    }

    Ok(())
}

// Helper functions

fn format_output(records: &[TensorRecord], format: &OutputFormat) -> Result<String, PfluxCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for record in records {
                lines.push(serde_json::to_string(record)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(records)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(records)?),
    }
}

// Output types

#[derive(serde::Serialize)]
struct TensorRecord {
    file: String,
    paths: usize,
    columns: Vec<String>,
    tensors: Vec<TensorData>,
}

impl TensorRecord {
    fn new(path: &Path, columns: &[String], tensors: &[Tensor]) -> Self {
        Self {
            file: path.display().to_string(),
            paths: tensors.len(),
            columns: columns.to_vec(),
            tensors: tensors.iter().map(TensorData::from).collect(),
        }
    }
}

#[derive(serde::Serialize)]
struct TensorData {
    rows: usize,
    cols: usize,
    /// Row-major cells
    data: Vec<f64>,
}

impl From<&Tensor> for TensorData {
    fn from(tensor: &Tensor) -> Self {
        Self {
            rows: tensor.nrows(),
            cols: tensor.ncols(),
            data: tensor.iter().copied().collect(),
        }
    }
}

#[derive(serde::Serialize)]
struct ValidationReport {
    producer: String,
    version: String,
    total_files: usize,
    valid_files: usize,
    invalid_files: usize,
    files: Vec<FileReport>,
}

#[derive(serde::Serialize)]
struct FileReport {
    file: String,
    rows: Option<usize>,
    releases: Option<usize>,
    paths: Option<usize>,
    error: Option<String>,
}

// Error types

#[derive(Debug)]
enum PfluxCliError {
    Io(std::io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    Capture { path: PathBuf, source: ComputeError },
    NoCaptures(PathBuf),
    ValidationFailed(usize),
}

impl From<std::io::Error> for PfluxCliError {
    fn from(e: std::io::Error) -> Self {
        PfluxCliError::Io(e)
    }
}

impl From<ComputeError> for PfluxCliError {
    fn from(e: ComputeError) -> Self {
        PfluxCliError::Compute(e)
    }
}

impl From<serde_json::Error> for PfluxCliError {
    fn from(e: serde_json::Error) -> Self {
        PfluxCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PfluxCliError> for CliError {
    fn from(e: PfluxCliError) -> Self {
        match e {
            PfluxCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PfluxCliError::Compute(ComputeError::ConfigError(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some(
                    "Run 'pflux schema --config <file>' to check the configuration".to_string(),
                ),
            },
            PfluxCliError::Compute(e) => CliError {
                code: compute_code(&e).to_string(),
                message: e.to_string(),
                hint: None,
            },
            PfluxCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PfluxCliError::Capture { path, source } => CliError {
                code: compute_code(&source).to_string(),
                message: format!("{}: {}", path.display(), source),
                hint: Some(
                    "Run 'pflux validate' for details or pass --skip-invalid".to_string(),
                ),
            },
            PfluxCliError::NoCaptures(dir) => CliError {
                code: "NO_CAPTURES".to_string(),
                message: format!("No capture files found in {}", dir.display()),
                hint: Some("Check the directory and the configured log extension".to_string()),
            },
            PfluxCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} capture files failed validation", count),
                hint: Some("Fix or remove the failing files and retry".to_string()),
            },
        }
    }
}

fn compute_code(e: &ComputeError) -> &'static str {
    match e {
        ComputeError::SchemaError(_) => "SCHEMA_ERROR",
        ComputeError::SegmentationError(_) => "SEGMENTATION_ERROR",
        ComputeError::ConversionError { .. } => "CONVERSION_ERROR",
        ComputeError::IndexError { .. } => "INDEX_ERROR",
        ComputeError::StageMismatch { .. } => "STAGE_MISMATCH",
        ComputeError::ShapeError(_) => "SHAPE_ERROR",
        ComputeError::ConfigError(_) => "CONFIG_ERROR",
        ComputeError::Io(_) => "IO_ERROR",
        ComputeError::JsonError(_) => "JSON_ERROR",
    }
}
