//! CLI argument definitions for the CLIF transforms.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Args, ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use clif_cli::logging::{LogConfig, LogFormat};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "clif",
    version,
    about = "Respiratory support waterfall and encounter stitching for CLIF tables",
    long_about = "Run batch transforms over CLIF tables.\n\n\
                  waterfall: fill and segment respiratory support observations into episodes.\n\
                  stitch:    merge hospitalizations separated by short gaps into encounter blocks."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Logging settings implied by the global flags.
    ///
    /// `--log-level` beats `-v/-q`; either one disables `RUST_LOG`.
    pub fn log_config(&self) -> LogConfig {
        let explicit = self.log_level.map(LevelFilter::from);
        let with_ansi = match self.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stderr().is_terminal(),
        };
        LogConfig {
            level_filter: explicit.unwrap_or_else(|| self.verbosity.tracing_level_filter()),
            use_env_filter: explicit.is_none() && !self.verbosity.is_present(),
            with_ansi,
            ..LogConfig::default()
        }
        .with_format(self.log_format.into())
        .with_log_file(self.log_file.clone())
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize respiratory support observations into device/mode episodes.
    Waterfall(WaterfallArgs),

    /// Build encounter blocks from hospitalization and ADT tables.
    Stitch(StitchArgs),
}

#[derive(Args)]
pub struct WaterfallArgs {
    /// Respiratory support CSV file.
    #[arg(long = "input", value_name = "CSV", required_unless_present = "tables_dir")]
    pub input: Option<PathBuf>,

    /// Output CSV file for the episode table.
    #[arg(long = "output", value_name = "CSV")]
    pub output: PathBuf,

    #[command(flatten)]
    pub tables: TablesArgs,

    #[command(flatten)]
    pub transform: TransformArgs,
}

#[derive(Args)]
pub struct StitchArgs {
    /// Hospitalization CSV file.
    #[arg(
        long = "hospitalization",
        value_name = "CSV",
        required_unless_present = "tables_dir"
    )]
    pub hospitalization: Option<PathBuf>,

    /// ADT CSV file.
    #[arg(long = "adt", value_name = "CSV", required_unless_present = "tables_dir")]
    pub adt: Option<PathBuf>,

    /// Directory for encounter_blocks.csv and encounter_members.csv.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub tables: TablesArgs,

    #[command(flatten)]
    pub transform: TransformArgs,
}

/// Locating tables by CLIF name instead of by file.
#[derive(Args)]
pub struct TablesArgs {
    /// Directory holding clif_<table>.<file-type> files.
    #[arg(long = "tables-dir", value_name = "DIR")]
    pub tables_dir: Option<PathBuf>,

    /// File type of the tables in --tables-dir.
    #[arg(long = "file-type", default_value = "csv")]
    pub file_type: String,
}

/// Options shared by both transforms.
#[derive(Args)]
pub struct TransformArgs {
    /// JSON file with transform settings (time_interval, worker_threads).
    #[arg(long = "config", value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Linkage threshold in hours (overrides --config).
    #[arg(long = "time-interval", value_name = "HOURS")]
    pub time_interval: Option<f64>,

    /// Worker threads; 0 uses one per CPU (overrides --config).
    #[arg(long = "threads", value_name = "N")]
    pub threads: Option<usize>,

    /// Write the data-quality issue report to this JSON file.
    #[arg(long = "issues", value_name = "JSON")]
    pub issues: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
