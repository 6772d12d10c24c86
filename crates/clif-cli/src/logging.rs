//! Tracing subscriber setup for the `clif` binary.
//!
//! Events from the workspace crates follow the level chosen on the command
//! line; dependencies (polars, rayon) stay at `warn` unless the user asks for
//! something quieter. `RUST_LOG` replaces all of this when no level flag is
//! given.
//!
//! | level   | emitted for                                    |
//! |---------|------------------------------------------------|
//! | `error` | the fatal error that ends a run                |
//! | `warn`  | one event per data-quality issue               |
//! | `info`  | loaded tables, stage summaries, written files  |
//! | `debug` | one event per hospitalization or patient       |
//! | `trace` | rows removed by individual waterfall steps     |

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

const WORKSPACE_CRATES: &[&str] = &["clif_cli", "clif_core", "clif_ingest", "clif_model"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, coloured when writing to a terminal.
    #[default]
    Pretty,
    Compact,
    /// One JSON object per event, including span close events.
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` replace the directives built from `level_filter`.
    pub use_env_filter: bool,
    pub with_timestamps: bool,
    pub with_target: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Append to this file instead of writing to stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_timestamps: false,
            with_target: false,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn with_level_filter(mut self, level_filter: LevelFilter) -> Self {
        self.level_filter = level_filter;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }

    /// Log files never receive colour codes.
    fn ansi(&self) -> bool {
        self.with_ansi && self.log_file.is_none()
    }
}

/// Installs the global subscriber. Call once, before any transform runs.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened for appending.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let writer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };
    init_logging_with_writer(config, writer);
    Ok(())
}

/// Installs the global subscriber writing to `writer`.
pub fn init_logging_with_writer(config: &LogConfig, writer: BoxMakeWriter) {
    tracing_subscriber::registry()
        .with(format_layer(config, writer))
        .with(build_env_filter(config.level_filter, config.use_env_filter))
        .init();
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn format_layer(config: &LogConfig, writer: BoxMakeWriter) -> BoxedLayer {
    let base = fmt::layer()
        .with_writer(writer)
        .with_target(config.with_target)
        .with_ansi(config.ansi());
    match (config.format, config.with_timestamps) {
        (LogFormat::Json, _) => base
            .json()
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        (LogFormat::Compact, true) => base.compact().boxed(),
        (LogFormat::Compact, false) => base.compact().without_time().boxed(),
        (LogFormat::Pretty, true) => base.boxed(),
        (LogFormat::Pretty, false) => base.without_time().boxed(),
    }
}

/// Filter directives for `level`: workspace crates at `level`, dependencies
/// at `level` or `warn`, whichever is quieter.
pub fn default_directives(level_filter: LevelFilter) -> String {
    let level = level_filter.to_string().to_lowercase();
    let dependencies = level_filter.min(LevelFilter::WARN).to_string().to_lowercase();
    std::iter::once(dependencies)
        .chain(
            WORKSPACE_CRATES
                .iter()
                .map(|krate| format!("{krate}={level}")),
        )
        .collect::<Vec<_>>()
        .join(",")
}

fn build_env_filter(level_filter: LevelFilter, use_env: bool) -> EnvFilter {
    if use_env && let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(default_directives(level_filter))
}
