//! Command-line interface, built on Clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Log level for CLI arguments.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl From<LogLevel> for crate::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => Self::Debug,
            LogLevel::Info => Self::Info,
            LogLevel::Warn => Self::Warn,
            LogLevel::Error => Self::Error,
            LogLevel::Fatal => Self::Fatal,
        }
    }
}

/// Shared arguments for the one-shot logging subcommands.
#[derive(Debug, clap::Args)]
pub struct LogArgs {
    /// Log message
    pub message: Vec<String>,
    /// Source component the entry is attributed to
    #[arg(short, long)]
    pub source: Option<String>,
    /// Free-form context string
    #[arg(short, long)]
    pub context: Option<String>,
    /// String tag as key=value (repeatable)
    #[arg(short, long, value_name = "KEY=VALUE")]
    pub tag: Vec<String>,
    /// Metadata as key=value, value parsed as JSON when possible (repeatable)
    #[arg(short, long, value_name = "KEY=VALUE")]
    pub metadata: Vec<String>,
}

/// logwarden - structured logging service and CLI.
#[derive(Parser)]
#[command(name = "logwarden", version, about = "Structured logging service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Log a message at DEBUG.
    Debug(LogArgs),
    /// Log a message at INFO.
    Info(LogArgs),
    /// Log a message at WARN.
    Warn(LogArgs),
    /// Log a message at ERROR.
    Error(LogArgs),
    /// Log a message at FATAL and exit with failure.
    Fatal(LogArgs),
    /// Manage the background service.
    Service {
        #[command(subcommand)]
        action: ServiceAction,
    },
    /// Manage metrics.
    Metrics {
        #[command(subcommand)]
        action: MetricsAction,
    },
    /// Archive every log file regardless of size.
    Rotate,
    /// Run the size-threshold rotation check once.
    CheckSize,
    /// Bundle all log files into a zip archive.
    Archive,
    /// Follow the active log file.
    Watch,
}

/// Service lifecycle subcommands.
#[derive(Subcommand)]
pub enum ServiceAction {
    /// Start the service as a detached background process.
    Start,
    /// Stop the running service.
    Stop,
    /// Report whether the service is running.
    Status,
    /// Run the service loop in the foreground (used by `start`).
    #[command(hide = true)]
    Run,
}

/// Metrics subcommands.
#[derive(Subcommand)]
pub enum MetricsAction {
    /// Set a gauge to a value.
    Add {
        /// Metric name
        name: String,
        /// Gauge value
        value: f64,
        /// Metadata as key=value (repeatable)
        #[arg(short, long, value_name = "KEY=VALUE")]
        metadata: Vec<String>,
    },
    /// Remove a gauge.
    Remove {
        /// Metric name
        name: String,
    },
    /// Add a delta to a gauge, creating it at zero when absent.
    Increment {
        /// Metric name
        name: String,
        /// Amount to add
        #[arg(default_value_t = 1.0)]
        delta: f64,
    },
    /// Print all gauges.
    List,
    /// Poll and print gauges as they change.
    Watch,
    /// Enable exposition and serve the endpoint in the foreground.
    #[command(alias = "serve")]
    Enable {
        /// Listener port; defaults to the configured service port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Disable metrics exposition.
    Disable,
}

pub use commands::{
    cmd_archive, cmd_check_size, cmd_log, cmd_metrics, cmd_rotate, cmd_service, cmd_watch,
};
