//! Binary entry point: parse arguments, load config, dispatch.

use clap::Parser;
use logwarden::cli::{
    cmd_archive, cmd_check_size, cmd_log, cmd_metrics, cmd_rotate, cmd_service, cmd_watch,
    commands::build_logger, Cli, Command,
};
use logwarden::config::ConfigManager;
use logwarden::Level;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Diagnostics go to stderr so they never mix with log records on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Config drives everything downstream; a broken file fails fast here.
    let manager = match ConfigManager::load() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error loading config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Debug(args) => one_shot(Level::Debug, &args, &manager),
        Command::Info(args) => one_shot(Level::Info, &args, &manager),
        Command::Warn(args) => one_shot(Level::Warn, &args, &manager),
        Command::Error(args) => one_shot(Level::Error, &args, &manager),
        Command::Fatal(args) => one_shot(Level::Fatal, &args, &manager),
        Command::Service { action } => cmd_service(&action, manager),
        Command::Metrics { action } => cmd_metrics(&action, &manager.handle().current()),
        Command::Rotate => cmd_rotate(&manager.handle().current()),
        Command::CheckSize => cmd_check_size(&manager.handle().current()),
        Command::Archive => cmd_archive(&manager.handle().current()),
        Command::Watch => cmd_watch(&manager.handle().current()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn one_shot(
    level: Level,
    args: &logwarden::cli::LogArgs,
    manager: &ConfigManager,
) -> Result<(), logwarden::Error> {
    let logger = build_logger(manager.handle());
    cmd_log(level, args, &logger)
}
