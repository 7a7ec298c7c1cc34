use blobreap::reference::SqliteReferenceSource;
use blobreap::{Cleanup, Config, DirBlobStore, RunMode, RunStatus};
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

use cli::Cli;
use cli::commands::Commands;

fn setup_logging(default_level: &str) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("blobreap")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("blobreap.log");

    // Setup env_logger with file output; stdout is reserved for the report
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn run_application(cli: &Cli, config: &Config) -> Result<ExitCode> {
    match &cli.command {
        Some(Commands::Sources) => handle_sources_command(config),
        None => handle_cleanup(cli, config),
    }
}

fn handle_sources_command(config: &Config) -> Result<ExitCode> {
    println!("{}", "Columns scanned for file references:".bold());
    for column in config.registry.columns() {
        println!("  {}", column);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_cleanup(cli: &Cli, config: &Config) -> Result<ExitCode> {
    let mode = cli.run_mode();
    info!(
        "Cleanup in {} mode: database={}, uploads={}",
        mode,
        config.database.path.display(),
        config.uploads.root.display()
    );

    // Banners go to stderr; stdout carries only the report
    if cli.is_verbose() {
        eprintln!("{} {}", "Database:".bold(), config.database.path.display());
    }
    if mode == RunMode::Delete {
        eprintln!("{}", "Delete mode: orphaned files will be removed.".red().bold());
    }

    let source = SqliteReferenceSource::open(&config.database.path)
        .wrap_err("Cannot read file references")?;
    let store = DirBlobStore::new(&config.uploads.root);

    let mut stdout = io::stdout().lock();
    let outcome = Cleanup::new(config.registry.clone(), mode)
        .with_format(cli.format)
        .run(source, &store, &mut stdout)
        .wrap_err("Cleanup aborted before any file was deleted")?;
    stdout.flush()?;

    Ok(ExitCode::from(exit_code(outcome.status())))
}

/// Run aborted before any deletion
const EXIT_ABORTED: u8 = 1;
/// Sweep finished with per-file failures
const EXIT_PARTIAL_FAILURE: u8 = 2;

fn exit_code(status: RunStatus) -> u8 {
    match status {
        RunStatus::Clean => 0,
        RunStatus::PartialFailure => EXIT_PARTIAL_FAILURE,
    }
}

fn main() -> ExitCode {
    // Parse CLI arguments; --help and --version exit here
    let cli = Cli::parse();

    let result = Config::load(cli.config.as_ref())
        .context("Failed to load configuration")
        .and_then(|config| {
            let config = config.with_overrides(cli.database.clone(), cli.uploads.clone());
            let level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
            setup_logging(&level).context("Failed to setup logging")?;
            info!("Starting with config from: {:?}", cli.config);
            run_application(&cli, &config)
        });

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:?}", "Error:".red().bold(), e);
            ExitCode::from(EXIT_ABORTED)
        }
    }
}
