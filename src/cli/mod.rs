//! The suitecase Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the loader, runner and reporter.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use termcolor::StandardStream;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::args::{Command, SuitecaseArgs};
use crate::config::{ColorMode, OutputFormat, RunConfig};
use crate::errors::RegistrationError;
use crate::report::Reporter;
use crate::runner::Runner;
use crate::script;

pub mod args;

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI.
pub fn run() -> ExitCode {
    let args = SuitecaseArgs::parse();
    init_tracing(args.verbose);
    debug!(?args, "parsed arguments");

    let result = match args.command {
        Command::Run {
            paths,
            filter,
            format,
        } => {
            let mut config = RunConfig::default().with_format(format).with_color(args.color);
            if let Some(filter) = filter {
                config = config.with_filter(filter);
            }
            handle_run(&paths, &config)
        }
        Command::List { paths } => handle_list(&paths, args.color),
    };

    match result {
        Ok(code) => code,
        Err(CliError::Registration(err)) => {
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::FAILURE
        }
        Err(CliError::Output(err)) => {
            eprintln!("Error: could not write report: {}", err);
            ExitCode::FAILURE
        }
    }
}

/// Priority: RUST_LOG > -v count > warn.
fn init_tracing(verbose: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

enum CliError {
    Registration(RegistrationError),
    Output(io::Error),
}

impl From<RegistrationError> for CliError {
    fn from(err: RegistrationError) -> Self {
        CliError::Registration(err)
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Output(err)
    }
}

fn handle_run(paths: &[PathBuf], config: &RunConfig) -> Result<ExitCode, CliError> {
    let suite = script::load_paths(paths)?;
    let report = Runner::new(config).run(&suite);

    let stdout = StandardStream::stdout(config.color_choice());
    let mut reporter = Reporter::new(stdout.lock(), config.format);
    reporter.report(&report)?;

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn handle_list(paths: &[PathBuf], color: ColorMode) -> Result<ExitCode, CliError> {
    let suite = script::load_paths(paths)?;
    let config = RunConfig::default().with_color(color);

    let stdout = StandardStream::stdout(config.color_choice());
    let mut reporter = Reporter::new(stdout.lock(), OutputFormat::Pretty);
    reporter.list(&suite)?;
    Ok(ExitCode::SUCCESS)
}
