//! Defines the command-line arguments and subcommands for the suitecase CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ColorMode, OutputFormat, DEFAULT_SUITE_ROOT};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "suitecase",
    version,
    about = "Runs describe/it test suites written as YAML files."
)]
pub struct SuitecaseArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// When to color the output.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load suite files, run every case and print the report.
    Run {
        /// Suite files or directories to search for *.yaml / *.yml files.
        #[arg(default_value = DEFAULT_SUITE_ROOT)]
        paths: Vec<PathBuf>,
        /// Only run cases whose qualified name contains this substring.
        #[arg(short, long)]
        filter: Option<String>,
        /// Report format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// Print the registered suite tree without running it.
    List {
        /// Suite files or directories to search for *.yaml / *.yml files.
        #[arg(default_value = DEFAULT_SUITE_ROOT)]
        paths: Vec<PathBuf>,
    },
}
