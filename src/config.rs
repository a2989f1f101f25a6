//! Run configuration shared by the runner, reporter and CLI.

use clap::ValueEnum;
use serde::Serialize;

/// Default location searched for suite files.
pub const DEFAULT_SUITE_ROOT: &str = "suites";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable, optionally colored.
    #[default]
    Pretty,
    /// Machine-readable report on stdout.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Configuration for test execution and reporting.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Substring a qualified case name must contain, compared
    /// case-insensitively. Kept as given for skip reasons.
    pub filter: Option<String>,
    pub format: OutputFormat,
    pub use_colors: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            filter: None,
            format: OutputFormat::Pretty,
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl RunConfig {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_color(mut self, mode: ColorMode) -> Self {
        self.use_colors = match mode {
            ColorMode::Auto => atty::is(atty::Stream::Stdout),
            ColorMode::Always => true,
            ColorMode::Never => false,
        };
        self
    }

    /// JSON output is never colored.
    pub fn color_choice(&self) -> termcolor::ColorChoice {
        if self.use_colors && self.format == OutputFormat::Pretty {
            termcolor::ColorChoice::Always
        } else {
            termcolor::ColorChoice::Never
        }
    }
}
