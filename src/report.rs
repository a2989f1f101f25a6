//! Reporter: renders a [`RunReport`] for a human or a machine.

use difference::{Changeset, Difference};
use serde::Serialize;
use std::io;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::config::OutputFormat;
use crate::errors::AssertionFailure;
use crate::runner::{Outcome, Phase, RunReport, Summary, TestResult};
use crate::suite::{Entry, Mode, Suite};

pub struct Reporter<W> {
    out: W,
    format: OutputFormat,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: Summary,
    results: &'a [TestResult],
}

impl<W: WriteColor> Reporter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn report(&mut self, report: &RunReport) -> io::Result<()> {
        match self.format {
            OutputFormat::Pretty => self.pretty(report),
            OutputFormat::Json => self.json(report),
        }
    }

    fn json(&mut self, report: &RunReport) -> io::Result<()> {
        let doc = JsonReport {
            summary: report.summary(),
            results: &report.results,
        };
        serde_json::to_writer_pretty(&mut self.out, &doc)?;
        writeln!(self.out)
    }

    fn pretty(&mut self, report: &RunReport) -> io::Result<()> {
        for result in &report.results {
            let color = outcome_color(&result.outcome);
            self.paint(result.outcome.label(), color, true)?;
            write!(self.out, ": {}", result.qualified_name())?;
            if let Outcome::Skipped { reason } = &result.outcome {
                write!(self.out, " ({})", reason)?;
            }
            writeln!(self.out)?;
        }

        let summary = report.summary();
        write!(self.out, "\nTest summary: total {}, ", summary.total)?;
        self.paint("passed", Color::Green, false)?;
        write!(self.out, " {}, ", summary.passed)?;
        self.paint("failed", Color::Red, false)?;
        write!(self.out, " {}, ", summary.failed)?;
        self.paint("errored", Color::Magenta, false)?;
        write!(self.out, " {}, ", summary.errored)?;
        self.paint("skipped", Color::Yellow, false)?;
        writeln!(self.out, " {}", summary.skipped)?;

        if summary.has_failures() {
            writeln!(self.out, "\nFailures:")?;
            for (index, result) in report.failures().enumerate() {
                self.print_failure(index + 1, result)?;
            }
        }
        Ok(())
    }

    fn print_failure(&mut self, number: usize, result: &TestResult) -> io::Result<()> {
        writeln!(self.out)?;
        self.paint(&format!("{}) {}", number, result.qualified_name()), Color::Red, true)?;
        writeln!(self.out)?;
        match &result.outcome {
            Outcome::Failed { failure } => self.print_assertion(failure),
            Outcome::Errored { phase, detail } => {
                let place = match phase {
                    Phase::Hook => " in before_each hook",
                    Phase::Body => "",
                };
                writeln!(self.out, "   RuntimeError{}: {}", place, detail)
            }
            Outcome::Passed | Outcome::Skipped { .. } => Ok(()),
        }
    }

    fn print_assertion(&mut self, failure: &AssertionFailure) -> io::Result<()> {
        writeln!(self.out, "   AssertionFailure: {}", failure.message)?;
        if failure.operator == "fail" {
            return Ok(());
        }
        write!(self.out, "     expected: ")?;
        self.paint(&failure.expected.to_string(), Color::Green, false)?;
        write!(self.out, "\n     actual:   ")?;
        self.paint(&failure.actual.to_string(), Color::Red, false)?;
        writeln!(self.out)?;

        if failure.expected.is_compound() && failure.actual.is_compound() {
            let changeset = Changeset::new(
                &failure.expected.pretty(),
                &failure.actual.pretty(),
                "\n",
            );
            writeln!(self.out, "   Diff (- expected, + actual):")?;
            self.print_diff(&changeset.diffs)?;
        }
        Ok(())
    }

    fn print_diff(&mut self, diffs: &[Difference]) -> io::Result<()> {
        for diff in diffs {
            let (marker, text, color) = match diff {
                Difference::Same(x) => (' ', x, None),
                Difference::Add(x) => ('+', x, Some(Color::Red)),
                Difference::Rem(x) => ('-', x, Some(Color::Green)),
            };
            for line in text.lines() {
                let rendered = format!("     {}{}", marker, line);
                match color {
                    Some(color) => self.paint(&rendered, color, false)?,
                    None => write!(self.out, "{}", rendered)?,
                }
                writeln!(self.out)?;
            }
        }
        Ok(())
    }

    /// Prints the registered tree without running anything.
    pub fn list<F>(&mut self, suite: &Suite<F>) -> io::Result<()> {
        let depth = if suite.name().is_empty() {
            0
        } else {
            writeln!(self.out, "{}{}", suite.name(), mode_marker(suite.mode()))?;
            1
        };
        self.list_entries(suite, depth)?;
        writeln!(self.out, "\n{} cases", suite.case_count())
    }

    fn list_entries<F>(&mut self, suite: &Suite<F>, depth: usize) -> io::Result<()> {
        let indent = "  ".repeat(depth);
        if !suite.hooks().is_empty() {
            writeln!(self.out, "{}({} before_each)", indent, suite.hooks().len())?;
        }
        for entry in suite.entries() {
            match entry {
                Entry::Case(case) => {
                    writeln!(self.out, "{}- {}{}", indent, case.name(), mode_marker(case.mode()))?
                }
                Entry::Suite(child) => {
                    self.paint(&format!("{}{}", indent, child.name()), Color::Cyan, true)?;
                    writeln!(self.out, "{}", mode_marker(child.mode()))?;
                    self.list_entries(child, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    fn paint(&mut self, text: &str, color: Color, bold: bool) -> io::Result<()> {
        self.out
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold))?;
        write!(self.out, "{}", text)?;
        self.out.reset()
    }
}

fn outcome_color(outcome: &Outcome) -> Color {
    match outcome {
        Outcome::Passed => Color::Green,
        Outcome::Failed { .. } => Color::Red,
        Outcome::Errored { .. } => Color::Magenta,
        Outcome::Skipped { .. } => Color::Yellow,
    }
}

fn mode_marker(mode: Mode) -> &'static str {
    match mode {
        Mode::Normal => "",
        Mode::Skip => " [skip]",
        Mode::Only => " [only]",
    }
}
