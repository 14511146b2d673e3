//! Terminal rendering of builds, permalinks and selection outcomes.
//!
//! Builds are marked with a symbol colored by their result. Misses and
//! failures go to stderr so stdout carries only what was resolved.

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use runsel_lib::permalink::BuildResult;
use runsel_lib::{Run, StoredRun};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const PASSED: &str = "✓";
  pub const BROKEN: &str = "✗";
  pub const UNSTABLE: &str = "⚠";
  pub const RUNNING: &str = "↻";
  pub const SKIPPED: &str = "•";
  pub const ARROW: &str = "→";
}

/// Short status label for a build.
pub fn format_result(result: Option<BuildResult>) -> &'static str {
  result.map_or("building", BuildResult::as_str)
}

/// Symbol marking a build's result.
pub fn result_symbol(result: Option<BuildResult>) -> &'static str {
  match result {
    None => symbols::RUNNING,
    Some(BuildResult::Success) => symbols::PASSED,
    Some(BuildResult::Unstable) => symbols::UNSTABLE,
    Some(BuildResult::Failure | BuildResult::Aborted) => symbols::BROKEN,
    Some(BuildResult::NotBuilt) => symbols::SKIPPED,
  }
}

/// One-line summary of a build: `#12 release (success)`.
///
/// The name is left out when it is the default `#<number>`.
pub fn format_run(run: &StoredRun) -> String {
  let number = format!("#{}", run.number());
  if run.display_name() == number {
    format!("{} ({})", number, format_result(run.result))
  } else {
    format!("{} {} ({})", number, run.display_name(), format_result(run.result))
  }
}

pub fn format_not_found(identifier: &str, job: &str) -> String {
  format!("No build found for '{identifier}' in {job}")
}

/// Print a resolved build with its job, number and result underneath.
pub fn print_build(job: &str, run: &StoredRun) {
  let symbol = result_symbol(run.result);
  let marked = symbol.if_supports_color(Stream::Stdout, |s| match run.result {
    None => s.cyan().to_string(),
    Some(BuildResult::Success) => s.green().to_string(),
    Some(BuildResult::Unstable) => s.yellow().to_string(),
    Some(BuildResult::Failure | BuildResult::Aborted) => s.red().to_string(),
    Some(BuildResult::NotBuilt) => s.dimmed().to_string(),
  });
  println!("{} {}", marked, format_run(run));
  print_field("Job", job);
  print_field("Number", &run.number().to_string());
  print_field("Result", format_result(run.result));
}

pub fn print_not_found(identifier: &str, job: &str) {
  let message = format_not_found(identifier, job);
  eprintln!(
    "{} {}",
    symbols::UNSTABLE.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

/// Print a command failure with its whole cause chain.
pub fn print_failure(err: &anyhow::Error) {
  let message = format!("{err:#}");
  eprintln!(
    "{} {}",
    symbols::BROKEN.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

fn print_field(label: &str, value: &str) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to render output as JSON")?;
  println!("{json}");
  Ok(())
}
