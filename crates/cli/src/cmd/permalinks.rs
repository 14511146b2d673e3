//! Implementation of the `runsel permalinks` command.
//!
//! Shows what each of a job's permalinks currently resolves to.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use runsel_lib::{Job, StoredJob, StoredRun};

use crate::output::{OutputFormat, format_run, print_json, result_symbol, symbols};

#[derive(Serialize)]
struct PermalinkEntry<'a> {
  id: &'a str,
  display_name: &'a str,
  build: Option<StoredRun>,
}

pub fn cmd_permalinks(job_path: &Path, format: OutputFormat) -> Result<()> {
  let job = StoredJob::load(job_path).with_context(|| format!("Failed to load job: {}", job_path.display()))?;

  let permalinks = job.permalinks();
  let entries = permalinks
    .iter()
    .map(|permalink| -> Result<PermalinkEntry<'_>> {
      let build = permalink
        .resolve(&job)
        .with_context(|| format!("Failed to resolve permalink {}", permalink.id()))?;
      Ok(PermalinkEntry {
        id: permalink.id(),
        display_name: permalink.display_name(),
        build,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  if format.is_json() {
    return print_json(&entries);
  }

  println!("Permalinks of {}:", job.full_name());
  for entry in &entries {
    match &entry.build {
      Some(run) => println!(
        "  {} {} {} {}",
        result_symbol(run.result),
        entry.id,
        symbols::ARROW,
        format_run(run)
      ),
      None => println!("  {} {} {} none", symbols::SKIPPED, entry.id, symbols::ARROW),
    }
  }
  Ok(())
}
