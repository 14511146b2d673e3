//! Implementation of the `runsel resolve` command.
//!
//! Loads a job file, expands the identifier with the given variables, and
//! prints the build it names. Exits with status 2 when nothing matches.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use runsel_lib::{EnvVars, Job, SelectorContext, SpecificBuildSelector, StoredJob, StoredRun};

use crate::output::{OutputFormat, print_build, print_json, print_not_found};

/// Exit status when the identifier matches no build.
const NOT_FOUND: u8 = 2;

#[derive(Serialize)]
struct ResolveOutput<'a> {
  job: &'a str,
  identifier: &'a str,
  build: Option<&'a StoredRun>,
}

/// Build the environment mapping: the process environment (if inherited),
/// overridden by explicit `KEY=VALUE` pairs.
fn build_env(pairs: Vec<(String, String)>, inherit: bool) -> EnvVars {
  let mut env = if inherit { EnvVars::from_process() } else { EnvVars::new() };
  env.extend(pairs);
  env
}

pub fn cmd_resolve(
  job_path: &Path,
  identifier: &str,
  env: Vec<(String, String)>,
  inherit_env: bool,
  format: OutputFormat,
) -> Result<ExitCode> {
  let job = StoredJob::load(job_path).with_context(|| format!("Failed to load job: {}", job_path.display()))?;

  let env = build_env(env, inherit_env);
  info!(job = job.full_name(), identifier, variables = env.len(), "resolving build");

  let selector = SpecificBuildSelector::new(identifier);
  let run = selector
    .select(&job, &SelectorContext::new(env))
    .with_context(|| format!("Failed to resolve '{}' in {}", selector.identifier(), job.full_name()))?;

  if format.is_json() {
    print_json(&ResolveOutput {
      job: job.full_name(),
      identifier: selector.identifier(),
      build: run.as_ref(),
    })?;
  } else {
    match &run {
      Some(run) => print_build(job.full_name(), run),
      None => print_not_found(selector.identifier(), job.full_name()),
    }
  }

  Ok(match run {
    Some(_) => ExitCode::SUCCESS,
    None => ExitCode::from(NOT_FOUND),
  })
}
