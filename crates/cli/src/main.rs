mod cmd;
mod output;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{cmd_permalinks, cmd_resolve, cmd_selectors};
use output::{OutputFormat, print_failure};

/// runsel - Resolve build identifiers to builds
#[derive(Parser)]
#[command(name = "runsel")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Resolve an identifier to one build of a job
  Resolve {
    /// Path to the job file (JSON)
    job: PathBuf,

    /// Build number, permalink id, or display name; may reference variables
    identifier: String,

    /// Define a variable for expansion (repeatable)
    #[arg(short, long = "env", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    env: Vec<(String, String)>,

    /// Seed variables from the process environment
    #[arg(long)]
    inherit_env: bool,
  },

  /// List the selectors offered to users, in menu order
  Selectors,

  /// List a job's permalinks and the builds they resolve to
  Permalinks {
    /// Path to the job file (JSON)
    job: PathBuf,
  },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
  let (key, value) = s
    .split_once('=')
    .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{s}'"))?;
  if key.is_empty() {
    return Err(format!("invalid KEY=VALUE: empty key in '{s}'"));
  }
  Ok((key.to_string(), value.to_string()))
}

fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_ansi(std::io::stderr().is_terminal())
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result: Result<ExitCode> = match cli.command {
    Commands::Resolve {
      job,
      identifier,
      env,
      inherit_env,
    } => cmd_resolve(&job, &identifier, env, inherit_env, cli.output),
    Commands::Selectors => cmd_selectors(cli.output).map(|()| ExitCode::SUCCESS),
    Commands::Permalinks { job } => cmd_permalinks(&job, cli.output).map(|()| ExitCode::SUCCESS),
  };

  match result {
    Ok(code) => code,
    Err(e) => {
      print_failure(&e);
      ExitCode::FAILURE
    }
  }
}
