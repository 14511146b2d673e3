//! In-memory job storage.
//!
//! Jobs are loaded from JSON files describing their builds:
//!
//! ```json
//! {
//!   "full_name": "folder/app",
//!   "builds": [
//!     { "number": 1, "result": "success" },
//!     { "number": 2, "display_name": "release", "result": "unstable" },
//!     { "number": 3 }
//!   ]
//! }
//! ```
//!
//! Builds may appear in any order; they are held newest first. A build
//! without a `result` is still running. A build without a `display_name`
//! is displayed as `#<number>`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::Result;
use crate::job::{Job, Permalink, Run};
use crate::permalink::{BuildResult, Builtin, Outcome};

static BUILTINS: [Builtin; 7] = Builtin::ALL;

/// Errors that can occur while loading a job.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("failed to read job file '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse job file: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("job '{job}' has more than one build numbered {number}")]
  DuplicateBuild { job: String, number: u32 },
}

/// A build held in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RunRecord")]
pub struct StoredRun {
  pub number: u32,
  display_name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub result: Option<BuildResult>,
}

/// A build as written in a job file, before defaults are applied.
#[derive(Deserialize)]
struct RunRecord {
  number: u32,
  #[serde(default)]
  display_name: Option<String>,
  #[serde(default)]
  result: Option<BuildResult>,
}

impl From<RunRecord> for StoredRun {
  fn from(record: RunRecord) -> Self {
    let run = StoredRun {
      result: record.result,
      ..StoredRun::new(record.number)
    };
    match record.display_name {
      Some(name) => run.named(name),
      None => run,
    }
  }
}

impl StoredRun {
  /// A running build displayed as `#<number>`.
  pub fn new(number: u32) -> Self {
    Self {
      number,
      display_name: format!("#{number}"),
      result: None,
    }
  }

  pub fn named(mut self, display_name: impl Into<String>) -> Self {
    self.display_name = display_name.into();
    self
  }

  pub fn finished(mut self, result: BuildResult) -> Self {
    self.result = Some(result);
    self
  }

  pub fn is_building(&self) -> bool {
    self.result.is_none()
  }
}

impl Run for StoredRun {
  fn number(&self) -> u32 {
    self.number
  }

  fn display_name(&self) -> &str {
    &self.display_name
  }
}

impl Outcome for StoredRun {
  fn result(&self) -> Option<BuildResult> {
    self.result
  }
}

#[derive(Debug, Deserialize)]
struct JobFile {
  full_name: String,
  #[serde(default)]
  builds: Vec<StoredRun>,
}

/// A job held in memory, carrying the built-in permalinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredJob {
  full_name: String,

  /// Sorted by number, newest (highest) first.
  builds: Vec<StoredRun>,
}

impl StoredJob {
  /// Create a job from its builds, in any order.
  pub fn new(full_name: impl Into<String>, builds: Vec<StoredRun>) -> std::result::Result<Self, StoreError> {
    let full_name = full_name.into();
    let mut seen = HashSet::new();

    let mut builds = builds
      .into_iter()
      .map(|run| {
        if !seen.insert(run.number) {
          return Err(StoreError::DuplicateBuild {
            job: full_name.clone(),
            number: run.number,
          });
        }
        Ok(run)
      })
      .collect::<std::result::Result<Vec<_>, _>>()?;

    builds.sort_by(|a, b| b.number.cmp(&a.number));

    Ok(Self { full_name, builds })
  }

  /// Parse a job from JSON.
  pub fn from_json(content: &str) -> std::result::Result<Self, StoreError> {
    let file: JobFile = serde_json::from_str(content)?;
    Self::new(file.full_name, file.builds)
  }

  /// Load a job from a JSON file.
  pub fn load(path: &Path) -> std::result::Result<Self, StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let job = Self::from_json(&content)?;
    debug!(job = %job.full_name, builds = job.builds.len(), path = %path.display(), "loaded job");
    Ok(job)
  }

  /// Builds, newest first.
  pub fn runs(&self) -> &[StoredRun] {
    &self.builds
  }
}

impl Job for StoredJob {
  type Run = StoredRun;

  fn full_name(&self) -> &str {
    &self.full_name
  }

  fn build_by_number(&self, number: u32) -> Result<Option<StoredRun>> {
    Ok(
      self
        .builds
        .binary_search_by(|run| number.cmp(&run.number))
        .ok()
        .map(|idx| self.builds[idx].clone()),
    )
  }

  fn builds(&self) -> Box<dyn Iterator<Item = Result<StoredRun>> + '_> {
    Box::new(self.builds.iter().cloned().map(Ok))
  }

  fn permalink(&self, id: &str) -> Option<&dyn Permalink<Self>> {
    let builtin = BUILTINS.iter().find(|b| Builtin::id(**b) == id)?;
    Some(builtin as &dyn Permalink<Self>)
  }

  fn permalinks(&self) -> Vec<&dyn Permalink<Self>> {
    BUILTINS.iter().map(|b| b as &dyn Permalink<Self>).collect()
  }
}
