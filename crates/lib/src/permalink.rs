//! The standard permalinks every job carries.
//!
//! Each rule walks the job's builds newest first and picks the first one whose
//! result matches. A build that is still running has no result and only
//! matches `lastBuild`.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::job::{Job, Permalink, Run};

/// Outcome of a finished build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildResult {
  Success,
  Unstable,
  Failure,
  NotBuilt,
  Aborted,
}

impl BuildResult {
  pub fn as_str(self) -> &'static str {
    match self {
      BuildResult::Success => "success",
      BuildResult::Unstable => "unstable",
      BuildResult::Failure => "failure",
      BuildResult::NotBuilt => "not_built",
      BuildResult::Aborted => "aborted",
    }
  }
}

/// A run that reports its result.
pub trait Outcome: Run {
  /// `None` while the build is still running.
  fn result(&self) -> Option<BuildResult>;
}

/// Built-in permalink rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
  LastBuild,
  LastStableBuild,
  LastSuccessfulBuild,
  LastFailedBuild,
  LastUnstableBuild,
  LastUnsuccessfulBuild,
  LastCompletedBuild,
}

impl Builtin {
  pub const ALL: [Builtin; 7] = [
    Builtin::LastBuild,
    Builtin::LastStableBuild,
    Builtin::LastSuccessfulBuild,
    Builtin::LastFailedBuild,
    Builtin::LastUnstableBuild,
    Builtin::LastUnsuccessfulBuild,
    Builtin::LastCompletedBuild,
  ];

  pub fn id(self) -> &'static str {
    match self {
      Builtin::LastBuild => "lastBuild",
      Builtin::LastStableBuild => "lastStableBuild",
      Builtin::LastSuccessfulBuild => "lastSuccessfulBuild",
      Builtin::LastFailedBuild => "lastFailedBuild",
      Builtin::LastUnstableBuild => "lastUnstableBuild",
      Builtin::LastUnsuccessfulBuild => "lastUnsuccessfulBuild",
      Builtin::LastCompletedBuild => "lastCompletedBuild",
    }
  }

  pub fn display_name(self) -> &'static str {
    match self {
      Builtin::LastBuild => "Last build",
      Builtin::LastStableBuild => "Last stable build",
      Builtin::LastSuccessfulBuild => "Last successful build",
      Builtin::LastFailedBuild => "Last failed build",
      Builtin::LastUnstableBuild => "Last unstable build",
      Builtin::LastUnsuccessfulBuild => "Last unsuccessful build",
      Builtin::LastCompletedBuild => "Last completed build",
    }
  }

  pub fn from_id(id: &str) -> Option<Builtin> {
    Builtin::ALL.into_iter().find(|&b| b.id() == id)
  }

  /// Whether a build with this result is picked by the rule.
  pub fn matches(self, result: Option<BuildResult>) -> bool {
    use BuildResult::*;

    match self {
      Builtin::LastBuild => true,
      Builtin::LastStableBuild => result == Some(Success),
      Builtin::LastSuccessfulBuild => matches!(result, Some(Success | Unstable)),
      Builtin::LastFailedBuild => result == Some(Failure),
      Builtin::LastUnstableBuild => result == Some(Unstable),
      Builtin::LastUnsuccessfulBuild => matches!(result, Some(Unstable | Failure | NotBuilt | Aborted)),
      Builtin::LastCompletedBuild => result.is_some(),
    }
  }
}

impl<J> Permalink<J> for Builtin
where
  J: Job + ?Sized,
  J::Run: Outcome,
{
  fn id(&self) -> &str {
    Builtin::id(*self)
  }

  fn display_name(&self) -> &str {
    Builtin::display_name(*self)
  }

  fn resolve(&self, job: &J) -> Result<Option<J::Run>> {
    for run in job.builds() {
      let run = run?;
      if self.matches(run.result()) {
        return Ok(Some(run));
      }
    }
    Ok(None)
  }
}
