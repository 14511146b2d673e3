//! Collaborator traits consumed by selectors.
//!
//! A selector never owns or mutates builds. It reads them through these
//! traits, which a host implements on top of its own job storage. The
//! [`store`](crate::store) module provides an in-memory implementation.

use crate::error::Result;

/// One execution of a job.
pub trait Run {
  /// Sequential build number, unique within the job.
  fn number(&self) -> u32;

  /// Human-assigned label. Not unique across a job's history.
  fn display_name(&self) -> &str;
}

/// A named rule that picks zero or one build of a job.
pub trait Permalink<J: Job + ?Sized> {
  /// Stable name used to look the permalink up, e.g. `lastSuccessfulBuild`.
  fn id(&self) -> &str;

  /// Human-readable label.
  fn display_name(&self) -> &str;

  /// Resolve the permalink against the job's current builds.
  fn resolve(&self, job: &J) -> Result<Option<J::Run>>;
}

/// A job whose builds can be selected.
pub trait Job {
  /// Handle to one of this job's builds.
  type Run: Run + Clone;

  /// Fully qualified job name, used in diagnostics.
  fn full_name(&self) -> &str;

  /// Look up the build with exactly this number.
  fn build_by_number(&self, number: u32) -> Result<Option<Self::Run>>;

  /// All builds, newest first.
  ///
  /// Enumeration may fail part-way (I/O, interruption); the failure is
  /// yielded in place of the next build.
  fn builds(&self) -> Box<dyn Iterator<Item = Result<Self::Run>> + '_>;

  /// Look up a permalink by its id.
  fn permalink(&self, id: &str) -> Option<&dyn Permalink<Self>>;

  /// Every permalink registered for this job.
  fn permalinks(&self) -> Vec<&dyn Permalink<Self>>;
}
