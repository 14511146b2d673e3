//! Selecting a specific build of a job.
//!
//! A [`SpecificBuildSelector`] holds an identifier that names one build. The
//! identifier goes through three stages on every selection:
//!
//! 1. Expand variables from the [`SelectorContext`]'s environment
//! 2. Classify the result as a build number or a symbolic name
//! 3. Look the build up
//!
//! Symbolic names are tried as a permalink id first. Only when the job has no
//! permalink with that id are display names searched, newest build first.
//!
//! A selector that matches nothing returns `Ok(None)`. Errors are reserved for
//! failing collaborators and identifiers that are empty once expanded.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{Result, SelectError};
use crate::job::{Job, Run};
use crate::placeholder::{EnvVars, Expander};
use crate::registry::SelectorDescriptor;

/// Character that introduces a variable reference.
const VARIABLE_PREFIX: char = '$';

/// Per-selection inputs supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct SelectorContext {
  env: EnvVars,
}

impl SelectorContext {
  pub fn new(env: EnvVars) -> Self {
    Self { env }
  }

  pub fn env(&self) -> &EnvVars {
    &self.env
  }
}

/// How an expanded identifier addresses a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
  /// All digits, within range of a build number.
  Number(u32),

  /// All digits, but too large for any build to carry.
  OutOfRange,

  /// A permalink id or a display name.
  Symbolic,
}

/// Classify an expanded, non-empty identifier.
pub fn classify(identifier: &str) -> IdentifierKind {
  if !identifier.bytes().all(|b| b.is_ascii_digit()) {
    return IdentifierKind::Symbolic;
  }
  match identifier.parse::<u32>() {
    Ok(number) => IdentifierKind::Number(number),
    Err(_) => IdentifierKind::OutOfRange,
  }
}

/// Selects the build named by a number, permalink id, or display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificBuildSelector {
  #[serde(default, deserialize_with = "trimmed")]
  build_number: String,
}

fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
  let value = Option::<String>::deserialize(deserializer)?;
  Ok(value.unwrap_or_default().trim().to_string())
}

impl SpecificBuildSelector {
  pub const SYMBOL: &'static str = "specificRun";

  /// Create a selector. Surrounding whitespace is dropped.
  pub fn new(identifier: impl AsRef<str>) -> Self {
    Self {
      build_number: identifier.as_ref().trim().to_string(),
    }
  }

  /// Create a selector from an optional identifier, treating `None` as empty.
  pub fn from_option(identifier: Option<&str>) -> Self {
    Self::new(identifier.unwrap_or_default())
  }

  /// The identifier as configured, before expansion.
  pub fn identifier(&self) -> &str {
    &self.build_number
  }

  /// Registration metadata for selector menus.
  pub fn descriptor() -> SelectorDescriptor {
    SelectorDescriptor::new(Self::SYMBOL, "Specific build", -10)
  }

  /// Select the build this identifier names.
  ///
  /// # Errors
  ///
  /// Returns [`SelectError::EmptyIdentifier`] if the identifier is blank once
  /// expanded. Failures from expansion or from the job's collaborators are
  /// returned as-is.
  pub fn select<J: Job + ?Sized>(&self, job: &J, context: &SelectorContext) -> Result<Option<J::Run>> {
    self.select_with(job, context.env())
  }

  /// Like [`select`](Self::select), with any variable expander.
  pub fn select_with<J, E>(&self, job: &J, expander: &E) -> Result<Option<J::Run>>
  where
    J: Job + ?Sized,
    E: Expander + ?Sized,
  {
    let identifier = expander.expand(&self.build_number)?;
    if identifier.starts_with(VARIABLE_PREFIX) {
      debug!(identifier = %identifier, job = job.full_name(), "unresolved variable {identifier}");
      return Ok(None);
    }

    if identifier.trim().is_empty() {
      return Err(SelectError::EmptyIdentifier);
    }
    let identifier = identifier.as_str();

    let run = match classify(identifier) {
      IdentifierKind::Number(number) => job.build_by_number(number)?,
      IdentifierKind::OutOfRange => None,
      IdentifierKind::Symbolic => match job.permalink(identifier) {
        Some(permalink) => permalink.resolve(job)?,
        None => find_by_display_name(job, identifier)?,
      },
    };

    if run.is_none() {
      debug!(
        identifier,
        job = job.full_name(),
        "no such build {identifier} in {}",
        job.full_name()
      );
    }
    Ok(run)
  }
}

/// Newest build whose display name is exactly `name`.
fn find_by_display_name<J: Job + ?Sized>(job: &J, name: &str) -> Result<Option<J::Run>> {
  for run in job.builds() {
    let run = run?;
    if run.display_name() == name {
      return Ok(Some(run));
    }
  }
  Ok(None)
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use tracing_test::traced_test;

  use super::*;
  use crate::job::Permalink;
  use crate::permalink::BuildResult::*;
  use crate::placeholder::PlaceholderError;
  use crate::store::{StoredJob, StoredRun};

  fn job() -> StoredJob {
    StoredJob::new(
      "folder/app",
      vec![
        StoredRun::new(1).named("release").finished(Success),
        StoredRun::new(2).named("nightly").finished(Failure),
        StoredRun::new(3).named("release").finished(Failure),
        StoredRun::new(4).named("lastFailedBuild"),
        StoredRun::new(7).named("42").finished(Success),
      ],
    )
    .unwrap()
  }

  fn select(job: &StoredJob, identifier: &str, env: EnvVars) -> Result<Option<u32>> {
    SpecificBuildSelector::new(identifier)
      .select(job, &SelectorContext::new(env))
      .map(|run| run.map(|r| r.number))
  }

  #[test]
  fn classify_modes() {
    assert_eq!(classify("42"), IdentifierKind::Number(42));
    assert_eq!(classify("007"), IdentifierKind::Number(7));
    assert_eq!(classify("4294967296"), IdentifierKind::OutOfRange);
    assert_eq!(classify("-1"), IdentifierKind::Symbolic);
    assert_eq!(classify("+1"), IdentifierKind::Symbolic);
    assert_eq!(classify("1.0"), IdentifierKind::Symbolic);
    assert_eq!(classify("lastBuild"), IdentifierKind::Symbolic);
    assert_eq!(classify("٣"), IdentifierKind::Symbolic);
  }

  #[test]
  fn identifier_is_trimmed_at_construction() {
    assert_eq!(SpecificBuildSelector::new("  12 \n").identifier(), "12");
    assert_eq!(SpecificBuildSelector::from_option(None).identifier(), "");
  }

  #[test]
  fn identifier_is_trimmed_when_deserialized() {
    let selector: SpecificBuildSelector = serde_json::from_str(r#"{ "build_number": " release " }"#).unwrap();
    assert_eq!(selector.identifier(), "release");

    let selector: SpecificBuildSelector = serde_json::from_str(r#"{ "build_number": null }"#).unwrap();
    assert_eq!(selector.identifier(), "");

    let selector: SpecificBuildSelector = serde_json::from_str("{}").unwrap();
    assert_eq!(selector.identifier(), "");
  }

  // ==========================================================================
  // Numeric mode
  // ==========================================================================

  #[test]
  fn number_selects_that_build() {
    let job = job();
    for number in [1, 2, 3, 4, 7] {
      assert_eq!(select(&job, &number.to_string(), EnvVars::new()).unwrap(), Some(number));
    }
  }

  #[test]
  fn missing_number_selects_nothing() {
    let job = job();
    assert_eq!(select(&job, "5", EnvVars::new()).unwrap(), None);
    assert_eq!(select(&job, "0", EnvVars::new()).unwrap(), None);
  }

  #[test]
  fn number_never_falls_back_to_display_name() {
    // build 7 is displayed as "42", but "42" is a number
    let job = job();
    assert_eq!(select(&job, "42", EnvVars::new()).unwrap(), None);
  }

  #[test]
  fn out_of_range_number_selects_nothing() {
    let job = job();
    assert_eq!(select(&job, "99999999999", EnvVars::new()).unwrap(), None);
  }

  #[test]
  fn leading_zeros_are_the_same_number() {
    let job = job();
    assert_eq!(select(&job, "0003", EnvVars::new()).unwrap(), Some(3));
  }

  // ==========================================================================
  // Symbolic mode
  // ==========================================================================

  #[test]
  fn permalink_id_selects_permalink_target() {
    let job = job();
    assert_eq!(select(&job, "lastSuccessfulBuild", EnvVars::new()).unwrap(), Some(7));
    assert_eq!(select(&job, "lastBuild", EnvVars::new()).unwrap(), Some(7));
    assert_eq!(select(&job, "lastFailedBuild", EnvVars::new()).unwrap(), Some(3));
  }

  #[test]
  fn permalink_matches_what_the_permalink_resolves_to() {
    let job = job();
    for permalink in job.permalinks() {
      let expected = permalink.resolve(&job).unwrap().map(|r| r.number);
      assert_eq!(select(&job, permalink.id(), EnvVars::new()).unwrap(), expected);
    }
  }

  #[test]
  fn empty_permalink_does_not_fall_back_to_display_name() {
    let job = StoredJob::new(
      "app",
      vec![StoredRun::new(1).named("lastSuccessfulBuild").finished(Failure)],
    )
    .unwrap();
    assert_eq!(select(&job, "lastSuccessfulBuild", EnvVars::new()).unwrap(), None);
  }

  #[test]
  fn display_name_selects_newest_match() {
    let job = job();
    assert_eq!(select(&job, "release", EnvVars::new()).unwrap(), Some(3));
    assert_eq!(select(&job, "nightly", EnvVars::new()).unwrap(), Some(2));
  }

  #[test]
  fn display_name_match_is_exact() {
    let job = job();
    assert_eq!(select(&job, "Release", EnvVars::new()).unwrap(), None);
    assert_eq!(select(&job, "releas", EnvVars::new()).unwrap(), None);
    assert_eq!(select(&job, "lastbuild", EnvVars::new()).unwrap(), None);
  }

  #[test]
  fn default_display_name_is_selectable() {
    let job = StoredJob::new("app", vec![StoredRun::new(9)]).unwrap();
    assert_eq!(select(&job, "#9", EnvVars::new()).unwrap(), Some(9));
  }

  #[test]
  fn number_and_unique_display_name_agree() {
    let job = job();
    let by_number = select(&job, "2", EnvVars::new()).unwrap();
    let by_name = select(&job, "nightly", EnvVars::new()).unwrap();
    assert_eq!(by_number, by_name);
  }

  // ==========================================================================
  // Variable expansion
  // ==========================================================================

  #[test]
  fn expanded_variable_behaves_like_literal() {
    let job = job();
    let env = EnvVars::new().with("b", "3");
    assert_eq!(select(&job, "$b", env.clone()).unwrap(), select(&job, "3", EnvVars::new()).unwrap());
    assert_eq!(select(&job, "${b}", env).unwrap(), Some(3));
  }

  #[test]
  fn expanded_variable_can_name_a_permalink() {
    let job = job();
    let env = EnvVars::new().with("WHICH", "lastFailedBuild");
    assert_eq!(select(&job, "${WHICH}", env).unwrap(), Some(3));
  }

  #[test]
  #[traced_test]
  fn unresolved_variable_selects_nothing() {
    let job = StoredJob::new("app", vec![StoredRun::new(1).named("${UNSET}")]).unwrap();
    assert_eq!(select(&job, "${UNSET}", EnvVars::new()).unwrap(), None);
    assert!(logs_contain("unresolved variable ${UNSET}"));
  }

  #[test]
  fn partially_unresolved_identifier_is_still_symbolic() {
    let job = StoredJob::new("app", vec![StoredRun::new(1).named("build-$UNSET")]).unwrap();
    assert_eq!(select(&job, "build-$UNSET", EnvVars::new()).unwrap(), Some(1));
  }

  #[test]
  fn escaped_leading_dollar_still_reads_as_unresolved() {
    let job = StoredJob::new("app", vec![StoredRun::new(1).named("$5 build")]).unwrap();
    assert_eq!(select(&job, "$$5 build", EnvVars::new()).unwrap(), None);
  }

  #[test]
  fn padded_variable_value_is_matched_exactly() {
    let job = StoredJob::new(
      "app",
      vec![
        StoredRun::new(5).named("five"),
        StoredRun::new(9).named(" 5"),
        StoredRun::new(11).named("release "),
        StoredRun::new(12).named("release").finished(Success),
      ],
    )
    .unwrap();

    let env = EnvVars::new()
      .with("X", " 5")
      .with("NAME", "release ")
      .with("LINK", "lastBuild ");
    assert_eq!(select(&job, "$X", env.clone()).unwrap(), Some(9));
    assert_eq!(select(&job, "$NAME", env.clone()).unwrap(), Some(11));
    assert_eq!(select(&job, "$LINK", env).unwrap(), None);
  }

  #[test]
  fn expansion_failure_propagates() {
    let job = job();
    let result = select(&job, "${UNCLOSED", EnvVars::new());
    assert!(matches!(result, Err(SelectError::Expand(PlaceholderError::Unclosed(0)))));
  }

  // ==========================================================================
  // Empty identifiers
  // ==========================================================================

  #[test]
  fn empty_identifier_is_rejected() {
    let job = job();
    assert!(matches!(select(&job, "", EnvVars::new()), Err(SelectError::EmptyIdentifier)));
    assert!(matches!(select(&job, "   ", EnvVars::new()), Err(SelectError::EmptyIdentifier)));
  }

  #[test]
  fn identifier_expanding_to_blank_is_rejected() {
    let job = job();
    let env = EnvVars::new().with("BLANK", " ");
    assert!(matches!(select(&job, "$BLANK", env), Err(SelectError::EmptyIdentifier)));
  }

  // ==========================================================================
  // Diagnostics
  // ==========================================================================

  #[test]
  #[traced_test]
  fn missing_number_is_traced_with_job_name() {
    let job = job();
    assert_eq!(select(&job, "55", EnvVars::new()).unwrap(), None);
    assert!(logs_contain("no such build 55 in folder/app"));
  }

  #[test]
  #[traced_test]
  fn missing_name_is_traced_with_job_name() {
    let job = job();
    assert_eq!(select(&job, "beta", EnvVars::new()).unwrap(), None);
    assert!(logs_contain("no such build beta in folder/app"));
  }

  #[test]
  #[traced_test]
  fn found_build_is_not_traced_as_missing() {
    let job = job();
    assert_eq!(select(&job, "release", EnvVars::new()).unwrap(), Some(3));
    assert!(!logs_contain("no such build"));
  }

  // ==========================================================================
  // Failing collaborators
  // ==========================================================================

  #[derive(Debug, Clone)]
  struct Build(u32, &'static str);

  impl Run for Build {
    fn number(&self) -> u32 {
      self.0
    }

    fn display_name(&self) -> &str {
      self.1
    }
  }

  struct BrokenPermalink;

  impl Permalink<FlakyJob> for BrokenPermalink {
    fn id(&self) -> &str {
      "lastGoodBuild"
    }

    fn display_name(&self) -> &str {
      "Last good build"
    }

    fn resolve(&self, _job: &FlakyJob) -> Result<Option<Build>> {
      Err(SelectError::Io(std::io::Error::other("disk gone")))
    }
  }

  /// Yields `good` builds, then fails with an interruption.
  struct FlakyJob {
    good: Vec<Build>,
    enumerated: Cell<usize>,
    permalink: BrokenPermalink,
  }

  impl FlakyJob {
    fn new(good: Vec<Build>) -> Self {
      Self {
        good,
        enumerated: Cell::new(0),
        permalink: BrokenPermalink,
      }
    }
  }

  impl Job for FlakyJob {
    type Run = Build;

    fn full_name(&self) -> &str {
      "flaky"
    }

    fn build_by_number(&self, number: u32) -> Result<Option<Build>> {
      Ok(self.good.iter().find(|b| b.0 == number).cloned())
    }

    fn builds(&self) -> Box<dyn Iterator<Item = Result<Build>> + '_> {
      let good = self.good.iter().cloned().map(move |b| {
        self.enumerated.set(self.enumerated.get() + 1);
        Ok(b)
      });
      Box::new(good.chain(std::iter::once(Err(SelectError::Interrupted))))
    }

    fn permalink(&self, id: &str) -> Option<&dyn Permalink<Self>> {
      (id == "lastGoodBuild").then_some(&self.permalink as &dyn Permalink<Self>)
    }

    fn permalinks(&self) -> Vec<&dyn Permalink<Self>> {
      vec![&self.permalink as &dyn Permalink<Self>]
    }
  }

  #[test]
  fn permalink_failure_propagates() {
    let job = FlakyJob::new(vec![Build(1, "lastGoodBuild")]);
    let result = SpecificBuildSelector::new("lastGoodBuild").select(&job, &SelectorContext::default());
    assert!(matches!(result, Err(SelectError::Io(ref e)) if e.to_string() == "disk gone"));
  }

  #[test]
  fn enumeration_failure_propagates() {
    let job = FlakyJob::new(vec![Build(2, "b"), Build(1, "a")]);
    let result = SpecificBuildSelector::new("missing").select(&job, &SelectorContext::default());
    assert!(matches!(result, Err(SelectError::Interrupted)));
    assert_eq!(job.enumerated.get(), 2);
  }

  #[test]
  fn enumeration_stops_at_first_match() {
    let job = FlakyJob::new(vec![Build(3, "x"), Build(2, "x"), Build(1, "y")]);
    let run = SpecificBuildSelector::new("x")
      .select(&job, &SelectorContext::default())
      .unwrap();
    assert_eq!(run.map(|r| r.0), Some(3));
    assert_eq!(job.enumerated.get(), 1);
  }

  #[test]
  fn custom_expander_is_used() {
    struct Upper;

    impl Expander for Upper {
      fn expand(&self, input: &str) -> std::result::Result<String, PlaceholderError> {
        Ok(input.to_uppercase())
      }
    }

    let job = FlakyJob::new(vec![Build(1, "RC")]);
    let run = SpecificBuildSelector::new("rc").select_with(&job, &Upper).unwrap();
    assert_eq!(run.map(|r| r.0), Some(1));
  }
}
