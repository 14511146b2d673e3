//! Error types for build selection.

use thiserror::Error;

use crate::placeholder::PlaceholderError;

/// Errors that can terminate a selection.
///
/// A build that simply doesn't exist is not an error; selectors report that
/// as `Ok(None)`.
#[derive(Debug, Error)]
pub enum SelectError {
  /// The identifier could not be expanded.
  #[error("failed to expand identifier: {0}")]
  Expand(#[from] PlaceholderError),

  /// The identifier was empty once expanded.
  #[error("build identifier is empty")]
  EmptyIdentifier,

  /// A job, run, or permalink failed to read its data.
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  /// The selection was interrupted by the host.
  #[error("interrupted while selecting a build")]
  Interrupted,
}

/// Result type for selection operations
pub type Result<T> = std::result::Result<T, SelectError>;
