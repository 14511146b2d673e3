//! Variable expansion for build identifiers.
//!
//! Identifiers handed to a selector may reference variables from the calling
//! pipeline step. This module parses those references and substitutes values
//! from an environment mapping.
//!
//! # Variable Formats
//!
//! - `${NAME}` - value of `NAME`
//! - `$NAME` - value of `NAME`, where the name is the longest run of
//!   `[A-Za-z0-9_]` following the `$`
//!
//! Undefined variables are left verbatim, so `${UNSET}` expands to `${UNSET}`.
//! Substituted values are never expanded a second time.
//!
//! # Escaping
//!
//! `$$` produces a literal `$`. A lone `$` that is not followed by a name or
//! `{` is literal as well.
//!
//! # Example
//!
//! ```
//! use runsel_lib::placeholder::{parse, Segment, Variable};
//!
//! let segments = parse("build-${BRANCH}").unwrap();
//! assert_eq!(segments, vec![
//!     Segment::Literal("build-".to_string()),
//!     Segment::Variable(Variable { name: "BRANCH".to_string(), braced: true }),
//! ]);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A parsed variable reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
  pub name: String,

  /// Written as `${NAME}` rather than `$NAME`.
  pub braced: bool,
}

impl Variable {
  /// The reference exactly as it appeared in the input.
  pub fn source(&self) -> String {
    if self.braced {
      format!("${{{}}}", self.name)
    } else {
      format!("${}", self.name)
    }
  }
}

/// A segment of parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal text (no variables)
  Literal(String),

  /// A variable to be substituted
  Variable(Variable),
}

/// Errors that can occur during variable parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PlaceholderError {
  #[error("unclosed variable reference at position {0}")]
  Unclosed(usize),

  #[error("empty variable name at position {0}")]
  EmptyName(usize),
}

/// Something that can substitute variables in a string.
pub trait Expander {
  /// Expand every variable reference in `input`.
  fn expand(&self, input: &str) -> Result<String, PlaceholderError>;
}

/// An environment mapping used to expand identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVars(BTreeMap<String, String>);

impl EnvVars {
  pub fn new() -> Self {
    Self::default()
  }

  /// Snapshot of the current process environment.
  ///
  /// Variables whose name or value is not valid Unicode are skipped.
  pub fn from_process() -> Self {
    std::env::vars_os()
      .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
      .collect()
  }

  pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.insert(name, value);
    self
  }

  pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.0.insert(name.into(), value.into());
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.0.get(name).map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl FromIterator<(String, String)> for EnvVars {
  fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

impl Extend<(String, String)> for EnvVars {
  fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
    self.0.extend(iter);
  }
}

impl Expander for EnvVars {
  fn expand(&self, input: &str) -> Result<String, PlaceholderError> {
    let segments = parse(input)?;
    Ok(substitute_segments(&segments, self))
  }
}

fn is_name_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_'
}

/// Parse a string containing variable references into segments.
///
/// # Errors
///
/// Returns an error if a `${` reference is never closed or has an empty name.
pub fn parse(input: &str) -> Result<Vec<Segment>, PlaceholderError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    if ch != '$' {
      literal.push(ch);
      continue;
    }

    match chars.peek() {
      Some((_, '$')) => {
        // Escaped: $$ -> $
        chars.next();
        literal.push('$');
      }
      Some((_, '{')) => {
        chars.next(); // consume the {

        let mut name = String::new();
        let mut found_close = false;

        for (_, c) in chars.by_ref() {
          if c == '}' {
            found_close = true;
            break;
          }
          name.push(c);
        }

        if !found_close {
          return Err(PlaceholderError::Unclosed(pos));
        }
        if name.is_empty() {
          return Err(PlaceholderError::EmptyName(pos));
        }

        if !literal.is_empty() {
          segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Variable(Variable { name, braced: true }));
      }
      Some((_, c)) if is_name_char(*c) => {
        let mut name = String::new();
        while let Some((_, c)) = chars.peek().copied()
          && is_name_char(c)
        {
          name.push(c);
          chars.next();
        }

        if !literal.is_empty() {
          segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Variable(Variable { name, braced: false }));
      }
      _ => {
        // Lone $ (end of input, or followed by something that can't start a name)
        literal.push('$');
      }
    }
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

/// Substitute variables in pre-parsed segments.
///
/// Undefined variables are written back in their original form.
pub fn substitute_segments(segments: &[Segment], env: &EnvVars) -> String {
  let mut result = String::new();

  for segment in segments {
    match segment {
      Segment::Literal(s) => result.push_str(s),
      Segment::Variable(var) => match env.get(&var.name) {
        Some(value) => result.push_str(value),
        None => result.push_str(&var.source()),
      },
    }
  }

  result
}
