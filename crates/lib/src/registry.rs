//! Registry of build selectors offered to users.
//!
//! The host tool owns a [`SelectorRegistry`] and registers the selectors it
//! wants to offer. Each entry is keyed by a stable short symbol and carries an
//! explicit priority that orders the selection menu: higher priorities come
//! first, ties are broken by symbol.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::selector::SpecificBuildSelector;

/// Errors that can occur while registering selectors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
  #[error("a selector named '{0}' is already registered")]
  Duplicate(String),
}

/// Registration metadata for one selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorDescriptor {
  /// Stable short name, e.g. `specificRun`.
  pub symbol: String,

  /// Label shown in selection menus.
  pub display_name: String,

  /// Menu position; higher sorts first.
  pub priority: i32,
}

impl SelectorDescriptor {
  pub fn new(symbol: impl Into<String>, display_name: impl Into<String>, priority: i32) -> Self {
    Self {
      symbol: symbol.into(),
      display_name: display_name.into(),
      priority,
    }
  }
}

/// Selectors known to the host, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct SelectorRegistry {
  entries: BTreeMap<String, SelectorDescriptor>,
}

impl SelectorRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// A registry holding the selectors this crate provides.
  pub fn with_builtin() -> Result<Self, RegistryError> {
    let mut registry = Self::new();
    registry.register(SpecificBuildSelector::descriptor())?;
    Ok(registry)
  }

  /// Register a selector.
  ///
  /// # Errors
  ///
  /// Returns [`RegistryError::Duplicate`] if the symbol is already taken.
  pub fn register(&mut self, descriptor: SelectorDescriptor) -> Result<(), RegistryError> {
    if self.entries.contains_key(&descriptor.symbol) {
      return Err(RegistryError::Duplicate(descriptor.symbol));
    }
    debug!(symbol = %descriptor.symbol, priority = descriptor.priority, "registered selector");
    self.entries.insert(descriptor.symbol.clone(), descriptor);
    Ok(())
  }

  pub fn get(&self, symbol: &str) -> Option<&SelectorDescriptor> {
    self.entries.get(symbol)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Descriptors in menu order.
  pub fn menu(&self) -> Vec<&SelectorDescriptor> {
    let mut menu: Vec<_> = self.entries.values().collect();
    // BTreeMap iteration is already by symbol, so a stable sort keeps ties ordered.
    menu.sort_by(|a, b| b.priority.cmp(&a.priority));
    menu
  }
}
