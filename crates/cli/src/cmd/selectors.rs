use anyhow::Result;

use runsel_lib::registry::SelectorRegistry;

use crate::output::{OutputFormat, print_json, symbols};

pub fn cmd_selectors(format: OutputFormat) -> Result<()> {
  let registry = SelectorRegistry::with_builtin()?;
  let menu = registry.menu();

  if format.is_json() {
    return print_json(&menu);
  }

  for descriptor in menu {
    println!(
      "{} {} ({}, priority {})",
      symbols::ARROW,
      descriptor.display_name,
      descriptor.symbol,
      descriptor.priority
    );
  }
  Ok(())
}
