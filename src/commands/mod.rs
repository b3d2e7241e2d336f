// src/commands/mod.rs
//! Command handlers for the cookbook CLI

mod cook;
mod validate;

pub use cook::cmd_cook;
pub use validate::cmd_validate;

use anyhow::{bail, Result};
use cookbook::OptionValue;
use std::collections::BTreeMap;

/// Split a `NAME=VALUE` argument
pub(crate) fn parse_key_value(arg: &str) -> Result<(String, String)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => bail!("Expected NAME=VALUE, got '{}'", arg),
    }
}

/// Collect `-o NAME=VALUE` arguments into an override map
///
/// Values stay text; each option's domain decides whether they are
/// booleans. A later value for the same option replaces an earlier one.
pub(crate) fn parse_overrides(args: &[String]) -> Result<BTreeMap<String, OptionValue>> {
    let mut overrides = BTreeMap::new();
    for arg in args {
        let (name, value) = parse_key_value(arg)?;
        overrides.insert(name, OptionValue::Text(value));
    }
    Ok(overrides)
}
