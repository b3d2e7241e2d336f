// src/recipe/options.rs

//! Recipe options: bounded-domain knobs with defaults
//!
//! Every option declares an explicit [`OptionDomain`]. The default is
//! checked against the domain when the option is declared, so a declared
//! option can never carry an illegal default. User overrides are checked
//! when they are resolved, and resolution either yields a complete
//! [`ResolvedOptions`] or an error.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A single option value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Text(String),
}

impl OptionValue {
    /// Read `true`/`false` in any case as a boolean
    pub fn parse_bool(s: &str) -> Option<bool> {
        match s.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    /// Convert a TOML value from a recipe file
    pub fn from_toml(value: &toml::Value) -> Option<Self> {
        match value {
            toml::Value::Boolean(b) => Some(Self::Bool(*b)),
            toml::Value::String(s) => Some(Self::Text(s.clone())),
            toml::Value::Integer(i) => Some(Self::Text(i.to_string())),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// The finite set of legal values for an option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum OptionDomain {
    /// `{true, false}`
    Boolean,
    /// An explicit, non-empty list of text choices
    Choice(Vec<String>),
}

impl OptionDomain {
    /// Build a choice domain, rejecting empty and repeated choices
    pub fn choice<I, S>(name: &str, choices: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
        if choices.is_empty() {
            return Err(ConfigurationError::InvalidDomain {
                name: name.to_string(),
                reason: "domain has no values".to_string(),
            });
        }
        let mut seen = BTreeSet::new();
        for choice in &choices {
            if !seen.insert(choice.as_str()) {
                return Err(ConfigurationError::InvalidDomain {
                    name: name.to_string(),
                    reason: format!("value '{}' is listed twice", choice),
                });
            }
        }
        Ok(Self::Choice(choices))
    }

    /// Build a domain from the raw value list of a recipe file
    ///
    /// A list made only of booleans is the boolean domain (it must contain
    /// both `true` and `false`); a list made only of strings (or integers)
    /// is a choice domain. Mixed lists are rejected.
    pub fn from_values(name: &str, values: &[toml::Value]) -> Result<Self, ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidDomain {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if values.is_empty() {
            return Err(invalid("domain has no values"));
        }

        if values.iter().all(|v| v.is_bool()) {
            let has_true = values.iter().any(|v| v.as_bool() == Some(true));
            let has_false = values.iter().any(|v| v.as_bool() == Some(false));
            if has_true && has_false && values.len() == 2 {
                return Ok(Self::Boolean);
            }
            return Err(invalid("a boolean domain must list true and false exactly once"));
        }

        let mut choices = Vec::with_capacity(values.len());
        for value in values {
            match OptionValue::from_toml(value) {
                Some(OptionValue::Text(s)) => choices.push(s),
                _ => return Err(invalid("values must all be booleans or all be strings")),
            }
        }
        Self::choice(name, choices)
    }

    /// Check membership
    pub fn contains(&self, value: &OptionValue) -> bool {
        match (self, value) {
            (Self::Boolean, OptionValue::Bool(_)) => true,
            (Self::Choice(choices), OptionValue::Text(s)) => choices.iter().any(|c| c == s),
            _ => false,
        }
    }

    /// Coerce a loosely typed value into this domain's representation
    ///
    /// Text `"True"` becomes a boolean only for a boolean domain; choice
    /// domains keep text exactly as given. A boolean becomes its text form
    /// for a choice domain. Membership is still checked separately.
    pub fn coerce(&self, value: &OptionValue) -> OptionValue {
        match (self, value) {
            (Self::Boolean, OptionValue::Text(s)) => match OptionValue::parse_bool(s) {
                Some(b) => OptionValue::Bool(b),
                None => value.clone(),
            },
            (Self::Choice(_), OptionValue::Bool(b)) => OptionValue::Text(b.to_string()),
            _ => value.clone(),
        }
    }

    /// First legal value, used when a recipe declares no default
    ///
    /// `None` for an empty choice list.
    pub fn first(&self) -> Option<OptionValue> {
        match self {
            Self::Boolean => Some(OptionValue::Bool(false)),
            Self::Choice(choices) => choices.first().cloned().map(OptionValue::Text),
        }
    }
}

impl fmt::Display for OptionDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "[true, false]"),
            Self::Choice(choices) => write!(f, "[{}]", choices.join(", ")),
        }
    }
}

/// A declared option
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionDecl {
    pub name: String,
    pub domain: OptionDomain,
    pub default: OptionValue,
    /// CMake variable the resolved value is forwarded to, if any
    pub forward: Option<String>,
}

/// The set of options a recipe declares
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionSet {
    decls: BTreeMap<String, OptionDecl>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an option
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        domain: OptionDomain,
        default: impl Into<OptionValue>,
    ) -> Result<(), ConfigurationError> {
        let name = name.into();
        if self.decls.contains_key(&name) {
            return Err(ConfigurationError::DuplicateOption(name));
        }

        let default = domain.coerce(&default.into());
        if !domain.contains(&default) {
            return Err(ConfigurationError::InvalidDefault {
                value: default.to_string(),
                domain: domain.to_string(),
                name,
            });
        }

        self.decls.insert(
            name.clone(),
            OptionDecl {
                name,
                domain,
                default,
                forward: None,
            },
        );
        Ok(())
    }

    /// Forward an already declared option to a CMake variable
    pub fn forward(&mut self, name: &str, variable: &str) -> Result<(), ConfigurationError> {
        if !is_cmake_identifier(variable) {
            return Err(ConfigurationError::InvalidVariable(variable.to_string()));
        }
        let decl = self
            .decls
            .get_mut(name)
            .ok_or_else(|| ConfigurationError::UnknownOption(name.to_string()))?;
        decl.forward = Some(variable.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&OptionDecl> {
        self.decls.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.decls.contains_key(name)
    }

    /// Declarations in name order
    pub fn iter(&self) -> impl Iterator<Item = &OptionDecl> {
        self.decls.values()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Overlay overrides onto the declared defaults
    ///
    /// Every override is validated before anything is built, so a failure
    /// never exposes a partially applied map.
    pub fn resolve(
        &self,
        overrides: &BTreeMap<String, OptionValue>,
    ) -> Result<ResolvedOptions, ConfigurationError> {
        let mut checked = BTreeMap::new();
        for (name, value) in overrides {
            let decl = self
                .decls
                .get(name)
                .ok_or_else(|| ConfigurationError::UnknownOption(name.clone()))?;
            let value = decl.domain.coerce(value);
            if !decl.domain.contains(&value) {
                return Err(ConfigurationError::InvalidOptionValue {
                    name: name.clone(),
                    value: value.to_string(),
                    domain: decl.domain.to_string(),
                });
            }
            checked.insert(name.as_str(), value);
        }

        let mut values = BTreeMap::new();
        let mut forwards = BTreeMap::new();
        for decl in self.decls.values() {
            let value = checked
                .remove(decl.name.as_str())
                .unwrap_or_else(|| decl.default.clone());
            if let Some(variable) = &decl.forward {
                forwards.insert(decl.name.clone(), variable.clone());
            }
            values.insert(decl.name.clone(), value);
        }

        Ok(ResolvedOptions { values, forwards })
    }
}

/// Validated option values for one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedOptions {
    values: BTreeMap<String, OptionValue>,
    /// option name -> CMake variable
    forwards: BTreeMap<String, String>,
}

impl ResolvedOptions {
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// All values, keyed by option name
    pub fn values(&self) -> &BTreeMap<String, OptionValue> {
        &self.values
    }

    /// `(variable, value)` pairs for the options forwarded to the build tool,
    /// ordered by option name
    pub fn forwarded(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.forwards.iter().filter_map(|(name, variable)| {
            self.values
                .get(name)
                .map(|value| (variable.as_str(), value))
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Whether `s` is a plain CMake identifier (`[A-Za-z_][A-Za-z0-9_]*`)
pub fn is_cmake_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
