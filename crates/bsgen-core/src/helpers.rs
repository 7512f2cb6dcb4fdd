//! Helpers callable from placeholder expressions.
//!
//! The registry is an immutable map from helper name to a pure string
//! function. A [`crate::Renderer`] receives one at construction and registers
//! every entry as a tera filter on its own engine instance.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::Value as JsonValue;

use crate::{case::Case, inflect};

/// A pure string transform exposed to templates
pub type HelperFn = fn(&str) -> String;

/// Immutable mapping of helper names to transforms
#[derive(Clone)]
pub struct HelperRegistry {
    helpers: BTreeMap<String, HelperFn>,
}

impl HelperRegistry {
    /// An empty registry
    pub fn empty() -> Self {
        Self {
            helpers: BTreeMap::new(),
        }
    }

    /// The standard helpers: every [`Case`] plus `plural`
    pub fn standard() -> Self {
        Self::empty()
            .with("lower", |s| Case::Lower.apply(s))
            .with("upper", |s| Case::Upper.apply(s))
            .with("capitalize", |s| Case::Capitalize.apply(s))
            .with("camel", |s| Case::Camel.apply(s))
            .with("pascal", |s| Case::Pascal.apply(s))
            .with("snake", |s| Case::Snake.apply(s))
            .with("constant", |s| Case::Constant.apply(s))
            .with("kebab", |s| Case::Kebab.apply(s))
            .with("words", |s| Case::Words.apply(s))
            .with("plural", inflect::plural)
    }

    /// Return a registry extended with one more helper
    pub fn with(mut self, name: impl Into<String>, helper: HelperFn) -> Self {
        self.helpers.insert(name.into(), helper);
        self
    }

    /// Look up a helper by name
    pub fn get(&self, name: &str) -> Option<HelperFn> {
        self.helpers.get(name).copied()
    }

    /// Check if a helper exists
    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    /// Names of all registered helpers
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.helpers.keys().map(String::as_str)
    }

    /// Iterate over `(name, helper)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, HelperFn)> {
        self.helpers.iter().map(|(name, helper)| (name.as_str(), *helper))
    }
}

impl fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl Default for HelperRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// A helper adapted to tera's filter interface
pub(crate) struct HelperFilter(pub(crate) HelperFn);

impl tera::Filter for HelperFilter {
    fn filter(&self, value: &JsonValue, _args: &HashMap<String, JsonValue>) -> tera::Result<JsonValue> {
        let input = match value {
            JsonValue::String(s) => s.clone(),
            JsonValue::Null => String::new(),
            other => other.to_string(),
        };
        Ok(JsonValue::String((self.0)(&input)))
    }
}
