//! In-memory message catalogs
//!
//! Each catalog is a JSON tree. Keys are looked up first as a literal
//! top-level key, then as a dotted path into nested objects, so both
//! `{"email.not_empty": ".."}` and `{"email": {"not_empty": ".."}}` resolve
//! `email.not_empty`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

use super::{MessageSource, FORMAT_CATALOG, RULE_CATALOG, VALIDATE_CATALOG};

/// Named template trees
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageCatalog {
    catalogs: IndexMap<String, Value>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with English templates for the built-in rules,
    /// formats and conversion filters
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        catalog.insert(RULE_CATALOG, defaults(DEFAULT_RULES));
        catalog.insert(FORMAT_CATALOG, defaults(DEFAULT_FORMATS));
        catalog.insert(VALIDATE_CATALOG, defaults(DEFAULT_VALIDATE));
        catalog
    }

    /// Parse a JSON document whose top-level keys are catalog names
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Build from a JSON object whose top-level keys are catalog names
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self {
                catalogs: map.into_iter().collect(),
            }),
            other => Err(Error::Configuration {
                message: format!("message catalogs must be an object, got {}", kind_of(&other)),
                identifier: None,
            }),
        }
    }

    /// Replace one catalog
    pub fn insert(&mut self, name: impl Into<String>, tree: Value) -> &mut Self {
        self.catalogs.insert(name.into(), tree);
        self
    }

    /// Deep-merge another set of catalogs; entries in `other` win
    pub fn merge(&mut self, other: MessageCatalog) -> &mut Self {
        for (name, tree) in other.catalogs {
            match self.catalogs.get_mut(&name) {
                Some(existing) => merge_values(existing, tree),
                None => {
                    self.catalogs.insert(name, tree);
                }
            }
        }
        self
    }

    /// Catalog names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.catalogs.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}

impl MessageSource for MessageCatalog {
    fn lookup(&self, catalog: &str, key: &str) -> Option<String> {
        let tree = self.catalogs.get(catalog)?;
        if let Some(Value::String(template)) = tree.get(key) {
            return Some(template.clone());
        }
        let mut node = tree;
        for segment in key.split('.') {
            node = node.get(segment)?;
        }
        node.as_str().map(str::to_string)
    }
}

fn merge_values(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn defaults(entries: &[(&str, &str)]) -> Value {
    let map: Map<String, Value> = entries
        .iter()
        .map(|(key, template)| (key.to_string(), Value::String(template.to_string())))
        .collect();
    Value::Object(map)
}

const DEFAULT_RULES: &[(&str, &str)] = &[
    ("not_empty", ":field must not be empty"),
    ("length", ":field must be between :param1 and :param2 characters long"),
    ("min_length", ":field must be at least :param1 characters long"),
    ("max_length", ":field must not exceed :param1 characters long"),
    ("exact_length", ":field must be exactly :param1 characters long"),
    ("range", ":field must be within the range of :param1 to :param2"),
    ("matches", ":field must be the same as :param1"),
];

const DEFAULT_FORMATS: &[(&str, &str)] = &[
    ("alpha", ":field must contain only letters"),
    ("alpha_space", ":field must contain only letters and spaces"),
    ("alpha_numeric", ":field must contain only letters and numbers"),
    ("alpha_dash", ":field must contain only letters, numbers, underscores and dashes"),
    ("digit", ":field must be a whole number"),
    ("numeric", ":field must be numeric"),
    ("decimal", ":field must be a decimal with :param1 places"),
    ("color", ":field must be a color"),
    ("credit_card", ":field must be a valid credit card number"),
    ("phone", ":field must be a phone number"),
    ("date", ":field must be a date in the form yyyy-mm-dd"),
    ("email", ":field must be an email address"),
    ("email_domain", ":field must contain a valid email domain"),
    ("ip", ":field must be an ip address"),
    ("url", ":field must be a url"),
    ("regex", ":field does not match the required format"),
    ("username", ":field may contain only letters, numbers and underscores"),
    ("name", ":field may contain only letters, spaces, dashes and apostrophes"),
    ("text", ":field contains characters that are not allowed"),
];

const DEFAULT_VALIDATE: &[(&str, &str)] = &[
    ("to_number", ":field must be a number"),
    ("to_bool", ":field must be yes or no"),
];
