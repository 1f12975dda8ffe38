//! Core data types for the Mesh validation engine
//!
//! This module defines the working value threaded through a pipeline, the
//! pipeline steps themselves, recorded errors and the per-step trace.
//!
//! Copyright (c) 2025 Mesh Team
//! Licensed under the MIT license

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered record of raw field values keyed by field name
pub type Record = IndexMap<String, FieldValue>;

/// A value moving through a field pipeline.
///
/// Filters may change the variant (`to_number` turns a string into a number),
/// and formats/rules branch on it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// No value supplied
    #[default]
    Absent,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Whether the value counts as empty for skip and `not_empty` purposes.
    ///
    /// Absent, the empty string and the empty list are empty. `"0"`, `0` and
    /// `false` are values.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Absent => true,
            FieldValue::String(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Bool(_) | FieldValue::Number(_) => false,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    /// Borrow the string content, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value: numbers directly, strings when they parse
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Text used by string predicates. Lists and absent values render empty.
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::String(s) => s.clone(),
            FieldValue::Absent | FieldValue::List(_) => String::new(),
            other => other.to_string(),
        }
    }

    /// Length in characters (items for lists)
    pub fn char_len(&self) -> usize {
        match self {
            FieldValue::List(items) => items.len(),
            other => other.to_text().chars().count(),
        }
    }

    /// Name of the variant, used in trace output and conversion messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Absent => "absent",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Number(_) => "number",
            FieldValue::String(_) => "string",
            FieldValue::List(_) => "list",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Absent => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|item| item.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Absent)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Absent,
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Number(n) => FieldValue::Number(n.as_f64().unwrap_or_default()),
            serde_json::Value::String(s) => FieldValue::String(s),
            serde_json::Value::Array(items) => {
                FieldValue::List(items.into_iter().map(FieldValue::from).collect())
            }
            // Nested objects have no place in a flat record; keep their JSON text
            serde_json::Value::Object(map) => {
                FieldValue::String(serde_json::Value::Object(map).to_string())
            }
        }
    }
}

impl From<FieldValue> for serde_json::Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Absent => serde_json::Value::Null,
            FieldValue::Bool(b) => serde_json::Value::Bool(b),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => {
                serde_json::Value::from(n as i64)
            }
            FieldValue::Number(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::String(s) => serde_json::Value::String(s),
            FieldValue::List(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
        }
    }
}

/// The four kinds of pipeline step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Value transform
    Filter,
    /// Format predicate (email, url, ...)
    Format,
    /// Rule predicate (not_empty, length, ...)
    Rule,
    /// Side-effecting hook that may record errors
    Callback,
}

impl StepKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Filter => "filter",
            StepKind::Format => "format",
            StepKind::Rule => "rule",
            StepKind::Callback => "callback",
        }
    }

    /// Whether the step produces a pass/fail verdict
    pub fn is_predicate(self) -> bool {
        matches!(self, StepKind::Format | StepKind::Rule)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in a field's pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub kind: StepKind,
    pub identifier: String,
    #[serde(default)]
    pub params: Vec<FieldValue>,
    #[serde(default)]
    pub excluded: bool,
}

impl PipelineStep {
    pub fn new(kind: StepKind, identifier: impl Into<String>, params: Vec<FieldValue>) -> Self {
        Self {
            kind,
            identifier: identifier.into(),
            params,
            excluded: false,
        }
    }
}

/// An error recorded against a field: the failing identifier and its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub identifier: String,
    #[serde(default)]
    pub params: Vec<FieldValue>,
}

impl FieldError {
    pub fn new(identifier: impl Into<String>, params: Vec<FieldValue>) -> Self {
        Self {
            identifier: identifier.into(),
            params,
        }
    }
}

/// One step-execution record from the last `check()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Field the step belongs to
    pub field: String,
    pub kind: StepKind,
    pub identifier: String,
    /// Working value as the step received it
    pub value: FieldValue,
    pub passed: bool,
    /// True when the step was skipped (excluded, or empty optional value)
    pub excluded: bool,
}
