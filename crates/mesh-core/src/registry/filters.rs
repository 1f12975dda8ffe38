//! Built-in filters
//!
//! Filters transform the working value. String transforms apply element-wise
//! to lists and leave other variants untouched; conversions report
//! [`Error::Conversion`] when the input cannot be represented.

use crate::error::{Error, Result};
use crate::types::FieldValue;

use super::PredicateRegistry;

pub const TRIM: &str = "trim";
pub const LTRIM: &str = "ltrim";
pub const RTRIM: &str = "rtrim";
pub const LOWERCASE: &str = "lowercase";
pub const UPPERCASE: &str = "uppercase";
pub const STRIP_WHITESPACE: &str = "strip_whitespace";
pub const TO_NUMBER: &str = "to_number";
pub const TO_BOOL: &str = "to_bool";

pub(crate) fn register_builtins(registry: &mut PredicateRegistry) {
    registry
        .register_filter(TRIM, |value, _| Ok(map_text(value, |s| s.trim().to_string())))
        .register_filter(LTRIM, |value, _| Ok(map_text(value, |s| s.trim_start().to_string())))
        .register_filter(RTRIM, |value, _| Ok(map_text(value, |s| s.trim_end().to_string())))
        .register_filter(LOWERCASE, |value, _| Ok(map_text(value, str::to_lowercase)))
        .register_filter(UPPERCASE, |value, _| Ok(map_text(value, str::to_uppercase)))
        .register_filter(STRIP_WHITESPACE, |value, _| {
            Ok(map_text(value, |s| s.chars().filter(|c| !c.is_whitespace()).collect()))
        })
        .register_filter(TO_NUMBER, |value, _| to_number(value))
        .register_filter(TO_BOOL, |value, _| to_bool(value));
}

/// Apply a string transform to strings, recursing into lists
pub fn map_text<F>(value: &FieldValue, f: F) -> FieldValue
where
    F: Fn(&str) -> String + Copy,
{
    match value {
        FieldValue::String(s) => FieldValue::String(f(s)),
        FieldValue::List(items) => {
            FieldValue::List(items.iter().map(|item| map_text(item, f)).collect())
        }
        other => other.clone(),
    }
}

/// Convert to a number
pub fn to_number(value: &FieldValue) -> Result<FieldValue> {
    match value {
        FieldValue::Number(n) => Ok(FieldValue::Number(*n)),
        FieldValue::Bool(b) => Ok(FieldValue::Number(if *b { 1.0 } else { 0.0 })),
        FieldValue::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(FieldValue::Number)
            .ok_or_else(|| Error::conversion(TO_NUMBER, format!("'{}' is not numeric", s))),
        other => Err(Error::conversion(
            TO_NUMBER,
            format!("cannot convert {} to number", other.type_name()),
        )),
    }
}

/// Convert to a boolean using the usual yes/no spellings
pub fn to_bool(value: &FieldValue) -> Result<FieldValue> {
    match value {
        FieldValue::Bool(b) => Ok(FieldValue::Bool(*b)),
        FieldValue::Number(n) => Ok(FieldValue::Bool(*n != 0.0)),
        FieldValue::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(FieldValue::Bool(true)),
            "false" | "no" | "0" | "off" => Ok(FieldValue::Bool(false)),
            _ => Err(Error::conversion(TO_BOOL, format!("'{}' is not a boolean", s))),
        },
        other => Err(Error::conversion(
            TO_BOOL,
            format!("cannot convert {} to boolean", other.type_name()),
        )),
    }
}
