//! Step parameter accessors
//!
//! Built-in predicates read their parameters positionally. A missing or
//! mistyped parameter is a configuration problem, never a validation failure.

use crate::error::{Error, Result};
use crate::types::FieldValue;

/// Required parameter at `index`
pub fn required<'a>(
    identifier: &str,
    params: &'a [FieldValue],
    index: usize,
) -> Result<&'a FieldValue> {
    match params.get(index) {
        Some(value) if !value.is_absent() => Ok(value),
        _ => Err(Error::configuration(
            identifier,
            format!("'{}' expects parameter {}", identifier, index + 1),
        )),
    }
}

/// Optional parameter at `index`; absent values count as missing
pub fn optional(params: &[FieldValue], index: usize) -> Option<&FieldValue> {
    params.get(index).filter(|value| !value.is_absent())
}

/// Required numeric parameter
pub fn number(identifier: &str, params: &[FieldValue], index: usize) -> Result<f64> {
    let value = required(identifier, params, index)?;
    value.as_f64().ok_or_else(|| {
        Error::configuration(
            identifier,
            format!(
                "'{}' parameter {} must be a number, got {}",
                identifier,
                index + 1,
                value.type_name()
            ),
        )
    })
}

/// Required non-negative integer parameter (lengths, decimal places)
pub fn count(identifier: &str, params: &[FieldValue], index: usize) -> Result<usize> {
    let n = number(identifier, params, index)?;
    if n < 0.0 || n.fract() != 0.0 {
        return Err(Error::configuration(
            identifier,
            format!(
                "'{}' parameter {} must be a non-negative integer, got {}",
                identifier,
                index + 1,
                n
            ),
        ));
    }
    Ok(n as usize)
}

/// Optional non-negative integer parameter with a default
pub fn count_or(
    identifier: &str,
    params: &[FieldValue],
    index: usize,
    default: usize,
) -> Result<usize> {
    match optional(params, index) {
        Some(_) => count(identifier, params, index),
        None => Ok(default),
    }
}

/// Optional boolean flag with a default
pub fn flag(identifier: &str, params: &[FieldValue], index: usize, default: bool) -> Result<bool> {
    match optional(params, index) {
        None => Ok(default),
        Some(FieldValue::Bool(b)) => Ok(*b),
        Some(other) => Err(Error::configuration(
            identifier,
            format!(
                "'{}' parameter {} must be a boolean, got {}",
                identifier,
                index + 1,
                other.type_name()
            ),
        )),
    }
}

/// Required string parameter
pub fn text<'a>(identifier: &str, params: &'a [FieldValue], index: usize) -> Result<&'a str> {
    let value = required(identifier, params, index)?;
    value.as_str().ok_or_else(|| {
        Error::configuration(
            identifier,
            format!(
                "'{}' parameter {} must be a string, got {}",
                identifier,
                index + 1,
                value.type_name()
            ),
        )
    })
}
