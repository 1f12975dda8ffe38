//! Built-in rule predicates

use crate::error::Result;
use crate::types::FieldValue;

use super::{params, PredicateRegistry};

pub const NOT_EMPTY: &str = "not_empty";
pub const LENGTH: &str = "length";
pub const MIN_LENGTH: &str = "min_length";
pub const MAX_LENGTH: &str = "max_length";
pub const EXACT_LENGTH: &str = "exact_length";
pub const RANGE: &str = "range";
pub const MATCHES: &str = "matches";

pub(crate) fn register_builtins(registry: &mut PredicateRegistry) {
    registry
        .register_rule(NOT_EMPTY, |value, _| Ok(not_empty(value)))
        .register_rule(LENGTH, |value, p| {
            let min = params::count(LENGTH, p, 0)?;
            let max = params::count(LENGTH, p, 1)?;
            let len = value.char_len();
            Ok(len >= min && len <= max)
        })
        .register_rule(MIN_LENGTH, |value, p| {
            Ok(value.char_len() >= params::count(MIN_LENGTH, p, 0)?)
        })
        .register_rule(MAX_LENGTH, |value, p| {
            Ok(value.char_len() <= params::count(MAX_LENGTH, p, 0)?)
        })
        .register_rule(EXACT_LENGTH, |value, p| {
            Ok(value.char_len() == params::count(EXACT_LENGTH, p, 0)?)
        })
        .register_rule(RANGE, range)
        .register_rule(MATCHES, matches);
}

/// Anything but absent, `""` or `[]`
pub fn not_empty(value: &FieldValue) -> bool {
    !value.is_empty()
}

/// Inclusive numeric range. Values without a numeric view fail.
pub fn range(value: &FieldValue, p: &[FieldValue]) -> Result<bool> {
    let min = params::number(RANGE, p, 0)?;
    let max = params::number(RANGE, p, 1)?;
    Ok(value.as_f64().is_some_and(|n| n >= min && n <= max))
}

/// Equality against another value.
///
/// Takes either `(label, other)`, where the label only feeds the message
/// placeholders, or a single `(other)`.
pub fn matches(value: &FieldValue, p: &[FieldValue]) -> Result<bool> {
    let other = match p.len() {
        0 | 1 => params::required(MATCHES, p, 0)?,
        _ => &p[1],
    };
    Ok(value == other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::types::StepKind;

    fn rule(id: &str, value: impl Into<FieldValue>, p: &[FieldValue]) -> Result<bool> {
        PredicateRegistry::with_builtins().apply_predicate(StepKind::Rule, id, &value.into(), p)
    }

    #[test]
    fn test_not_empty() {
        assert!(not_empty(&FieldValue::from("0")));
        assert!(not_empty(&FieldValue::from(false)));
        assert!(!not_empty(&FieldValue::from("")));
        assert!(!not_empty(&FieldValue::Absent));
        assert!(!not_empty(&FieldValue::List(vec![])));
    }

    #[test]
    fn test_lengths_count_characters() {
        let two_four = [FieldValue::from(2), FieldValue::from(4)];
        assert!(rule(LENGTH, "äöü", &two_four).unwrap());
        assert!(!rule(LENGTH, "a", &two_four).unwrap());
        assert!(rule(MIN_LENGTH, "abc", &[FieldValue::from(3)]).unwrap());
        assert!(!rule(MAX_LENGTH, "abcd", &[FieldValue::from(3)]).unwrap());
        assert!(rule(EXACT_LENGTH, "ñandú", &[FieldValue::from(5)]).unwrap());
    }

    #[test]
    fn test_length_requires_both_bounds() {
        let err = rule(LENGTH, "abc", &[FieldValue::from(2)]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_range() {
        let bounds = [FieldValue::from(18), FieldValue::from(65)];
        assert!(range(&FieldValue::from("18"), &bounds).unwrap());
        assert!(range(&FieldValue::from(65), &bounds).unwrap());
        assert!(!range(&FieldValue::from("70"), &bounds).unwrap());
        assert!(!range(&FieldValue::from("old"), &bounds).unwrap());
        assert!(range(&FieldValue::from(1), &bounds[..1]).is_err());
    }

    #[test]
    fn test_matches_uses_second_parameter_when_labelled() {
        let labelled = [FieldValue::from("Password"), FieldValue::from("s3cret")];
        assert!(matches(&FieldValue::from("s3cret"), &labelled).unwrap());
        assert!(!matches(&FieldValue::from("Password"), &labelled).unwrap());

        assert!(matches(&FieldValue::from("x"), &[FieldValue::from("x")]).unwrap());
        assert!(matches(&FieldValue::from("x"), &[]).is_err());
    }
}
