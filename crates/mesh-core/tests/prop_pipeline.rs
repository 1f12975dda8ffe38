//! Property-based tests for the field pipeline and form orchestrator
//!
//! These tests verify the invariants that should hold for any input value
//! and any arrangement of built-in steps.

use proptest::prelude::*;

use mesh_core::message::{resolve_template, NoMessages};
use mesh_core::{Field, FieldValue, Form, PredicateRegistry, Record, TraceStatus};

// Strategy functions for property testing

/// Strategy for generating scalar field values
fn field_value_strategy() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        Just(FieldValue::Absent),
        Just(FieldValue::from("")),
        "[ a-zA-Z0-9@._-]{0,24}".prop_map(FieldValue::from),
        (-1000i32..1000).prop_map(FieldValue::from),
        any::<bool>().prop_map(FieldValue::from),
    ]
}

/// Strategy for generating a pipeline of built-in steps that never raise
/// configuration errors
fn field_strategy() -> impl Strategy<Value = Field> {
    let step = prop_oneof![
        Just(("filter", "trim", Vec::<FieldValue>::new())),
        Just(("filter", "lowercase", Vec::<FieldValue>::new())),
        Just(("rule", "not_empty", Vec::<FieldValue>::new())),
        Just(("rule", "min_length", vec![FieldValue::from(3)])),
        Just(("rule", "max_length", vec![FieldValue::from(12)])),
        Just(("rule", "range", vec![FieldValue::from(0), FieldValue::from(100)])),
        Just(("format", "email", Vec::<FieldValue>::new())),
        Just(("format", "alpha_numeric", Vec::<FieldValue>::new())),
        Just(("format", "digit", Vec::<FieldValue>::new())),
    ];
    proptest::collection::vec(step, 0..6).prop_map(|steps| {
        steps
            .into_iter()
            .fold(Field::new("subject"), |field, (kind, id, params)| match kind {
                "filter" => field.filter_with(id, params),
                "rule" => field.rule_with(id, params),
                _ => field.format_with(id, params),
            })
    })
}

proptest! {
    #[test]
    fn prop_optional_empty_value_skips_every_step(field in field_strategy()) {
        prop_assume!(!field.is_required());
        let registry = PredicateRegistry::with_builtins();
        let mut field = field;

        prop_assert!(field.check(&registry, Some(FieldValue::from(""))).unwrap());
        prop_assert_eq!(field.trace().len(), field.steps().len());
        prop_assert!(field.trace().iter().all(|entry| entry.excluded));
    }

    #[test]
    fn prop_short_circuit_and_clean_value_law(field in field_strategy(), value in field_value_strategy()) {
        let registry = PredicateRegistry::with_builtins();
        let mut field = field;
        let passed = field.check(&registry, Some(value)).unwrap();

        prop_assert_eq!(passed, field.errors().is_empty());
        prop_assert_eq!(passed, field.clean_value().is_some());
        prop_assert!(field.errors().len() <= 1);

        if !passed {
            // The failing step is the last executed entry; nothing after it ran
            let last = field.trace().last().unwrap();
            prop_assert!(!last.passed);
            prop_assert!(!last.excluded);
            prop_assert_eq!(&last.identifier, &field.errors()[0].identifier);
            prop_assert!(field.trace().len() <= field.steps().len());
        } else {
            prop_assert_eq!(field.trace().len(), field.steps().len());
        }
    }

    #[test]
    fn prop_check_is_idempotent(field in field_strategy(), value in field_value_strategy()) {
        let registry = PredicateRegistry::with_builtins();
        let mut field = field;

        let first = field.check(&registry, Some(value)).unwrap();
        let errors = field.errors().to_vec();
        let trace = field.trace().to_vec();

        prop_assert_eq!(field.check(&registry, None).unwrap(), first);
        prop_assert_eq!(field.errors(), errors.as_slice());
        prop_assert_eq!(field.trace(), trace.as_slice());
    }

    #[test]
    fn prop_values_overlay_clean_values(
        first in field_value_strategy(),
        second in field_value_strategy(),
        extra in "[a-z]{1,8}",
    ) {
        let mut record = Record::new();
        record.insert("first".into(), first);
        record.insert("second".into(), second);
        record.insert("extra".into(), FieldValue::from(extra.clone()));

        let mut form = Form::new(record.clone());
        form.field(Field::new("first").filter("trim")).unwrap();
        form.field(Field::new("second").filter("uppercase").rule("not_empty")).unwrap();
        form.check().unwrap();

        let values = form.values();
        prop_assert_eq!(values.len(), record.len());
        prop_assert_eq!(&values["extra"], &FieldValue::from(extra));
        for name in ["first", "second"] {
            let field = form.get_field(name).unwrap();
            let expected = field.clean_value().unwrap_or(&record[name]);
            prop_assert_eq!(&values[name], expected);
        }
    }

    #[test]
    fn prop_literal_message_fallback(
        source in "[a-z]{1,8}",
        field in "[a-z_]{1,12}",
        error in "[a-z_]{1,12}",
    ) {
        let message = resolve_template(&NoMessages, Some(source.as_str()), &field, &error);
        prop_assert_eq!(message, format!("{}.{}.{}", source, field, error));
    }

    #[test]
    fn prop_trace_statuses_are_consistent(field in field_strategy(), value in field_value_strategy()) {
        let mut form = Form::new(Record::from_iter([("subject".to_string(), value)]));
        form.field(field).unwrap();
        form.check().unwrap();

        let trace = form.trace();
        let subject = trace.field("subject").unwrap();
        let failures = subject
            .steps
            .iter()
            .filter(|step| step.status == TraceStatus::Failed)
            .count();
        prop_assert!(failures <= 1);
        prop_assert_eq!(subject.passed, failures == 0);
    }
}
