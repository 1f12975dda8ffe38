//! Tests for the form orchestrator
//!
//! Copyright (c) 2025 Mesh Team
//! Licensed under the MIT license

use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::message::{MessageCatalog, TranslationTable};

fn record(pairs: &[(&str, FieldValue)]) -> Record {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

fn signup_form(email: &str, age: &str) -> Form {
    let mut form = Form::new(record(&[
        ("email", FieldValue::from(email)),
        ("age", FieldValue::from(age)),
        ("newsletter", FieldValue::from("yes")),
    ]));
    form.field(Field::new("email").rule("not_empty").format("email"))
        .unwrap();
    form.field_with_label(
        Field::new("age").filter("trim").rule_with("range", [18, 65]),
        "Age",
    )
    .unwrap();
    form
}

#[test]
fn test_check_runs_every_field() {
    let mut form = signup_form("not-an-email", " 70 ");
    assert!(!form.check().unwrap());
    assert!(!form.passed());

    assert_eq!(form.error("email"), Some("email"));
    assert_eq!(form.error("age"), Some("range"));
}

#[test]
fn test_one_failing_field_keeps_other_clean_value() {
    let mut form = signup_form("a@b.com", " 70 ");
    assert!(!form.check().unwrap());

    assert!(form.errors("email").unwrap().is_empty());
    assert_eq!(form.error("email"), None);

    let values = form.values();
    assert_eq!(values["email"], FieldValue::from("a@b.com"));
    assert_eq!(values["age"], FieldValue::from(" 70 "));
    assert_eq!(values["newsletter"], FieldValue::from("yes"));
}

#[test]
fn test_passing_form_overlays_clean_values() {
    let mut form = signup_form("a@b.com", " 42 ");
    assert!(form.check().unwrap());

    let values = form.values();
    assert_eq!(values["age"], FieldValue::from("42"));
    assert_eq!(form.raw_values()["age"], FieldValue::from(" 42 "));

    let keys: Vec<&str> = values.keys().map(String::as_str).collect();
    assert_eq!(keys, ["email", "age", "newsletter"]);
}

#[test]
fn test_value_prefers_clean_value_only_when_passed() {
    let mut form = signup_form("a@b.com", " 42 ");
    assert_eq!(form.value("age"), &FieldValue::from(" 42 "));

    form.check().unwrap();
    assert_eq!(form.value("age"), &FieldValue::from("42"));
    assert_eq!(form.value("newsletter"), &FieldValue::from("yes"));
    assert_eq!(form.value("missing"), &FieldValue::Absent);

    let mut failing = signup_form("bad", " 42 ");
    failing.check().unwrap();
    assert_eq!(failing.value("age"), &FieldValue::from(" 42 "));
}

#[test]
fn test_value_or_default() {
    let form = signup_form("a@b.com", "30");
    assert_eq!(form.value_or("country", "GB"), FieldValue::from("GB"));
    assert_eq!(form.value_or("newsletter", "no"), FieldValue::from("yes"));
}

#[test]
fn test_mutation_invalidates_passed() {
    let mut form = signup_form("a@b.com", "30");
    assert!(form.check().unwrap());

    form.set_value("age", "12");
    assert!(!form.passed());
    assert_eq!(form.raw_values()["age"], FieldValue::from("12"));
    assert!(!form.check().unwrap());

    form.set_values(record(&[("age", FieldValue::from("40"))]), ValuesMode::Append);
    assert!(!form.passed());
    assert!(form.check().unwrap());
    assert_eq!(form.raw_values().len(), 3);
}

#[test]
fn test_exchange_replaces_record() {
    let mut form = signup_form("a@b.com", "30");
    form.set_values(record(&[("email", FieldValue::from("c@d.org"))]), ValuesMode::Exchange);

    assert_eq!(form.raw_values().len(), 1);
    // age is now absent but optional
    assert!(form.check().unwrap());
    assert!(form.errors("age").unwrap().is_empty());
    assert_eq!(form.values().get("newsletter"), None);
}

#[test]
fn test_set_values_drops_stale_clean_values() {
    let mut form = signup_form("a@b.com", " 30 ");
    assert!(form.check().unwrap());
    assert_eq!(form.values()["age"], FieldValue::from("30"));

    form.set_values(record(&[("email", FieldValue::from("not-an-email"))]), ValuesMode::Exchange);
    assert_eq!(form.values()["email"], FieldValue::from("not-an-email"));
    assert_eq!(form.values().get("age"), None);

    let mut form = signup_form("a@b.com", " 30 ");
    assert!(form.check().unwrap());
    form.set_values(record(&[("age", FieldValue::from(" 99 "))]), ValuesMode::Append);
    assert_eq!(form.values()["age"], FieldValue::from(" 99 "));

    assert!(!form.check().unwrap());
    assert_eq!(form.values()["age"], FieldValue::from(" 99 "));
}

#[test]
fn test_check_is_idempotent() {
    let mut form = signup_form("nope", " 70 ");
    let first = form.check().unwrap();
    let errors = form.errors("age").unwrap().to_vec();
    assert_eq!(form.check().unwrap(), first);
    assert_eq!(form.errors("age").unwrap(), errors.as_slice());
}

#[test]
fn test_unknown_identifier_rejected_at_registration() {
    let mut form = Form::default();
    let err = form
        .field(Field::new("zip").format("postcode"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Configuration error: unknown format 'postcode'");
    assert!(form.get_field("zip").is_none());
    assert!(form.label("zip").is_none());
}

#[test]
fn test_reregistration_overwrites() {
    let mut form = signup_form("", "30");
    form.field(Field::new("email").format("email")).unwrap();
    assert_eq!(form.field_names().collect::<Vec<_>>(), ["email", "age"]);
    assert_eq!(form.label("email"), Some("email"));

    // email is no longer required
    assert!(form.check().unwrap());
}

#[test]
fn test_labels() {
    let mut form = signup_form("a@b.com", "30");
    assert_eq!(form.label("age"), Some("Age"));
    assert_eq!(form.get_field("age").unwrap().label(), "Age");

    form.set_label("email", "Email address");
    assert_eq!(form.label("email"), Some("Email address"));
    assert_eq!(form.get_field("email").unwrap().label(), "Email address");
}

#[test]
fn test_errors_for_unknown_field() {
    let form = signup_form("a@b.com", "30");
    assert!(form.errors("nope").is_none());
    assert!(form.error("nope").is_none());
}

#[test]
fn test_selected() {
    let mut form = signup_form("a@b.com", "30");
    form.check().unwrap();

    assert!(form.selected("newsletter", &FieldValue::from("yes"), None));
    assert!(!form.selected("newsletter", &FieldValue::from("no"), None));
    assert!(form.selected(
        "country",
        &FieldValue::from("GB"),
        Some(&FieldValue::from("GB"))
    ));
}

#[test]
fn test_message_literal_fallback_without_templates() {
    let mut form = signup_form("", "30").with_message_source("signup");
    form.check().unwrap();
    assert_eq!(form.message("email").as_deref(), Some("signup.email.not_empty"));
    assert_eq!(form.message("age"), None);
    assert_eq!(form.message("nope"), None);
}

#[test]
fn test_message_resolution_and_substitution() {
    let mut catalog = MessageCatalog::with_defaults();
    catalog.insert("signup", json!({ "email": { "email": "Please check :field" } }));

    let mut form = signup_form("nope", " 70 ")
        .with_message_source("signup")
        .with_messages(Arc::new(catalog));
    form.check().unwrap();

    assert_eq!(form.message("email").as_deref(), Some("Please check email"));
    assert_eq!(
        form.message("age").as_deref(),
        Some("Age must be within the range of 18 to 65")
    );
}

#[test]
fn test_message_cache_survives_check_until_reset() {
    let mut form = signup_form("", "30").with_message_source("signup");
    form.check().unwrap();
    assert_eq!(form.message("email").as_deref(), Some("signup.email.not_empty"));

    form.set_value("email", "nope");
    form.check().unwrap();
    assert_eq!(form.message("email").as_deref(), Some("signup.email.not_empty"));

    form.reset_messages();
    assert_eq!(form.message("email").as_deref(), Some("signup.email.email"));
}

#[test]
fn test_message_with_overrides_source_and_refreshes_cache() {
    let mut form = signup_form("", "30").with_message_source("signup");
    form.check().unwrap();
    form.message("email");

    let options = MessageOptions::new().source("account");
    assert_eq!(
        form.message_with("email", &options).as_deref(),
        Some("account.email.not_empty")
    );
    assert_eq!(form.message("email").as_deref(), Some("account.email.not_empty"));
}

#[test]
fn test_last_error_message_wins() {
    let mut registry = PredicateRegistry::with_builtins();
    registry.register_callback("flag_twice", |field, _value, _params| {
        field.error("first", vec![]);
        field.error("second", vec![]);
        Ok(())
    });

    let mut form = Form::new(record(&[("code", FieldValue::from("x"))]))
        .with_registry(Arc::new(registry))
        .with_message_source("codes");
    form.field(Field::new("code").callback("flag_twice")).unwrap();
    form.check().unwrap();

    assert_eq!(form.error("code"), Some("second"));
    assert_eq!(form.message("code").as_deref(), Some("codes.code.second"));
}

#[test]
fn test_translation_happens_before_substitution() {
    let mut translations = TranslationTable::new();
    translations.insert(
        "fr",
        ":field must be within the range of :param1 to :param2",
        ":field doit être entre :param1 et :param2",
    );

    let mut form = signup_form("a@b.com", "99")
        .with_messages(Arc::new(MessageCatalog::with_defaults()))
        .with_translator(Arc::new(translations));
    form.check().unwrap();

    let french = MessageOptions::new().locale("fr");
    assert_eq!(
        form.message_with("age", &french).as_deref(),
        Some("Age doit être entre 18 et 65")
    );

    let untranslated = MessageOptions::new().locale("fr").translate(false);
    assert_eq!(
        form.message_with("age", &untranslated).as_deref(),
        Some("Age must be within the range of 18 to 65")
    );
}

#[test]
fn test_messages_collects_failing_fields() {
    let mut form = signup_form("", " 70 ").with_message_source("signup");
    form.check().unwrap();

    let messages = form.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages["email"], "signup.email.not_empty");
    assert_eq!(messages["age"], "signup.age.range");

    let mut replaced = IndexMap::new();
    replaced.insert("email".to_string(), "custom".to_string());
    form.set_messages(replaced);
    assert_eq!(form.message("email").as_deref(), Some("custom"));
}

#[test]
fn test_exclude_through_form() {
    let mut form = signup_form("", "30");
    form.get_field_mut("email").unwrap().exclude("not_empty");
    assert!(form.check().unwrap());
}

#[test]
fn test_trace_export() {
    let mut form = signup_form("", "30");
    form.check().unwrap();

    let trace = form.trace();
    assert!(!trace.passed);
    let email = trace.field("email").unwrap();
    assert_eq!(email.steps.len(), 1);
    assert!(!email.passed);
    assert_eq!(trace.field("age").unwrap().label, "Age");
}
