//! Check reports
//!
//! Serializable summaries of checked forms, shared by every output format.

use crate::logging::redaction;
use mesh_core::{FieldError, Form, FormTrace, MessageOptions, Record};
use serde::{Deserialize, Serialize};

/// Result of checking one or more records against a definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub run_id: String,
    pub passed: bool,
    pub total: usize,
    pub failed: usize,
    pub records: Vec<RecordReport>,
}

/// Result for a single record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordReport {
    pub index: usize,
    pub passed: bool,
    pub fields: Vec<FieldReport>,
    /// The record with clean values merged in
    pub values: Record,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<FormTrace>,
}

/// Result for a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldReport {
    pub name: String,
    pub label: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// What to include when summarizing a checked form
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub messages: MessageOptions,
    pub trace: bool,
    pub reveal: bool,
}

impl RecordReport {
    /// Summarize a form after `check()`
    pub fn from_form(index: usize, form: &mut Form, options: &ReportOptions) -> Self {
        let names: Vec<String> = form.field_names().map(str::to_string).collect();

        let fields = names
            .into_iter()
            .map(|name| {
                let errors = form.errors(&name).map(<[FieldError]>::to_vec).unwrap_or_default();
                let message = form.message_with(&name, &options.messages);
                FieldReport {
                    label: form.label(&name).unwrap_or(&name).to_string(),
                    passed: errors.is_empty(),
                    errors,
                    message,
                    name,
                }
            })
            .collect();

        let mut values = form.values();
        let mut trace = options.trace.then(|| form.trace());
        if !options.reveal {
            redaction::redact_record(&mut values);
            if let Some(trace) = trace.as_mut() {
                redaction::redact_trace(trace);
            }
        }

        Self {
            index,
            passed: form.passed(),
            fields,
            values,
            trace,
        }
    }
}

impl CheckReport {
    pub fn new(run_id: impl Into<String>, records: Vec<RecordReport>) -> Self {
        let failed = records.iter().filter(|record| !record.passed).count();
        Self {
            run_id: run_id.into(),
            passed: failed == 0,
            total: records.len(),
            failed,
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_core::{Field, FieldValue};

    fn checked_form(password: &str) -> Form {
        let mut record = Record::new();
        record.insert("email".into(), FieldValue::from(" a@b.com "));
        record.insert("password".into(), FieldValue::from(password));

        let mut form = Form::new(record);
        form.field(Field::new("email").filter("trim").format("email"))
            .unwrap();
        form.field_with_label(Field::new("password").rule_with("min_length", [8]), "Password")
            .unwrap();
        form.check().unwrap();
        form
    }

    #[test]
    fn test_record_report_collects_fields() {
        let mut form = checked_form("short");
        let report = RecordReport::from_form(0, &mut form, &ReportOptions::default());

        assert!(!report.passed);
        assert_eq!(report.fields.len(), 2);
        assert!(report.fields[0].passed);
        assert_eq!(report.fields[0].message, None);
        assert_eq!(report.fields[1].label, "Password");
        assert_eq!(report.fields[1].errors[0].identifier, "min_length");
        assert_eq!(report.fields[1].message.as_deref(), Some(".password.min_length"));
        assert_eq!(report.values["email"], FieldValue::from("a@b.com"));
        assert_eq!(report.values["password"], FieldValue::from(redaction::REDACTED));
        assert!(report.trace.is_none());
    }

    #[test]
    fn test_reveal_and_trace() {
        let mut form = checked_form("long enough");
        let options = ReportOptions {
            trace: true,
            reveal: true,
            ..ReportOptions::default()
        };
        let report = RecordReport::from_form(3, &mut form, &options);

        assert!(report.passed);
        assert_eq!(report.index, 3);
        assert_eq!(report.values["password"], FieldValue::from("long enough"));
        assert!(report.trace.unwrap().field("password").is_some());
    }

    #[test]
    fn test_check_report_counts() {
        let mut failing = checked_form("short");
        let mut passing = checked_form("long enough");
        let options = ReportOptions::default();

        let report = CheckReport::new(
            "run_test",
            vec![
                RecordReport::from_form(0, &mut failing, &options),
                RecordReport::from_form(1, &mut passing, &options),
            ],
        );
        assert!(!report.passed);
        assert_eq!(report.total, 2);
        assert_eq!(report.failed, 1);
    }
}
