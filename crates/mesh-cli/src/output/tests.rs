// Tests for report formatting and the output writer

use super::*;
use crate::report::{FieldReport, RecordReport};
use mesh_core::{FieldError, FieldValue, Record};
use std::sync::{Arc, Mutex};

/// A writer whose contents can be read back after the `OutputWriter` owns it
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let writer = OutputWriter::with_writer(format, false, quiet, Box::new(buffer.clone()));
    (writer, buffer)
}

fn sample_record(index: usize, passed: bool) -> RecordReport {
    let mut values = Record::new();
    values.insert("email".into(), FieldValue::from("a@b.com"));
    values.insert("age".into(), FieldValue::from(70));
    values.insert("nickname".into(), FieldValue::Absent);

    let age = if passed {
        FieldReport {
            name: "age".into(),
            label: "Age".into(),
            passed: true,
            errors: vec![],
            message: None,
        }
    } else {
        FieldReport {
            name: "age".into(),
            label: "Age".into(),
            passed: false,
            errors: vec![FieldError::new("range", vec![FieldValue::from(18), FieldValue::from(65)])],
            message: Some("Age must be within the range of 18 to 65".into()),
        }
    };

    RecordReport {
        index,
        passed,
        fields: vec![
            FieldReport {
                name: "email".into(),
                label: "email".into(),
                passed: true,
                errors: vec![],
                message: None,
            },
            age,
        ],
        values,
        trace: None,
    }
}

#[test]
fn test_human_report_single_record() {
    let report = CheckReport::new("run_1", vec![sample_record(0, false)]);
    let formatted = format_check_report_human(&report);

    assert!(!formatted.contains("═══ Record"));
    assert!(formatted.contains("✓ email\n"));
    assert!(formatted.contains("✗ age (Age): Age must be within the range of 18 to 65"));
    assert!(formatted.contains("Values:\n  email: \"a@b.com\"\n  age: 70\n  nickname: -\n"));
}

#[test]
fn test_human_report_batch_headers() {
    let report = CheckReport::new("run_2", vec![sample_record(0, true), sample_record(1, false)]);
    let formatted = format_check_report_human(&report);

    assert!(formatted.contains("═══ Record 1 ═══"));
    assert!(formatted.contains("═══ Record 2 ═══"));
    assert_eq!(formatted.matches("✗").count(), 1);
}

#[test]
fn test_failure_without_message_shows_identifier() {
    let mut record = sample_record(0, false);
    record.fields[1].message = None;
    let formatted = format_record_human(&record);
    assert!(formatted.contains("✗ age (Age): range"));
}

#[test]
fn test_machine_formats() {
    let report = CheckReport::new("run_3", vec![sample_record(0, false)]);

    let json: serde_json::Value =
        serde_json::from_str(&OutputFormat::Json.format_check_report(&report).unwrap()).unwrap();
    assert_eq!(json["run_id"], "run_3");
    assert_eq!(json["passed"], false);
    assert_eq!(json["records"][0]["fields"][1]["errors"][0]["identifier"], "range");
    assert!(json["records"][0]["fields"][0].get("message").is_none());

    let yaml = OutputFormat::Yaml.format_check_report(&report).unwrap();
    let parsed: CheckReport = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed, report);

    let pretty = OutputFormat::JsonPretty.format_check_report(&report).unwrap();
    assert!(pretty.contains("\n  \"run_id\": \"run_3\""));
}

#[test]
fn test_writer_check_report_and_messages() {
    let (mut output, buffer) = writer(OutputFormat::Human, false);
    let report = CheckReport::new("run_4", vec![sample_record(0, true)]);

    output.info("Checking 1 record").unwrap();
    output.check_report(&report).unwrap();
    output.success("All records passed").unwrap();

    let contents = buffer.contents();
    assert!(contents.starts_with("INFO: Checking 1 record\n"));
    assert!(contents.contains("✓ age (Age)"));
    assert!(contents.ends_with("All records passed\n"));
}

#[test]
fn test_quiet_and_machine_writers_skip_chatter() {
    let (mut quiet, quiet_buffer) = writer(OutputFormat::Human, true);
    quiet.info("hidden").unwrap();
    quiet.success("hidden").unwrap();
    assert!(quiet_buffer.contents().is_empty());

    let (mut json, json_buffer) = writer(OutputFormat::Json, false);
    json.info("hidden").unwrap();
    json.warning("hidden").unwrap();
    json.data(&serde_json::json!({ "ok": true })).unwrap();
    assert_eq!(json_buffer.contents(), "{\"ok\":true}");
}

#[test]
fn test_table() {
    let (mut output, buffer) = writer(OutputFormat::Human, false);
    output
        .table(
            &["Kind", "Identifier"],
            vec![
                vec!["filter".into(), "trim".into()],
                vec!["format".into(), "credit_card".into()],
            ],
        )
        .unwrap();

    let contents = buffer.contents();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "Kind   │ Identifier ");
    assert_eq!(lines[2], "filter │ trim       ");
    assert_eq!(lines[3], "format │ credit_card");
}

#[test]
fn test_no_progress_bar_for_custom_writers() {
    let (output, _) = writer(OutputFormat::Human, false);
    assert!(output.progress_bar(10, "checking").is_none());
    assert!(default_progress_style().is_some());
}
