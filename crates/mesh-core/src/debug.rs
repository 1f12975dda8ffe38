//! Read-only export of the last check's per-step trace
//!
//! Each step is reported with a status: skipped steps are `Skipped`, formats
//! and rules are `Passed` or `Failed`, and filters and callbacks, which carry
//! no verdict of their own, are `NotApplicable`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::Field;
use crate::types::{FieldValue, StepKind, TraceEntry};

/// Outcome of one executed (or skipped) step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStatus {
    Skipped,
    Passed,
    Failed,
    NotApplicable,
}

impl TraceStatus {
    pub fn of(entry: &TraceEntry) -> Self {
        if entry.excluded {
            TraceStatus::Skipped
        } else if entry.kind.is_predicate() {
            if entry.passed {
                TraceStatus::Passed
            } else {
                TraceStatus::Failed
            }
        } else {
            TraceStatus::NotApplicable
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TraceStatus::Skipped => "SKIPPED",
            TraceStatus::Passed => "PASSED",
            TraceStatus::Failed => "FAILED",
            TraceStatus::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for TraceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a field trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTrace {
    pub kind: StepKind,
    pub identifier: String,
    pub value: FieldValue,
    pub status: TraceStatus,
}

/// Trace of a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTrace {
    pub field: String,
    pub label: String,
    pub passed: bool,
    pub steps: Vec<StepTrace>,
}

impl FieldTrace {
    pub fn from_field(field: &Field, label: &str) -> Self {
        Self {
            field: field.name().to_string(),
            label: label.to_string(),
            passed: field.errors().is_empty(),
            steps: field
                .trace()
                .iter()
                .map(|entry| StepTrace {
                    kind: entry.kind,
                    identifier: entry.identifier.clone(),
                    value: entry.value.clone(),
                    status: TraceStatus::of(entry),
                })
                .collect(),
        }
    }
}

/// Trace of every field in a form, in registration order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormTrace {
    pub passed: bool,
    pub fields: Vec<FieldTrace>,
}

impl FormTrace {
    pub fn field(&self, name: &str) -> Option<&FieldTrace> {
        self.fields.iter().find(|trace| trace.field == name)
    }
}

impl fmt::Display for FormTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in &self.fields {
            writeln!(f, "{} ({})", field.field, field.label)?;
            for step in &field.steps {
                writeln!(
                    f,
                    "  {:<8} {:<16} {:<24} {}",
                    step.kind.as_str(),
                    step.identifier,
                    format!("{:?}", step.value.to_string()),
                    step.status
                )?;
            }
        }
        Ok(())
    }
}
