//! Field pipeline engine
//!
//! A [`Field`] owns one ordered pipeline of steps plus the validation state
//! from its most recent [`Field::check`]: the dirty (input) value, the clean
//! value, recorded errors and the per-step trace.
//!
//! Execution rules:
//!
//! - Steps run in insertion order against a working value that filters may
//!   replace.
//! - A step is skipped when it is excluded, or when the working value is empty
//!   and the field is not required. Skipped steps still appear in the trace.
//! - After any step that leaves the field with errors, execution stops.
//! - The clean value is set only when the run finished without errors.
//!
//! # Examples
//!
//! ```
//! use mesh_core::{Field, FieldValue, PredicateRegistry};
//!
//! let registry = PredicateRegistry::with_builtins();
//! let mut age = Field::new("age")
//!     .filter("trim")
//!     .rule_with("range", [18, 65]);
//!
//! assert!(!age.check(&registry, Some(FieldValue::from(" 70 "))).unwrap());
//! assert_eq!(age.errors()[0].identifier, "range");
//!
//! assert!(age.check(&registry, Some(FieldValue::from(" 42 "))).unwrap());
//! assert_eq!(age.clean_value(), Some(&FieldValue::from("42")));
//! ```
//!
//! Copyright (c) 2025 Mesh Team
//! Licensed under the MIT license


use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::registry::rules::NOT_EMPTY;
use crate::registry::Registry;
use crate::types::{FieldError, FieldValue, PipelineStep, StepKind, TraceEntry};

/// One named attribute with its pipeline and validation state
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    label: String,
    required: bool,
    steps: Vec<PipelineStep>,
    dirty: FieldValue,
    clean: Option<FieldValue>,
    errors: Vec<FieldError>,
    trace: Vec<TraceEntry>,
}

impl Field {
    /// Create a field with an empty pipeline; the label defaults to the name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            required: false,
            steps: Vec::new(),
            dirty: FieldValue::Absent,
            clean: None,
            errors: Vec::new(),
            trace: Vec::new(),
        }
    }

    /// Set the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Append a step. Adding an active `not_empty` rule makes the field required.
    pub fn step(mut self, step: PipelineStep) -> Self {
        self.push_step(step);
        self
    }

    /// Append a filter without parameters
    pub fn filter(self, identifier: impl Into<String>) -> Self {
        self.step(PipelineStep::new(StepKind::Filter, identifier, Vec::new()))
    }

    /// Append a filter with parameters
    pub fn filter_with<P>(self, identifier: impl Into<String>, params: P) -> Self
    where
        P: IntoIterator,
        P::Item: Into<FieldValue>,
    {
        self.step(PipelineStep::new(StepKind::Filter, identifier, collect(params)))
    }

    /// Append a format without parameters
    pub fn format(self, identifier: impl Into<String>) -> Self {
        self.step(PipelineStep::new(StepKind::Format, identifier, Vec::new()))
    }

    /// Append a format with parameters
    pub fn format_with<P>(self, identifier: impl Into<String>, params: P) -> Self
    where
        P: IntoIterator,
        P::Item: Into<FieldValue>,
    {
        self.step(PipelineStep::new(StepKind::Format, identifier, collect(params)))
    }

    /// Append a rule without parameters
    pub fn rule(self, identifier: impl Into<String>) -> Self {
        self.step(PipelineStep::new(StepKind::Rule, identifier, Vec::new()))
    }

    /// Append a rule with parameters
    pub fn rule_with<P>(self, identifier: impl Into<String>, params: P) -> Self
    where
        P: IntoIterator,
        P::Item: Into<FieldValue>,
    {
        self.step(PipelineStep::new(StepKind::Rule, identifier, collect(params)))
    }

    /// Append a callback without parameters
    pub fn callback(self, identifier: impl Into<String>) -> Self {
        self.step(PipelineStep::new(StepKind::Callback, identifier, Vec::new()))
    }

    /// Append a callback with parameters
    pub fn callback_with<P>(self, identifier: impl Into<String>, params: P) -> Self
    where
        P: IntoIterator,
        P::Item: Into<FieldValue>,
    {
        self.step(PipelineStep::new(StepKind::Callback, identifier, collect(params)))
    }

    /// Append several filters as `(identifier, params)` pairs
    pub fn filters<I, S>(self, filters: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<FieldValue>)>,
        S: Into<String>,
    {
        self.steps_of(StepKind::Filter, filters)
    }

    /// Append several formats as `(identifier, params)` pairs
    pub fn formats<I, S>(self, formats: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<FieldValue>)>,
        S: Into<String>,
    {
        self.steps_of(StepKind::Format, formats)
    }

    /// Append several rules as `(identifier, params)` pairs
    pub fn rules<I, S>(self, rules: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<FieldValue>)>,
        S: Into<String>,
    {
        self.steps_of(StepKind::Rule, rules)
    }

    /// Append several callbacks as `(identifier, params)` pairs
    pub fn callbacks<I, S>(self, callbacks: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<FieldValue>)>,
        S: Into<String>,
    {
        self.steps_of(StepKind::Callback, callbacks)
    }

    fn steps_of<I, S>(mut self, kind: StepKind, steps: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<FieldValue>)>,
        S: Into<String>,
    {
        for (identifier, params) in steps {
            self.push_step(PipelineStep::new(kind, identifier, params));
        }
        self
    }

    fn push_step(&mut self, step: PipelineStep) {
        if is_not_empty_rule(&step) && !step.excluded {
            self.required = true;
        }
        self.steps.push(step);
    }

    /// Disable every step with this identifier. Excluding `not_empty` makes
    /// the field optional again.
    pub fn exclude(&mut self, identifier: &str) -> &mut Self {
        for step in self.steps.iter_mut().filter(|s| s.identifier == identifier) {
            step.excluded = true;
        }
        if identifier == NOT_EMPTY {
            self.required = false;
        }
        self
    }

    /// Re-enable every step with this identifier
    pub fn include(&mut self, identifier: &str) -> &mut Self {
        for step in self.steps.iter_mut().filter(|s| s.identifier == identifier) {
            step.excluded = false;
        }
        if self.steps.iter().any(is_not_empty_rule) && identifier == NOT_EMPTY {
            self.required = true;
        }
        self
    }

    /// Run the pipeline.
    ///
    /// `value` replaces the stored dirty value when given. Returns whether the
    /// run finished without validation errors; configuration problems
    /// (unknown identifiers, malformed parameters) are returned as `Err`.
    pub fn check(&mut self, registry: &dyn Registry, value: Option<FieldValue>) -> Result<bool> {
        if let Some(value) = value {
            self.dirty = value;
        }
        self.errors.clear();
        self.trace.clear();
        self.clean = None;

        let mut working = self.dirty.clone();
        // Callbacks borrow the field mutably, so iterate over a copy
        let steps = self.steps.clone();

        for step in &steps {
            if step.excluded || (working.is_empty() && !self.required) {
                trace!(
                    field = %self.name,
                    kind = %step.kind,
                    step = %step.identifier,
                    "step skipped"
                );
                self.record(step, working.clone(), false, true);
                continue;
            }

            let snapshot = working.clone();
            let passed = match self.run_step(registry, step, &mut working) {
                Ok(passed) => passed,
                Err(e) => {
                    warn!(field = %self.name, step = %step.identifier, error = %e, "pipeline aborted");
                    return Err(e);
                }
            };
            trace!(
                field = %self.name,
                kind = %step.kind,
                step = %step.identifier,
                passed,
                "step executed"
            );
            self.record(step, snapshot, passed, false);

            if !self.errors.is_empty() {
                break;
            }
        }

        let passed = self.errors.is_empty();
        if passed {
            self.clean = Some(working);
        }
        debug!(
            field = %self.name,
            passed,
            errors = self.errors.len(),
            "field checked"
        );
        Ok(passed)
    }

    fn run_step(
        &mut self,
        registry: &dyn Registry,
        step: &PipelineStep,
        working: &mut FieldValue,
    ) -> Result<bool> {
        match step.kind {
            StepKind::Filter => {
                match registry.apply_filter(&step.identifier, working, &step.params) {
                    Ok(value) => {
                        *working = value;
                        Ok(true)
                    }
                    Err(Error::Conversion { message, .. }) => {
                        debug!(field = %self.name, filter = %step.identifier, %message, "conversion failed");
                        self.error(step.identifier.clone(), step.params.clone());
                        Ok(false)
                    }
                    Err(e) => Err(e),
                }
            }
            StepKind::Format | StepKind::Rule => {
                let ok =
                    registry.apply_predicate(step.kind, &step.identifier, working, &step.params)?;
                if !ok {
                    self.error(step.identifier.clone(), step.params.clone());
                }
                Ok(ok)
            }
            StepKind::Callback => {
                let before = self.errors.len();
                registry.invoke_callback(&step.identifier, self, working, &step.params)?;
                Ok(self.errors.len() == before)
            }
        }
    }

    fn record(&mut self, step: &PipelineStep, value: FieldValue, passed: bool, excluded: bool) {
        self.trace.push(TraceEntry {
            field: self.name.clone(),
            kind: step.kind,
            identifier: step.identifier.clone(),
            value,
            passed,
            excluded,
        });
    }

    /// Record a validation error against this field
    pub fn error(&mut self, identifier: impl Into<String>, params: Vec<FieldValue>) {
        self.errors.push(FieldError::new(identifier, params));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Pipeline steps in execution order
    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    /// Errors from the most recent check, in the order they were recorded
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Per-step execution records from the most recent check
    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    /// Value after the most recent fully successful check
    pub fn clean_value(&self) -> Option<&FieldValue> {
        self.clean.as_ref()
    }

    /// Input value as supplied
    pub fn dirty_value(&self) -> &FieldValue {
        &self.dirty
    }

    /// The clean value when set, otherwise the dirty value
    pub fn value(&self) -> &FieldValue {
        self.clean.as_ref().unwrap_or(&self.dirty)
    }

    /// Drop the clean value so it is not read back before the next check
    pub(crate) fn invalidate(&mut self) {
        self.clean = None;
    }

    /// Overwrite both the dirty and the clean value
    pub fn set_value(&mut self, value: impl Into<FieldValue>) {
        let value = value.into();
        self.dirty = value.clone();
        self.clean = Some(value);
    }
}

fn is_not_empty_rule(step: &PipelineStep) -> bool {
    step.kind == StepKind::Rule && step.identifier == NOT_EMPTY
}

fn collect<P>(params: P) -> Vec<FieldValue>
where
    P: IntoIterator,
    P::Item: Into<FieldValue>,
{
    params.into_iter().map(Into::into).collect()
}
