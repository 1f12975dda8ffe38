//! Form orchestrator
//!
//! A [`Form`] owns a raw record and a named, ordered collection of
//! [`Field`]s. [`Form::check`] runs every field against its raw value and
//! aggregates the outcome; the form then exposes merged views of the raw
//! record and the fields' clean values, and resolves recorded errors into
//! display messages.
//!
//! # Examples
//!
//! ```
//! use mesh_core::{Field, FieldValue, Form, Record};
//!
//! let mut record = Record::new();
//! record.insert("email".into(), FieldValue::from("a@b.com"));
//! record.insert("age".into(), FieldValue::from(" 70 "));
//!
//! let mut form = Form::new(record).with_message_source("signup");
//! form.field(Field::new("email").rule("not_empty").format("email"))?;
//! form.field_with_label(Field::new("age").filter("trim").rule_with("range", [18, 65]), "Age")?;
//!
//! assert!(!form.check()?);
//! assert_eq!(form.error("age"), Some("range"));
//! assert_eq!(form.message("age").as_deref(), Some("signup.age.range"));
//! # Ok::<(), mesh_core::Error>(())
//! ```
//!
//! Copyright (c) 2025 Mesh Team
//! Licensed under the MIT license

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::debug::{FieldTrace, FormTrace};
use crate::error::{Error, Result};
use crate::field::Field;
use crate::message::{self, MessageOptions, MessageSource, NoMessages, Translator};
use crate::registry::{PredicateRegistry, Registry};
use crate::types::{FieldError, FieldValue, Record};

static ABSENT: FieldValue = FieldValue::Absent;

/// How [`Form::set_values`] combines new values with the existing record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValuesMode {
    /// Merge into the existing record, new keys win
    #[default]
    Append,
    /// Replace the record entirely
    Exchange,
}

/// A record plus the fields that validate it
pub struct Form {
    fields: IndexMap<String, Field>,
    labels: IndexMap<String, String>,
    record: Record,
    passed: bool,
    messages: IndexMap<String, String>,
    message_source: Option<String>,
    catalog: Arc<dyn MessageSource>,
    translator: Option<Arc<dyn Translator>>,
    registry: Arc<dyn Registry>,
}

impl Form {
    /// Create a form over `record` using the built-in registry and no message
    /// templates
    pub fn new(record: Record) -> Self {
        Self {
            fields: IndexMap::new(),
            labels: IndexMap::new(),
            record,
            passed: false,
            messages: IndexMap::new(),
            message_source: None,
            catalog: Arc::new(NoMessages),
            translator: None,
            registry: Arc::new(PredicateRegistry::with_builtins()),
        }
    }

    /// Catalog consulted first when resolving messages
    pub fn with_message_source(mut self, source: impl Into<String>) -> Self {
        self.message_source = Some(source.into());
        self
    }

    /// Use a custom registry. Call before registering fields.
    pub fn with_registry(mut self, registry: Arc<dyn Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Template storage for message resolution
    pub fn with_messages(mut self, catalog: Arc<dyn MessageSource>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Translator applied to templates when a locale is requested
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Register a field labelled with its own label.
    ///
    /// Every step identifier is checked against the registry; an unknown one
    /// is a configuration error and the field is not registered. Registering
    /// a name again replaces the previous field.
    pub fn field(&mut self, field: Field) -> Result<&mut Self> {
        let label = field.label().to_string();
        self.field_with_label(field, label)
    }

    /// Register a field under an explicit label
    pub fn field_with_label(&mut self, mut field: Field, label: impl Into<String>) -> Result<&mut Self> {
        for step in field.steps() {
            if !self.registry.supports(step.kind, &step.identifier) {
                warn!(field = field.name(), step = %step.identifier, "unknown step identifier");
                return Err(Error::unknown_identifier(step.kind, &step.identifier));
            }
        }

        let name = field.name().to_string();
        let label = label.into();
        field.set_label(label.clone());
        debug!(field = %name, steps = field.steps().len(), "field registered");

        self.labels.insert(name.clone(), label);
        self.fields.insert(name, field);
        self.passed = false;
        Ok(self)
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Mutable access, e.g. to exclude steps before re-checking
    pub fn get_field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.passed = false;
        self.fields.get_mut(name)
    }

    /// Registered field names in registration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }

    /// Set a display label; a registered field with this name is relabelled too
    pub fn set_label(&mut self, name: impl Into<String>, label: impl Into<String>) -> &mut Self {
        let name = name.into();
        let label = label.into();
        if let Some(field) = self.fields.get_mut(&name) {
            field.set_label(label.clone());
        }
        self.labels.insert(name, label);
        self
    }

    /// Check every field against its raw value.
    ///
    /// All fields run even after one fails. The result is stored and
    /// available from [`Form::passed`].
    pub fn check(&mut self) -> Result<bool> {
        let mut passed = true;
        for (name, field) in self.fields.iter_mut() {
            let raw = self.record.get(name).cloned().unwrap_or_default();
            match field.check(self.registry.as_ref(), Some(raw)) {
                Ok(ok) => passed &= ok,
                Err(e) => {
                    self.passed = false;
                    return Err(e);
                }
            }
        }

        self.passed = passed;
        info!(fields = self.fields.len(), passed, "form checked");
        Ok(passed)
    }

    /// Outcome of the last [`Form::check`]; false after any mutation
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Resolved value: the field's value when the form passed and that value
    /// is not empty, otherwise the raw record value
    pub fn value(&self, name: &str) -> &FieldValue {
        if self.passed {
            if let Some(value) = self.fields.get(name).map(Field::value) {
                if !value.is_empty() {
                    return value;
                }
            }
        }
        self.record.get(name).unwrap_or(&ABSENT)
    }

    /// Resolved value, or `default` when nothing is present
    pub fn value_or(&self, name: &str, default: impl Into<FieldValue>) -> FieldValue {
        match self.value(name) {
            FieldValue::Absent => default.into(),
            value => value.clone(),
        }
    }

    /// Write a value into the record and the matching field
    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        if let Some(field) = self.fields.get_mut(&name) {
            field.set_value(value.clone());
        }
        self.record.insert(name, value);
        self.passed = false;
        self
    }

    /// The raw record overlaid with every clean field value
    pub fn values(&self) -> Record {
        let mut merged = self.record.clone();
        for (name, field) in &self.fields {
            if let Some(clean) = field.clean_value() {
                merged.insert(name.clone(), clean.clone());
            }
        }
        merged
    }

    /// The raw record as supplied
    pub fn raw_values(&self) -> &Record {
        &self.record
    }

    /// Replace or extend the raw record. Clean values from earlier checks are
    /// dropped, so [`Form::values`] reflects the new record until re-checked.
    pub fn set_values(&mut self, values: Record, mode: ValuesMode) -> &mut Self {
        match mode {
            ValuesMode::Append => self.record.extend(values),
            ValuesMode::Exchange => self.record = values,
        }
        for field in self.fields.values_mut() {
            field.invalidate();
        }
        self.passed = false;
        self
    }

    /// Whether the resolved value (or the default) equals `candidate`
    pub fn selected(&self, name: &str, candidate: &FieldValue, default: Option<&FieldValue>) -> bool {
        self.value(name) == candidate || default == Some(candidate)
    }

    /// Identifier of the last error recorded for a field
    pub fn error(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|field| field.errors().last())
            .map(|error| error.identifier.as_str())
    }

    /// All errors for a field; `None` when no such field is registered
    pub fn errors(&self, name: &str) -> Option<&[FieldError]> {
        self.fields.get(name).map(Field::errors)
    }

    /// Message for a field's errors using the form's message source.
    ///
    /// Served from the cache when present; the cache survives `check()` until
    /// [`Form::reset_messages`].
    pub fn message(&mut self, name: &str) -> Option<String> {
        if let Some(cached) = self.messages.get(name) {
            return Some(cached.clone());
        }
        self.message_with(name, &MessageOptions::default())
    }

    /// Resolve a message with explicit options, bypassing and refreshing the
    /// cache. With several errors the last one wins.
    pub fn message_with(&mut self, name: &str, options: &MessageOptions) -> Option<String> {
        let field = self.fields.get(name)?;
        let label = self.labels.get(name).map_or(name, String::as_str);
        let source = options.source.as_deref().or(self.message_source.as_deref());

        let mut resolved = None;
        for error in field.errors() {
            let mut template =
                message::resolve_template(self.catalog.as_ref(), source, name, &error.identifier);
            if options.translate {
                if let (Some(translator), Some(locale)) = (&self.translator, &options.locale) {
                    if let Some(translated) = translator.translate(&template, locale) {
                        template = translated;
                    }
                }
            }
            resolved = Some(message::substitute(&template, label, &error.params));
        }

        let message = resolved?;
        self.messages.insert(name.to_string(), message.clone());
        Some(message)
    }

    /// Messages for every failing field, in registration order
    pub fn messages(&mut self) -> IndexMap<String, String> {
        let names: Vec<String> = self.fields.keys().cloned().collect();
        for name in &names {
            self.message(name);
        }
        self.messages.clone()
    }

    /// Replace the message cache
    pub fn set_messages(&mut self, messages: IndexMap<String, String>) -> &mut Self {
        self.messages = messages;
        self
    }

    pub fn reset_messages(&mut self) -> &mut Self {
        self.messages.clear();
        self
    }

    /// Per-step trace of the last check
    pub fn trace(&self) -> FormTrace {
        FormTrace {
            passed: self.passed,
            fields: self
                .fields
                .iter()
                .map(|(name, field)| {
                    FieldTrace::from_field(field, self.label(name).unwrap_or(name))
                })
                .collect(),
        }
    }
}

impl Default for Form {
    fn default() -> Self {
        Self::new(Record::new())
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("fields", &self.fields)
            .field("labels", &self.labels)
            .field("record", &self.record)
            .field("passed", &self.passed)
            .field("messages", &self.messages)
            .field("message_source", &self.message_source)
            .finish_non_exhaustive()
    }
}
