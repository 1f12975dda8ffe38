//! Declarative form definitions
//!
//! A [`FormDefinition`] describes fields and their pipelines as data, so forms
//! can be loaded from JSON or YAML. Steps are written either explicitly or in
//! the shorthand form keyed by step kind:
//!
//! ```json
//! {
//!   "message_source": "signup",
//!   "fields": {
//!     "age": {
//!       "label": "Age",
//!       "steps": [
//!         { "filter": "trim" },
//!         { "kind": "rule", "identifier": "range", "params": [18, 65] }
//!       ]
//!     }
//!   }
//! }
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::field::Field;
use crate::form::Form;
use crate::registry::Registry;
use crate::types::{FieldValue, PipelineStep, Record, StepKind};

/// A whole form: optional message source plus ordered fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_source: Option<String>,
    #[serde(default)]
    pub fields: IndexMap<String, FieldDefinition>,
}

/// One field's label and pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

/// One pipeline step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStep")]
pub struct StepDefinition {
    pub kind: StepKind,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<FieldValue>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub excluded: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStep {
    kind: Option<StepKind>,
    identifier: Option<String>,
    filter: Option<String>,
    format: Option<String>,
    rule: Option<String>,
    callback: Option<String>,
    #[serde(default)]
    params: Vec<FieldValue>,
    #[serde(default)]
    excluded: bool,
}

impl TryFrom<RawStep> for StepDefinition {
    type Error = String;

    fn try_from(raw: RawStep) -> std::result::Result<Self, Self::Error> {
        let mut named: Vec<(StepKind, String)> = [
            (StepKind::Filter, raw.filter),
            (StepKind::Format, raw.format),
            (StepKind::Rule, raw.rule),
            (StepKind::Callback, raw.callback),
        ]
        .into_iter()
        .filter_map(|(kind, identifier)| identifier.map(|id| (kind, id)))
        .collect();

        let (kind, identifier) = match (raw.kind, raw.identifier, named.len()) {
            (Some(kind), Some(identifier), 0) => (kind, identifier),
            (None, None, 1) => named.remove(0),
            (None, None, 0) => {
                return Err("step needs a kind and identifier, or one of filter/format/rule/callback".into())
            }
            _ => {
                return Err("step must use either kind/identifier or exactly one of filter/format/rule/callback".into())
            }
        };

        Ok(StepDefinition {
            kind,
            identifier,
            params: raw.params,
            excluded: raw.excluded,
        })
    }
}

impl From<&StepDefinition> for PipelineStep {
    fn from(definition: &StepDefinition) -> Self {
        PipelineStep {
            kind: definition.kind,
            identifier: definition.identifier.clone(),
            params: definition.params.clone(),
            excluded: definition.excluded,
        }
    }
}

impl FieldDefinition {
    /// Build the field named `name`
    pub fn to_field(&self, name: &str) -> Field {
        let field = self
            .steps
            .iter()
            .fold(Field::new(name), |field, step| field.step(step.into()));
        match &self.label {
            Some(label) => field.with_label(label.clone()),
            None => field,
        }
    }
}

impl FormDefinition {
    /// Parse a JSON definition
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a form over `record`. Unknown step identifiers surface as
    /// configuration errors naming the offending field.
    pub fn build(&self, record: Record, registry: Arc<dyn Registry>) -> Result<Form> {
        let mut form = Form::new(record).with_registry(registry);
        if let Some(source) = &self.message_source {
            form = form.with_message_source(source.clone());
        }

        for (name, definition) in &self.fields {
            form.field(definition.to_field(name)).map_err(|e| match e {
                Error::Configuration { message, identifier } => Error::Configuration {
                    message: format!("field '{}': {}", name, message),
                    identifier,
                },
                other => other,
            })?;
        }
        Ok(form)
    }
}
