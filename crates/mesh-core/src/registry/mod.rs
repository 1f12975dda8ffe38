//! Predicate registry: name-based dispatch for pipeline steps
//!
//! A field pipeline only stores identifiers. At check time every step is
//! resolved through a [`Registry`], which maps the identifier to a filter,
//! format, rule or callback function.
//!
//! # Module Organization
//!
//! - [`filters`] - Built-in value transforms (`trim`, `to_number`, ...)
//! - [`formats`] - Built-in format predicates (`email`, `url`, `credit_card`, ...)
//! - [`rules`] - Built-in rule predicates (`not_empty`, `length`, `range`, ...)
//! - [`cards`] - Credit card type table used by the `credit_card` format
//!
//! # Examples
//!
//! ```
//! use mesh_core::registry::{PredicateRegistry, Registry};
//! use mesh_core::{FieldValue, StepKind};
//!
//! let mut registry = PredicateRegistry::with_builtins();
//! registry.register_rule("even", |value, _params| {
//!     Ok(value.as_f64().map(|n| n % 2.0 == 0.0).unwrap_or(false))
//! });
//!
//! assert!(registry.supports(StepKind::Rule, "even"));
//! let ok = registry
//!     .apply_predicate(StepKind::Rule, "even", &FieldValue::from(4), &[])
//!     .unwrap();
//! assert!(ok);
//! ```

pub mod cards;
pub mod filters;
pub mod formats;
pub mod params;
pub mod rules;


use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::{Error, Result};
use crate::field::Field;
use crate::types::{FieldValue, StepKind};

pub use formats::MxResolver;

/// A value transform. Returning [`Error::Conversion`] records a validation
/// failure; any other error aborts the check.
pub type FilterFn = Arc<dyn Fn(&FieldValue, &[FieldValue]) -> Result<FieldValue> + Send + Sync>;

/// A format or rule predicate
pub type PredicateFn = Arc<dyn Fn(&FieldValue, &[FieldValue]) -> Result<bool> + Send + Sync>;

/// A callback receives the field being checked, the current working value and
/// the step parameters. It reports failures through [`Field::error`].
pub type CallbackFn =
    Arc<dyn Fn(&mut Field, &FieldValue, &[FieldValue]) -> Result<()> + Send + Sync>;

/// Capability set consumed by the field pipeline
pub trait Registry: Send + Sync {
    /// Whether `identifier` resolves for the given step kind
    fn supports(&self, kind: StepKind, identifier: &str) -> bool;

    /// Run a filter and return the transformed value
    fn apply_filter(
        &self,
        identifier: &str,
        value: &FieldValue,
        params: &[FieldValue],
    ) -> Result<FieldValue>;

    /// Run a format or rule predicate
    fn apply_predicate(
        &self,
        kind: StepKind,
        identifier: &str,
        value: &FieldValue,
        params: &[FieldValue],
    ) -> Result<bool>;

    /// Run a callback against the field
    fn invoke_callback(
        &self,
        identifier: &str,
        field: &mut Field,
        value: &FieldValue,
        params: &[FieldValue],
    ) -> Result<()>;
}

/// Table-driven [`Registry`] implementation
#[derive(Clone, Default)]
pub struct PredicateRegistry {
    filters: HashMap<String, FilterFn>,
    formats: HashMap<String, PredicateFn>,
    rules: HashMap<String, PredicateFn>,
    callbacks: HashMap<String, CallbackFn>,
}

impl PredicateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in filter, format and rule.
    ///
    /// `email_domain` is only available once an [`MxResolver`] is supplied via
    /// [`PredicateRegistry::with_mx_resolver`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        filters::register_builtins(&mut registry);
        formats::register_builtins(&mut registry);
        rules::register_builtins(&mut registry);
        registry
    }

    /// Enable the `email_domain` format using the host's DNS resolver
    pub fn with_mx_resolver(mut self, resolver: Arc<dyn MxResolver>) -> Self {
        self.register_format(formats::EMAIL_DOMAIN, move |value, _params| {
            Ok(formats::email_domain(resolver.as_ref(), &value.to_text()))
        });
        self
    }

    /// Register (or replace) a filter
    pub fn register_filter<F>(&mut self, identifier: impl Into<String>, filter: F) -> &mut Self
    where
        F: Fn(&FieldValue, &[FieldValue]) -> Result<FieldValue> + Send + Sync + 'static,
    {
        self.filters.insert(identifier.into(), Arc::new(filter));
        self
    }

    /// Register (or replace) a format predicate
    pub fn register_format<F>(&mut self, identifier: impl Into<String>, format: F) -> &mut Self
    where
        F: Fn(&FieldValue, &[FieldValue]) -> Result<bool> + Send + Sync + 'static,
    {
        self.formats.insert(identifier.into(), Arc::new(format));
        self
    }

    /// Register (or replace) a rule predicate
    pub fn register_rule<F>(&mut self, identifier: impl Into<String>, rule: F) -> &mut Self
    where
        F: Fn(&FieldValue, &[FieldValue]) -> Result<bool> + Send + Sync + 'static,
    {
        self.rules.insert(identifier.into(), Arc::new(rule));
        self
    }

    /// Register (or replace) a callback
    pub fn register_callback<F>(&mut self, identifier: impl Into<String>, callback: F) -> &mut Self
    where
        F: Fn(&mut Field, &FieldValue, &[FieldValue]) -> Result<()> + Send + Sync + 'static,
    {
        self.callbacks.insert(identifier.into(), Arc::new(callback));
        self
    }

    /// Sorted identifiers registered for a step kind
    pub fn identifiers(&self, kind: StepKind) -> Vec<&str> {
        let mut names: Vec<&str> = match kind {
            StepKind::Filter => self.filters.keys().map(String::as_str).collect(),
            StepKind::Format => self.formats.keys().map(String::as_str).collect(),
            StepKind::Rule => self.rules.keys().map(String::as_str).collect(),
            StepKind::Callback => self.callbacks.keys().map(String::as_str).collect(),
        };
        names.sort_unstable();
        names
    }

    fn predicate(&self, kind: StepKind, identifier: &str) -> Result<&PredicateFn> {
        let table = match kind {
            StepKind::Format => &self.formats,
            StepKind::Rule => &self.rules,
            other => {
                return Err(Error::configuration(
                    identifier,
                    format!("{} steps do not produce a verdict", other),
                ))
            }
        };
        table
            .get(identifier)
            .ok_or_else(|| Error::unknown_identifier(kind, identifier))
    }
}

impl Registry for PredicateRegistry {
    fn supports(&self, kind: StepKind, identifier: &str) -> bool {
        match kind {
            StepKind::Filter => self.filters.contains_key(identifier),
            StepKind::Format => self.formats.contains_key(identifier),
            StepKind::Rule => self.rules.contains_key(identifier),
            StepKind::Callback => self.callbacks.contains_key(identifier),
        }
    }

    fn apply_filter(
        &self,
        identifier: &str,
        value: &FieldValue,
        params: &[FieldValue],
    ) -> Result<FieldValue> {
        let filter = self
            .filters
            .get(identifier)
            .ok_or_else(|| Error::unknown_identifier(StepKind::Filter, identifier))?;
        trace!(filter = identifier, input = %value, "applying filter");
        filter(value, params)
    }

    fn apply_predicate(
        &self,
        kind: StepKind,
        identifier: &str,
        value: &FieldValue,
        params: &[FieldValue],
    ) -> Result<bool> {
        let predicate = self.predicate(kind, identifier)?;
        predicate(value, params)
    }

    fn invoke_callback(
        &self,
        identifier: &str,
        field: &mut Field,
        value: &FieldValue,
        params: &[FieldValue],
    ) -> Result<()> {
        let callback = self
            .callbacks
            .get(identifier)
            .ok_or_else(|| Error::unknown_identifier(StepKind::Callback, identifier))?;
        callback(field, value, params)
    }
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRegistry")
            .field("filters", &self.identifiers(StepKind::Filter))
            .field("formats", &self.identifiers(StepKind::Format))
            .field("rules", &self.identifiers(StepKind::Rule))
            .field("callbacks", &self.identifiers(StepKind::Callback))
            .finish()
    }
}
