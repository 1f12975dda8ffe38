//! Message resolution
//!
//! Turns a recorded `(field, error)` pair into display text. A template is
//! looked up through a fixed chain of catalogs, optionally translated, and
//! then has its placeholders substituted:
//!
//! 1. `source` catalog, key `"{field}.{error}"`
//! 2. `source` catalog, key `"{field}.default"`
//! 3. `rule` catalog, key `error`
//! 4. `format` catalog, key `error`
//! 5. `validate` catalog, key `error`
//! 6. the literal `"{source}.{field}.{error}"`
//!
//! Placeholders are `:field` (the field label) and `:param1` .. `:paramN`
//! (the error parameters, 1-based).

pub mod catalog;
pub mod translate;

use tracing::debug;

use crate::types::FieldValue;

pub use catalog::MessageCatalog;
pub use translate::{TranslationTable, Translator};

/// Catalog name for rule templates
pub const RULE_CATALOG: &str = "rule";
/// Catalog name for format templates
pub const FORMAT_CATALOG: &str = "format";
/// Catalog name for generic validation templates
pub const VALIDATE_CATALOG: &str = "validate";

/// Template storage consulted during resolution
pub trait MessageSource: Send + Sync {
    /// Template stored under `key` in `catalog`, if any
    fn lookup(&self, catalog: &str, key: &str) -> Option<String>;
}

/// Per-call resolution options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageOptions {
    /// Catalog consulted first; falls back to the form's message source
    pub source: Option<String>,
    /// Locale handed to the translator
    pub locale: Option<String>,
    /// Whether to translate templates before substitution
    pub translate: bool,
}

impl MessageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Translate into `locale`
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self.translate = true;
        self
    }

    pub fn translate(mut self, translate: bool) -> Self {
        self.translate = translate;
        self
    }
}

/// Resolve the template for one error through the fallback chain
pub fn resolve_template(
    messages: &dyn MessageSource,
    source: Option<&str>,
    field: &str,
    error: &str,
) -> String {
    if let Some(source) = source {
        if let Some(template) = messages.lookup(source, &format!("{}.{}", field, error)) {
            debug!(field, error, tier = 1, "message resolved from source");
            return template;
        }
        if let Some(template) = messages.lookup(source, &format!("{}.default", field)) {
            debug!(field, error, tier = 2, "message resolved from field default");
            return template;
        }
    }

    let shared = [RULE_CATALOG, FORMAT_CATALOG, VALIDATE_CATALOG];
    for (offset, catalog) in shared.into_iter().enumerate() {
        if let Some(template) = messages.lookup(catalog, error) {
            debug!(field, error, catalog, tier = offset + 3, "message resolved from shared catalog");
            return template;
        }
    }

    debug!(field, error, tier = 6, "no template, using literal key");
    format!("{}.{}.{}", source.unwrap_or_default(), field, error)
}

/// Replace `:field` and `:paramN` placeholders in one left-to-right pass.
///
/// At each `:` the longest matching key wins, so `:param10` is not clobbered
/// by `:param1`. Substituted text is never scanned again.
pub fn substitute(template: &str, label: &str, params: &[FieldValue]) -> String {
    let mut replacements: Vec<(String, String)> = Vec::with_capacity(params.len() + 1);
    replacements.push((":field".to_string(), label.to_string()));
    for (i, param) in params.iter().enumerate() {
        replacements.push((format!(":param{}", i + 1), param.to_string()));
    }
    replacements.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(at) = rest.find(':') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        match replacements.iter().find(|(key, _)| rest.starts_with(key.as_str())) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &rest[key.len()..];
            }
            None => {
                out.push(':');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// A [`MessageSource`] with no templates
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMessages;

impl MessageSource for NoMessages {
    fn lookup(&self, _catalog: &str, _key: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> MessageCatalog {
        let mut catalog = MessageCatalog::new();
        catalog.insert("signup", json!({
            "email": { "email": "Enter a real email for :field" },
            "age": { "default": ":field is off" }
        }));
        catalog.insert("rule", json!({ "range": ":field must be between :param1 and :param2" }));
        catalog.insert("format", json!({ "email": "Invalid email", "range": "shadowed" }));
        catalog.insert("validate", json!({ "to_number": ":field must be a number" }));
        catalog
    }

    #[test]
    fn test_fallback_chain_order() {
        let catalog = catalog();
        let source = Some("signup");
        assert_eq!(
            resolve_template(&catalog, source, "email", "email"),
            "Enter a real email for :field"
        );
        assert_eq!(resolve_template(&catalog, source, "age", "range"), ":field is off");
        assert_eq!(
            resolve_template(&catalog, source, "height", "range"),
            ":field must be between :param1 and :param2"
        );
        assert_eq!(resolve_template(&catalog, None, "email", "email"), "Invalid email");
        assert_eq!(
            resolve_template(&catalog, None, "qty", "to_number"),
            ":field must be a number"
        );
    }

    #[test]
    fn test_literal_fallback() {
        assert_eq!(
            resolve_template(&NoMessages, Some("signup"), "email", "not_empty"),
            "signup.email.not_empty"
        );
        assert_eq!(resolve_template(&NoMessages, None, "email", "not_empty"), ".email.not_empty");
    }

    #[test]
    fn test_substitute() {
        let params = [FieldValue::from(18), FieldValue::from(65)];
        assert_eq!(
            substitute(":field must be between :param1 and :param2", "Age", &params),
            "Age must be between 18 and 65"
        );
    }

    #[test]
    fn test_substitute_longest_key_first() {
        let params: Vec<FieldValue> = (1..=10).map(|n| FieldValue::from(n * 100)).collect();
        assert_eq!(substitute(":param10/:param1", "x", &params), "1000/100");
    }

    #[test]
    fn test_substitute_does_not_rescan_replacements() {
        let params = [FieldValue::from(":field confirmation")];
        assert_eq!(
            substitute(":field must match :param1", "Password", &params),
            "Password must match :field confirmation"
        );
        assert_eq!(substitute("ratio 1:2 for :field:", "x", &[]), "ratio 1:2 for x:");
    }

    #[test]
    fn test_options_builder() {
        let options = MessageOptions::new().source("signup").locale("fr");
        assert_eq!(options.source.as_deref(), Some("signup"));
        assert_eq!(options.locale.as_deref(), Some("fr"));
        assert!(options.translate);
    }
}
