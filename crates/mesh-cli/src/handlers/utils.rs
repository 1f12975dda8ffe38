//! Shared utilities for command handlers

use crate::error::{Error, ErrorContext, Result};
use mesh_core::{MessageCatalog, Record, TranslationTable};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Document formats recognized by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// Pick the format from a file extension; anything unknown is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            Some("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Json,
        }
    }

    fn name(self) -> &'static str {
        match self {
            DocumentFormat::Json => "JSON",
            DocumentFormat::Yaml => "YAML",
            DocumentFormat::Toml => "TOML",
        }
    }
}

/// Read and parse a JSON, YAML or TOML document
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    let format = DocumentFormat::from_path(path);
    let invalid = |reason: String| Error::InvalidFormat {
        path: path.to_path_buf(),
        expected: format.name().to_string(),
        reason,
    };

    match format {
        DocumentFormat::Json => serde_json::from_str(&content).map_err(|e| invalid(e.to_string())),
        DocumentFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string())),
        DocumentFormat::Toml => toml::from_str(&content).map_err(|e| invalid(e.to_string())),
    }
}

/// Load the records to check: one object, or an array of objects
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let document: serde_json::Value = load_document(path)?;

    let records = match document {
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                parse_record(item).with_context(|| format!("record {} in {}", index + 1, path.display()))
            })
            .collect::<Result<Vec<_>>>()?,
        serde_json::Value::Object(_) => {
            vec![parse_record(document).with_context(|| format!("record in {}", path.display()))?]
        }
        _ => {
            return Err(Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "record object or array of records".to_string(),
                reason: "top-level value is neither".to_string(),
            })
        }
    };

    if records.is_empty() {
        return Err(Error::invalid_args(format!(
            "{} holds no records",
            path.display()
        )));
    }
    Ok(records)
}

/// Explicit nulls become absent values; nested objects are rejected
fn parse_record(value: serde_json::Value) -> Result<Record> {
    Ok(serde_json::from_value(value)?)
}

/// Merge catalog files, in order, over an optional set of built-in templates
pub fn load_catalog(paths: &[impl AsRef<Path>], defaults: bool) -> Result<MessageCatalog> {
    let mut catalog = if defaults {
        MessageCatalog::with_defaults()
    } else {
        MessageCatalog::new()
    };

    for path in paths {
        let path = path.as_ref();
        let value: serde_json::Value = load_document(path)?;
        let loaded = MessageCatalog::from_value(value)
            .with_context(|| format!("message catalog {}", path.display()))?;
        tracing::debug!(path = %path.display(), catalogs = ?loaded.names().collect::<Vec<_>>(), "Loaded message catalog");
        catalog.merge(loaded);
    }

    Ok(catalog)
}

/// Merge translation tables, in order
pub fn load_translations(paths: &[impl AsRef<Path>]) -> Result<TranslationTable> {
    let mut table = TranslationTable::new();

    for path in paths {
        let path = path.as_ref();
        let loaded: TranslationTable = load_document(path)?;
        tracing::debug!(path = %path.display(), locales = ?loaded.locales().collect::<Vec<_>>(), "Loaded translations");
        table.merge(loaded);
    }

    Ok(table)
}
