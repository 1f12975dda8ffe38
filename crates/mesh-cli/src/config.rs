//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - The user config file (`<config dir>/mesh/config.toml` or `.yaml`)
//! - A project config file in the current directory
//! - An explicit `--config` path or `MESH_CONFIG`
//!
//! Later sources override earlier ones; command-line flags override all of
//! them at the point of use.

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Project config file names, checked in order; the first one found wins
const PROJECT_CONFIG_FILES: &[&str] = &[".mesh.yaml", ".mesh.yml", ".mesh.json", "mesh.toml"];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LogSettings,

    /// Message resolution settings
    pub messages: MessagesConfig,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,

    /// Use colored output when the terminal supports it
    pub color: bool,

    /// Show progress indicators for batch checks
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log level used when no `-v` flag is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Log format (compact, full, json)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Log file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Per-module level overrides
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub modules: HashMap<String, String>,
}

/// Message resolution configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    /// Message source consulted before a definition's own
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Catalog files loaded for every check
    pub catalogs: Vec<PathBuf>,

    /// Translation tables loaded for every check
    pub translations: Vec<PathBuf>,

    /// Default locale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Include the built-in English templates
    pub defaults: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            progress: true,
        }
    }
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            source: None,
            catalogs: Vec::new(),
            translations: Vec::new(),
            locale: None,
            defaults: true,
        }
    }
}

impl Config {
    /// Load configuration from a file, picking the parser by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let mut config: Config = match extension(path) {
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "toml" => toml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };
        config.resolve_paths(path.parent().unwrap_or_else(|| Path::new("")));

        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Load configuration from the default locations, merging user then project
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        for path in Self::default_config_paths() {
            if path.exists() {
                config.merge(Self::from_file(&path)?);
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => {
                let mut config = Self::default();
                config.merge(Self::from_file(path)?);
                Ok(config)
            }
            None => Self::load(),
        }
    }

    /// The user configuration file written by `mesh config init`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mesh").join("config.toml"))
    }

    /// The first project configuration file present in the current directory
    pub fn find_project_config() -> Option<PathBuf> {
        PROJECT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Configuration file paths in load order
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            let mesh_dir = config_dir.join("mesh");
            paths.push(mesh_dir.join("config.toml"));
            paths.push(mesh_dir.join("config.yaml"));
        }

        if let Some(project) = Self::find_project_config() {
            paths.push(project);
        }

        paths
    }

    /// Merge with another config (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.output.format.is_some() {
            self.output.format = other.output.format;
        }
        self.output.color = other.output.color;
        self.output.progress = other.output.progress;

        if other.logging.level.is_some() {
            self.logging.level = other.logging.level;
        }
        if other.logging.format.is_some() {
            self.logging.format = other.logging.format;
        }
        if other.logging.file.is_some() {
            self.logging.file = other.logging.file;
        }
        self.logging.modules.extend(other.logging.modules);

        if other.messages.source.is_some() {
            self.messages.source = other.messages.source;
        }
        if other.messages.locale.is_some() {
            self.messages.locale = other.messages.locale;
        }
        self.messages.catalogs.extend(other.messages.catalogs);
        self.messages.translations.extend(other.messages.translations);
        self.messages.defaults = other.messages.defaults;
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match extension(path) {
            "yaml" | "yml" => serde_yaml::to_string(self)?,
            "toml" => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))?,
            _ => serde_json::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Make relative catalog and translation paths relative to the config file
    fn resolve_paths(&mut self, base: &Path) {
        for path in self
            .messages
            .catalogs
            .iter_mut()
            .chain(self.messages.translations.iter_mut())
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|s| s.to_str()).unwrap_or("")
}

/// Builder for creating configurations programmatically
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new config builder
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the default output format
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output.format = Some(format);
        self
    }

    /// Set the default message source
    pub fn message_source(mut self, source: impl Into<String>) -> Self {
        self.config.messages.source = Some(source.into());
        self
    }

    /// Set the default locale
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.config.messages.locale = Some(locale.into());
        self
    }

    /// Add a catalog file
    pub fn catalog(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.messages.catalogs.push(path.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
