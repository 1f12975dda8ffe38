//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use mesh_core::StepKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Mesh CLI - run records through field pipelines and report the outcome
///
/// Loads a form definition and one or more records, applies every field's
/// filters, formats, rules and callbacks, and prints per-field results with
/// resolved error messages.
#[derive(Parser, Debug)]
#[command(
    name = "mesh",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "MESH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results [default: human, or the configured format]
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check one record (or an array of records) against a form definition
    Check(CheckArgs),

    /// List the built-in filters, formats and rules
    Catalog(CatalogArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Path to the form definition (JSON, YAML or TOML)
    #[arg(value_name = "FORM_DEF")]
    pub form_def: PathBuf,

    /// Path to the record file: an object, or an array of objects
    #[arg(value_name = "RECORD")]
    pub record: PathBuf,

    /// Message catalog files merged over the built-in templates (repeatable)
    #[arg(short, long = "messages", value_name = "FILE")]
    pub messages: Vec<PathBuf>,

    /// Translation tables keyed by locale (repeatable)
    #[arg(long = "translations", value_name = "FILE")]
    pub translations: Vec<PathBuf>,

    /// Message source consulted before the definition's own
    #[arg(short, long, value_name = "NAME")]
    pub source: Option<String>,

    /// Translate messages into this locale
    #[arg(short, long, value_name = "LOCALE")]
    pub locale: Option<String>,

    /// Skip the built-in English templates
    #[arg(long)]
    pub no_default_messages: bool,

    /// Include the per-step trace in the report
    #[arg(long)]
    pub trace: bool,

    /// Show values of sensitive fields (passwords, tokens, card numbers)
    #[arg(long)]
    pub reveal: bool,
}

/// Arguments for the catalog command
#[derive(Parser, Debug)]
pub struct CatalogArgs {
    /// Only list identifiers of this kind
    #[arg(short, long, value_enum)]
    pub kind: Option<KindArg>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show(ConfigShowArgs),

    /// List the configuration files that are searched, in load order
    Path,

    /// Write a default configuration file
    Init(ConfigInitArgs),
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Write the project config (mesh.toml) instead of the user config
    #[arg(long)]
    pub project: bool,

    /// Force overwrite an existing config file
    #[arg(long)]
    pub force: bool,

    /// Default message source to record in the new file
    #[arg(long, value_name = "NAME")]
    pub source: Option<String>,

    /// Default locale to record in the new file
    #[arg(long, value_name = "LOCALE")]
    pub locale: Option<String>,

    /// Catalog files to record in the new file (repeatable)
    #[arg(long = "catalog", value_name = "FILE")]
    pub catalogs: Vec<PathBuf>,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Pipeline step kinds, as accepted on the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Filter,
    Format,
    Rule,
    Callback,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }

    /// The output format from the flag, then the config file, then human
    pub fn output_format(&self, configured: Option<OutputFormat>) -> OutputFormat {
        self.output.or(configured).unwrap_or(OutputFormat::Human)
    }
}

impl From<KindArg> for StepKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Filter => StepKind::Filter,
            KindArg::Format => StepKind::Format,
            KindArg::Rule => StepKind::Rule,
            KindArg::Callback => StepKind::Callback,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
