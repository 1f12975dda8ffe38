//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs, ConfigShowArgs};
use crate::config::{Config, ConfigBuilder};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use serde::Serialize;
use std::path::PathBuf;

/// Handle the config command
pub fn handle_config(args: ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
        ConfigAction::Path => handle_config_path(output),
        ConfigAction::Init(init_args) => handle_config_init(init_args, output),
    }
}

/// Render a configuration in the requested file format
pub fn render_config(config: &Config, format: ConfigFormat) -> Result<String> {
    match format {
        ConfigFormat::Toml => toml::to_string_pretty(config)
            .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e))),
        ConfigFormat::Json => Ok(serde_json::to_string_pretty(config)?),
        ConfigFormat::Yaml => Ok(serde_yaml::to_string(config)?),
    }
}

/// Handle config show subcommand
fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let content = render_config(config, args.format)?;
    output.writeln(content.trim_end())
}

#[derive(Debug, Serialize)]
struct ConfigLocation {
    path: PathBuf,
    exists: bool,
}

/// Handle config path subcommand
fn handle_config_path(output: &mut OutputWriter) -> Result<()> {
    let mut locations: Vec<ConfigLocation> = Config::default_config_paths()
        .into_iter()
        .map(|path| ConfigLocation {
            exists: path.exists(),
            path,
        })
        .collect();
    if let Ok(path) = std::env::var("MESH_CONFIG") {
        let path = PathBuf::from(path);
        locations.push(ConfigLocation {
            exists: path.exists(),
            path,
        });
    }

    if output.format() != crate::cli::OutputFormat::Human {
        return output.data(&locations);
    }

    let rows = locations
        .iter()
        .map(|location| {
            vec![
                location.path.display().to_string(),
                if location.exists { "found" } else { "missing" }.to_string(),
            ]
        })
        .collect();
    output.table(&["Path", "Status"], rows)
}

/// Handle config init subcommand
fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    let path = if args.project {
        PathBuf::from("mesh.toml")
    } else {
        Config::user_config_path()
            .ok_or_else(|| Error::config("Unable to determine user config directory"))?
    };

    if path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ))?;
        return Ok(());
    }

    starter_config(&args).save(&path)?;
    output.success(&format!("✓ Created config at {}", path.display()))?;
    output.info("Edit it to set default catalogs, message source and locale.")
}

/// The configuration written by `config init`
fn starter_config(args: &ConfigInitArgs) -> Config {
    let mut builder = ConfigBuilder::new();
    if let Some(source) = &args.source {
        builder = builder.message_source(source.clone());
    }
    if let Some(locale) = &args.locale {
        builder = builder.locale(locale.clone());
    }
    for catalog in &args.catalogs {
        builder = builder.catalog(catalog.clone());
    }
    builder.build()
}
