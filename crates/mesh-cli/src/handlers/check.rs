//! Check command handler

use super::utils::{load_catalog, load_document, load_records, load_translations};
use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::{current_run_id, timing::Timer};
use crate::output::OutputWriter;
use crate::report::{CheckReport, RecordReport, ReportOptions};
use mesh_core::{FormDefinition, MessageOptions, PredicateRegistry, Record, Registry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Message settings after merging flags over the config file
#[derive(Debug, Clone, PartialEq)]
struct MessageSettings {
    catalogs: Vec<PathBuf>,
    translations: Vec<PathBuf>,
    defaults: bool,
    options: MessageOptions,
}

impl MessageSettings {
    /// Flags add catalogs after the configured ones and override scalars
    fn resolve(args: &CheckArgs, config: &Config) -> Self {
        let mut options = MessageOptions::new();
        if let Some(source) = args.source.as_ref().or(config.messages.source.as_ref()) {
            options = options.source(source.clone());
        }
        if let Some(locale) = args.locale.as_ref().or(config.messages.locale.as_ref()) {
            options = options.locale(locale.clone());
        }

        Self {
            catalogs: config
                .messages
                .catalogs
                .iter()
                .chain(&args.messages)
                .cloned()
                .collect(),
            translations: config
                .messages
                .translations
                .iter()
                .chain(&args.translations)
                .cloned()
                .collect(),
            defaults: config.messages.defaults && !args.no_default_messages,
            options,
        }
    }
}

/// Handle the check command
#[instrument(skip_all, fields(form_def = %args.form_def.display(), record = %args.record.display()))]
pub fn handle_check(args: CheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::with_details("check", &args.form_def.display().to_string());

    let definition: FormDefinition = load_document(&args.form_def)?;
    let records = load_records(&args.record)?;
    let settings = MessageSettings::resolve(&args, config);
    debug!(settings = ?settings, fields = definition.fields.len(), "Resolved check settings");

    output.info(&format!(
        "Checking {} record(s) against {}",
        records.len(),
        args.form_def.display()
    ))?;

    let report = run_check(
        &definition,
        records,
        &settings,
        ReportOptions {
            messages: settings.options.clone(),
            trace: args.trace,
            reveal: args.reveal,
        },
        output,
    )?;

    output.check_report(&report)?;
    info!(
        total = report.total,
        failed = report.failed,
        elapsed_ms = timer.elapsed().as_millis() as u64,
        "Check finished"
    );
    timer.finish();

    if !report.passed {
        return Err(Error::CheckFailed {
            failed: report.failed,
            total: report.total,
        });
    }

    output.success(&format!("✓ {} record(s) passed", report.total))
}

/// Build and check one form per record
fn run_check(
    definition: &FormDefinition,
    records: Vec<Record>,
    settings: &MessageSettings,
    options: ReportOptions,
    output: &OutputWriter,
) -> Result<CheckReport> {
    let catalog = Arc::new(load_catalog(&settings.catalogs, settings.defaults)?);
    let translator = Arc::new(load_translations(&settings.translations)?);
    let registry: Arc<dyn Registry> = Arc::new(PredicateRegistry::with_builtins());

    let progress = if records.len() > 1 {
        output.progress_bar(records.len() as u64, "checking records")
    } else {
        None
    };

    let mut reports = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let _timer = Timer::with_details("check_record", &format!("record {}", index + 1));

        let mut form = definition
            .build(record, registry.clone())?
            .with_messages(catalog.clone())
            .with_translator(translator.clone());
        let passed = form.check()?;
        debug!(index, passed, "Record checked");

        reports.push(RecordReport::from_form(index, &mut form, &options));
        if let Some(progress) = &progress {
            progress.inc(1);
        }
    }

    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    Ok(CheckReport::new(current_run_id(), reports))
}
