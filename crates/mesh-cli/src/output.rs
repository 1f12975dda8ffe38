//! Output formatting and writing utilities
//!
//! This module formats values and check reports as JSON, YAML or
//! human-readable text, and owns the progress indicators shown during batch
//! checks.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::logging::redaction;
use crate::report::{CheckReport, RecordReport};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use serde::Serialize;
use std::fmt::Write as _;
use std::io::{self, Write};
use tracing::{debug, trace};

const PASS_MARK: &str = "✓";
const FAIL_MARK: &str = "✗";

/// Trait for formatting output with specialized support for check reports
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a check report with per-field results
    fn format_check_report(&self, report: &CheckReport) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // Human output falls back to pretty JSON for arbitrary data
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_check_report(&self, report: &CheckReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_check_report_human(report)),
            _ => self.format(report),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, progress: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: progress && !quiet && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            show_progress: false, // No progress bars with custom writers
            quiet,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let mut value_json = serde_json::to_value(value)?;
        redaction::redact_json_value(&mut value_json);
        trace!(
            "Outputting data: {}",
            serde_json::to_string(&value_json).unwrap_or_else(|_| "[failed to serialize]".to_string())
        );

        let formatted = self.format.format(value)?;
        if self.is_human() {
            self.writeln(&formatted)
        } else {
            self.write(&formatted)
        }
    }

    /// Write a check report, coloring pass and fail lines in human mode
    pub fn check_report(&mut self, report: &CheckReport) -> Result<()> {
        let formatted = self.format.format_check_report(report)?;
        if !self.is_human() || !self.use_color {
            return self.write(&formatted);
        }

        for line in formatted.lines() {
            let trimmed = line.trim_start();
            let line = if trimmed.starts_with(PASS_MARK) {
                line.green().to_string()
            } else if trimmed.starts_with(FAIL_MARK) {
                line.red().to_string()
            } else if trimmed.starts_with("═══") {
                line.bright_blue().to_string()
            } else {
                line.to_string()
            };
            self.writeln(&line)?;
        }
        Ok(())
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = pad_row(headers.iter().copied(), &widths);
        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            self.writeln(&pad_row(row.iter().map(String::as_str), &widths))?;
        }

        Ok(())
    }

    /// Create a progress bar for batch checks
    pub fn progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(length);
        if let Some(style) = default_progress_style() {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        Some(pb)
    }
}

fn pad_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .enumerate()
        .map(|(i, cell)| match widths.get(i) {
            Some(width) => format!("{:width$}", cell, width = *width),
            None => cell.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" │ ")
}

/// Progress bar style for batch checks
pub fn default_progress_style() -> Option<ProgressStyle> {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .ok()
        .map(|style| style.progress_chars("#>-"))
}

/// Format a check report for human reading
fn format_check_report_human(report: &CheckReport) -> String {
    let mut output = String::new();

    for record in &report.records {
        if report.total > 1 {
            let _ = writeln!(output, "═══ Record {} ═══", record.index + 1);
        }
        output.push_str(&format_record_human(record));
        output.push('\n');
    }

    output
}

/// Format a single record report for human reading
fn format_record_human(record: &RecordReport) -> String {
    let mut output = String::new();

    for field in &record.fields {
        let name = if field.label == field.name {
            field.name.clone()
        } else {
            format!("{} ({})", field.name, field.label)
        };
        if field.passed {
            let _ = writeln!(output, "{} {}", PASS_MARK, name);
        } else {
            let detail = field
                .message
                .clone()
                .or_else(|| field.errors.last().map(|error| error.identifier.clone()))
                .unwrap_or_default();
            let _ = writeln!(output, "{} {}: {}", FAIL_MARK, name, detail);
        }
    }

    if !record.values.is_empty() {
        output.push_str("Values:\n");
        for (name, value) in &record.values {
            let _ = writeln!(output, "  {}: {}", name, format_value_compact(value));
        }
    }

    if let Some(trace) = &record.trace {
        output.push_str("Trace:\n");
        for line in trace.to_string().lines() {
            let _ = writeln!(output, "  {}", line);
        }
    }

    output
}

/// Render a value on one line; absent values show as a dash
fn format_value_compact(value: &mesh_core::FieldValue) -> String {
    match value {
        mesh_core::FieldValue::Absent => "-".to_string(),
        mesh_core::FieldValue::String(s) => format!("{:?}", s),
        mesh_core::FieldValue::List(_) => format!("[{}]", value),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests;
