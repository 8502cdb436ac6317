//! Output formatting

use std::fmt::Write;

use miette::{IntoDiagnostic, Result};
use sqlsift_core::Analysis;

use crate::args::OutputFormat;

/// Output formatter for analysis reports
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render the report in the configured format
    pub fn render(&self, analysis: &Analysis) -> Result<String> {
        match self.format {
            OutputFormat::Human => Ok(render_human(analysis)),
            OutputFormat::Json => analysis
                .summary_as_json()
                .map(|json| format!("{}\n", json))
                .into_diagnostic(),
        }
    }
}

fn render_human(analysis: &Analysis) -> String {
    let mut out = String::new();
    let inventory = &analysis.inventory;

    // writing into a String cannot fail
    let _ = writeln!(out, "SQL Inventory:");
    let _ = writeln!(out, "==============");
    for (schema_name, schema) in inventory.schemas() {
        let _ = writeln!(out, "\nSchema: {}", schema_name);
        for (table_name, columns) in schema.iter() {
            let _ = writeln!(out, "  Table: {}", table_name);
            for column in columns {
                let _ = writeln!(out, "    - {}", column);
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} statement(s), {} table(s), {} column(s)",
        analysis.events.len(),
        inventory.table_count(),
        inventory.column_count()
    );

    let timing = &analysis.timing;
    if let Some(average) = timing.average_duration_ms() {
        let _ = writeln!(
            out,
            "Timing: max {} ms, average {:.1} ms over {} timed statement(s)",
            timing.max_duration_ms(),
            average,
            timing.all_durations_ms().len()
        );
        if let Some(slowest) = timing.statements_at_max().last() {
            let _ = writeln!(out, "Slowest: {}", slowest);
        }
    }

    if !analysis.failures.is_empty() {
        let _ = writeln!(
            out,
            "\x1b[33mwarning\x1b[0m: {} statement(s) could not be analyzed",
            analysis.failures.len()
        );
        for failed in analysis.failures.all_failed() {
            let _ = writeln!(out, "   = {}", failed);
        }
    }

    out
}
