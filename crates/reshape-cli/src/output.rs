//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use reshape_domain::SchemaAnalysis;
use reshape_synthesizer::SynthesisOutcome;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a satisfiability analysis.
    pub fn format_analysis(&self, analysis: &SchemaAnalysis) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(analysis)?),
            OutputFormat::Table => Ok(self.format_analysis_table(analysis)),
        }
    }

    /// Format the analysis as a table.
    fn format_analysis_table(&self, analysis: &SchemaAnalysis) -> String {
        if analysis.results.is_empty() {
            return self.colorize("Schema declares no fields.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Field", "Required", "Matched", "Input key", "Model calls"]);

        for result in &analysis.results {
            let matched = match (result.matched, result.parse_failed) {
                (true, _) => "yes",
                (false, true) => "no (unparseable)",
                (false, false) => "no",
            };
            let calls = result.model_calls.to_string();
            builder.push_record([
                result.field.as_str(),
                if result.required { "yes" } else { "no" },
                matched,
                result.matched_key.as_deref().unwrap_or("-"),
                calls.as_str(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let verdict = if analysis.overall_valid {
            self.success("The data can satisfy the schema")
        } else {
            self.error(&format!(
                "Missing required fields: {}",
                analysis.unsatisfied_required().join(", ")
            ))
        };

        format!("{}\n{}", table, verdict)
    }

    /// One-line summary of a finished synthesis run.
    pub fn outcome_summary(&self, outcome: &SynthesisOutcome) -> String {
        let mut summary = format!(
            "Query verified: {} field(s) extracted, {} model call(s), {} ms",
            outcome.fragments.len(),
            outcome.metadata.model_calls,
            outcome.metadata.processing_time_ms
        );
        if !outcome.skipped_fields.is_empty() {
            summary.push_str(&format!(
                "; skipped: {}",
                outcome.skipped_fields.join(", ")
            ));
        }
        self.success(&summary)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
