//! Output formatting for parse reports.

use crate::report::ParseReport;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}

/// Formats a parse report in the requested output format.
pub fn format_report(report: &ParseReport, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Table => Ok(report_to_table(report)),
    }
}

fn report_to_table(report: &ParseReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("Command: {}\n", report.command_path.join(" ")));
    if let Some(ref information) = report.information {
        out.push_str(&format!("Requested: {information}\n"));
    }

    if !report.options.is_empty() {
        out.push_str("\nOptions:\n");
        let width = report
            .options
            .iter()
            .map(|o| o.name.len())
            .max()
            .unwrap_or(4);
        for option in &report.options {
            let values = if option.values.is_empty() {
                format!("(x{})", option.occurrences)
            } else {
                option.values.join(", ")
            };
            out.push_str(&format!("  {:<width$}  {values}\n", option.name));
        }
    }

    if !report.arguments.is_empty() {
        out.push_str("\nArguments:\n");
        let width = report
            .arguments
            .iter()
            .map(|a| a.name.len())
            .max()
            .unwrap_or(4);
        for argument in &report.arguments {
            out.push_str(&format!(
                "  {:<width$}  {}\n",
                argument.name,
                argument.values.join(", ")
            ));
        }
    }

    if !report.remainder.is_empty() {
        out.push_str(&format!("\nRemainder: {}\n", report.remainder.join(" ")));
    }

    if let Some(ref failure) = report.validation_failure {
        out.push_str(&format!("\nValidation failed: {}\n", failure.message));
    }

    out
}
