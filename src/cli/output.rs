//! Output formatting for the CLI.
//!
//! This module renders analyses and moves for the terminal or as JSON.

use colored::Colorize;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tabled::{Table, Tabled};

use crate::analysis::{Analysis, AttributeDifference, Move, PairDiff};
use crate::plan::Candidate;

use super::commands::ReportFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Report format.
    format: ReportFormat,
}

/// Match row for table display.
#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Ignored")]
    ignored: usize,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Formats an analysis for display.
    #[must_use]
    pub fn format_analysis(&self, analysis: &Analysis) -> String {
        match self.format {
            ReportFormat::Json => {
                serde_json::to_string_pretty(&AnalysisJson::from(analysis)).unwrap_or_default()
            }
            ReportFormat::Text => Self::format_analysis_text(analysis),
        }
    }

    /// Formats an analysis as text.
    fn format_analysis_text(analysis: &Analysis) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n{}\n\n", "Analysis".bold()));

        if analysis.matches.is_empty() {
            output.push_str("   No matches.\n");
        } else {
            let rows: Vec<MatchRow> = analysis
                .matches
                .iter()
                .enumerate()
                .map(|(i, m)| MatchRow {
                    index: i + 1,
                    resource_type: m.create.resource_type.clone(),
                    from: m.delete.address.clone(),
                    to: m.create.address.clone(),
                    ignored: m.diff.differences.len() - m.diff.score(),
                })
                .collect();

            output.push_str(&Table::new(rows).to_string());
            output.push('\n');
        }

        // Per-create breakdown of every scored pair
        let mut seen = HashSet::new();
        for pair in &analysis.comparisons {
            let address = pair.create.address.as_str();
            if !seen.insert(address) {
                continue;
            }
            output.push_str(&format!(
                "\n{} ({})\n",
                address.bold(),
                pair.create.resource_type
            ));
            for candidate in analysis.comparisons_for_create(address) {
                Self::write_pair(&mut output, analysis, candidate);
            }
        }

        Self::write_unmatched(&mut output, "Unmatched deletes", &analysis.unmatched_deletes);
        Self::write_unmatched(&mut output, "Unmatched creates", &analysis.unmatched_creates);

        output.push_str(&format!(
            "\nSummary: {} matched, {} deletes and {} creates left unmatched\n",
            analysis.matches.len().to_string().green(),
            analysis.unmatched_deletes.len().to_string().red(),
            analysis.unmatched_creates.len().to_string().yellow()
        ));

        output
    }

    fn write_pair(output: &mut String, analysis: &Analysis, pair: &PairDiff) {
        let matched = analysis.matches.iter().any(|m| {
            m.delete.address == pair.delete.address && m.create.address == pair.create.address
        });
        let marker = if matched {
            "✓".green()
        } else if pair.score() == 0 {
            "=".yellow()
        } else {
            "✗".red()
        };
        output.push_str(&format!(
            "   {marker} {}: {} differences\n",
            pair.delete.address,
            pair.score()
        ));
        for difference in &pair.differences {
            let line = if difference.ignored {
                difference.to_string().dimmed().to_string()
            } else {
                difference.to_string()
            };
            output.push_str(&format!("       {line}\n"));
        }
    }

    fn write_unmatched(output: &mut String, title: &str, candidates: &[Arc<Candidate>]) {
        if candidates.is_empty() {
            return;
        }
        output.push_str(&format!("\n{title}:\n"));
        for candidate in candidates {
            output.push_str(&format!("   - {}\n", candidate.address));
        }
    }

    /// Formats moves as a dry-run listing.
    #[must_use]
    pub fn format_moves(&self, moves: &[Move]) -> String {
        match self.format {
            ReportFormat::Json => serde_json::to_string_pretty(moves).unwrap_or_default(),
            ReportFormat::Text => {
                if moves.is_empty() {
                    return format!("{} Found no moves to make\n", "✓".green());
                }
                let mut output = format!("Found {} moves:\n", moves.len());
                for m in moves {
                    output.push_str(&format!("   {} {} {}\n", m.from, "->".cyan(), m.to));
                }
                output
            }
        }
    }

    /// Formats a progress message.
    #[must_use]
    pub fn info(&self, message: &str) -> String {
        self.message("info", &"•".cyan().to_string(), message)
    }

    /// Formats a success message.
    #[must_use]
    pub fn success(&self, message: &str) -> String {
        self.message("success", &"✓".green().to_string(), message)
    }

    /// Formats an error message.
    #[must_use]
    pub fn error(&self, message: &str) -> String {
        self.message("error", &"✗".red().to_string(), message)
    }

    /// Formats a warning message.
    #[must_use]
    pub fn warning(&self, message: &str) -> String {
        self.message("warning", &"⚠".yellow().to_string(), message)
    }

    fn message(&self, status: &str, symbol: &str, message: &str) -> String {
        match self.format {
            ReportFormat::Json => {
                let json = serde_json::json!({ "status": status, "message": message });
                serde_json::to_string(&json).unwrap_or_default()
            }
            ReportFormat::Text => format!("{symbol} {message}"),
        }
    }
}

// JSON serialization helpers

#[derive(Serialize)]
struct AnalysisJson<'a> {
    fingerprint: String,
    matches: Vec<MatchJson<'a>>,
    unmatched_deletes: Vec<&'a str>,
    unmatched_creates: Vec<&'a str>,
    comparisons: Vec<ComparisonJson<'a>>,
}

#[derive(Serialize)]
struct MatchJson<'a> {
    resource_type: &'a str,
    from: &'a str,
    to: &'a str,
    score: usize,
}

#[derive(Serialize)]
struct ComparisonJson<'a> {
    delete: &'a str,
    create: &'a str,
    score: usize,
    differences: &'a [AttributeDifference],
}

impl<'a> From<&'a Analysis> for AnalysisJson<'a> {
    fn from(analysis: &'a Analysis) -> Self {
        Self {
            fingerprint: analysis.fingerprint(),
            matches: analysis
                .matches
                .iter()
                .map(|m| MatchJson {
                    resource_type: &m.create.resource_type,
                    from: &m.delete.address,
                    to: &m.create.address,
                    score: m.diff.score(),
                })
                .collect(),
            unmatched_deletes: analysis
                .unmatched_deletes
                .iter()
                .map(|c| c.address.as_str())
                .collect(),
            unmatched_creates: analysis
                .unmatched_creates
                .iter()
                .map(|c| c.address.as_str())
                .collect(),
            comparisons: analysis
                .comparisons
                .iter()
                .map(|c| ComparisonJson {
                    delete: &c.delete.address,
                    create: &c.create.address,
                    score: c.score(),
                    differences: &c.differences,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analysis_from_plan, moves_from_analysis};
    use crate::ignore::parse_rule;
    use crate::plan::Plan;
    use serde_json::json;

    fn analysis() -> Analysis {
        let plan: Plan = serde_json::from_value(json!({
            "resource_changes": [
                {"address": "aws_instance.old", "type": "aws_instance",
                 "change": {"actions": ["delete"], "before": {"ami": "x", "tags": {"Name": "a"}}}},
                {"address": "aws_instance.gone", "type": "aws_instance",
                 "change": {"actions": ["delete"], "before": {"ami": "z", "tags": {"Name": "q"}}}},
                {"address": "aws_instance.new", "type": "aws_instance",
                 "change": {"actions": ["create"], "after": {"ami": "x", "tags": {"Name": "b"}}}}
            ]
        }))
        .unwrap();
        let rules = vec![parse_rule("aws_instance.tags.Name").unwrap()];
        analysis_from_plan(&plan, &rules).unwrap()
    }

    #[test]
    fn test_format_analysis_text() {
        let output = OutputFormatter::new(ReportFormat::Text).format_analysis(&analysis());

        assert!(output.contains("aws_instance.old"));
        assert!(output.contains("aws_instance.new"));
        assert!(output.contains("Unmatched deletes:"));
        assert!(output.contains("- aws_instance.gone"));
        assert!(!output.contains("Unmatched creates:"));
        assert!(output.contains("tags.Name"));
    }

    #[test]
    fn test_format_analysis_json() {
        let analysis = analysis();
        let output = OutputFormatter::new(ReportFormat::Json).format_analysis(&analysis);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["fingerprint"], analysis.fingerprint());
        assert_eq!(value["matches"][0]["from"], "aws_instance.old");
        assert_eq!(value["matches"][0]["to"], "aws_instance.new");
        assert_eq!(value["matches"][0]["score"], 0);
        assert_eq!(value["unmatched_deletes"][0], "aws_instance.gone");
        assert_eq!(value["comparisons"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_format_moves() {
        let formatter = OutputFormatter::new(ReportFormat::Text);
        assert!(formatter.format_moves(&[]).contains("Found no moves to make"));

        let moves = moves_from_analysis(&analysis());
        let output = formatter.format_moves(&moves);
        assert!(output.starts_with("Found 1 moves:"));
        assert!(output.contains("aws_instance.old"));
    }

    #[test]
    fn test_text_messages() {
        let formatter = OutputFormatter::new(ReportFormat::Text);
        assert!(formatter.info("Analysing plan...").ends_with(" Analysing plan..."));
        assert!(formatter.warning("rule listed twice").ends_with(" rule listed twice"));
    }

    #[test]
    fn test_json_messages() {
        let formatter = OutputFormatter::new(ReportFormat::Json);
        let value: serde_json::Value =
            serde_json::from_str(&formatter.error("plan failed")).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["message"], "plan failed");

        let value: serde_json::Value =
            serde_json::from_str(&formatter.info("Analysing plan...")).unwrap();
        assert_eq!(value["status"], "info");
    }
}
