//! Markdown report generation.
//!
//! This module renders the aggregated peer review into a Markdown
//! document and a machine-readable JSON report.

use crate::models::{
    AnalysisResult, ExecutiveSummary, Remark, ReportMetadata, ReviewReport, ScoreSet, Suggestion,
};
use crate::registry::Family;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown review report.
pub fn generate_markdown_report(report: &ReviewReport) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# AI Review Report\n\n");
    output.push_str(&format!("**{}**\n\n", report.summary.manuscript_title));

    // Metadata section
    output.push_str(&generate_metadata_section(&report.metadata));

    // Score table
    output.push_str(&generate_scores_section(&report.summary.scores));

    // Executive summary and the independent review it was balanced against
    output.push_str(&generate_summary_section(&report.summary));

    // Per-category results
    for family in Family::ALL {
        output.push_str(&generate_family_section(report, family));
    }

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Manuscript:** {}\n", metadata.manuscript));
    section.push_str(&format!(
        "- **Review Date:** {}\n",
        metadata.review_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Model Used:** `{}`\n", metadata.model_used));
    section.push_str(&format!(
        "- **Publication Outlets:** {}\n",
        metadata.target_outlets
    ));
    section.push_str(&format!("- **Review Focus:** {}\n", metadata.focus_areas));
    section.push_str(&format!(
        "- **Analyzers Run:** {}\n",
        metadata.analyzers_run
    ));
    if metadata.analyzers_failed > 0 {
        section.push_str(&format!(
            "- **Analyzers Failed:** {}\n",
            metadata.analyzers_failed
        ));
    }
    section.push_str(&format!(
        "- **Review Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push_str("\n");

    section
}

/// Generate the category score table.
fn generate_scores_section(scores: &ScoreSet) -> String {
    let mut section = String::new();

    section.push_str("## Scores\n\n");
    section.push_str("| Category | Score |\n");
    section.push_str("|:---|:---:|\n");

    let rows = [
        (Family::Section.label(), scores.section_score),
        (Family::Rigor.label(), scores.rigor_score),
        (Family::Writing.label(), scores.writing_score),
    ];
    for (label, score) in rows {
        section.push_str(&format!("| {} | {:.2} / 5 |\n", label, score));
    }
    section.push_str(&format!(
        "| **Final Score** | **{:.2} / 5** |\n\n",
        scores.final_score
    ));

    section
}

/// Generate the executive summary section.
fn generate_summary_section(summary: &ExecutiveSummary) -> String {
    let mut section = String::new();

    section.push_str("## Executive Summary\n\n");
    section.push_str(summary.executive_summary.trim());
    section.push_str("\n\n");

    if !summary.independent_review.is_empty() {
        section.push_str("### Independent Review\n\n");
        section.push_str(summary.independent_review.trim());
        section.push_str("\n\n");
    }

    section
}

/// Generate the results section for one review category.
fn generate_family_section(report: &ReviewReport, family: Family) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", family.label()));

    let results = report.results.family(family);
    for spec in family.analyzers() {
        if let Some(result) = results.get(spec.code) {
            section.push_str(&generate_analyzer_block(spec.code, spec.name, result));
        }
    }

    section
}

/// Generate the detail block for a single analyzer result.
fn generate_analyzer_block(code: &str, name: &str, result: &AnalysisResult) -> String {
    let mut block = String::new();

    block.push_str(&format!("### {} - {}\n\n", code, name));

    if let Some(score) = result.score {
        block.push_str(&format!("**Score:** {:.1} / 5\n\n", score));
    }

    if !result.summary.is_empty() {
        block.push_str(result.summary.trim());
        block.push_str("\n\n");
    }

    if !result.critical_remarks.is_empty() {
        block.push_str("**Critical Remarks:**\n\n");
        for remark in &result.critical_remarks {
            block.push_str(&generate_remark_line(remark));
        }
        block.push_str("\n");
    }

    if !result.improvement_suggestions.is_empty() {
        block.push_str(&generate_suggestions_table(&result.improvement_suggestions));
    }

    if !result.detailed_feedback.is_empty() {
        block.push_str("**Detailed Feedback:**\n\n");
        let mut entries: Vec<_> = result.detailed_feedback.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in entries {
            block.push_str(&format!("- **{}:** {}\n", key.replace('_', " "), value));
        }
        block.push_str("\n");
    }

    block.push_str("---\n\n");

    block
}

/// Render a single critical remark as a list item.
fn generate_remark_line(remark: &Remark) -> String {
    let mut line = String::from("- ");

    if !remark.severity.is_empty() {
        line.push_str(&format!("**{}** ", remark.severity.to_uppercase()));
    }
    if !remark.category.is_empty() {
        line.push_str(&format!("[{}] ", remark.category));
    }
    line.push_str(remark.issue.trim());
    if !remark.location.is_empty() {
        line.push_str(&format!(" (location: {})", remark.location));
    }
    if !remark.impact.is_empty() {
        line.push_str(&format!(" Impact: {}", remark.impact));
    }
    line.push('\n');

    line
}

/// Render the improvement suggestions as a table.
fn generate_suggestions_table(suggestions: &[Suggestion]) -> String {
    let mut table = String::new();

    table.push_str("**Improvement Suggestions:**\n\n");
    table.push_str("| Original | Improved | Explanation | Location |\n");
    table.push_str("|:---|:---|:---|:---|\n");

    for suggestion in suggestions {
        table.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            table_cell(&suggestion.original_text),
            table_cell(&suggestion.improved_version),
            table_cell(&suggestion.explanation),
            table_cell(&suggestion.location),
        ));
    }
    table.push_str("\n");

    table
}

/// Escape a value for use inside a Markdown table cell.
fn table_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by peerev*\n");

    footer
}

/// Write the Markdown report to a file.
pub fn write_report(report: &ReviewReport, path: &Path) -> Result<()> {
    let content = generate_markdown_report(report);

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(())
}

/// Generate a JSON report.
pub fn generate_json_report(report: &ReviewReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write a JSON report to a file.
pub fn write_json_report(report: &ReviewReport, path: &Path) -> Result<()> {
    let content = generate_json_report(report)?;

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(())
}
