//! Data models for the peer-review pipeline.
//!
//! This module contains the core data structures shared by every stage:
//! analyzer results, category bundles, score sets, and the terminal
//! executive summary. All of them serialize to the JSON interchange
//! format consumed by report rendering, so field names are contractual.

use crate::registry::Family;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// A single improvement suggestion produced by an analyzer or by the
/// quality-control pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// The problematic text as it appears in the manuscript.
    #[serde(default)]
    pub original_text: String,
    /// The suggested replacement.
    #[serde(default)]
    pub improved_version: String,
    /// Why the replacement is better.
    #[serde(default)]
    pub explanation: String,
    /// Where in the manuscript the change applies.
    #[serde(default)]
    pub location: String,
}

/// A critical remark raised by an analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Remark {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub impact: String,
}

/// The output of one analyzer for one code.
///
/// The same schema is used for raw fan-out results, quality-controlled
/// results, failure stubs, and not-applicable placeholders. Results are
/// created once and never mutated; the quality-control stage builds new
/// values rather than editing the originals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Display name of the analysis dimension, attached by quality control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
    /// Score in [1,5], or 0 for failure / not applicable.
    ///
    /// Deserialized leniently: a missing or non-numeric value becomes
    /// `None` so the score aggregator can skip it instead of punishing
    /// the category with a spurious zero.
    #[serde(
        default,
        deserialize_with = "lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub score: Option<f64>,
    /// Issues the analyzer flagged.
    #[serde(default)]
    pub critical_remarks: Vec<Remark>,
    /// Concrete rewrite suggestions.
    #[serde(default)]
    pub improvement_suggestions: Vec<Suggestion>,
    /// Named sub-assessments mapped to prose.
    #[serde(default)]
    pub detailed_feedback: HashMap<String, String>,
    /// Overall assessment paragraph.
    #[serde(default)]
    pub summary: String,
    /// Marks a degraded stub standing in for a failed analyzer.
    #[serde(default, skip_serializing_if = "is_false")]
    pub error: bool,
}

impl AnalysisResult {
    /// Creates a well-formed stub for an analyzer that failed outright.
    ///
    /// This is the single conversion point from a capability error to a
    /// degraded result; the fan-out controller never lets the error itself
    /// propagate past one analyzer's boundary.
    pub fn failure_stub(message: &str) -> Self {
        Self {
            score: Some(0.0),
            summary: format!("Analysis failed due to error: {}", message),
            error: true,
            ..Self::default()
        }
    }

    /// Creates the placeholder used by the completeness pass for codes the
    /// quality-control reply did not cover.
    pub fn not_applicable(display_name: &str) -> Self {
        Self {
            section_name: Some(display_name.to_string()),
            score: Some(0.0),
            summary: format!("Not applicable - no {} content detected", display_name),
            ..Self::default()
        }
    }

    /// True when the result carries no content at all. Such entries are
    /// dropped before quality control together with error stubs.
    pub fn is_empty(&self) -> bool {
        self.score.is_none()
            && self.summary.trim().is_empty()
            && self.critical_remarks.is_empty()
            && self.improvement_suggestions.is_empty()
            && self.detailed_feedback.is_empty()
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Accepts any JSON value for `score` and keeps only real numbers.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

/// A code -> result mapping scoped to one family.
///
/// Before quality control the key set may be a subset of the family's
/// static codes (failed analyzers are dropped); afterwards it equals the
/// static code set exactly.
pub type CategoryBundle = HashMap<String, AnalysisResult>;

/// The three category bundles, serialized under the interchange keys the
/// report renderer expects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewBundle {
    #[serde(rename = "section_results", default)]
    pub section: CategoryBundle,
    #[serde(rename = "rigor_results", default)]
    pub rigor: CategoryBundle,
    #[serde(rename = "writing_results", default)]
    pub writing: CategoryBundle,
}

impl ReviewBundle {
    /// Borrow the bundle for one family.
    pub fn family(&self, family: Family) -> &CategoryBundle {
        match family {
            Family::Section => &self.section,
            Family::Rigor => &self.rigor,
            Family::Writing => &self.writing,
        }
    }

    /// Mutably borrow the bundle for one family.
    pub fn family_mut(&mut self, family: Family) -> &mut CategoryBundle {
        match family {
            Family::Section => &mut self.section,
            Family::Rigor => &mut self.rigor,
            Family::Writing => &mut self.writing,
        }
    }

    /// Total number of entries across all three families.
    pub fn len(&self) -> usize {
        self.section.len() + self.rigor.len() + self.writing.len()
    }

    /// True when no family has any entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-category and final scores, derived from a quality-controlled
/// bundle and never set independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub section_score: f64,
    pub rigor_score: f64,
    pub writing_score: f64,
    pub final_score: f64,
}

/// The terminal artifact of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    /// Title extracted by the balanced pass, or "Title not found".
    pub manuscript_title: String,
    /// The synthesized three-paragraph summary.
    pub executive_summary: String,
    /// The uncontaminated first-pass review, kept as a cross-check.
    pub independent_review: String,
    pub scores: ScoreSet,
}

/// User-supplied venue and focus hints threaded through the
/// quality-control and summary prompts.
///
/// Empty or whitespace-only inputs fall back to neutral defaults so the
/// prompts never interpolate blank phrases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewContext {
    #[serde(rename = "target_publication_outlets")]
    pub target_outlets: String,
    #[serde(rename = "review_focus_areas")]
    pub focus_areas: String,
}

impl ReviewContext {
    pub const DEFAULT_OUTLETS: &'static str = "the target journal";
    pub const DEFAULT_FOCUS: &'static str = "general aspects";

    /// Build a context, sanitizing empty inputs to the defaults.
    pub fn new(target_outlets: &str, focus_areas: &str) -> Self {
        let outlets = target_outlets.trim();
        let focus = focus_areas.trim();
        Self {
            target_outlets: if outlets.is_empty() {
                Self::DEFAULT_OUTLETS.to_string()
            } else {
                outlets.to_string()
            },
            focus_areas: if focus.is_empty() {
                Self::DEFAULT_FOCUS.to_string()
            } else {
                focus.to_string()
            },
        }
    }
}

impl Default for ReviewContext {
    fn default() -> Self {
        Self::new("", "")
    }
}

/// Metadata about a review run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the reviewed manuscript.
    pub manuscript: String,
    /// Date and time of the review.
    pub review_date: DateTime<Utc>,
    /// Name of the LLM model used.
    pub model_used: String,
    /// Number of analyzers invoked.
    pub analyzers_run: usize,
    /// Number of analyzers that degraded to stubs.
    pub analyzers_failed: usize,
    /// Duration of the full pipeline in seconds.
    pub duration_seconds: f64,
    /// Target publication outlets the review was tailored to.
    pub target_outlets: String,
    /// Focus areas the user asked for.
    pub focus_areas: String,
}

/// The complete review report: metadata, the executive summary, and the
/// quality-controlled results. This is the unit written to disk and it
/// round-trips through JSON without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    pub metadata: ReportMetadata,
    pub summary: ExecutiveSummary,
    pub results: ReviewBundle,
}
