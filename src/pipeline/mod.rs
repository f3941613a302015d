//! The review pipeline.
//!
//! Wires the stages together: analyzer fan-out, partition by family,
//! quality control, scoring, and the executive summary. Analyzer
//! failures degrade to stubs inside the fan-out; everything after that
//! point either succeeds or aborts the run with a typed error.

pub mod analyzers;
pub mod partition;
pub mod quality;
pub mod scoring;
pub mod summary;

pub use quality::QualityControlError;

use crate::llm::{LanguageModel, LlmError};
use crate::models::{ExecutiveSummary, ReviewBundle, ReviewContext};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Tunable knobs for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Maximum analyzer requests in flight at once.
    pub max_concurrent: usize,
    /// Manuscript characters shown to each quality-control pass.
    pub qc_preview_chars: usize,
    /// Manuscript characters shown to the independent review pass.
    pub summary_excerpt_chars: usize,
    /// Draw a progress bar while the analyzers run.
    pub show_progress: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 8,
            qc_preview_chars: 1000,
            summary_excerpt_chars: 6000,
            show_progress: false,
        }
    }
}

/// Errors that abort a review run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    QualityControl(#[from] QualityControlError),

    #[error("executive summary failed: {0}")]
    Summary(#[from] LlmError),
}

/// The outcome of a full review run.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    /// Quality-controlled results, complete over all 24 codes.
    pub results: ReviewBundle,
    pub summary: ExecutiveSummary,
    /// Codes whose analyzers degraded to failure stubs.
    pub failed_analyzers: Vec<String>,
}

/// The full review pipeline.
pub struct ReviewPipeline {
    model: Arc<dyn LanguageModel>,
    context: ReviewContext,
    options: PipelineOptions,
}

impl ReviewPipeline {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        context: ReviewContext,
        options: PipelineOptions,
    ) -> Self {
        Self {
            model,
            context,
            options,
        }
    }

    /// Runs the stages in order against the extracted manuscript text.
    pub async fn run(&self, manuscript_text: &str) -> Result<ReviewOutcome, PipelineError> {
        info!(
            "Running {} analyzers ({} concurrent)...",
            crate::registry::REGISTRY.len(),
            self.options.max_concurrent
        );
        let raw = analyzers::run_all(
            self.model.as_ref(),
            manuscript_text,
            self.options.max_concurrent,
            self.options.show_progress,
        )
        .await;

        let mut failed_analyzers: Vec<String> = raw
            .iter()
            .filter(|(_, result)| result.error)
            .map(|(code, _)| code.clone())
            .collect();
        failed_analyzers.sort();

        if !failed_analyzers.is_empty() {
            warn!(
                "{} analyzers degraded to stubs: {}",
                failed_analyzers.len(),
                failed_analyzers.join(", ")
            );
        }

        let partitioned = partition::partition_results(raw);
        if partitioned.is_empty() {
            warn!("No usable analyzer results; quality control will mark every code not applicable");
        } else {
            info!("Partitioned {} usable results", partitioned.len());
        }

        let results = quality::validate_all(
            self.model.as_ref(),
            &partitioned,
            manuscript_text,
            &self.context,
            self.options.qc_preview_chars,
        )
        .await?;

        let summary = summary::generate_summary(
            self.model.as_ref(),
            manuscript_text,
            &results,
            &self.context,
            self.options.summary_excerpt_chars,
        )
        .await?;

        Ok(ReviewOutcome {
            results,
            summary,
            failed_analyzers,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FnModel;
    use super::*;

    const ANALYSIS_REPLY: &str = r#"{"score": 4, "summary": "Looks good."}"#;

    fn pipeline_with<F>(f: F) -> ReviewPipeline
    where
        F: Fn(&str, &str, bool) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        ReviewPipeline::new(
            Arc::new(FnModel::new(f)),
            ReviewContext::new("Journal of Tests", "methods"),
            PipelineOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_full_run() {
        let pipeline = pipeline_with(|_, prompt, json_reply| {
            if !json_reply {
                return Ok("Independent review text.".to_string());
            }
            if prompt.contains("Executive Summary Agent") {
                return Ok(
                    r#"{"title": "A Paper", "executive_summary": "Balanced view."}"#.to_string(),
                );
            }
            if prompt.contains("the section results category") {
                return Ok(
                    r#"{"section_results": {"S1": {"score": 4, "summary": "ok"}}}"#.to_string(),
                );
            }
            if prompt.contains("the rigor results category") {
                return Ok(
                    r#"{"rigor_results": {"R1": {"score": 3, "summary": "ok"}}}"#.to_string(),
                );
            }
            if prompt.contains("the writing results category") {
                return Ok(
                    r#"{"writing_results": {"W1": {"score": 2, "summary": "ok"}}}"#.to_string(),
                );
            }
            Ok(ANALYSIS_REPLY.to_string())
        });

        let outcome = pipeline.run("An experiment manuscript.").await.unwrap();

        assert_eq!(outcome.results.len(), 24);
        assert!(outcome.failed_analyzers.is_empty());
        assert_eq!(outcome.summary.manuscript_title, "A Paper");
        assert_eq!(outcome.summary.independent_review, "Independent review text.");

        // S1 kept its validated score, the other nine section codes became
        // placeholders scoring zero.
        let scores = &outcome.summary.scores;
        assert!((scores.section_score - 0.4).abs() < 1e-9);
        assert!((scores.rigor_score - 3.0 / 7.0).abs() < 1e-9);
        assert!((scores.writing_score - 2.0 / 7.0).abs() < 1e-9);
        let expected_final = (0.4 + 3.0 / 7.0 + 2.0 / 7.0) / 3.0;
        assert!((scores.final_score - expected_final).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_analyzer_failures_never_abort_the_run() {
        let pipeline = pipeline_with(|_, prompt, json_reply| {
            if !json_reply {
                return Ok("review".to_string());
            }
            if prompt.contains("Quality Control Agent") {
                // Minimal valid reply; every family sees its codes as missing.
                return Ok(r#"{"results": {}}"#.to_string());
            }
            if prompt.contains("Executive Summary Agent") {
                return Ok(r#"{"title": "T", "executive_summary": "S"}"#.to_string());
            }
            Err(LlmError::Timeout(1))
        });

        let outcome = pipeline.run("manuscript").await.unwrap();

        assert_eq!(outcome.failed_analyzers.len(), 24);
        assert_eq!(outcome.results.len(), 24);
        assert!(outcome
            .results
            .section
            .values()
            .all(|r| r.summary.starts_with("Not applicable")));
        assert!(outcome.summary.scores.final_score.abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_quality_control_failure_aborts() {
        let pipeline = pipeline_with(|_, prompt, json_reply| {
            if !json_reply {
                return Ok("review".to_string());
            }
            if prompt.contains("Quality Control Agent") {
                return Ok("no json at all".to_string());
            }
            Ok(ANALYSIS_REPLY.to_string())
        });

        let err = pipeline.run("manuscript").await.unwrap_err();
        assert!(matches!(err, PipelineError::QualityControl(_)));
    }

    #[tokio::test]
    async fn test_summary_failure_aborts() {
        let pipeline = pipeline_with(|_, prompt, json_reply| {
            if !json_reply {
                return Err(LlmError::Connect("api.example.com".to_string()));
            }
            if prompt.contains("Quality Control Agent") {
                return Ok(r#"{"results": {}}"#.to_string());
            }
            Ok(ANALYSIS_REPLY.to_string())
        });

        let err = pipeline.run("manuscript").await.unwrap_err();
        assert!(matches!(err, PipelineError::Summary(_)));
    }
}
