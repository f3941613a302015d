//! Analyzer fan-out.
//!
//! Runs the 24 registered analyzers against the manuscript concurrently,
//! bounded by a semaphore. An individual failure never escapes: the
//! failed analyzer contributes a zero-score stub and the rest keep
//! running.

use crate::llm::{extract_json_object, LanguageModel, REVIEWER_SYSTEM_PROMPT};
use crate::models::AnalysisResult;
use crate::registry::{AnalyzerSpec, REGISTRY};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Raw fan-out output: every analyzer code mapped to its result.
pub type AnalysisResults = HashMap<String, AnalysisResult>;

/// Unified reply format appended to every analyzer prompt.
const ANALYSIS_FORMAT: &str = r#"
Provide a detailed analysis in the following JSON format:
{
    "score": <single comprehensive score, 1-5>,
    "critical_remarks": [{
        "category": "<aspect the issue belongs to>",
        "location": "<section reference>",
        "issue": "<detailed description of the issue>",
        "severity": "<high, medium, or low>",
        "impact": "<how this affects manuscript quality>"
    }],
    "improvement_suggestions": [{
        "original_text": "<the problematic text>",
        "improved_version": "<suggested improvement>",
        "explanation": "<why this improvement helps>",
        "location": "<where to apply this change>"
    }],
    "detailed_feedback": {
        "<aspect>": "<detailed paragraph>"
    },
    "summary": "<overall assessment paragraph>"
}

Important: each suggestion should be specific, actionable, and include a clear explanation of how it improves the manuscript."#;

/// Coarse research-type classification used to steer analyzer prompts.
pub fn research_type(text: &str) -> &'static str {
    let lower = text.to_lowercase();

    if ["experiment", "methodology", "data collection"]
        .iter()
        .any(|word| lower.contains(word))
    {
        "experimental"
    } else if ["review", "literature", "meta-analysis"]
        .iter()
        .any(|word| lower.contains(word))
    {
        "review"
    } else if ["theory", "framework", "model"]
        .iter()
        .any(|word| lower.contains(word))
    {
        "theoretical"
    } else {
        "general"
    }
}

/// Builds the user prompt for one analyzer.
fn build_prompt(spec: &AnalyzerSpec, text: &str, research_type: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(spec.task);
    prompt.push_str(" Focus on:\n");
    for (i, focus) in spec.focus.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, focus));
    }
    prompt.push_str(&format!("\nText to analyze: {}\n", text));
    prompt.push_str(&format!("Research type: {}\n", research_type));
    prompt.push_str(ANALYSIS_FORMAT);
    prompt
}

/// Runs one analyzer and parses its reply into the unified schema.
///
/// This is the single conversion point from errors to degraded results;
/// callers always get a usable `AnalysisResult` back.
async fn run_analyzer(
    model: &dyn LanguageModel,
    spec: &AnalyzerSpec,
    text: &str,
    research_type: &str,
) -> AnalysisResult {
    let prompt = build_prompt(spec, text, research_type);

    let reply = match model.complete(REVIEWER_SYSTEM_PROMPT, &prompt, true).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("{} analyzer failed: {}", spec.code, e);
            return AnalysisResult::failure_stub(&format!(
                "Error analyzing {}: {}",
                spec.name, e
            ));
        }
    };

    let json = match extract_json_object(&reply) {
        Some(json) => json,
        None => {
            warn!("{} reply contained no JSON object", spec.code);
            return AnalysisResult::failure_stub(&format!(
                "Error analyzing {}: reply contained no JSON object",
                spec.name
            ));
        }
    };

    match serde_json::from_str(json) {
        Ok(result) => {
            debug!("{} completed", spec.code);
            result
        }
        Err(e) => {
            warn!("{} reply failed to parse: {}", spec.code, e);
            AnalysisResult::failure_stub(&format!("Error analyzing {}: {}", spec.name, e))
        }
    }
}

/// Runs every registered analyzer against the manuscript.
///
/// At most `max_concurrent` requests are in flight at once. The returned
/// map always has exactly one entry per registered code.
pub async fn run_all(
    model: &dyn LanguageModel,
    text: &str,
    max_concurrent: usize,
    show_progress: bool,
) -> AnalysisResults {
    let research_type = research_type(text);
    info!("Research type detected: {}", research_type);

    let semaphore = Semaphore::new(max_concurrent.max(1));

    let progress_bar = if show_progress {
        let pb = ProgressBar::new(REGISTRY.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let tasks = REGISTRY.iter().map(|spec| {
        let semaphore = &semaphore;
        let progress_bar = &progress_bar;
        async move {
            let _permit = semaphore.acquire().await.expect("semaphore closed");
            let result = run_analyzer(model, spec, text, research_type).await;
            if let Some(pb) = progress_bar {
                pb.set_message(spec.code);
                pb.inc(1);
            }
            (spec.code.to_string(), result)
        }
    });

    let results: AnalysisResults = join_all(tasks).await.into_iter().collect();

    if let Some(pb) = progress_bar {
        pb.finish_with_message("All analyzers complete");
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::FnModel;
    use crate::registry::find;

    const VALID_REPLY: &str = r#"{
        "score": 4,
        "critical_remarks": [],
        "improvement_suggestions": [],
        "detailed_feedback": {"overall": "Solid."},
        "summary": "Good section."
    }"#;

    #[test]
    fn test_research_type_heuristic() {
        assert_eq!(research_type("We ran an experiment on mice."), "experimental");
        assert_eq!(research_type("A literature survey of prior art."), "review");
        assert_eq!(research_type("We propose a new framework."), "theoretical");
        assert_eq!(research_type("Assorted notes."), "general");
        // Experimental keywords win over later branches.
        assert_eq!(
            research_type("Our methodology builds on a theory."),
            "experimental"
        );
    }

    #[test]
    fn test_build_prompt_contains_all_parts() {
        let spec = find("R5").unwrap();
        let prompt = build_prompt(spec, "manuscript body", "experimental");

        assert!(prompt.contains("statistical methods appropriateness"));
        assert!(prompt.contains("1. Statistical test selection"));
        assert!(prompt.contains("Text to analyze: manuscript body"));
        assert!(prompt.contains("Research type: experimental"));
        assert!(prompt.contains("\"improvement_suggestions\""));
    }

    #[tokio::test]
    async fn test_run_all_covers_every_code() {
        let model = FnModel::new(|_, _, _| Ok(VALID_REPLY.to_string()));
        let results = run_all(&model, "an experiment", 4, false).await;

        assert_eq!(results.len(), 24);
        for spec in &REGISTRY {
            let result = results.get(spec.code).unwrap();
            assert_eq!(result.score, Some(4.0));
            assert!(!result.error);
        }
    }

    #[tokio::test]
    async fn test_failed_analyzer_becomes_stub() {
        let model = FnModel::new(|_, prompt, _| {
            if prompt.contains("statistical methods appropriateness") {
                Err(crate::llm::LlmError::Timeout(5))
            } else {
                Ok(VALID_REPLY.to_string())
            }
        });

        let results = run_all(&model, "an experiment", 4, false).await;

        let stub = results.get("R5").unwrap();
        assert!(stub.error);
        assert_eq!(stub.score, Some(0.0));
        assert!(stub.summary.contains("Statistical Rigor"));
        assert!(stub.summary.starts_with("Analysis failed due to error:"));

        // The rest are unaffected.
        assert!(!results.get("R6").unwrap().error);
        assert_eq!(results.len(), 24);
    }

    #[tokio::test]
    async fn test_unparsable_reply_becomes_stub() {
        let model = FnModel::new(|_, prompt, _| {
            if prompt.contains("grammar, spelling, and punctuation") {
                Ok("I could not produce JSON, sorry.".to_string())
            } else {
                Ok(VALID_REPLY.to_string())
            }
        });

        let results = run_all(&model, "text", 24, false).await;

        let stub = results.get("W1").unwrap();
        assert!(stub.error);
        assert!(stub.summary.contains("no JSON object"));
    }

    #[tokio::test]
    async fn test_reply_wrapped_in_prose_still_parses() {
        let wrapped = format!("Here you go:\n```json\n{}\n```", VALID_REPLY);
        let model = FnModel::new(move |_, _, _| Ok(wrapped.clone()));

        let results = run_all(&model, "text", 24, false).await;
        assert!(results.values().all(|r| !r.error));
    }
}
