//! Executive summary synthesis.
//!
//! Two passes: an independent review written before seeing any analyzer
//! output, then a balanced pass that weighs that review against the
//! quality-controlled results and extracts the manuscript title.

use crate::extract::excerpt;
use crate::llm::{extract_json_object, LanguageModel, LlmError, REVIEWER_SYSTEM_PROMPT};
use crate::models::{ExecutiveSummary, ReviewBundle, ReviewContext};
use crate::pipeline::scoring::calculate_scores;
use serde::Deserialize;
use tracing::{info, warn};

/// Title used when the balanced pass does not yield one.
pub const TITLE_FALLBACK: &str = "Title not found";

/// System prompt for the free-text independent pass.
const SUMMARY_SYSTEM_PROMPT: &str = "You are an expert academic reviewer.";

/// Shape of the balanced-pass reply.
#[derive(Debug, Deserialize)]
struct BalancedReply {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    executive_summary: Option<String>,
}

/// Generates the two-pass executive summary with scores attached.
///
/// Model failures here are fatal: without a summary there is no report
/// worth writing. A balanced reply that is not valid JSON is not fatal;
/// it degrades to the raw reply text under a fallback title.
pub async fn generate_summary(
    model: &dyn LanguageModel,
    manuscript_text: &str,
    results: &ReviewBundle,
    context: &ReviewContext,
    excerpt_chars: usize,
) -> Result<ExecutiveSummary, LlmError> {
    info!("Generating independent review...");
    let independent_review =
        independent_review(model, manuscript_text, context, excerpt_chars).await?;

    info!("Synthesizing balanced executive summary...");
    let (manuscript_title, executive_summary) =
        balanced_summary(model, &independent_review, results, context).await?;

    Ok(ExecutiveSummary {
        manuscript_title,
        executive_summary,
        independent_review,
        scores: calculate_scores(results),
    })
}

/// First pass: a free-text review of the manuscript excerpt alone.
async fn independent_review(
    model: &dyn LanguageModel,
    manuscript_text: &str,
    context: &ReviewContext,
    excerpt_chars: usize,
) -> Result<String, LlmError> {
    let target = &context.target_outlets;
    let focus = &context.focus_areas;

    let prompt = format!(
        "You are an expert reviewer for {target}. Read the following manuscript content and \
         user priorities, then independently write a high-level review in three paragraphs:\n\
         \n\
         Manuscript Content:\n\
         {content}\n\
         \n\
         User Priorities:\n\
         - Target Journal: {target}\n\
         - Focus Areas: {focus}\n\
         \n\
         Write:\n\
         1. A summary of what the manuscript is about\n\
         2. The main strengths and weaknesses, with special attention to {focus}\n\
         3. The most critical suggestions for improvement, considering {target} standards\n\
         \n\
         Be concise, professional, and focus on the most important points. Do not reference \
         any other reviews or JSON files yet.",
        target = target,
        focus = focus,
        content = excerpt(manuscript_text, excerpt_chars),
    );

    let review = model
        .complete(SUMMARY_SYSTEM_PROMPT, &prompt, false)
        .await?;

    Ok(review.trim().to_string())
}

/// Second pass: balances the independent review against the validated
/// results and extracts the title.
async fn balanced_summary(
    model: &dyn LanguageModel,
    independent_review: &str,
    results: &ReviewBundle,
    context: &ReviewContext,
) -> Result<(String, String), LlmError> {
    let target = &context.target_outlets;
    let focus = &context.focus_areas;
    let results_json =
        serde_json::to_string_pretty(results).expect("bundle serializes to JSON");

    let prompt = format!(
        "You are an Executive Summary Agent for {target}. You have two sources:\n\
         1. Your own independent review of the manuscript (below)\n\
         2. The quality-controlled review JSON (below)\n\
         \n\
         First, extract the manuscript's title from the content. Then, write a unified \
         executive summary in three paragraphs that:\n\
         - Provides a clear, concise overview of the manuscript\n\
         - Presents a balanced assessment of strengths and weaknesses\n\
         - Offers specific, actionable recommendations for improvement\n\
         \n\
         IMPORTANT: While the quality-controlled review JSON provides valuable insights, your \
         executive summary should:\n\
         - Draw naturally from both your independent review and the quality control findings\n\
         - Focus on the most significant and impactful points, regardless of source\n\
         - Present a cohesive narrative that flows naturally\n\
         - Avoid mechanically listing points from either source\n\
         \n\
         Your Own Review:\n\
         {review}\n\
         \n\
         User Priorities:\n\
         - Target Journal: {target}\n\
         - Focus Areas: {focus}\n\
         \n\
         Quality-Controlled Review (JSON):\n\
         {results_json}\n\
         \n\
         First, extract the manuscript's title. Then write a cohesive executive summary that:\n\
         1. Summarizes the manuscript's content and contribution, highlighting its key \
         insights and significance\n\
         2. Evaluates its strengths and weaknesses, with special attention to {focus}\n\
         3. Provides clear, actionable recommendations for improvement\n\
         \n\
         Format your response as a JSON object with two fields:\n\
         1. \"title\": The extracted manuscript title\n\
         2. \"executive_summary\": The three-paragraph summary\n\
         \n\
         Keep the summary within half a page (about 250 words), use professional language, \
         and be specific and constructive. Write as a single, unified document that flows \
         naturally while incorporating insights from both sources.",
        target = target,
        focus = focus,
        review = independent_review,
        results_json = results_json,
    );

    let reply = model.complete(REVIEWER_SYSTEM_PROMPT, &prompt, true).await?;
    let reply = reply.trim();

    let parsed = serde_json::from_str::<BalancedReply>(reply).ok().or_else(|| {
        extract_json_object(reply).and_then(|json| serde_json::from_str(json).ok())
    });

    match parsed {
        Some(balanced) => Ok((
            balanced
                .title
                .unwrap_or_else(|| TITLE_FALLBACK.to_string()),
            balanced.executive_summary.unwrap_or_default(),
        )),
        None => {
            warn!("Could not parse summary reply as JSON; using raw response");
            Ok((TITLE_FALLBACK.to_string(), reply.to_string()))
        }
    }
}
