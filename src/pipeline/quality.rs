//! Quality-control validation of analyzer results.
//!
//! Each family's surviving results are re-validated by one LLM pass that
//! prunes duplicate feedback, reassesses scores, and marks dimensions
//! with nothing to review. The completeness pass afterwards guarantees
//! that every code of the family appears in the output exactly once,
//! whatever the model replied.

use crate::extract::excerpt;
use crate::llm::{extract_json_object, LanguageModel, LlmError, REVIEWER_SYSTEM_PROMPT};
use crate::models::{AnalysisResult, CategoryBundle, ReviewBundle, ReviewContext};
use crate::registry::{self, Family};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

/// Errors from the quality-control stage.
///
/// Analyzer noise is contained upstream, but an unusable validation
/// reply means the whole family cannot be trusted, so these abort the
/// run and always name the family concerned.
#[derive(Debug, Error)]
pub enum QualityControlError {
    #[error("{family} quality-control call failed: {source}")]
    Model {
        family: Family,
        #[source]
        source: LlmError,
    },

    #[error("{family} quality-control reply was not valid JSON: {detail}")]
    Unparsable { family: Family, detail: String },

    #[error("{family} quality-control reply was not a JSON object")]
    NotAMapping { family: Family },
}

/// Validates all three families concurrently.
pub async fn validate_all(
    model: &dyn LanguageModel,
    bundle: &ReviewBundle,
    manuscript_text: &str,
    context: &ReviewContext,
    preview_chars: usize,
) -> Result<ReviewBundle, QualityControlError> {
    let (section, rigor, writing) = tokio::join!(
        validate_family(
            model,
            Family::Section,
            &bundle.section,
            manuscript_text,
            context,
            preview_chars
        ),
        validate_family(
            model,
            Family::Rigor,
            &bundle.rigor,
            manuscript_text,
            context,
            preview_chars
        ),
        validate_family(
            model,
            Family::Writing,
            &bundle.writing,
            manuscript_text,
            context,
            preview_chars
        ),
    );

    Ok(ReviewBundle {
        section: section?,
        rigor: rigor?,
        writing: writing?,
    })
}

/// Runs the quality-control pass for one family.
///
/// The returned bundle covers every code of the family: validated
/// entries carry the canonical display name, codes the reply skipped
/// become not-applicable placeholders.
pub async fn validate_family(
    model: &dyn LanguageModel,
    family: Family,
    results: &CategoryBundle,
    manuscript_text: &str,
    context: &ReviewContext,
    preview_chars: usize,
) -> Result<CategoryBundle, QualityControlError> {
    info!("Validating {} results...", family.label());

    let prompt = build_family_prompt(family, results, manuscript_text, context, preview_chars);

    let reply = model
        .complete(REVIEWER_SYSTEM_PROMPT, &prompt, true)
        .await
        .map_err(|source| QualityControlError::Model { family, source })?;

    let parsed = parse_family_reply(family, &reply)?;
    Ok(complete_family(family, parsed))
}

/// Builds the validation prompt for one family.
fn build_family_prompt(
    family: Family,
    results: &CategoryBundle,
    manuscript_text: &str,
    context: &ReviewContext,
    preview_chars: usize,
) -> String {
    let category = family.results_key().replace('_', " ");

    let headers: Vec<String> = family
        .analyzers()
        .map(|spec| format!("o   {} – {}", spec.code, spec.name))
        .collect();

    let first = family
        .analyzers()
        .next()
        .expect("every family has analyzers");
    let example = serde_json::json!({
        family.results_key(): {
            first.code: {
                "section_name": first.name,
                "score": 4,
                "summary": "Critical remarks, tips, and positive aspects...",
                "improvement_suggestions": [{
                    "original_text": "Original text from manuscript",
                    "improved_version": "Suggested improvement",
                    "explanation": "Explanation for the improvement",
                    "location": "Where the change applies"
                }]
            }
        }
    });

    let context_json =
        serde_json::to_string_pretty(context).expect("context serializes to JSON");
    let results_json =
        serde_json::to_string_pretty(results).expect("bundle serializes to JSON");
    let example_json =
        serde_json::to_string_pretty(&example).expect("example serializes to JSON");

    format!(
        "You are a Quality Control Agent responsible for reviewing and validating the outputs \
         from AI review agents. Your task is to analyze the {category} category:\n\
         \n\
         Category Sections:\n\
         {headers}\n\
         \n\
         For each section, you should:\n\
         1. Validate the accuracy and relevance of the feedback\n\
         2. Identify the most critical and helpful suggestions (aim for ~3 per section)\n\
         3. Add any additional valuable insights\n\
         4. Note if any section is not applicable\n\
         5. Reassess the 1-5 score for each section\n\
         \n\
         Structure your analysis in the following format for each section:\n\
         - A summary paragraph highlighting:\n\
           * Critical remarks\n\
           * Tips for improvement\n\
           * Positive aspects of the manuscript\n\
         - For each suggestion (up to 3 per section):\n\
           * Original Text\n\
           * Improved Version\n\
           * Explanation for the improvement\n\
           * Location\n\
         \n\
         Important guidelines:\n\
         - Avoid duplicate issues\n\
         - Focus on the most severe and helpful remarks\n\
         - Clearly mark non-applicable sections\n\
         - Maintain the existing JSON structure\n\
         - Ensure all feedback is constructive and actionable\n\
         \n\
         Please analyze the following inputs:\n\
         \n\
         Manuscript Text (Preview):\n\
         {preview}...\n\
         \n\
         Context:\n\
         {context_json}\n\
         \n\
         {label} Results:\n\
         {results_json}\n\
         \n\
         Provide your analysis in a structured JSON format that exactly matches this structure:\n\
         {example_json}\n\
         \n\
         For each section:\n\
         1. Include the full section name\n\
         2. Provide a score (1-5)\n\
         3. Include a summary paragraph\n\
         4. Include up to 3 improvement suggestions with original text, improved version, \
         explanation, and location\n\
         5. If a section is not applicable, set its score to 0 and note this in the summary\n\
         \n\
         Ensure your response is valid JSON and includes all required fields.",
        category = category,
        headers = headers.join("\n"),
        preview = excerpt(manuscript_text, preview_chars),
        context_json = context_json,
        label = family.label(),
        results_json = results_json,
        example_json = example_json,
    )
}

/// Parses the validation reply and pulls out this family's payload.
///
/// A reply that is not a JSON object at the top level is fatal. Inside
/// the payload, unknown codes and malformed entries are discarded with a
/// warning; the completeness pass turns the gaps into placeholders.
fn parse_family_reply(
    family: Family,
    reply: &str,
) -> Result<CategoryBundle, QualityControlError> {
    // JSON-mode replies parse directly; brace extraction rescues replies
    // wrapped in prose or code fences.
    let value: Value = match serde_json::from_str(reply.trim()) {
        Ok(value) => value,
        Err(_) => {
            let json =
                extract_json_object(reply).ok_or_else(|| QualityControlError::Unparsable {
                    family,
                    detail: "reply contained no JSON object".to_string(),
                })?;
            serde_json::from_str(json).map_err(|e| QualityControlError::Unparsable {
                family,
                detail: e.to_string(),
            })?
        }
    };

    let mut top = match value {
        Value::Object(map) => map,
        _ => return Err(QualityControlError::NotAMapping { family }),
    };

    let payload = match top.remove(family.results_key()) {
        Some(Value::Object(payload)) => payload,
        Some(_) => {
            warn!(
                "{} payload is not an object; treating every code as missing",
                family.label()
            );
            return Ok(CategoryBundle::new());
        }
        None => {
            warn!(
                "{} reply lacks the {} key; treating every code as missing",
                family.label(),
                family.results_key()
            );
            return Ok(CategoryBundle::new());
        }
    };

    let mut bundle = CategoryBundle::new();
    for (code, entry) in payload {
        let belongs = registry::find(&code).map(|spec| spec.family) == Some(family);
        if !belongs {
            warn!("Ignoring unexpected key {} in {} reply", code, family.label());
            continue;
        }

        match serde_json::from_value::<AnalysisResult>(entry) {
            Ok(result) => {
                bundle.insert(code, result);
            }
            Err(e) => warn!("Discarding malformed {} entry: {}", code, e),
        }
    }

    Ok(bundle)
}

/// Restores schema completeness for one family.
///
/// Every code appears exactly once afterwards, and `section_name` is
/// always the canonical display name regardless of what the model wrote.
fn complete_family(family: Family, mut parsed: CategoryBundle) -> CategoryBundle {
    let mut complete = CategoryBundle::new();

    for spec in family.analyzers() {
        let entry = match parsed.remove(spec.code) {
            Some(mut result) => {
                result.section_name = Some(spec.name.to_string());
                result
            }
            None => AnalysisResult::not_applicable(spec.name),
        };
        complete.insert(spec.code.to_string(), entry);
    }

    complete
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::FnModel;

    fn context() -> ReviewContext {
        ReviewContext::new("Test Journal", "statistics")
    }

    fn seed_bundle() -> CategoryBundle {
        let mut bundle = CategoryBundle::new();
        bundle.insert(
            "S1".to_string(),
            AnalysisResult {
                score: Some(4.0),
                summary: "Fine title.".to_string(),
                ..AnalysisResult::default()
            },
        );
        bundle
    }

    #[tokio::test]
    async fn test_validated_family_is_complete() {
        let model = FnModel::new(|_, _, _| {
            Ok(r#"{
                "section_results": {
                    "S1": {"score": 5, "summary": "Excellent title.", "section_name": "wrong name"}
                }
            }"#
            .to_string())
        });

        let validated = validate_family(
            &model,
            Family::Section,
            &seed_bundle(),
            "manuscript",
            &context(),
            1000,
        )
        .await
        .unwrap();

        assert_eq!(validated.len(), 10);

        // Validated entry keeps its content but gets the canonical name.
        let s1 = validated.get("S1").unwrap();
        assert_eq!(s1.score, Some(5.0));
        assert_eq!(s1.section_name.as_deref(), Some("Title and Keywords"));

        // Skipped codes become placeholders with the exact wording.
        let s4 = validated.get("S4").unwrap();
        assert_eq!(s4.score, Some(0.0));
        assert_eq!(
            s4.summary,
            "Not applicable - no Literature Review content detected"
        );
        assert_eq!(s4.section_name.as_deref(), Some("Literature Review"));
    }

    #[tokio::test]
    async fn test_unparsable_reply_is_fatal_and_names_family() {
        let model = FnModel::new(|_, _, _| Ok("I refuse to answer in JSON.".to_string()));

        let err = validate_family(
            &model,
            Family::Rigor,
            &CategoryBundle::new(),
            "manuscript",
            &context(),
            1000,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, QualityControlError::Unparsable { .. }));
        assert!(err.to_string().contains("Scientific Rigor"));
    }

    #[tokio::test]
    async fn test_broken_json_reply_is_fatal() {
        let model = FnModel::new(|_, _, _| Ok("prose then {\"x\"} oops".to_string()));

        let err = validate_family(
            &model,
            Family::Writing,
            &CategoryBundle::new(),
            "manuscript",
            &context(),
            1000,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, QualityControlError::Unparsable { .. }));
        assert!(err.to_string().contains("Writing and Presentation"));
    }

    #[tokio::test]
    async fn test_non_object_reply_is_not_a_mapping() {
        let model = FnModel::new(|_, _, _| Ok("[1, 2, 3]".to_string()));

        let err = validate_family(
            &model,
            Family::Writing,
            &CategoryBundle::new(),
            "manuscript",
            &context(),
            1000,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, QualityControlError::NotAMapping { .. }));
        assert!(err.to_string().contains("Writing and Presentation"));
    }

    #[test]
    fn test_non_object_family_payload_counts_as_missing() {
        let parsed = parse_family_reply(Family::Writing, r#"{"writing_results": "nope"}"#);
        assert!(parsed.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_family_key_yields_all_placeholders() {
        let model = FnModel::new(|_, _, _| Ok(r#"{"unrelated": {}}"#.to_string()));

        let validated = validate_family(
            &model,
            Family::Rigor,
            &seed_bundle(),
            "manuscript",
            &context(),
            1000,
        )
        .await
        .unwrap();

        assert_eq!(validated.len(), 7);
        assert!(validated
            .values()
            .all(|r| r.score == Some(0.0) && r.summary.starts_with("Not applicable")));
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_codes_are_filtered() {
        let model = FnModel::new(|_, _, _| {
            Ok(r#"{
                "writing_results": {
                    "W1": {"score": 3, "summary": "Decent grammar."},
                    "W99": {"score": 5, "summary": "Should not appear."},
                    "S1": {"score": 5, "summary": "Wrong family."},
                    "W2": "not an object"
                }
            }"#
            .to_string())
        });

        let validated = validate_family(
            &model,
            Family::Writing,
            &CategoryBundle::new(),
            "manuscript",
            &context(),
            1000,
        )
        .await
        .unwrap();

        assert_eq!(validated.len(), 7);
        assert!(!validated.contains_key("W99"));
        assert!(!validated.contains_key("S1"));
        assert_eq!(validated.get("W1").unwrap().score, Some(3.0));
        // Malformed W2 degraded to a placeholder.
        assert!(validated.get("W2").unwrap().summary.starts_with("Not applicable"));
    }

    #[test]
    fn test_model_failure_is_fatal() {
        let model = FnModel::new(|_, _, _| Err(LlmError::Timeout(1)));

        let err = tokio_test::block_on(validate_family(
            &model,
            Family::Section,
            &CategoryBundle::new(),
            "manuscript",
            &context(),
            1000,
        ))
        .unwrap_err();

        assert!(matches!(err, QualityControlError::Model { .. }));
        assert!(err.to_string().contains("Section Review"));
    }

    #[tokio::test]
    async fn test_validate_all_covers_three_families() {
        let model = FnModel::new(|_, prompt, _| {
            let payload = if prompt.contains("the section results category") {
                r#"{"section_results": {"S2": {"score": 4, "summary": "ok"}}}"#
            } else if prompt.contains("the rigor results category") {
                r#"{"rigor_results": {"R1": {"score": 3, "summary": "ok"}}}"#
            } else {
                r#"{"writing_results": {"W1": {"score": 2, "summary": "ok"}}}"#
            };
            Ok(payload.to_string())
        });

        let validated = validate_all(
            &model,
            &ReviewBundle::default(),
            "manuscript",
            &context(),
            1000,
        )
        .await
        .unwrap();

        assert_eq!(validated.section.len(), 10);
        assert_eq!(validated.rigor.len(), 7);
        assert_eq!(validated.writing.len(), 7);
        assert_eq!(validated.len(), 24);
        assert_eq!(validated.section.get("S2").unwrap().score, Some(4.0));
    }

    #[test]
    fn test_prompt_structure() {
        let prompt = build_family_prompt(
            Family::Section,
            &seed_bundle(),
            &"m".repeat(5000),
            &context(),
            1000,
        );

        assert!(prompt.contains("the section results category"));
        assert!(prompt.contains("o   S1 – Title and Keywords"));
        assert!(prompt.contains("o   S10 – Supplementary Materials"));
        assert!(prompt.contains("Manuscript Text (Preview):"));
        assert!(prompt.contains("\"target_publication_outlets\": \"Test Journal\""));
        assert!(prompt.contains("Section Review Results:"));
        assert!(prompt.contains("\"section_results\""));

        // The preview is budgeted: the full 5000-char text must not appear.
        assert!(!prompt.contains(&"m".repeat(1001)));
        assert!(prompt.contains(&format!("{}...", "m".repeat(1000))));
    }
}
