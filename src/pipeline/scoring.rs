//! Score aggregation.

use crate::models::{ReviewBundle, ScoreSet};
use crate::registry::Family;

/// Computes per-category means and the final score.
///
/// A category score is the mean over the codes present in its bundle
/// whose results carry a numeric score; not-applicable placeholders
/// score 0 and do weigh the mean down. A category with nothing scorable
/// scores 0. The final score is always the mean of the three category
/// scores, regardless of how many categories had content.
pub fn calculate_scores(bundle: &ReviewBundle) -> ScoreSet {
    let section_score = family_mean(bundle, Family::Section);
    let rigor_score = family_mean(bundle, Family::Rigor);
    let writing_score = family_mean(bundle, Family::Writing);

    ScoreSet {
        section_score,
        rigor_score,
        writing_score,
        final_score: (section_score + rigor_score + writing_score) / 3.0,
    }
}

fn family_mean(bundle: &ReviewBundle, family: Family) -> f64 {
    let results = bundle.family(family);

    let scores: Vec<f64> = family
        .analyzers()
        .filter_map(|spec| results.get(spec.code))
        .filter_map(|result| result.score)
        .collect();

    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}
