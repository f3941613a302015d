//! Partitioning of fan-out results by analysis family.

use crate::models::{AnalysisResult, ReviewBundle};
use crate::registry::Family;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Splits raw analyzer results into per-family bundles, dropping entries
/// that cannot contribute to quality control.
///
/// Failure stubs and empty results are dropped here; the quality-control
/// completeness pass later restores their codes as not-applicable
/// placeholders, so a dropped code never silently disappears from the
/// final report.
pub fn partition_results(results: HashMap<String, AnalysisResult>) -> ReviewBundle {
    let mut bundle = ReviewBundle::default();

    for (code, result) in results {
        if result.error {
            warn!("Dropping {}: analyzer reported an error", code);
            continue;
        }
        if result.is_empty() {
            warn!("Dropping {}: result is empty", code);
            continue;
        }

        match Family::of_code(&code) {
            Some(family) => {
                bundle.family_mut(family).insert(code, result);
            }
            None => debug!("Dropping {}: unknown analyzer code", code),
        }
    }

    bundle
}
