//! Static registry of the 24 analysis dimensions.
//!
//! Every dimension is one row in [`REGISTRY`]: a stable code, the family
//! it belongs to, the display name attached to results, and the prompt
//! material (task sentence plus focus list) its analyzer runs with. The
//! fan-out stage, the quality-control completeness pass, and the report
//! renderer all iterate this table, so registry order is presentation
//! order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three analysis families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// S1-S10: manuscript sections from title to supplementary materials.
    Section,
    /// R1-R7: scientific rigor dimensions.
    Rigor,
    /// W1-W7: writing and presentation dimensions.
    Writing,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Section, Family::Rigor, Family::Writing];

    /// Human-readable category label used in prompts and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Family::Section => "Section Review",
            Family::Rigor => "Scientific Rigor",
            Family::Writing => "Writing and Presentation",
        }
    }

    /// Key under which this family's bundle appears in interchange JSON.
    pub fn results_key(&self) -> &'static str {
        match self {
            Family::Section => "section_results",
            Family::Rigor => "rigor_results",
            Family::Writing => "writing_results",
        }
    }

    /// Classifies an analyzer code by its letter prefix.
    pub fn of_code(code: &str) -> Option<Family> {
        match code.chars().next() {
            Some('S') => Some(Family::Section),
            Some('R') => Some(Family::Rigor),
            Some('W') => Some(Family::Writing),
            _ => None,
        }
    }

    /// All analyzer specs belonging to this family, in registry order.
    pub fn analyzers(&self) -> impl Iterator<Item = &'static AnalyzerSpec> {
        let family = *self;
        REGISTRY.iter().filter(move |spec| spec.family == family)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One analysis dimension: identity plus the prompt material that drives
/// its analyzer.
#[derive(Debug)]
pub struct AnalyzerSpec {
    /// Stable code, e.g. "S1" or "R5".
    pub code: &'static str,
    pub family: Family,
    /// Display name, attached to results as `section_name`.
    pub name: &'static str,
    /// Opening task sentence of the analyzer prompt.
    pub task: &'static str,
    /// The aspects the analyzer is asked to focus on, in prompt order.
    pub focus: &'static [&'static str],
}

/// Looks up a spec by code.
pub fn find(code: &str) -> Option<&'static AnalyzerSpec> {
    REGISTRY.iter().find(|spec| spec.code == code)
}

/// All 24 dimensions in presentation order: S1-S10, R1-R7, W1-W7.
pub static REGISTRY: [AnalyzerSpec; 24] = [
    AnalyzerSpec {
        code: "S1",
        family: Family::Section,
        name: "Title and Keywords",
        task: "Analyze the title and keywords of the manuscript. Only consider a keywords analysis when a dedicated Keywords section exists; never infer keywords from other text.",
        focus: &[
            "Title clarity and understandability",
            "Accuracy in representing the content",
            "Impact and attention value",
            "Search engine discoverability",
            "Adherence to field conventions",
            "Keyword relevance, coverage, and specificity",
        ],
    },
    AnalyzerSpec {
        code: "S2",
        family: Family::Section,
        name: "Abstract",
        task: "Analyze the abstract for quality and completeness.",
        focus: &[
            "Structure and organization",
            "Content completeness",
            "Clarity and readability",
            "Methodology description",
            "Results presentation",
            "Conclusion strength",
            "Scientific writing standards",
            "Field-specific requirements",
            "Impact communication",
            "Technical accuracy",
        ],
    },
    AnalyzerSpec {
        code: "S3",
        family: Family::Section,
        name: "Introduction",
        task: "Analyze the introduction for quality and effectiveness.",
        focus: &[
            "Background context",
            "Problem statement",
            "Research gap identification",
            "Objectives clarity",
            "Significance justification",
            "Literature integration",
            "Flow and organization",
            "Technical accuracy",
            "Research scope",
            "Hypothesis and research questions",
        ],
    },
    AnalyzerSpec {
        code: "S4",
        family: Family::Section,
        name: "Literature Review",
        task: "Analyze the literature review for quality and comprehensiveness.",
        focus: &[
            "Coverage breadth",
            "Historical context",
            "Current state of the field",
            "Critical analysis",
            "Gap identification",
            "Theoretical framework",
            "Methodological review",
            "Citation quality",
            "Organization logic",
            "Synthesis depth",
        ],
    },
    AnalyzerSpec {
        code: "S5",
        family: Family::Section,
        name: "Methodology",
        task: "Analyze the methodology for quality and completeness.",
        focus: &[
            "Research design",
            "Data collection",
            "Sampling approach",
            "Instrumentation",
            "Procedures",
            "Analysis methods",
            "Validity measures",
            "Reliability assessment",
            "Ethical considerations",
            "Limitations handling",
        ],
    },
    AnalyzerSpec {
        code: "S6",
        family: Family::Section,
        name: "Results",
        task: "Analyze the results for quality and presentation.",
        focus: &[
            "Data presentation",
            "Statistical analysis",
            "Figure and table quality",
            "Result interpretation",
            "Significance reporting",
            "Effect sizes",
            "Confidence intervals",
            "Statistical tests",
            "Data visualization",
            "Result organization",
        ],
    },
    AnalyzerSpec {
        code: "S7",
        family: Family::Section,
        name: "Discussion",
        task: "Analyze the discussion for quality and completeness.",
        focus: &[
            "Result interpretation",
            "Literature comparison",
            "Limitation analysis",
            "Future work",
            "Practical implications",
            "Theoretical contributions",
            "Research gap addressing",
            "Methodology reflection",
            "Result significance",
            "Conclusion alignment",
        ],
    },
    AnalyzerSpec {
        code: "S8",
        family: Family::Section,
        name: "Conclusion",
        task: "Analyze the conclusion for quality and completeness.",
        focus: &[
            "Support from results",
            "Research objective fulfillment",
            "Key findings summary",
            "Contribution clarity",
            "Practical implications",
            "Theoretical implications",
            "Future research suggestions",
            "Final statement strength",
            "Avoidance of new information",
            "Conciseness and clarity",
        ],
    },
    AnalyzerSpec {
        code: "S9",
        family: Family::Section,
        name: "References",
        task: "Analyze the reference list (bibliography) provided at the end of the manuscript. Focus exclusively on the reference list, not in-text citations.",
        focus: &[
            "Completeness of reference details (authors, title, journal, year)",
            "Consistency and correctness of reference formatting",
            "Relevance and recency of sources",
            "Diversity of sources (journals, books, datasets)",
            "Organization and ordering of the reference list",
            "Adherence to the required style guide",
            "Cross-reference accuracy between citations and entries",
        ],
    },
    AnalyzerSpec {
        code: "S10",
        family: Family::Section,
        name: "Supplementary Materials",
        task: "Analyze the supplementary materials for quality and completeness.",
        focus: &[
            "Relevance to main text",
            "Clarity of presentation",
            "Consistency with main text",
            "Completeness of information",
            "Organization and structure",
            "Data presentation",
            "Methodological details",
            "Additional results",
            "Reference to main text",
            "Accessibility and usability",
        ],
    },
    AnalyzerSpec {
        code: "R1",
        family: Family::Rigor,
        name: "Originality and Contribution",
        task: "Analyze the manuscript for originality and contribution to the field.",
        focus: &[
            "Novelty of the research approach",
            "Unique contributions to the field",
            "Verification of stated novelty claims",
            "Comparison with existing literature",
            "Advancement of knowledge",
        ],
    },
    AnalyzerSpec {
        code: "R2",
        family: Family::Rigor,
        name: "Impact and Significance",
        task: "Analyze the manuscript for impact and significance.",
        focus: &[
            "Potential influence on the field",
            "Broader implications of findings",
            "Influence on future research",
            "Practical applications",
            "Policy implications",
        ],
    },
    AnalyzerSpec {
        code: "R3",
        family: Family::Rigor,
        name: "Ethics and Compliance",
        task: "Analyze the manuscript for ethical considerations and research standards compliance.",
        focus: &[
            "Conflicts of interest",
            "Data privacy and protection",
            "Informed consent procedures",
            "Research integrity",
            "Adherence to ethical guidelines",
        ],
    },
    AnalyzerSpec {
        code: "R4",
        family: Family::Rigor,
        name: "Data and Code Availability",
        task: "Analyze the manuscript for data and code availability.",
        focus: &[
            "Data sharing practices",
            "Code repository availability",
            "Documentation completeness",
            "Access restrictions justification",
            "Reproducibility support",
        ],
    },
    AnalyzerSpec {
        code: "R5",
        family: Family::Rigor,
        name: "Statistical Rigor",
        task: "Analyze the manuscript for statistical methods appropriateness and correctness.",
        focus: &[
            "Statistical test selection",
            "Assumption verification",
            "Sample size justification",
            "Multiple comparison handling",
            "Effect size reporting",
            "Confidence intervals",
            "P-value interpretation",
            "Statistical power",
            "Missing data handling",
            "Outlier treatment",
        ],
    },
    AnalyzerSpec {
        code: "R6",
        family: Family::Rigor,
        name: "Technical Accuracy",
        task: "Analyze the manuscript for technical accuracy.",
        focus: &[
            "Mathematical derivation correctness",
            "Algorithm correctness and efficiency",
            "Technical terminology accuracy",
            "Equation clarity and presentation",
            "Technical content completeness",
            "Logical consistency",
            "Implementation details",
            "Edge case handling",
            "Complexity analysis",
            "Technical documentation",
        ],
    },
    AnalyzerSpec {
        code: "R7",
        family: Family::Rigor,
        name: "Consistency",
        task: "Analyze the manuscript for logical coherence and consistency across sections.",
        focus: &[
            "Alignment between methods and results",
            "Consistency between results and conclusions",
            "Logical flow between sections",
            "Terminology consistency",
            "Hypothesis-testing alignment",
            "Data interpretation consistency",
            "Citation consistency",
            "Figure-text alignment",
            "Table-text alignment",
            "Supplementary material consistency",
        ],
    },
    AnalyzerSpec {
        code: "W1",
        family: Family::Writing,
        name: "Language and Style",
        task: "Analyze the manuscript for grammar, spelling, and punctuation issues.",
        focus: &[
            "Grammar correctness",
            "Spelling accuracy",
            "Punctuation usage",
            "Sentence structure",
            "Verb tense consistency",
            "Subject-verb agreement",
            "Article usage",
            "Preposition usage",
            "Conjunction usage",
            "Academic writing conventions",
        ],
    },
    AnalyzerSpec {
        code: "W2",
        family: Family::Writing,
        name: "Narrative and Structure",
        task: "Analyze the manuscript for narrative flow and structural organization.",
        focus: &[
            "Overall narrative coherence",
            "Logical progression of ideas",
            "Section transitions",
            "Paragraph organization",
            "Topic sentence effectiveness",
            "Supporting evidence integration",
            "Conclusion alignment with introduction",
            "Research question and hypothesis tracking",
            "Visual element integration",
            "Reader engagement",
        ],
    },
    AnalyzerSpec {
        code: "W3",
        family: Family::Writing,
        name: "Clarity and Conciseness",
        task: "Analyze the manuscript for clarity and conciseness.",
        focus: &[
            "Language simplicity",
            "Jargon usage",
            "Wordiness",
            "Sentence length",
            "Paragraph length",
            "Active versus passive voice",
            "Redundancy",
            "Ambiguity",
            "Readability",
            "Information density",
        ],
    },
    AnalyzerSpec {
        code: "W4",
        family: Family::Writing,
        name: "Terminology Consistency",
        task: "Analyze the manuscript for terminology consistency.",
        focus: &[
            "Term usage consistency",
            "Notation consistency",
            "Acronym usage and definition",
            "Variable naming consistency",
            "Unit notation consistency",
            "Abbreviation consistency",
            "Technical term consistency",
            "Field-specific terminology",
            "Cross-reference consistency",
            "Definition consistency",
        ],
    },
    AnalyzerSpec {
        code: "W5",
        family: Family::Writing,
        name: "Inclusive Language",
        task: "Analyze the manuscript for inclusive and unbiased language usage.",
        focus: &[
            "Gender-neutral language",
            "Cultural sensitivity",
            "Age-appropriate terminology",
            "Disability-inclusive language",
            "Socioeconomic sensitivity",
            "Geographic inclusivity",
            "Professional title usage",
            "Stereotype avoidance",
            "Identity-first versus person-first language",
            "Historical context sensitivity",
        ],
    },
    AnalyzerSpec {
        code: "W6",
        family: Family::Writing,
        name: "Citation Formatting",
        task: "Analyze the manuscript for in-text citation formatting, style, and consistency. Focus exclusively on in-text citations, not the reference list.",
        focus: &[
            "In-text citation style (APA, Vancouver, Harvard, or similar)",
            "Consistency of citation formatting throughout",
            "Correct placement and ordering of citations",
            "Proper use of et al., author names, and years",
            "Consistency in citation delimiters",
            "Cross-reference accuracy against the reference list",
            "Handling of multiple citations in a single location",
            "Citation of figures, tables, and supplementary materials",
            "Adherence to the required style guide",
        ],
    },
    AnalyzerSpec {
        code: "W7",
        family: Family::Writing,
        name: "Target Audience Alignment",
        task: "Analyze the manuscript for target audience alignment and writing style appropriateness.",
        focus: &[
            "Technical depth and complexity",
            "Field-specific terminology usage",
            "Writing style formality",
            "Section organization",
            "Visual element integration",
            "Reference style and depth",
            "Methodology description detail",
            "Results presentation",
            "Discussion depth",
            "Conclusion format",
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_counts() {
        assert_eq!(REGISTRY.len(), 24);
        assert_eq!(Family::Section.analyzers().count(), 10);
        assert_eq!(Family::Rigor.analyzers().count(), 7);
        assert_eq!(Family::Writing.analyzers().count(), 7);
    }

    #[test]
    fn test_codes_are_unique() {
        let codes: HashSet<_> = REGISTRY.iter().map(|spec| spec.code).collect();
        assert_eq!(codes.len(), 24);
    }

    #[test]
    fn test_code_prefix_matches_family() {
        for spec in &REGISTRY {
            assert_eq!(Family::of_code(spec.code), Some(spec.family), "{}", spec.code);
        }
        assert_eq!(Family::of_code("X9"), None);
        assert_eq!(Family::of_code(""), None);
    }

    #[test]
    fn test_find_by_code() {
        assert_eq!(find("S5").unwrap().name, "Methodology");
        assert_eq!(find("R5").unwrap().name, "Statistical Rigor");
        assert_eq!(find("W7").unwrap().name, "Target Audience Alignment");
        assert!(find("S11").is_none());
    }

    #[test]
    fn test_registry_order_is_presentation_order() {
        let codes: Vec<_> = REGISTRY.iter().map(|spec| spec.code).collect();
        assert_eq!(&codes[..3], &["S1", "S2", "S3"]);
        assert_eq!(codes[9], "S10");
        assert_eq!(codes[10], "R1");
        assert_eq!(codes[17], "W1");
        assert_eq!(codes[23], "W7");
    }

    #[test]
    fn test_family_labels_and_keys() {
        assert_eq!(Family::Section.label(), "Section Review");
        assert_eq!(Family::Rigor.label(), "Scientific Rigor");
        assert_eq!(Family::Writing.label(), "Writing and Presentation");

        assert_eq!(Family::Section.results_key(), "section_results");
        assert_eq!(Family::Rigor.results_key(), "rigor_results");
        assert_eq!(Family::Writing.results_key(), "writing_results");
    }

    #[test]
    fn test_every_spec_has_prompt_material() {
        for spec in &REGISTRY {
            assert!(!spec.task.is_empty(), "{} has no task", spec.code);
            assert!(!spec.focus.is_empty(), "{} has no focus list", spec.code);
        }
    }
}
