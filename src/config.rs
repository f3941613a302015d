//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.peerev.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::ReviewContext;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Review settings.
    #[serde(default)]
    pub review: ReviewConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Default model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// OpenAI-compatible API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Number of concurrent analyzer calls.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

fn default_model() -> String {
    "gpt-4.1-nano".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout() -> u64 {
    120
}

fn default_max_concurrent() -> usize {
    8
}

/// Review settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Target publication outlets passed to the reviewers.
    #[serde(default = "default_outlets")]
    pub target_outlets: String,

    /// Aspects the review should focus on.
    #[serde(default = "default_focus")]
    pub focus_areas: String,

    /// Manuscript preview budget for quality-control prompts, in characters.
    #[serde(default = "default_qc_preview_chars")]
    pub qc_preview_chars: usize,

    /// Manuscript excerpt budget for summary prompts, in characters.
    #[serde(default = "default_summary_excerpt_chars")]
    pub summary_excerpt_chars: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            target_outlets: default_outlets(),
            focus_areas: default_focus(),
            qc_preview_chars: default_qc_preview_chars(),
            summary_excerpt_chars: default_summary_excerpt_chars(),
        }
    }
}

fn default_outlets() -> String {
    ReviewContext::DEFAULT_OUTLETS.to_string()
}

fn default_focus() -> String {
    ReviewContext::DEFAULT_FOCUS.to_string()
}

fn default_qc_preview_chars() -> usize {
    1000
}

fn default_summary_excerpt_chars() -> usize {
    6000
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Default output format (markdown or json).
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: default_format(),
        }
    }
}

fn default_output() -> String {
    "review_report.md".to_string()
}

fn default_format() -> String {
    "markdown".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".peerev.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref base_url) = args.base_url {
            self.model.base_url = base_url.clone();
        }
        if let Some(concurrency) = args.concurrency {
            self.model.max_concurrent = concurrency;
        }

        if let Some(ref outlets) = args.outlets {
            self.review.target_outlets = outlets.clone();
        }
        if let Some(ref focus) = args.focus {
            self.review.focus_areas = focus.clone();
        }

        if let Some(ref output) = args.output {
            self.report.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.report.format = format.as_str().to_string();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "gpt-4.1-nano");
        assert_eq!(config.model.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model.temperature, 0.3);
        assert_eq!(config.model.max_concurrent, 8);
        assert_eq!(config.review.target_outlets, "the target journal");
        assert_eq!(config.review.focus_areas, "general aspects");
        assert_eq!(config.review.qc_preview_chars, 1000);
        assert_eq!(config.review.summary_excerpt_chars, 6000);
        assert_eq!(config.report.output, "review_report.md");
        assert_eq!(config.report.format, "markdown");
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[model]
name = "gpt-4o-mini"
temperature = 0.2
max_concurrent = 4

[review]
target_outlets = "Nature Methods"
qc_preview_chars = 500

[report]
output = "custom_report.md"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.model.name, "gpt-4o-mini");
        assert_eq!(config.model.temperature, 0.2);
        assert_eq!(config.model.max_concurrent, 4);
        // Unset fields fall back to defaults
        assert_eq!(config.model.timeout_seconds, 120);
        assert_eq!(config.review.target_outlets, "Nature Methods");
        assert_eq!(config.review.focus_areas, "general aspects");
        assert_eq!(config.review.qc_preview_chars, 500);
        assert_eq!(config.report.output, "custom_report.md");
        assert_eq!(config.report.format, "markdown");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[model]"));
        assert!(toml_str.contains("[review]"));
        assert!(toml_str.contains("[report]"));
        assert!(toml_str.contains("gpt-4.1-nano"));
    }

    #[test]
    fn test_merge_with_args_overrides_when_provided() {
        let mut config = Config::default();
        let args = crate::cli::Args::parse_from([
            "peerev",
            "paper.pdf",
            "--model",
            "gpt-4o",
            "--outlets",
            "PLOS ONE",
            "--concurrency",
            "2",
            "--format",
            "json",
        ]);

        config.merge_with_args(&args);

        assert_eq!(config.model.name, "gpt-4o");
        assert_eq!(config.model.max_concurrent, 2);
        assert_eq!(config.review.target_outlets, "PLOS ONE");
        assert_eq!(config.report.format, "json");
        // Untouched settings keep their config values
        assert_eq!(config.review.focus_areas, "general aspects");
        assert_eq!(config.report.output, "review_report.md");
    }
}
