//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::{Path, PathBuf};

/// Peerev - LLM-powered peer review for academic manuscripts
///
/// Review a manuscript with 24 specialized analyzers, validate their
/// output with a quality-control pass, and produce a scored review
/// report with an executive summary. Markdown/JSON reports.
///
/// Examples:
///   peerev paper.pdf
///   peerev paper.pdf --outlets "Nature Methods" --focus "statistical rigor"
///   peerev draft.md --model gpt-4.1-nano --format json
///   peerev paper.pdf --fail-below 3.0
///   peerev --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the manuscript to review
    ///
    /// PDF, Markdown, and plain-text files are supported.
    /// Not required when using --init-config.
    #[arg(value_name = "MANUSCRIPT", required_unless_present = "init_config")]
    pub manuscript: Option<PathBuf>,

    /// Target publication outlets for the review
    ///
    /// Passed to every reviewer so feedback matches the venue.
    #[arg(long, value_name = "OUTLETS")]
    pub outlets: Option<String>,

    /// Aspects the review should focus on
    #[arg(long, value_name = "AREAS")]
    pub focus: Option<String>,

    /// Model to use for analysis
    ///
    /// Can also be set via PEEREV_MODEL env var or .peerev.toml config.
    #[arg(short, long, env = "PEEREV_MODEL", value_name = "MODEL")]
    pub model: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// API key for the model endpoint
    #[arg(
        long,
        env = "OPENAI_API_KEY",
        hide_env_values = true,
        value_name = "KEY"
    )]
    pub api_key: Option<String>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .peerev.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of concurrent analyzer calls
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Fail if the final score falls below this threshold
    ///
    /// Useful for CI pipelines. Exit code 2 when the gate fails.
    #[arg(long, value_name = "SCORE")]
    pub fail_below: Option<f64>,

    /// Dry run: extract the manuscript and list analyzers without calling the LLM
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .peerev.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// The config-file spelling of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the manuscript path, empty if not set (should be validated first).
    pub fn manuscript_path(&self) -> &Path {
        self.manuscript.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.manuscript.is_none() {
            return Err("A manuscript path is required".to_string());
        }

        // Validate base URL format if provided
        if let Some(ref base_url) = self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err("API base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Validate concurrency if provided
        if let Some(concurrency) = self.concurrency {
            if concurrency == 0 {
                return Err("Concurrency must be at least 1".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate the score gate if provided
        if let Some(threshold) = self.fail_below {
            if !(0.0..=5.0).contains(&threshold) {
                return Err("Fail-below threshold must be between 0.0 and 5.0".to_string());
            }
        }

        // Validate the manuscript path
        if let Some(ref manuscript) = self.manuscript {
            if !manuscript.exists() {
                return Err(format!(
                    "Manuscript file does not exist: {}",
                    manuscript.display()
                ));
            }
            if !manuscript.is_file() {
                return Err(format!(
                    "Manuscript path is not a file: {}",
                    manuscript.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
