//! Peerev - AI-powered peer review for academic manuscripts
//!
//! A CLI tool that runs a manuscript through 24 specialized review
//! analyzers, validates their output with a quality-control pass, and
//! produces a scored review report with an executive summary.
//!
//! Exit codes:
//!   0 - Success (no score gate set, or final score at/above --fail-below)
//!   1 - Runtime error (extraction, API, config failure, etc.)
//!   2 - Final score below the --fail-below threshold

mod cli;
mod config;
mod extract;
mod llm;
mod models;
mod pipeline;
mod registry;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use llm::{ClientConfig, OpenAiClient};
use models::{ReportMetadata, ReviewContext, ReviewReport};
use pipeline::{PipelineOptions, ReviewPipeline};
use registry::{Family, REGISTRY};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Peerev v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the review
    match run_review(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Review failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .peerev.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".peerev.toml");

    if path.exists() {
        eprintln!("⚠️  .peerev.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .peerev.toml")?;

    println!("✅ Created .peerev.toml with default settings.");
    println!("   Edit it to customize model, outlets, focus areas, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete review workflow. Returns exit code (0 or 2).
async fn run_review(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Resolve the output format up front so a bad config fails fast
    let format = report_format(&config)?;

    let manuscript = args.manuscript_path().to_path_buf();

    // Step 1: Extract the manuscript text
    println!("📄 Extracting manuscript: {}", manuscript.display());
    let text = extract::manuscript_text(&manuscript)?;
    info!("Extracted {} characters", text.chars().count());

    // Handle --dry-run: show extraction stats and the roster, then exit
    if args.dry_run {
        return handle_dry_run(&manuscript, &text);
    }

    // Step 2: Initialize the review pipeline
    println!("🤖 Initializing reviewers...");
    println!("   Model: {}", config.model.name);
    println!("   Endpoint: {}", config.model.base_url);
    println!("   Concurrency: {}", config.model.max_concurrent);
    println!("   Timeout: {}s", config.model.timeout_seconds);

    let api_key = args.api_key.clone().unwrap_or_default();
    if api_key.is_empty() {
        warn!("No API key provided; the endpoint may reject requests");
    }

    let client = Arc::new(OpenAiClient::new(ClientConfig {
        base_url: config.model.base_url.clone(),
        api_key,
        model: config.model.name.clone(),
        temperature: config.model.temperature,
        timeout_seconds: config.model.timeout_seconds,
    }));

    let context = ReviewContext::new(&config.review.target_outlets, &config.review.focus_areas);
    let options = PipelineOptions {
        max_concurrent: config.model.max_concurrent,
        qc_preview_chars: config.review.qc_preview_chars,
        summary_excerpt_chars: config.review.summary_excerpt_chars,
        show_progress: !args.quiet,
    };
    let pipeline = ReviewPipeline::new(client.clone(), context.clone(), options);

    // Step 3: Run the analyzers, quality control, and summary passes
    println!("\n🔬 Reviewing with {} analyzers...", REGISTRY.len());
    println!("   Outlets: {}", context.target_outlets);
    println!("   Focus: {}\n", context.focus_areas);

    let outcome = pipeline.run(&text).await?;

    if !outcome.failed_analyzers.is_empty() {
        println!(
            "   ⚠️  {} analyzer(s) failed: {}",
            outcome.failed_analyzers.len(),
            outcome.failed_analyzers.join(", ")
        );
    }

    // Step 4: Build the report
    println!("\n📝 Generating report...");

    let duration = start_time.elapsed().as_secs_f64();
    let metadata = ReportMetadata {
        manuscript: manuscript.display().to_string(),
        review_date: Utc::now(),
        model_used: client.model().to_string(),
        analyzers_run: REGISTRY.len(),
        analyzers_failed: outcome.failed_analyzers.len(),
        duration_seconds: duration,
        target_outlets: context.target_outlets.clone(),
        focus_areas: context.focus_areas.clone(),
    };

    let report = ReviewReport {
        metadata,
        summary: outcome.summary,
        results: outcome.results,
    };

    // Step 5: Generate and save the report
    let output_path = PathBuf::from(&config.report.output);
    match format {
        OutputFormat::Json => report::write_json_report(&report, &output_path)?,
        OutputFormat::Markdown => report::write_report(&report, &output_path)?,
    }

    // Print summary
    let scores = &report.summary.scores;
    println!("\n📊 Review Summary:");
    println!("   Title: {}", report.summary.manuscript_title);
    println!(
        "   Section Review: {:.1}/5 | Scientific Rigor: {:.1}/5 | Writing: {:.1}/5",
        scores.section_score, scores.rigor_score, scores.writing_score
    );
    println!("   Final Score: {:.1}/5", scores.final_score);
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Review complete! Report saved to: {}",
        output_path.display()
    );

    // Check --fail-below threshold
    if let Some(threshold) = args.fail_below {
        if scores.final_score < threshold {
            eprintln!(
                "\n⛔ Final score {:.2} is below the {:.2} threshold. Failing (exit code 2).",
                scores.final_score, threshold
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Handle --dry-run: print extraction stats and the analyzer roster, exit.
fn handle_dry_run(manuscript: &Path, text: &str) -> Result<i32> {
    println!("\n🔍 Dry run: no LLM calls will be made.\n");
    println!("   Manuscript: {}", manuscript.display());
    println!(
        "   Extracted {} characters across {} lines",
        text.chars().count(),
        text.lines().count()
    );

    println!("\n   {} analyzers would run:", REGISTRY.len());
    for family in Family::ALL {
        println!("\n   {}:", family.label());
        for spec in family.analyzers() {
            println!("     {} - {}", spec.code, spec.name);
        }
    }

    println!("\n✅ Dry run complete. No LLM calls were made.");
    Ok(0)
}

/// Resolve the configured report format.
fn report_format(config: &Config) -> Result<OutputFormat> {
    match config.report.format.as_str() {
        "markdown" => Ok(OutputFormat::Markdown),
        "json" => Ok(OutputFormat::Json),
        other => anyhow::bail!("Unknown report format '{}' (expected markdown or json)", other),
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .peerev.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
