mod input;
mod output;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use summarybench_common::{logger, AppConfig, InputSource, LengthSetting, Tone};
use summarybench_llm::{OllamaClient, DEFAULT_STRATEGIES};
use summarybench_logs::{recent_usage, summarize_usage};
use summarybench_runner::{AppState, ComparisonRequest};
use tracing::{info, warn};

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
        }
    } else {
        // Fallback to default dotenv behavior
        dotenv::dotenv().ok();
    }
}

fn parse_tone(value: &str) -> Result<Tone, String> {
    value.parse().map_err(|e: summarybench_common::SummaryBenchError| e.to_string())
}

fn parse_length(value: &str) -> Result<LengthSetting, String> {
    value.parse().map_err(|e: summarybench_common::SummaryBenchError| e.to_string())
}

#[derive(Parser)]
#[command(name = "summarybench")]
#[command(about = "SummaryBench - compare summarization prompt strategies and track their scores", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize one input with several strategies and log the results
    Compare(CompareArgs),

    /// Usage statistics from the usage log
    Stats {
        /// Show the N most recent runs
        #[arg(long, default_value_t = 10)]
        recent: usize,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Per-strategy averages from the evaluation log
    History {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the registered strategies
    Strategies,
}

#[derive(Args)]
struct CompareArgs {
    /// Text to summarize
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    text: Option<String>,

    /// Plain text or markdown file to summarize
    #[arg(long)]
    file: Option<PathBuf>,

    /// Strategy id, repeatable (default: v1_basic, v3_chain_of_thought)
    #[arg(long = "strategy")]
    strategies: Vec<String>,

    #[arg(long, default_value_t = Tone::Neutral, value_parser = parse_tone)]
    tone: Tone,

    #[arg(long, default_value_t = LengthSetting::Medium, value_parser = parse_length)]
    length: LengthSetting,

    /// Reference summary for ROUGE scoring
    #[arg(long, conflicts_with = "reference_file")]
    reference_text: Option<String>,

    /// File holding the reference summary
    #[arg(long)]
    reference_file: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

async fn build_request(args: CompareArgs) -> Result<ComparisonRequest> {
    let strategies = if args.strategies.is_empty() {
        DEFAULT_STRATEGIES.iter().map(|id| id.to_string()).collect()
    } else {
        args.strategies
    };

    let (text, input_source, file_type) = match (args.text, args.file) {
        (Some(text), _) => (text, InputSource::Text, None),
        (None, Some(path)) => {
            let extracted = input::extract_text(&path).await?;
            (extracted.text, InputSource::File, Some(extracted.file_type))
        }
        (None, None) => bail!("Provide --text or --file"),
    };
    if text.trim().is_empty() {
        bail!("Input text is empty");
    }

    let reference = match (args.reference_text, args.reference_file) {
        (Some(reference), _) => Some(reference),
        (None, Some(path)) => Some(input::extract_text(&path).await?.text),
        (None, None) => None,
    };

    Ok(ComparisonRequest {
        text,
        strategies,
        tone: args.tone,
        length: args.length,
        input_source,
        file_type,
        reference,
    })
}

async fn compare(state: &AppState, args: CompareArgs) -> Result<()> {
    let json = args.json;
    let request = build_request(args).await?;

    let client = OllamaClient::from_config(&state.config)?;
    match client.test_connection().await {
        Ok(true) => info!("Ollama reachable at {}", client.base_url()),
        Ok(false) | Err(_) => warn!(
            "Ollama at {} did not answer; generation will likely fail",
            client.base_url()
        ),
    }

    let progress = ProgressBar::new(request.strategies.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let runner = state.runner(Arc::new(client)).with_progress(progress);
    let report = runner.run(&request).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", output::render_report(&report)?);
    }

    if !report.outcomes.is_empty() && report.completed().next().is_none() {
        bail!("Every strategy failed");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables from .env at project root
    load_dotenv_from_project_root();

    let config = AppConfig::from_env()?;
    logger::setup_logging(&config.log_dir, &config.log_level)?;
    tracing::info!("SummaryBench starting (data: {})", config.data_dir.display());

    let state = AppState::new(config)?;

    match cli.command {
        Commands::Compare(args) => compare(&state, args).await?,
        Commands::Stats { recent, json } => {
            let records = state.usage_records()?;
            let summary = summarize_usage(&records);
            let recent = recent_usage(&records, recent);
            if json {
                let value = serde_json::json!({ "summary": summary, "recent": recent });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print!("{}", output::render_usage(&summary, recent)?);
            }
        }
        Commands::History { json } => {
            let summary = state.evaluation_summary()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", output::render_history(&summary)?);
            }
        }
        Commands::Strategies => {
            print!("{}", output::render_strategies(&state.registry)?);
        }
    }

    Ok(())
}
