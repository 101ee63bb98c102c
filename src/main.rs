use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{debug, error, info};

use flashpoint_brief::render::render_markdown;
use flashpoint_brief::{AnalysisConfig, AnalysisError, AnalysisReport, GeminiClient, Lang, Pipeline};

/// Flashpoint Brief - conflict-risk intelligence report generator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Hypothesis or context to analyse
    #[arg(required = true, num_args = 1..)]
    context: Vec<String>,

    /// Output language (en or zh)
    #[arg(short, long, default_value = "en")]
    lang: Lang,

    /// Path to YAML config file (overrides FLASHPOINT_CONFIG environment variable)
    #[arg(short, long)]
    config: Option<String>,

    /// Model identifier (overrides config and FLASHPOINT_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Disable the generator's web search tool
    #[arg(long)]
    no_search: bool,

    /// Output directory for generated files (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: String,
}

fn load_config(args: &Args) -> Result<AnalysisConfig> {
    // defaults < YAML file < environment < CLI flags
    let path = args
        .config
        .clone()
        .or_else(|| std::env::var("FLASHPOINT_CONFIG").ok());

    let base = match path {
        Some(p) => {
            debug!("Using config file: {}", p);
            AnalysisConfig::from_yaml_file(std::path::Path::new(&p))?
        }
        None => {
            debug!("No config file, using defaults");
            AnalysisConfig::default()
        }
    };

    let mut cfg = base.with_env();
    if let Some(model) = &args.model {
        cfg.model = model.clone();
    }
    if args.no_search {
        cfg.web_search = false;
    }
    Ok(cfg)
}

/// Client construction and the analysis share one error path, so a missing
/// key reaches the user with its recovery suggestion.
async fn run_analysis(
    cfg: AnalysisConfig,
    context: &str,
    lang: Lang,
) -> Result<AnalysisReport, AnalysisError> {
    let generator = GeminiClient::from_config(&cfg)?;
    Pipeline::new(cfg, generator)
        .request_analysis(context, lang)
        .await
}

fn failure_message(e: &AnalysisError) -> String {
    let mut msg = format!("{}\n{}", e, e.recovery_suggestion());
    if e.is_retryable() {
        msg.push_str("\nRun the same command again to retry.");
    }
    msg
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    let args = Args::parse();
    info!("Starting flashpoint-brief - lang={}", args.lang);

    let cfg = load_config(&args)?;
    let context = args.context.join(" ");
    let report = match run_analysis(cfg, &context, args.lang).await {
        Ok(report) => report,
        Err(e) => {
            error!("Analysis failed - error={}", e);
            eprintln!("{}", failure_message(&e));
            std::process::exit(1);
        }
    };

    let markdown = render_markdown(&report, args.lang);

    let ymd = Local::now().format("%Y-%m-%d").to_string();
    let date_dir = std::path::Path::new(&args.output_dir).join(&ymd);
    std::fs::create_dir_all(&date_dir)
        .with_context(|| format!("create {}", date_dir.display()))?;

    std::fs::write(date_dir.join("report.json"), serde_json::to_vec_pretty(&report)?)
        .context("write report.json")?;
    std::fs::write(date_dir.join("report.md"), markdown.as_bytes())
        .context("write report.md")?;
    info!("Output persisted - directory={}", date_dir.display());

    println!("{}", markdown);
    Ok(())
}
