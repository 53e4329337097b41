use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use slack_thread_archiver::config::Config;
use slack_thread_archiver::pipeline::ArchivePipeline;
use slack_thread_archiver::slack::SlackClient;

/// Archive one Slack thread into a self-contained local bundle.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Thread permalink, e.g. https://myteam.slack.com/archives/C123ABC/p1741754154975769
    url: String,

    /// Directory that receives per-thread bundles (overrides SLACK_ARCHIVE_DIR)
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    init_tracing()?;

    info!("Starting slack-thread-archiver");

    // Load and validate configuration before touching the network
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let output_dir = cli.output_dir.unwrap_or_else(|| config.output_dir.clone());
    info!(
        api_base_url = %config.api_base_url,
        output_dir = %output_dir.display(),
        "Configuration loaded"
    );

    let client = SlackClient::new(&config);
    let pipeline = ArchivePipeline::new(client, output_dir);

    let summary = pipeline.run(&cli.url).await?;

    println!(
        "Archived {} messages ({} images, {} failed) to {}",
        summary.message_count,
        summary.media.resolved,
        summary.media.failed,
        summary.bundle_dir.display()
    );
    println!("Archive: {}", summary.archive_path.display());

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,slack_thread_archiver=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        // Pretty-printed logging for development
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
