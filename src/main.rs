//! Onion-Lens main entry point
//!
//! This is the command-line interface for the Onion-Lens snapshot crawler.

use anyhow::Context;
use clap::Parser;
use onion_lens::anonymity::TorVerifier;
use onion_lens::config::{read_config, validate, Config};
use onion_lens::crawler::run_crawl;
use onion_lens::output::print_report;
use onion_lens::render::ChromeRenderer;
use onion_lens::target::load_targets;
use onion_lens::CrawlError;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Onion-Lens: an anonymized snapshot crawler
///
/// Onion-Lens refuses to run unless traffic leaves through Tor, then renders
/// every destination of the target list in headless Chromium and stores its
/// markup, a full-page screenshot and its outbound links.
#[derive(Parser, Debug)]
#[command(name = "onion-lens")]
#[command(version = "1.0.0")]
#[command(about = "An anonymized snapshot crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Target list to crawl
    #[arg(short, long, value_name = "FILE")]
    targets: Option<PathBuf>,

    /// Output root for artifacts
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without any network access
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_crawl(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("onion_lens=info,warn"),
            1 => EnvFilter::new("onion_lens=debug,info"),
            2 => EnvFilter::new("onion_lens=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file if one was given, applies command-line
/// overrides and validates the result
fn load_configuration(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = read_config(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(targets) = &cli.targets {
        config.output.targets_path = targets.clone();
    }
    if let Some(output) = &cli.output {
        config.output.root = output.clone();
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Onion-Lens Dry Run ===\n");

    println!("Proxy:");
    println!("  Address: {}", config.proxy.address);
    println!("  Check URL: {}", config.proxy.check_url);
    println!("  Check timeout: {}s", config.proxy.check_timeout_secs);

    println!("\nCrawler:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Task timeout: {}s", config.crawler.task_timeout_secs);

    println!("\nRenderer:");
    println!(
        "  Window: {}x{}",
        config.renderer.window_width, config.renderer.window_height
    );
    println!("  Screenshot quality: {}", config.renderer.screenshot_quality);
    println!("  Headless: {}", config.renderer.headless);

    println!("\nOutput:");
    println!("  Root: {}", config.output.root.display());
    println!("  Log: {}", config.output.log_path.display());

    let targets = load_targets(&config.output.targets_path)?;
    println!(
        "\nTargets ({}) from {}:",
        targets.len(),
        config.output.targets_path.display()
    );
    for destination in &targets {
        println!("  - {} -> {}", destination, destination.url());
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} destinations", targets.len());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let interrupt = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling remaining tasks");
            interrupt.cancel();
        }
    });

    let verifier = TorVerifier::new(&config.proxy);
    let renderer = Arc::new(ChromeRenderer::new(&config.renderer, &config.proxy));

    let result = run_crawl(config, &verifier, renderer.clone(), shutdown).await;

    match Arc::try_unwrap(renderer) {
        Ok(renderer) => renderer.shutdown().await,
        Err(_) => tracing::warn!("Browser still in use, leaving it to exit with the process"),
    }

    match result {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(CrawlError::VerificationFailed) => {
            tracing::error!("Tor check failed");
            anyhow::bail!(
                "Not connected to Tor. Start Tor and make sure its SOCKS proxy is reachable."
            )
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
