//! wsm-mirror main entry point
//!
//! This is the command-line interface for the workshop manual mirror.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wsm_mirror::config::{load_config_with_hash, validate, Config};
use wsm_mirror::crawler::mirror;
use wsm_mirror::CrawlReport;

/// wsm-mirror: an offline mirror for frame-based workshop manuals
///
/// wsm-mirror crawls every section of a manual, converts each page to
/// Markdown with relative links and bordered grid tables, and writes a
/// mkdocs.yml so the mirror can be served as a static site.
#[derive(Parser, Debug)]
#[command(name = "wsm-mirror")]
#[command(version)]
#[command(about = "Mirror a frame-based workshop manual as Markdown", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Re-render documents whose output already exists
    #[arg(long)]
    force: bool,

    /// Number of conversion workers, overriding the config file
    #[arg(short, long, value_name = "N")]
    workers: Option<usize>,

    /// Validate config and show what would be mirrored without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.force {
        config.output.force = true;
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
        validate(&config)?;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_mirror(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("wsm_mirror=warn,error")
    } else {
        match verbose {
            0 => EnvFilter::new("wsm_mirror=info,warn"),
            1 => EnvFilter::new("wsm_mirror=debug,info"),
            2 => EnvFilter::new("wsm_mirror=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== wsm-mirror Dry Run ===\n");

    println!("Site:");
    println!("  Start URL: {}", config.site.start_url);
    println!("  Site id: {}", config.site.site_id);
    println!("  Site name: {}", config.site.site_name);
    println!(
        "  Frames: {} (model), {} (sections)",
        config.site.main_menu_frame, config.site.service_menu_frame
    );
    println!(
        "  Navigation targets: {}",
        config.site.navigation_targets.join(", ")
    );
    println!("  Index prefixes: {}", config.site.index_prefixes.join(", "));

    println!("\nCrawler:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Retry budget: {}", config.crawler.retry_budget());
    println!("  Fetch attempts: {}", config.crawler.fetch_attempts);
    println!("  Retry delay: {}ms", config.crawler.retry_delay);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.value);
    println!("  Timeout: {}s", config.user_agent.timeout);

    println!("\nOutput:");
    println!(
        "  Root: {}",
        config.output.root.join(&config.site.site_id).display()
    );
    println!("  Force: {}", config.output.force);

    println!("\n✓ Configuration is valid");
}

/// Handles the main mirror operation
async fn handle_mirror(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Starting mirror of {} with {} workers",
        config.site.site_id,
        config.crawler.workers
    );

    match mirror(config).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Mirror failed: {}", e);
            Err(e.into())
        }
    }
}

fn print_report(report: &CrawlReport) {
    println!("=== {} ===\n", report.model);
    println!("  Converted: {}", report.converted);
    println!("  Failed: {}", report.failures.len());
    println!("  Duration: {}s", report.duration().num_seconds());

    for (unit, cause) in &report.failures {
        println!("  ✗ {}: {}", unit, cause);
    }

    if report.is_clean() {
        println!("\n✓ Mirror complete");
    }
}
