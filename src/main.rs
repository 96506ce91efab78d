//! Jobtrawl main entry point
//!
//! Command-line interface for the crawl-and-classify pipeline.

use clap::Parser;
use jobtrawl::config::{load_config_with_hash, Config};
use jobtrawl::output::{print_run_report, read_listing_snapshot, write_json_atomic};
use jobtrawl::pipeline::Pipeline;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Jobtrawl: crawl, classify and enrich a paginated listing site
///
/// Crawls one scope of the configured listing site, cross-references the
/// discovered items against the configured filter dimensions, enriches each
/// item from its detail page, and writes the result set as JSON.
#[derive(Parser, Debug)]
#[command(name = "jobtrawl")]
#[command(version = "1.0.0")]
#[command(about = "Crawl, classify and enrich a paginated listing site", long_about = None)]
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

    /// Crawl the listing and write the snapshot, skip enrichment
    #[arg(long, conflicts_with_all = ["enrich_only", "dry_run"])]
    listing_only: bool,

    /// Enrich from an existing listing snapshot without re-crawling
    #[arg(long, conflicts_with_all = ["listing_only", "dry_run"])]
    enrich_only: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["listing_only", "enrich_only"])]
    dry_run: bool,

    /// Restrict classification to the named dimension (repeatable)
    #[arg(long = "dimension", value_name = "NAME")]
    dimensions: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    config.select_dimensions(&cli.dimensions)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let pipeline = Pipeline::new(config.clone())?;

    if cli.listing_only {
        handle_listing_only(&pipeline, &config).await?;
    } else if cli.enrich_only {
        handle_enrich_only(&pipeline, &config).await?;
    } else {
        handle_full_run(&pipeline, &config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("jobtrawl=info,warn"),
            1 => EnvFilter::new("jobtrawl=debug,info"),
            2 => EnvFilter::new("jobtrawl=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &Config) {
    println!("=== Jobtrawl Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Scope: {}", config.site.scope);
    println!("  Next-page affordance: {}", config.site.has_next_affordance);

    println!("\nCrawler:");
    println!("  Listing concurrency: {}", config.crawler.listing_concurrency);
    println!("  Detail concurrency: {}", config.crawler.detail_concurrency);
    println!("  Termination mode: {:?}", config.crawler.termination_mode);
    match config.crawler.max_pages {
        Some(cap) => println!("  Max pages per query: {}", cap),
        None => println!("  Max pages per query: unlimited"),
    }
    println!("  Fetch retries: {}", config.crawler.fetch_retries);

    println!("\nOutput:");
    println!("  Results: {}", config.output.results_path);
    println!("  Listing snapshot: {}", config.output.listing_path);

    println!("\nClassification dimensions ({}):", config.dimensions.len());
    let mut filter_crawls = 0;
    for dimension in &config.dimensions {
        println!(
            "  - {} (param '{}', {} values)",
            dimension.name,
            dimension.param,
            dimension.values.len()
        );
        filter_crawls += dimension.values.len();
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would run 1 listing crawl plus {} filter crawls for scope '{}'",
        filter_crawls, config.site.scope
    );
}

/// Handles the --listing-only mode: crawl and persist the snapshot
async fn handle_listing_only(pipeline: &Pipeline, config: &Config) -> anyhow::Result<()> {
    let snapshot = pipeline.crawl_listing().await?;
    write_json_atomic(Path::new(&config.output.listing_path), &snapshot)?;

    println!(
        "✓ Listing snapshot ({} items) written to: {}",
        snapshot.total, config.output.listing_path
    );
    Ok(())
}

/// Handles the --enrich-only mode: enrich from a persisted snapshot
async fn handle_enrich_only(pipeline: &Pipeline, config: &Config) -> anyhow::Result<()> {
    let snapshot = read_listing_snapshot(Path::new(&config.output.listing_path))?;
    tracing::info!(
        "Loaded {} items from snapshot: {}",
        snapshot.total,
        config.output.listing_path
    );

    let (output, report) = pipeline.enrich_snapshot(snapshot).await?;
    write_json_atomic(Path::new(&config.output.results_path), &output)?;

    println!("✓ Results written to: {}", config.output.results_path);
    print_run_report(&report);
    Ok(())
}

/// Handles the default mode: full crawl, classify, and enrich run
async fn handle_full_run(pipeline: &Pipeline, config: &Config) -> anyhow::Result<()> {
    let snapshot = pipeline.crawl_listing().await?;
    write_json_atomic(Path::new(&config.output.listing_path), &snapshot)?;

    let (output, report) = pipeline.enrich_snapshot(snapshot).await?;
    write_json_atomic(Path::new(&config.output.results_path), &output)?;

    println!("✓ Results written to: {}", config.output.results_path);
    print_run_report(&report);
    Ok(())
}
