//! Aisle main entry point
//!
//! This is the command-line interface for the Aisle product page crawler.

use aisle::config::{load_config_with_hash, Config};
use aisle::crawler::crawl;
use aisle::output::{print_summary, write_report_json, write_results_json};
use aisle::Domain;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Aisle: a product page discovery crawler
///
/// Aisle walks the in-domain links of e-commerce sites breadth first and
/// collects the URLs that look like product detail pages.
#[derive(Parser, Debug)]
#[command(name = "aisle")]
#[command(version)]
#[command(about = "A product page discovery crawler", long_about = None)]
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

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Write the results JSON here instead of the configured path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Additional domain to crawl (repeatable)
    #[arg(long = "domain", value_name = "DOMAIN")]
    domains: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    config.domains.extend(cli.domains);
    if let Some(output) = cli.output {
        config.output.results_path = output.display().to_string();
    }

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_crawl(config, cli.quiet).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("aisle=info,warn"),
            1 => EnvFilter::new("aisle=debug,info"),
            2 => EnvFilter::new("aisle=trace,debug"),
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

/// Handles the --dry-run mode: validates domains and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Aisle Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max concurrent tasks: {}", config.crawler.max_concurrent_tasks);
    println!(
        "  Max concurrent domains: {}",
        config.crawler.max_concurrent_domains
    );
    println!("  Scroll settle: {}ms", config.crawler.scroll_settle_ms);
    println!(
        "  Max scroll iterations: {}",
        config.crawler.max_scroll_iterations
    );
    println!(
        "  Timeouts: navigation {}s, page {}s",
        config.crawler.navigation_timeout_secs, config.crawler.page_timeout_secs
    );
    match config.crawler.max_pages_per_domain {
        Some(cap) => println!("  Max pages per domain: {}", cap),
        None => println!("  Max pages per domain: unlimited"),
    }
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Results: {}", config.output.results_path);
    if let Some(report) = &config.output.report_path {
        println!("  Report: {}", report);
    }

    println!(
        "\nPatterns: {} product, {} ignore ({} site overrides)",
        config.patterns.product.len(),
        config.patterns.ignore.len(),
        config.sites.len()
    );

    println!("\nDomains ({}):", config.domains.len());
    for raw in &config.domains {
        let domain = Domain::parse(raw).with_context(|| format!("invalid domain '{}'", raw))?;
        println!("  - {}", domain.base_url(&config.crawler.scheme));
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> anyhow::Result<()> {
    if config.domains.is_empty() {
        anyhow::bail!("no domains to crawl; list them in the config or pass --domain");
    }

    let results_path = PathBuf::from(&config.output.results_path);
    let report_path = config.output.report_path.clone().map(PathBuf::from);

    let report = crawl(config).await?;

    write_results_json(&report.result(), &results_path)?;
    if let Some(path) = report_path {
        write_report_json(&report, &path)?;
    }

    if !quiet {
        print_summary(&report);
    }
    Ok(())
}
