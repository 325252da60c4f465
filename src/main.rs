//! Listing-Harvest main entry point
//!
//! This is the command-line interface for the Listing-Harvest scraper.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use listing_harvest::config::{load_config_with_hash, Config};
use listing_harvest::crawler::{build_http_client, crawl, HealthChecker};
use listing_harvest::extract::{ProductRecord, NOT_AVAILABLE};
use listing_harvest::storage::{save_to_sinks, CsvFileSink, SqliteSink, StorageSink};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Listing-Harvest: a paginated product listing scraper
///
/// Crawls a page-numbered product listing, extracts one record per product
/// card, and saves the records to CSV and/or SQLite.
#[derive(Parser, Debug)]
#[command(name = "listing-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A paginated product listing scraper", long_about = None)]
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

    /// Validate config and show the pages that would be fetched
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the listing and print the records as JSON (default)
    Crawl,
    /// Crawl and overwrite the configured CSV file
    SaveCsv,
    /// Crawl and insert the records into the configured database
    SaveDb,
    /// Crawl once and save to both the CSV file and the database
    SaveAll,
    /// Probe a URL (default: the first listing page) and print its health
    Health {
        /// URL to probe
        url: Option<String>,
    },
    /// Insert one product into the database
    Add(AddArgs),
    /// Delete a product from the database by id
    Delete {
        /// Product id
        id: i64,
    },
    /// Print all stored products as JSON
    List,
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = NOT_AVAILABLE)]
    brand: String,
    #[arg(long, default_value = NOT_AVAILABLE)]
    price: String,
    #[arg(long, default_value = NOT_AVAILABLE)]
    cart_count: String,
    #[arg(long, default_value = NOT_AVAILABLE)]
    favorite_count: String,
    #[arg(long, default_value = NOT_AVAILABLE)]
    rating_score: String,
    #[arg(long, default_value = NOT_AVAILABLE)]
    rating_count: String,
    #[arg(long, default_value = NOT_AVAILABLE)]
    promotions: String,
}

impl From<AddArgs> for ProductRecord {
    fn from(args: AddArgs) -> Self {
        Self {
            name: args.name,
            brand: args.brand,
            price: args.price,
            cart_count: args.cart_count,
            favorite_count: args.favorite_count,
            rating_score: args.rating_score,
            rating_count: args.rating_count,
            promotions: args.promotions,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    match cli.command.unwrap_or(Command::Crawl) {
        Command::Crawl => handle_crawl(&config).await,
        Command::SaveCsv => {
            let csv = CsvFileSink::new(&config.output.csv_path);
            handle_save(&config, &[&csv]).await
        }
        Command::SaveDb => {
            let db = SqliteSink::new(&config.output.database_path);
            handle_save(&config, &[&db]).await
        }
        Command::SaveAll => {
            let csv = CsvFileSink::new(&config.output.csv_path);
            let db = SqliteSink::new(&config.output.database_path);
            handle_save(&config, &[&csv, &db]).await
        }
        Command::Health { url } => handle_health(&config, url).await,
        Command::Add(args) => {
            let db = SqliteSink::new(&config.output.database_path);
            let id = db.insert_product(&args.into())?;
            println!("{}", id);
            Ok(())
        }
        Command::Delete { id } => {
            let db = SqliteSink::new(&config.output.database_path);
            let deleted = db.delete_product(id)?;
            println!("{}", serde_json::to_string_pretty(&deleted)?);
            Ok(())
        }
        Command::List => {
            let db = SqliteSink::new(&config.output.database_path);
            println!("{}", serde_json::to_string_pretty(&db.list_products()?)?);
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries command output only.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvest=info,warn"),
            1 => EnvFilter::new("listing_harvest=debug,info"),
            2 => EnvFilter::new("listing_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --dry-run: prints the resolved configuration and page URLs
fn handle_dry_run(config: &Config) {
    println!("=== Listing-Harvest Dry Run ===\n");

    println!("Listing:");
    println!("  Template: {}", config.crawler.url_template);
    println!(
        "  Pages: {}..{}{}",
        config.crawler.start_page,
        config.crawler.end_page,
        if config.crawler.end_inclusive {
            " (inclusive)"
        } else {
            ""
        }
    );
    println!(
        "  Brand merged into name: {}",
        config.crawler.merge_brand_into_name
    );

    println!("\nUser Agent: {}", config.user_agent.value);

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    println!("  Database: {}", config.output.database_path);

    println!("\nWould fetch:");
    for page in config.crawler.page_range() {
        println!("  - {}", config.crawler.page_url(page));
    }

    println!("\n✓ Configuration is valid");
}

async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    let result = crawl(config).await?;
    println!("{}", serde_json::to_string_pretty(&result.records)?);
    Ok(())
}

/// Crawls once and hands the same records to every sink
async fn handle_save(config: &Config, sinks: &[&dyn StorageSink]) -> anyhow::Result<()> {
    let result = crawl(config).await?;
    tracing::info!("Collected {} products", result.len());

    let reports = save_to_sinks(&result.records, sinks);
    let mut failed = 0;
    for report in &reports {
        match &report.result {
            Ok(count) => println!("✓ {}: saved {} products", report.sink, count),
            Err(e) => {
                failed += 1;
                println!("✗ {}: {}", report.sink, e);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} sinks failed", failed, reports.len());
    }
    Ok(())
}

async fn handle_health(config: &Config, url: Option<String>) -> anyhow::Result<()> {
    let url = url.unwrap_or_else(|| config.crawler.page_url(config.crawler.start_page));
    let client = build_http_client(&config.user_agent)?;
    let checker = HealthChecker::new(client);

    let status = checker
        .check(
            &url,
            config.health.max_retries,
            Duration::from_secs(config.health.timeout_secs),
        )
        .await;

    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
