use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use job_scraper::config::AppConfig;
use job_scraper::constants;
use job_scraper::strategies::{create_strategy, default_strategies, FetchStrategy};
use job_scraper::types::{JobSource, RawRecord};
use job_scraper::{logging, metrics, JobFetcher, JobNormalizer, MetricsTelemetry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "job_scraper")]
#[command(about = "Fetch job postings from a careers source and normalize them")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch postings and print the result as JSON
    Fetch {
        /// Config file; JOBS_* environment variables override it
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        company_id: Option<String>,
        /// Primary source URL
        #[arg(long)]
        url: Option<String>,
        /// Alternate JSON endpoints (repeatable)
        #[arg(long = "alt-url")]
        alt_urls: Vec<String>,
        /// Caller context: webhook, scheduled or manual
        #[arg(long, default_value = "manual")]
        source: JobSource,
        /// Strategies to try, in order (comma-separated). Available: json_api, html_scrape
        #[arg(long)]
        strategies: Option<String>,
        /// Expose Prometheus metrics while running
        #[arg(long)]
        metrics: bool,
    },
    /// Normalize a local JSON file of raw records
    Normalize {
        file: PathBuf,
        #[arg(long, default_value = "manual")]
        source: JobSource,
    },
    /// List built-in strategies in default priority order
    Strategies,
}

/// File, then `JOBS_*` environment, then command-line flags
fn load_config(
    path: Option<PathBuf>,
    company_id: Option<String>,
    url: Option<String>,
    alt_urls: Vec<String>,
) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::from_sources(path.as_deref()).with_context(|| match &path {
        Some(path) => format!("loading {}", path.display()),
        None => "loading configuration".to_string(),
    })?;

    if let Some(company_id) = company_id {
        config.fetch.company_id = company_id;
    }
    if let Some(url) = url {
        config.fetch.url = url;
    }
    if !alt_urls.is_empty() {
        config.fetch.alternate_urls = alt_urls;
    }
    config.validate()?;
    Ok(config)
}

fn resolve_strategies(names: Option<String>) -> anyhow::Result<Vec<Box<dyn FetchStrategy>>> {
    let Some(names) = names else {
        return Ok(default_strategies());
    };

    let mut strategies = Vec::new();
    for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        match create_strategy(name) {
            Some(strategy) => strategies.push(strategy),
            None => bail!(
                "unknown strategy '{}'; available: {}",
                name,
                constants::get_supported_strategies().join(", ")
            ),
        }
    }
    Ok(strategies)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            config,
            company_id,
            url,
            alt_urls,
            source,
            strategies,
            metrics: metrics_flag,
        } => {
            let app_config = load_config(config, company_id, url, alt_urls)?;
            let fetch_config = app_config.fetch;

            let mut fetcher =
                JobFetcher::from_config(&fetch_config, resolve_strategies(strategies)?)?;

            if metrics_flag || app_config.metrics.enabled {
                if metrics::init_metrics(&app_config.metrics.addr) {
                    fetcher = fetcher.with_telemetry(Arc::new(MetricsTelemetry::new()));
                } else {
                    warn!("Metrics requested but the exporter could not start; continuing without");
                }
            }

            info!(
                "Fetching jobs for {} with strategies [{}]",
                fetch_config.company_id,
                fetcher.strategy_names().join(", ")
            );
            let result = fetcher.fetch_jobs(&fetch_config, source).await;
            println!("{}", serde_json::to_string_pretty(&result)?);

            if !result.success {
                std::process::exit(1);
            }
        }
        Commands::Normalize { file, source } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let raw: Vec<RawRecord> = serde_json::from_str(&content)
                .with_context(|| format!("{} must contain a JSON array", file.display()))?;
            let jobs = JobNormalizer::new().normalize_batch(raw, source, &chrono::Utc::now());
            println!("{}", serde_json::to_string_pretty(&jobs)?);
        }
        Commands::Strategies => {
            for name in constants::get_supported_strategies() {
                println!("{name}");
            }
        }
    }

    Ok(())
}
