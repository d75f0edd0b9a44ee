use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use fbreview_scraper::config::{AppConfig, ConfigOverrides};
use fbreview_scraper::core::ReviewPipeline;
use fbreview_scraper::error::ReviewScrapeError;
use fbreview_scraper::export::{json_exporter, ExportFormat, ExportManager};
use fbreview_scraper::logging::{init_logging, LogContext, RequestIdGenerator};
use fbreview_scraper::scraper::{HttpClient, PlaywrightProvider};
use fbreview_scraper::utils::{format_duration, format_file_size};

#[derive(Parser)]
#[command(name = "fbreview")]
#[command(about = "Extract reviews from a business page")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, help = "Enable verbose logging")]
    verbose: bool,

    #[arg(short, long, help = "Configuration file path")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape reviews from a page
    Scrape {
        #[arg(help = "Business page URL")]
        url: String,

        #[arg(short = 'n', long, default_value_t = 10, help = "Number of reviews to return")]
        count: usize,

        #[arg(short, long, help = "Output file path")]
        output: Option<PathBuf>,

        #[arg(short, long, help = "Output format", value_enum)]
        format: Option<OutputFormat>,

        #[arg(long, help = "Print the JSON array to stdout instead of writing a file")]
        stdout: bool,
    },

    /// Print the effective configuration
    Config {
        #[arg(long, help = "Also write it to the default config file")]
        save: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum OutputFormat {
    Json,
    Csv,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => ExportFormat::Json,
            OutputFormat::Csv => ExportFormat::Csv,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path).await?,
        None => AppConfig::load().await?,
    };
    ConfigOverrides::apply(&mut config);
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    config.validate()?;

    init_logging(&config.logging)?;

    let context = LogContext::new("main", "startup")
        .with_request_id(RequestIdGenerator::generate())
        .with_string_field("version", env!("CARGO_PKG_VERSION"));
    fbreview_scraper::log_debug!(context, "fbreview starting up");

    match cli.command {
        Commands::Scrape { url, count, output, format, stdout } => {
            if let Err(e) = execute_scrape(config, &url, count, output, format, stdout).await {
                report_failure(&url, &e);
                std::process::exit(1);
            }
        }
        Commands::Config { save } => {
            print!("{}", config.to_toml()?);
            if save {
                let path = config.save().await?;
                eprintln!("Configuration written to {}", path.display());
            }
        }
    }

    Ok(())
}

async fn execute_scrape(
    config: AppConfig,
    url: &str,
    count: usize,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    stdout: bool,
) -> Result<(), ReviewScrapeError> {
    let started = std::time::Instant::now();
    info!("Scraping {} reviews from {}", count, url);

    let format = match format {
        Some(format) => ExportFormat::from(format),
        None => config
            .export
            .default_format
            .parse()
            .map_err(|e: anyhow::Error| ReviewScrapeError::config(e.to_string()))?,
    };

    let checker = HttpClient::new(&config.scraping)?;
    let browser = PlaywrightProvider::new(&config.scraping)
        .await
        .map_err(|e| ReviewScrapeError::browser(e.to_string()))?;
    let manager = ExportManager::new(&config.export);

    let pipeline = ReviewPipeline::new(config, checker, browser)?;
    let records = pipeline.run(url, count).await?;

    if stdout {
        let json = json_exporter::to_json(&records, pipeline.config().export.pretty)
            .map_err(|e| ReviewScrapeError::export(e.to_string()))?;
        println!("{}", json);
        return Ok(());
    }

    let path = output.unwrap_or_else(|| manager.default_path(url, format));
    let stats = manager
        .export(&records, &path, format)
        .await
        .map_err(|e| ReviewScrapeError::FileWrite {
            path: format!("{}: {}", path.display(), e),
        })?;

    println!(
        "Saved {} of {} requested reviews to {} ({}, {})",
        stats.record_count,
        count,
        stats.file_path.display(),
        format_file_size(stats.file_size_bytes),
        format_duration(started.elapsed())
    );

    Ok(())
}

fn report_failure(url: &str, e: &ReviewScrapeError) {
    if e.is_user_facing() {
        eprintln!("Error: {}", e);
    } else {
        let context = LogContext::new("main", "scrape")
            .with_url(url)
            .with_error_category(e.category());
        fbreview_scraper::log_error!(context, e, "Scrape failed");
        eprintln!("Error ({}): {}", e.category(), e);
    }
}
