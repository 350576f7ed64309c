//! sitedown CLI entry point

use clap::Parser;
use reqwest::Client;
use sitedown::{
    config::{self, RunConfig},
    crawl::{generate_sitemap, Pacer},
    discover::{run_discovery, DiscoveryResult, FallbackDecision, FallbackPrompt},
    error::{Error, Result},
    extract::{Extractor, PageContent},
    output, progress,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

#[derive(Parser)]
#[command(name = "sitedown")]
#[command(version, about = "Extract a website's content into Markdown documents", long_about = None)]
struct Cli {
    /// Website URL (e.g., https://example.com)
    url: String,

    /// Output directory path (default: domain name without TLD)
    output: Option<PathBuf>,

    /// Save all content to a single Markdown file instead of separate files
    #[arg(long)]
    single_file: bool,

    /// Delay between requests in seconds
    #[arg(long, default_value_t = config::default_delay())]
    delay: f64,

    /// Request timeout in seconds
    #[arg(long, default_value_t = config::default_timeout())]
    timeout: u64,

    /// Limit number of pages to process
    #[arg(long)]
    limit: Option<usize>,

    /// Maximum depth for web crawling if no sitemap found
    #[arg(long, default_value_t = config::default_crawl_depth())]
    crawl_depth: u32,

    /// Maximum pages to crawl if no sitemap found
    #[arg(long, default_value_t = config::default_max_crawl_pages())]
    max_crawl_pages: u32,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

/// Interactive no-sitemap prompt, reading the decision from stdin
struct StdinPrompt;

impl FallbackPrompt for StdinPrompt {
    fn choose(&self, seed: &Url) -> FallbackDecision {
        println!("\nNo sitemap found for {}", seed);
        println!("\nWould you like to:");
        println!("1. Crawl the website to discover pages automatically");
        println!("2. Enter a sitemap URL manually");
        println!("3. Cancel");
        print!("\nYour choice (1/2/3): ");
        let _ = std::io::stdout().flush();

        let mut choice = String::new();
        if std::io::stdin().lock().read_line(&mut choice).is_err() {
            return FallbackDecision::Cancel;
        }

        match choice.trim() {
            "1" => FallbackDecision::Crawl,
            "2" => {
                print!("Enter the sitemap URL: ");
                let _ = std::io::stdout().flush();
                let mut url = String::new();
                if std::io::stdin().lock().read_line(&mut url).is_err() || url.trim().is_empty() {
                    return FallbackDecision::Cancel;
                }
                FallbackDecision::ManualSitemap(url.trim().to_string())
            }
            _ => FallbackDecision::Cancel,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = RunConfig {
        delay: cli.delay,
        timeout_secs: cli.timeout,
        limit: cli.limit,
        crawl_depth: cli.crawl_depth,
        max_crawl_pages: cli.max_crawl_pages,
        single_file: cli.single_file,
        user_agent: config::default_user_agent(),
    };
    config.validate()?;

    let seed = Url::parse(&cli.url).map_err(|e| Error::Setup(format!("{}: {}", cli.url, e)))?;
    if seed.scheme() != "http" && seed.scheme() != "https" {
        return Err(Error::Setup(format!("not an http(s) URL: {}", cli.url)));
    }

    let output_path = cli
        .output
        .unwrap_or_else(|| PathBuf::from(output::default_output_name(&seed, config.single_file)));

    println!("\nProcessing website: {}", seed);
    println!("Output path: {}", output_path.display());
    println!(
        "Mode: {}",
        if config.single_file {
            "single file"
        } else {
            "separate files with directory structure"
        }
    );

    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .gzip(true)
        .brotli(true)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| Error::Setup(format!("failed to create HTTP client: {}", e)))?;

    // Discovery: sitemap first, crawl as a fallback
    let crawl_bar = progress::crawl_bar(config.max_crawl_pages as u64);
    let discovery = run_discovery(&client, &seed, &config, &StdinPrompt, &crawl_bar).await?;
    crawl_bar.finish_and_clear();

    let sitemap_xml = generate_sitemap(&discovery.urls);
    let sitemap_path = output::save_sitemap(&output_path, config.single_file, &sitemap_xml)?;

    // Extraction: one page at a time, paced
    let pages = extract_all(&client, &config, &discovery).await;

    let stats = if config.single_file {
        output::write_single_file(&output_path, &pages)?
    } else {
        output::write_tree(&output_path, &pages, &seed, discovery.provenance)?
    };

    println!("\nProcessing complete!");
    println!("Summary:");
    println!("   - Successful: {}", stats.successful);
    println!("   - Failed: {}", stats.failed);
    match stats.success_rate() {
        Some(rate) => println!("   - Success Rate: {:.1}%", rate),
        None => println!("   - Success Rate: N/A"),
    }
    println!("Output saved to: {}", output_path.display());
    println!("Sitemap saved to: {}", sitemap_path.display());

    Ok(())
}

/// Extract content for every discovered URL, sequentially
async fn extract_all(
    client: &Client,
    config: &RunConfig,
    discovery: &DiscoveryResult,
) -> Vec<PageContent> {
    let extractor = Extractor::new(client);
    let pacer = Pacer::new(config.delay, None);
    let bar = progress::extract_bar(discovery.urls.len() as u64);

    let mut pages = Vec::with_capacity(discovery.urls.len());
    for url in &discovery.urls {
        pages.push(extractor.extract(url).await);
        bar.inc(1);
        bar.set_message(url.as_str().to_string());
        pacer.pause().await;
    }
    bar.finish_and_clear();

    pages
}
