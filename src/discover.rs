//! Traversal orchestration
//!
//! Ties together robots policy, sitemap discovery, and the fallback crawler,
//! and produces the final ordered URL list handed to content extraction.

use crate::config::RunConfig;
use crate::crawl::{normalize, Crawler, Pacer, RobotsPolicy, SitemapDiscoverer};
use crate::error::{Error, Result};
use indicatif::ProgressBar;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

/// How the final URL list was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// A sitemap was located automatically
    Sitemap,
    /// No sitemap was found; the list came from crawling
    GeneratedByCrawl,
    /// The user supplied a sitemap URL manually
    Manual,
}

impl Provenance {
    /// Short label used in the output summary
    pub fn label(&self) -> &'static str {
        match self {
            Provenance::Sitemap => "found",
            Provenance::GeneratedByCrawl => "generated",
            Provenance::Manual => "manual",
        }
    }
}

/// The ordered, deduplicated URL list produced by discovery
#[derive(Debug, Clone)]
pub struct DiscoveryResult {
    /// Page URLs in discovery order, normalized, no duplicates
    pub urls: Vec<Url>,
    /// How the list was produced
    pub provenance: Provenance,
}

/// What to do when no sitemap can be found
#[derive(Debug, Clone)]
pub enum FallbackDecision {
    /// Crawl the site breadth-first from the seed
    Crawl,
    /// Fetch this sitemap URL instead
    ManualSitemap(String),
    /// Abort the run
    Cancel,
}

/// Boundary for the interactive no-sitemap prompt.
///
/// The orchestrator never reads input directly; callers inject a decision
/// source so the control flow is testable.
pub trait FallbackPrompt {
    fn choose(&self, seed: &Url) -> FallbackDecision;
}

/// Run the full discovery sequence for a seed URL.
///
/// Tries sitemap discovery first; on an empty result asks the injected
/// prompt whether to crawl, use a manual sitemap URL, or cancel. The global
/// page limit is applied by truncation, preserving discovery order.
pub async fn run_discovery(
    client: &Client,
    seed: &Url,
    config: &RunConfig,
    prompt: &dyn FallbackPrompt,
    crawl_bar: &ProgressBar,
) -> Result<DiscoveryResult> {
    let seed = normalize(seed)
        .ok_or_else(|| Error::Setup(format!("not an http(s) URL: {}", seed)))?;
    let origin = origin_of(&seed)?;

    let robots = RobotsPolicy::load(client, &origin, &config.user_agent).await;
    let pacer = Pacer::new(config.delay, robots.crawl_delay());
    debug!("Effective request interval: {:?}", pacer.interval());

    let discoverer = SitemapDiscoverer::new(client);
    let entries = discoverer.discover(&origin, &robots).await;

    let mut result = if !entries.is_empty() {
        DiscoveryResult {
            urls: entries.into_iter().map(|e| e.loc).collect(),
            provenance: Provenance::Sitemap,
        }
    } else {
        match prompt.choose(&seed) {
            FallbackDecision::Crawl => {
                let crawler = Crawler::new(
                    client,
                    &robots,
                    &pacer,
                    config.crawl_depth,
                    config.max_crawl_pages,
                );
                let urls = crawler.crawl(&seed, crawl_bar).await?;
                if urls.is_empty() {
                    return Err(Error::Crawl(
                        "no pages could be discovered through crawling".to_string(),
                    ));
                }
                DiscoveryResult {
                    urls,
                    provenance: Provenance::GeneratedByCrawl,
                }
            }
            FallbackDecision::ManualSitemap(raw) => {
                let sitemap_url = Url::parse(raw.trim())
                    .map_err(|_| Error::Sitemap(format!("invalid sitemap URL: {}", raw)))?;
                let entries = discoverer.collect(&sitemap_url).await;
                if entries.is_empty() {
                    return Err(Error::Sitemap(format!(
                        "no URLs found in sitemap: {}",
                        sitemap_url
                    )));
                }
                DiscoveryResult {
                    urls: entries.into_iter().map(|e| e.loc).collect(),
                    provenance: Provenance::Manual,
                }
            }
            FallbackDecision::Cancel => return Err(Error::Cancelled),
        }
    };

    if let Some(limit) = config.limit {
        if result.urls.len() > limit {
            info!("Limiting to first {} of {} pages", limit, result.urls.len());
            result.urls.truncate(limit);
        }
    }

    info!(
        "Discovery complete: {} pages ({})",
        result.urls.len(),
        result.provenance.label()
    );
    Ok(result)
}

/// Derive the origin (scheme + host + port, root path) from a URL
pub fn origin_of(url: &Url) -> Result<Url> {
    if url.host_str().is_none() {
        return Err(Error::Setup(format!("URL has no host: {}", url)));
    }

    let mut origin = url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    Ok(origin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_of() {
        let url = Url::parse("https://example.com/docs/intro?q=1#top").unwrap();
        assert_eq!(origin_of(&url).unwrap().as_str(), "https://example.com/");

        let with_port = Url::parse("http://127.0.0.1:8080/a/b").unwrap();
        assert_eq!(origin_of(&with_port).unwrap().as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_provenance_labels() {
        assert_eq!(Provenance::Sitemap.label(), "found");
        assert_eq!(Provenance::GeneratedByCrawl.label(), "generated");
        assert_eq!(Provenance::Manual.label(), "manual");
    }
}
