//! Sitemap discovery, parsing, and generation
//!
//! Discovery tries candidates in priority order: `Sitemap:` hints from
//! robots.txt, well-known paths, then sitemap links on the site's root page.
//! Both urlset and sitemapindex documents are understood; indexes are walked
//! with an explicit worklist guarded by a seen-set and a fetch cap so a
//! self-referencing index cannot loop.

use super::{normalize, RobotsPolicy};
use crate::error::{Error, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};
use url::Url;

/// Well-known sitemap locations, most common first
pub const WELL_KNOWN_SITEMAP_PATHS: &[&str] = &[
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemap-index.xml",
    "/sitemapindex.xml",
    "/wp-sitemap.xml",
];

/// Cap on sitemap documents fetched while resolving an index
const MAX_SITEMAP_FETCHES: usize = 50;

/// A URL entry from a sitemap
#[derive(Debug, Clone)]
pub struct SitemapEntry {
    /// The page URL, normalized
    pub loc: Url,
    /// Last modification time (optional)
    pub lastmod: Option<String>,
    /// Change frequency (optional)
    pub changefreq: Option<String>,
    /// Priority (optional)
    pub priority: Option<f32>,
}

/// One parsed sitemap document
enum SitemapDoc {
    /// A urlset containing page URLs
    UrlSet(Vec<SitemapEntry>),
    /// A sitemap index containing links to other sitemaps
    Index(Vec<Url>),
}

/// Sitemap locator and parser
pub struct SitemapDiscoverer<'a> {
    client: &'a Client,
    max_fetches: usize,
}

impl<'a> SitemapDiscoverer<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self {
            client,
            max_fetches: MAX_SITEMAP_FETCHES,
        }
    }

    /// Locate a usable sitemap for the origin and return its page entries.
    ///
    /// Candidates are tried in order until one yields at least one URL;
    /// an empty result means every candidate was exhausted.
    pub async fn discover(&self, origin: &Url, robots: &RobotsPolicy) -> Vec<SitemapEntry> {
        for hinted in robots.sitemaps(origin) {
            debug!("Trying sitemap from robots.txt: {}", hinted);
            let entries = self.collect(&hinted).await;
            if !entries.is_empty() {
                info!("Found sitemap via robots.txt: {}", hinted);
                return entries;
            }
        }

        for path in WELL_KNOWN_SITEMAP_PATHS {
            let Ok(candidate) = origin.join(path) else {
                continue;
            };
            debug!("Trying well-known sitemap path: {}", candidate);
            let entries = self.collect(&candidate).await;
            if !entries.is_empty() {
                info!("Found sitemap at: {}", candidate);
                return entries;
            }
        }

        for linked in self.root_page_candidates(origin).await {
            debug!("Trying sitemap link from root page: {}", linked);
            let entries = self.collect(&linked).await;
            if !entries.is_empty() {
                info!("Found sitemap link in HTML: {}", linked);
                return entries;
            }
        }

        warn!("Could not find a sitemap for {}", origin);
        Vec::new()
    }

    /// Fetch a sitemap URL and resolve it fully, following index documents.
    ///
    /// Page URLs are deduplicated by normalized form; the returned order is
    /// document order across the merge.
    pub async fn collect(&self, sitemap_url: &Url) -> Vec<SitemapEntry> {
        let mut entries: Vec<SitemapEntry> = Vec::new();
        let mut seen_pages: HashSet<String> = HashSet::new();
        let mut seen_sitemaps: HashSet<String> = HashSet::new();
        let mut fetched = 0usize;

        let mut worklist: VecDeque<Url> = VecDeque::new();
        worklist.push_back(sitemap_url.clone());
        seen_sitemaps.insert(sitemap_url.as_str().to_string());

        while let Some(url) = worklist.pop_front() {
            if fetched >= self.max_fetches {
                warn!("Reached sitemap fetch cap ({}), stopping", self.max_fetches);
                break;
            }
            fetched += 1;

            let body = match self.fetch_body(&url).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Failed to fetch sitemap {}: {}", url, e);
                    continue;
                }
            };

            match classify(&body) {
                SitemapDoc::UrlSet(found) => {
                    debug!("Found {} URLs in sitemap: {}", found.len(), url);
                    for entry in found {
                        if seen_pages.insert(entry.loc.as_str().to_string()) {
                            entries.push(entry);
                        }
                    }
                }
                SitemapDoc::Index(children) => {
                    debug!("Found sitemap index with {} children: {}", children.len(), url);
                    for child in children {
                        if seen_sitemaps.insert(child.as_str().to_string()) {
                            worklist.push_back(child);
                        }
                    }
                }
            }
        }

        debug!("Collected {} URLs from {} sitemap document(s)", entries.len(), fetched);
        entries
    }

    async fn fetch_body(&self, url: &Url) -> Result<String> {
        let response = self.client.get(url.as_str()).send().await?;

        if !response.status().is_success() {
            return Err(Error::Sitemap(format!("HTTP {}: {}", response.status(), url)));
        }

        Ok(response.text().await?)
    }

    /// Scan the origin's root HTML page for sitemap links
    async fn root_page_candidates(&self, origin: &Url) -> Vec<Url> {
        match self.fetch_body(origin).await {
            Ok(body) => scan_for_sitemap_links(origin, &body),
            Err(_) => Vec::new(),
        }
    }
}

/// Classify a sitemap body and parse it.
///
/// Plain-text URL lists (one URL per line) are accepted as a urlset, since
/// `/sitemap.txt` exists in the wild.
fn classify(body: &str) -> SitemapDoc {
    if body.contains("<sitemapindex") {
        SitemapDoc::Index(parse_index(body))
    } else if body.contains("<urlset") {
        SitemapDoc::UrlSet(parse_urlset(body))
    } else {
        SitemapDoc::UrlSet(parse_plain_text(body))
    }
}

/// Parse `<url>` entries from a urlset document
fn parse_urlset(body: &str) -> Vec<SitemapEntry> {
    let mut entries = Vec::new();

    for block in body.split("<url>").skip(1) {
        let Some(end) = block.find("</url>") else {
            continue;
        };
        let block = &block[..end];

        let Some(raw_loc) = extract_tag(block, "loc") else {
            continue;
        };
        let Some(loc) = Url::parse(&raw_loc).ok().and_then(|u| normalize(&u)) else {
            continue;
        };

        entries.push(SitemapEntry {
            loc,
            lastmod: extract_tag(block, "lastmod"),
            changefreq: extract_tag(block, "changefreq"),
            priority: extract_tag(block, "priority").and_then(|s| s.parse().ok()),
        });
    }

    entries
}

/// Parse `<sitemap>` entries from a sitemapindex document
fn parse_index(body: &str) -> Vec<Url> {
    let mut sitemaps = Vec::new();

    for block in body.split("<sitemap>").skip(1) {
        let Some(end) = block.find("</sitemap>") else {
            continue;
        };
        if let Some(loc) = extract_tag(&block[..end], "loc") {
            if let Ok(url) = Url::parse(&loc) {
                sitemaps.push(url);
            }
        }
    }

    sitemaps
}

/// Parse a plain-text list of URLs, one per line
fn parse_plain_text(body: &str) -> Vec<SitemapEntry> {
    body.lines()
        .map(str::trim)
        .filter(|line| line.starts_with("http://") || line.starts_with("https://"))
        .filter_map(|line| Url::parse(line).ok())
        .filter_map(|url| normalize(&url))
        .map(|loc| SitemapEntry {
            loc,
            lastmod: None,
            changefreq: None,
            priority: None,
        })
        .collect()
}

/// Extract text content from an XML tag
fn extract_tag(content: &str, tag: &str) -> Option<String> {
    let start_tag = format!("<{}>", tag);
    let end_tag = format!("</{}>", tag);

    content.find(&start_tag).and_then(|start| {
        let value_start = start + start_tag.len();
        content[value_start..]
            .find(&end_tag)
            .map(|end| content[value_start..value_start + end].trim().to_string())
    })
}

/// Find anchor or link tags on a page whose target mentions "sitemap"
fn scan_for_sitemap_links(base: &Url, html: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut found = Vec::new();
    let mut seen = HashSet::new();

    for css in ["a[href]", "link[href]"] {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if !href.to_lowercase().contains("sitemap") {
                continue;
            }
            if let Ok(url) = base.join(href) {
                if seen.insert(url.as_str().to_string()) {
                    found.push(url);
                }
            }
        }
    }

    found
}

/// Generate a urlset sitemap document from discovered URLs.
///
/// Written alongside the output when the URL list came from crawling, so a
/// later run can reproduce the same page set without re-crawling.
pub fn generate_sitemap(urls: &[Url]) -> String {
    let today = chrono::Local::now().format("%Y-%m-%d");

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");

    for url in urls {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", url));
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", today));
        xml.push_str("    <changefreq>weekly</changefreq>\n");
        xml.push_str("    <priority>0.5</priority>\n");
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>");
    xml
}
