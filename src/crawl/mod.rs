//! URL discovery by breadth-first crawling
//!
//! This module provides:
//! - URL normalization for stable identity comparisons
//! - robots.txt parsing and respect
//! - Request pacing between fetches
//! - Sitemap discovery and parsing
//! - A breadth-first fallback crawler with depth and page limits

mod pacer;
mod robots;
mod sitemap;

pub use pacer::*;
pub use robots::*;
pub use sitemap::*;

use crate::error::{Error, Result};
use indicatif::ProgressBar;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info};
use url::Url;

/// Normalize an absolute URL to its canonical form.
///
/// Lower-cases the host, drops the fragment, strips a trailing slash from
/// non-root paths, and keeps the query string. Returns `None` for non-http(s)
/// schemes, so mailto:, javascript:, tel: and friends are silently excluded.
pub fn normalize(url: &Url) -> Option<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    let mut normalized = url.clone();
    normalized.set_fragment(None);

    if let Some(host) = normalized.host_str() {
        let lower = host.to_ascii_lowercase();
        if lower != host {
            normalized.set_host(Some(&lower)).ok()?;
        }
    }

    let path = normalized.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        normalized.set_path(&trimmed);
    }

    Some(normalized)
}

/// Resolve a raw href against a base URL and normalize the result.
///
/// Malformed input is silently excluded rather than treated as an error.
pub fn normalize_join(base: &Url, raw: &str) -> Option<Url> {
    let resolved = base.join(raw).ok()?;
    normalize(&resolved)
}

/// Check whether two URLs share an origin (scheme + host + port)
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme() && a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

/// File extensions that never carry page content
const SKIP_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".svg", ".ico", ".pdf", ".doc", ".docx", ".xls", ".xlsx",
    ".ppt", ".pptx", ".zip", ".rar", ".tar", ".gz", ".7z", ".mp3", ".mp4", ".avi", ".mov",
    ".wmv", ".css", ".js", ".json", ".xml", ".rss", ".atom",
];

/// Path fragments that mark non-content pages
const SKIP_PATHS: &[&str] = &[
    "/wp-admin", "/admin", "/login", "/logout", "/api/", "/feed/", "/.well-known",
];

/// Check if a URL is worth crawling at all
pub fn is_crawlable(url: &Url) -> bool {
    let path = url.path().to_lowercase();

    if SKIP_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return false;
    }

    if SKIP_PATHS.iter().any(|skip| path.contains(skip)) {
        return false;
    }

    true
}

/// Extract crawlable link targets from an HTML page.
///
/// Both `<a href>` and `<link href>` targets are considered; results are
/// normalized and deduplicated, in document order.
pub fn extract_links(base: &Url, html: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    for css in ["a[href]", "link[href]"] {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(url) = normalize_join(base, href) else {
                continue;
            };
            if is_crawlable(&url) && seen.insert(url.as_str().to_string()) {
                links.push(url);
            }
        }
    }

    links
}

/// Breadth-first fallback crawler.
///
/// Used when no usable sitemap is found. One crawl run owns its frontier and
/// visited set; traversal is strictly sequential, so visit order is
/// deterministic: breadth-first, same-depth siblings in the order their
/// parent's links appeared.
pub struct Crawler<'a> {
    client: &'a Client,
    robots: &'a RobotsPolicy,
    pacer: &'a Pacer,
    max_depth: u32,
    max_pages: u32,
}

impl<'a> Crawler<'a> {
    pub fn new(
        client: &'a Client,
        robots: &'a RobotsPolicy,
        pacer: &'a Pacer,
        max_depth: u32,
        max_pages: u32,
    ) -> Self {
        Self {
            client,
            robots,
            pacer,
            max_depth,
            max_pages,
        }
    }

    /// Crawl from a seed URL and return visited page URLs in visit order.
    ///
    /// Per-URL failures are logged and skipped; only a seed that cannot be
    /// normalized aborts the run. Disallowed and failed URLs never count
    /// toward the page limit.
    pub async fn crawl(&self, seed: &Url, bar: &ProgressBar) -> Result<Vec<Url>> {
        let seed = normalize(seed)
            .ok_or_else(|| Error::Crawl(format!("Seed URL is not crawlable: {}", seed)))?;

        info!(
            "Starting web crawl of {} (max depth {}, max pages {})",
            seed, self.max_depth, self.max_pages
        );

        let mut frontier: VecDeque<(Url, u32)> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut discovered: Vec<Url> = Vec::new();

        visited.insert(seed.as_str().to_string());
        frontier.push_back((seed.clone(), 0));

        while let Some((url, depth)) = frontier.pop_front() {
            if discovered.len() >= self.max_pages as usize {
                info!("Reached max pages limit ({})", self.max_pages);
                break;
            }

            if !self.robots.allows(url.path()) {
                debug!("Skipping {} (robots.txt)", url);
                continue;
            }

            let body = match self.fetch_html(&url).await {
                Ok(Some(body)) => body,
                Ok(None) => {
                    debug!("Skipping {} (not HTML)", url);
                    continue;
                }
                Err(e) => {
                    debug!("Error crawling {}: {}", url, e);
                    continue;
                }
            };

            discovered.push(url.clone());
            bar.inc(1);
            bar.set_message(url.as_str().to_string());

            if depth < self.max_depth {
                for link in extract_links(&url, &body) {
                    if !same_origin(&link, &seed) {
                        debug!("Skipping {} (outside origin)", link);
                        continue;
                    }
                    if visited.insert(link.as_str().to_string()) {
                        frontier.push_back((link, depth + 1));
                    }
                }
            }

            self.pacer.pause().await;
        }

        info!("Crawl complete. Discovered {} pages", discovered.len());
        Ok(discovered)
    }

    /// Fetch a URL, returning its body only for successful HTML responses
    async fn fetch_html(&self, url: &Url) -> Result<Option<String>> {
        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Crawl(format!("HTTP {}: {}", status, url)));
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false);

        if !is_html {
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> Option<String> {
        normalize(&Url::parse(s).unwrap()).map(|u| u.as_str().to_string())
    }

    #[test]
    fn test_normalize_strips_fragment_and_trailing_slash() {
        assert_eq!(norm("https://example.com/path/"), norm("https://example.com/path"));
        assert_eq!(
            norm("https://example.com/path#fragment"),
            norm("https://example.com/path")
        );
        assert_eq!(norm("https://example.com/path").unwrap(), "https://example.com/path");
    }

    #[test]
    fn test_normalize_root_keeps_slash() {
        assert_eq!(norm("https://example.com").unwrap(), "https://example.com/");
        assert_eq!(norm("https://example.com/").unwrap(), "https://example.com/");
    }

    #[test]
    fn test_normalize_keeps_query() {
        assert_eq!(
            norm("https://example.com/search?q=rust").unwrap(),
            "https://example.com/search?q=rust"
        );
    }

    #[test]
    fn test_normalize_lowercases_host() {
        assert_eq!(
            norm("https://EXAMPLE.com/Path").unwrap(),
            "https://example.com/Path"
        );
    }

    #[test]
    fn test_normalize_rejects_non_http() {
        let base = Url::parse("https://example.com/").unwrap();
        assert!(normalize_join(&base, "mailto:someone@example.com").is_none());
        assert!(normalize_join(&base, "javascript:void(0)").is_none());
        assert!(normalize_join(&base, "tel:+123456").is_none());
    }

    #[test]
    fn test_normalize_join_resolves_relative() {
        let base = Url::parse("https://example.com/docs/").unwrap();
        assert_eq!(
            normalize_join(&base, "intro").unwrap().as_str(),
            "https://example.com/docs/intro"
        );
        assert_eq!(
            normalize_join(&base, "/about/").unwrap().as_str(),
            "https://example.com/about"
        );
    }

    #[test]
    fn test_same_origin() {
        let a = Url::parse("https://example.com/a").unwrap();
        let b = Url::parse("https://example.com:443/b").unwrap();
        let c = Url::parse("https://other.test/c").unwrap();
        let d = Url::parse("http://example.com/a").unwrap();
        assert!(same_origin(&a, &b));
        assert!(!same_origin(&a, &c));
        assert!(!same_origin(&a, &d));
    }

    #[test]
    fn test_is_crawlable() {
        let ok = |s: &str| is_crawlable(&Url::parse(s).unwrap());
        assert!(ok("https://example.com/docs/intro"));
        assert!(!ok("https://example.com/logo.png"));
        assert!(!ok("https://example.com/styles.css"));
        assert!(!ok("https://example.com/login"));
        assert!(!ok("https://example.com/api/users"));
        assert!(!ok("https://example.com/feed/"));
    }

    #[test]
    fn test_extract_links() {
        let base = Url::parse("https://example.com/").unwrap();
        let html = r#"<html><body>
            <a href="/a">A</a>
            <a href="/a#section">A again</a>
            <a href="https://other.test/c">External</a>
            <a href="mailto:x@example.com">Mail</a>
            <a href="/image.png">Image</a>
        </body></html>"#;

        let links = extract_links(&base, html);
        let strs: Vec<&str> = links.iter().map(|u| u.as_str()).collect();
        // fragment variant deduplicated, mailto and image filtered
        assert_eq!(strs, vec!["https://example.com/a", "https://other.test/c"]);
    }
}
