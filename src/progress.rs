//! Progress bar helpers for the crawl and extraction phases

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for the fallback crawl (total = max pages, rarely reached).
///
/// The bar only renders once the crawler makes progress, so creating it
/// ahead of sitemap discovery costs nothing when a sitemap is found.
pub fn crawl_bar(max_pages: u64) -> ProgressBar {
    let bar = ProgressBar::new(max_pages);
    bar.set_style(
        ProgressStyle::with_template("{spinner} Crawling {pos}/{len} pages {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// Progress bar for content extraction over a known URL list
pub fn extract_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} Extracting {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
