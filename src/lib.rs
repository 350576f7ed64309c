//! sitedown: extract a website's content into Markdown documents
//!
//! The discovery engine locates a sitemap (or falls back to a polite
//! breadth-first crawl), producing an ordered URL list that the extraction
//! stage converts page by page into Markdown files.

pub mod config;
pub mod crawl;
pub mod discover;
pub mod error;
pub mod extract;
pub mod output;
pub mod progress;
