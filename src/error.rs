//! Custom error types for sitedown

use thiserror::Error;

/// Main error type for sitedown operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid seed URL: {0}")]
    Setup(String),

    #[error("Sitemap error: {0}")]
    Sitemap(String),

    #[error("Crawl error: {0}")]
    Crawl(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias for sitedown
pub type Result<T> = std::result::Result<T, Error>;
