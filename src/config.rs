//! Run configuration for sitedown
//!
//! All settings come from the CLI surface; defaults live here so the CLI
//! declarations and tests share one source of truth.

use crate::error::{Error, Result};

/// Settings for a single extraction run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Seconds to wait between requests
    pub delay: f64,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Cap on total pages processed (applied after discovery)
    pub limit: Option<usize>,

    /// Maximum BFS depth for fallback crawling
    pub crawl_depth: u32,

    /// Maximum pages visited during fallback crawling
    pub max_crawl_pages: u32,

    /// Consolidate output into one document
    pub single_file: bool,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            delay: default_delay(),
            timeout_secs: default_timeout(),
            limit: None,
            crawl_depth: default_crawl_depth(),
            max_crawl_pages: default_max_crawl_pages(),
            single_file: false,
            user_agent: default_user_agent(),
        }
    }
}

impl RunConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.delay < 0.0 {
            return Err(Error::Config("delay must not be negative".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout must be positive".to_string()));
        }

        if self.limit == Some(0) {
            return Err(Error::Config("limit must be positive when set".to_string()));
        }

        if self.max_crawl_pages == 0 {
            return Err(Error::Config(
                "max-crawl-pages must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Default delay between requests in seconds
pub fn default_delay() -> f64 {
    0.5
}

/// Default per-request timeout in seconds
pub fn default_timeout() -> u64 {
    10
}

/// Default maximum crawl depth
pub fn default_crawl_depth() -> u32 {
    3
}

/// Default maximum pages during fallback crawling
pub fn default_max_crawl_pages() -> u32 {
    500
}

/// Default user agent
pub fn default_user_agent() -> String {
    format!(
        "sitedown/{} (Website Markdown Extractor)",
        env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert_eq!(config.delay, 0.5);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.crawl_depth, 3);
        assert_eq!(config.max_crawl_pages, 500);
        assert!(config.limit.is_none());
        assert!(!config.single_file);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = RunConfig::default();

        config.delay = -1.0;
        assert!(config.validate().is_err());

        config.delay = 0.0;
        assert!(config.validate().is_ok());

        config.timeout_secs = 0;
        assert!(config.validate().is_err());

        config.timeout_secs = 10;
        config.limit = Some(0);
        assert!(config.validate().is_err());
    }
}
