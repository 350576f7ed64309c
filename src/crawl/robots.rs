//! robots.txt fetching and rule evaluation
//!
//! The policy for a site is fetched once per run and is immutable afterwards.
//! A missing or unreachable robots.txt is not an error: it yields a
//! permissive policy that allows every path.

use reqwest::Client;
use robotstxt::DefaultMatcher;
use tracing::debug;
use url::Url;

/// Parsed robots.txt rules for one site origin
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    content: String,
    user_agent: String,
}

impl RobotsPolicy {
    /// Fetch `{origin}/robots.txt` and parse it.
    ///
    /// Any fetch failure (network error, timeout, non-success status) is
    /// treated as "allow all".
    pub async fn load(client: &Client, origin: &Url, user_agent: &str) -> Self {
        let robots_url = match origin.join("/robots.txt") {
            Ok(u) => u,
            Err(_) => return Self::allow_all(user_agent),
        };

        debug!("Fetching robots.txt from {}", robots_url);

        match client.get(robots_url.as_str()).send().await {
            Ok(response) if response.status().is_success() => {
                let text = response.text().await.unwrap_or_default();
                Self::parse(&text, user_agent)
            }
            _ => Self::allow_all(user_agent),
        }
    }

    /// Parse robots.txt content
    pub fn parse(content: &str, user_agent: &str) -> Self {
        Self {
            content: content.to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Create a policy that allows everything
    pub fn allow_all(user_agent: &str) -> Self {
        Self {
            content: String::new(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Check if a path is allowed for our user agent.
    ///
    /// Delegates to the robotstxt matcher: longest matching rule wins and
    /// `Allow` wins ties, per the de facto standard.
    pub fn allows(&self, path: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        let allowed = matcher.one_agent_allowed_by_robots(&self.content, &self.user_agent, path);

        if !allowed {
            debug!("robots.txt disallows {} for {}", path, self.user_agent);
        }

        allowed
    }

    /// Get the crawl delay hint if one is declared.
    ///
    /// A delay for our specific user agent takes precedence over the
    /// wildcard group.
    pub fn crawl_delay(&self) -> Option<f64> {
        let ua_lower = self.user_agent.to_lowercase();
        let mut current_agent: Option<String> = None;
        let mut default_delay: Option<f64> = None;
        let mut specific_delay: Option<f64> = None;

        for line in self.content.lines() {
            let line = line.trim();

            if let Some(agent) = strip_directive(line, "User-agent") {
                current_agent = Some(agent.to_lowercase());
            }

            if let Some(delay_str) = strip_directive(line, "Crawl-delay") {
                if let (Some(agent), Ok(delay)) = (&current_agent, delay_str.parse::<f64>()) {
                    if agent == "*" {
                        default_delay = Some(delay);
                    } else if ua_lower.contains(agent.as_str()) {
                        specific_delay = Some(delay);
                    }
                }
            }
        }

        specific_delay.or(default_delay)
    }

    /// Sitemap URLs declared via `Sitemap:` directives, resolved absolute
    /// against the origin.
    pub fn sitemaps(&self, origin: &Url) -> Vec<Url> {
        let mut urls = Vec::new();

        for line in self.content.lines() {
            if let Some(raw) = strip_directive(line.trim(), "Sitemap") {
                let resolved = if raw.starts_with("http://") || raw.starts_with("https://") {
                    Url::parse(&raw)
                } else {
                    origin.join(&raw)
                };
                if let Ok(url) = resolved {
                    urls.push(url);
                }
            }
        }

        urls
    }
}

/// Case-insensitive `Directive: value` extraction
fn strip_directive(line: &str, directive: &str) -> Option<String> {
    let (name, value) = line.split_once(':')?;
    if name.trim().eq_ignore_ascii_case(directive) {
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        let policy = RobotsPolicy::allow_all("sitedown");
        assert!(policy.allows("/any/path"));
        assert_eq!(policy.crawl_delay(), None);
    }

    #[test]
    fn test_basic_rules() {
        let content = r#"
User-agent: *
Disallow: /admin/
Disallow: /private/

User-agent: BadBot
Disallow: /
"#;
        let policy = RobotsPolicy::parse(content, "GoodBot");
        assert!(policy.allows("/public/page"));
        assert!(!policy.allows("/admin/secret"));
        assert!(!policy.allows("/private/b"));

        let banned = RobotsPolicy::parse(content, "BadBot");
        assert!(!banned.allows("/anything"));
    }

    #[test]
    fn test_allow_overrides_disallow() {
        let content = r#"
User-agent: *
Disallow: /docs/
Allow: /docs/public/
"#;
        let policy = RobotsPolicy::parse(content, "sitedown");
        assert!(!policy.allows("/docs/internal"));
        assert!(policy.allows("/docs/public/intro"));
    }

    #[test]
    fn test_crawl_delay() {
        let content = r#"
User-agent: *
Crawl-delay: 2.5

User-agent: specialbot
Crawl-delay: 1.0
"#;
        let specific = RobotsPolicy::parse(content, "SpecialBot");
        assert_eq!(specific.crawl_delay(), Some(1.0));

        let wildcard = RobotsPolicy::parse(content, "RandomBot");
        assert_eq!(wildcard.crawl_delay(), Some(2.5));
    }

    #[test]
    fn test_sitemap_directives() {
        let origin = Url::parse("https://example.com/").unwrap();
        let content = r#"
User-agent: *
Disallow:

Sitemap: https://example.com/sitemap.xml
Sitemap: /extra-sitemap.xml
"#;
        let policy = RobotsPolicy::parse(content, "sitedown");
        let sitemaps = policy.sitemaps(&origin);
        assert_eq!(sitemaps.len(), 2);
        assert_eq!(sitemaps[0].as_str(), "https://example.com/sitemap.xml");
        assert_eq!(sitemaps[1].as_str(), "https://example.com/extra-sitemap.xml");
    }

    #[test]
    fn test_no_sitemap_directives() {
        let origin = Url::parse("https://example.com/").unwrap();
        let policy = RobotsPolicy::parse("User-agent: *\nDisallow: /tmp/", "sitedown");
        assert!(policy.sitemaps(&origin).is_empty());
    }
}
