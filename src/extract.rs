//! Page content extraction and Markdown conversion
//!
//! Fetches a page, picks its main content container, and converts it to
//! Markdown with html2text. Per-page failures are recorded on the result and
//! never abort the run.

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::warn;
use url::Url;

/// Line width passed to html2text; wide enough that prose is effectively
/// unwrapped.
const RENDER_WIDTH: usize = 10_000;

/// Content containers tried when a page has no `<article>`
const CONTENT_SELECTORS: &[&str] = &[
    "main",
    ".content",
    "#content",
    ".post",
    ".entry-content",
    ".page-content",
    ".documentation-content",
    ".docs-content",
];

/// Extraction result for one page
#[derive(Debug, Clone)]
pub struct PageContent {
    pub url: Url,
    pub title: Option<String>,
    pub content: Option<String>,
    pub error: Option<String>,
}

impl PageContent {
    /// Whether this page produced usable content
    pub fn is_success(&self) -> bool {
        self.content.is_some() && self.error.is_none()
    }

    fn failed(url: &Url, error: String) -> Self {
        Self {
            url: url.clone(),
            title: None,
            content: None,
            error: Some(error),
        }
    }
}

/// Per-page content extractor
pub struct Extractor<'a> {
    client: &'a Client,
}

impl<'a> Extractor<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetch a page and extract its content as Markdown.
    ///
    /// Never returns an error: fetch and parse failures are recorded on the
    /// `PageContent` for the run summary.
    pub async fn extract(&self, url: &Url) -> PageContent {
        let response = match self.client.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Error fetching {}: {}", url, e);
                return PageContent::failed(url, e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Error fetching {}: HTTP {}", url, status);
            return PageContent::failed(url, format!("HTTP {}", status));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Error reading {}: {}", url, e);
                return PageContent::failed(url, e.to_string());
            }
        };

        let (title, content) = extract_from_html(&body);

        PageContent {
            url: url.clone(),
            title,
            content: Some(content),
            error: None,
        }
    }
}

/// Extract title and main content Markdown from an HTML document
pub fn extract_from_html(html: &str) -> (Option<String>, String) {
    let document = Html::parse_document(html);

    let title = select_text(&document, "title").or_else(|| select_text(&document, "h1"));

    let container = select_html(&document, "article")
        .or_else(|| {
            CONTENT_SELECTORS
                .iter()
                .find_map(|css| select_html(&document, css))
        })
        .or_else(|| select_html(&document, "body").map(strip_chrome))
        .unwrap_or_else(|| html.to_string());

    let markdown = html2text::from_read(container.as_bytes(), RENDER_WIDTH)
        .unwrap_or_else(|_| container.clone());

    (title, clean_markdown(&markdown))
}

fn select_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    let element = document.select(&selector).next()?;
    let text = element.text().collect::<String>().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn select_html(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next().map(|e| e.html())
}

/// Remove navigation chrome from a body fallback before conversion
fn strip_chrome(body_html: String) -> String {
    let mut stripped = body_html;
    for tag in ["nav", "header", "footer"] {
        let pattern = format!(r"(?is)<{tag}[\s>].*?</{tag}>");
        if let Ok(re) = regex::Regex::new(&pattern) {
            stripped = re.replace_all(&stripped, "").into_owned();
        }
    }
    stripped
}

/// Clean up converted Markdown: drop HTML comments, trim line ends, and
/// collapse runs of blank lines.
pub fn clean_markdown(markdown: &str) -> String {
    let without_comments = regex::Regex::new(r"(?s)<!--.*?-->")
        .map(|re| re.replace_all(markdown, "").into_owned())
        .unwrap_or_else(|_| markdown.to_string());

    let trimmed: Vec<&str> = without_comments.lines().map(str::trim_end).collect();
    let joined = trimmed.join("\n");

    let collapsed = regex::Regex::new(r"\n{3,}")
        .map(|re| re.replace_all(&joined, "\n\n").into_owned())
        .unwrap_or(joined);

    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title_and_article() {
        let html = r#"<html>
        <head><title>Test Page</title></head>
        <body>
            <nav><a href="/">Home</a></nav>
            <article><h1>Heading</h1><p>Body text here.</p></article>
            <footer>footer junk</footer>
        </body></html>"#;

        let (title, content) = extract_from_html(html);
        assert_eq!(title.as_deref(), Some("Test Page"));
        assert!(content.contains("Body text here"));
        assert!(!content.contains("footer junk"));
    }

    #[test]
    fn test_title_falls_back_to_h1() {
        let html = "<html><body><h1>Only Heading</h1><p>text</p></body></html>";
        let (title, _) = extract_from_html(html);
        assert_eq!(title.as_deref(), Some("Only Heading"));
    }

    #[test]
    fn test_content_container_priority() {
        let html = r#"<html><body>
            <main><p>main content</p></main>
            <div class="content"><p>div content</p></div>
        </body></html>"#;

        let (_, content) = extract_from_html(html);
        assert!(content.contains("main content"));
        assert!(!content.contains("div content"));
    }

    #[test]
    fn test_body_fallback_strips_chrome() {
        let html = r#"<html><body>
            <header class="top">site header</header>
            <p>real text</p>
            <nav><ul><li>menu</li></ul></nav>
        </body></html>"#;

        let (_, content) = extract_from_html(html);
        assert!(content.contains("real text"));
        assert!(!content.contains("site header"));
        assert!(!content.contains("menu"));
    }

    #[test]
    fn test_clean_markdown() {
        let raw = "Line one   \n\n\n\nLine two\n<!-- a\ncomment -->\nLine three\n";
        let cleaned = clean_markdown(raw);
        assert_eq!(cleaned, "Line one\n\nLine two\n\nLine three");
    }
}
