//! Output writing: per-page directory trees, single-file documents, the run
//! summary, and the saved sitemap.

use crate::discover::Provenance;
use crate::error::{Error, Result};
use crate::extract::PageContent;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy)]
pub struct OutputStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl OutputStats {
    pub fn from_pages(pages: &[PageContent]) -> Self {
        let successful = pages.iter().filter(|p| p.is_success()).count();
        let failed = pages.iter().filter(|p| p.error.is_some()).count();
        Self {
            total: pages.len(),
            successful,
            failed,
        }
    }

    pub fn success_rate(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.successful as f64 / self.total as f64 * 100.0)
        }
    }
}

/// Derive a default output name from the site's domain.
///
/// Drops `www.`, common TLD labels, and generic subdomain labels, joining
/// what remains with underscores: `https://docs.example.com` becomes
/// `example`.
pub fn default_output_name(url: &Url, single_file: bool) -> String {
    const COMMON_TLDS: &[&str] = &[
        "com", "org", "net", "io", "dev", "app", "co", "edu", "gov", "mil",
    ];
    const GENERIC_LABELS: &[&str] = &["api", "docs", "www"];

    let domain = url
        .host_str()
        .unwrap_or("website")
        .trim_start_matches("www.");

    let parts: Vec<&str> = domain
        .split('.')
        .filter(|part| !COMMON_TLDS.contains(part) && !GENERIC_LABELS.contains(part))
        .collect();

    let name = if !parts.is_empty() {
        parts.join("_")
    } else {
        domain.split('.').next().unwrap_or("website").to_string()
    };

    if single_file {
        format!("{}.md", name)
    } else {
        name
    }
}

/// Map a page URL to a relative file path under the pages directory.
///
/// The home page becomes `index.md`; `.html`/`.htm` pages keep their stem;
/// extension-less trailing segments become `<segment>.md`; anything else is
/// treated as a directory and gets an `index.md` inside it.
pub fn relative_page_path(url: &Url) -> PathBuf {
    let path = url.path().trim_matches('/');

    if path.is_empty() {
        return PathBuf::from("index.md");
    }

    let parts: Vec<&str> = path.split('/').collect();
    let last = parts[parts.len() - 1];

    let (dirs, file_name) = if last.ends_with(".html") || last.ends_with(".htm") {
        let stem = last.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(last);
        (&parts[..parts.len() - 1], format!("{}.md", stem))
    } else if !last.contains('.') {
        (&parts[..parts.len() - 1], format!("{}.md", last))
    } else {
        (&parts[..], "index.md".to_string())
    };

    let mut file_path = PathBuf::new();
    for dir in dirs {
        file_path.push(dir);
    }
    file_path.push(file_name);
    file_path
}

/// Write one Markdown page with YAML frontmatter
fn render_page(page: &PageContent) -> String {
    let title = page.title.as_deref().unwrap_or("Untitled");
    let mut out = String::new();

    out.push_str("---\n");
    out.push_str(&format!("title: {}\n", title));
    out.push_str(&format!("url: {}\n", page.url));
    out.push_str(&format!("extracted: {}\n", chrono::Local::now().to_rfc3339()));
    out.push_str("---\n\n");
    out.push_str(&format!("# {}\n\n", title));

    if let Some(content) = &page.content {
        out.push_str(content);
    }
    out.push('\n');
    out
}

/// Write each page to its own file under `<out_dir>/pages/`, mirroring the
/// site's URL structure, plus a `README.md` summary.
pub fn write_tree(
    out_dir: &Path,
    pages: &[PageContent],
    source_url: &Url,
    provenance: Provenance,
) -> Result<OutputStats> {
    let pages_dir = out_dir.join("pages");
    fs::create_dir_all(&pages_dir)?;

    let mut saved = 0usize;

    for page in pages.iter().filter(|p| p.is_success()) {
        let relative = relative_page_path(&page.url);
        let mut file_path = pages_dir.join(&relative);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Never overwrite an earlier page that mapped to the same file
        let mut counter = 1;
        while file_path.exists() {
            let stem = relative
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("page");
            file_path = pages_dir
                .join(relative.parent().unwrap_or(Path::new("")))
                .join(format!("{}_{}.md", stem, counter));
            counter += 1;
        }

        fs::write(&file_path, render_page(page))?;
        debug!("Saved: {}", file_path.display());
        saved += 1;
    }

    let stats = OutputStats::from_pages(pages);
    let summary = render_summary(pages, &stats, source_url, provenance);
    fs::write(out_dir.join("README.md"), summary)?;

    info!("Saved {} files to {}", saved, pages_dir.display());
    Ok(stats)
}

/// Write all pages into one consolidated Markdown document with a table of
/// contents.
pub fn write_single_file(path: &Path, pages: &[PageContent]) -> Result<OutputStats> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut out = String::new();
    out.push_str("# Extracted Website Content\n\n");
    out.push_str(&format!(
        "Generated on: {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("Total pages: {}\n\n", pages.len()));

    out.push_str("## Table of Contents\n\n");
    for (i, page) in pages.iter().enumerate() {
        if let Some(title) = &page.title {
            out.push_str(&format!("{}. [{}](#page-{})\n", i + 1, title, i + 1));
        }
    }
    out.push_str("\n---\n\n");

    for (i, page) in pages.iter().enumerate() {
        let n = i + 1;
        out.push_str(&format!("<a id=\"page-{}\"></a>\n\n", n));
        out.push_str(&format!(
            "## {}. {}\n\n",
            n,
            page.title.as_deref().unwrap_or(&format!("Page {}", n))
        ));
        out.push_str(&format!("**URL:** {}\n\n", page.url));

        if let Some(error) = &page.error {
            out.push_str(&format!("**Error:** {}\n\n", error));
        } else if let Some(content) = &page.content {
            out.push_str("### Content\n\n");
            out.push_str(content);
            out.push_str("\n\n");
        } else {
            out.push_str("*No content extracted*\n\n");
        }

        out.push_str("\n---\n\n");
    }

    fs::write(path, out)?;
    info!("Saved consolidated document to {}", path.display());
    Ok(OutputStats::from_pages(pages))
}

/// Save the sitemap document next to the output.
///
/// Directory mode puts it at `<out>/sitemap.xml`; single-file mode writes
/// `<base>_sitemap.xml` beside the Markdown file.
pub fn save_sitemap(output_path: &Path, single_file: bool, sitemap_xml: &str) -> Result<PathBuf> {
    let target = if single_file {
        let stem = output_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::Output(format!("bad output path: {}", output_path.display())))?;
        output_path
            .parent()
            .unwrap_or(Path::new("."))
            .join(format!("{}_sitemap.xml", stem))
    } else {
        fs::create_dir_all(output_path)?;
        output_path.join("sitemap.xml")
    };

    fs::write(&target, sitemap_xml)?;
    info!("Saved sitemap to {}", target.display());
    Ok(target)
}

/// Render the `README.md` summary for directory-mode output
fn render_summary(
    pages: &[PageContent],
    stats: &OutputStats,
    source_url: &Url,
    provenance: Provenance,
) -> String {
    let mut out = String::new();

    out.push_str("# Website Content Extraction Summary\n\n");
    out.push_str(&format!("**Source Website:** {}\n", source_url));
    out.push_str(&format!(
        "**Extraction Date:** {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("**Sitemap Source:** {}\n\n", provenance.label()));

    out.push_str("## Statistics\n\n");
    out.push_str(&format!("- **Total Pages:** {}\n", stats.total));
    out.push_str(&format!("- **Successfully Extracted:** {}\n", stats.successful));
    out.push_str(&format!("- **Failed:** {}\n", stats.failed));
    match stats.success_rate() {
        Some(rate) => out.push_str(&format!("- **Success Rate:** {:.1}%\n\n", rate)),
        None => out.push_str("- **Success Rate:** N/A\n\n"),
    }

    if stats.failed > 0 {
        out.push_str("## Failed Extractions\n\n");
        for page in pages.iter().filter(|p| p.error.is_some()) {
            out.push_str(&format!(
                "- {}: {}\n",
                page.url,
                page.error.as_deref().unwrap_or("unknown error")
            ));
        }
        out.push('\n');
    }

    out.push_str("## File Structure\n\n```\n.\n");
    out.push_str("├── sitemap.xml          # Website sitemap\n");
    out.push_str("├── README.md            # This file\n");
    out.push_str("└── pages/               # Extracted pages\n");

    let mut dirs: BTreeSet<String> = BTreeSet::new();
    for page in pages.iter().filter(|p| p.is_success()) {
        if let Some(parent) = relative_page_path(&page.url).parent() {
            if !parent.as_os_str().is_empty() {
                dirs.insert(parent.display().to_string());
            }
        }
    }
    for dir in dirs.iter().take(10) {
        out.push_str(&format!("    ├── {}/\n", dir));
    }
    if dirs.len() > 10 {
        out.push_str("    └── ... (and more directories)\n");
    }
    out.push_str("```\n\n");

    out.push_str("## Notes\n\n");
    out.push_str("- Each markdown file includes frontmatter with title, URL, and extraction date\n");
    out.push_str("- The directory structure mirrors the website's URL structure\n");
    out.push_str("- Content is extracted from `<article>` tags or main content areas\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn page(url: &str, title: Option<&str>, content: Option<&str>, error: Option<&str>) -> PageContent {
        PageContent {
            url: Url::parse(url).unwrap(),
            title: title.map(String::from),
            content: content.map(String::from),
            error: error.map(String::from),
        }
    }

    #[test]
    fn test_relative_page_path() {
        let p = |s: &str| relative_page_path(&Url::parse(s).unwrap());
        assert_eq!(p("https://ex.test/"), PathBuf::from("index.md"));
        assert_eq!(p("https://ex.test/about"), PathBuf::from("about.md"));
        assert_eq!(p("https://ex.test/docs/intro"), PathBuf::from("docs/intro.md"));
        assert_eq!(p("https://ex.test/page.html"), PathBuf::from("page.md"));
        assert_eq!(p("https://ex.test/old/page.htm"), PathBuf::from("old/page.md"));
        assert_eq!(p("https://ex.test/v1.2/spec"), PathBuf::from("v1.2/spec.md"));
    }

    #[test]
    fn test_default_output_name() {
        let name = |s: &str| default_output_name(&Url::parse(s).unwrap(), false);
        assert_eq!(name("https://www.example.com"), "example");
        assert_eq!(name("https://docs.rust-lang.org"), "rust-lang");
        assert_eq!(
            default_output_name(&Url::parse("https://example.com").unwrap(), true),
            "example.md"
        );
    }

    #[test]
    fn test_write_tree() {
        let tmp = TempDir::new().unwrap();
        let pages = vec![
            page("https://ex.test/", Some("Home"), Some("welcome"), None),
            page("https://ex.test/docs/intro", Some("Intro"), Some("intro text"), None),
            page("https://ex.test/broken", None, None, Some("HTTP 500")),
        ];
        let source = Url::parse("https://ex.test/").unwrap();

        let stats = write_tree(tmp.path(), &pages, &source, Provenance::Sitemap).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.successful, 2);
        assert_eq!(stats.failed, 1);

        let index = fs::read_to_string(tmp.path().join("pages/index.md")).unwrap();
        assert!(index.starts_with("---\ntitle: Home\n"));
        assert!(index.contains("welcome"));

        assert!(tmp.path().join("pages/docs/intro.md").exists());

        let readme = fs::read_to_string(tmp.path().join("README.md")).unwrap();
        assert!(readme.contains("**Sitemap Source:** found"));
        assert!(readme.contains("https://ex.test/broken: HTTP 500"));
    }

    #[test]
    fn test_write_tree_collision_suffix() {
        let tmp = TempDir::new().unwrap();
        // Both normalize targets map to about.md
        let pages = vec![
            page("https://ex.test/about", Some("A"), Some("first"), None),
            page("https://ex.test/about.html", Some("B"), Some("second"), None),
        ];
        let source = Url::parse("https://ex.test/").unwrap();

        write_tree(tmp.path(), &pages, &source, Provenance::Manual).unwrap();
        assert!(tmp.path().join("pages/about.md").exists());
        assert!(tmp.path().join("pages/about_1.md").exists());
    }

    #[test]
    fn test_write_single_file() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("site.md");
        let pages = vec![
            page("https://ex.test/", Some("Home"), Some("welcome"), None),
            page("https://ex.test/broken", None, None, Some("timeout")),
        ];

        let stats = write_single_file(&target, &pages).unwrap();
        assert_eq!(stats.successful, 1);

        let doc = fs::read_to_string(&target).unwrap();
        assert!(doc.contains("## Table of Contents"));
        assert!(doc.contains("[Home](#page-1)"));
        assert!(doc.contains("**Error:** timeout"));
    }

    #[test]
    fn test_save_sitemap_modes() {
        let tmp = TempDir::new().unwrap();

        let dir_out = tmp.path().join("site");
        let saved = save_sitemap(&dir_out, false, "<urlset/>").unwrap();
        assert_eq!(saved, dir_out.join("sitemap.xml"));
        assert!(saved.exists());

        let file_out = tmp.path().join("site.md");
        let saved = save_sitemap(&file_out, true, "<urlset/>").unwrap();
        assert_eq!(saved, tmp.path().join("site_sitemap.xml"));
        assert!(saved.exists());
    }
}
