//! Bibliographic metadata extraction from arbitrary result pages.
//!
//! Extraction is best-effort: each URL is fetched once and a handful of
//! structural heuristics pull out title, author, date and a candidate PDF
//! link. A failure on one URL becomes a [`Outcome::Failed`] record and never
//! stops the pass.

use crate::error::{HarvestError, Result};
use crate::http::Fetcher;
use scraper::{Html, Selector};
use serde::Serialize;
use tracing::{info, warn};

pub const NO_TITLE: &str = "No Title";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const UNKNOWN_DATE: &str = "Unknown Date";

/// Fields extracted from one page
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub author: String,
    pub date: String,
    /// First href containing ".pdf", verbatim
    pub pdf_link: Option<String>,
}

/// Extraction result for one URL
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Extracted(PageMetadata),
    Failed { error: String },
}

/// Metadata record for one discovered URL
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetadataRecord {
    pub url: String,
    pub outcome: Outcome,
}

impl MetadataRecord {
    pub fn metadata(&self) -> Option<&PageMetadata> {
        match &self.outcome {
            Outcome::Extracted(meta) => Some(meta),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Extracted(_) => None,
            Outcome::Failed { error } => Some(error),
        }
    }

    pub fn pdf_link(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.pdf_link.as_deref())
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces
fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| HarvestError::Parse(e.to_string()))
}

/// Parse page HTML into metadata, applying sentinels for missing fields.
pub fn parse_metadata(html: &str) -> Result<PageMetadata> {
    let document = Html::parse_document(html);

    let title_selector = selector("title")?;
    let author_selector = selector(r#"meta[name="author"]"#)?;
    let date_selector = selector(r#"meta[name="date"]"#)?;
    let anchor_selector = selector("a[href]")?;

    let title = document
        .select(&title_selector)
        .next()
        .map(|t| squash_whitespace(&t.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let meta_content = |sel: &Selector, fallback: &str| {
        document
            .select(sel)
            .next()
            .and_then(|m| m.value().attr("content"))
            .map(squash_whitespace)
            .unwrap_or_else(|| fallback.to_string())
    };
    let author = meta_content(&author_selector, UNKNOWN_AUTHOR);
    let date = meta_content(&date_selector, UNKNOWN_DATE);

    // Substring match, so "/file.pdf.html" or "?format=.pdfx" qualify too
    let pdf_link = document
        .select(&anchor_selector)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.contains(".pdf"))
        .map(str::to_string);

    Ok(PageMetadata {
        title,
        author,
        date,
        pdf_link,
    })
}

async fn extract_one<F: Fetcher + ?Sized>(fetcher: &F, url: &str) -> Result<PageMetadata> {
    let html = fetcher.fetch_text(url).await?;
    parse_metadata(&html)
}

/// Fetch and analyze each URL in order, one record per URL.
///
/// `on_failure` is called with the URL and error message of every page that
/// could not be processed, before moving on.
pub async fn analyze_urls<F, C>(fetcher: &F, urls: &[String], mut on_failure: C) -> Vec<MetadataRecord>
where
    F: Fetcher + ?Sized,
    C: FnMut(&str, &str),
{
    info!(count = urls.len(), "Analyzing URLs");
    let mut records = Vec::with_capacity(urls.len());

    for url in urls {
        info!(url = %url, "Processing");
        let outcome = match extract_one(fetcher, url).await {
            Ok(meta) => Outcome::Extracted(meta),
            Err(e) => {
                let error = e.to_string();
                warn!(url = %url, error = %error, "Failed to extract metadata");
                on_failure(url, &error);
                Outcome::Failed { error }
            }
        };
        records.push(MetadataRecord {
            url: url.clone(),
            outcome,
        });
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::Path;

    struct StubFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| HarvestError::Download(format!("connection refused: {}", url)))
        }

        async fn download(&self, _url: &str, _dest: &Path) -> Result<u64> {
            unreachable!("extraction never downloads")
        }
    }

    #[test]
    fn test_sentinels_for_bare_document() -> Result<()> {
        let meta = parse_metadata("<html><body><p>nothing here</p></body></html>")?;
        assert_eq!(meta.title, "No Title");
        assert_eq!(meta.author, "Unknown Author");
        assert_eq!(meta.date, "Unknown Date");
        assert_eq!(meta.pdf_link, None);
        Ok(())
    }

    #[test]
    fn test_extracts_fields() -> Result<()> {
        let html = r#"<html><head>
            <title> On Graph Colouring </title>
            <meta name="author" content="A. Turing">
            <meta name="date" content="1950-10-01">
            </head><body><a href="/abs">abs</a></body></html>"#;
        let meta = parse_metadata(html)?;
        assert_eq!(meta.title, "On Graph Colouring");
        assert_eq!(meta.author, "A. Turing");
        assert_eq!(meta.date, "1950-10-01");
        assert_eq!(meta.pdf_link, None);
        Ok(())
    }

    #[test]
    fn test_first_pdf_link_wins() -> Result<()> {
        let html = r#"<body><a href="/x">x</a><a href="/paper.pdf">p</a><a href="/y.pdf">y</a></body>"#;
        let meta = parse_metadata(html)?;
        assert_eq!(meta.pdf_link.as_deref(), Some("/paper.pdf"));
        Ok(())
    }

    #[test]
    fn test_pdf_heuristic_is_substring_match() -> Result<()> {
        let html = r#"<body><a href="/view/paper.pdf.html">v</a><a href="/real.pdf">r</a></body>"#;
        let meta = parse_metadata(html)?;
        assert_eq!(meta.pdf_link.as_deref(), Some("/view/paper.pdf.html"));
        Ok(())
    }

    #[test]
    fn test_meta_without_content_uses_sentinel() -> Result<()> {
        let html = r#"<head><meta name="author"><meta name="citation_date" content="2001"></head>"#;
        let meta = parse_metadata(html)?;
        assert_eq!(meta.author, UNKNOWN_AUTHOR);
        assert_eq!(meta.date, UNKNOWN_DATE);
        Ok(())
    }

    #[test]
    fn test_multiline_fields_are_flattened() -> Result<()> {
        let html = "<title>Graph Colouring\n  | Journal of Graphs</title>\
                    <meta name=\"author\" content=\"A. Turing\nC. Shannon\">";
        let meta = parse_metadata(html)?;
        assert_eq!(meta.title, "Graph Colouring | Journal of Graphs");
        assert_eq!(meta.author, "A. Turing C. Shannon");
        Ok(())
    }

    #[tokio::test]
    async fn test_one_record_per_url_in_order() {
        let mut pages = HashMap::new();
        pages.insert(
            "https://ok.example/1".to_string(),
            "<title>One</title>".to_string(),
        );
        pages.insert(
            "https://ok.example/3".to_string(),
            r#"<title>Three</title><a href="three.pdf">pdf</a>"#.to_string(),
        );
        let fetcher = StubFetcher { pages };
        let urls = vec![
            "https://ok.example/1".to_string(),
            "https://down.example/2".to_string(),
            "https://ok.example/3".to_string(),
        ];

        let mut failures = Vec::new();
        let records = analyze_urls(&fetcher, &urls, |url, _| failures.push(url.to_string())).await;

        assert_eq!(records.len(), 3);
        let order: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(order, urls.iter().map(String::as_str).collect::<Vec<_>>());

        assert_eq!(records[0].metadata().map(|m| m.title.as_str()), Some("One"));
        assert!(records[1].error().is_some_and(|e| e.contains("connection refused")));
        assert!(records[1].metadata().is_none());
        assert_eq!(records[2].pdf_link(), Some("three.pdf"));
        assert_eq!(failures, vec!["https://down.example/2".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let fetcher = StubFetcher {
            pages: HashMap::new(),
        };
        let records = analyze_urls(&fetcher, &[], |_, _| {}).await;
        assert!(records.is_empty());
    }
}
