//! Google Scholar result discovery.
//!
//! The results page is rendered in a headless Chromium session and the link
//! of every result title is read back in document order. Rendering sits
//! behind [`PageRenderer`] so the extraction logic can be driven from fixed
//! HTML.

use crate::config::BrowserOptions;
use crate::error::{HarvestError, Result};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

/// Selector for result-title anchors on a Scholar results page
const RESULT_LINK_SELECTOR: &str = "h3.gs_rt a";

/// Renders a URL and returns the resulting document HTML
#[async_trait]
pub trait PageRenderer {
    async fn render(&self, url: &str) -> Result<String>;
}

/// Headless Chromium renderer. Each call owns a fresh browser that is shut
/// down before the call returns.
pub struct HeadlessBrowser {
    options: BrowserOptions,
}

impl HeadlessBrowser {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder().request_timeout(self.options.timeout);

        if let Some(ref chrome) = self.options.chrome_executable {
            builder = builder.chrome_executable(chrome);
        }
        if self.options.headful {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");

        builder
            .build()
            .map_err(|e| HarvestError::Browser(format!("Failed to build browser config: {}", e)))
    }
}

#[async_trait]
impl PageRenderer for HeadlessBrowser {
    async fn render(&self, url: &str) -> Result<String> {
        let (mut browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| HarvestError::Browser(format!("Failed to launch browser: {}", e)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let result = tokio::time::timeout(self.options.timeout, load_page(&browser, url))
            .await
            .unwrap_or_else(|_| {
                Err(HarvestError::Browser(format!(
                    "Timed out after {}s loading {}",
                    self.options.timeout.as_secs(),
                    url
                )))
            });

        // Tear the session down regardless of how loading went
        if let Err(e) = browser.close().await {
            warn!(error = %e, "Failed to close browser");
        }
        let _ = browser.wait().await;
        handler_task.abort();

        result
    }
}

async fn load_page(browser: &Browser, url: &str) -> Result<String> {
    debug!(url, "Opening page");
    let page = browser
        .new_page(url)
        .await
        .map_err(|e| HarvestError::Browser(format!("Navigation failed for {}: {}", url, e)))?;
    page.wait_for_navigation()
        .await
        .map_err(|e| HarvestError::Browser(format!("Navigation failed for {}: {}", url, e)))?;
    page.content()
        .await
        .map_err(|e| HarvestError::Browser(format!("Failed to read page content: {}", e)))
}

/// Build the Scholar search URL. Spaces become `+`; nothing else is escaped.
pub fn build_search_url(base_url: &str, query: &str) -> String {
    format!(
        "{}/scholar?q={}",
        base_url.trim_end_matches('/'),
        query.replace(' ', "+")
    )
}

/// Extract result links from a rendered results page, in document order.
///
/// Relative hrefs are resolved against `page_url`, matching what a browser
/// reports for `anchor.href`. At most `max_results` links are returned.
pub fn extract_result_links(html: &str, page_url: &str, max_results: usize) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let link_selector =
        Selector::parse(RESULT_LINK_SELECTOR).map_err(|e| HarvestError::Parse(e.to_string()))?;
    let base = Url::parse(page_url).ok();

    let links = document
        .select(&link_selector)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| match base.as_ref().and_then(|b| b.join(href).ok()) {
            Some(resolved) => resolved.to_string(),
            None => href.to_string(),
        })
        .take(max_results)
        .collect();

    Ok(links)
}

fn looks_like_captcha(html: &str) -> bool {
    html.contains("Solving the above CAPTCHA") || html.contains("unusual traffic")
}

/// Discovers result links for a query
pub struct Discoverer<R> {
    renderer: R,
    base_url: String,
}

impl<R: PageRenderer> Discoverer<R> {
    pub fn new(renderer: R, base_url: impl Into<String>) -> Self {
        Self {
            renderer,
            base_url: base_url.into(),
        }
    }

    /// Return the first `min(max_results, available)` result links for `query`.
    ///
    /// # Errors
    ///
    /// Any rendering failure is returned as-is; there is no retry.
    pub async fn discover(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let search_url = build_search_url(&self.base_url, query);
        info!(query, url = %search_url, max_results, "Starting Google Scholar query");

        let html = self.renderer.render(&search_url).await?;
        let links = extract_result_links(&html, &search_url, max_results)?;

        if links.is_empty() && looks_like_captcha(&html) {
            warn!("CAPTCHA detected on results page");
        }

        info!(count = links.len(), "Discovery complete");
        Ok(links)
    }
}
