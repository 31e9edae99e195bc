//! End-to-end harvesting session.
//!
//! intake → discover → persist → extract → download (if confirmed) → report,
//! strictly in that order and once per session.

use crate::config::Session;
use crate::db::UrlStore;
use crate::download::{download_pdfs, DownloadEvent, DownloadSummary};
use crate::error::Result;
use crate::gscholar::{Discoverer, PageRenderer};
use crate::http::Fetcher;
use crate::intake::Operator;
use crate::metadata::{analyze_urls, MetadataRecord};
use crate::report::SessionReporter;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::info;

/// Answers supplied up front (e.g. CLI flags). `None` means ask the operator.
#[derive(Debug, Clone, Default)]
pub struct IntakeAnswers {
    pub query: Option<String>,
    pub max_results: Option<usize>,
    pub download: Option<bool>,
}

/// What a finished session produced
#[derive(Debug)]
pub struct SessionSummary {
    pub query: String,
    pub urls: Vec<String>,
    pub records: Vec<MetadataRecord>,
    /// `None` when the operator declined downloads
    pub downloads: Option<DownloadSummary>,
    pub log_path: PathBuf,
}

/// Run one session.
///
/// # Errors
///
/// Intake, discovery, database and log-writing failures abort the session.
/// Per-URL extraction and per-PDF download failures do not.
pub async fn run<R, F, I, O>(
    session: &Session,
    answers: IntakeAnswers,
    renderer: R,
    fetcher: &F,
    operator: &mut Operator<I, O>,
) -> Result<SessionSummary>
where
    R: PageRenderer,
    F: Fetcher + ?Sized,
    I: BufRead,
    O: Write,
{
    let config = &session.config;
    let store = UrlStore::new(&config.db_path);
    store.init_schema()?;

    let query = match answers.query {
        Some(q) => q,
        None => operator.read_query()?,
    };
    let max_results = match answers.max_results {
        Some(n) => n,
        None => operator.read_max_results()?,
    };

    operator.say("Scraping Google Scholar...");
    let discoverer = Discoverer::new(renderer, config.scholar_base());
    let urls = discoverer.discover(&query, max_results).await?;
    operator.say(format!("Found {} URLs.", urls.len()));

    store.insert_urls(&query, &urls)?;

    operator.say("Analyzing URLs...");
    let records = analyze_urls(fetcher, &urls, |url, error| {
        operator.say(format!("Error processing {}: {}", url, error));
    })
    .await;

    let confirmed = match answers.download {
        Some(choice) => choice,
        None => operator.confirm_download()?,
    };
    let downloads = if confirmed {
        let summary = download_pdfs(fetcher, &records, &config.pdf_dir, |event| match event {
            DownloadEvent::Saved { path } => operator.say(format!("Downloaded: {}", path.display())),
            DownloadEvent::Failed { link, error } => {
                operator.say(format!("Failed to download {}: {}", link, error))
            }
        })
        .await?;
        Some(summary)
    } else {
        info!("PDF download skipped");
        None
    };

    let reporter = SessionReporter::new(session.log_path());
    let log_path = reporter.write(&records)?.to_path_buf();
    operator.say(format!("Log saved to {}", log_path.display()));

    Ok(SessionSummary {
        query,
        urls,
        records,
        downloads,
        log_path,
    })
}
