//! # scholar-harvest
//!
//! Google Scholar harvester: discover result links for a query, extract
//! bibliographic metadata from each result page, optionally download PDFs,
//! and record the session to SQLite and a plain-text log.
//!
//! ## Modules
//!
//! - [`intake`] - Operator prompts
//! - [`gscholar`] - Result discovery through a headless browser
//! - [`db`] - SQLite store of discovered URLs
//! - [`metadata`] - Title/author/date/PDF link extraction
//! - [`download`] - PDF downloads
//! - [`report`] - Session log
//! - [`pipeline`] - The whole session, end to end
//! - [`config`] - Paths, endpoints and timeouts
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scholar_harvest::{config, gscholar, http, intake, pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let session = config::Session::start(config::HarvestConfig::default());
//!     let renderer = gscholar::HeadlessBrowser::new(session.config.browser.clone());
//!     let fetcher = http::HttpClient::new(session.config.fetch_timeout)?;
//!     let mut operator = intake::Operator::stdio();
//!     let summary = pipeline::run(&session, Default::default(), renderer, &fetcher, &mut operator).await?;
//!     println!("Processed {} URLs", summary.records.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod download;
pub mod error;
pub mod gscholar;
pub mod http;
pub mod intake;
pub mod metadata;
pub mod pipeline;
pub mod report;

pub use error::{HarvestError, Result};
