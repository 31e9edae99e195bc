//! Run configuration.
//!
//! Every path and endpoint the pipeline touches lives here so that a session
//! never reads global state. The binary fills this from CLI flags and
//! environment variables; tests point it at temporary directories.

use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::Duration;

/// Default Google Scholar URL
pub const DEFAULT_SCHOLAR_URL: &str = "https://scholar.google.com";

/// Default SQLite database location, relative to the working directory
pub const DEFAULT_DB_PATH: &str = "../scraped_urls.db";

/// Default directory for downloaded PDFs
pub const DEFAULT_PDF_DIR: &str = "pdfs";

/// Timeout for each metadata page fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Headless browser options for result discovery
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Explicit Chrome/Chromium binary; auto-detected when `None`
    pub chrome_executable: Option<PathBuf>,
    /// Run with a visible window (debugging only)
    pub headful: bool,
    /// Navigation timeout
    pub timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            chrome_executable: None,
            headful: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Configuration for one harvesting session
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// SQLite database file
    pub db_path: PathBuf,
    /// Directory PDFs are written to
    pub pdf_dir: PathBuf,
    /// Directory the session log is written to
    pub log_dir: PathBuf,
    /// Scholar base URL (mirrors allowed)
    pub scholar_url: String,
    /// Per-page timeout for metadata fetches
    pub fetch_timeout: Duration,
    pub browser: BrowserOptions,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            pdf_dir: PathBuf::from(DEFAULT_PDF_DIR),
            log_dir: PathBuf::from("."),
            scholar_url: DEFAULT_SCHOLAR_URL.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            browser: BrowserOptions::default(),
        }
    }
}

impl HarvestConfig {
    /// Scholar base URL without a trailing slash
    pub fn scholar_base(&self) -> &str {
        self.scholar_url.trim_end_matches('/')
    }
}

/// One end-to-end invocation, identified by its start time
#[derive(Debug, Clone)]
pub struct Session {
    pub started_at: DateTime<Local>,
    pub config: HarvestConfig,
}

impl Session {
    /// Start a session now
    pub fn start(config: HarvestConfig) -> Self {
        Self::started_at(config, Local::now())
    }

    /// Start a session with a fixed timestamp
    pub fn started_at(config: HarvestConfig, started_at: DateTime<Local>) -> Self {
        Self { started_at, config }
    }

    /// Log file path for this session: `<log_dir>/session_<YYYYMMDD_HHMMSS>.log`
    pub fn log_path(&self) -> PathBuf {
        self.config.log_dir.join(format!(
            "session_{}.log",
            self.started_at.format("%Y%m%d_%H%M%S")
        ))
    }
}
