//! scholar-harvest - Google Scholar harvester
//!
//! Asks for a query, scrapes the matching Google Scholar results, pulls
//! metadata from each result page and optionally downloads linked PDFs.
//!
//! ## Usage
//!
//! ### Interactive session
//! ```bash
//! scholar-harvest
//! ```
//!
//! ### Pre-answered session
//! ```bash
//! scholar-harvest --query "graph theory" --max-results 10 --no-download
//! ```
//!
//! ### Past runs
//! ```bash
//! scholar-harvest history --query "graph theory" --limit 20
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use scholar_harvest::config::{
    BrowserOptions, HarvestConfig, Session, DEFAULT_DB_PATH, DEFAULT_PDF_DIR, DEFAULT_SCHOLAR_URL,
};
use scholar_harvest::db::UrlStore;
use scholar_harvest::gscholar::HeadlessBrowser;
use scholar_harvest::http::HttpClient;
use scholar_harvest::intake::Operator;
use scholar_harvest::pipeline::{self, IntakeAnswers};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Google Scholar harvester
#[derive(Parser)]
#[command(name = "scholar-harvest")]
#[command(version, about, long_about = None, args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// SQLite database file
    #[arg(long, global = true, env = "SCHOLAR_HARVEST_DB", default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    #[command(flatten)]
    run: RunArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct RunArgs {
    /// Search query (prompted for when omitted)
    #[arg(short, long)]
    query: Option<String>,

    /// Number of results to scrape (prompted for when omitted)
    #[arg(short = 'n', long)]
    max_results: Option<usize>,

    /// Download PDFs without asking
    #[arg(long, conflicts_with = "no_download")]
    download: bool,

    /// Skip PDF downloads without asking
    #[arg(long)]
    no_download: bool,

    /// Directory for downloaded PDFs
    #[arg(long, env = "SCHOLAR_HARVEST_PDF_DIR", default_value = DEFAULT_PDF_DIR)]
    pdf_dir: PathBuf,

    /// Directory for the session log
    #[arg(long, env = "SCHOLAR_HARVEST_LOG_DIR", default_value = ".")]
    log_dir: PathBuf,

    /// Scholar base URL (mirror sites)
    #[arg(long, env = "SCHOLAR_HARVEST_URL", default_value = DEFAULT_SCHOLAR_URL)]
    scholar_url: String,

    /// Chrome/Chromium executable
    #[arg(long, env = "CHROME_PATH")]
    chrome: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    /// Metadata page fetch timeout in seconds
    #[arg(long, default_value = "10")]
    fetch_timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// List previously discovered URLs
    History {
        /// Only rows for this exact query
        #[arg(short, long)]
        query: Option<String>,

        /// Maximum rows to show
        #[arg(short, long, default_value = "50")]
        limit: usize,

        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for the operator console
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Some(Commands::History { query, limit, json }) => {
            show_history(cli.db, query.as_deref(), limit, json)
        }
        None => run_session(cli.db, cli.run).await,
    };

    if let Err(ref e) = result {
        error!(error = %e, "Session aborted");
    }
    result
}

// ============================================================================
// Harvest Session
// ============================================================================

async fn run_session(db_path: PathBuf, args: RunArgs) -> Result<()> {
    let fetch_timeout = Duration::from_secs(args.fetch_timeout);
    let config = HarvestConfig {
        db_path,
        pdf_dir: args.pdf_dir,
        log_dir: args.log_dir,
        scholar_url: args.scholar_url,
        fetch_timeout,
        browser: BrowserOptions {
            chrome_executable: args.chrome,
            headful: args.headful,
            ..Default::default()
        },
    };

    let answers = IntakeAnswers {
        query: args.query,
        max_results: args.max_results,
        download: match (args.download, args.no_download) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        },
    };

    let session = Session::start(config);
    info!(
        started_at = %session.started_at,
        db = ?session.config.db_path,
        "Starting session"
    );

    let renderer = HeadlessBrowser::new(session.config.browser.clone());
    let fetcher = HttpClient::new(fetch_timeout).context("Failed to create HTTP client")?;
    let mut operator = Operator::stdio();

    let summary = pipeline::run(&session, answers, renderer, &fetcher, &mut operator)
        .await
        .context("Harvest session failed")?;

    let failed = summary.records.iter().filter(|r| r.error().is_some()).count();
    info!(
        query = %summary.query,
        urls = summary.urls.len(),
        failed,
        downloads = ?summary.downloads,
        log = ?summary.log_path,
        "Session complete"
    );
    Ok(())
}

// ============================================================================
// History
// ============================================================================

fn show_history(db_path: PathBuf, query: Option<&str>, limit: usize, json: bool) -> Result<()> {
    let store = UrlStore::new(&db_path);
    store.init_schema().context("Failed to open database")?;
    let rows = store.recent(query, limit).context("Failed to read history")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No URLs recorded in {:?}", store.database_path());
        return Ok(());
    }

    for row in rows {
        println!("{}  [{}]  {}", row.scraped_on, row.search_query, row.url);
    }
    Ok(())
}
