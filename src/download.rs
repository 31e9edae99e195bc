//! PDF artifact downloads.

use crate::error::{HarvestError, Result};
use crate::http::Fetcher;
use crate::metadata::MetadataRecord;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;

/// Counts for one download pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: usize,
    pub failed: usize,
}

/// Event reported to the operator for each attempted download
#[derive(Debug)]
pub enum DownloadEvent<'a> {
    Saved { path: &'a Path },
    Failed { link: &'a str, error: &'a str },
}

/// File name for a link: everything after the last `/`.
pub fn file_name_for(link: &str) -> Result<&str> {
    link.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| HarvestError::Parse(format!("no file name in link '{}'", link)))
}

/// Resolve a possibly relative link against the page it was found on.
fn resolve_link(page_url: &str, link: &str) -> Result<String> {
    let base = Url::parse(page_url)
        .map_err(|e| HarvestError::Parse(format!("Invalid page URL '{}': {}", page_url, e)))?;
    base.join(link)
        .map(|u| u.to_string())
        .map_err(|e| HarvestError::Parse(format!("Invalid PDF link '{}': {}", link, e)))
}

async fn download_one<F: Fetcher + ?Sized>(
    fetcher: &F,
    pdf_dir: &Path,
    page_url: &str,
    link: &str,
) -> Result<PathBuf> {
    let dest = pdf_dir.join(file_name_for(link)?);
    let source = resolve_link(page_url, link)?;
    fetcher.download(&source, &dest).await?;
    Ok(dest)
}

/// Download every record's PDF link into `pdf_dir`.
///
/// Existing files with the same name are overwritten. A failed item is
/// reported through `on_event` and skipped.
pub async fn download_pdfs<F, E>(
    fetcher: &F,
    records: &[MetadataRecord],
    pdf_dir: &Path,
    mut on_event: E,
) -> Result<DownloadSummary>
where
    F: Fetcher + ?Sized,
    E: FnMut(DownloadEvent<'_>),
{
    tokio::fs::create_dir_all(pdf_dir).await?;
    let mut summary = DownloadSummary::default();

    for record in records {
        let Some(link) = record.pdf_link() else {
            continue;
        };

        match download_one(fetcher, pdf_dir, &record.url, link).await {
            Ok(path) => {
                info!(link, path = ?path, "Downloaded");
                on_event(DownloadEvent::Saved { path: &path });
                summary.downloaded += 1;
            }
            Err(e) => {
                let error = e.to_string();
                warn!(link, error = %error, "Download failed");
                on_event(DownloadEvent::Failed {
                    link,
                    error: &error,
                });
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Outcome, PageMetadata};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Writes the source URL as the file body
    #[derive(Default)]
    struct RecordingFetcher {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Fetcher for RecordingFetcher {
        async fn fetch_text(&self, _url: &str) -> Result<String> {
            unreachable!("downloads never fetch pages")
        }

        async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
            self.calls.lock().expect("lock poisoned").push(url.to_string());
            if url.contains("broken") {
                return Err(HarvestError::Download("connection reset".to_string()));
            }
            std::fs::write(dest, url)?;
            Ok(url.len() as u64)
        }
    }

    fn record(url: &str, pdf_link: Option<&str>) -> MetadataRecord {
        MetadataRecord {
            url: url.to_string(),
            outcome: Outcome::Extracted(PageMetadata {
                title: "t".to_string(),
                author: "a".to_string(),
                date: "d".to_string(),
                pdf_link: pdf_link.map(str::to_string),
            }),
        }
    }

    #[test]
    fn test_file_name_for() -> Result<()> {
        assert_eq!(file_name_for("https://x.org/a/b/paper.pdf")?, "paper.pdf");
        assert_eq!(file_name_for("paper.pdf")?, "paper.pdf");
        assert_eq!(file_name_for("/files/x.pdf?dl=1")?, "x.pdf?dl=1");
        assert!(file_name_for("https://x.org/pdfs/").is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_downloads_each_link() -> Result<()> {
        let dir = TempDir::new()?;
        let pdf_dir = dir.path().join("pdfs");
        let fetcher = RecordingFetcher::default();
        let records = vec![
            record("https://site.example/abs/1", Some("/files/one.pdf")),
            record("https://site.example/abs/2", None),
            MetadataRecord {
                url: "https://down.example".to_string(),
                outcome: Outcome::Failed {
                    error: "timed out".to_string(),
                },
            },
            record("https://site.example/abs/3", Some("https://cdn.example/two.pdf")),
        ];

        let mut saved = Vec::new();
        let summary = download_pdfs(&fetcher, &records, &pdf_dir, |event| {
            if let DownloadEvent::Saved { path } = event {
                saved.push(path.to_path_buf());
            }
        })
        .await?;

        assert_eq!(summary, DownloadSummary { downloaded: 2, failed: 0 });
        assert_eq!(
            fetcher.calls.lock().expect("lock poisoned").as_slice(),
            [
                "https://site.example/files/one.pdf".to_string(),
                "https://cdn.example/two.pdf".to_string(),
            ]
        );
        assert_eq!(saved, vec![pdf_dir.join("one.pdf"), pdf_dir.join("two.pdf")]);
        assert!(pdf_dir.join("one.pdf").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_remaining() -> Result<()> {
        let dir = TempDir::new()?;
        let fetcher = RecordingFetcher::default();
        let records = vec![
            record("https://a.example/", Some("https://broken.example/x.pdf")),
            record("https://b.example/", Some("https://b.example/dir/")),
            record("https://c.example/", Some("https://c.example/ok.pdf")),
        ];

        let mut failures = 0;
        let summary = download_pdfs(&fetcher, &records, dir.path(), |event| {
            if matches!(event, DownloadEvent::Failed { .. }) {
                failures += 1;
            }
        })
        .await?;

        assert_eq!(summary, DownloadSummary { downloaded: 1, failed: 2 });
        assert_eq!(failures, 2);
        assert!(dir.path().join("ok.pdf").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_same_name_overwrites() -> Result<()> {
        let dir = TempDir::new()?;
        let fetcher = RecordingFetcher::default();
        let records = vec![
            record("https://a.example/", Some("https://a.example/paper.pdf")),
            record("https://b.example/", Some("https://b.example/paper.pdf")),
        ];

        download_pdfs(&fetcher, &records, dir.path(), |_| {}).await?;

        let body = std::fs::read_to_string(dir.path().join("paper.pdf"))?;
        assert_eq!(body, "https://b.example/paper.pdf");
        Ok(())
    }
}
