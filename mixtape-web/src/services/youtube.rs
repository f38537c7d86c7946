//! Video platform search and audio fetch via the yt-dlp executable.
//!
//! The pipelines talk to the two trait seams so they can be exercised with
//! stub providers; `YtDlpClient` is the production implementation, running
//! `yt-dlp` as a subprocess and parsing its NDJSON output.

use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::models::CandidateItem;

/// Raw results requested from the provider per query.
const SEARCH_RAW_RESULTS: usize = 5;

/// Candidates kept per song after filtering.
pub const DEFAULT_MAX_CANDIDATES: usize = 3;

/// Description truncation length.
const DESCRIPTION_LIMIT: usize = 200;

/// Title substrings that mark a result as not-the-song.
const DENYLIST: [&str; 6] = [
    "tutorial",
    "lesson",
    "how to",
    "reaction",
    "review",
    "cover version",
];

/// Errors from the external search/download tool.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to run provider tool: {0}")]
    Io(#[from] std::io::Error),

    #[error("provider tool exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("unparseable provider output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Search seam used by the search pipeline.
pub trait CandidateProvider: Send + Sync {
    /// Query for "artist - title", returning up to `max_results` filtered
    /// candidates. "No results" is an empty Ok, not an error.
    fn search(
        &self,
        artist: &str,
        title: &str,
        max_results: usize,
    ) -> impl Future<Output = Result<Vec<CandidateItem>, ProviderError>> + Send;
}

/// Fetch seam used by the download pipeline.
pub trait AudioFetcher: Send + Sync {
    /// Fetch best-available audio for `url` into `output_template`
    /// (a yt-dlp `%(ext)s` template; the tool picks the real extension).
    fn fetch(
        &self,
        url: &str,
        output_template: &Path,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;
}

/// One entry of `yt-dlp --dump-json` output.
#[derive(Debug, Deserialize)]
struct RawSearchEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    view_count: Option<u64>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    webpage_url: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    upload_date: Option<String>,
}

/// Drop denylisted entries, truncate descriptions, cap at `max_results`.
fn shape_candidates(entries: Vec<RawSearchEntry>, max_results: usize) -> Vec<CandidateItem> {
    let mut results = Vec::new();

    for entry in entries {
        if results.len() >= max_results {
            break;
        }

        let title = entry.title.unwrap_or_default();
        let title_lower = title.to_lowercase();
        if DENYLIST.iter().any(|word| title_lower.contains(word)) {
            continue;
        }

        let description = match entry.description {
            Some(text) if !text.is_empty() => {
                let truncated: String = text.chars().take(DESCRIPTION_LIMIT).collect();
                format!("{truncated}...")
            }
            _ => String::new(),
        };

        results.push(CandidateItem {
            id: entry.id.unwrap_or_default(),
            title,
            uploader: entry.uploader,
            duration: entry.duration.map(|secs| secs.round() as u64),
            view_count: entry.view_count,
            thumbnail: entry.thumbnail,
            webpage_url: entry.webpage_url,
            description,
            upload_date: entry.upload_date,
        });
    }

    results
}

/// Production provider: shells out to yt-dlp.
pub struct YtDlpClient {
    binary: String,
    /// Caps concurrent subprocess invocations against the platform.
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl YtDlpClient {
    pub fn new(binary: impl Into<String>, concurrency: usize) -> Self {
        Self {
            binary: binary.into(),
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            timeout: Duration::from_secs(600),
        }
    }

    async fn run_tool(&self, args: &[&str]) -> Result<Vec<u8>, ProviderError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        debug!(binary = %self.binary, ?args, "Running provider tool");

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.binary)
                .args(args)
                .stdin(Stdio::null())
                .output(),
        )
        .await
        .map_err(|_| ProviderError::Unavailable("provider tool timed out".to_string()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::Failed {
                status: output.status.to_string(),
                stderr: stderr.chars().take(500).collect(),
            });
        }

        Ok(output.stdout)
    }
}

impl CandidateProvider for YtDlpClient {
    async fn search(
        &self,
        artist: &str,
        title: &str,
        max_results: usize,
    ) -> Result<Vec<CandidateItem>, ProviderError> {
        let query = format!("ytsearch{SEARCH_RAW_RESULTS}:{artist} - {title}");
        let stdout = self
            .run_tool(&["--dump-json", "--no-warnings", &query])
            .await?;

        // NDJSON: one entry per line
        let mut entries = Vec::new();
        for line in String::from_utf8_lossy(&stdout).lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawSearchEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(error = %e, "Skipping unparseable search entry"),
            }
        }

        Ok(shape_candidates(entries, max_results))
    }
}

impl AudioFetcher for YtDlpClient {
    async fn fetch(&self, url: &str, output_template: &Path) -> Result<(), ProviderError> {
        let template = output_template.to_string_lossy();
        self.run_tool(&[
            "-f",
            "bestaudio[ext=m4a]/bestaudio/best",
            "-x",
            "--embed-metadata",
            "--no-warnings",
            "-o",
            &template,
            url,
        ])
        .await?;
        Ok(())
    }
}
