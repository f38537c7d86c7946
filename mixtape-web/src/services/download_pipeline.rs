//! Serial audio download pipeline with shared progress tracking.
//!
//! One run at a time: the tracker only hands out a run token on an
//! idle-to-running transition under its lock. Per-job failures are recorded
//! and the run continues; the terminal state (`complete = true`,
//! `running = false`) is set unconditionally.

use std::path::PathBuf;
use std::sync::Arc;

use rand::Rng;
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::models::{DownloadJob, DownloadStatus};
use crate::services::youtube::AudioFetcher;

/// Owner of the process-wide download status record.
#[derive(Debug, Default)]
pub struct DownloadTracker {
    inner: Mutex<TrackerInner>,
}

#[derive(Debug, Default)]
struct TrackerInner {
    status: DownloadStatus,
    cancel: CancellationToken,
}

impl DownloadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle-to-running transition; succeeds exactly once per run.
    ///
    /// Resets the status record for a run of `total` jobs and returns the
    /// run's cancellation token, or None when a run is already active.
    pub async fn try_start(&self, total: usize) -> Option<CancellationToken> {
        let mut inner = self.inner.lock().await;
        if inner.status.running {
            return None;
        }
        inner.status = DownloadStatus {
            running: true,
            progress: "Starting downloads...".to_string(),
            complete: false,
            current_song: String::new(),
            downloaded: 0,
            total,
        };
        inner.cancel = CancellationToken::new();
        Some(inner.cancel.clone())
    }

    pub async fn snapshot(&self) -> DownloadStatus {
        self.inner.lock().await.status.clone()
    }

    pub async fn set_progress(&self, text: impl Into<String>) {
        self.inner.lock().await.status.progress = text.into();
    }

    pub async fn set_current_song(&self, label: impl Into<String>) {
        self.inner.lock().await.status.current_song = label.into();
    }

    pub async fn set_downloaded(&self, count: usize) {
        self.inner.lock().await.status.downloaded = count;
    }

    /// Terminal transition, taken regardless of per-job outcomes.
    pub async fn finish(&self, summary: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.status.progress = summary.into();
        inner.status.complete = true;
        inner.status.running = false;
    }

    /// Cancel the active run, if any. Returns whether a run was active.
    pub async fn cancel(&self) -> bool {
        let inner = self.inner.lock().await;
        if inner.status.running {
            inner.cancel.cancel();
            true
        } else {
            false
        }
    }
}

/// Paths and pacing the pipeline needs from configuration.
#[derive(Debug, Clone)]
pub struct DownloadContext {
    pub download_dir: PathBuf,
    /// Upper bound of the randomized inter-download delay, in seconds
    pub max_delay_secs: u64,
    pub auto_tag_script: PathBuf,
    pub organize_script: PathBuf,
}

/// Destination filename stem for a job: strip everything outside the
/// word/space/hyphen class, then collapse whitespace and hyphen runs.
pub fn sanitize_filename(artist: &str, title: &str) -> String {
    let raw = format!("{artist} - {title}");
    let kept: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut out = String::new();
    let mut in_run = false;
    for c in kept.trim().chars() {
        if c.is_whitespace() || c == '-' {
            if !in_run {
                out.push('-');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Run the whole job list serially, updating the shared tracker.
pub async fn run_downloads<F: AudioFetcher>(
    fetcher: Arc<F>,
    tracker: Arc<DownloadTracker>,
    ctx: DownloadContext,
    jobs: Vec<DownloadJob>,
    cancel: CancellationToken,
) {
    let total = jobs.len();
    info!(total, "Download run started");

    if let Err(e) = std::fs::create_dir_all(&ctx.download_dir) {
        warn!(dir = %ctx.download_dir.display(), error = %e, "Could not create download directory");
    }

    let mut success_count = 0usize;
    let mut failures: Vec<String> = Vec::new();

    for (position, job) in jobs.iter().enumerate() {
        if cancel.is_cancelled() {
            info!(position, "Download run cancelled");
            break;
        }

        // Randomized pacing before every job but the first
        if position > 0 && ctx.max_delay_secs > 0 {
            let delay = rand::thread_rng().gen_range(0..=ctx.max_delay_secs);
            tracker
                .set_progress(format!("Waiting {delay} seconds before next download..."))
                .await;
            tokio::time::sleep(std::time::Duration::from_secs(delay)).await;
        }

        let label = format!("{} - {}", job.artist, job.title);
        tracker.set_current_song(label.clone()).await;
        tracker.set_progress(format!("Downloading: {label}")).await;

        let stem = sanitize_filename(&job.artist, &job.title);
        let template = ctx.download_dir.join(format!("{stem}.%(ext)s"));

        match fetcher.fetch(&job.youtube_url, &template).await {
            Ok(()) => {
                success_count += 1;
                info!(song = %label, "Download succeeded");
            }
            Err(e) => {
                error!(song = %label, error = %e, "Download failed");
                failures.push(format!("{label}: {e}"));
            }
        }

        // Counter reflects the sequence position reached, not successes
        tracker.set_downloaded(position + 1).await;
    }

    tracker.set_progress("Running post-processing...").await;
    run_post_processing(&ctx).await;

    let summary = if cancel.is_cancelled() {
        format!("Cancelled. Downloaded {success_count}/{total}.")
    } else if failures.is_empty() {
        format!("All downloads complete! Successfully downloaded {success_count} songs.")
    } else {
        format!(
            "Complete! Downloaded {success_count}/{total}. Failures: {}",
            failures.len()
        )
    };
    info!(%summary, "Download run finished");
    tracker.finish(summary).await;
}

/// Invoke the tagging and organizing scripts when they exist on disk.
/// Best-effort: failures are logged and never affect the run outcome.
async fn run_post_processing(ctx: &DownloadContext) {
    for script in [&ctx.auto_tag_script, &ctx.organize_script] {
        if !script.exists() {
            continue;
        }
        match Command::new("python3").arg(script.as_os_str()).status().await {
            Ok(status) if status.success() => {
                info!(script = %script.display(), "Post-processing script finished");
            }
            Ok(status) => {
                warn!(script = %script.display(), %status, "Post-processing script failed");
            }
            Err(e) => {
                warn!(script = %script.display(), error = %e, "Could not run post-processing script");
            }
        }
    }
}
