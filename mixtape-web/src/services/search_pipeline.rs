//! Per-line song resolution: parse, match against the catalog, query the
//! search provider, aggregate into `SearchResult`s.
//!
//! Runs are spawned in the background and tracked in a registry keyed by a
//! run id; callers poll until the run reaches a terminal state. A run that
//! dies is marked failed rather than left pending, so polling always
//! terminates.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{ResolutionStatus, SearchResult};
use crate::services::library_index::SharedLibrary;
use crate::services::track_matcher::find_match;
use crate::services::youtube::{CandidateProvider, DEFAULT_MAX_CANDIDATES};

/// State of one search run.
#[derive(Debug)]
pub enum RunState {
    Pending,
    Complete(Vec<SearchResult>),
    Failed(String),
    Cancelled,
}

/// Registry entry: run state plus its cancellation handle.
#[derive(Debug)]
pub struct SearchRun {
    pub state: RunState,
    pub cancel: CancellationToken,
}

/// Process-wide mapping from run id to run state.
pub type SearchRegistry = Arc<RwLock<HashMap<Uuid, SearchRun>>>;

/// Split a song line on the first " - " into (artist, title), trimmed.
///
/// The title may itself contain " - ", so only the first separator splits.
pub fn parse_song_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(" - ")
        .map(|(artist, title)| (artist.trim(), title.trim()))
}

/// Process a whole song list, one result per non-empty line.
///
/// Every parseable line costs one provider call, even when the library
/// already holds the song; the library status wins over the candidate
/// outcome. A provider failure is logged and the line continues with an
/// empty candidate list, so a library match is never masked by a search
/// outage. The pacing pause follows every processed line, invalid ones
/// included.
pub async fn run_search<P: CandidateProvider>(
    provider: Arc<P>,
    library: SharedLibrary,
    song_list: String,
    pacing: Duration,
    cancel: CancellationToken,
) -> Vec<SearchResult> {
    let mut results = Vec::new();

    for line in song_list.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if cancel.is_cancelled() {
            info!(processed = results.len(), "Search run cancelled");
            break;
        }

        let result = match parse_song_line(line) {
            None => SearchResult::invalid(line),
            Some((artist, title)) => {
                let library_match = {
                    let index = library.read().await;
                    find_match(&index, artist, title)
                };

                let candidates = match provider
                    .search(artist, title, DEFAULT_MAX_CANDIDATES)
                    .await
                {
                    Ok(candidates) => candidates,
                    Err(e) => {
                        warn!(song = line, error = %e, "Candidate search failed, continuing without candidates");
                        Vec::new()
                    }
                };

                let status = if library_match.is_some() {
                    ResolutionStatus::InLibrary
                } else if !candidates.is_empty() {
                    ResolutionStatus::Found
                } else {
                    ResolutionStatus::NotFound
                };

                SearchResult {
                    original: line.to_string(),
                    artist: artist.to_string(),
                    title: title.to_string(),
                    status,
                    library_match,
                    candidates,
                }
            }
        };

        results.push(result);
        tokio::time::sleep(pacing).await;
    }

    results
}

/// Register a new run and spawn it in the background.
///
/// Returns the run id immediately; results land in the registry when the
/// run finishes. A panicking run is recorded as `Failed`, never left
/// `Pending`.
pub async fn spawn_search<P: CandidateProvider + 'static>(
    registry: SearchRegistry,
    provider: Arc<P>,
    library: SharedLibrary,
    song_list: String,
    pacing: Duration,
) -> Uuid {
    let search_id = Uuid::new_v4();
    let cancel = CancellationToken::new();

    registry.write().await.insert(
        search_id,
        SearchRun {
            state: RunState::Pending,
            cancel: cancel.clone(),
        },
    );

    info!(%search_id, "Search run started");

    let worker = tokio::spawn(run_search(
        provider,
        library,
        song_list,
        pacing,
        cancel.clone(),
    ));

    let registry_for_finish = registry.clone();
    tokio::spawn(async move {
        let state = match worker.await {
            Ok(results) if cancel.is_cancelled() => {
                info!(%search_id, "Search run ended after cancellation");
                let _ = results;
                RunState::Cancelled
            }
            Ok(results) => {
                info!(%search_id, songs = results.len(), "Search run complete");
                RunState::Complete(results)
            }
            Err(e) => {
                error!(%search_id, error = %e, "Search run died");
                RunState::Failed(e.to_string())
            }
        };

        if let Some(run) = registry_for_finish.write().await.get_mut(&search_id) {
            run.state = state;
        }
    });

    search_id
}
