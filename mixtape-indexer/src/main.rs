//! mixtape-indexer - Offline music index generator
//!
//! Walks a music directory tree, reads audio tags, and emits the JSON
//! track index consumed by mixtape-web. Run it whenever the collection
//! changes, then POST /reload-index on the running service.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use mixtape_common::TrackEntry;
use tracing::{debug, info};
use walkdir::WalkDir;

const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "flac", "m4a", "ogg", "wav"];

#[derive(Debug, Parser)]
#[command(name = "mixtape-indexer", about = "Generate the mixtape music index")]
struct Args {
    /// Root of the music collection to walk
    #[arg(long, env = "MIXTAPE_MUSIC_ROOT")]
    music_root: PathBuf,

    /// Output path of the JSON index
    #[arg(long, env = "MIXTAPE_MUSIC_INDEX", default_value = "music_index.json")]
    output: PathBuf,
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Build a track entry from one file's tags.
///
/// Files without both an artist and a title tag are not indexable and
/// yield None; album and year are carried along when present.
fn read_entry(path: &Path) -> Option<TrackEntry> {
    let tagged = match Probe::open(path).and_then(|probe| probe.read()) {
        Ok(tagged) => tagged,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Skipping unreadable file");
            return None;
        }
    };

    let tag = tagged.primary_tag().or_else(|| tagged.first_tag())?;

    let artist = tag.artist()?.trim().to_string();
    let title = tag.title()?.trim().to_string();
    if artist.is_empty() || title.is_empty() {
        return None;
    }

    Some(TrackEntry {
        artist,
        title,
        path: path.display().to_string(),
        album: tag
            .album()
            .map(|album| album.trim().to_string())
            .filter(|album| !album.is_empty()),
        year: tag.year().map(|year| year.to_string()),
    })
}

/// Walk the tree and collect every taggable audio file.
fn scan(music_root: &Path) -> Vec<TrackEntry> {
    let mut entries = Vec::new();
    let mut seen = 0usize;

    for file in WalkDir::new(music_root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        if !is_audio_file(file.path()) {
            continue;
        }
        seen += 1;
        if let Some(entry) = read_entry(file.path()) {
            entries.push(entry);
        }
    }

    info!(
        scanned = seen,
        indexed = entries.len(),
        "Scan complete"
    );
    entries
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!(
        music_root = %args.music_root.display(),
        output = %args.output.display(),
        "Starting mixtape-indexer v{}",
        env!("CARGO_PKG_VERSION")
    );

    anyhow::ensure!(
        args.music_root.is_dir(),
        "Music root is not a directory: {}",
        args.music_root.display()
    );

    let entries = scan(&args.music_root);

    let json = serde_json::to_string_pretty(&entries)?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("writing index to {}", args.output.display()))?;

    info!(
        tracks = entries.len(),
        output = %args.output.display(),
        "Index written"
    );
    Ok(())
}
