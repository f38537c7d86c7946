//! Approximate matching of a song query against the library catalog.

use mixtape_common::{track_key, TrackEntry};

use super::library_index::LibraryIndex;

/// Minimum normalized similarity for a catalog key to count as a match.
const MATCH_THRESHOLD: f64 = 0.85;

/// Find the best catalog entry for an artist/title query, or None.
///
/// Scores the normalized query key against every stored key with
/// normalized Levenshtein similarity and returns the single best entry at
/// or above 0.85. The whole "artist - title" string is scored as one; no
/// artist-only or title-only matching is attempted, so a key whose
/// concatenation scores low is a miss even when one field matches exactly.
pub fn find_match(index: &LibraryIndex, artist: &str, title: &str) -> Option<TrackEntry> {
    let query = track_key(artist, title);

    let mut best: Option<(f64, &TrackEntry)> = None;
    for (key, entry) in index.iter() {
        let score = strsim::normalized_levenshtein(&query, key);
        if score >= MATCH_THRESHOLD && best.map_or(true, |(top, _)| score > top) {
            best = Some((score, entry));
        }
    }

    best.map(|(_, entry)| entry.clone())
}
