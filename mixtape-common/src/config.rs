//! Configuration loading for mixtape binaries.
//!
//! Resolution priority for every setting:
//! 1. Environment variable (`MIXTAPE_*`)
//! 2. Compiled default
//!
//! All paths are plain filesystem paths; the service creates the playlist
//! and download directories on demand, never the music root.

use std::path::PathBuf;
use std::time::Duration;

/// Service configuration resolved at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON track index consumed by the library index
    pub music_index_path: PathBuf,
    /// Directory playlists are written to
    pub playlist_dir: PathBuf,
    /// Directory downloaded audio lands in
    pub download_dir: PathBuf,
    /// Root of the indexed music collection (reported, not walked)
    pub music_root: PathBuf,
    /// Bind address for the HTTP server
    pub bind_addr: String,
    /// Pause after each processed song line, throttles the search provider
    pub search_pacing: Duration,
    /// Upper bound of the randomized delay between downloads, in seconds
    pub max_download_delay_secs: u64,
    /// Ceiling on concurrent search provider invocations
    pub provider_concurrency: usize,
    /// Name or path of the yt-dlp executable
    pub ytdlp_bin: String,
    /// Post-download tagging script, run when present on disk
    pub auto_tag_script: PathBuf,
    /// Post-download organizing script, run when present on disk
    pub organize_script: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            music_index_path: PathBuf::from("/var/lib/mixtape/music_index.json"),
            playlist_dir: PathBuf::from("/var/lib/mixtape/playlists"),
            download_dir: PathBuf::from("/var/lib/mixtape/downloads"),
            music_root: PathBuf::from("/var/lib/mixtape/music"),
            bind_addr: "127.0.0.1:5860".to_string(),
            search_pacing: Duration::from_millis(500),
            max_download_delay_secs: 60,
            provider_concurrency: 2,
            ytdlp_bin: "yt-dlp".to_string(),
            auto_tag_script: PathBuf::from("auto_tag_lastfm.py"),
            organize_script: PathBuf::from("organize_music.py"),
        }
    }
}

impl Config {
    /// Resolve configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            music_index_path: env_path("MIXTAPE_MUSIC_INDEX", defaults.music_index_path),
            playlist_dir: env_path("MIXTAPE_PLAYLIST_DIR", defaults.playlist_dir),
            download_dir: env_path("MIXTAPE_DOWNLOAD_DIR", defaults.download_dir),
            music_root: env_path("MIXTAPE_MUSIC_ROOT", defaults.music_root),
            bind_addr: env_string("MIXTAPE_BIND", defaults.bind_addr),
            search_pacing: Duration::from_millis(env_parsed(
                "MIXTAPE_SEARCH_PACING_MS",
                defaults.search_pacing.as_millis() as u64,
            )),
            max_download_delay_secs: env_parsed(
                "MIXTAPE_MAX_DOWNLOAD_DELAY_SECS",
                defaults.max_download_delay_secs,
            ),
            provider_concurrency: env_parsed(
                "MIXTAPE_PROVIDER_CONCURRENCY",
                defaults.provider_concurrency,
            )
            .max(1),
            ytdlp_bin: env_string("MIXTAPE_YTDLP_BIN", defaults.ytdlp_bin),
            auto_tag_script: env_path("MIXTAPE_AUTO_TAG_SCRIPT", defaults.auto_tag_script),
            organize_script: env_path("MIXTAPE_ORGANIZE_SCRIPT", defaults.organize_script),
        }
    }
}

fn env_string(name: &str, default: String) -> String {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default,
    }
}

fn env_path(name: &str, default: PathBuf) -> PathBuf {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => default,
    }
}

fn env_parsed<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(value) => match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!(var = name, value = %value, "Unparseable value, using default");
                default
            }
        },
        Err(_) => default,
    }
}
