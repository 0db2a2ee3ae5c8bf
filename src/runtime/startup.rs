use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config;
use crate::library::{Track, scan};
use crate::playlist::{PlaylistStore, Playlists};

/// Log to a daily rolling file; the terminal belongs to the TUI.
///
/// The returned guard flushes buffered lines on drop and must outlive the UI.
pub fn init_logging(settings: &config::Settings, dir_override: Option<PathBuf>) -> Result<WorkerGuard> {
    let log_dir = dir_override
        .or_else(|| settings.log_dir())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "encore.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("installing log subscriber")?;

    info!(dir = %log_dir.display(), "logging initialized");
    Ok(guard)
}

pub fn scan_library(dir: &Path, settings: &config::Settings) -> Vec<Track> {
    let tracks = scan(dir, &settings.library);
    info!(dir = %dir.display(), count = tracks.len(), "library scanned");
    tracks
}

pub fn open_playlists(settings: &config::Settings) -> Playlists {
    let path = settings.playlists_path().unwrap_or_else(|| {
        warn!("no data directory found, keeping playlists in the working directory");
        PathBuf::from("playlists.json")
    });
    Playlists::open(PlaylistStore::new(path))
}
