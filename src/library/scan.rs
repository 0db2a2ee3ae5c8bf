use std::collections::HashSet;
use std::path::Path;
use std::time::SystemTime;

use lofty::prelude::*;
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use crate::config::LibrarySettings;

use super::model::Track;

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// "Artist - Title" from tags when present, otherwise the file stem.
pub(super) fn display_name(path: &Path) -> String {
    let fallback = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();

    let tagged = match lofty::read_from_path(path) {
        Ok(t) => t,
        Err(e) => {
            trace!(path = %path.display(), error = %e, "no readable tags");
            return fallback;
        }
    };

    let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
        return fallback;
    };

    let title = tag
        .title()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or(fallback);

    match tag.artist().map(|a| a.trim().to_string()) {
        Some(artist) if !artist.is_empty() => format!("{artist} - {title}"),
        _ => title,
    }
}

fn added_at(entry: &DirEntry) -> SystemTime {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().or_else(|_| m.created()).ok())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Newest first; ties broken by name so the order is stable between scans.
pub(super) fn sort_newest_first(tracks: &mut [Track]) {
    tracks.sort_by(|a, b| {
        b.added_at.cmp(&a.added_at).then_with(|| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
        })
    });
}

pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();
    let mut seen = HashSet::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file()
            || (!settings.include_hidden && is_hidden(path))
            || !is_audio_file(path, settings)
        {
            continue;
        }

        let track = Track::new(path.to_path_buf(), display_name(path), added_at(&entry));
        if seen.insert(track.id) {
            tracks.push(track);
        }
    }

    sort_newest_first(&mut tracks);
    debug!(dir = %dir.display(), count = tracks.len(), "library scan finished");
    tracks
}
