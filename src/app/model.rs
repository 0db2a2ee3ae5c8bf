//! Application model types: `App`, panes, library views and popups.

use crate::library::Track;
use crate::playlist::{AddOutcome, PlaylistError, PlaylistId, Playlists};
use crate::selection::{Gesture, ItemSource, SelectableItem, interpret};
use crate::session::{Command, SessionSnapshot};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Pane {
    Queue,
    #[default]
    Library,
}

/// What the library pane is listing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum LibraryView {
    #[default]
    Songs,
    Playlists,
    PlaylistDetail(PlaylistId),
}

#[derive(Clone, Debug, PartialEq, Default)]
pub enum Popup {
    #[default]
    None,
    /// Typing a name for a new playlist.
    NewPlaylist { input: String },
    /// Choosing which playlist `track` goes into.
    PickPlaylist { track: Track, selected: usize },
}

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    pub playlists: Playlists,
    pub snapshot: SessionSnapshot,

    pub pane: Pane,
    pub view: LibraryView,
    pub popup: Popup,

    pub song_selected: usize,
    pub playlist_selected: usize,
    pub detail_selected: usize,
    pub queue_selected: usize,

    /// One-line feedback shown in the status bar until the next action.
    pub message: Option<String>,
    pub current_dir: Option<String>,
}

impl App {
    pub fn new(tracks: Vec<Track>, playlists: Playlists) -> Self {
        Self {
            tracks,
            playlists,
            snapshot: SessionSnapshot::default(),
            pane: Pane::Library,
            view: LibraryView::Songs,
            popup: Popup::None,
            song_selected: 0,
            playlist_selected: 0,
            detail_selected: 0,
            queue_selected: 0,
            message: None,
            current_dir: None,
        }
    }

    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    /// Swap in a fresh copy of the session state and keep the queue cursor
    /// on an existing row.
    pub fn set_snapshot(&mut self, snapshot: SessionSnapshot) {
        self.snapshot = snapshot;
        self.queue_selected = clamp_index(self.queue_selected, self.snapshot.queue.len());
    }

    /// Tracks of the open playlist, resolved against the library.
    pub fn playlist_tracks(&self) -> Vec<Track> {
        match self.view {
            LibraryView::PlaylistDetail(id) => self.playlists.resolve(id, &self.tracks),
            _ => Vec::new(),
        }
    }

    fn open_playlist_name(&self) -> Option<&str> {
        match self.view {
            LibraryView::PlaylistDetail(id) => {
                self.playlists.book().get(id).map(|p| p.name.as_str())
            }
            _ => None,
        }
    }

    pub fn library_title(&self) -> String {
        match self.view {
            LibraryView::Songs => "Songs".to_string(),
            LibraryView::Playlists => "Playlists".to_string(),
            LibraryView::PlaylistDetail(_) => self.open_playlist_name().unwrap_or("Playlist").to_string(),
        }
    }

    fn library_len(&self) -> usize {
        match self.view {
            LibraryView::Songs => self.tracks.len(),
            LibraryView::Playlists => self.playlists.book().len(),
            LibraryView::PlaylistDetail(_) => self.playlist_tracks().len(),
        }
    }

    fn cursor_mut(&mut self) -> &mut usize {
        match (self.pane, self.view) {
            (Pane::Queue, _) => &mut self.queue_selected,
            (Pane::Library, LibraryView::Songs) => &mut self.song_selected,
            (Pane::Library, LibraryView::Playlists) => &mut self.playlist_selected,
            (Pane::Library, LibraryView::PlaylistDetail(_)) => &mut self.detail_selected,
        }
    }

    fn cursor_len(&self) -> usize {
        match self.pane {
            Pane::Queue => self.snapshot.queue.len(),
            Pane::Library => self.library_len(),
        }
    }

    /// Move selection to the next row, wrapping.
    pub fn next(&mut self) {
        let len = self.cursor_len();
        if len == 0 {
            return;
        }
        let cursor = self.cursor_mut();
        *cursor = (*cursor + 1) % len;
    }

    /// Move selection to the previous row, wrapping.
    pub fn prev(&mut self) {
        let len = self.cursor_len();
        if len == 0 {
            return;
        }
        let cursor = self.cursor_mut();
        *cursor = (*cursor + len - 1) % len;
    }

    pub fn select_first(&mut self) {
        *self.cursor_mut() = 0;
    }

    pub fn select_last(&mut self) {
        let len = self.cursor_len();
        *self.cursor_mut() = len.saturating_sub(1);
    }

    pub fn toggle_pane(&mut self) {
        self.pane = match self.pane {
            Pane::Queue => Pane::Library,
            Pane::Library => Pane::Queue,
        };
    }

    pub fn show_songs(&mut self) {
        self.pane = Pane::Library;
        self.view = LibraryView::Songs;
    }

    pub fn show_playlists(&mut self) {
        self.pane = Pane::Library;
        self.view = LibraryView::Playlists;
        self.playlist_selected = clamp_index(self.playlist_selected, self.playlists.book().len());
    }

    pub fn close_playlist(&mut self) {
        if matches!(self.view, LibraryView::PlaylistDetail(_)) {
            self.show_playlists();
        }
    }

    fn open_selected_playlist(&mut self) {
        let Some(id) = self
            .playlists
            .book()
            .iter()
            .nth(self.playlist_selected)
            .map(|p| p.id)
        else {
            return;
        };
        self.view = LibraryView::PlaylistDetail(id);
        self.detail_selected = 0;
    }

    /// The row under the cursor as a selectable item, if it is a track.
    pub fn selected_item(&self) -> Option<SelectableItem> {
        match (self.pane, self.view) {
            (Pane::Queue, _) => self
                .snapshot
                .queue
                .get(self.queue_selected)
                .map(|t| SelectableItem::new(ItemSource::Queue, self.queue_selected, t.clone())),
            (Pane::Library, LibraryView::Songs) => self
                .tracks
                .get(self.song_selected)
                .map(|t| SelectableItem::new(ItemSource::Library, self.song_selected, t.clone())),
            (Pane::Library, LibraryView::PlaylistDetail(id)) => self
                .playlist_tracks()
                .get(self.detail_selected)
                .map(|t| {
                    SelectableItem::new(ItemSource::Playlist(id), self.detail_selected, t.clone())
                }),
            (Pane::Library, LibraryView::Playlists) => None,
        }
    }

    fn gesture(&self, gesture: Gesture) -> Option<Command> {
        let item = self.selected_item()?;
        let context = match item.source {
            ItemSource::Playlist(_) => self.playlist_tracks(),
            _ => Vec::new(),
        };
        interpret(&item, gesture, &context)
    }

    /// Enter on the focused row. On the playlist list this opens the playlist.
    pub fn activate(&mut self) -> Option<Command> {
        if self.pane == Pane::Library && self.view == LibraryView::Playlists {
            self.open_selected_playlist();
            return None;
        }
        self.gesture(Gesture::Activate)
    }

    pub fn add_to_queue(&mut self) -> Option<Command> {
        let cmd = self.gesture(Gesture::AddToQueue)?;
        if let Command::AppendToQueue(track) = &cmd {
            self.message = Some(format!("Added to queue: {}", track.display_name));
        }
        Some(cmd)
    }

    /// Queue the selected track right after the active one.
    pub fn insert_after_active(&mut self) -> Option<Command> {
        self.gesture(Gesture::DropOnQueue { position: Some(1) })
    }

    pub fn remove_from_queue(&mut self) -> Option<Command> {
        if self.pane != Pane::Queue {
            return None;
        }
        self.gesture(Gesture::DropOutside)
    }

    /// Shift the selected queue item by `delta` rows, following it with the
    /// cursor. The active track (row 0) stays put.
    pub fn move_in_queue(&mut self, delta: isize) -> Option<Command> {
        if self.pane != Pane::Queue || self.queue_selected == 0 {
            return None;
        }
        let last = self.snapshot.queue.len().checked_sub(1)?;
        let to = self
            .queue_selected
            .saturating_add_signed(delta)
            .clamp(1, last.max(1));
        let cmd = self.gesture(Gesture::DropOnQueue { position: Some(to) })?;
        self.queue_selected = to;
        Some(cmd)
    }

    pub fn begin_new_playlist(&mut self) {
        self.popup = Popup::NewPlaylist {
            input: String::new(),
        };
    }

    pub fn push_input(&mut self, c: char) {
        if let Popup::NewPlaylist { input } = &mut self.popup {
            input.push(c);
        }
    }

    pub fn pop_input(&mut self) {
        if let Popup::NewPlaylist { input } = &mut self.popup {
            input.pop();
        }
    }

    pub fn confirm_new_playlist(&mut self) {
        let Popup::NewPlaylist { input } = std::mem::take(&mut self.popup) else {
            return;
        };
        self.message = Some(match self.playlists.create(&input) {
            Ok(id) => {
                let name = self
                    .playlists
                    .book()
                    .get(id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                format!("Created playlist {name}")
            }
            Err(PlaylistError::EmptyName) => "Playlist name is empty".to_string(),
            Err(PlaylistError::Duplicate(_)) => "Playlist already exists".to_string(),
            Err(err) => err.to_string(),
        });
    }

    /// Open the playlist picker for the selected track.
    pub fn begin_add_to_playlist(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        if self.playlists.book().is_empty() {
            self.message = Some("No playlists yet. Press N to create one.".to_string());
            return;
        }
        self.popup = Popup::PickPlaylist {
            track: item.track,
            selected: 0,
        };
    }

    pub fn picker_next(&mut self) {
        let len = self.playlists.book().len();
        if let Popup::PickPlaylist { selected, .. } = &mut self.popup {
            if len > 0 {
                *selected = (*selected + 1) % len;
            }
        }
    }

    pub fn picker_prev(&mut self) {
        let len = self.playlists.book().len();
        if let Popup::PickPlaylist { selected, .. } = &mut self.popup {
            if len > 0 {
                *selected = (*selected + len - 1) % len;
            }
        }
    }

    pub fn confirm_pick(&mut self) {
        let Popup::PickPlaylist { track, selected } = std::mem::take(&mut self.popup) else {
            return;
        };
        let Some((id, name)) = self
            .playlists
            .book()
            .iter()
            .nth(selected)
            .map(|p| (p.id, p.name.clone()))
        else {
            return;
        };

        self.message = Some(match self.playlists.add_track(id, track.id) {
            Ok(AddOutcome::Added) => format!("Added to {name}"),
            Ok(AddOutcome::AlreadyPresent) => format!("Already in {name}"),
            Err(err) => err.to_string(),
        });
    }

    pub fn cancel_popup(&mut self) {
        self.popup = Popup::None;
    }

    pub fn has_popup(&self) -> bool {
        self.popup != Popup::None
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}
