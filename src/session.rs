//! The serialized playback session.
//!
//! One thread owns the queue, the playback controller and the focus
//! arbitrator. Everything that wants to change them (UI, media keys, MPRIS,
//! engine callbacks, focus callbacks) sends a [`SessionMsg`] to its mailbox.
//! Readers get copies through [`SessionHandle`].

mod actor;
mod handle;

pub use actor::SessionCore;
pub use handle::{SessionError, SessionHandle, SessionSetup, spawn};

use crate::focus::{FocusChange, FocusState};
use crate::library::{Track, TrackId};
use crate::playback::{EngineEvent, PlaybackState};
use crate::queue::QueueChange;

pub const NOTHING_LOADED: &str = "Nothing loaded";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Pause,
    TogglePlayPause,
    Next,
    Previous,
    Stop,
    PlayTrack(TrackId),
    AppendToQueue(Track),
    InsertAfterActive { track: Track, index: usize },
    RemoveFromQueue(usize),
    MoveInQueue { from: usize, to: usize },
    /// Rotate `tracks` so `start` is active; auto-play the new head if `play`.
    ReplaceQueue { tracks: Vec<Track>, start: usize, play: bool },
    SetLibrary(Vec<Track>),
}

#[derive(Debug)]
pub enum SessionMsg {
    Command(Command),
    Engine(EngineEvent),
    Focus(FocusChange),
    Shutdown,
}

impl From<Command> for SessionMsg {
    fn from(cmd: Command) -> Self {
        Self::Command(cmd)
    }
}

/// Published after every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    StateChanged,
    Queue(QueueChange),
}

/// Copy of the session state handed to readers.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub current: Option<Track>,
    pub queue: Vec<Track>,
    pub state: PlaybackState,
    pub focus: FocusState,
    pub is_playing: bool,
    pub last_failure: Option<String>,
}

impl SessionSnapshot {
    pub fn now_playing(&self) -> NowPlaying {
        NowPlaying {
            title: self
                .current
                .as_ref()
                .map_or_else(|| NOTHING_LOADED.to_string(), |t| t.display_name.clone()),
            track_id: self.current.as_ref().map(|t| t.id),
            is_playing: self.is_playing,
            state: self.state,
        }
    }
}

/// What a background now-playing surface shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub track_id: Option<TrackId>,
    pub is_playing: bool,
    pub state: PlaybackState,
}

/// A persistent display outside the main UI (MPRIS, notifications). Its
/// previous/toggle/next actions come back in as ordinary commands.
pub trait NowPlayingSurface: Send {
    fn refresh(&mut self, now: &NowPlaying);
}
