use tracing::{debug, info, warn};

use crate::focus::AudioFocus;
use crate::library::Track;

use super::engine::DecodingEngine;
use super::types::{EngineEvent, Generation, PlaybackState};

/// Drives one engine instance through its lifecycle.
///
/// Every method returns whether the state (or the loaded track) changed, so
/// the owner knows when to publish.
pub struct PlaybackController {
    engine: Box<dyn DecodingEngine>,
    state: PlaybackState,
    generation: Generation,
    loaded: Option<Track>,
    auto_play: bool,
    last_failure: Option<String>,
}

impl PlaybackController {
    pub fn new(engine: Box<dyn DecodingEngine>) -> Self {
        Self {
            engine,
            state: PlaybackState::Idle,
            generation: Generation::default(),
            loaded: None,
            auto_play: false,
            last_failure: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn loaded_track(&self) -> Option<&Track> {
        self.loaded.as_ref()
    }

    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Replace whatever is loaded with `track`.
    pub fn load(&mut self, track: Track, auto_play: bool) {
        self.engine.release();
        self.generation = self.generation.next();
        self.auto_play = auto_play;
        self.last_failure = None;

        debug!(generation = %self.generation, track = %track.display_name, auto_play, "loading");
        let submitted = self.engine.submit(&track.locator, self.generation);
        self.loaded = Some(track);
        match submitted {
            Ok(()) => self.state = PlaybackState::Preparing,
            Err(err) => self.fail(err.to_string()),
        }
    }

    pub fn on_prepared(&mut self, generation: Generation, focus: &mut AudioFocus) -> bool {
        if !self.is_current(generation, "prepared") || self.state != PlaybackState::Preparing {
            return false;
        }

        self.state = PlaybackState::Ready;
        if self.auto_play {
            self.start(focus);
        }
        true
    }

    pub fn on_failed(&mut self, generation: Generation, reason: String) -> bool {
        if !self.is_current(generation, "failed") {
            return false;
        }
        // A stopped controller has nothing left to fail.
        if matches!(self.state, PlaybackState::Idle | PlaybackState::Failed) {
            debug!(%generation, state = ?self.state, "ignoring failure after release");
            return false;
        }
        self.fail(reason);
        true
    }

    /// True when the current track genuinely played out and the owner should
    /// advance.
    pub fn on_completed(&mut self, generation: Generation) -> bool {
        self.is_current(generation, "completed") && self.state == PlaybackState::Playing
    }

    /// Start (Ready) or continue (Paused). While still preparing, arm
    /// auto-play instead.
    pub fn resume(&mut self, focus: &mut AudioFocus) -> bool {
        match self.state {
            PlaybackState::Ready | PlaybackState::Paused => self.start(focus),
            PlaybackState::Preparing => {
                self.auto_play = true;
                false
            }
            _ => false,
        }
    }

    pub fn pause(&mut self) -> bool {
        match self.state {
            PlaybackState::Playing => {
                self.engine.pause();
                self.state = PlaybackState::Paused;
                true
            }
            PlaybackState::Preparing => {
                self.auto_play = false;
                false
            }
            _ => false,
        }
    }

    /// Release the engine and forget the loaded track.
    pub fn stop(&mut self) -> bool {
        let changed = self.state != PlaybackState::Idle || self.loaded.is_some();
        self.engine.release();
        self.state = PlaybackState::Idle;
        self.loaded = None;
        self.auto_play = false;
        changed
    }

    pub fn poll(&mut self) -> Option<EngineEvent> {
        self.engine.poll()
    }

    fn start(&mut self, focus: &mut AudioFocus) -> bool {
        if !focus.request_focus().is_granted() {
            info!(state = ?self.state, "focus denied, not starting");
            return false;
        }
        match self.engine.start() {
            Ok(()) => {
                self.state = PlaybackState::Playing;
                true
            }
            Err(err) => {
                self.fail(err.to_string());
                true
            }
        }
    }

    fn fail(&mut self, reason: String) {
        warn!(generation = %self.generation, %reason, "playback failed");
        self.engine.release();
        self.state = PlaybackState::Failed;
        self.last_failure = Some(reason);
    }

    fn is_current(&self, generation: Generation, what: &str) -> bool {
        if generation == self.generation {
            return true;
        }
        debug!(%generation, current = %self.generation, what, "ignoring stale engine event");
        false
    }
}
