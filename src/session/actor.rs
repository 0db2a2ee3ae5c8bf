use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, trace};

use crate::focus::{AudioFocus, FocusChange, FocusReaction};
use crate::library::Track;
use crate::playback::{DecodingEngine, EngineEvent, PlaybackController, PlaybackState};
use crate::queue::{PlayQueue, QueueChange};

use super::{Command, NowPlayingSurface, SessionMsg, SessionSnapshot, Signal};

pub(super) type Subscribers = Arc<Mutex<Vec<Sender<Signal>>>>;

/// The state owned by the session thread, driven one message at a time.
///
/// Kept separate from the thread so tests can feed messages synchronously.
pub struct SessionCore {
    queue: PlayQueue,
    playback: PlaybackController,
    focus: AudioFocus,
    surfaces: Vec<Box<dyn NowPlayingSurface>>,
    shared: Arc<Mutex<SessionSnapshot>>,
    subscribers: Subscribers,
}

/// What handling one message did.
#[derive(Default)]
struct Outcome {
    changed: bool,
    queue: Vec<QueueChange>,
}

impl Outcome {
    fn state(changed: bool) -> Self {
        Self {
            changed,
            queue: Vec::new(),
        }
    }

    fn queue(&mut self, change: Option<QueueChange>) -> bool {
        match change {
            Some(c) => {
                self.queue.push(c);
                true
            }
            None => false,
        }
    }
}

impl SessionCore {
    pub fn new(library: Vec<Track>, engine: Box<dyn DecodingEngine>, focus: AudioFocus) -> Self {
        Self::with_shared(
            library,
            engine,
            focus,
            Arc::new(Mutex::new(SessionSnapshot::default())),
            Arc::new(Mutex::new(Vec::new())),
        )
    }

    pub(super) fn with_shared(
        library: Vec<Track>,
        engine: Box<dyn DecodingEngine>,
        focus: AudioFocus,
        shared: Arc<Mutex<SessionSnapshot>>,
        subscribers: Subscribers,
    ) -> Self {
        Self {
            queue: PlayQueue::new(library),
            playback: PlaybackController::new(engine),
            focus,
            surfaces: Vec::new(),
            shared,
            subscribers,
        }
    }

    pub fn add_surface(&mut self, surface: Box<dyn NowPlayingSurface>) {
        self.surfaces.push(surface);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn subscribe(&self) -> std::sync::mpsc::Receiver<Signal> {
        let (tx, rx) = std::sync::mpsc::channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }

    /// Publish the current state unconditionally, e.g. right after startup so
    /// surfaces show "Nothing loaded" instead of nothing.
    pub fn refresh(&mut self) {
        self.publish(Outcome::state(true));
    }

    /// Put the newest library track into an empty queue and load it without
    /// playing, so play and the media keys have something to start.
    pub fn seed_from_library(&mut self) {
        if !self.queue.is_empty() {
            return;
        }
        let Some(first) = self.queue.library().first().cloned() else {
            return;
        };
        debug!(track = %first.display_name, "seeding queue from library");
        let mut out = Outcome::default();
        out.changed = out.queue(self.queue.append_to_end(first));
        self.preload_if_filled(true);
        self.publish(out);
    }

    /// Run one message to completion. Returns `false` once the session
    /// should end.
    pub fn handle(&mut self, msg: SessionMsg) -> bool {
        trace!(?msg, "session message");
        let outcome = match msg {
            SessionMsg::Command(cmd) => self.on_command(cmd),
            SessionMsg::Engine(event) => self.on_engine(event),
            SessionMsg::Focus(change) => self.on_focus(change),
            SessionMsg::Shutdown => {
                info!("session shutting down");
                self.playback.stop();
                self.focus.abandon_focus();
                self.publish(Outcome::state(true));
                return false;
            }
        };
        self.publish(outcome);
        true
    }

    /// Idle tick: give a polling engine the chance to report end-of-stream.
    pub fn tick(&mut self) {
        if let Some(event) = self.playback.poll() {
            let outcome = self.on_engine(event);
            self.publish(outcome);
        }
    }

    fn on_command(&mut self, cmd: Command) -> Outcome {
        let mut out = Outcome::default();
        match cmd {
            Command::Play => out.changed = self.play(),
            Command::Pause => out.changed = self.user_pause(),
            Command::TogglePlayPause => {
                out.changed = if self.playback.is_playing() {
                    self.user_pause()
                } else {
                    self.play()
                };
            }
            Command::Next => {
                if out.queue(self.queue.advance()) {
                    self.load_head(true);
                    out.changed = true;
                }
            }
            Command::Previous => {
                if out.queue(self.queue.rewind()) {
                    self.load_head(true);
                    out.changed = true;
                }
            }
            Command::Stop => {
                self.focus.on_user_pause();
                out.changed = self.playback.stop();
            }
            Command::PlayTrack(id) => match self.queue.find_in_library(id).cloned() {
                Some(track) => {
                    out.queue(self.queue.replace_with_single(track));
                    self.load_head(true);
                    out.changed = true;
                }
                None => debug!(%id, "play request for unknown track"),
            },
            Command::AppendToQueue(track) => {
                let was_empty = self.queue.is_empty();
                out.changed = out.queue(self.queue.append_to_end(track));
                self.preload_if_filled(was_empty);
            }
            Command::InsertAfterActive { track, index } => {
                let was_empty = self.queue.is_empty();
                out.changed = out.queue(self.queue.insert_after_active(track, index));
                self.preload_if_filled(was_empty);
            }
            Command::RemoveFromQueue(index) => {
                out.changed = out.queue(self.queue.remove_at(index));
            }
            Command::MoveInQueue { from, to } => {
                out.changed = out.queue(self.queue.move_item(from, to));
            }
            Command::ReplaceQueue { tracks, start, play } => {
                if out.queue(self.queue.replace_all_starting_at(&tracks, start)) {
                    self.load_head(play);
                    out.changed = true;
                }
            }
            Command::SetLibrary(tracks) => {
                debug!(count = tracks.len(), "library replaced");
                self.queue.set_library(tracks);
                out.changed = true;
            }
        }
        out
    }

    fn on_engine(&mut self, event: EngineEvent) -> Outcome {
        match event {
            EngineEvent::Prepared { generation } => {
                Outcome::state(self.playback.on_prepared(generation, &mut self.focus))
            }
            EngineEvent::Failed { generation, reason } => {
                Outcome::state(self.playback.on_failed(generation, reason))
            }
            EngineEvent::Completed { generation } => {
                if !self.playback.on_completed(generation) {
                    return Outcome::default();
                }
                let mut out = Outcome::state(true);
                if out.queue(self.queue.advance()) {
                    self.load_head(true);
                } else {
                    debug!("nothing to advance to, stopping");
                    self.playback.stop();
                    self.focus.abandon_focus();
                }
                out
            }
        }
    }

    fn on_focus(&mut self, change: FocusChange) -> Outcome {
        let reaction = self
            .focus
            .on_focus_change(change, self.playback.is_playing());
        match reaction {
            FocusReaction::None => {}
            FocusReaction::Pause => {
                self.playback.pause();
            }
            FocusReaction::Resume => {
                self.playback.resume(&mut self.focus);
            }
        }
        // Focus state itself is part of the snapshot.
        Outcome::state(true)
    }

    fn play(&mut self) -> bool {
        match self.playback.state() {
            PlaybackState::Idle | PlaybackState::Failed => {
                if self.queue.is_empty() {
                    return false;
                }
                self.load_head(true);
                true
            }
            PlaybackState::Playing => false,
            _ => self.playback.resume(&mut self.focus),
        }
    }

    fn user_pause(&mut self) -> bool {
        self.focus.on_user_pause();
        self.playback.pause()
    }

    fn load_head(&mut self, auto_play: bool) {
        match self.queue.current().cloned() {
            Some(track) => self.playback.load(track, auto_play),
            None => {
                self.playback.stop();
            }
        }
    }

    /// Keep "queue head == loaded track" when the first item arrives.
    fn preload_if_filled(&mut self, was_empty: bool) {
        if was_empty && !self.queue.is_empty() {
            self.load_head(false);
        }
    }

    fn publish(&mut self, outcome: Outcome) {
        if !outcome.changed && outcome.queue.is_empty() {
            return;
        }

        let snapshot = SessionSnapshot {
            current: self.queue.current().cloned(),
            queue: self.queue.snapshot(),
            state: self.playback.state(),
            focus: self.focus.state(),
            is_playing: self.playback.is_playing(),
            last_failure: self.playback.last_failure().map(str::to_owned),
        };
        let now = snapshot.now_playing();
        if let Ok(mut shared) = self.shared.lock() {
            *shared = snapshot;
        }

        for surface in &mut self.surfaces {
            surface.refresh(&now);
        }

        let Ok(mut subs) = self.subscribers.lock() else {
            return;
        };
        let signals: Vec<Signal> = outcome
            .queue
            .into_iter()
            .map(Signal::Queue)
            .chain(std::iter::once(Signal::StateChanged))
            .collect();
        subs.retain(|tx| signals.iter().all(|s| tx.send(*s).is_ok()));
    }
}
