//! Exclusive audio focus arbitration.
//!
//! The host grants or denies focus synchronously and reports later losses
//! and gains asynchronously. Those reports arrive here (via the session
//! mailbox) and are turned into a reaction for the playback controller.

use tracing::{debug, info};

/// What the audio is going to be used for. Passed through to the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UsageHint {
    Music,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FocusGrant {
    Granted,
    Denied,
}

impl FocusGrant {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Host-originated focus notifications.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FocusChange {
    PermanentLoss,
    TransientLoss,
    /// Treated exactly like `TransientLoss`: playback pauses instead of ducking.
    TransientLossCanDuck,
    Regained,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum FocusState {
    #[default]
    Unowned,
    Owned,
    TransientlyLost,
}

/// What the arbitrator wants the playback controller to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FocusReaction {
    None,
    Pause,
    Resume,
}

/// The host side of the focus protocol.
pub trait FocusService {
    fn request(&mut self, usage: UsageHint) -> FocusGrant;
    fn abandon(&mut self);
}

/// Desktop sound servers mix every client, so there is no exclusive focus
/// to lose: every request is granted and no changes are ever reported.
#[derive(Debug, Default)]
pub struct DesktopFocus;

impl FocusService for DesktopFocus {
    fn request(&mut self, _usage: UsageHint) -> FocusGrant {
        FocusGrant::Granted
    }

    fn abandon(&mut self) {}
}

pub struct AudioFocus {
    service: Box<dyn FocusService + Send>,
    state: FocusState,
    resume_intent: bool,
}

impl AudioFocus {
    pub fn new(service: Box<dyn FocusService + Send>) -> Self {
        Self {
            service,
            state: FocusState::Unowned,
            resume_intent: false,
        }
    }

    pub fn state(&self) -> FocusState {
        self.state
    }

    pub fn resume_intent(&self) -> bool {
        self.resume_intent
    }

    /// Ask for focus. A denial means "do not start playback now".
    pub fn request_focus(&mut self) -> FocusGrant {
        if self.state == FocusState::Owned {
            return FocusGrant::Granted;
        }
        let grant = self.service.request(UsageHint::Music);
        if grant.is_granted() {
            self.state = FocusState::Owned;
        } else {
            debug!(state = ?self.state, "audio focus denied");
        }
        grant
    }

    pub fn abandon_focus(&mut self) {
        if self.state != FocusState::Unowned {
            self.service.abandon();
        }
        self.state = FocusState::Unowned;
    }

    /// A pause the user asked for: give focus back and forget any pending
    /// auto-resume.
    pub fn on_user_pause(&mut self) {
        self.resume_intent = false;
        self.abandon_focus();
    }

    pub fn on_focus_change(&mut self, change: FocusChange, playing: bool) -> FocusReaction {
        info!(?change, playing, "audio focus changed");
        match change {
            FocusChange::PermanentLoss => {
                self.resume_intent = false;
                self.abandon_focus();
                if playing {
                    FocusReaction::Pause
                } else {
                    FocusReaction::None
                }
            }
            FocusChange::TransientLoss | FocusChange::TransientLossCanDuck => {
                // Only focus actually held can be lost.
                if self.state == FocusState::Owned {
                    self.state = FocusState::TransientlyLost;
                }
                if playing {
                    self.resume_intent = true;
                    FocusReaction::Pause
                } else {
                    FocusReaction::None
                }
            }
            // Ownership is only taken back through `request_focus`, so a
            // resume still has to be granted by the host.
            FocusChange::Regained => {
                if self.resume_intent {
                    self.resume_intent = false;
                    FocusReaction::Resume
                } else {
                    FocusReaction::None
                }
            }
        }
    }
}
