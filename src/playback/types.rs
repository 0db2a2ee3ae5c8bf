//! Small value types shared by the controller and engines.

use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing loaded.
    #[default]
    Idle,
    /// Submitted to the engine, waiting for `Prepared`.
    Preparing,
    /// Prepared but not started (no auto-play, or focus was denied).
    Ready,
    Playing,
    Paused,
    /// The last load failed. Stays here until the next load.
    Failed,
}

impl PlaybackState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Preparing => "loading",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Failed => "failed",
        }
    }
}

/// Stamp for one engine submission. Starts at 0, so the first real
/// submission is 1 and 0 never matches a live instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Prepared { generation: Generation },
    Failed { generation: Generation, reason: String },
    Completed { generation: Generation },
}

impl EngineEvent {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Prepared { generation }
            | Self::Failed { generation, .. }
            | Self::Completed { generation } => *generation,
        }
    }
}
