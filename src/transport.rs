//! External transport buttons: headset hooks, Bluetooth remotes, desktop
//! media keys and MPRIS method calls all end up here.

use crate::session::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKey {
    HeadsetHook,
    PlayPause,
    Play,
    Pause,
    Next,
    Previous,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
}

impl MediaKey {
    pub fn command(self) -> Command {
        match self {
            Self::HeadsetHook | Self::PlayPause => Command::TogglePlayPause,
            Self::Play => Command::Play,
            Self::Pause => Command::Pause,
            Self::Next => Command::Next,
            Self::Previous => Command::Previous,
            Self::Stop => Command::Stop,
        }
    }
}

/// Only key-down acts; the matching key-up is swallowed.
pub fn map_key(key: MediaKey, action: KeyAction) -> Option<Command> {
    match action {
        KeyAction::Down => Some(key.command()),
        KeyAction::Up => None,
    }
}
