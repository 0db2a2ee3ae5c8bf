//! encore: a queue-first terminal music player.
//!
//! All playback state lives in one session actor ([`session`]); the TUI,
//! MPRIS and media keys only ever send it [`session::Command`]s.

pub mod app;
pub mod config;
pub mod focus;
pub mod library;
pub mod mpris;
pub mod playback;
pub mod playlist;
pub mod queue;
pub mod runtime;
pub mod selection;
pub mod session;
pub mod transport;
pub mod ui;
