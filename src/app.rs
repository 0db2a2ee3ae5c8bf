//! Application module: the TUI-side model.
//!
//! `App` holds what the terminal UI shows (panes, library views, popups) and
//! the last session snapshot. It never mutates the queue itself; user actions
//! come out as session commands.

mod model;

pub use model::*;
