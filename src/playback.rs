//! Playback lifecycle on top of an external decoding engine.
//!
//! The engine is asynchronous: `submit` returns right away and the outcome
//! comes back later as an [`EngineEvent`] stamped with the [`Generation`] of
//! the submission. [`PlaybackController`] drops anything stamped with an
//! older generation.

mod controller;
mod engine;
mod sink;
mod types;

pub use controller::PlaybackController;
pub use engine::{DecodingEngine, EngineError, EngineEvents};
pub use sink::RodioEngine;
pub use types::{EngineEvent, Generation, PlaybackState};

#[cfg(test)]
pub(crate) mod fake;
