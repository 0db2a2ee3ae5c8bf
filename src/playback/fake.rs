//! Scriptable engine for deterministic tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::engine::{DecodingEngine, EngineError};
use super::types::{EngineEvent, Generation};

#[derive(Debug, Default)]
pub(crate) struct EngineLog {
    pub submitted: Vec<(PathBuf, Generation)>,
    pub starts: usize,
    pub pauses: usize,
    pub releases: usize,
    /// When set, the next submit fails synchronously.
    pub reject_next_submit: bool,
    /// Handed out by the next `poll`.
    pub pending_poll: Option<EngineEvent>,
}

impl EngineLog {
    pub fn last_generation(&self) -> Option<Generation> {
        self.submitted.last().map(|(_, g)| *g)
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeEngine {
    pub log: Arc<Mutex<EngineLog>>,
}

impl FakeEngine {
    pub fn boxed(&self) -> Box<dyn DecodingEngine> {
        Box::new(self.clone())
    }

    pub fn log(&self) -> std::sync::MutexGuard<'_, EngineLog> {
        self.log.lock().unwrap()
    }
}

impl DecodingEngine for FakeEngine {
    fn submit(&mut self, locator: &Path, generation: Generation) -> Result<(), EngineError> {
        let mut log = self.log();
        if std::mem::take(&mut log.reject_next_submit) {
            return Err(EngineError::Missing {
                path: locator.to_path_buf(),
            });
        }
        log.submitted.push((locator.to_path_buf(), generation));
        Ok(())
    }

    fn start(&mut self) -> Result<(), EngineError> {
        self.log().starts += 1;
        Ok(())
    }

    fn pause(&mut self) {
        self.log().pauses += 1;
    }

    fn release(&mut self) {
        self.log().releases += 1;
    }

    fn poll(&mut self) -> Option<EngineEvent> {
        self.log().pending_poll.take()
    }
}
