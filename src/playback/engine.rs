use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::types::{EngineEvent, Generation};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to open audio output: {0}")]
    Output(#[from] rodio::StreamError),

    #[error("{}: no such file", path.display())]
    Missing { path: PathBuf },

    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },

    #[error("nothing prepared to start")]
    NotPrepared,
}

/// Where an engine delivers its asynchronous results. Cheap to clone into
/// worker threads.
#[derive(Clone)]
pub struct EngineEvents(Arc<dyn Fn(EngineEvent) + Send + Sync>);

impl EngineEvents {
    pub fn new(deliver: impl Fn(EngineEvent) + Send + Sync + 'static) -> Self {
        Self(Arc::new(deliver))
    }

    pub fn emit(&self, event: EngineEvent) {
        (self.0)(event)
    }
}

impl fmt::Debug for EngineEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EngineEvents(..)")
    }
}

/// One decoding engine instance slot.
///
/// `submit` must not block on decoding. Its outcome arrives later as
/// `Prepared` or `Failed` carrying the same generation. An `Err` from
/// `submit` means the submission never started and no event will follow.
pub trait DecodingEngine {
    fn submit(&mut self, locator: &Path, generation: Generation) -> Result<(), EngineError>;

    /// Begin or continue output of the prepared instance.
    fn start(&mut self) -> Result<(), EngineError>;

    fn pause(&mut self);

    /// Drop the live instance. Results of earlier submissions that are still
    /// in flight must not revive it.
    fn release(&mut self);

    /// Called on every idle tick of the session. Engines without a completion
    /// callback detect end-of-stream here.
    fn poll(&mut self) -> Option<EngineEvent> {
        None
    }
}
