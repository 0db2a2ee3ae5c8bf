//! `rodio` implementation of [`DecodingEngine`].
//!
//! Opening and probing a file happens on a short-lived helper thread. The
//! decoded source is parked in a slot keyed by generation until `start`
//! wraps it in a `Sink`.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use super::engine::{DecodingEngine, EngineError, EngineEvents};
use super::types::{EngineEvent, Generation};

type Decoded = Decoder<BufReader<File>>;

struct Prepared {
    generation: Generation,
    source: Decoded,
}

pub struct RodioEngine {
    stream: OutputStream,
    events: EngineEvents,
    /// Generation of the live submission; 0 once released.
    live: Arc<AtomicU64>,
    slot: Arc<Mutex<Option<Prepared>>>,
    sink: Option<Sink>,
    completion_sent: bool,
}

impl RodioEngine {
    /// Open the default output device. Must be called on the thread that will
    /// own the engine, since the output stream cannot move between threads.
    pub fn open(events: EngineEvents) -> Result<Self, EngineError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio prints to stderr when the stream drops, which garbles the TUI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            events,
            live: Arc::new(AtomicU64::new(0)),
            slot: Arc::new(Mutex::new(None)),
            sink: None,
            completion_sent: false,
        })
    }

    fn live_generation(&self) -> Generation {
        Generation(self.live.load(Ordering::SeqCst))
    }
}

fn decode(path: &Path) -> Result<Decoded, EngineError> {
    let file = File::open(path).map_err(|source| EngineError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Decoder::new(BufReader::new(file)).map_err(|source| EngineError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

impl DecodingEngine for RodioEngine {
    fn submit(&mut self, locator: &Path, generation: Generation) -> Result<(), EngineError> {
        self.release();
        if !locator.is_file() {
            return Err(EngineError::Missing {
                path: locator.to_path_buf(),
            });
        }

        self.live.store(generation.0, Ordering::SeqCst);

        let path: PathBuf = locator.to_path_buf();
        let live = Arc::clone(&self.live);
        let slot = Arc::clone(&self.slot);
        let events = self.events.clone();
        thread::spawn(move || match decode(&path) {
            Ok(source) => {
                {
                    let Ok(mut slot) = slot.lock() else {
                        return;
                    };
                    if live.load(Ordering::SeqCst) != generation.0 {
                        debug!(%generation, path = %path.display(), "discarding superseded decode");
                        return;
                    }
                    *slot = Some(Prepared { generation, source });
                }
                events.emit(EngineEvent::Prepared { generation });
            }
            Err(err) => {
                warn!(%generation, error = %err, "decode failed");
                events.emit(EngineEvent::Failed {
                    generation,
                    reason: err.to_string(),
                });
            }
        });

        Ok(())
    }

    fn start(&mut self) -> Result<(), EngineError> {
        if let Some(sink) = &self.sink {
            sink.play();
            return Ok(());
        }

        let live = self.live_generation();
        let prepared = self
            .slot
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .filter(|p| p.generation == live)
            .ok_or(EngineError::NotPrepared)?;

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(prepared.source);
        sink.play();
        self.sink = Some(sink);
        self.completion_sent = false;
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn release(&mut self) {
        self.live.store(0, Ordering::SeqCst);
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.completion_sent = false;
    }

    fn poll(&mut self) -> Option<EngineEvent> {
        let sink = self.sink.as_ref()?;
        if self.completion_sent || sink.is_paused() || !sink.empty() {
            return None;
        }
        self.completion_sent = true;
        Some(EngineEvent::Completed {
            generation: self.live_generation(),
        })
    }
}
