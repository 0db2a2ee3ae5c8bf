use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::focus::{AudioFocus, FocusService};
use crate::library::Track;
use crate::playback::{DecodingEngine, EngineError, EngineEvents};

use super::actor::{SessionCore, Subscribers};
use super::{NowPlayingSurface, SessionMsg, SessionSnapshot, Signal};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to start decoding engine: {0}")]
    Engine(#[from] EngineError),
    #[error("failed to spawn session thread: {0}")]
    Thread(#[from] io::Error),
    #[error("session thread exited during startup")]
    Exited,
}

pub struct SessionSetup {
    pub library: Vec<Track>,
    pub focus: Box<dyn FocusService + Send>,
    pub surfaces: Vec<Box<dyn NowPlayingSurface>>,
    /// Idle tick; the engine is polled for end-of-stream this often.
    pub poll_interval: Duration,
}

/// Client side of the session: a mailbox sender plus read-only copies.
pub struct SessionHandle {
    tx: Sender<SessionMsg>,
    shared: Arc<Mutex<SessionSnapshot>>,
    subscribers: Subscribers,
    join: Option<JoinHandle<()>>,
}

/// Start the session thread.
///
/// The engine is built on the session thread by `make_engine`, since audio
/// output handles generally cannot move between threads. An error from it is
/// returned here.
pub fn spawn<F>(setup: SessionSetup, make_engine: F) -> Result<SessionHandle, SessionError>
where
    F: FnOnce(EngineEvents) -> Result<Box<dyn DecodingEngine>, EngineError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<SessionMsg>();
    let shared = Arc::new(Mutex::new(SessionSnapshot::default()));
    let subscribers: Subscribers = Arc::new(Mutex::new(Vec::new()));
    let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), EngineError>>(1);

    let events_tx = tx.clone();
    let events = EngineEvents::new(move |event| {
        let _ = events_tx.send(SessionMsg::Engine(event));
    });

    let thread_shared = Arc::clone(&shared);
    let thread_subscribers = Arc::clone(&subscribers);
    let SessionSetup {
        library,
        focus,
        surfaces,
        poll_interval,
    } = setup;

    let join = thread::Builder::new()
        .name("encore-session".into())
        .spawn(move || {
            let engine = match make_engine(events) {
                Ok(engine) => {
                    let _ = ready_tx.send(Ok(()));
                    engine
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };

            let mut core = SessionCore::with_shared(
                library,
                engine,
                AudioFocus::new(focus),
                thread_shared,
                thread_subscribers,
            );
            for surface in surfaces {
                core.add_surface(surface);
            }
            core.seed_from_library();
            core.refresh();

            loop {
                match rx.recv_timeout(poll_interval) {
                    Ok(msg) => {
                        if !core.handle(msg) {
                            break;
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => core.tick(),
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!("session thread exiting");
        })?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(SessionHandle {
            tx,
            shared,
            subscribers,
            join: Some(join),
        }),
        Ok(Err(err)) => {
            let _ = join.join();
            Err(err.into())
        }
        Err(_) => {
            let _ = join.join();
            Err(SessionError::Exited)
        }
    }
}

impl SessionHandle {
    /// Queue a message. Returns `false` if the session is gone.
    pub fn send(&self, msg: impl Into<SessionMsg>) -> bool {
        let ok = self.tx.send(msg.into()).is_ok();
        if !ok {
            warn!("session mailbox closed");
        }
        ok
    }

    /// A raw mailbox sender for producers living on other threads (MPRIS,
    /// a host focus listener).
    pub fn sender(&self) -> Sender<SessionMsg> {
        self.tx.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn current_track(&self) -> Option<Track> {
        self.shared.lock().ok().and_then(|s| s.current.clone())
    }

    pub fn queue_snapshot(&self) -> Vec<Track> {
        self.shared
            .lock()
            .map(|s| s.queue.clone())
            .unwrap_or_default()
    }

    pub fn is_playing(&self) -> bool {
        self.shared.lock().map(|s| s.is_playing).unwrap_or(false)
    }

    /// Every signal published after this call is delivered to the returned
    /// receiver. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> mpsc::Receiver<Signal> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }

    /// Release the engine, give up focus and wait for the thread to finish.
    pub fn shutdown(mut self) {
        self.stop_thread();
    }

    fn stop_thread(&mut self) {
        let Some(join) = self.join.take() else {
            return;
        };
        let _ = self.tx.send(SessionMsg::Shutdown);
        if join.join().is_err() {
            error!("session thread panicked");
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.stop_thread();
    }
}
