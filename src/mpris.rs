//! MPRIS2 D-Bus service: the now-playing surface desktop shells, lock
//! screens and headset daemons talk to.
//!
//! Method calls are forwarded as [`ControlCmd`]s to the UI loop, which routes
//! media keys through [`crate::transport`] like any other button.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use async_io::block_on;
use tracing::{debug, info, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::config::MprisSettings;
use crate::playback::PlaybackState;
use crate::session::{NOTHING_LOADED, NowPlaying, NowPlayingSurface};
use crate::transport::MediaKey;

const MPRIS_PATH: &str = "/org/mpris/MediaPlayer2";
const NO_TRACK: &str = "/org/mpris/MediaPlayer2/TrackList/NoTrack";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Key(MediaKey),
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackState,
    title: Option<String>,
    /// Object path naming the loaded track.
    track_id: Option<String>,
}

#[derive(Clone)]
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

impl MprisHandle {
    pub fn set_now_playing(&self, now: &NowPlaying) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = now.state;
            s.title = now.track_id.map(|_| now.title.clone());
            s.track_id = now.track_id.map(|id| format!("/org/encore/track/{id}"));
        }
        let _ = self.notify.send(());
    }
}

impl NowPlayingSurface for MprisHandle {
    fn refresh(&mut self, now: &NowPlaying) {
        self.set_now_playing(now);
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {}

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "encore"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

impl PlayerIface {
    fn key(&self, key: MediaKey) {
        let _ = self.tx.send(ControlCmd::Key(key));
    }
}

fn status_str(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused | PlaybackState::Ready | PlaybackState::Preparing => "Paused",
        PlaybackState::Idle | PlaybackState::Failed => "Stopped",
    }
}

fn owned(value: Value<'_>) -> Option<OwnedValue> {
    OwnedValue::try_from(value).ok()
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        self.key(MediaKey::Next);
    }

    fn previous(&self) {
        self.key(MediaKey::Previous);
    }

    fn play(&self) {
        self.key(MediaKey::Play);
    }

    fn pause(&self) {
        self.key(MediaKey::Pause);
    }

    fn play_pause(&self) {
        self.key(MediaKey::PlayPause);
    }

    fn stop(&self) {
        self.key(MediaKey::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        self.state
            .lock()
            .map(|s| status_str(s.playback))
            .unwrap_or("Stopped")
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let track_id = s.track_id.as_deref().unwrap_or(NO_TRACK);
        if let Some(value) = ObjectPath::try_from(track_id)
            .ok()
            .and_then(|p| owned(Value::from(p)))
        {
            map.insert("mpris:trackid".to_string(), value);
        }

        let title = s.title.clone().unwrap_or_else(|| NOTHING_LOADED.to_string());
        if let Some(value) = owned(Value::from(title)) {
            map.insert("xesam:title".to_string(), value);
        }
        map
    }
}

/// Register the service on the session bus. Failures are logged and leave
/// the app running without MPRIS.
pub fn spawn_mpris(settings: &MprisSettings, tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();
    let bus_name = format!("org.mpris.MediaPlayer2.{}", settings.bus_name);

    let state_for_thread = state.clone();
    let spawned = thread::Builder::new()
        .name("encore-mpris".into())
        .spawn(move || {
            let Some(connection) = block_on(register(&bus_name, tx, state_for_thread)) else {
                return;
            };
            info!(%bus_name, "MPRIS service registered");
            forward_changes(&connection, notify_rx);
        });
    if let Err(e) = spawned {
        warn!("MPRIS: failed to spawn service thread: {e}");
    }

    MprisHandle {
        state,
        notify: notify_tx,
    }
}

async fn register(
    bus_name: &str,
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
) -> Option<Connection> {
    let connection = match Connection::session().await {
        Ok(c) => c,
        Err(e) => {
            warn!("MPRIS: failed to connect to session bus: {e}");
            return None;
        }
    };

    if let Err(e) = connection.request_name(bus_name).await {
        warn!("MPRIS: failed to acquire name {bus_name}: {e}");
        return None;
    }

    let object_server = connection.object_server();
    if let Err(e) = object_server.at(MPRIS_PATH, RootIface { tx: tx.clone() }).await {
        warn!("MPRIS: failed to register root iface: {e}");
        return None;
    }
    if let Err(e) = object_server.at(MPRIS_PATH, PlayerIface { tx, state }).await {
        warn!("MPRIS: failed to register player iface: {e}");
        return None;
    }

    Some(connection)
}

/// Emit PropertiesChanged for every burst of refreshes until the handle is
/// dropped.
fn forward_changes(connection: &Connection, notify: Receiver<()>) {
    while notify.recv().is_ok() {
        // Coalesce a burst into one signal.
        while notify.try_recv().is_ok() {}
        if let Err(e) = block_on(emit_changes(connection)) {
            debug!("MPRIS: failed to emit property change: {e}");
        }
    }
}

async fn emit_changes(connection: &Connection) -> zbus::Result<()> {
    let iface_ref = connection
        .object_server()
        .interface::<_, PlayerIface>(MPRIS_PATH)
        .await?;
    let iface = iface_ref.get().await;
    iface.playback_status_changed(iface_ref.signal_emitter()).await?;
    iface.metadata_changed(iface_ref.signal_emitter()).await?;
    Ok(())
}
