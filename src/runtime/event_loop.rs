use std::sync::mpsc::Receiver;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MediaKeyCode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::{App, Popup};
use crate::config;
use crate::mpris::ControlCmd;
use crate::session::{Command, SessionHandle, Signal};
use crate::transport::{self, KeyAction, MediaKey};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: pulls session snapshots, draws, and turns
/// input into session commands. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    session: &SessionHandle,
    signals: &Receiver<Signal>,
    control_rx: &Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<()> {
    loop {
        // Any signal means the snapshot moved on; one fresh copy covers a burst.
        if signals.try_iter().count() > 0 {
            app.set_snapshot(session.snapshot());
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, session) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let KeyCode::Media(code) = key.code {
                    handle_media_key(code, key.kind, session);
                    continue;
                }
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, session, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Commands arriving from MPRIS. Returns `true` when the app should quit.
fn handle_control_cmd(cmd: ControlCmd, session: &SessionHandle) -> bool {
    match cmd {
        ControlCmd::Quit => true,
        ControlCmd::Key(key) => {
            if let Some(command) = transport::map_key(key, KeyAction::Down) {
                session.send(command);
            }
            false
        }
    }
}

fn handle_media_key(code: MediaKeyCode, kind: KeyEventKind, session: &SessionHandle) {
    let key = match code {
        MediaKeyCode::Play => MediaKey::Play,
        MediaKeyCode::Pause => MediaKey::Pause,
        MediaKeyCode::PlayPause => MediaKey::PlayPause,
        MediaKeyCode::Stop => MediaKey::Stop,
        MediaKeyCode::TrackNext => MediaKey::Next,
        MediaKeyCode::TrackPrevious => MediaKey::Previous,
        other => {
            debug!(?other, "unhandled media key");
            return;
        }
    };
    let action = match kind {
        KeyEventKind::Release => KeyAction::Up,
        KeyEventKind::Press | KeyEventKind::Repeat => KeyAction::Down,
    };
    if let Some(command) = transport::map_key(key, action) {
        session.send(command);
    }
}

fn handle_popup_key(key: KeyEvent, app: &mut App) {
    let naming = matches!(app.popup, Popup::NewPlaylist { .. });
    match key.code {
        KeyCode::Esc => app.cancel_popup(),
        KeyCode::Enter if naming => app.confirm_new_playlist(),
        KeyCode::Enter => app.confirm_pick(),
        KeyCode::Backspace if naming => app.pop_input(),
        KeyCode::Char(c) if naming && !c.is_control() => app.push_input(c),
        KeyCode::Char('j') | KeyCode::Down => app.picker_next(),
        KeyCode::Char('k') | KeyCode::Up => app.picker_prev(),
        _ => {}
    }
}

/// Returns `true` when the app should quit.
fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    session: &SessionHandle,
    state: &mut EventLoopState,
) -> bool {
    if app.has_popup() {
        state.pending_gg = false;
        handle_popup_key(key, app);
        return false;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }
    app.message = None;

    let command: Option<Command> = match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.select_first();
            } else {
                state.pending_gg = true;
            }
            None
        }
        KeyCode::Char('G') => {
            app.select_last();
            None
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.next();
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.prev();
            None
        }
        KeyCode::Tab => {
            app.toggle_pane();
            None
        }
        KeyCode::Enter => app.activate(),
        KeyCode::Char('a') => app.add_to_queue(),
        KeyCode::Char('i') => app.insert_after_active(),
        KeyCode::Char('d') => app.remove_from_queue(),
        KeyCode::Char('J') => app.move_in_queue(1),
        KeyCode::Char('K') => app.move_in_queue(-1),
        KeyCode::Char('p') | KeyCode::Char(' ') => Some(MediaKey::PlayPause.command()),
        KeyCode::Char('l') => Some(MediaKey::Next.command()),
        KeyCode::Char('h') => Some(MediaKey::Previous.command()),
        KeyCode::Char('s') => Some(MediaKey::Stop.command()),
        KeyCode::Char('1') => {
            app.show_songs();
            None
        }
        KeyCode::Char('2') => {
            app.show_playlists();
            None
        }
        KeyCode::Char('N') => {
            app.begin_new_playlist();
            None
        }
        KeyCode::Char('P') => {
            app.begin_add_to_playlist();
            None
        }
        KeyCode::Backspace => {
            app.close_playlist();
            None
        }
        _ => None,
    };

    if let Some(command) = command {
        session.send(command);
    }
    false
}
