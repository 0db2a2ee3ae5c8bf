//! UI rendering for the terminal user interface.
//!
//! Everything here reads the `App` model and the session snapshot it holds;
//! nothing in this module changes state.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, LibraryView, Pane, Popup};
use crate::config::UiSettings;
use crate::session::NOTHING_LOADED;

const CONTROLS: &[(&str, &str)] = &[
    ("j/k", "up/down"),
    ("gg/G", "top/bottom"),
    ("tab", "switch pane"),
    ("enter", "play/open"),
    ("a", "queue"),
    ("i", "play next"),
    ("d", "unqueue"),
    ("J/K", "move"),
    ("space/p", "play/pause"),
    ("h/l", "prev/next"),
    ("s", "stop"),
    ("1/2", "songs/playlists"),
    ("N", "new playlist"),
    ("P", "add to playlist"),
    ("bksp", "back"),
    ("q", "quit"),
];

fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// The slice of a `total`-long list to draw in `height` rows so that
/// `selected` stays roughly centered. Returns `(start, end, selected - start)`.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize, usize) {
    let selected = selected.min(total.saturating_sub(1));
    if total <= height || height == 0 {
        return (0, total, selected);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

fn status_text(app: &App) -> String {
    let snap = &app.snapshot;
    let mut parts: Vec<String> = Vec::new();

    let song = snap
        .current
        .as_ref()
        .map_or(NOTHING_LOADED, |t| t.display_name.as_str());
    parts.push(format!("Song: {song}"));
    parts.push(snap.state.label().to_string());
    parts.push(format!("Queue: {}", snap.queue.len()));

    if let Some(err) = &snap.last_failure {
        parts.push(format!("Error: {err}"));
    }
    if let Some(msg) = &app.message {
        parts.push(msg.clone());
    }
    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {dir}"));
    }

    parts.join(" • ")
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().add_modifier(Modifier::BOLD))
    } else {
        block
    }
}

fn render_list(frame: &mut Frame, area: Rect, rows: Vec<String>, selected: usize, block: Block<'_>, focused: bool) {
    let height = area.height.saturating_sub(2) as usize;
    let (start, end, pos) = visible_window(rows.len(), height, selected);
    let total = rows.len();

    let items: Vec<ListItem> = rows
        .into_iter()
        .skip(start)
        .take(end - start)
        .map(ListItem::new)
        .collect();

    let mut list = List::new(items).block(block);
    if focused {
        list = list
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
    }
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(pos));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_queue(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app
        .snapshot
        .queue
        .iter()
        .enumerate()
        .map(|(i, t)| {
            if i == 0 {
                format!("▶ {}", t.display_name)
            } else {
                format!("{i:>2} {}", t.display_name)
            }
        })
        .collect();
    let focused = app.pane == Pane::Queue;
    let block = pane_block(" queue ".to_string(), focused);
    render_list(frame, area, rows, app.queue_selected, block, focused);
}

fn draw_library(frame: &mut Frame, app: &App, area: Rect) {
    let (rows, selected): (Vec<String>, usize) = match app.view {
        LibraryView::Songs => (
            app.tracks.iter().map(|t| t.display_name.clone()).collect(),
            app.song_selected,
        ),
        LibraryView::Playlists => (
            app.playlists
                .book()
                .iter()
                .map(|p| format!("{} ({})", p.name, p.len()))
                .collect(),
            app.playlist_selected,
        ),
        LibraryView::PlaylistDetail(_) => (
            app.playlist_tracks()
                .iter()
                .map(|t| t.display_name.clone())
                .collect(),
            app.detail_selected,
        ),
    };
    let focused = app.pane == Pane::Library;
    let block = pane_block(format!(" {} ", app.library_title().to_lowercase()), focused);
    render_list(frame, area, rows, selected, block, focused);
}

fn draw_popup(frame: &mut Frame, app: &App, area: Rect) {
    match &app.popup {
        Popup::None => {}
        Popup::NewPlaylist { input } => {
            let popup_area = centered_rect_sized(48, 5, area);
            frame.render_widget(Clear, popup_area);
            let paragraph = Paragraph::new(format!("{input}_")).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" new playlist (enter saves, esc cancels) ")
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 1,
                        bottom: 0,
                    }),
            );
            frame.render_widget(paragraph, popup_area);
        }
        Popup::PickPlaylist { track, selected } => {
            let rows: Vec<String> = app.playlists.book().iter().map(|p| p.name.clone()).collect();
            let height = (rows.len() as u16).saturating_add(2).max(5);
            let popup_area = centered_rect_sized(48, height, area);
            frame.render_widget(Clear, popup_area);
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" add \"{}\" to ", track.display_name));
            render_list(frame, popup_area, rows, *selected, block, true);
        }
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" encore ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let mut status = Paragraph::new(status_text(app))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    if app.snapshot.is_playing {
        status = status.bold();
    }
    frame.render_widget(status, chunks[1]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[2]);
    draw_queue(frame, app, panes[0]);
    draw_library(frame, app, panes[1]);
    draw_popup(frame, app, chunks[2]);

    let footer = Paragraph::new(controls_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::Track;
    use crate::playlist::{PlaylistStore, Playlists};
    use crate::session::SessionSnapshot;
    use ratatui::{Terminal, backend::TestBackend};
    use std::path::PathBuf;
    use std::time::SystemTime;

    #[test]
    fn window_keeps_selection_centered_and_in_bounds() {
        assert_eq!(visible_window(5, 10, 3), (0, 5, 3));
        assert_eq!(visible_window(100, 10, 50), (45, 55, 5));
        assert_eq!(visible_window(100, 10, 99), (90, 100, 9));
        assert_eq!(visible_window(0, 10, 0), (0, 0, 0));
    }

    #[test]
    fn draws_queue_library_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let track = Track::new(
            PathBuf::from("/music/song.mp3"),
            "Band - Song".into(),
            SystemTime::UNIX_EPOCH,
        );
        let playlists = Playlists::open(PlaylistStore::new(dir.path().join("p.json")));
        let mut app = App::new(vec![track.clone()], playlists);
        app.set_snapshot(SessionSnapshot {
            current: Some(track.clone()),
            queue: vec![track],
            ..SessionSnapshot::default()
        });

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal
            .draw(|f| draw(f, &app, &UiSettings::default()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Song: Band - Song"));
        assert!(text.contains("queue"));
        assert!(text.contains("songs"));
    }
}
