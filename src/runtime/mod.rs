use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::focus::DesktopFocus;
use crate::mpris::{ControlCmd, spawn_mpris};
use crate::playback::{DecodingEngine, RodioEngine};
use crate::session::{self, NowPlayingSurface, SessionSetup};

mod event_loop;
mod settings;
mod startup;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "encore", version, about = "A queue-first terminal music player")]
pub struct Args {
    /// Music directory to scan (defaults to the current directory)
    pub dir: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub dump_config: bool,

    /// Write log files here instead of the configured directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

pub fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let (settings, settings_warning) = settings::load_settings();

    if args.dump_config {
        print!("{}", toml::to_string_pretty(&settings)?);
        return Ok(());
    }

    let _log_guard = startup::init_logging(&settings, args.log_dir.clone())?;
    if let Some(msg) = settings_warning {
        warn!("{msg}");
    }

    let dir = match args.dir {
        Some(dir) => dir,
        None => env::current_dir().context("resolving current directory")?,
    };

    let tracks = startup::scan_library(&dir, &settings);
    let playlists = startup::open_playlists(&settings);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mut surfaces: Vec<Box<dyn NowPlayingSurface>> = Vec::new();
    if settings.mpris.enabled {
        surfaces.push(Box::new(spawn_mpris(&settings.mpris, control_tx)));
    }

    let session = session::spawn(
        SessionSetup {
            library: tracks.clone(),
            focus: Box::new(DesktopFocus),
            surfaces,
            poll_interval: Duration::from_millis(settings.playback.poll_interval_ms),
        },
        |events| Ok(Box::new(RodioEngine::open(events)?) as Box<dyn DecodingEngine>),
    )
    .context("starting playback session")?;
    let signals = session.subscribe();

    let mut app = App::new(tracks, playlists);
    app.set_current_dir(dir.display().to_string());
    app.set_snapshot(session.snapshot());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: anyhow::Result<()> = (|| {
        let mut state = event_loop::EventLoopState::default();

        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &session,
            &signals,
            &control_rx,
            &mut state,
        )
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    session.shutdown();
    info!("shut down");

    run_result
}
