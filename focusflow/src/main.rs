use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use directories::ProjectDirs;
use focusflow_core::SystemClock;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tachyonfx::{fx, EffectManager, Motion};
use tokio::sync::{mpsc, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod boot;
mod config;
mod ipc;
mod listeners;
mod player;
mod quote;
mod radio;
mod ticker;
mod ui;

use app::{App, SharedApp, UiCue};
use player::{MediaPlayer, MpvPlayer, SilentPlayer};
use quote::{GeminiQuotes, OfflineQuotes, QuoteSource};

const FRAME: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "focusflow", version, about = "Retro Pomodoro timer with a lofi radio")]
struct Args {
    /// Path to a focusflow.toml config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run without starting the media player
    #[arg(long)]
    no_audio: bool,

    /// Go straight to the main view
    #[arg(long)]
    skip_boot: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config = config::load_config(args.config.as_deref())?;
    info!("focusflow starting");

    let player: Box<dyn MediaPlayer> = if args.no_audio || !config.player.enabled {
        Box::new(SilentPlayer)
    } else {
        Box::new(MpvPlayer::new(
            config.player.command.clone(),
            config.player.volume,
        ))
    };
    let quotes: Arc<dyn QuoteSource> = if config.quote.enabled {
        Arc::new(GeminiQuotes::from_config(&config.quote))
    } else {
        Arc::new(OfflineQuotes)
    };

    let (app, channels) = App::new(config, player, Arc::new(SystemClock), args.skip_boot);
    let app: SharedApp = Arc::new(Mutex::new(app));

    let socket_path = Path::new(focusflow_ipc::SOCKET_PATH);
    let owns_socket = match ipc::server::bind(socket_path).await {
        Ok(listener) => {
            tokio::spawn(ipc::server::serve(app.clone(), listener));
            true
        }
        Err(e) => {
            error!("Control socket unavailable: {:#}", e);
            false
        }
    };
    ticker::spawn(app.clone(), channels.ticker);
    spawn_quote_fetcher(app.clone(), quotes, channels.quote_requests);
    app.lock().await.request_quote();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    if owns_socket {
        let _ = std::fs::remove_file(socket_path);
    }

    if let Err(err) = res {
        error!("Exited with error: {:?}", err);
        eprintln!("Error: {:?}", err);
    }
    info!("focusflow stopped");

    Ok(())
}

/// Logs go to a file because the terminal belongs to the UI.
fn init_logging() {
    let Some(file) = open_log_file() else {
        return;
    };
    let filter =
        EnvFilter::try_from_env("FOCUSFLOW_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn open_log_file() -> Option<std::fs::File> {
    let dirs = ProjectDirs::from("com", "pabloagn", "FocusFlow")?;
    let dir = dirs.data_dir();
    std::fs::create_dir_all(dir).ok()?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("focusflow.log"))
        .ok()
}

fn spawn_quote_fetcher(
    app: SharedApp,
    source: Arc<dyn QuoteSource>,
    mut requests: mpsc::UnboundedReceiver<()>,
) {
    tokio::spawn(async move {
        while requests.recv().await.is_some() {
            let outcome = source.fetch().await;
            let mut app = app.lock().await;
            let mut rng = rand::thread_rng();
            app.set_quote(outcome, &mut rng);
        }
    });
}

fn spawn_event_reader(tx: mpsc::Sender<Event>) {
    tokio::task::spawn_blocking(move || loop {
        if tx.is_closed() {
            break;
        }
        match event::poll(FRAME) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(ev).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {}
            Err(_) => break,
        }
    });
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: SharedApp) -> Result<()> {
    let (event_tx, mut events) = mpsc::channel::<Event>(64);
    spawn_event_reader(event_tx);

    let mut frames = tokio::time::interval(FRAME);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut effects: EffectManager<u32> = EffectManager::default();
    let mut layout = ui::UiLayout::default();
    let mut last_frame = Instant::now();

    loop {
        tokio::select! {
            _ = frames.tick() => {
                let mut app = app.lock().await;
                app.boot_step();
                app.poll_radio();
                app.update_listeners(Instant::now(), &mut rand::thread_rng());
                for cue in app.take_cues() {
                    match cue {
                        UiCue::ModeChanged => effects.add_effect(
                            fx::slide_in(Motion::LeftToRight, 8, 4, app.config.theme.primary, 300)
                                .with_area(layout.timer),
                        ),
                        UiCue::StationChanged => {
                            effects.add_effect(fx::coalesce(300).with_area(layout.radio))
                        }
                        UiCue::Bell => {
                            let mut out = io::stdout();
                            if let Err(e) = out.write_all(b"\x07").and_then(|_| out.flush()) {
                                warn!("Failed to ring terminal bell: {}", e);
                            }
                        }
                    }
                }

                let elapsed = last_frame.elapsed();
                last_frame = Instant::now();
                let elapsed_ms = u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX);
                terminal.draw(|f| {
                    layout = ui::draw(f, &app);
                    let area = f.area();
                    effects.process_effects(
                        tachyonfx::Duration::from_millis(elapsed_ms),
                        f.buffer_mut(),
                        area,
                    );
                })?;
            }
            event = events.recv() => {
                let Some(event) = event else {
                    return Ok(());
                };
                if let Event::Key(key) = event {
                    if key.kind == KeyEventKind::Press {
                        let mut app = app.lock().await;
                        app.handle_key(key.code);
                        if app.should_quit {
                            info!("Quit requested");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
