use crate::boot::BootSequence;
use crate::config::Config;
use crate::listeners::Listeners;
use crate::player::MediaPlayer;
use crate::quote::{resolve_quote, QuoteOutcome};
use crate::radio::{Radio, Station};
use crossterm::event::KeyCode;
use focusflow_core::{
    next_mode, Clock, SessionCompleted, SessionMode, SessionTimer,
};
use focusflow_ipc::{Command, Response, StatusReport};
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{info, warn};

pub type SharedApp = Arc<Mutex<App>>;

const VOLUME_STEP: i16 = 5;

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppMode {
    #[default]
    Boot,
    Normal,
    ShowHelp,
    /// Alert for the session that just ended; the next one is already loaded.
    SessionOver(SessionMode),
}

/// Things the terminal loop should render or emit outside the widget tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCue {
    ModeChanged,
    StationChanged,
    Bell,
}

/// Receiving ends the runtime wires to background tasks.
pub struct AppChannels {
    /// `true` while the countdown needs one-second ticks.
    pub ticker: watch::Receiver<bool>,
    pub quote_requests: mpsc::UnboundedReceiver<()>,
}

pub struct App {
    pub timer: SessionTimer,
    pub radio: Radio,
    pub config: Config,
    pub mode: AppMode,
    pub boot: BootSequence,
    pub quote: Option<String>,
    pub quote_visible: bool,
    pub listeners: Listeners,
    pub should_quit: bool,
    cues: Vec<UiCue>,
    ticker: watch::Sender<bool>,
    quote_requests: mpsc::UnboundedSender<()>,
}

impl App {
    pub fn new(
        config: Config,
        player: Box<dyn MediaPlayer>,
        clock: Arc<dyn Clock>,
        skip_boot: bool,
    ) -> (Self, AppChannels) {
        let (ticker, ticker_rx) = watch::channel(false);
        let (quote_requests, quote_rx) = mpsc::unbounded_channel();
        let stations: Vec<Station> = config.stations.iter().cloned().map(Station::from).collect();
        let app = Self {
            timer: SessionTimer::new(config.durations, clock),
            radio: Radio::new(stations, config.player.volume, player),
            mode: if skip_boot { AppMode::Normal } else { AppMode::Boot },
            boot: BootSequence::new(),
            quote: None,
            quote_visible: true,
            listeners: Listeners::new(Instant::now(), &mut rand::thread_rng()),
            should_quit: false,
            cues: Vec::new(),
            ticker,
            quote_requests,
            config,
        };
        let channels = AppChannels {
            ticker: ticker_rx,
            quote_requests: quote_rx,
        };
        (app, channels)
    }

    /// Arms the tick source exactly while the countdown runs.
    fn sync_ticker(&mut self) {
        let running = self.timer.is_running();
        if *self.ticker.borrow() != running {
            self.ticker.send_replace(running);
        }
    }

    pub fn ticker_armed(&self) -> bool {
        *self.ticker.borrow()
    }

    /// Returns whether the countdown actually started.
    pub fn start_timer(&mut self) -> bool {
        let was_running = self.timer.is_running();
        self.timer.start();
        let started = !was_running && self.timer.is_running();
        if started {
            info!(mode = %self.timer.mode(), "Session started");
        }
        self.sync_ticker();
        started
    }

    /// Returns whether a running countdown was paused.
    pub fn pause_timer(&mut self) -> bool {
        let was_running = self.timer.is_running();
        self.timer.pause();
        let paused = was_running && !self.timer.is_running();
        if paused {
            info!(mode = %self.timer.mode(), "Session paused");
        }
        self.sync_ticker();
        paused
    }

    pub fn toggle_timer(&mut self) {
        if self.timer.is_running() {
            self.pause_timer();
        } else {
            self.start_timer();
        }
    }

    pub fn reset_timer(&mut self) {
        self.timer.reset();
        info!(mode = %self.timer.mode(), "Session reset");
        self.sync_ticker();
    }

    pub fn switch_mode(&mut self, mode: SessionMode) {
        self.timer.switch_mode(mode);
        info!(%mode, "Switched session mode");
        self.cues.push(UiCue::ModeChanged);
        self.sync_ticker();
    }

    /// Called once per second by the tick driver.
    pub fn on_tick(&mut self) {
        if let Some(event) = self.timer.tick() {
            self.handle_completion(event);
        }
        self.sync_ticker();
    }

    fn handle_completion(&mut self, event: SessionCompleted) {
        let completed = self.timer.state().completed_work_sessions;
        let next = next_mode(event.mode, completed);
        self.timer.advance(next);
        info!(
            finished = %event.mode,
            next = %next.mode,
            completed = next.completed_work_sessions,
            "Session completed"
        );
        self.mode = AppMode::SessionOver(event.mode);
        self.cues.push(UiCue::ModeChanged);

        let (title, body) = completion_text(event.mode);
        if self.config.notifications {
            self.send_notification(title, body);
        }
        if self.config.bell {
            self.cues.push(UiCue::Bell);
        }
    }

    fn send_notification(&self, title: &str, body: &str) {
        if let Err(e) = notify_rust::Notification::new()
            .summary(title)
            .body(body)
            .appname("focusflow")
            .show()
        {
            warn!("Failed to send notification: {}", e);
        }
    }

    pub fn dismiss_alert(&mut self) {
        if matches!(self.mode, AppMode::SessionOver(_)) {
            self.mode = AppMode::Normal;
        }
    }

    pub fn next_station(&mut self) -> bool {
        let switched = self.radio.next_station();
        if switched {
            self.cues.push(UiCue::StationChanged);
        }
        switched
    }

    pub fn toggle_playback(&mut self) {
        self.radio.toggle_playback();
    }

    pub fn adjust_volume(&mut self, delta: i16) {
        self.radio.adjust_volume(delta);
    }

    /// Picks up streams that ended on their own.
    pub fn poll_radio(&mut self) {
        if self.radio.poll() {
            self.cues.push(UiCue::StationChanged);
        }
    }

    pub fn request_quote(&self) {
        if self.quote_requests.send(()).is_err() {
            warn!("Quote fetcher is not running");
        }
    }

    pub fn set_quote<R: Rng + ?Sized>(&mut self, outcome: QuoteOutcome, rng: &mut R) {
        self.quote = Some(resolve_quote(outcome, rng));
    }

    pub fn toggle_quote(&mut self) {
        self.quote_visible = !self.quote_visible;
    }

    pub fn boot_step(&mut self) {
        if self.mode == AppMode::Boot {
            self.boot.step();
        }
    }

    /// Drifts the listener count once the main view is up.
    pub fn update_listeners<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) {
        if self.mode != AppMode::Boot {
            self.listeners.update(now, rng);
        }
    }

    pub fn take_cues(&mut self) -> Vec<UiCue> {
        std::mem::take(&mut self.cues)
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            timer: self.timer.state(),
            total_seconds: self.timer.total_seconds(),
            station: self.radio.current_station().map(|s| s.name.clone()),
            playing: self.radio.is_playing(),
            volume: self.radio.volume(),
            quote: self.quote.clone(),
        }
    }

    /// Runs a control-socket command.
    pub fn execute(&mut self, command: Command) -> Response {
        match command {
            Command::Start => {
                self.start_timer();
            }
            Command::Pause => {
                self.pause_timer();
            }
            Command::Toggle => self.toggle_timer(),
            Command::Reset => self.reset_timer(),
            Command::SwitchMode { mode } => self.switch_mode(mode),
            Command::Status => return Response::Status(self.status()),
            Command::NextStation => {
                if !self.next_station() {
                    return Response::Error("no other station to switch to".to_string());
                }
            }
            Command::TogglePlayback => {
                if self.radio.current_station().is_none() {
                    return Response::Error("no stations configured".to_string());
                }
                self.toggle_playback();
            }
            Command::SetVolume { volume } => {
                if volume > 100 {
                    return Response::Error("volume must be between 0 and 100".to_string());
                }
                self.radio.set_volume(volume);
            }
            Command::NewQuote => self.request_quote(),
        }
        Response::Ok
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match self.mode {
            AppMode::Boot => {
                if self.boot.is_complete() {
                    self.mode = AppMode::Normal;
                }
            }
            AppMode::SessionOver(_) => match code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => self.dismiss_alert(),
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            AppMode::ShowHelp => match code {
                KeyCode::Esc | KeyCode::Char('?') => self.mode = AppMode::Normal,
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            AppMode::Normal => match code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char(' ') => self.toggle_timer(),
                KeyCode::Char('r') => self.reset_timer(),
                KeyCode::Char('1') => self.switch_mode(SessionMode::Work),
                KeyCode::Char('2') => self.switch_mode(SessionMode::ShortBreak),
                KeyCode::Char('3') => self.switch_mode(SessionMode::LongBreak),
                KeyCode::Char('p') => self.toggle_playback(),
                KeyCode::Char('s') => {
                    self.next_station();
                }
                KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_volume(VOLUME_STEP),
                KeyCode::Char('-') => self.adjust_volume(-VOLUME_STEP),
                KeyCode::Char('n') => self.request_quote(),
                KeyCode::Char('h') => self.toggle_quote(),
                KeyCode::Char('?') => self.mode = AppMode::ShowHelp,
                _ => {}
            },
        }
    }
}

/// Alert title and body for the session that just ended.
pub fn completion_text(finished: SessionMode) -> (&'static str, &'static str) {
    if finished.is_break() {
        ("Break Over", "Time to get back to work!")
    } else {
        ("Work Session Over", "Time for a break!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::testing::{Call, RecordingPlayer};
    use crate::quote::FALLBACK_QUOTES;
    use focusflow_core::{Durations, ManualClock};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Harness {
        app: App,
        channels: AppChannels,
        clock: Arc<ManualClock>,
        player: RecordingPlayer,
    }

    fn harness(durations: Durations) -> Harness {
        let config = Config {
            durations,
            notifications: false,
            ..Config::default()
        };
        let clock = Arc::new(ManualClock::default());
        let player = RecordingPlayer::default();
        let (app, channels) = App::new(config, Box::new(player.clone()), clock.clone(), true);
        Harness {
            app,
            channels,
            clock,
            player,
        }
    }

    fn short() -> Durations {
        Durations {
            work: 2,
            short_break: 1,
            long_break: 3,
        }
    }

    fn run_session(h: &mut Harness) {
        h.app.start_timer();
        for _ in 0..h.app.timer.total_seconds() {
            h.clock.advance_secs(1);
            h.app.on_tick();
        }
    }

    #[test]
    fn test_ticker_follows_running_state() {
        let mut h = harness(Durations::default());
        assert!(!h.app.ticker_armed());
        h.app.start_timer();
        assert!(h.app.ticker_armed());
        assert!(*h.channels.ticker.borrow());
        h.app.pause_timer();
        assert!(!h.app.ticker_armed());
        h.app.start_timer();
        h.app.reset_timer();
        assert!(!h.app.ticker_armed());
        h.app.start_timer();
        h.app.switch_mode(SessionMode::LongBreak);
        assert!(!h.app.ticker_armed());
    }

    #[test]
    fn test_completion_advances_and_alerts() {
        let mut h = harness(short());
        run_session(&mut h);

        let state = h.app.timer.state();
        assert_eq!(state.mode, SessionMode::ShortBreak);
        assert_eq!(state.remaining_seconds, 1);
        assert!(!state.is_running);
        assert_eq!(state.completed_work_sessions, 1);
        assert!(!h.app.ticker_armed());
        assert_eq!(h.app.mode, AppMode::SessionOver(SessionMode::Work));
        assert_eq!(h.app.take_cues(), vec![UiCue::ModeChanged, UiCue::Bell]);

        h.app.handle_key(KeyCode::Enter);
        assert_eq!(h.app.mode, AppMode::Normal);
    }

    #[test]
    fn test_start_and_pause_report_real_transitions() {
        let mut h = harness(Durations::default());
        assert!(!h.app.pause_timer());
        assert!(h.app.start_timer());
        assert!(!h.app.start_timer());
        assert!(h.app.pause_timer());
        assert!(!h.app.pause_timer());
        assert!(!h.app.ticker_armed());
    }

    #[test]
    fn test_stale_tick_after_reset_is_ignored() {
        let mut h = harness(Durations::default());
        h.app.start_timer();
        h.clock.advance_secs(3);
        h.app.on_tick();
        h.app.reset_timer();
        h.clock.advance_secs(1);
        h.app.on_tick();
        assert_eq!(h.app.timer.state().remaining_seconds, 1500);
    }

    #[test]
    fn test_fourth_work_session_gets_long_break() {
        let mut h = harness(short());
        for _ in 0..7 {
            run_session(&mut h);
            h.app.dismiss_alert();
        }
        let state = h.app.timer.state();
        assert_eq!(state.mode, SessionMode::LongBreak);
        assert_eq!(state.completed_work_sessions, 4);
        assert_eq!(state.remaining_seconds, 3);
    }

    #[test]
    fn test_keys_drive_timer_and_radio() {
        let mut h = harness(Durations::default());
        h.app.handle_key(KeyCode::Char(' '));
        assert!(h.app.timer.is_running());
        h.app.handle_key(KeyCode::Char('2'));
        assert_eq!(h.app.timer.mode(), SessionMode::ShortBreak);
        assert!(!h.app.timer.is_running());
        assert_eq!(h.app.timer.state().completed_work_sessions, 0);

        h.app.handle_key(KeyCode::Char('p'));
        assert!(h.app.radio.is_playing());
        h.app.handle_key(KeyCode::Char('s'));
        assert_eq!(h.app.radio.current_station().unwrap().name, "Cafe Lofi");
        h.app.handle_key(KeyCode::Char('+'));
        assert_eq!(h.app.radio.volume(), 55);
        assert!(h.player.calls().contains(&Call::SetVolume(55)));

        h.app.handle_key(KeyCode::Char('?'));
        assert_eq!(h.app.mode, AppMode::ShowHelp);
        h.app.handle_key(KeyCode::Char(' '));
        assert!(!h.app.timer.is_running());
        h.app.handle_key(KeyCode::Esc);
        h.app.handle_key(KeyCode::Char('q'));
        assert!(h.app.should_quit);
    }

    #[test]
    fn test_boot_waits_for_completion() {
        let config = Config {
            notifications: false,
            ..Config::default()
        };
        let clock = Arc::new(ManualClock::default());
        let (mut app, _channels) =
            App::new(config, Box::new(RecordingPlayer::default()), clock, false);
        assert_eq!(app.mode, AppMode::Boot);
        app.handle_key(KeyCode::Char('x'));
        assert_eq!(app.mode, AppMode::Boot);
        while !app.boot.is_complete() {
            app.boot_step();
        }
        app.handle_key(KeyCode::Char('x'));
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_execute_commands() {
        let mut h = harness(Durations::default());
        assert_eq!(h.app.execute(Command::Start), Response::Ok);
        assert!(h.app.timer.is_running());
        assert_eq!(
            h.app.execute(Command::SwitchMode {
                mode: SessionMode::LongBreak
            }),
            Response::Ok
        );
        assert_eq!(h.app.execute(Command::SetVolume { volume: 20 }), Response::Ok);
        assert!(matches!(
            h.app.execute(Command::SetVolume { volume: 101 }),
            Response::Error(_)
        ));

        match h.app.execute(Command::Status) {
            Response::Status(status) => {
                assert_eq!(status.timer.mode, SessionMode::LongBreak);
                assert_eq!(status.total_seconds, 900);
                assert_eq!(status.volume, 20);
                assert_eq!(status.station.as_deref(), Some("Morning Lofi"));
                assert!(!status.playing);
            }
            other => panic!("unexpected response {:?}", other),
        }

        assert_eq!(h.app.execute(Command::NewQuote), Response::Ok);
        assert!(h.channels.quote_requests.try_recv().is_ok());
    }

    #[test]
    fn test_single_station_cannot_rotate() {
        let config = Config {
            notifications: false,
            stations: Config::default().stations.into_iter().take(1).collect(),
            ..Config::default()
        };
        let clock = Arc::new(ManualClock::default());
        let (mut app, _channels) =
            App::new(config, Box::new(RecordingPlayer::default()), clock, true);
        assert!(matches!(
            app.execute(Command::NextStation),
            Response::Error(_)
        ));
        assert!(app.take_cues().is_empty());
    }

    #[test]
    fn test_ended_stream_changes_station() {
        let mut h = harness(Durations::default());
        h.player.finish_stream();
        h.app.poll_radio();
        assert_eq!(h.app.radio.current_station().unwrap().name, "Cafe Lofi");
        assert_eq!(h.app.take_cues(), vec![UiCue::StationChanged]);
    }

    #[test]
    fn test_quote_falls_back() {
        let mut h = harness(Durations::default());
        let mut rng = StdRng::seed_from_u64(1);
        h.app.set_quote(QuoteOutcome::Unavailable, &mut rng);
        assert!(FALLBACK_QUOTES.contains(&h.app.quote.as_deref().unwrap()));
        h.app.set_quote(QuoteOutcome::Quote("Breathe.".into()), &mut rng);
        assert_eq!(h.app.quote.as_deref(), Some("Breathe."));
        h.app.handle_key(KeyCode::Char('h'));
        assert!(!h.app.quote_visible);
    }

    #[test]
    fn test_listeners_hold_still_during_boot() {
        let config = Config {
            notifications: false,
            ..Config::default()
        };
        let clock = Arc::new(ManualClock::default());
        let (mut app, _channels) =
            App::new(config, Box::new(RecordingPlayer::default()), clock, false);
        let mut rng = StdRng::seed_from_u64(5);
        let start = app.listeners.clone();
        let later = Instant::now() + std::time::Duration::from_secs(60);
        app.update_listeners(later, &mut rng);
        assert_eq!(app.listeners.count(), start.count());

        app.mode = AppMode::Normal;
        app.update_listeners(later, &mut rng);
        assert!(app.listeners.count() >= 1);
        assert!(app.listeners.count().abs_diff(start.count()) <= 1);
    }

    #[test]
    fn test_completion_text() {
        assert_eq!(completion_text(SessionMode::Work).0, "Work Session Over");
        assert_eq!(completion_text(SessionMode::LongBreak).1, "Time to get back to work!");
    }
}
