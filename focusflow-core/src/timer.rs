//! The session countdown.
//!
//! `SessionTimer` owns the only mutable timer state in the application. The
//! countdown is deadline based: `start` records when the session should end and
//! every `tick` recomputes the remaining seconds from that deadline, so late or
//! coalesced ticks never make the display drift.

use crate::clock::Clock;
use crate::mode::{Durations, SessionMode};
use crate::scheduler::NextSession;
use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Read-only view of the timer, used for display and over the control socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: SessionMode,
    pub remaining_seconds: u32,
    pub is_running: bool,
    pub completed_work_sessions: u32,
}

/// Raised by [`SessionTimer::tick`] when a countdown reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCompleted {
    pub mode: SessionMode,
}

pub struct SessionTimer {
    durations: Durations,
    clock: Arc<dyn Clock>,
    state: TimerState,
    /// Set only while running.
    deadline: Option<DateTime<Local>>,
}

impl SessionTimer {
    /// A fresh timer: `Work`, full duration, paused, no completed sessions.
    pub fn new(durations: Durations, clock: Arc<dyn Clock>) -> Self {
        let state = TimerState {
            mode: SessionMode::Work,
            remaining_seconds: durations.get(SessionMode::Work),
            is_running: false,
            completed_work_sessions: 0,
        };
        Self {
            durations,
            clock,
            state,
            deadline: None,
        }
    }

    /// Rebuilds a timer from a snapshot.
    ///
    /// The remaining time is clamped to the mode's duration, and a snapshot
    /// claiming to run with nothing left is loaded as paused.
    pub fn from_state(state: TimerState, durations: Durations, clock: Arc<dyn Clock>) -> Self {
        let mut timer = Self {
            durations,
            clock,
            state: TimerState {
                remaining_seconds: state.remaining_seconds.min(durations.get(state.mode)),
                is_running: false,
                ..state
            },
            deadline: None,
        };
        if state.is_running {
            timer.start();
        }
        timer
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn mode(&self) -> SessionMode {
        self.state.mode
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn total_seconds(&self) -> u32 {
        self.durations.get(self.state.mode)
    }

    /// Fraction of the current session already elapsed, 0.0 to 1.0.
    pub fn progress(&self) -> f64 {
        let total = self.total_seconds();
        if total == 0 {
            return 1.0;
        }
        1.0 - f64::from(self.state.remaining_seconds) / f64::from(total)
    }

    pub fn start(&mut self) {
        if self.state.is_running || self.state.remaining_seconds == 0 {
            return;
        }
        let now = self.clock.now();
        self.deadline = Some(now + Duration::seconds(i64::from(self.state.remaining_seconds)));
        self.state.is_running = true;
        debug!(mode = %self.state.mode, remaining = self.state.remaining_seconds, "timer started");
    }

    /// Stops the countdown, keeping the last ticked remaining time.
    pub fn pause(&mut self) {
        if !self.state.is_running {
            return;
        }
        self.state.is_running = false;
        self.deadline = None;
        debug!(mode = %self.state.mode, remaining = self.state.remaining_seconds, "timer paused");
    }

    pub fn toggle(&mut self) {
        if self.state.is_running {
            self.pause();
        } else {
            self.start();
        }
    }

    pub fn reset(&mut self) {
        self.state.remaining_seconds = self.durations.get(self.state.mode);
        self.state.is_running = false;
        self.deadline = None;
    }

    pub fn switch_mode(&mut self, mode: SessionMode) {
        self.state.mode = mode;
        self.reset();
    }

    /// Stores the scheduler's updated work count and loads the next mode.
    pub fn advance(&mut self, next: NextSession) {
        self.state.completed_work_sessions = next.completed_work_sessions;
        self.switch_mode(next.mode);
    }

    /// Advances the countdown against the clock.
    ///
    /// Inert while paused or finished. The remaining time never increases, even
    /// if the clock steps backwards.
    pub fn tick(&mut self) -> Option<SessionCompleted> {
        if !self.state.is_running || self.state.remaining_seconds == 0 {
            return None;
        }
        let deadline = self.deadline?;
        let left_ms = (deadline - self.clock.now()).num_milliseconds().max(0);
        let rounded = (left_ms + 500) / 1000;
        let remaining = u32::try_from(rounded)
            .unwrap_or(u32::MAX)
            .min(self.state.remaining_seconds);

        if remaining > 0 {
            self.state.remaining_seconds = remaining;
            return None;
        }

        self.state.remaining_seconds = 0;
        self.state.is_running = false;
        self.deadline = None;
        debug!(mode = %self.state.mode, "session completed");
        Some(SessionCompleted {
            mode: self.state.mode,
        })
    }
}

/// Formats seconds as `MM:SS`.
pub fn format_mmss(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn timer() -> (SessionTimer, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        (SessionTimer::new(Durations::default(), clock.clone()), clock)
    }

    #[test]
    fn test_new_timer() {
        let (timer, _) = timer();
        let state = timer.state();
        assert_eq!(state.mode, SessionMode::Work);
        assert_eq!(state.remaining_seconds, 1500);
        assert!(!state.is_running);
        assert_eq!(state.completed_work_sessions, 0);
        assert_eq!(timer.progress(), 0.0);
    }

    #[test]
    fn test_switch_mode_resets_countdown() {
        let (mut timer, clock) = timer();
        timer.start();
        clock.advance_secs(10);
        timer.tick();
        for mode in SessionMode::ALL {
            timer.switch_mode(mode);
            assert_eq!(timer.state().mode, mode);
            assert_eq!(timer.state().remaining_seconds, Durations::default().get(mode));
            assert!(!timer.is_running());
        }
    }

    #[test]
    fn test_tick_while_paused_is_inert() {
        let (mut timer, clock) = timer();
        clock.advance_secs(5);
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.state().remaining_seconds, 1500);

        timer.start();
        clock.advance_secs(1);
        timer.tick();
        timer.pause();
        clock.advance_secs(30);
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.state().remaining_seconds, 1499);
    }

    #[test]
    fn test_full_work_session_completes_once() {
        let (mut timer, clock) = timer();
        timer.start();

        let mut events = Vec::new();
        for i in 1..=1500 {
            clock.advance_secs(1);
            if let Some(event) = timer.tick() {
                events.push((i, event));
            }
        }

        assert_eq!(
            events,
            vec![(1500, SessionCompleted { mode: SessionMode::Work })]
        );
        assert_eq!(timer.state().remaining_seconds, 0);
        assert!(!timer.is_running());

        clock.advance_secs(1);
        assert_eq!(timer.tick(), None);
    }

    #[test]
    fn test_start_at_zero_is_noop() {
        let (mut timer, clock) = timer();
        timer.start();
        clock.advance_secs(1500);
        assert!(timer.tick().is_some());

        timer.start();
        assert!(!timer.is_running());
        timer.toggle();
        assert!(!timer.is_running());
    }

    #[test]
    fn test_pause_and_reset_are_idempotent() {
        let (mut timer, clock) = timer();
        timer.start();
        clock.advance_secs(42);
        timer.tick();

        timer.pause();
        let once = timer.state();
        timer.pause();
        assert_eq!(timer.state(), once);

        timer.reset();
        let once = timer.state();
        timer.reset();
        assert_eq!(timer.state(), once);
        assert_eq!(once.remaining_seconds, 1500);
    }

    #[test]
    fn test_toggle() {
        let (mut timer, _) = timer();
        timer.toggle();
        assert!(timer.is_running());
        timer.toggle();
        assert!(!timer.is_running());
    }

    #[test]
    fn test_late_tick_catches_up_to_deadline() {
        let (mut timer, clock) = timer();
        timer.start();
        clock.advance_secs(7);
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.state().remaining_seconds, 1493);
    }

    #[test]
    fn test_coalesced_tick_does_not_double_count() {
        let (mut timer, clock) = timer();
        timer.start();
        clock.advance_secs(1);
        timer.tick();
        timer.tick();
        assert_eq!(timer.state().remaining_seconds, 1499);
    }

    #[test]
    fn test_jittered_ticks_round_to_whole_seconds() {
        let (mut timer, clock) = timer();
        timer.start();
        clock.advance(Duration::milliseconds(1030));
        timer.tick();
        assert_eq!(timer.state().remaining_seconds, 1499);
        clock.advance(Duration::milliseconds(960));
        timer.tick();
        assert_eq!(timer.state().remaining_seconds, 1498);
    }

    #[test]
    fn test_resume_continues_from_paused_remaining() {
        let (mut timer, clock) = timer();
        timer.start();
        clock.advance_secs(100);
        timer.tick();
        timer.pause();
        clock.advance_secs(600);
        timer.start();
        clock.advance_secs(1);
        timer.tick();
        assert_eq!(timer.state().remaining_seconds, 1399);
    }

    #[test]
    fn test_from_state_clamps_and_respects_zero() {
        let clock = Arc::new(ManualClock::default());
        let timer = SessionTimer::from_state(
            TimerState {
                mode: SessionMode::ShortBreak,
                remaining_seconds: 9999,
                is_running: false,
                completed_work_sessions: 2,
            },
            Durations::default(),
            clock.clone(),
        );
        assert_eq!(timer.state().remaining_seconds, 300);

        let timer = SessionTimer::from_state(
            TimerState {
                mode: SessionMode::Work,
                remaining_seconds: 0,
                is_running: true,
                completed_work_sessions: 0,
            },
            Durations::default(),
            clock,
        );
        assert!(!timer.is_running());
    }

    #[test]
    fn test_format_mmss() {
        assert_eq!(format_mmss(1500), "25:00");
        assert_eq!(format_mmss(90), "01:30");
        assert_eq!(format_mmss(0), "00:00");
    }
}
