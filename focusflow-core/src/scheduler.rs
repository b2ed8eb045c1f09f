//! Decides what follows a completed session.

use crate::mode::SessionMode;

/// Every this many completed work sessions earns a long break.
pub const LONG_BREAK_EVERY: u32 = 4;

/// The mode to load next, and the work count to store with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextSession {
    pub mode: SessionMode,
    pub completed_work_sessions: u32,
}

/// Work leads to a break (long on every fourth completion); any break leads back to work.
pub fn next_mode(current: SessionMode, completed_work_sessions: u32) -> NextSession {
    match current {
        SessionMode::Work => {
            let completed = completed_work_sessions.saturating_add(1);
            let mode = if completed % LONG_BREAK_EVERY == 0 {
                SessionMode::LongBreak
            } else {
                SessionMode::ShortBreak
            };
            NextSession {
                mode,
                completed_work_sessions: completed,
            }
        }
        SessionMode::ShortBreak | SessionMode::LongBreak => NextSession {
            mode: SessionMode::Work,
            completed_work_sessions,
        },
    }
}
