//! Pomodoro session state for focusflow.
//!
//! The timer and scheduler here do no I/O. Hosts drive [`SessionTimer::tick`]
//! from a one-second tick source, and handle each [`SessionCompleted`] by
//! asking [`next_mode`] what comes next and applying it with
//! [`SessionTimer::advance`].

pub mod clock;
pub mod mode;
pub mod scheduler;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use mode::{Durations, SessionMode};
pub use scheduler::{next_mode, NextSession, LONG_BREAK_EVERY};
pub use timer::{format_mmss, SessionCompleted, SessionTimer, TimerState};
