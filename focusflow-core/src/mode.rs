//! Session modes and their nominal lengths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of countdown currently loaded into the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionMode {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionMode {
    pub const ALL: [SessionMode; 3] = [
        SessionMode::Work,
        SessionMode::ShortBreak,
        SessionMode::LongBreak,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SessionMode::Work => "Work",
            SessionMode::ShortBreak => "Short Break",
            SessionMode::LongBreak => "Long Break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, SessionMode::Work)
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Length of each session mode, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Durations {
    pub work: u32,
    pub short_break: u32,
    pub long_break: u32,
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            work: 25 * 60,
            short_break: 5 * 60,
            long_break: 15 * 60,
        }
    }
}

impl Durations {
    pub fn get(&self, mode: SessionMode) -> u32 {
        match mode {
            SessionMode::Work => self.work,
            SessionMode::ShortBreak => self.short_break,
            SessionMode::LongBreak => self.long_break,
        }
    }

    /// Returns the first mode whose duration is zero, if any.
    ///
    /// A zero-length session could never be started, so hosts reject such a
    /// table when loading configuration.
    pub fn first_empty(&self) -> Option<SessionMode> {
        SessionMode::ALL.into_iter().find(|&mode| self.get(mode) == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_durations() {
        let durations = Durations::default();
        assert_eq!(durations.get(SessionMode::Work), 1500);
        assert_eq!(durations.get(SessionMode::ShortBreak), 300);
        assert_eq!(durations.get(SessionMode::LongBreak), 900);
        for mode in SessionMode::ALL {
            assert!(durations.get(mode) > 0);
        }
        assert_eq!(durations.first_empty(), None);
    }

    #[test]
    fn test_first_empty() {
        let durations = Durations {
            short_break: 0,
            ..Durations::default()
        };
        assert_eq!(durations.first_empty(), Some(SessionMode::ShortBreak));
    }

    #[test]
    fn test_labels() {
        assert_eq!(SessionMode::Work.to_string(), "Work");
        assert_eq!(SessionMode::ShortBreak.to_string(), "Short Break");
        assert!(SessionMode::LongBreak.is_break());
        assert!(!SessionMode::Work.is_break());
    }
}
