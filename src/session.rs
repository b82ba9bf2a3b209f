use crate::layout::KeyboardLayout;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// How the target text is chosen and when a session ends.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// fixed duration over a long random buffer
    #[default]
    Time,
    /// fixed number of random words
    Word,
    /// one quote, verbatim
    Quote,
    /// words weighted towards historically missed characters
    Practice,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Time, Mode::Word, Mode::Quote, Mode::Practice];

    /// Whether typing the whole target ends the session. Time mode only ends
    /// when the host sees the deadline pass.
    pub fn completes_on_full_input(self) -> bool {
        !matches!(self, Mode::Time)
    }

    pub fn next(self) -> Mode {
        match self {
            Mode::Time => Mode::Word,
            Mode::Word => Mode::Quote,
            Mode::Quote => Mode::Practice,
            Mode::Practice => Mode::Time,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub mode: Mode,
    /// only consulted in time mode
    pub duration_secs: u32,
    /// only consulted in word and practice modes
    pub word_count: usize,
    pub layout: KeyboardLayout,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Time,
            duration_secs: 30,
            word_count: 25,
            layout: KeyboardLayout::Qwerty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

/// A keystroke that did not match the target at the time it was typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissedKey {
    pub expected: char,
    pub typed: char,
}

/// Mutable state of one attempt. Reset wholesale between attempts.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: Phase,
    pub target: Vec<char>,
    pub input: Vec<char>,
    pub started_at: Option<Instant>,
    pub missed: Vec<MissedKey>,
    pub total_keystrokes: usize,
    // Results
    pub correct_chars: usize,
    pub wpm: u32,
    pub accuracy: u32,
}

impl SessionState {
    pub fn new(target: Vec<char>) -> Self {
        Self {
            phase: Phase::Idle,
            target,
            input: Vec::new(),
            started_at: None,
            missed: Vec::new(),
            total_keystrokes: 0,
            correct_chars: 0,
            wpm: 0,
            accuracy: 100,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_display_is_lowercase() {
        assert_eq!(Mode::Time.to_string(), "time");
        assert_eq!(Mode::Practice.to_string(), "practice");
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Quote).unwrap(), "\"quote\"");
        let mode: Mode = serde_json::from_str("\"word\"").unwrap();
        assert_eq!(mode, Mode::Word);
    }

    #[test]
    fn only_time_mode_waits_for_the_clock() {
        assert!(!Mode::Time.completes_on_full_input());
        assert!(Mode::Word.completes_on_full_input());
        assert!(Mode::Quote.completes_on_full_input());
        assert!(Mode::Practice.completes_on_full_input());
    }

    #[test]
    fn next_cycles_through_every_mode() {
        let mut mode = Mode::Time;
        for expected in Mode::ALL.iter().skip(1).chain(std::iter::once(&Mode::Time)) {
            mode = mode.next();
            assert_eq!(mode, *expected);
        }
    }

    #[test]
    fn fresh_state_is_idle_with_full_accuracy() {
        let state = SessionState::new("abc".chars().collect());
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.accuracy, 100);
        assert_eq!(state.wpm, 0);
        assert!(state.input.is_empty());
        assert!(state.started_at.is_none());
    }
}
