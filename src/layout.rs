use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Keyboard layout shown by the on-screen keyboard. Scoring ignores it.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KeyboardLayout {
    #[default]
    Qwerty,
    Dvorak,
}

impl KeyboardLayout {
    pub fn next(self) -> KeyboardLayout {
        match self {
            KeyboardLayout::Qwerty => KeyboardLayout::Dvorak,
            KeyboardLayout::Dvorak => KeyboardLayout::Qwerty,
        }
    }

    pub fn rows(self) -> [&'static str; 3] {
        match self {
            KeyboardLayout::Qwerty => ["qwertyuiop[]", "asdfghjkl;'", "zxcvbnm,./"],
            KeyboardLayout::Dvorak => ["',.pyfgcrl/=", "aoeuidhtns-", ";qjkxbmnwvz"],
        }
    }

    /// Row and column of the key that produces `c`, ignoring case.
    pub fn position_of(self, c: char) -> Option<(usize, usize)> {
        let c = c.to_lowercase().next().unwrap_or(c);
        self.rows()
            .iter()
            .enumerate()
            .find_map(|(row, keys)| keys.chars().position(|k| k == c).map(|col| (row, col)))
    }
}
