//! Small pieces of widget state that sit around the conversation: theme,
//! character counter and sent-message recall.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Advisory length limit shown by the character counter.
pub const MAX_MESSAGE_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}' (expected light or dark)", other)),
        }
    }
}

/// Color band for the character counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountLevel {
    Normal,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCount {
    pub current: usize,
    pub max: usize,
}

impl CharCount {
    pub fn of(text: &str) -> Self {
        Self {
            current: text.chars().count(),
            max: MAX_MESSAGE_CHARS,
        }
    }

    pub fn level(&self) -> CountLevel {
        // current/max > 0.9 and > 0.7, kept in integers
        if self.current * 10 > self.max * 9 {
            CountLevel::Error
        } else if self.current * 10 > self.max * 7 {
            CountLevel::Warning
        } else {
            CountLevel::Normal
        }
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.current, self.max)
    }
}

/// Recall of previously sent messages with Up/Down, newest first.
#[derive(Debug, Clone, Default)]
pub struct InputHistory {
    sent: Vec<String>,
    // Steps back from the newest entry; None while editing fresh input.
    index: Option<usize>,
}

impl InputHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, message: &str) {
        if self.sent.last().map(String::as_str) != Some(message) {
            self.sent.push(message.to_string());
        }
        self.index = None;
    }

    /// Step to an older message. Only starts recalling from an empty input.
    pub fn older(&mut self, current_input: &str) -> Option<&str> {
        let next = match self.index {
            None if !current_input.is_empty() => return None,
            None => 0,
            Some(i) => i + 1,
        };
        if next >= self.sent.len() {
            return None;
        }
        self.index = Some(next);
        Some(&self.sent[self.sent.len() - 1 - next])
    }

    /// Step to a newer message; past the newest, the input clears (`Some("")`).
    pub fn newer(&mut self) -> Option<&str> {
        match self.index {
            None => None,
            Some(0) => {
                self.index = None;
                Some("")
            }
            Some(i) => {
                self.index = Some(i - 1);
                Some(&self.sent[self.sent.len() - i])
            }
        }
    }

    /// Any edit leaves recall mode.
    pub fn reset(&mut self) {
        self.index = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_toggle_and_parse() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
        assert_eq!("DARK".parse::<Theme>(), Ok(Theme::Dark));
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn test_char_count_levels() {
        assert_eq!(CharCount::of("").label(), "0/1000");
        assert_eq!(CharCount::of(&"a".repeat(700)).level(), CountLevel::Normal);
        assert_eq!(CharCount::of(&"a".repeat(701)).level(), CountLevel::Warning);
        assert_eq!(CharCount::of(&"a".repeat(900)).level(), CountLevel::Warning);
        assert_eq!(CharCount::of(&"a".repeat(901)).level(), CountLevel::Error);
        assert_eq!(CharCount::of(&"a".repeat(1200)).level(), CountLevel::Error);
    }

    #[test]
    fn test_char_count_uses_chars() {
        assert_eq!(CharCount::of("héllo").current, 5);
    }

    #[test]
    fn test_history_walk() {
        let mut history = InputHistory::new();
        history.record("first");
        history.record("second");

        assert_eq!(history.older(""), Some("second"));
        assert_eq!(history.older("second"), Some("first"));
        assert_eq!(history.older("first"), None);
        assert_eq!(history.newer(), Some("second"));
        assert_eq!(history.newer(), Some(""));
        assert_eq!(history.newer(), None);
    }

    #[test]
    fn test_history_requires_empty_input() {
        let mut history = InputHistory::new();
        history.record("sent");
        assert_eq!(history.older("draft"), None);
        assert_eq!(history.older(""), Some("sent"));
        history.reset();
        assert_eq!(history.newer(), None);
    }

    #[test]
    fn test_history_skips_repeats() {
        let mut history = InputHistory::new();
        history.record("same");
        history.record("same");
        assert_eq!(history.older(""), Some("same"));
        assert_eq!(history.older("same"), None);
    }
}
