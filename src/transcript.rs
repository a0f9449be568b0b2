//! Transcript types - the normalized output of conversation extraction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator placed between rendered turns.
pub const TURN_DELIMITER: &str = "\n\n---\n\n";

/// Turns whose trimmed text is shorter than this are UI chrome, not messages.
pub const MIN_TURN_CHARS: usize = 10;

/// Speaker of a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Role for a positional index when no semantic signal exists.
    ///
    /// This is a weak guess: it is only right when the turns strictly
    /// alternate starting with the user.
    pub fn from_parity(index: usize) -> Self {
        if index % 2 == 0 {
            Role::User
        } else {
            Role::Assistant
        }
    }

    /// Parse a role marker value as found in page attributes.
    pub fn from_marker(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" | "human" => Some(Role::User),
            "assistant" | "model" | "ai" | "bot" => Some(Role::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("User"),
            Role::Assistant => f.write_str("Assistant"),
        }
    }
}

/// One message attributed to a single speaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    /// Build a turn, dropping it when its trimmed text is below [`MIN_TURN_CHARS`].
    pub fn accept(role: Role, text: &str) -> Option<Self> {
        let text = text.trim();
        if text.chars().count() < MIN_TURN_CHARS {
            return None;
        }
        Some(Self {
            role,
            text: text.to_string(),
        })
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role, self.text)
    }
}

/// Ordered turns in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub turns: Vec<Turn>,
}

impl Transcript {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Render as `"{Role}: {text}"` blocks joined by [`TURN_DELIMITER`].
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(Turn::to_string)
            .collect::<Vec<_>>()
            .join(TURN_DELIMITER)
    }
}
