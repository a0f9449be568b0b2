//! Source platform detection from a page URL.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A chat site whose conversation markup we know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    ChatGpt,
    Claude,
    Gemini,
    Grok,
    Unknown,
}

impl Platform {
    /// Derive the platform from the page URL. Unparsable URLs are `Unknown`.
    pub fn from_url(url: &str) -> Self {
        let Ok(parsed) = Url::parse(url.trim()) else {
            return Platform::Unknown;
        };
        let Some(host) = parsed.host_str() else {
            return Platform::Unknown;
        };
        let host = host.strip_prefix("www.").unwrap_or(host);

        match host {
            "chatgpt.com" | "chat.openai.com" => Platform::ChatGpt,
            "claude.ai" => Platform::Claude,
            "gemini.google.com" => Platform::Gemini,
            "grok.com" => Platform::Grok,
            "x.com" if parsed.path().starts_with("/i/grok") => Platform::Grok,
            _ => Platform::Unknown,
        }
    }

    /// Human-readable name, also used as `fromPlatform` in messages.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::ChatGpt => "ChatGPT",
            Platform::Claude => "Claude",
            Platform::Gemini => "Gemini",
            Platform::Grok => "Grok",
            Platform::Unknown => "Unknown",
        }
    }

    pub fn supports_transcript(&self) -> bool {
        !matches!(self, Platform::Unknown)
    }

    /// Text emitted in place of a transcript when nothing was found.
    pub fn not_found_message(&self) -> String {
        match self {
            Platform::Unknown => "No conversation found on this page.".to_string(),
            known => format!(
                "No conversation found. Make sure you are on a {} conversation page.",
                known.name()
            ),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
