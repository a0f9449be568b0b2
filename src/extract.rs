//! The extractor: turns a page plus the user's selection into the text that
//! gets shared.
//!
//! Precedence is fixed: an explicit selection always wins; otherwise a
//! one-shot share sends a page excerpt and a continuation sends the
//! conversation transcript (or the platform's "not found" message).

use crate::cascade::run_cascade;
use crate::excerpt::extract_excerpt;
use crate::page::Page;
use crate::platform::Platform;
use std::time::Duration;
use tracing::{debug, info};

/// Wait after scrolling to the top before the conversation is sampled.
pub const SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// What the extracted text will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Send the current page (or selection) to a service once.
    Share,
    /// Carry the whole conversation over to another service.
    Continue,
}

/// Inputs captured at the moment the user triggers an action.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub mode: ExtractMode,
    pub selection: Option<String>,
}

impl ExtractRequest {
    pub fn share(selection: Option<String>) -> Self {
        Self {
            mode: ExtractMode::Share,
            selection,
        }
    }

    pub fn continuation(selection: Option<String>) -> Self {
        Self {
            mode: ExtractMode::Continue,
            selection,
        }
    }

    /// The selection, if it has any non-whitespace content.
    fn effective_selection(&self) -> Option<&str> {
        self.selection
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Produce the text to share for this page. Never fails: misses degrade to
/// the platform's "not found" message.
pub async fn extract<P: Page + ?Sized>(page: &mut P, request: &ExtractRequest) -> String {
    if let Some(selection) = request.effective_selection() {
        debug!(chars = selection.chars().count(), "using explicit selection");
        return selection.to_string();
    }

    match request.mode {
        ExtractMode::Share => extract_excerpt(page.html()),
        ExtractMode::Continue => {
            let platform = Platform::from_url(page.url());
            page.scroll_to_top().await;
            tokio::time::sleep(SETTLE_DELAY).await;
            transcript_or_sentinel(page.html(), platform)
        }
    }
}

/// Joined transcript for the platform, or its "not found" message.
pub fn transcript_or_sentinel(html: &str, platform: Platform) -> String {
    let result = run_cascade(html, platform);
    if result.transcript.is_empty() {
        info!(platform = %platform, "no conversation turns found");
        return platform.not_found_message();
    }
    info!(
        platform = %platform,
        tier = result.tier,
        turns = result.transcript.len(),
        "extracted conversation"
    );
    result.transcript.render()
}
