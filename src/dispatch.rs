//! Dispatcher: maps a user action plus payload to exactly one effect.
//!
//! [`plan`] is the pure mapping from request to [`Effect`]; [`Dispatcher`]
//! carries the effect out on a [`Host`] and reports what happened. Nothing
//! here waits for the destination service to accept the prompt.

use crate::host::{Feedback, Host};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// How long clipboard feedback stays visible before reverting.
pub const FEEDBACK_REVERT_DELAY: Duration = Duration::from_secs(2);

/// Placeholder used when a share carries no text.
pub const NO_CONTENT_PLACEHOLDER: &str = "(no content selected)";

/// Used in continuation prompts when the source platform is not known.
const UNKNOWN_SOURCE: &str = "another AI assistant";

/// AI chat services that can receive content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    ChatGpt,
    Grok,
    Perplexity,
    Claude,
    Gemini,
}

impl Service {
    pub const ALL: [Service; 5] = [
        Service::ChatGpt,
        Service::Grok,
        Service::Perplexity,
        Service::Claude,
        Service::Gemini,
    ];

    /// Name as it appears in action tags, e.g. `openInChatGPT`.
    pub fn tag(&self) -> &'static str {
        match self {
            Service::ChatGpt => "ChatGPT",
            Service::Grok => "Grok",
            Service::Perplexity => "Perplexity",
            Service::Claude => "Claude",
            Service::Gemini => "Gemini",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.tag() == tag)
    }

    /// Base URL taking a percent-encoded prompt, for services that accept one.
    pub fn prompt_url(&self) -> Option<&'static str> {
        match self {
            Service::ChatGpt => Some("https://chatgpt.com/?q="),
            Service::Grok => Some("https://grok.com/?q="),
            Service::Perplexity => Some("https://www.perplexity.ai/search?q="),
            Service::Claude | Service::Gemini => None,
        }
    }

    /// Where to send the user when the prompt travels by clipboard.
    pub fn landing_url(&self) -> &'static str {
        match self {
            Service::ChatGpt => "https://chatgpt.com/",
            Service::Grok => "https://grok.com/",
            Service::Perplexity => "https://www.perplexity.ai/",
            Service::Claude => "https://claude.ai/new",
            Service::Gemini => "https://gemini.google.com/app",
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown action: {0}")]
pub struct ActionParseError(pub String);

/// Closed set of actions a user can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActionId {
    OpenIn(Service),
    ContinueIn(Service),
    CopyLink,
    CopyVideoLink,
    OpenInCursor,
    OpenInCloudCode,
    OpenSettings,
}

impl ActionId {
    /// Every action, for menus and exhaustive checks.
    pub fn all() -> Vec<ActionId> {
        let mut actions: Vec<ActionId> = Service::ALL.into_iter().map(ActionId::OpenIn).collect();
        actions.extend(Service::ALL.into_iter().map(ActionId::ContinueIn));
        actions.extend([
            ActionId::CopyLink,
            ActionId::CopyVideoLink,
            ActionId::OpenInCursor,
            ActionId::OpenInCloudCode,
            ActionId::OpenSettings,
        ]);
        actions
    }

    pub fn is_continuation(&self) -> bool {
        matches!(self, ActionId::ContinueIn(_))
    }

    /// Whether the action sends page content at all.
    pub fn carries_payload(&self) -> bool {
        matches!(
            self,
            ActionId::OpenIn(_)
                | ActionId::ContinueIn(_)
                | ActionId::OpenInCursor
                | ActionId::OpenInCloudCode
        )
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionId::OpenIn(service) => write!(f, "openIn{}", service.tag()),
            ActionId::ContinueIn(service) => write!(f, "continueIn{}", service.tag()),
            ActionId::CopyLink => f.write_str("copyLink"),
            ActionId::CopyVideoLink => f.write_str("copyVideoLink"),
            ActionId::OpenInCursor => f.write_str("openInCursor"),
            ActionId::OpenInCloudCode => f.write_str("openInCloudCode"),
            ActionId::OpenSettings => f.write_str("openSettings"),
        }
    }
}

impl FromStr for ActionId {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s {
            "copyLink" => Some(ActionId::CopyLink),
            "copyVideoLink" => Some(ActionId::CopyVideoLink),
            "openInCursor" => Some(ActionId::OpenInCursor),
            "openInCloudCode" => Some(ActionId::OpenInCloudCode),
            "openSettings" => Some(ActionId::OpenSettings),
            other => {
                if let Some(tag) = other.strip_prefix("openIn") {
                    Service::from_tag(tag).map(ActionId::OpenIn)
                } else if let Some(tag) = other.strip_prefix("continueIn") {
                    Service::from_tag(tag).map(ActionId::ContinueIn)
                } else {
                    None
                }
            }
        };
        parsed.ok_or_else(|| ActionParseError(s.to_string()))
    }
}

impl TryFrom<String> for ActionId {
    type Error = ActionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ActionId> for String {
    fn from(action: ActionId) -> Self {
        action.to_string()
    }
}

/// One action to carry out, with everything it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    pub action: ActionId,
    /// Address of the page the action was triggered on.
    pub url: String,
    pub payload: String,
    pub source_platform: Option<String>,
}

/// The single externally observable effect of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenTab {
        url: String,
    },
    /// Write to the clipboard, then optionally open a landing page where the
    /// user pastes it.
    WriteClipboard {
        text: String,
        then_open: Option<String>,
    },
    OpenSettings,
}

/// Prompt for a one-shot share.
pub fn share_prompt(url: &str, payload: &str) -> String {
    let payload = if payload.trim().is_empty() {
        NO_CONTENT_PLACEHOLDER
    } else {
        payload
    };
    format!("Analyze the following content from the webpage {url}. The selected text is: {payload}.")
}

/// Prompt framing a transcript as a conversation to pick up.
pub fn continuation_prompt(source_platform: Option<&str>, url: &str, payload: &str) -> String {
    let source = source_platform
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(UNKNOWN_SOURCE);
    format!(
        "This is a continuation of a conversation from {source} ({url}). \
         Please read it and continue where it left off.\n\n{payload}"
    )
}

/// Deliver a prompt to a service: through its URL when it takes one,
/// otherwise through the clipboard followed by its landing page.
fn deliver(service: Service, prompt: String) -> Effect {
    match service.prompt_url() {
        Some(base) => Effect::OpenTab {
            url: format!("{base}{}", urlencoding::encode(&prompt)),
        },
        None => Effect::WriteClipboard {
            text: prompt,
            then_open: Some(service.landing_url().to_string()),
        },
    }
}

/// Map a request to its effect. Total over [`ActionId`].
pub fn plan(request: &DispatchRequest) -> Effect {
    let url = request.url.as_str();
    let payload = request.payload.as_str();

    match request.action {
        ActionId::OpenIn(service) => deliver(service, share_prompt(url, payload)),
        ActionId::ContinueIn(service) => deliver(
            service,
            continuation_prompt(request.source_platform.as_deref(), url, payload),
        ),
        ActionId::CopyLink => clipboard_only(format!("Source: {url}")),
        ActionId::CopyVideoLink => clipboard_only(format!("Video source: {url}")),
        ActionId::OpenInCursor => clipboard_only(format!("Context from {url}:\n\n{payload}")),
        ActionId::OpenInCloudCode => clipboard_only(format!(
            "// Context from {url}\n// Selected text: {payload}\n\n"
        )),
        ActionId::OpenSettings => Effect::OpenSettings,
    }
}

fn clipboard_only(text: String) -> Effect {
    Effect::WriteClipboard {
        text,
        then_open: None,
    }
}

/// What actually happened when an effect was carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    TabOpened {
        url: String,
    },
    Copied {
        opened: Option<String>,
    },
    CopyFailed {
        reason: String,
        opened: Option<String>,
    },
    SettingsOpened,
    HostFailed {
        reason: String,
    },
}

/// Executes planned effects on a host. Failures are reported, never raised.
pub struct Dispatcher<H: Host + ?Sized> {
    host: Arc<H>,
}

impl<H: Host + ?Sized + 'static> Dispatcher<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    pub async fn dispatch(&self, request: &DispatchRequest) -> DispatchOutcome {
        let effect = plan(request);
        info!(action = %request.action, source = %request.url, "dispatching");

        match effect {
            Effect::OpenTab { url } => match self.host.open_tab(&url).await {
                Ok(()) => DispatchOutcome::TabOpened { url },
                Err(e) => {
                    warn!(error = %e, "failed to open tab");
                    DispatchOutcome::HostFailed {
                        reason: e.to_string(),
                    }
                }
            },
            Effect::WriteClipboard { text, then_open } => {
                let copied = self.host.write_clipboard(&text).await;
                let feedback = match &copied {
                    Ok(()) => Feedback::Copied,
                    Err(e) => {
                        warn!(error = %e, "failed to copy to clipboard");
                        Feedback::CopyFailed
                    }
                };
                self.flash(feedback);

                let opened = match then_open {
                    Some(landing) => match self.host.open_tab(&landing).await {
                        Ok(()) => Some(landing),
                        Err(e) => {
                            warn!(error = %e, "failed to open landing page");
                            None
                        }
                    },
                    None => None,
                };

                match copied {
                    Ok(()) => DispatchOutcome::Copied { opened },
                    Err(e) => DispatchOutcome::CopyFailed {
                        reason: e.to_string(),
                        opened,
                    },
                }
            }
            Effect::OpenSettings => match self.host.open_settings().await {
                Ok(()) => DispatchOutcome::SettingsOpened,
                Err(e) => {
                    warn!(error = %e, "failed to open settings");
                    DispatchOutcome::HostFailed {
                        reason: e.to_string(),
                    }
                }
            },
        }
    }

    /// Show transient feedback and revert it after [`FEEDBACK_REVERT_DELAY`].
    fn flash(&self, feedback: Feedback) {
        self.host.show_feedback(feedback);
        let host = Arc::clone(&self.host);
        tokio::spawn(async move {
            tokio::time::sleep(FEEDBACK_REVERT_DELAY).await;
            host.show_feedback(Feedback::Idle);
        });
    }
}
