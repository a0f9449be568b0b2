//! Page-side glue: turns a user action on a page into a [`BridgeMessage`].
//!
//! The selection is captured by the caller when the action fires and passed
//! in explicitly; nothing here remembers it between invocations.

use crate::dispatch::ActionId;
use crate::extract::{extract, ExtractRequest};
use crate::message::BridgeMessage;
use crate::page::Page;
use crate::platform::Platform;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BridgeError {
    #[error("conversation continuation is not supported on {url}; open a ChatGPT, Claude, Gemini or Grok conversation first")]
    UnsupportedPlatform { url: String },
}

/// Build the message for `action` fired on `page` with the given selection.
pub async fn trigger<P: Page + ?Sized>(
    action: ActionId,
    page: &mut P,
    selection: Option<String>,
) -> Result<BridgeMessage, BridgeError> {
    let mut message = BridgeMessage::new(action);
    message.url = Some(page.url().to_string());

    if action.is_continuation() {
        let platform = Platform::from_url(page.url());
        if !platform.supports_transcript() {
            return Err(BridgeError::UnsupportedPlatform {
                url: page.url().to_string(),
            });
        }
        let conversation = extract(page, &ExtractRequest::continuation(selection)).await;
        message.conversation = Some(conversation);
        message.from_platform = Some(platform.name().to_string());
    } else if action.carries_payload() {
        let text = extract(page, &ExtractRequest::share(selection)).await;
        message.selected_text = Some(text);
    }

    Ok(message)
}
