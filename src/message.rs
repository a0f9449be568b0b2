//! Wire shape of the message sent from the page side to the dispatcher.

use crate::dispatch::{ActionId, DispatchRequest};
use serde::{Deserialize, Serialize};

/// Cross-component message. No acknowledgement is expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeMessage {
    pub action: ActionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_platform: Option<String>,
}

impl BridgeMessage {
    pub fn new(action: ActionId) -> Self {
        Self {
            action,
            url: None,
            selected_text: None,
            conversation: None,
            from_platform: None,
        }
    }
}

impl From<BridgeMessage> for DispatchRequest {
    fn from(message: BridgeMessage) -> Self {
        let payload = if message.action.is_continuation() {
            message.conversation
        } else {
            message.selected_text
        };
        DispatchRequest {
            action: message.action,
            url: message.url.unwrap_or_default(),
            payload: payload.unwrap_or_default(),
            source_platform: message.from_platform,
        }
    }
}
