//! # Context Bridge
//!
//! Send page content to AI chat services, or carry a whole conversation from
//! one service over to another.
//!
//! ## Features
//!
//! - **Conversation extraction**: per-platform selector cascades with role inference
//! - **Page excerpts**: main-content capture when there is no conversation
//! - **Dispatch**: one action, one effect (new tab, clipboard, or settings)
//! - **Site exclusions**: regex blocklist persisted in sled

pub mod bridge;
pub mod cascade;
pub mod config;
pub mod dispatch;
pub mod excerpt;
pub mod exclusion;
pub mod extract;
pub mod host;
pub mod message;
pub mod page;
pub mod platform;
pub mod storage;
pub mod transcript;

pub use config::Config;
pub use dispatch::{ActionId, DispatchOutcome, DispatchRequest, Dispatcher, Service};
pub use extract::{extract, ExtractMode, ExtractRequest};
pub use message::BridgeMessage;
pub use page::{Page, StaticPage};
pub use platform::Platform;
pub use storage::{Settings, SettingsStore};
pub use transcript::{Role, Transcript, Turn};
