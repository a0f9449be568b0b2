//! End-to-end: page fixture -> bridge message (JSON) -> dispatcher -> host.

use std::sync::Arc;

use context_bridge::bridge::trigger;
use context_bridge::host::{DryRunHost, HostCall};
use context_bridge::{
    ActionId, BridgeMessage, DispatchOutcome, DispatchRequest, Dispatcher, Service, SettingsStore,
    StaticPage,
};

const CHATGPT_CONVERSATION: &str = r#"<!doctype html>
<html><body>
  <nav>New chat | Library</nav>
  <main>
    <article data-testid="conversation-turn-1">
      <div data-message-author-role="user"><div class="whitespace-pre-wrap">How do I read a file in Rust?</div></div>
    </article>
    <article data-testid="conversation-turn-2">
      <div data-message-author-role="assistant"><div class="markdown">
        <p>Use std::fs::read_to_string.</p>
        <pre><code>let s = std::fs::read_to_string("a.txt")?;</code></pre>
      </div></div>
      <div><button>Copy</button><button>Retry</button></div>
    </article>
  </main>
</body></html>"#;

/// Send a message across the component boundary the way the page does.
async fn round_trip(message: BridgeMessage) -> (DispatchOutcome, Vec<HostCall>) {
    let json = serde_json::to_string(&message).unwrap();
    let received: BridgeMessage = serde_json::from_str(&json).unwrap();

    let host = Arc::new(DryRunHost::silent());
    let dispatcher = Dispatcher::new(Arc::clone(&host));
    let outcome = dispatcher.dispatch(&DispatchRequest::from(received)).await;
    (outcome, host.calls())
}

#[tokio::test(start_paused = true)]
async fn selection_opens_chatgpt_with_encoded_prompt() {
    let mut page = StaticPage::new("https://example.com", "<main><p>Unrelated page text</p></main>");
    let message = trigger(ActionId::OpenIn(Service::ChatGpt), &mut page, Some("Hello".into()))
        .await
        .unwrap();

    let (outcome, calls) = round_trip(message).await;
    let DispatchOutcome::TabOpened { url } = outcome else {
        panic!("expected a tab, got {outcome:?}");
    };
    assert_eq!(calls, vec![HostCall::OpenTab(url.clone())]);

    let query = url.strip_prefix("https://chatgpt.com/?q=").unwrap();
    let prompt = urlencoding::decode(query).unwrap();
    assert!(prompt.contains("https://example.com"));
    assert!(prompt.contains("Hello"));
    assert!(!prompt.contains("Unrelated"));
}

#[tokio::test(start_paused = true)]
async fn chatgpt_conversation_continues_in_claude_via_clipboard() {
    let mut page = StaticPage::new("https://chatgpt.com/c/abc", CHATGPT_CONVERSATION);
    let message = trigger(ActionId::ContinueIn(Service::Claude), &mut page, None)
        .await
        .unwrap();

    let (outcome, calls) = round_trip(message).await;
    assert_eq!(
        outcome,
        DispatchOutcome::Copied {
            opened: Some("https://claude.ai/new".into())
        }
    );
    assert_eq!(calls.len(), 2);

    let HostCall::WriteClipboard(text) = &calls[0] else {
        panic!("clipboard must be written before the landing page opens");
    };
    assert!(text.starts_with("This is a continuation of a conversation from ChatGPT"));
    assert!(text.contains("User: How do I read a file in Rust?"));
    assert!(text.contains("\n\n---\n\nAssistant: Use std::fs::read_to_string."));
    assert!(!text.contains("Retry"));
    assert!(!text.contains("New chat"));
    assert_eq!(calls[1], HostCall::OpenTab("https://claude.ai/new".into()));
}

#[tokio::test(start_paused = true)]
async fn empty_chatgpt_page_sends_sentinel() {
    let mut page = StaticPage::new("https://chatgpt.com/", "<main><h1>What can I help with?</h1></main>");
    let message = trigger(ActionId::ContinueIn(Service::Grok), &mut page, None)
        .await
        .unwrap();
    assert_eq!(
        message.conversation.as_deref(),
        Some("No conversation found. Make sure you are on a ChatGPT conversation page.")
    );
}

#[tokio::test(start_paused = true)]
async fn share_without_selection_sends_capped_excerpt() {
    let body = "Lorem ipsum dolor sit amet. ".repeat(200);
    let html = format!("<body><header>Logo</header><article><p>{body}</p></article><footer>Legal</footer></body>");
    let mut page = StaticPage::new("https://blog.example.com/post", html);
    let message = trigger(ActionId::OpenInCursor, &mut page, None).await.unwrap();

    let text = message.selected_text.clone().unwrap();
    assert_eq!(text.chars().count(), 2000);
    assert!(!text.contains("Logo"));

    let (_, calls) = round_trip(message).await;
    let HostCall::WriteClipboard(clip) = &calls[0] else {
        panic!("cursor action writes the clipboard");
    };
    assert!(clip.starts_with("Context from https://blog.example.com/post:\n\n"));
}

#[test]
fn stored_exclusion_blocks_injection() {
    let tmp = tempfile::tempdir().unwrap();
    let store = SettingsStore::open(tmp.path().join("settings")).unwrap();
    store.add_pattern(r".*example\.com.*").unwrap();

    let settings = store.snapshot().unwrap();
    assert!(!settings.should_inject("https://example.com/page"));
    assert!(settings.should_inject("https://chatgpt.com/c/abc"));
}
