//! Page sources for extraction.
//!
//! A [`Page`] is whatever the extractor reads from: a live document behind
//! some host, a saved HTML file, or a page fetched over HTTP with reqwest.

use crate::config::FetchConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to fetch URL: {0}")]
    Request(#[from] reqwest::Error),
    #[error("no content found at URL")]
    Empty,
}

/// A document the extractor can sample.
#[async_trait]
pub trait Page: Send {
    /// The page's address, used for platform detection and in messages.
    fn url(&self) -> &str;

    /// Current HTML snapshot of the document.
    fn html(&self) -> &str;

    /// Scroll the conversation's scrollable region back to the top so
    /// lazily rendered turns get materialised.
    async fn scroll_to_top(&mut self) {}
}

/// A fixed HTML document. Scrolling has nothing to render.
#[derive(Debug, Clone)]
pub struct StaticPage {
    url: String,
    html: String,
}

impl StaticPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

impl Page for StaticPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn html(&self) -> &str {
        &self.html
    }
}

/// Create a configured HTTP client for fetching pages
fn create_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
}

/// Fetch a page over HTTP and wrap it as a [`StaticPage`].
pub async fn fetch(url: &str, config: &FetchConfig) -> Result<StaticPage, FetchError> {
    let client = create_client(config)?;

    let response = client.get(url).send().await?.error_for_status()?;
    let final_url = response.url().to_string();
    let html = response.text().await?;

    if html.trim().is_empty() {
        return Err(FetchError::Empty);
    }
    debug!(url = %final_url, bytes = html.len(), "fetched page");

    Ok(StaticPage::new(final_url, html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_page_exposes_its_parts() {
        let mut page = StaticPage::new("https://example.com", "<p>hi</p>");
        page.scroll_to_top().await;
        assert_eq!(page.url(), "https://example.com");
        assert_eq!(page.html(), "<p>hi</p>");
    }
}
