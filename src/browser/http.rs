// src/browser/http.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;

use crate::browser::{PageSession, SessionFactory};
use crate::document::{Document, Query};
use crate::utils::error::RenderError;

// Listing and fund pages refuse obvious bot agents.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Creates a reqwest client configured like a desktop browser.
pub fn build_client(user_agent: &str) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
}

/// Fetches `url` and returns the body, mapping failure statuses.
pub async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String, RenderError> {
    let response = client
        .get(url)
        .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*;q=0.8")
        .send()
        .await?; // Propagates reqwest::Error as RenderError::Network

    let status = response.status();
    if !status.is_success() {
        tracing::error!("HTTP error status: {} for URL: {}", status, url);
        if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("Received {} - backing off is advisable.", status);
            return Err(RenderError::RateLimited(url.to_string()));
        }
        return Err(RenderError::Http { status, url: url.to_string() });
    }

    let body = response.text().await?;
    tracing::debug!("Downloaded {} bytes from {}", body.len(), url);
    Ok(body)
}

/// Session over plain HTTP: the fetched markup is the rendered page. Content
/// never changes after `open`, so scrolling is a no-op and the identity wait
/// is a single probe.
pub struct HttpSession {
    id: usize,
    client: reqwest::Client,
    page: Option<String>,
}

impl HttpSession {
    fn html(&self) -> Result<&str, RenderError> {
        self.page.as_deref().ok_or(RenderError::NoPage)
    }
}

impl Drop for HttpSession {
    fn drop(&mut self) {
        tracing::debug!("Released page session #{}", self.id);
    }
}

#[async_trait]
impl PageSession for HttpSession {
    async fn open(&mut self, url: &str) -> Result<(), RenderError> {
        self.page = None;
        let body = fetch_html(&self.client, url).await?;
        self.page = Some(body);
        Ok(())
    }

    async fn content_height(&mut self) -> Result<usize, RenderError> {
        Ok(self.html()?.len())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError> {
        self.html().map(|_| ())
    }

    async fn find_text_by_class(&mut self, class: &str) -> Result<Option<String>, RenderError> {
        let query = Query::new(None, class).map_err(|e| RenderError::Probe(e.to_string()))?;
        Ok(text_of_first(self.html()?, &query))
    }

    async fn page_source(&mut self) -> Result<String, RenderError> {
        self.html().map(str::to_string)
    }

    async fn wait_for_class(&mut self, class: &str, _timeout: Duration) -> Option<String> {
        match self.find_text_by_class(class).await {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!("Identity probe failed: {}", e);
                None
            }
        }
    }
}

fn text_of_first(html: &str, query: &Query) -> Option<String> {
    let doc = Document::parse(html);
    doc.find_first(query)
        .map(|el| el.text().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Starts one `HttpSession` per worker.
pub struct HttpSessionFactory {
    user_agent: String,
    next_id: AtomicUsize,
}

impl HttpSessionFactory {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self { user_agent: user_agent.into(), next_id: AtomicUsize::new(1) }
    }
}

impl Default for HttpSessionFactory {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT)
    }
}

#[async_trait]
impl SessionFactory for HttpSessionFactory {
    type Session = HttpSession;

    async fn start(&self) -> Result<HttpSession, RenderError> {
        let client = build_client(&self.user_agent)
            .map_err(|e| RenderError::SessionStart(e.to_string()))?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Started page session #{}", id);
        Ok(HttpSession { id, client, page: None })
    }
}
