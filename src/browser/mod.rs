// src/browser/mod.rs
//! Page rendering seam. A `SessionFactory` starts one long-lived
//! `PageSession` per worker; the pipeline drives it through `render_page`.

pub mod discovery;
pub mod http;

use std::time::Duration;

use async_trait::async_trait;

use crate::utils::error::RenderError;

pub use http::HttpSessionFactory;

/// Delay between probes while waiting for an element to appear.
pub const WAIT_POLL: Duration = Duration::from_millis(250);

/// Everything extraction needs from one rendered page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: String,
    pub html: String,
    /// Text of the identity element if it appeared within the wait bound.
    pub live_name: Option<String>,
}

#[async_trait]
pub trait PageSession: Send {
    async fn open(&mut self, url: &str) -> Result<(), RenderError>;

    /// Size metric of the rendered content, used to detect settling.
    async fn content_height(&mut self) -> Result<usize, RenderError>;

    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError>;

    /// One probe of the live document for an element carrying `class`.
    async fn find_text_by_class(&mut self, class: &str) -> Result<Option<String>, RenderError>;

    async fn page_source(&mut self) -> Result<String, RenderError>;

    /// Polls `find_text_by_class` until it yields text or `timeout` elapses.
    async fn wait_for_class(&mut self, class: &str, timeout: Duration) -> Option<String> {
        let probe = async {
            loop {
                match self.find_text_by_class(class).await {
                    Ok(Some(text)) => return Some(text),
                    Ok(None) => tokio::time::sleep(WAIT_POLL).await,
                    Err(e) => {
                        tracing::debug!("Probe for .{} failed: {}", class, e);
                        return None;
                    }
                }
            }
        };
        match tokio::time::timeout(timeout, probe).await {
            Ok(found) => found,
            Err(_) => {
                tracing::debug!("Timed out after {:?} waiting for .{}", timeout, class);
                None
            }
        }
    }
}

#[async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    type Session: PageSession + 'static;

    async fn start(&self) -> Result<Self::Session, RenderError>;
}

/// Scrolls until two consecutive height reads agree, sleeping `interval`
/// between them. Terminates once the content stops growing.
pub async fn settle<S: PageSession + ?Sized>(session: &mut S, interval: Duration) -> Result<(), RenderError> {
    let mut last_height = session.content_height().await?;
    loop {
        session.scroll_to_bottom().await?;
        tokio::time::sleep(interval).await;
        let new_height = session.content_height().await?;
        if new_height == last_height {
            return Ok(());
        }
        last_height = new_height;
    }
}

/// Opens `url`, waits for lazy content to settle, gives the identity element
/// a bounded chance to appear, then snapshots the page source.
pub async fn render_page<S: PageSession + ?Sized>(
    session: &mut S,
    url: &str,
    identity_class: &str,
    identity_timeout: Duration,
    settle_interval: Duration,
) -> Result<RenderedPage, RenderError> {
    session.open(url).await?;
    settle(session, settle_interval).await?;
    let live_name = session.wait_for_class(identity_class, identity_timeout).await;
    let html = session.page_source().await?;
    Ok(RenderedPage { url: url.to_string(), html, live_name })
}

#[cfg(test)]
pub mod testing {
    //! In-memory sessions for pipeline and rendering tests.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::{PageSession, SessionFactory};
    use crate::utils::error::RenderError;

    /// A page that grows `growth_steps` times before settling and whose
    /// identity text appears after `name_after_probes` probes.
    #[derive(Debug, Clone)]
    pub struct FakePage {
        pub html: String,
        pub growth_steps: usize,
        pub name: Option<String>,
        pub name_after_probes: usize,
    }

    impl FakePage {
        pub fn new(html: &str) -> Self {
            Self { html: html.to_string(), growth_steps: 0, name: None, name_after_probes: 0 }
        }
    }

    #[derive(Debug)]
    pub struct FakeSession {
        pages: Arc<HashMap<String, FakePage>>,
        current: Option<FakePage>,
        height: usize,
        probes: usize,
        pub scrolls: usize,
        released: Option<Arc<AtomicUsize>>,
    }

    impl FakeSession {
        fn new(pages: Arc<HashMap<String, FakePage>>, released: Option<Arc<AtomicUsize>>) -> Self {
            Self { pages, current: None, height: 0, probes: 0, scrolls: 0, released }
        }

        pub fn with_pages(pages: HashMap<String, FakePage>) -> Self {
            Self::new(Arc::new(pages), None)
        }
    }

    impl Drop for FakeSession {
        fn drop(&mut self) {
            if let Some(counter) = &self.released {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[async_trait]
    impl PageSession for FakeSession {
        async fn open(&mut self, url: &str) -> Result<(), RenderError> {
            let page = self.pages.get(url).cloned().ok_or_else(|| RenderError::Http {
                status: reqwest::StatusCode::NOT_FOUND,
                url: url.to_string(),
            })?;
            self.height = 100;
            self.probes = 0;
            self.current = Some(page);
            Ok(())
        }

        async fn content_height(&mut self) -> Result<usize, RenderError> {
            self.current.as_ref().map(|_| self.height).ok_or(RenderError::NoPage)
        }

        async fn scroll_to_bottom(&mut self) -> Result<(), RenderError> {
            let page = self.current.as_ref().ok_or(RenderError::NoPage)?;
            if self.scrolls < page.growth_steps {
                self.height += 100;
            }
            self.scrolls += 1;
            Ok(())
        }

        async fn find_text_by_class(&mut self, _class: &str) -> Result<Option<String>, RenderError> {
            let page = self.current.as_ref().ok_or(RenderError::NoPage)?;
            self.probes += 1;
            if self.probes > page.name_after_probes {
                Ok(page.name.clone())
            } else {
                Ok(None)
            }
        }

        async fn page_source(&mut self) -> Result<String, RenderError> {
            self.current.as_ref().map(|p| p.html.clone()).ok_or(RenderError::NoPage)
        }
    }

    /// Hands out sessions over a shared page map; the first `failing_starts`
    /// calls to `start` fail.
    pub struct FakeFactory {
        pages: Arc<HashMap<String, FakePage>>,
        failing_starts: AtomicUsize,
        pub started: AtomicUsize,
        pub released: Arc<AtomicUsize>,
    }

    impl FakeFactory {
        pub fn new(pages: HashMap<String, FakePage>, failing_starts: usize) -> Self {
            Self {
                pages: Arc::new(pages),
                failing_starts: AtomicUsize::new(failing_starts),
                started: AtomicUsize::new(0),
                released: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl SessionFactory for FakeFactory {
        type Session = FakeSession;

        async fn start(&self) -> Result<FakeSession, RenderError> {
            let should_fail = self
                .failing_starts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if should_fail {
                return Err(RenderError::SessionStart("no browser available".to_string()));
            }
            self.started.fetch_add(1, Ordering::SeqCst);
            Ok(FakeSession::new(Arc::clone(&self.pages), Some(Arc::clone(&self.released))))
        }
    }
}
