// src/pipeline/worker.rs
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc::UnboundedSender;

use crate::browser::{render_page, SessionFactory};
use crate::config::PipelineConfig;
use crate::extractors::RecordAssembler;
use crate::pipeline::{FailedItem, ScrapeOutcome};
use crate::utils::html_debug;

/// Consume-only queue of page URLs shared by all workers.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<String>>,
}

impl WorkQueue {
    pub fn new(urls: impl IntoIterator<Item = String>) -> Self {
        Self { items: Mutex::new(urls.into_iter().collect()) }
    }

    pub fn pop(&self) -> Option<String> {
        // a poisoned lock still holds a consistent deque
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.pop_front()
    }

    /// Takes whatever is left, e.g. when no worker could start.
    pub fn drain(&self) -> Vec<String> {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.drain(..).collect()
    }
}

/// Random pause in `[min, max]` before the next item.
pub fn politeness_delay(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let millis = rand::thread_rng().gen_range(min.as_millis()..=max.as_millis());
    Duration::from_millis(millis as u64)
}

/// One queue-draining unit owning one page session for its whole lifetime.
pub struct Worker<F: SessionFactory> {
    pub id: usize,
    pub factory: Arc<F>,
    pub queue: Arc<WorkQueue>,
    pub assembler: Arc<RecordAssembler>,
    pub config: Arc<PipelineConfig>,
    pub outcomes: UnboundedSender<ScrapeOutcome>,
    pub debug_dir: Option<PathBuf>,
}

impl<F: SessionFactory> Worker<F> {
    /// Pulls items until the queue is empty. A session that cannot start ends
    /// this worker only; its share of the queue stays for the others.
    pub async fn run(self) -> usize {
        let mut session = match self.factory.start().await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Worker {} could not start a page session: {}", self.id, e);
                return 0;
            }
        };
        tracing::debug!("Worker {} started", self.id);

        let mut processed = 0;
        while let Some(url) = self.queue.pop() {
            let outcome = self.process(&mut session, &url).await;
            processed += 1;
            if self.outcomes.send(outcome).is_err() {
                tracing::error!("Worker {}: result collector is gone, stopping", self.id);
                break;
            }
            tokio::time::sleep(politeness_delay(self.config.min_delay, self.config.max_delay)).await;
        }

        drop(session);
        tracing::debug!("Worker {} finished after {} items, session released", self.id, processed);
        processed
    }

    async fn process(&self, session: &mut F::Session, url: &str) -> ScrapeOutcome {
        let page = match render_page(
            session,
            url,
            &self.config.selectors.scheme_name,
            self.config.identity_timeout,
            self.config.settle_interval,
        )
        .await
        {
            Ok(page) => page,
            Err(e) => {
                tracing::error!("{} could not be rendered: {}", url, e);
                return ScrapeOutcome::Failed(FailedItem::new(url, e.to_string()));
            }
        };

        match self.assembler.assemble(&page) {
            Ok(record) => {
                tracing::info!("{} data added successfully.", record.fund_name);
                ScrapeOutcome::Scraped(record)
            }
            Err(e) => {
                tracing::error!("{} data could not be added: {}", url, e);
                if let Some(dir) = &self.debug_dir {
                    if let Err(save_err) = html_debug::save_annotated_page(&page.html, url, dir) {
                        tracing::warn!("Failed to save debug HTML for {}: {}", url, save_err);
                    }
                }
                ScrapeOutcome::Failed(FailedItem::new(url, e.to_string()))
            }
        }
    }
}
