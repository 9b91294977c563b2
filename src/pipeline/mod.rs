// src/pipeline/mod.rs
//! Fixed-size worker pool over a shared URL queue. Workers report through a
//! channel to a single collector; nothing else is shared between them.

pub mod worker;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::browser::SessionFactory;
use crate::config::PipelineConfig;
use crate::extractors::RecordAssembler;
use crate::record::FundRecord;
use crate::utils::AppError;

pub use worker::{WorkQueue, Worker};

const PROGRESS_EVERY: usize = 10;

/// A URL that produced no record, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedItem {
    pub url: String,
    pub reason: String,
}

impl FailedItem {
    pub fn new(url: &str, reason: impl Into<String>) -> Self {
        Self { url: url.to_string(), reason: reason.into() }
    }
}

#[derive(Debug)]
pub enum ScrapeOutcome {
    Scraped(FundRecord),
    Failed(FailedItem),
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub records: Vec<FundRecord>,
    pub failures: Vec<FailedItem>,
}

/// Scrapes every URL with `config.workers` workers. Completion order is not
/// preserved.
pub async fn run_pipeline<F: SessionFactory>(
    factory: Arc<F>,
    urls: Vec<String>,
    config: PipelineConfig,
    debug_dir: Option<PathBuf>,
) -> Result<RunReport, AppError> {
    let total = urls.len();
    let assembler = Arc::new(RecordAssembler::new(config.selectors.clone())?);
    let queue = Arc::new(WorkQueue::new(urls));
    let worker_count = config.workers.max(1);
    let config = Arc::new(config);
    let (tx, mut rx) = mpsc::unbounded_channel();

    tracing::info!("Starting scraping with {} workers for {} URLs...", worker_count, total);

    let handles: Vec<_> = (0..worker_count)
        .map(|id| {
            let worker = Worker {
                id,
                factory: Arc::clone(&factory),
                queue: Arc::clone(&queue),
                assembler: Arc::clone(&assembler),
                config: Arc::clone(&config),
                outcomes: tx.clone(),
                debug_dir: debug_dir.clone(),
            };
            tokio::spawn(worker.run())
        })
        .collect();
    drop(tx); // the channel closes once every worker is done

    let mut report = RunReport::default();
    let mut processed = 0;
    while let Some(outcome) = rx.recv().await {
        match outcome {
            ScrapeOutcome::Scraped(record) => report.records.push(record),
            ScrapeOutcome::Failed(item) => report.failures.push(item),
        }
        processed += 1;
        if processed % PROGRESS_EVERY == 0 {
            tracing::info!("Processed {}/{} URLs", processed, total);
        }
    }

    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!("Worker task aborted: {}", e);
        }
    }

    // only non-empty when every worker failed to start or aborted
    for url in queue.drain() {
        report.failures.push(FailedItem::new(&url, "not processed: no page session available"));
    }

    tracing::info!(
        "Processing finished. Success: {}, Failures: {}",
        report.records.len(),
        report.failures.len()
    );
    Ok(report)
}

/// Display lines for the first `limit` failures plus a remainder count.
pub fn summarize_failures(failures: &[FailedItem], limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = failures
        .iter()
        .take(limit)
        .map(|f| format!("Task for URL {} failed with error: {}", f.url, f.reason))
        .collect();
    if failures.len() > limit {
        lines.push(format!("...and {} more.", failures.len() - limit));
    }
    lines
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::browser::testing::{FakeFactory, FakePage};

    fn fund_page(name: &str, fund_type: &str) -> String {
        format!(
            r#"<html><body>
                 <h1 class="mfh239SchemeName">{name}</h1>
                 <div class="mfh239PillsContainer">Equity</div>
                 <div class="mfh239PillsContainer">{fund_type}</div>
               </body></html>"#
        )
    }

    fn fast_config(workers: usize) -> PipelineConfig {
        PipelineConfig {
            workers,
            identity_timeout: Duration::from_millis(50),
            settle_interval: Duration::from_millis(1),
            min_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(3),
            ..Default::default()
        }
    }

    fn pages(n: usize) -> (Vec<String>, HashMap<String, FakePage>) {
        let urls: Vec<String> = (0..n).map(|i| format!("https://example.com/fund{}", i)).collect();
        let map = urls
            .iter()
            .enumerate()
            .map(|(i, url)| (url.clone(), FakePage::new(&fund_page(&format!("Fund {}", i), "Large Cap"))))
            .collect();
        (urls, map)
    }

    #[tokio::test]
    async fn processes_every_url() {
        let (urls, map) = pages(7);
        let factory = Arc::new(FakeFactory::new(map, 0));
        let report = run_pipeline(Arc::clone(&factory), urls, fast_config(3), None).await.unwrap();

        assert_eq!(report.records.len(), 7);
        assert!(report.failures.is_empty());
        let mut names: Vec<_> = report.records.iter().map(|r| r.fund_name.clone()).collect();
        names.sort();
        assert_eq!(names[0], "Fund 0");
        assert!(report.records.iter().all(|r| r.fund_type == "Large Cap"));
        // one session per worker, each released
        assert_eq!(factory.started.load(Ordering::SeqCst), 3);
        assert_eq!(factory.released.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn failures_do_not_cross_items() {
        let (mut urls, mut map) = pages(2);
        urls.push("https://example.com/missing".to_string());
        urls.push("https://example.com/anonymous".to_string());
        map.insert(
            "https://example.com/anonymous".to_string(),
            FakePage::new("<html><body><p>no heading</p></body></html>"),
        );
        let factory = Arc::new(FakeFactory::new(map, 0));
        let report = run_pipeline(factory, urls, fast_config(2), None).await.unwrap();

        assert_eq!(report.records.len(), 2);
        let mut failed: Vec<_> = report.failures.iter().map(|f| f.url.as_str()).collect();
        failed.sort();
        assert_eq!(failed, ["https://example.com/anonymous", "https://example.com/missing"]);
    }

    #[tokio::test]
    async fn session_start_failure_only_stops_that_worker() {
        let (urls, map) = pages(5);
        let factory = Arc::new(FakeFactory::new(map, 1));
        let report = run_pipeline(Arc::clone(&factory), urls, fast_config(2), None).await.unwrap();

        assert_eq!(report.records.len(), 5);
        assert!(report.failures.is_empty());
        assert_eq!(factory.started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_sessions_means_every_item_fails() {
        let (urls, map) = pages(3);
        let factory = Arc::new(FakeFactory::new(map, 2));
        let report = run_pipeline(factory, urls, fast_config(2), None).await.unwrap();

        assert!(report.records.is_empty());
        assert_eq!(report.failures.len(), 3);
        assert!(report.failures[0].reason.contains("no page session"));
    }

    #[tokio::test]
    async fn live_identity_wins_over_static_heading() {
        let url = "https://example.com/live".to_string();
        let mut page = FakePage::new(&fund_page("Static Name", "Debt"));
        page.name = Some("Live Name".to_string());
        let factory = Arc::new(FakeFactory::new(HashMap::from([(url.clone(), page)]), 0));
        let report = run_pipeline(factory, vec![url], fast_config(1), None).await.unwrap();

        assert_eq!(report.records[0].fund_name, "Live Name");
        assert_eq!(report.records[0].fund_type, "Debt");
    }

    #[tokio::test]
    async fn debug_dir_gets_failed_pages() {
        let dir = std::env::temp_dir().join(format!("fund_extractor_debug_{}", std::process::id()));
        let url = "https://example.com/mutual-funds/broken-fund".to_string();
        let page = FakePage::new("<html><body><div>Fund size ₹10 Cr</div></body></html>");
        let factory = Arc::new(FakeFactory::new(HashMap::from([(url.clone(), page)]), 0));
        let report = run_pipeline(factory, vec![url], fast_config(1), Some(dir.clone())).await.unwrap();

        assert_eq!(report.failures.len(), 1);
        let saved = std::fs::read_to_string(dir.join("broken-fund_annotated.html")).unwrap();
        assert!(saved.contains("hl-aum"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn summary_is_capped() {
        let failures: Vec<_> = (0..13).map(|i| FailedItem::new(&format!("u{}", i), "boom")).collect();
        let lines = summarize_failures(&failures, 10);
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "Task for URL u0 failed with error: boom");
        assert_eq!(lines[10], "...and 3 more.");

        assert_eq!(summarize_failures(&failures[..2], 10).len(), 2);
    }
}
