//! Batch driver: generate every tool with bounded concurrency.
//!
//! ```text
//! load tools ──► [tool 1] [tool 2] ... [tool N]   at most `concurrency`
//!                   │        │             │       in flight at once
//!                   ▼        ▼             ▼
//!                ToolOutcome (any order) ──► BatchReport
//!                                              │
//!                                              ▼
//!                                   write tools/tools_list.json (once)
//! ```
//!
//! All tools run as futures on the calling task, multiplexed with
//! `buffer_unordered` and admitted through a counting semaphore. One tool
//! failing never cancels the others; every tool settles before the manifest
//! is written.

use crate::cache::{CacheStats, CacheStore};
use crate::config::{ProjectPaths, SiteConfig, SiteSection};
use crate::generate::{ContentGenerator, RecordSource, RunMode, ToolFailure, ToolOutcome};
use crate::llm::CompletionClient;
use crate::manifest::{ManifestError, load_tools, write_manifest};
use crate::retry::RetryPolicy;
use crate::runlog::RunLog;
use crate::template::PageTemplate;
use crate::types::Tool;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use tracing::info;

/// Default number of tools generated at once.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Called with `(outcome, settled, total)` each time a tool settles.
pub type ProgressCallback = Arc<dyn Fn(&ToolOutcome, usize, usize) + Send + Sync>;

/// Everything a batch run produced.
#[derive(Debug)]
pub struct BatchReport {
    /// In completion order.
    pub outcomes: Vec<ToolOutcome>,
    pub stats: CacheStats,
    /// Tools written to the navigation manifest, in input order.
    pub tools: Vec<Tool>,
}

impl BatchReport {
    pub fn failures(&self) -> impl Iterator<Item = &ToolFailure> {
        self.outcomes.iter().filter_map(|o| match o {
            ToolOutcome::Failed(f) => Some(f),
            ToolOutcome::Written(_) => None,
        })
    }
}

/// Tally outcomes into cache statistics.
pub fn stats_for(outcomes: &[ToolOutcome]) -> CacheStats {
    let mut stats = CacheStats::default();
    for outcome in outcomes {
        match outcome {
            ToolOutcome::Written(r) if r.source == RecordSource::Cache => stats.cached += 1,
            ToolOutcome::Written(_) => stats.generated += 1,
            ToolOutcome::Failed(_) => stats.failed += 1,
        }
    }
    stats
}

pub struct BatchDriver<'a, C: ?Sized> {
    client: &'a C,
    cache: &'a CacheStore,
    template: &'a PageTemplate,
    log: &'a RunLog,
    site: &'a SiteSection,
    paths: &'a ProjectPaths,
    retry: RetryPolicy,
    concurrency: usize,
    progress: Option<ProgressCallback>,
}

impl<'a, C: CompletionClient + ?Sized> BatchDriver<'a, C> {
    /// Driver with retry budget and concurrency taken from `config`.
    pub fn new(
        client: &'a C,
        cache: &'a CacheStore,
        template: &'a PageTemplate,
        log: &'a RunLog,
        config: &'a SiteConfig,
        paths: &'a ProjectPaths,
    ) -> Self {
        Self {
            client,
            cache,
            template,
            log,
            site: &config.site,
            paths,
            retry: RetryPolicy::from_config(&config.generation),
            concurrency: config.generation.concurrency,
            progress: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ToolOutcome, usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Load the tool list, generate every tool, then write the manifest.
    ///
    /// Only setup problems (no tool list, unreadable manifest, manifest write
    /// failure) are errors. Per-tool failures are in the report.
    pub async fn run(&self, mode: RunMode) -> Result<BatchReport, ManifestError> {
        let tools = load_tools(&self.paths.manifest, &self.paths.tool_list).await?;
        info!(
            "building {} tools ({:?}, concurrency {})",
            tools.len(),
            mode,
            self.concurrency
        );

        let outcomes = self.run_tools(&tools, mode).await;
        write_manifest(&self.paths.manifest, &tools).await?;

        Ok(BatchReport {
            stats: stats_for(&outcomes),
            outcomes,
            tools,
        })
    }

    /// Generate `tools`, returning outcomes in completion order.
    pub async fn run_tools(&self, tools: &[Tool], mode: RunMode) -> Vec<ToolOutcome> {
        let concurrency = self.concurrency.max(1);
        let semaphore = Semaphore::new(concurrency);
        let settled = AtomicUsize::new(0);
        let total = tools.len();
        let generator = ContentGenerator::new(
            self.client,
            self.cache,
            self.template,
            self.log,
            self.site,
            &self.paths.tools_dir,
        )
        .with_retry(self.retry.clone())
        .with_navigation(tools);

        stream::iter(tools)
            .map(|tool| {
                let semaphore = &semaphore;
                let settled = &settled;
                let generator = &generator;
                let progress = self.progress.clone();

                async move {
                    let _permit = semaphore.acquire().await;

                    let outcome = generator.generate(tool, mode).await;

                    let done = settled.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(cb) = progress {
                        cb(&outcome, done, total);
                    }
                    outcome
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await
    }
}
