//! Shared test utilities for the toolpress test suite.
//!
//! Provides a scripted [`MockClient`] that stands in for the model API, and
//! fixture builders for a throwaway project directory.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let project = Project::new();
//! let client = MockClient::new()
//!     .with_replies(vec![MockReply::RateLimited]);
//!
//! let generator = project.generator(&client);
//! let outcome = generator.generate(&Tool::new("Timer"), RunMode::default()).await;
//!
//! assert_eq!(client.prompts().len(), 3);
//! ```
//!
//! Unless scripted otherwise, the mock answers the SEO prompt with complete
//! metadata and the markup prompt with a small `<div>` for whichever tool the
//! prompt names.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;

use crate::cache::CacheStore;
use crate::config::{ProjectPaths, SiteConfig};
use crate::generate::ContentGenerator;
use crate::llm::{CompletionClient, LlmError};
use crate::retry::RetryPolicy;
use crate::runlog::RunLog;
use crate::template::PageTemplate;
use crate::types::{GenerationRecord, HtmlRecord, Keywords, SeoRecord, Tool};

// =========================================================================
// Mock model client
// =========================================================================

/// One scripted answer. Scripted answers are used in order before the mock
/// falls back to its default replies.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    RateLimited,
    ServerError,
}

impl MockReply {
    pub fn json(value: serde_json::Value) -> Self {
        MockReply::Text(value.to_string())
    }

    fn into_result(self) -> Result<String, LlmError> {
        match self {
            MockReply::Text(s) => Ok(s),
            MockReply::RateLimited => Err(LlmError::RateLimited),
            MockReply::ServerError => Err(LlmError::Api {
                status: 500,
                body: "internal error".into(),
            }),
        }
    }
}

#[derive(Default)]
pub struct MockClient {
    scripted: Mutex<VecDeque<MockReply>>,
    prompts: Mutex<Vec<String>>,
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(self, replies: Vec<MockReply>) -> Self {
        *self.scripted.lock().unwrap() = replies.into();
        self
    }

    /// Hold every call open for `delay` (use with paused tokio time).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Every prompt received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Highest number of calls that were in progress at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn default_reply(prompt: &str) -> String {
        let name = prompt
            .split_once("named '")
            .and_then(|(_, rest)| rest.split_once('\''))
            .map(|(name, _)| name)
            .unwrap_or("Tool");
        if prompt.contains("\"long_tail_content\"") {
            json!({
                "title": format!("{name} - Free Online Tool"),
                "description": format!("Use {name} online for free."),
                "keywords": ["free", "online", name],
                "long_tail_content": format!("<p>About {name}.</p>"),
            })
            .to_string()
        } else {
            json!({ "html": format!("<div class=\"tool\">{name}</div>") }).to_string()
        }
    }
}

#[async_trait]
impl CompletionClient for MockClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let scripted = self.scripted.lock().unwrap().pop_front();
        match scripted {
            Some(reply) => reply.into_result(),
            None => Ok(Self::default_reply(prompt)),
        }
    }
}

// =========================================================================
// Fixture setup
// =========================================================================

/// A temporary project directory with stock config and template.
pub struct Project {
    pub dir: TempDir,
    pub config: SiteConfig,
    pub paths: ProjectPaths,
    pub template: PageTemplate,
    pub cache: CacheStore,
    pub log: RunLog,
}

impl Project {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.site.base_url = "https://tools.example.com".into();
        let paths = config.paths.resolve(dir.path());
        let template = PageTemplate::from_source(
            &config.paths.template,
            "<title>{{ title }}</title><meta name=\"description\" content=\"{{ description }}\">\
             <link rel=\"canonical\" href=\"{{ canonical_url }}\">\
             <ul>{{ navigation }}</ul><main>{{ body_content }}</main>",
        )
        .unwrap();
        let cache = CacheStore::new(&paths.cache_dir);
        let log = RunLog::new(&paths.log_file);
        Self {
            dir,
            config,
            paths,
            template,
            cache,
            log,
        }
    }

    /// Generator with zero backoff so retries don't need paused time.
    pub fn generator<'a>(&'a self, client: &'a MockClient) -> ContentGenerator<'a, MockClient> {
        ContentGenerator::new(
            client,
            &self.cache,
            &self.template,
            &self.log,
            &self.config.site,
            &self.paths.tools_dir,
        )
        .with_retry(RetryPolicy {
            max_attempts: 3,
            rate_limit_cooldown: Duration::ZERO,
            backoff_min: Duration::ZERO,
            backoff_max: Duration::ZERO,
        })
    }

    pub fn read_output(&self, relative: &str) -> String {
        std::fs::read_to_string(self.paths.output_dir.join(relative))
            .unwrap_or_else(|e| panic!("cannot read {relative}: {e}"))
    }

    pub fn log_lines(&self) -> Vec<String> {
        std::fs::read_to_string(&self.paths.log_file)
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }
}

/// A complete record, as the model would produce for `name`.
pub fn complete_record(name: &str) -> GenerationRecord {
    GenerationRecord {
        seo: SeoRecord {
            title: Some(format!("{name} Online")),
            description: Some(format!("Cached description of {name}")),
            keywords: Some(Keywords::Text("cached, tool".into())),
            long_tail_content: Some("<p>Cached long tail.</p>".into()),
        },
        html: HtmlRecord {
            html: Some(format!("<div id=\"cached\">{name}</div>")),
        },
    }
}

pub fn tools(names: &[&str]) -> Vec<Tool> {
    names.iter().map(|n| Tool::new(*n)).collect()
}
