//! Per-tool page generation.
//!
//! The core of a build. For one tool, [`ContentGenerator::generate`] walks
//! this state machine and always settles in `Written` or `Failed`:
//!
//! ```text
//!                 cached & !force          complete          rendered
//!   start ──────────► CacheHit ──────► Validating ──────► Rendering ──────► Written
//!     │                                 ▲     │                │
//!     │ otherwise                       │     │ missing        │ I/O or
//!     ▼                                 │     │ fields         │ template
//!   Generating ─────────────────────────┘     ▼                ▼ error
//!     │  2 model calls, parsed, cached      Failed ◄───────────┘
//!     │
//!     └── retries exhausted / cache write error / refresh mode ──► Failed
//! ```
//!
//! ## Model calls
//!
//! A generation makes two requests, one after the other, each wrapped in
//! [`with_retry`]: SEO metadata (`title`, `description`, `keywords`,
//! `long_tail_content`) and the tool markup (`html`). Responses go through
//! the [flexible parser](crate::parse) and the combined record is cached
//! before validation.
//!
//! ## Output
//!
//! ```text
//! <output_dir>/tools/<slug>/
//! ├── index.html       # Full page rendered through the template
//! └── tool_code.html   # The markup exactly as generated
//! ```
//!
//! The page body is the content of the markup's `<body>` element when it has
//! one (models often return a whole document), followed by the long-tail SEO
//! content.
//!
//! ## Failures
//!
//! Failures never escape as `Err`: each tool's result comes back as a
//! [`ToolOutcome`] value so one bad tool can't take down its siblings.
//! Every outcome is also appended to the run log.

use crate::cache::CacheStore;
use crate::config::SiteSection;
use crate::llm::{CompletionClient, LlmError};
use crate::parse::{html_from_record, parse, seo_from_record};
use crate::retry::{RetryPolicy, with_retry};
use crate::runlog::{LogStatus, RunLog};
use crate::template::{PageContext, PageTemplate, TemplateError, render_navigation};
use crate::types::{GenerationRecord, Tool, ValidSeo};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

/// Tool pages live at `tools/<slug>/index.html`, two levels below the root.
pub const TOOL_PAGE_DEPTH: usize = 2;

static BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<body(?:\s[^>]*)?>(.*)</body>").expect("body pattern is valid")
});

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("model error: {0}")]
    Model(#[from] LlmError),
    #[error("not cached (refresh never calls the model)")]
    NotCached,
    #[error("incomplete generation, missing: {}", .missing.join(", "))]
    Incomplete { missing: Vec<&'static str> },
    #[error("cache write failed: {0}")]
    Cache(#[source] std::io::Error),
    #[error("render error: {0}")]
    Render(#[from] TemplateError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a run treats the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Use cached records when present; `force` regenerates everything.
    Generate { force: bool },
    /// Re-render from cache only. Tools without a cache entry fail.
    Refresh,
}

impl Default for RunMode {
    fn default() -> Self {
        RunMode::Generate { force: false }
    }
}

impl RunMode {
    /// `refresh` wins over `force`.
    pub fn from_flags(force: bool, refresh: bool) -> Self {
        if refresh {
            RunMode::Refresh
        } else {
            RunMode::Generate { force }
        }
    }
}

/// Per-tool pipeline states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolState {
    CacheHit,
    Generating,
    Validating,
    Rendering,
    Written,
    Failed,
}

/// Where a written page's record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    Cache,
    Model,
}

#[derive(Debug)]
pub struct ToolReport {
    pub tool: Tool,
    pub source: RecordSource,
    pub page: PathBuf,
}

#[derive(Debug)]
pub struct ToolFailure {
    pub tool: Tool,
    /// State the tool was in when it failed.
    pub stage: ToolState,
    pub error: GenerateError,
}

/// Terminal result for one tool.
#[derive(Debug)]
pub enum ToolOutcome {
    Written(ToolReport),
    Failed(ToolFailure),
}

impl ToolOutcome {
    pub fn tool(&self) -> &Tool {
        match self {
            ToolOutcome::Written(r) => &r.tool,
            ToolOutcome::Failed(f) => &f.tool,
        }
    }

    pub fn state(&self) -> ToolState {
        match self {
            ToolOutcome::Written(_) => ToolState::Written,
            ToolOutcome::Failed(_) => ToolState::Failed,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, ToolOutcome::Written(_))
    }
}

type StageResult<T> = Result<T, (ToolState, GenerateError)>;

/// Prompt for SEO metadata.
pub fn seo_prompt(name: &str) -> String {
    format!(
        "Generate an SEO-optimized title, meta description and keywords for a free online \
         web tool named '{name}'. Also write long_tail_content: two or three short HTML \
         paragraphs (<p> elements only) explaining what the tool does and how to use it.\n\
         Respond with a single JSON object with the keys \"title\", \"description\", \
         \"keywords\" and \"long_tail_content\". Do not add any other text."
    )
}

/// Prompt for the tool markup.
pub fn markup_prompt(name: &str) -> String {
    format!(
        "Generate fully functional HTML and JavaScript for a web tool named '{name}'. \
         Include the forms, buttons and output areas the tool needs, with inline <script> \
         providing full interactivity. Do not include <html>, <head> or <body> tags.\n\
         Respond with a single JSON object with one key, \"html\", holding the markup. \
         Do not add any other text."
    )
}

/// Interior of the first `<body>` element, or the whole markup when there is
/// none.
pub fn extract_body(markup: &str) -> &str {
    BODY.captures(markup)
        .and_then(|c| c.get(1))
        .map_or(markup, |m| m.as_str())
}

/// Runs the per-tool pipeline.
pub struct ContentGenerator<'a, C: ?Sized> {
    client: &'a C,
    cache: &'a CacheStore,
    template: &'a PageTemplate,
    log: &'a RunLog,
    site: &'a SiteSection,
    tools_dir: &'a Path,
    retry: RetryPolicy,
    navigation: &'a [Tool],
}

impl<'a, C: CompletionClient + ?Sized> ContentGenerator<'a, C> {
    pub fn new(
        client: &'a C,
        cache: &'a CacheStore,
        template: &'a PageTemplate,
        log: &'a RunLog,
        site: &'a SiteSection,
        tools_dir: &'a Path,
    ) -> Self {
        Self {
            client,
            cache,
            template,
            log,
            site,
            tools_dir,
            retry: RetryPolicy::default(),
            navigation: &[],
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Tools listed in every page's navigation.
    pub fn with_navigation(mut self, tools: &'a [Tool]) -> Self {
        self.navigation = tools;
        self
    }

    /// Run one tool to completion. Never fails; see [`ToolOutcome`].
    pub async fn generate(&self, tool: &Tool, mode: RunMode) -> ToolOutcome {
        let outcome = match self.run(tool, mode).await {
            Ok(report) => {
                info!("{}: written ({:?})", tool.slug, report.source);
                ToolOutcome::Written(report)
            }
            Err((stage, error)) => {
                warn!("{}: failed while {stage:?}: {error}", tool.slug);
                ToolOutcome::Failed(ToolFailure {
                    tool: tool.clone(),
                    stage,
                    error,
                })
            }
        };

        let logged = match &outcome {
            ToolOutcome::Written(_) => {
                self.log
                    .record(LogStatus::Success, &tool.slug, &tool.name, None)
                    .await
            }
            ToolOutcome::Failed(f) => {
                self.log
                    .record(
                        LogStatus::Failed,
                        &tool.slug,
                        &tool.name,
                        Some(&f.error.to_string()),
                    )
                    .await
            }
        };
        if let Err(e) = logged {
            warn!("cannot append to {}: {e}", self.log.path().display());
        }
        outcome
    }

    async fn run(&self, tool: &Tool, mode: RunMode) -> StageResult<ToolReport> {
        let (record, source) = self.obtain(tool, mode).await?;

        debug!("{}: {:?}", tool.slug, ToolState::Validating);
        let seo = record
            .seo
            .validate()
            .map_err(|missing| (ToolState::Validating, GenerateError::Incomplete { missing }))?;
        let markup = record
            .html
            .html
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| {
                (
                    ToolState::Validating,
                    GenerateError::Incomplete {
                        missing: vec!["html"],
                    },
                )
            })?;

        debug!("{}: {:?}", tool.slug, ToolState::Rendering);
        let page = self
            .write_page(tool, &seo, markup)
            .await
            .map_err(|e| (ToolState::Rendering, e))?;

        Ok(ToolReport {
            tool: tool.clone(),
            source,
            page,
        })
    }

    /// Cached record, or a freshly generated and cached one.
    async fn obtain(
        &self,
        tool: &Tool,
        mode: RunMode,
    ) -> StageResult<(GenerationRecord, RecordSource)> {
        let use_cache = !matches!(mode, RunMode::Generate { force: true });
        if use_cache && let Some(record) = self.cache.read(&tool.slug).await {
            debug!("{}: {:?}", tool.slug, ToolState::CacheHit);
            return Ok((record, RecordSource::Cache));
        }
        if mode == RunMode::Refresh {
            return Err((ToolState::Generating, GenerateError::NotCached));
        }

        debug!("{}: {:?}", tool.slug, ToolState::Generating);
        let client = self.client;
        let seo_prompt = seo_prompt(&tool.name);
        let markup_prompt = markup_prompt(&tool.name);

        let seo_raw = with_retry(&self.retry, || client.complete(&seo_prompt))
            .await
            .map_err(|e| (ToolState::Generating, GenerateError::Model(e)))?;
        let markup_raw = with_retry(&self.retry, || client.complete(&markup_prompt))
            .await
            .map_err(|e| (ToolState::Generating, GenerateError::Model(e)))?;

        let record = GenerationRecord {
            seo: seo_from_record(&parse(&seo_raw)),
            html: html_from_record(&parse(&markup_raw)),
        };
        self.cache
            .write(&tool.slug, &record)
            .await
            .map_err(|e| (ToolState::Generating, GenerateError::Cache(e)))?;
        Ok((record, RecordSource::Model))
    }

    async fn write_page(
        &self,
        tool: &Tool,
        seo: &ValidSeo,
        markup: &str,
    ) -> Result<PathBuf, GenerateError> {
        let body = format!("{}\n{}", extract_body(markup), seo.long_tail_content);
        let canonical_url = self.site.url_for(&format!("tools/{}/index.html", tool.slug));
        let navigation = render_navigation(self.navigation, Some(&tool.slug)).into_string();

        let html = self.template.render(&PageContext {
            title: &seo.title,
            description: &seo.description,
            keywords: &seo.keywords,
            canonical_url: &canonical_url,
            base_url: self.site.base_url.trim_end_matches('/'),
            depth: TOOL_PAGE_DEPTH,
            navigation: &navigation,
            body_content: &body,
            adsense_code: &self.site.adsense_code,
        })?;

        let dir = self.tools_dir.join(&tool.slug);
        fs::create_dir_all(&dir).await?;
        let page = dir.join("index.html");
        fs::write(&page, html).await?;
        fs::write(dir.join("tool_code.html"), markup).await?;
        Ok(page)
    }
}
