//! Site homepage.
//!
//! The homepage goes through the same template as tool pages, at depth 0:
//!
//! - title, description and keywords come from `[homepage]` in the config;
//! - the navigation lists every tool with a one-line description, taken from
//!   the tool's cached SEO description when there is one;
//! - the body is an intro section, rendered from the Markdown file named by
//!   `homepage.intro_file` or a stock intro when none is configured.

use crate::cache::CacheStore;
use crate::config::SiteConfig;
use crate::template::{PageContext, PageTemplate, TemplateError};
use crate::types::Tool;
use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum HomepageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot read intro file {path}: {source}")]
    Intro {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("render error: {0}")]
    Render(#[from] TemplateError),
}

const STOCK_INTRO: &str = r#"<h2>Your One-Stop Shop for Online Tools</h2>
<p>Explore our collection of free online tools, designed to boost productivity, simplify daily tasks, and provide essential functionality for developers, content creators, and businesses.</p>
<p>Every tool runs right in your browser: no sign-up, no installs.</p>
<p>Bookmark this page to find new tools as they are added.</p>
"#;

/// Tool list items with descriptions.
pub async fn render_tool_list(
    tools: &[Tool],
    cache: &CacheStore,
    default_description: &str,
) -> Markup {
    let mut items = Vec::with_capacity(tools.len());
    for tool in tools {
        let description = cached_description(cache, &tool.slug)
            .await
            .unwrap_or_else(|| default_description.to_string());
        items.push((tool, description));
    }
    html! {
        @for (tool, description) in &items {
            li {
                a href={ "/tools/" (tool.slug) "/index.html" } {
                    strong { (tool.name) }
                    span.tool-summary { (description) }
                }
            }
        }
    }
}

async fn cached_description(cache: &CacheStore, slug: &str) -> Option<String> {
    cache
        .read(slug)
        .await?
        .seo
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Intro section from `intro_file` (relative to `root`), or the stock intro.
pub async fn render_intro(
    root: &Path,
    intro_file: Option<&str>,
) -> Result<Markup, HomepageError> {
    let inner = match intro_file {
        Some(file) => {
            let path = root.join(file);
            let markdown = fs::read_to_string(&path)
                .await
                .map_err(|source| HomepageError::Intro { path, source })?;
            let mut out = String::new();
            md_html::push_html(&mut out, Parser::new(&markdown));
            out
        }
        None => STOCK_INTRO.to_string(),
    };
    Ok(html! {
        section.intro { (PreEscaped(inner)) }
    })
}

/// Render the homepage document.
pub async fn render_homepage(
    template: &PageTemplate,
    config: &SiteConfig,
    root: &Path,
    tools: &[Tool],
    cache: &CacheStore,
) -> Result<String, HomepageError> {
    let homepage = &config.homepage;
    let navigation = render_tool_list(tools, cache, &homepage.default_tool_description).await;
    let intro = render_intro(root, homepage.intro_file.as_deref()).await?;
    let canonical_url = config.site.url_for("index.html");

    Ok(template.render(&PageContext {
        title: &homepage.title,
        description: &homepage.description,
        keywords: &homepage.keywords,
        canonical_url: &canonical_url,
        base_url: config.site.base_url.trim_end_matches('/'),
        depth: 0,
        navigation: &navigation.into_string(),
        body_content: &intro.into_string(),
        adsense_code: &config.site.adsense_code,
    })?)
}

/// Render and write the homepage to `path`.
pub async fn write_homepage(
    path: &Path,
    template: &PageTemplate,
    config: &SiteConfig,
    root: &Path,
    tools: &[Tool],
    cache: &CacheStore,
) -> Result<(), HomepageError> {
    let html = render_homepage(template, config, root, tools, cache).await?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, html).await?;
    Ok(())
}
