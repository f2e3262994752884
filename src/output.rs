//! CLI output formatting for all commands.
//!
//! # Information-First Display
//!
//! Output leads with the tool's display name and position; slugs, paths and
//! error messages follow as secondary context, either after an arrow on the
//! same line or on indented lines below. Paths are shown relative to the
//! project root.
//!
//! # Output Format
//!
//! ## Build
//!
//! One line per tool as it settles (completion order), then a summary:
//!
//! ```text
//! 001/012 Word Counter → tools/word-counter/index.html (generated)
//! 002/012 Timer → tools/timer/index.html (cached)
//! 003/012 Stopwatch FAILED
//!     Error: not cached (refresh never calls the model)
//!
//! Built 12 tools: 1 cached, 10 generated, 1 failed (12 total)
//! Manifest → tools/tools_list.json
//! Home → index.html
//! ```
//!
//! ## Regen-list
//!
//! ```text
//! Tools
//! 001 Timer
//!     Slug: timer
//! 002 Word Counter
//!     Slug: word-counter
//! Manifest → tools/tools_list.json (2 tools)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>` or
//! `String`) for testability and a `print_*` wrapper that writes to stdout.
//! Format functions are pure: no I/O, no side effects.

use crate::batch::BatchReport;
use crate::config::{ProjectPaths, SiteConfig};
use crate::generate::{RecordSource, ToolOutcome};
use crate::template::TemplateError;
use crate::types::Tool;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `path` relative to `root` when it lives below it, else as given.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

// ============================================================================
// Build
// ============================================================================

/// Progress lines for one settled tool.
pub fn format_tool_outcome(
    outcome: &ToolOutcome,
    done: usize,
    total: usize,
    root: &Path,
) -> Vec<String> {
    let counter = format!("{}/{}", format_index(done), format_index(total));
    match outcome {
        ToolOutcome::Written(report) => {
            let source = match report.source {
                RecordSource::Cache => "cached",
                RecordSource::Model => "generated",
            };
            vec![format!(
                "{} {} → {} ({})",
                counter,
                report.tool.name,
                relative(&report.page, root),
                source
            )]
        }
        ToolOutcome::Failed(failure) => vec![
            format!("{} {} FAILED", counter, failure.tool.name),
            format!("{}Error: {}", indent(1), failure.error),
        ],
    }
}

pub fn print_tool_outcome(outcome: &ToolOutcome, done: usize, total: usize, root: &Path) {
    for line in format_tool_outcome(outcome, done, total, root) {
        println!("{}", line);
    }
}

/// Summary after a build: counts, then where the shared files went.
pub fn format_batch_summary(
    report: &BatchReport,
    paths: &ProjectPaths,
    root: &Path,
    homepage_written: bool,
) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!("Built {} tools: {}", report.tools.len(), report.stats),
        format!("Manifest → {}", relative(&paths.manifest, root)),
    ];
    if homepage_written {
        lines.push(format!("Home → {}", relative(&paths.homepage, root)));
    }
    lines
}

pub fn print_batch_summary(
    report: &BatchReport,
    paths: &ProjectPaths,
    root: &Path,
    homepage_written: bool,
) {
    for line in format_batch_summary(report, paths, root, homepage_written) {
        println!("{}", line);
    }
}

// ============================================================================
// Regen-list
// ============================================================================

pub fn format_tool_list(tools: &[Tool], manifest: &Path, root: &Path) -> Vec<String> {
    let mut lines = vec!["Tools".to_string()];
    for (i, tool) in tools.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), tool.name));
        lines.push(format!("{}Slug: {}", indent(1), tool.slug));
    }
    lines.push(format!(
        "Manifest → {} ({} tools)",
        relative(manifest, root),
        tools.len()
    ));
    lines
}

pub fn print_tool_list(tools: &[Tool], manifest: &Path, root: &Path) {
    for line in format_tool_list(tools, manifest, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

fn presence(path: &Path) -> &'static str {
    if path.exists() { "found" } else { "missing" }
}

/// Resolved settings, with the API key masked.
pub fn format_check(
    config: &SiteConfig,
    paths: &ProjectPaths,
    root: &Path,
    template_error: Option<&TemplateError>,
) -> Vec<String> {
    let g = &config.generation;
    let template_path = paths.templates_dir.join(&paths.template);
    let template_status = match template_error {
        None => "ok".to_string(),
        Some(e) => format!("error: {e}"),
    };

    vec![
        "Site".to_string(),
        format!("{}Base URL: {}", indent(1), config.site.base_url),
        format!(
            "{}AdSense code: {} bytes",
            indent(1),
            config.site.adsense_code.len()
        ),
        "Model".to_string(),
        format!("{}Name: {}", indent(1), config.model.name),
        format!("{}API base: {}", indent(1), config.model.api_base),
        format!("{}API key: {}", indent(1), config.model.masked_api_key()),
        "Paths".to_string(),
        format!(
            "{}Tool list: {} ({})",
            indent(1),
            relative(&paths.tool_list, root),
            presence(&paths.tool_list)
        ),
        format!(
            "{}Manifest: {} ({})",
            indent(1),
            relative(&paths.manifest, root),
            presence(&paths.manifest)
        ),
        format!(
            "{}Template: {} ({})",
            indent(1),
            relative(&template_path, root),
            template_status
        ),
        format!("{}Cache: {}", indent(1), relative(&paths.cache_dir, root)),
        format!("{}Log: {}", indent(1), relative(&paths.log_file, root)),
        "Generation".to_string(),
        format!(
            "{}Concurrency {}, {} attempts, rate-limit cooldown {}s, backoff {}-{}s",
            indent(1),
            g.concurrency,
            g.max_attempts,
            g.rate_limit_cooldown_secs,
            g.backoff_min_secs,
            g.backoff_max_secs
        ),
    ]
}

pub fn print_check(
    config: &SiteConfig,
    paths: &ProjectPaths,
    root: &Path,
    template_error: Option<&TemplateError>,
) {
    for line in format_check(config, paths, root, template_error) {
        println!("{}", line);
    }
}
