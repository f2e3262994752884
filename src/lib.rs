//! # toolpress
//!
//! A static site generator for collections of small browser-based tools.
//! Give it a list of tool names; it asks a chat-completion model for each
//! tool's SEO metadata and a self-contained HTML/JavaScript implementation,
//! renders every tool into a shared page template, and writes a browsable
//! site with a homepage and a navigation manifest.
//!
//! # Architecture: Per-Tool Pipeline
//!
//! Each tool runs through the same pipeline, and many tools run at once under
//! a concurrency limit:
//!
//! ```text
//! cache lookup ─► model call (retry) ─► parse ─► validate ─► render ─► write
//!      │                                  ▲
//!      └──────────── cached record ───────┘
//! ```
//!
//! After every tool has settled, the batch driver writes
//! `tools/tools_list.json`; `build` then regenerates the homepage and the
//! shared assets.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`batch`] | Runs every tool with bounded concurrency, writes the manifest once |
//! | [`generate`] | Per-tool state machine: cache → model → validate → render → write |
//! | [`llm`] | `CompletionClient` trait and the OpenAI-compatible HTTP client |
//! | [`retry`] | Attempt budget with rate-limit cooldown and jittered backoff |
//! | [`parse`] | Best-effort JSON extraction from model output |
//! | [`cache`] | `<slug>.json` store of generated records |
//! | [`template`] | minijinja page template and navigation markup |
//! | [`homepage`] | Site `index.html` with tool list and Markdown intro |
//! | [`manifest`] | Tool list input, `tools_list.json` output, directory rescan |
//! | [`runlog`] | Append-only per-tool success/failure log |
//! | [`assets`] | Embedded stylesheet and script written to `shared/` |
//! | [`config`] | `toolpress.toml` loading, environment overlay, validation |
//! | [`types`] | Tools, generation records, the navigation manifest |
//! | [`naming`] | Name → slug mapping |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Failures Are Values
//!
//! A batch of fifty tools should not stop because the model returned junk for
//! one of them. Per-tool errors are collected as
//! [`ToolOutcome`](generate::ToolOutcome) values and reported at the end;
//! only setup problems (bad config, missing template, no tool list) abort a
//! run.
//!
//! ## Cache Before Validation
//!
//! Whatever the model returns is cached before it is checked. A rejected
//! record stays visible in `.toolpress-cache/` for inspection, and
//! `build --force` is the single way to replace it.
//!
//! ## One Thread, Many Tools
//!
//! The work is almost entirely waiting on HTTP. All tools run as futures on a
//! single-threaded tokio runtime, gated by a semaphore, so there is no shared
//! mutable state beyond the append-only run log.
//!
//! ## A Runtime Template
//!
//! Unlike fragments such as the navigation list (built with maud), the page
//! template is a user-editable file loaded at runtime with minijinja, so site
//! owners can restyle without recompiling. It is compiled and test-rendered
//! at startup; a broken template fails the run before any model call is
//! made.

pub mod assets;
pub mod batch;
pub mod cache;
pub mod config;
pub mod generate;
pub mod homepage;
pub mod llm;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod parse;
pub mod retry;
pub mod runlog;
pub mod template;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
