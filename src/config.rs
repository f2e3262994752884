//! Project configuration.
//!
//! Settings live in `toolpress.toml` at the project root. Every key is
//! optional; user values are merged over the stock defaults, unknown keys are
//! rejected, and the merged result is validated before use.
//!
//! ```toml
//! [site]
//! base_url = "https://example.github.io"
//!
//! [generation]
//! concurrency = 3
//! ```
//!
//! ## Environment
//!
//! Three values can also come from the environment (or a `.env` file in the
//! project root), and the environment wins:
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `OPENAI_API_KEY` | model API key (never read from the TOML file) |
//! | `BASE_URL` | `site.base_url` |
//! | `ADSENSE_CODE` | `site.adsense_code` |
//!
//! ## Project Layout
//!
//! ```text
//! project/
//! ├── toolpress.toml
//! ├── .env
//! ├── tools.txt                  # Plain list of tool names (fallback input)
//! ├── templates/
//! │   └── base_template.html
//! ├── .toolpress-cache/          # One <slug>.json per generated tool
//! ├── generation.log
//! └── <output_dir>/
//!     ├── index.html
//!     ├── shared/{js,css}/
//!     └── tools/
//!         ├── tools_list.json
//!         └── word-counter/
//!             ├── index.html
//!             └── tool_code.html
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file in the project root.
pub const CONFIG_FILENAME: &str = "toolpress.toml";

/// Upper bound for any configured wait, in seconds.
pub const MAX_WAIT_SECS: f64 = 3600.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Public site settings.
    pub site: SiteSection,
    /// Input, output and cache locations (relative to the project root).
    pub paths: PathsConfig,
    /// Chat-completions endpoint and model.
    pub model: ModelConfig,
    /// Concurrency and retry budget.
    pub generation: GenerationConfig,
    /// Homepage metadata and intro.
    pub homepage: HomepageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Absolute URL the site is served from, without trailing slash.
    pub base_url: String,
    /// Markup injected into every page (ads, analytics).
    pub adsense_code: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            base_url: "https://yourusername.github.io".to_string(),
            adsense_code: "<!-- AdSense placeholder -->".to_string(),
        }
    }
}

impl SiteSection {
    /// Canonical URL for a path below the site root.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Newline-separated tool names, used when no manifest exists yet.
    pub tool_list: String,
    /// Site root; pages go under `<output_dir>/tools/`.
    pub output_dir: String,
    /// Per-tool generation cache.
    pub cache_dir: String,
    /// Directory the page template is loaded from.
    pub templates_dir: String,
    /// Template name within `templates_dir`.
    pub template: String,
    /// Append-only run log.
    pub log_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            tool_list: "tools.txt".to_string(),
            output_dir: ".".to_string(),
            cache_dir: ".toolpress-cache".to_string(),
            templates_dir: "templates".to_string(),
            template: "base_template.html".to_string(),
            log_file: "generation.log".to_string(),
        }
    }
}

/// Absolute locations derived from [`PathsConfig`] and the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub tool_list: PathBuf,
    pub output_dir: PathBuf,
    pub tools_dir: PathBuf,
    pub manifest: PathBuf,
    pub homepage: PathBuf,
    pub cache_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub template: String,
    pub log_file: PathBuf,
}

impl PathsConfig {
    pub fn resolve(&self, root: &Path) -> ProjectPaths {
        let output_dir = root.join(&self.output_dir);
        let tools_dir = output_dir.join("tools");
        ProjectPaths {
            tool_list: root.join(&self.tool_list),
            manifest: tools_dir.join("tools_list.json"),
            homepage: output_dir.join("index.html"),
            tools_dir,
            output_dir,
            cache_dir: root.join(&self.cache_dir),
            templates_dir: root.join(&self.templates_dir),
            template: self.template.clone(),
            log_file: root.join(&self.log_file),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Model name sent with every request.
    pub name: String,
    /// Base of an OpenAI-compatible API (`{api_base}/chat/completions`).
    pub api_base: String,
    /// Sampling temperature (0.0-2.0).
    pub temperature: f64,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,
    /// From `OPENAI_API_KEY` only.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gpt-4".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            temperature: 0.7,
            request_timeout_secs: 120,
            api_key: None,
        }
    }
}

impl ModelConfig {
    /// API key with everything but the first and last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        match self.api_key.as_deref() {
            None => "(not set)".to_string(),
            Some(key) if key.chars().count() <= 8 => "*".repeat(key.chars().count()),
            Some(key) => {
                let chars: Vec<char> = key.chars().collect();
                let head: String = chars[..4].iter().collect();
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("{head}...{tail}")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Tools generated at the same time.
    pub concurrency: usize,
    /// Attempts per model request, including the first.
    pub max_attempts: u32,
    /// Wait after a rate-limit response.
    pub rate_limit_cooldown_secs: f64,
    /// Lower bound of the jittered backoff window.
    pub backoff_min_secs: f64,
    /// Upper bound of the jittered backoff window.
    pub backoff_max_secs: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            max_attempts: 3,
            rate_limit_cooldown_secs: 10.0,
            backoff_min_secs: 1.0,
            backoff_max_secs: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HomepageConfig {
    pub title: String,
    pub description: String,
    pub keywords: String,
    /// Markdown file (relative to the project root) rendered as the intro
    /// section. The stock intro is used when unset.
    pub intro_file: Option<String>,
    /// Shown next to tools that have no cached description yet.
    pub default_tool_description: String,
}

impl Default for HomepageConfig {
    fn default() -> Self {
        Self {
            title: "52tools - The Ultimate Collection of Online Tools".to_string(),
            description: "Explore powerful and free online tools designed for your daily needs."
                .to_string(),
            keywords: "online tools, free tools, productivity".to_string(),
            intro_file: None,
            default_tool_description:
                "A powerful and free online tool designed to simplify your daily tasks."
                    .to_string(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.site.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "site.base_url must be an absolute http(s) URL, got {base:?}"
            )));
        }
        if self.generation.concurrency == 0 {
            return Err(ConfigError::Validation(
                "generation.concurrency must be at least 1".into(),
            ));
        }
        if self.generation.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "generation.max_attempts must be at least 1".into(),
            ));
        }
        let g = &self.generation;
        for (key, secs) in [
            ("rate_limit_cooldown_secs", g.rate_limit_cooldown_secs),
            ("backoff_min_secs", g.backoff_min_secs),
            ("backoff_max_secs", g.backoff_max_secs),
        ] {
            if !secs.is_finite() || !(0.0..=MAX_WAIT_SECS).contains(&secs) {
                return Err(ConfigError::Validation(format!(
                    "generation.{key} must be between 0 and {MAX_WAIT_SECS}, got {secs}"
                )));
            }
        }
        if g.backoff_min_secs > g.backoff_max_secs {
            return Err(ConfigError::Validation(
                "generation.backoff_min_secs must not exceed backoff_max_secs".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::Validation(
                "model.temperature must be 0.0-2.0".into(),
            ));
        }
        if self.paths.template.trim().is_empty() {
            return Err(ConfigError::Validation(
                "paths.template must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Overlay values from the environment. `lookup` is `std::env::var` in
    /// production; tests pass a closure over a fixed map.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.model.api_key = Some(key.trim().to_string());
        }
        if let Some(url) = non_empty("BASE_URL") {
            self.site.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(code) = lookup("ADSENSE_CODE") {
            self.site.adsense_code = code;
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`. Tables merge key by key;
/// any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read `toolpress.toml` from `root` as a raw TOML value, or `None` if the
/// file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `toolpress.toml` from `root` (stock defaults when absent).
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(load_raw_config(root)?)
}

/// Load the config file, overlay the environment and validate the result.
pub fn load_config_with_env(
    root: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SiteConfig, ConfigError> {
    let mut config = load_config(root)?;
    config.apply_env(lookup);
    config.validate()?;
    Ok(config)
}

/// A fully commented stock `toolpress.toml`. Printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# toolpress configuration
# =======================
# All settings are optional. Values shown are the defaults.
# Unknown keys are an error.
#
# OPENAI_API_KEY, BASE_URL and ADSENSE_CODE may also be set in the
# environment or in a .env file next to this one; the environment wins.

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Absolute URL the site is served from. Used for canonical links.
base_url = "https://yourusername.github.io"

# Markup injected into every page.
adsense_code = "<!-- AdSense placeholder -->"

# ---------------------------------------------------------------------------
# Paths (relative to the project root)
# ---------------------------------------------------------------------------
[paths]
# One tool name per line. Only read when <output_dir>/tools/tools_list.json
# does not exist.
tool_list = "tools.txt"

# Site root. Tool pages are written to <output_dir>/tools/<slug>/.
output_dir = "."

# Generated SEO metadata and markup, one JSON file per tool.
cache_dir = ".toolpress-cache"

# Page template, looked up by name in templates_dir.
templates_dir = "templates"
template = "base_template.html"

# One line per generated or failed tool, appended across runs.
log_file = "generation.log"

# ---------------------------------------------------------------------------
# Model
# ---------------------------------------------------------------------------
[model]
name = "gpt-4"

# Any OpenAI-compatible chat-completions API.
api_base = "https://api.openai.com/v1"

temperature = 0.7
request_timeout_secs = 120

# ---------------------------------------------------------------------------
# Generation
# ---------------------------------------------------------------------------
[generation]
# Tools generated at the same time.
concurrency = 5

# Attempts per model request, including the first.
max_attempts = 3

# Wait after a rate-limit (HTTP 429) response.
rate_limit_cooldown_secs = 10.0

# Other failures wait a random time in [backoff_min, backoff_max) seconds,
# multiplied by the attempt number. Every wait is 0-3600 seconds.
backoff_min_secs = 1.0
backoff_max_secs = 3.0

# ---------------------------------------------------------------------------
# Homepage
# ---------------------------------------------------------------------------
[homepage]
title = "52tools - The Ultimate Collection of Online Tools"
description = "Explore powerful and free online tools designed for your daily needs."
keywords = "online tools, free tools, productivity"

# Markdown file rendered as the homepage intro. Omit for the stock intro.
# intro_file = "intro.md"

default_tool_description = "A powerful and free online tool designed to simplify your daily tasks."
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryPolicy;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn load_config_without_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.generation.concurrency, 5);
        assert_eq!(config.model.name, "gpt-4");
        assert_eq!(config.paths.template, "base_template.html");
    }

    #[test]
    fn partial_config_overrides_only_given_keys() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[generation]\nconcurrency = 2\n\n[site]\nbase_url = \"https://tools.example.com\"\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.generation.concurrency, 2);
        assert_eq!(config.generation.max_attempts, 3);
        assert_eq!(config.site.base_url, "https://tools.example.com");
        assert_eq!(config.site.adsense_code, "<!-- AdSense placeholder -->");
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[model]\nnmae = \"x\"\n").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn api_key_not_accepted_from_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[model]\napi_key = \"sk\"\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "[site\n").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = SiteConfig::default();
        config.generation.concurrency = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_inverted_backoff_window() {
        let mut config = SiteConfig::default();
        config.generation.backoff_min_secs = 5.0;
        config.generation.backoff_max_secs = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_finite_waits() {
        let tmp = TempDir::new().unwrap();
        for (key, value) in [
            ("rate_limit_cooldown_secs", "nan"),
            ("backoff_max_secs", "inf"),
            ("backoff_min_secs", "-inf"),
        ] {
            fs::write(
                tmp.path().join(CONFIG_FILENAME),
                format!("[generation]\n{key} = {value}\n"),
            )
            .unwrap();
            let err = load_config(tmp.path()).unwrap_err();
            assert!(
                matches!(&err, ConfigError::Validation(msg) if msg.contains(key)),
                "{key} = {value} accepted: {err:?}"
            );
        }
    }

    #[test]
    fn validate_rejects_waits_beyond_limit() {
        let mut config = SiteConfig::default();
        config.generation.rate_limit_cooldown_secs = 1e30;
        assert!(config.validate().is_err());

        config.generation.rate_limit_cooldown_secs = MAX_WAIT_SECS;
        config.validate().unwrap();
        RetryPolicy::from_config(&config.generation);
    }

    #[test]
    fn validate_rejects_relative_base_url() {
        let mut config = SiteConfig::default();
        config.site.base_url = "example.com".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overlays_file_values() {
        let mut config = SiteConfig::default();
        config.apply_env(env(&[
            ("OPENAI_API_KEY", " sk-test-1234567890 "),
            ("BASE_URL", "https://me.github.io/"),
            ("ADSENSE_CODE", "<script>ads()</script>"),
        ]));
        assert_eq!(config.model.api_key.as_deref(), Some("sk-test-1234567890"));
        assert_eq!(config.site.base_url, "https://me.github.io");
        assert_eq!(config.site.adsense_code, "<script>ads()</script>");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = SiteConfig::default();
        config.apply_env(env(&[("OPENAI_API_KEY", ""), ("BASE_URL", "  ")]));
        assert_eq!(config.model.api_key, None);
        assert_eq!(config.site.base_url, "https://yourusername.github.io");
    }

    #[test]
    fn load_with_env_validates_overlay() {
        let tmp = TempDir::new().unwrap();
        let result = load_config_with_env(tmp.path(), env(&[("BASE_URL", "not-a-url")]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn url_for_joins_without_double_slash() {
        let site = SiteSection {
            base_url: "https://a.io/".into(),
            ..Default::default()
        };
        assert_eq!(
            site.url_for("/tools/x/index.html"),
            "https://a.io/tools/x/index.html"
        );
    }

    #[test]
    fn paths_resolve_under_root() {
        let paths = PathsConfig {
            output_dir: "site".into(),
            ..Default::default()
        }
        .resolve(Path::new("/proj"));
        assert_eq!(paths.tools_dir, Path::new("/proj/site/tools"));
        assert_eq!(
            paths.manifest,
            Path::new("/proj/site/tools/tools_list.json")
        );
        assert_eq!(paths.homepage, Path::new("/proj/site/index.html"));
        assert_eq!(paths.cache_dir, Path::new("/proj/.toolpress-cache"));
        assert_eq!(paths.tool_list, Path::new("/proj/tools.txt"));
    }

    #[test]
    fn masked_api_key() {
        let mut model = ModelConfig::default();
        assert_eq!(model.masked_api_key(), "(not set)");
        model.api_key = Some("short".into());
        assert_eq!(model.masked_api_key(), "*****");
        model.api_key = Some("sk-abcdefghijklmnop".into());
        assert_eq!(model.masked_api_key(), "sk-a...mnop");
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let value: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config = resolve_config(Some(value)).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.site.base_url, defaults.site.base_url);
        assert_eq!(config.paths.cache_dir, defaults.paths.cache_dir);
        assert_eq!(config.model.api_base, defaults.model.api_base);
        assert_eq!(
            config.generation.rate_limit_cooldown_secs,
            defaults.generation.rate_limit_cooldown_secs
        );
        assert_eq!(config.homepage.title, defaults.homepage.title);
    }
}
