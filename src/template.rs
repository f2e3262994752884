//! Page template.
//!
//! Every page (tool pages and the homepage) is rendered through one
//! user-editable Jinja-style template, loaded by name from the templates
//! directory with [minijinja](https://docs.rs/minijinja). Autoescaping is on
//! for `.html` templates: text values are escaped, while markup and the URLs
//! built from config are passed in as safe strings.
//!
//! ## Template variables
//!
//! | Variable | Kind | Notes |
//! |----------|------|-------|
//! | `title`, `description`, `keywords` | text | SEO metadata |
//! | `canonical_url` | url | absolute page URL |
//! | `base_url` | url | site root URL |
//! | `depth` | number | directory depth below the site root (2 for tools) |
//! | `root_path` | url | `"../"` repeated `depth` times |
//! | `navigation` | markup | `<li>` items for the tool list |
//! | `body_content` | markup | page body |
//! | `adsense_code` | markup | injected verbatim |
//!
//! The stock template is compiled into the binary ([`STOCK_TEMPLATE`]) and
//! printed by `gen-template`.

use crate::types::Tool;
use maud::{Markup, html};
use minijinja::{Environment, Value, context};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stock page template.
pub const STOCK_TEMPLATE: &str = include_str!("../templates/base_template.html");

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    NotFound(PathBuf),
    #[error("template error: {0}")]
    Engine(#[from] minijinja::Error),
}

/// Values for one page render.
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub keywords: &'a str,
    pub canonical_url: &'a str,
    pub base_url: &'a str,
    pub depth: usize,
    pub navigation: &'a str,
    pub body_content: &'a str,
    pub adsense_code: &'a str,
}

/// A compiled page template.
pub struct PageTemplate {
    env: Environment<'static>,
    name: String,
}

impl std::fmt::Debug for PageTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageTemplate")
            .field("name", &self.name)
            .finish()
    }
}

impl PageTemplate {
    /// Load `name` from `dir`.
    ///
    /// The template is compiled and test-rendered once, so syntax errors and
    /// bad expressions surface here instead of on the first tool.
    pub fn load(dir: &Path, name: &str) -> Result<Self, TemplateError> {
        let path = dir.join(name);
        if !path.is_file() {
            return Err(TemplateError::NotFound(path));
        }
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(dir));
        Self::checked(env, name)
    }

    /// Build from in-memory source, e.g. [`STOCK_TEMPLATE`].
    pub fn from_source(name: &str, source: &str) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.add_template_owned(name.to_string(), source.to_string())?;
        Self::checked(env, name)
    }

    fn checked(env: Environment<'static>, name: &str) -> Result<Self, TemplateError> {
        let template = Self {
            env,
            name: name.to_string(),
        };
        template.render(&PageContext {
            title: "check",
            description: "check",
            keywords: "check",
            canonical_url: "https://example.com/",
            base_url: "https://example.com",
            depth: 0,
            navigation: "",
            body_content: "",
            adsense_code: "",
        })?;
        Ok(template)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render(&self, page: &PageContext<'_>) -> Result<String, TemplateError> {
        let template = self.env.get_template(&self.name)?;
        let rendered = template.render(context! {
            title => page.title,
            description => page.description,
            keywords => page.keywords,
            canonical_url => Value::from_safe_string(page.canonical_url.to_string()),
            base_url => Value::from_safe_string(page.base_url.to_string()),
            depth => page.depth,
            root_path => Value::from_safe_string("../".repeat(page.depth)),
            navigation => Value::from_safe_string(page.navigation.to_string()),
            body_content => Value::from_safe_string(page.body_content.to_string()),
            adsense_code => Value::from_safe_string(page.adsense_code.to_string()),
        })?;
        Ok(rendered)
    }
}

/// Navigation list items linking every tool's page. `current` marks the
/// page being rendered.
pub fn render_navigation(tools: &[Tool], current: Option<&str>) -> Markup {
    html! {
        @for tool in tools {
            @let is_current = current == Some(tool.slug.as_str());
            li class=[is_current.then_some("current")] {
                a href={ "/tools/" (tool.slug) "/index.html" } { (tool.name) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn page<'a>(title: &'a str, body: &'a str) -> PageContext<'a> {
        PageContext {
            title,
            description: "Count words",
            keywords: "words, counter",
            canonical_url: "https://a.io/tools/word-counter/index.html",
            base_url: "https://a.io",
            depth: 2,
            navigation: "<li><a href=\"/tools/x/index.html\">X</a></li>",
            body_content: body,
            adsense_code: "<script>ads()</script>",
        }
    }

    const MINIMAL: &str = "<title>{{ title }}</title>{{ navigation }}<main>{{ body_content }}</main>{{ root_path }}|{{ adsense_code }}";

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn load_missing_template_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = PageTemplate::load(tmp.path(), "base_template.html").unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(_)));
    }

    #[test]
    fn load_syntax_error_fails_early() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("base_template.html"), "{% if %}").unwrap();
        let err = PageTemplate::load(tmp.path(), "base_template.html").unwrap_err();
        assert!(matches!(err, TemplateError::Engine(_)));
    }

    #[test]
    fn load_from_directory() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("page.html"), MINIMAL).unwrap();
        let template = PageTemplate::load(tmp.path(), "page.html").unwrap();
        let out = template.render(&page("Word Counter", "<div>tool</div>")).unwrap();
        assert!(out.contains("<title>Word Counter</title>"));
    }

    #[test]
    fn stock_template_compiles() {
        let template = PageTemplate::from_source("base_template.html", STOCK_TEMPLATE).unwrap();
        assert_eq!(template.name(), "base_template.html");
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    #[test]
    fn text_values_are_escaped() {
        let template = PageTemplate::from_source("page.html", MINIMAL).unwrap();
        let out = template.render(&page("<b>\"x\"", "")).unwrap();
        assert!(out.contains("<title>&lt;b&gt;&quot;x&quot;</title>"));
    }

    #[test]
    fn markup_values_are_not_escaped() {
        let template = PageTemplate::from_source("page.html", MINIMAL).unwrap();
        let out = template.render(&page("T", "<div id=\"tool\"></div>")).unwrap();
        assert!(out.contains("<main><div id=\"tool\"></div></main>"));
        assert!(out.contains("<li><a href=\"/tools/x/index.html\">X</a></li>"));
        assert!(out.contains("<script>ads()</script>"));
    }

    #[test]
    fn root_path_follows_depth() {
        let template = PageTemplate::from_source("page.html", MINIMAL).unwrap();
        let out = template.render(&page("T", "")).unwrap();
        assert!(out.contains("../../|"));

        let home = PageContext {
            depth: 0,
            ..page("T", "")
        };
        let out = template.render(&home).unwrap();
        assert!(out.contains("</main>|"));
    }

    #[test]
    fn stock_template_renders_metadata() {
        let template = PageTemplate::from_source("base_template.html", STOCK_TEMPLATE).unwrap();
        let out = template.render(&page("Word Counter", "<div>tool</div>")).unwrap();
        assert!(out.contains("<meta name=\"description\" content=\"Count words\">"));
        assert!(out.contains(
            "<link rel=\"canonical\" href=\"https://a.io/tools/word-counter/index.html\">"
        ));
        assert!(out.contains("href=\"../../shared/css/style.css\""));
        assert!(out.contains("<div>tool</div>"));
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    #[test]
    fn navigation_links_every_tool() {
        let tools = vec![Tool::new("Word Counter"), Tool::new("Timer")];
        let nav = render_navigation(&tools, None).into_string();
        assert_eq!(
            nav,
            "<li><a href=\"/tools/word-counter/index.html\">Word Counter</a></li>\
             <li><a href=\"/tools/timer/index.html\">Timer</a></li>"
        );
    }

    #[test]
    fn navigation_marks_current_tool() {
        let tools = vec![Tool::new("Word Counter"), Tool::new("Timer")];
        let nav = render_navigation(&tools, Some("timer")).into_string();
        assert!(nav.contains("<li class=\"current\"><a href=\"/tools/timer/index.html\">"));
        assert!(nav.contains("<li><a href=\"/tools/word-counter/index.html\">"));
    }

    #[test]
    fn navigation_escapes_names() {
        let tools = vec![Tool::new("A<b>")];
        let nav = render_navigation(&tools, None).into_string();
        assert!(nav.contains("A&lt;b&gt;"));
    }
}
