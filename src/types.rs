//! Shared types used across the pipeline.
//!
//! [`GenerationRecord`] is the unit persisted by the cache and consumed by the
//! renderer; [`NavigationManifest`] is the published tool list. Both are
//! serialized with serde_json and must stay stable across releases so old
//! cache entries keep loading.

use crate::naming::slugify;
use serde::{Deserialize, Serialize};

/// A tool to publish. The slug is always derived from the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    pub name: String,
    pub slug: String,
}

impl Tool {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self { name, slug }
    }
}

/// One entry of the navigation manifest.
///
/// On input the slug is optional (hand-written manifests often only list
/// names); on output it is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// `tools/tools_list.json`: `{"tools": [{"name", "slug"}, ...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NavigationManifest {
    pub tools: Vec<ToolEntry>,
}

impl NavigationManifest {
    pub fn from_tools(tools: &[Tool]) -> Self {
        Self {
            tools: tools
                .iter()
                .map(|t| ToolEntry {
                    name: t.name.clone(),
                    slug: Some(t.slug.clone()),
                })
                .collect(),
        }
    }
}

/// Cached result of one successful generation: SEO metadata plus markup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub seo: SeoRecord,
    pub html: HtmlRecord,
}

/// SEO metadata as returned by the model.
///
/// Every field is optional here; [`SeoRecord::validate`] decides whether the
/// record is complete enough to publish.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeoRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Keywords>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_tail_content: Option<String>,
}

/// Keywords come back either as one comma-separated string or as a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Keywords {
    Text(String),
    List(Vec<String>),
}

impl Keywords {
    /// Render as the comma-separated string used in `<meta name="keywords">`.
    pub fn joined(&self) -> String {
        match self {
            Keywords::Text(s) => s.trim().to_string(),
            Keywords::List(items) => items
                .iter()
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Generated tool markup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HtmlRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

/// SEO metadata that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSeo {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub long_tail_content: String,
}

impl SeoRecord {
    /// Check that title, description and keywords are present and not blank.
    ///
    /// On failure returns the names of the missing fields, in declaration
    /// order.
    pub fn validate(&self) -> Result<ValidSeo, Vec<&'static str>> {
        fn present(v: Option<&str>) -> Option<String> {
            v.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
        }

        let title = present(self.title.as_deref());
        let description = present(self.description.as_deref());
        let keywords = self
            .keywords
            .as_ref()
            .map(Keywords::joined)
            .filter(|k| !k.is_empty());

        match (title, description, keywords) {
            (Some(title), Some(description), Some(keywords)) => Ok(ValidSeo {
                title,
                description,
                keywords,
                long_tail_content: self.long_tail_content.clone().unwrap_or_default(),
            }),
            (title, description, keywords) => {
                let mut missing = Vec::new();
                if title.is_none() {
                    missing.push("title");
                }
                if description.is_none() {
                    missing.push("description");
                }
                if keywords.is_none() {
                    missing.push("keywords");
                }
                Err(missing)
            }
        }
    }
}
