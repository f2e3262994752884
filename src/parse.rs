//! Best-effort extraction of a JSON object from model output.
//!
//! Models are asked for JSON but regularly wrap it in prose or a Markdown
//! fence, or answer with bare HTML. [`parse`] tries three tiers, first hit
//! wins:
//!
//! 1. the whole text as a JSON object;
//! 2. the first `{` through the last `}` (greedy, across lines) as a JSON
//!    object;
//! 3. `{"raw": "<trimmed text>"}`.
//!
//! It never fails. Downstream code decides whether the record it got back is
//! good enough.

use crate::types::{HtmlRecord, Keywords, SeoRecord};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// A parsed response: a flat or nested JSON object.
pub type Record = Map<String, Value>;

/// Key of the single field in a tier-3 fallback record.
pub const RAW_KEY: &str = "raw";

static BRACED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("brace pattern is valid"));

static FENCED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[A-Za-z]*\s*\n(.*?)\n?```$").expect("fence pattern is valid")
});

/// Parse model output into a record. See the [module docs](self).
pub fn parse(raw: &str) -> Record {
    if let Some(record) = parse_object(raw) {
        return record;
    }
    if let Some(record) = BRACED.find(raw).and_then(|m| parse_object(m.as_str())) {
        return record;
    }
    let mut record = Map::new();
    record.insert(RAW_KEY.to_string(), Value::String(raw.trim().to_string()));
    record
}

fn parse_object(text: &str) -> Option<Record> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Whether the record came from the tier-3 fallback.
pub fn is_fallback(record: &Record) -> bool {
    record.len() == 1 && record.contains_key(RAW_KEY)
}

fn string_field(record: &Record, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read SEO fields from a parsed record. Missing or mistyped fields stay
/// `None`.
pub fn seo_from_record(record: &Record) -> SeoRecord {
    let keywords = match record.get("keywords") {
        Some(Value::String(s)) => Some(Keywords::Text(s.clone())),
        Some(Value::Array(items)) => Some(Keywords::List(
            items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
        )),
        _ => None,
    };
    SeoRecord {
        title: string_field(record, "title"),
        description: string_field(record, "description"),
        keywords,
        long_tail_content: string_field(record, "long_tail_content"),
    }
}

/// Read tool markup from a parsed record.
///
/// Prefers the `html` key. A fallback record's raw text is taken as markup,
/// minus any Markdown code fence around it.
pub fn html_from_record(record: &Record) -> HtmlRecord {
    let html = string_field(record, "html").or_else(|| {
        if is_fallback(record) {
            string_field(record, RAW_KEY).map(|raw| strip_code_fence(&raw).to_string())
        } else {
            None
        }
    });
    HtmlRecord { html }
}

/// Content of a text that is exactly one fenced code block, else the text.
fn strip_code_fence(text: &str) -> &str {
    FENCED
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str())
}
