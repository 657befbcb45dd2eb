//! Guide metadata and YAML front matter.

use std::fmt::Write;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::Serialize;

use crate::dom::{ArenaDom, CssQuery};
use crate::error::Result;

static GUIDE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"id=(\d+)").unwrap());

/// Descriptive fields of a guide page.
///
/// Fields are declared in alphabetical order, which is also the order they
/// appear in front matter and JSON output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GuideMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub imported_date: String,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steam_guide_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Read title, author, description and tags from a guide page.
///
/// `imported_date` is the local time of the call.
pub fn extract_metadata(dom: &ArenaDom, url: &str) -> Result<GuideMetadata> {
    let first_text = |selector: &str| -> Result<Option<String>> {
        Ok(CssQuery::parse(selector)?
            .first(dom)
            .map(|node| dom.text_of(node).trim().to_string()))
    };

    let tags = CssQuery::parse(".workshopTags a")?
        .all(dom)
        .into_iter()
        .map(|node| dom.text_of(node).trim().to_string())
        .collect();

    Ok(GuideMetadata {
        author: first_text(".guideAuthors")?.map(|author| strip_by_prefix(&author)),
        description: first_text(".guideTopDescription")?,
        imported_date: chrono::Local::now()
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string(),
        source_url: url.to_string(),
        steam_guide_id: guide_id_from_url(url),
        tags,
        title: first_text("div.workshopItemTitle")?,
    })
}

/// The numeric id from a `...?id=NNN` guide URL.
///
/// ```
/// use steamguide::metadata::guide_id_from_url;
///
/// let url = "https://steamcommunity.com/sharedfiles/filedetails/?id=123456";
/// assert_eq!(guide_id_from_url(url).as_deref(), Some("123456"));
/// ```
pub fn guide_id_from_url(url: &str) -> Option<String> {
    GUIDE_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn strip_by_prefix(author: &str) -> String {
    author
        .strip_prefix("By ")
        .unwrap_or(author)
        .trim()
        .to_string()
}

impl GuideMetadata {
    /// Render the metadata as a `---`-delimited YAML block.
    pub fn to_front_matter(&self) -> String {
        let mut out = String::from("---\n");
        let mut field = |key: &str, value: &str| {
            let _ = writeln!(out, "{key}: {}", yaml_scalar(value));
        };

        if let Some(author) = &self.author {
            field("author", author);
        }
        if let Some(description) = &self.description {
            field("description", description);
        }
        field("imported_date", &self.imported_date);
        field("source_url", &self.source_url);
        if let Some(id) = &self.steam_guide_id {
            field("steam_guide_id", id);
        }
        if !self.tags.is_empty() {
            out.push_str("tags:\n");
            for tag in &self.tags {
                let _ = writeln!(out, "- {}", yaml_scalar(tag));
            }
        }
        if let Some(title) = &self.title {
            let _ = writeln!(out, "title: {}", yaml_scalar(title));
        }

        out.push_str("---\n");
        out
    }
}

// ============================================================================
// YAML scalars
// ============================================================================

static YAML_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(\.[0-9]+|[0-9][0-9_]*(\.[0-9_]*)?)([eE][-+]?[0-9]+)?$|^0[xXoObB][0-9a-fA-F_]+$|^[-+]?\.(inf|Inf|INF)$|^\.(nan|NaN|NAN)$|^[0-9]+(:[0-5]?[0-9])+$").unwrap()
});

static YAML_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}").unwrap());

const YAML_WORDS: &[&str] = &[
    "~", "null", "true", "false", "yes", "no", "on", "off", "y", "n",
];

/// Characters that cannot start a plain scalar.
const YAML_INDICATORS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@',
    '`',
];

/// Format a string as a YAML scalar, quoting only when needed.
fn yaml_scalar(value: &str) -> String {
    if value.chars().any(|c| c.is_control()) {
        return double_quoted(value);
    }
    if needs_quotes(value) {
        return format!("'{}'", value.replace('\'', "''"));
    }
    value.to_string()
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value.trim() != value
        || value.starts_with(YAML_INDICATORS)
        || value.ends_with(':')
        || value.contains(": ")
        || value.contains(" #")
        || YAML_WORDS.iter().any(|w| value.eq_ignore_ascii_case(w))
        || YAML_NUMBER.is_match(value)
        || YAML_TIMESTAMP.is_match(value)
}

fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
