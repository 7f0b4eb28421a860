//! Project records shared by the repository, the JSON endpoints and the
//! static generator.
//!
//! A [`ProjectRecord`] is one content file: its slug (the file stem) plus the
//! parsed front-matter in [`ProjectMeta`]. Records coming out of the listing
//! carry metadata only; [`ProjectRecord::content`] is filled in just for the
//! single record fetched by slug.
//!
//! Serialization uses the content files' own key names (`data`, `featured`,
//! `gallery`, ...) so listing JSON reads the same as the front-matter it came
//! from.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use maud::Markup;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An image reference from front-matter (`image:` or an entry of `gallery:`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Front-matter of a project file.
///
/// Only `title` is required. Keys this struct does not know about are kept in
/// [`extra`](Self::extra) and merged into page metadata alongside the explicit
/// `metadata:` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMeta {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO-8601 date string, kept verbatim. See [`ProjectMeta::sort_date`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Live version of the project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    /// Background color used behind the project card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<ImageRef>,
    /// Explicit page metadata (`metadata:` block).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Any other front-matter keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ProjectMeta {
    /// Metadata with only a title, everything else defaulted.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            date: None,
            kind: None,
            services: Vec::new(),
            role: None,
            tags: Vec::new(),
            url: None,
            image: None,
            color: None,
            featured: false,
            gallery: Vec::new(),
            metadata: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    /// The instant used for ordering the listing.
    ///
    /// Missing or unparsable dates map to the Unix epoch so they sort as the
    /// oldest records.
    pub fn sort_date(&self) -> DateTime<Utc> {
        self.date
            .as_deref()
            .and_then(parse_date)
            .unwrap_or(DateTime::UNIX_EPOCH)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Page metadata: the `metadata:` block layered over the extra keys, with
    /// title and description filled in when not set explicitly.
    pub fn page_metadata(&self) -> BTreeMap<String, serde_json::Value> {
        let mut merged = self.extra.clone();
        merged.extend(self.metadata.clone());
        merged
            .entry("title".to_string())
            .or_insert_with(|| serde_json::Value::String(self.title.clone()));
        if let Some(description) = &self.description {
            merged
                .entry("description".to_string())
                .or_insert_with(|| serde_json::Value::String(description.clone()));
        }
        merged
    }
}

/// Parse the date formats that show up in front-matter.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS`
/// and plain `YYYY-MM-DD`. Naive values are taken as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// One project. `content` is only present on records fetched by slug.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectRecord {
    pub slug: String,
    pub data: ProjectMeta,
    #[serde(skip)]
    pub content: Option<Markup>,
}

impl ProjectRecord {
    pub fn new(slug: impl Into<String>, data: ProjectMeta) -> Self {
        Self {
            slug: slug.into(),
            data,
            content: None,
        }
    }
}

// Identity is slug + metadata; a compiled body does not make a record different
// from its listing entry.
impl PartialEq for ProjectRecord {
    fn eq(&self, other: &Self) -> bool {
        self.slug == other.slug && self.data == other.data
    }
}

/// A tag with the number of listed projects carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagSummary {
    pub name: String,
    pub count: usize,
}

/// One page of the (optionally tag-filtered) listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPage {
    pub items: Vec<ProjectRecord>,
    pub has_next: bool,
    pub has_prev: bool,
    /// Size of the filtered set, not of the whole listing.
    pub total: usize,
}

/// Neighbours of a project in listing order.
///
/// `next` is the newer project (one position earlier in the listing), `prev`
/// the older one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Adjacent {
    pub prev: Option<ProjectRecord>,
    pub next: Option<ProjectRecord>,
}
