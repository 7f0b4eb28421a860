//! JSON endpoints consumed by the site's client code.
//!
//! Handlers here are transport-agnostic: they take the request pieces they
//! need (a query string, a JSON body) and return an [`ApiResponse`] carrying a
//! status code and a JSON body. The CLI prints these; the static generator
//! writes snapshots of them to disk.
//!
//! ## `GET /api/projects`
//!
//! ```text
//! /api/projects?page=2&perPage=5&tag=web
//! → { "projects": [...], "total": 7, "hasNextPage": false, "hasPrevPage": true }
//! ```
//!
//! `page` and `perPage` fall back to the configured defaults when missing or
//! not integers. Integers below 1 are a `400`. Any repository failure is a
//! `500` with a generic message; the cause is logged, not returned.

use crate::config::ApiConfig;
use crate::project::{ProjectPage, ProjectRecord};
use crate::repository::{ProjectRepository, RepositoryError};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

/// Status code plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: impl Serialize) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status: u16, body: impl Serialize) -> Self {
        let body = serde_json::to_value(body).unwrap_or_else(|e| {
            error!(error = %e, "response body failed to serialize");
            Value::Null
        });
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Body of a successful project query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsResponse {
    pub projects: Vec<ProjectRecord>,
    pub total: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl From<ProjectPage> for ProjectsResponse {
    fn from(page: ProjectPage) -> Self {
        Self {
            projects: page.items,
            total: page.total,
            has_next_page: page.has_next,
            has_prev_page: page.has_prev,
        }
    }
}

/// Parsed `page` / `perPage` / `tag` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectsQuery {
    pub page: i64,
    pub per_page: i64,
    pub tag: Option<String>,
}

impl ProjectsQuery {
    /// Parse a raw query string (with or without the leading `?`).
    ///
    /// Unknown parameters are ignored. An empty `tag` means no filter.
    pub fn parse(query: &str, defaults: &ApiConfig) -> Self {
        let mut page = None;
        let mut per_page = None;
        let mut tag = None;
        for (key, value) in query_pairs(query) {
            match key.as_str() {
                "page" if page.is_none() => page = Some(value),
                "perPage" if per_page.is_none() => per_page = Some(value),
                "tag" if tag.is_none() => tag = Some(value),
                _ => {}
            }
        }
        Self::from_parts(page.as_deref(), per_page.as_deref(), tag.as_deref(), defaults)
    }

    /// Build a query from individual raw parameter values.
    pub fn from_parts(
        page: Option<&str>,
        per_page: Option<&str>,
        tag: Option<&str>,
        defaults: &ApiConfig,
    ) -> Self {
        Self {
            page: parse_int(page).unwrap_or(defaults.default_page as i64),
            per_page: parse_int(per_page).unwrap_or(defaults.default_per_page as i64),
            tag: tag.filter(|t| !t.is_empty()).map(str::to_string),
        }
    }
}

/// Leading-integer parse: `"3"`, `" 3"` and `"3abc"` are 3, `"abc"` is none.
/// Digit runs too long for `i64` saturate.
fn parse_int(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim_start();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let signed = if negative {
        format!("-{}", &digits[..end])
    } else {
        digits[..end].to_string()
    };
    Some(
        signed
            .parse::<i64>()
            .unwrap_or(if negative { i64::MIN } else { i64::MAX }),
    )
}

/// Split and percent-decode `a=1&b=two+words` into key/value pairs.
fn query_pairs(query: &str) -> impl Iterator<Item = (String, String)> + '_ {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(key), percent_decode(value))
        })
}

fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => match (hex_digit(bytes.get(i + 1)), hex_digit(bytes.get(i + 2))) {
                (Some(hi), Some(lo)) => {
                    out.push((hi << 4) | lo);
                    i += 2;
                }
                _ => out.push(b'%'),
            },
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(byte: Option<&u8>) -> Option<u8> {
    char::from(*byte?).to_digit(16).map(|d| d as u8)
}

/// `GET /api/projects`.
pub fn projects_endpoint(
    repo: &ProjectRepository,
    query: &ProjectsQuery,
) -> ApiResponse {
    let (Ok(page), Ok(per_page)) = (usize::try_from(query.page), usize::try_from(query.per_page))
    else {
        return invalid_page();
    };
    match repo.paginate(page, per_page, query.tag.as_deref()) {
        Ok(page) => ApiResponse::ok(ProjectsResponse::from(page)),
        Err(RepositoryError::InvalidPage(_)) => invalid_page(),
        Err(err) => {
            error!(error = %err, "error fetching paginated projects");
            ApiResponse::with_status(500, json!({ "error": "Failed to fetch projects" }))
        }
    }
}

fn invalid_page() -> ApiResponse {
    ApiResponse::with_status(
        400,
        json!({ "error": "page and perPage must be positive integers" }),
    )
}
