//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every project is shown by its positional index and title first, with the
//! slug, date and tags as indented context lines. The same header is used by
//! every command, so `list`, `featured` and `build` output read as one content
//! inventory.
//!
//! # Output Format
//!
//! ## Listing
//!
//! ```text
//! 001 Harbour (featured)
//!     Slug: harbour
//!     Date: 2024-06-01
//!     Tags: web, api
//! 002 Sketchbook
//!     Slug: sketchbook
//!     Date: none
//! ```
//!
//! ## Generate
//!
//! ```text
//! Jamie Rivera → index.html
//! All projects → projects/index.html
//! Harbour → projects/harbour/index.html
//!
//! Generated 9 pages, 1 API snapshot, 1 asset
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure.

use crate::api::ApiResponse;
use crate::generate::GenerateReport;
use crate::project::{Adjacent, ProjectRecord, TagSummary};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn project_header(index: usize, project: &ProjectRecord) -> String {
    let featured = if project.data.featured { " (featured)" } else { "" };
    format!("{} {}{}", format_index(index), project.data.title, featured)
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

// ============================================================================
// Listing
// ============================================================================

/// Format a project listing in the order given.
pub fn format_listing(projects: &[ProjectRecord]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, project) in projects.iter().enumerate() {
        lines.push(project_header(i + 1, project));
        lines.push(format!("    Slug: {}", project.slug));
        lines.push(format!(
            "    Date: {}",
            project.data.date.as_deref().unwrap_or("none")
        ));
        if !project.data.tags.is_empty() {
            lines.push(format!("    Tags: {}", project.data.tags.join(", ")));
        }
    }
    if projects.is_empty() {
        lines.push("No projects".to_string());
    }
    lines
}

pub fn print_listing(projects: &[ProjectRecord]) {
    for line in format_listing(projects) {
        println!("{}", line);
    }
}

/// Format tag counts, one per line.
pub fn format_tags(tags: &[TagSummary]) -> Vec<String> {
    tags.iter()
        .map(|tag| format!("{} ({})", tag.name, tag.count))
        .collect()
}

pub fn print_tags(tags: &[TagSummary]) {
    for line in format_tags(tags) {
        println!("{}", line);
    }
}

// ============================================================================
// Single project
// ============================================================================

/// Format one project fetched by slug, with a plain-text preview of its body.
pub fn format_project(project: &ProjectRecord) -> Vec<String> {
    let data = &project.data;
    let mut lines = vec![data.title.clone()];
    lines.push(format!("    Slug: {}", project.slug));
    if let Some(description) = &data.description {
        lines.push(format!("    Description: {}", description));
    }
    if let Some(date) = &data.date {
        lines.push(format!("    Date: {}", date));
    }
    if let Some(kind) = &data.kind {
        lines.push(format!("    Type: {}", kind));
    }
    if let Some(role) = &data.role {
        lines.push(format!("    Role: {}", role));
    }
    if !data.services.is_empty() {
        lines.push(format!("    Services: {}", data.services.join(", ")));
    }
    if !data.tags.is_empty() {
        lines.push(format!("    Tags: {}", data.tags.join(", ")));
    }
    if let Some(url) = &data.url {
        lines.push(format!("    Url: {}", url));
    }
    if data.featured {
        lines.push("    Featured".to_string());
    }
    if let Some(content) = &project.content {
        let plain = strip_html_tags(&content.0);
        let preview = truncate_desc(plain.split_whitespace().collect::<Vec<_>>().join(" ").as_str(), 72);
        if !preview.is_empty() {
            lines.push(format!("    Body: {}", preview));
        }
    }
    lines
}

pub fn print_project(project: &ProjectRecord) {
    for line in format_project(project) {
        println!("{}", line);
    }
}

/// Format the newer/older neighbours of a project.
pub fn format_adjacent(slug: &str, adjacent: &Adjacent) -> Vec<String> {
    let describe = |p: &Option<ProjectRecord>| match p {
        Some(p) => format!("{} ({})", p.data.title, p.slug),
        None => "none".to_string(),
    };
    vec![
        slug.to_string(),
        format!("    Next: {}", describe(&adjacent.next)),
        format!("    Prev: {}", describe(&adjacent.prev)),
    ]
}

pub fn print_adjacent(slug: &str, adjacent: &Adjacent) {
    for line in format_adjacent(slug, adjacent) {
        println!("{}", line);
    }
}

// ============================================================================
// API responses
// ============================================================================

/// Status line followed by the pretty-printed JSON body.
pub fn format_api_response(response: &ApiResponse) -> Vec<String> {
    let mut lines = vec![format!("Status: {}", response.status)];
    let body = serde_json::to_string_pretty(&response.body).unwrap_or_else(|_| "null".into());
    lines.extend(body.lines().map(str::to_string));
    lines
}

pub fn print_api_response(response: &ApiResponse) {
    for line in format_api_response(response) {
        println!("{}", line);
    }
}

// ============================================================================
// Build and check
// ============================================================================

/// Format generate output: every page as `title → path`, then totals.
pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .pages
        .iter()
        .map(|(title, path)| format!("{} \u{2192} {}", title, path))
        .collect();
    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {}",
        plural(report.pages.len(), "page", "pages"),
        plural(report.api_snapshots, "API snapshot", "API snapshots"),
        plural(report.assets, "asset", "assets"),
    ));
    lines
}

pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

/// Format the result of compiling every project.
pub fn format_check_output(projects: &[ProjectRecord]) -> Vec<String> {
    let mut lines: Vec<String> = projects
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{} ok", project_header(i + 1, p)))
        .collect();
    lines.push(format!("{} compiled", plural(projects.len(), "project", "projects")));
    lines
}

pub fn print_check_output(projects: &[ProjectRecord]) {
    for line in format_check_output(projects) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
