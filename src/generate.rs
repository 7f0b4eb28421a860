//! Static site generation.
//!
//! Renders the whole portfolio from a [`ProjectRepository`] into plain HTML,
//! plus JSON snapshots of the project query endpoint for clients that page
//! through projects without a server.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                        # Featured projects + tag list
//! ├── projects/
//! │   ├── index.html                    # Listing, page 1
//! │   ├── page/2/index.html             # Listing, later pages
//! │   ├── tag/web/index.html            # Listing filtered by tag
//! │   ├── tag/web/page/2/index.html
//! │   └── harbour/index.html            # Project detail
//! ├── 404.html                          # Served by static hosts for missing paths
//! ├── api/projects/page-1.json          # Endpoint snapshots (default page size)
//! └── images/...                        # Copied from public/
//! ```
//!
//! Tag directory names are the tag with every byte outside `[A-Za-z0-9_~-]`
//! percent-encoded; links to them encode the `%` once more so a static file
//! server decodes back to the directory name.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating with
//! automatic escaping. Compiled project bodies are the only pre-escaped
//! content.

use crate::api::{self, ProjectsQuery};
use crate::config::{self, SiteConfig};
use crate::project::{Adjacent, ImageRef, ProjectPage, ProjectRecord, TagSummary};
use crate::repository::{ProjectRepository, RepositoryError};
use maud::{DOCTYPE, Markup, html};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// What a build wrote, for CLI output.
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// `(title, path relative to the output dir)` for every HTML page.
    pub pages: Vec<(String, String)>,
    pub api_snapshots: usize,
    pub assets: usize,
}

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Render the site rooted at `root` into `output_dir`.
pub fn generate(
    repo: &ProjectRepository,
    config: &SiteConfig,
    root: &Path,
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    let site = Site::new(config);
    let mut report = GenerateReport::default();
    fs::create_dir_all(output_dir)?;

    report.assets = copy_public_assets(&root.join("public"), output_dir)?;

    let featured = repo.list_featured()?;
    let tags = repo.list_tags()?;
    write_page(
        output_dir,
        "index.html",
        &config.site.name,
        site.render_home(&featured, &tags),
        &mut report,
    )?;

    let per_page = config.pages.per_page;
    for (label, tag) in std::iter::once(("All projects".to_string(), None))
        .chain(tags.iter().map(|t| (format!("Tagged “{}”", t.name), Some(t.name.as_str()))))
    {
        let mut page_number = 1;
        loop {
            let page = repo.paginate(page_number, per_page, tag)?;
            let path = list_page_path(tag, page_number);
            let markup = site.render_list_page(&label, tag, &page, page_number, &tags);
            write_page(output_dir, &path, &label, markup, &mut report)?;
            if !page.has_next {
                break;
            }
            page_number += 1;
        }
    }

    for summary in repo.list_all()?.iter() {
        let project = repo.get_by_slug(&summary.slug)?;
        let adjacent = repo.get_adjacent(&summary.slug)?;
        let path = format!("projects/{}/index.html", project.slug);
        let markup = site.render_project_page(&project, &adjacent);
        write_page(output_dir, &path, &project.data.title, markup, &mut report)?;
    }

    write_page(
        output_dir,
        "404.html",
        "Not found",
        site.render_not_found(),
        &mut report,
    )?;

    report.api_snapshots = write_api_snapshots(repo, config, output_dir)?;

    info!(
        pages = report.pages.len(),
        snapshots = report.api_snapshots,
        assets = report.assets,
        output = %output_dir.display(),
        "site generated"
    );
    Ok(report)
}

fn write_page(
    output_dir: &Path,
    rel_path: &str,
    title: &str,
    markup: Markup,
    report: &mut GenerateReport,
) -> Result<(), GenerateError> {
    let path = output_dir.join(rel_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, markup.into_string())?;
    debug!(path = rel_path, "wrote page");
    report.pages.push((title.to_string(), rel_path.to_string()));
    Ok(())
}

/// Snapshots of `GET /api/projects?page=N` at the default page size, until
/// the last page.
fn write_api_snapshots(
    repo: &ProjectRepository,
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<usize, GenerateError> {
    let dir = output_dir.join("api/projects");
    fs::create_dir_all(&dir)?;
    let mut page = 1;
    loop {
        let raw_page = page.to_string();
        let query = ProjectsQuery::from_parts(Some(&raw_page), None, None, &config.api);
        let response = api::projects_endpoint(repo, &query);
        if !response.is_success() {
            // Surface the real cause rather than the endpoint's generic body.
            repo.paginate(page, config.api.default_per_page, None)?;
        }
        fs::write(
            dir.join(format!("page-{page}.json")),
            serde_json::to_string_pretty(&response.body)?,
        )?;
        if response.body["hasNextPage"] != true {
            return Ok(page);
        }
        page += 1;
    }
}

/// Copy everything under `public/` into the output root. Missing `public/`
/// is fine.
fn copy_public_assets(public_dir: &Path, output_dir: &Path) -> Result<usize, GenerateError> {
    if !public_dir.is_dir() {
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(public_dir).min_depth(1) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(public_dir)
            .map(PathBuf::from)
            .unwrap_or_default();
        let dst = output_dir.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dst)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &dst)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Output path of a list page.
fn list_page_path(tag: Option<&str>, page: usize) -> String {
    let base = match tag {
        Some(tag) => format!("projects/tag/{}", encode_segment(tag)),
        None => "projects".to_string(),
    };
    if page == 1 {
        format!("{base}/index.html")
    } else {
        format!("{base}/page/{page}/index.html")
    }
}

/// Percent-encode every byte outside the URL-unreserved set. Dots are encoded
/// too so `.` and `..` tags stay inside `projects/tag/`.
fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

// ============================================================================
// HTML Components
// ============================================================================

struct Site<'a> {
    config: &'a SiteConfig,
    css: String,
}

impl<'a> Site<'a> {
    fn new(config: &'a SiteConfig) -> Self {
        let color_css = config::generate_color_css(&config.colors);
        Self {
            config,
            css: format!("{color_css}\n\n{CSS_STATIC}"),
        }
    }

    /// Site-relative link honoring `site.base_url`.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.site.base_url, path.trim_start_matches('/'))
    }

    fn tag_url(&self, tag: &str) -> String {
        self.url(&format!("projects/tag/{}/", encode_segment(&encode_segment(tag))))
    }

    fn list_url(&self, tag: Option<&str>, page: usize) -> String {
        let base = match tag {
            Some(tag) => format!("projects/tag/{}/", encode_segment(&encode_segment(tag))),
            None => "projects/".to_string(),
        };
        if page == 1 {
            self.url(&base)
        } else {
            self.url(&format!("{base}page/{page}/"))
        }
    }

    fn project_url(&self, slug: &str) -> String {
        self.url(&format!("projects/{}/", encode_segment(slug)))
    }

    /// Page shell. `meta` entries with string values become `<meta>` tags;
    /// a `description` there replaces the site description.
    fn base_document(
        &self,
        title: &str,
        body_class: Option<&str>,
        meta: &BTreeMap<String, Value>,
        content: Markup,
    ) -> Markup {
        let full_title = if title == self.config.site.name {
            title.to_string()
        } else {
            format!("{title} · {}", self.config.site.name)
        };
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (full_title) }
                    @if !meta.contains_key("description") && !self.config.site.description.is_empty() {
                        meta name="description" content=(self.config.site.description);
                    }
                    @for (name, value) in meta {
                        @if let Some(value) = value.as_str().filter(|_| name != "title") {
                            meta name=(name) content=(value);
                        }
                    }
                    style { (self.css) }
                }
                body class=[body_class] {
                    (self.site_header())
                    (content)
                }
            }
        }
    }

    fn site_header(&self) -> Markup {
        html! {
            header.site-header {
                a.site-name href=(self.url("")) { (self.config.site.name) }
                nav.site-nav {
                    a href=(self.list_url(None, 1)) { "Projects" }
                }
            }
        }
    }

    fn project_card(&self, project: &ProjectRecord) -> Markup {
        let data = &project.data;
        let style = data.color.as_ref().map(|c| format!("--card-color: {c};"));
        html! {
            article.project-card style=[style] {
                a href=(self.project_url(&project.slug)) {
                    @if let Some(image) = &data.image {
                        (image_tag(image, &data.title))
                    }
                    h2 { (data.title) }
                }
                @if let Some(description) = &data.description {
                    p.project-description { (description) }
                }
                @if !data.tags.is_empty() {
                    ul.tag-list {
                        @for tag in &data.tags {
                            li { a href=(self.tag_url(tag)) { (tag) } }
                        }
                    }
                }
            }
        }
    }

    fn tag_cloud(&self, tags: &[TagSummary], current: Option<&str>) -> Markup {
        html! {
            nav.tag-cloud {
                a class=[current.is_none().then_some("current")] href=(self.list_url(None, 1)) { "All" }
                @for tag in tags {
                    a class=[(current == Some(tag.name.as_str())).then_some("current")] href=(self.tag_url(&tag.name)) {
                        (tag.name) " " span.count { (tag.count) }
                    }
                }
            }
        }
    }

    // ========================================================================
    // Page Renderers
    // ========================================================================

    fn render_home(&self, featured: &[ProjectRecord], tags: &[TagSummary]) -> Markup {
        let content = html! {
            main.home-page {
                @if !self.config.site.description.is_empty() {
                    p.intro { (self.config.site.description) }
                }
                section.featured {
                    h1 { "Selected work" }
                    div.project-grid {
                        @for project in featured {
                            (self.project_card(project))
                        }
                    }
                    a.more href=(self.list_url(None, 1)) { "All projects →" }
                }
                (self.tag_cloud(tags, None))
            }
        };
        self.base_document(&self.config.site.name, Some("home"), &BTreeMap::new(), content)
    }

    fn render_not_found(&self) -> Markup {
        let content = html! {
            main.not-found {
                h1 { "404" }
                p {
                    "Found a dead end. The page you're looking for might have moved or doesn't exist."
                }
                a href=(self.url("")) { "Take me home" }
            }
        };
        self.base_document("Not found", Some("not-found"), &BTreeMap::new(), content)
    }

    fn render_list_page(
        &self,
        heading: &str,
        tag: Option<&str>,
        page: &ProjectPage,
        page_number: usize,
        tags: &[TagSummary],
    ) -> Markup {
        let content = html! {
            main.list-page {
                h1 { (heading) }
                p.count { (page.total) " projects" }
                (self.tag_cloud(tags, tag))
                div.project-grid {
                    @for project in &page.items {
                        (self.project_card(project))
                    }
                }
                nav.pagination {
                    @if page.has_prev {
                        a rel="prev" href=(self.list_url(tag, page_number - 1)) { "← Newer" }
                    }
                    @if page.has_next {
                        a rel="next" href=(self.list_url(tag, page_number + 1)) { "Older →" }
                    }
                }
            }
        };
        self.base_document(heading, None, &BTreeMap::new(), content)
    }

    fn render_project_page(&self, project: &ProjectRecord, adjacent: &Adjacent) -> Markup {
        let data = &project.data;
        let style = data.color.as_ref().map(|c| format!("--project-color: {c};"));
        let date = data
            .date
            .as_deref()
            .and_then(crate::project::parse_date)
            .map(|d| d.format("%B %Y").to_string());
        let content = html! {
            main.project-page style=[style] {
                header.project-header {
                    h1 { (data.title) }
                    @if let Some(description) = &data.description {
                        p.project-description { (description) }
                    }
                    dl.project-facts {
                        @if let Some(kind) = &data.kind {
                            dt { "Type" } dd { (kind) }
                        }
                        @if let Some(role) = &data.role {
                            dt { "Role" } dd { (role) }
                        }
                        @if !data.services.is_empty() {
                            dt { "Services" } dd { (data.services.join(", ")) }
                        }
                        @if let Some(date) = date {
                            dt { "Date" } dd { (date) }
                        }
                        @if let Some(url) = &data.url {
                            dt { "Live" } dd { a href=(url) target="_blank" rel="noopener noreferrer" { (url) } }
                        }
                    }
                    @if !data.tags.is_empty() {
                        ul.tag-list {
                            @for tag in &data.tags {
                                li { a href=(self.tag_url(tag)) { (tag) } }
                            }
                        }
                    }
                }
                @if let Some(image) = &data.image {
                    figure.hero { (image_tag(image, &data.title)) }
                }
                @if let Some(body) = &project.content {
                    article.project-body { (body) }
                }
                @if !data.gallery.is_empty() {
                    section.gallery {
                        @for image in &data.gallery {
                            figure {
                                (image_tag(image, &data.title))
                                @if let Some(caption) = &image.caption {
                                    figcaption { (caption) }
                                }
                            }
                        }
                    }
                }
                nav.project-nav {
                    @if let Some(next) = &adjacent.next {
                        a rel="next" href=(self.project_url(&next.slug)) { "← " (next.data.title) }
                    }
                    @if let Some(prev) = &adjacent.prev {
                        a rel="prev" href=(self.project_url(&prev.slug)) { (prev.data.title) " →" }
                    }
                }
            }
        };
        self.base_document(&data.title, Some("project"), &data.page_metadata(), content)
    }
}

fn image_tag(image: &ImageRef, fallback_alt: &str) -> Markup {
    let alt = image.caption.as_deref().unwrap_or(fallback_alt);
    html! {
        img src=(image.src) alt=(alt) width=[image.width] height=[image.height] loading="lazy";
    }
}

// ============================================================================
// Tests
// ============================================================================
