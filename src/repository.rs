//! The project content repository.
//!
//! Projects are flat files in one directory, one file per project, named
//! `<slug>.<ext>` and starting with a YAML front-matter block:
//!
//! ```text
//! content/projects/
//! ├── harbour.mdx          # slug "harbour"
//! ├── Lighthouse.mdx       # slug "Lighthouse" (case preserved)
//! └── notes.txt            # ignored: wrong extension
//! ```
//!
//! ## The listing cache
//!
//! Every query except [`get_by_slug`](ProjectRepository::get_by_slug) works
//! off the *listing*: slug + metadata for every project, sorted newest first.
//! The listing is built on first use and then kept for the life of the
//! repository:
//!
//! ```text
//! Unpopulated ──first listing query──▶ Populated(listing)
//! ```
//!
//! There is no transition back, so content edits need a new repository
//! (in practice, a process restart). Population is single-flight: callers
//! that arrive while it runs block on the same computation and get the same
//! `Arc`. A failed population leaves the cache unpopulated and the next call
//! tries again.
//!
//! Single-project fetches read the file fresh and compile its body every
//! time; they never touch or refresh the cache.
//!
//! ## Ordering
//!
//! Descending by front-matter `date`. Missing or unparsable dates count as the
//! Unix epoch. Files are read in name order and the sort is stable, so ties
//! keep name order.

use crate::config::ContentConfig;
use crate::frontmatter::{self, FrontMatterError};
use crate::markdown::{BodyCompiler, CompileError, MdxCompiler};
use crate::project::{Adjacent, ProjectPage, ProjectRecord, TagSummary};
use once_cell::sync::OnceCell;
use rayon::prelude::*;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Project not found: {0}")]
    NotFound(String),
    #[error("Invalid front-matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
    #[error("Failed to compile {slug}: {source}")]
    Compile {
        slug: String,
        #[source]
        source: CompileError,
    },
    #[error("Invalid pagination: {0}")]
    InvalidPage(&'static str),
}

/// Observable state of the listing cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Unpopulated,
    Populated { projects: usize },
}

/// Loads and queries project records from a content directory.
pub struct ProjectRepository {
    dir: PathBuf,
    extension: String,
    skip_invalid: bool,
    compiler: Box<dyn BodyCompiler>,
    listing: OnceCell<Arc<[ProjectRecord]>>,
}

impl std::fmt::Debug for ProjectRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectRepository")
            .field("dir", &self.dir)
            .field("extension", &self.extension)
            .field("skip_invalid", &self.skip_invalid)
            .field("cache", &self.cache_state())
            .finish_non_exhaustive()
    }
}

impl ProjectRepository {
    /// Repository over `dir` reading `.mdx` files with the default compiler.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: "mdx".to_string(),
            skip_invalid: false,
            compiler: Box::new(MdxCompiler),
            listing: OnceCell::new(),
        }
    }

    /// Repository configured from the `[content]` section, rooted at `root`.
    pub fn from_config(root: &Path, content: &ContentConfig) -> Self {
        Self::new(root.join(&content.projects_dir))
            .with_extension(&content.extension)
            .skip_invalid(content.skip_invalid)
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn with_compiler(mut self, compiler: impl BodyCompiler + 'static) -> Self {
        self.compiler = Box::new(compiler);
        self
    }

    /// Leave files with broken front-matter out of the listing (with a
    /// warning) instead of failing the whole listing.
    pub fn skip_invalid(mut self, skip: bool) -> Self {
        self.skip_invalid = skip;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn cache_state(&self) -> CacheState {
        match self.listing.get() {
            Some(listing) => CacheState::Populated {
                projects: listing.len(),
            },
            None => CacheState::Unpopulated,
        }
    }

    /// All projects, metadata only, newest first.
    ///
    /// The first call reads the content directory; every later call returns
    /// the same cached `Arc`.
    pub fn list_all(&self) -> Result<Arc<[ProjectRecord]>, RepositoryError> {
        self.listing
            .get_or_try_init(|| self.load_listing().map(Arc::from))
            .cloned()
    }

    /// A single project read fresh from disk, with its body compiled.
    pub fn get_by_slug(&self, slug: &str) -> Result<ProjectRecord, RepositoryError> {
        if !is_plain_slug(slug) {
            return Err(RepositoryError::NotFound(slug.to_string()));
        }
        let path = self.dir.join(format!("{slug}.{}", self.extension));
        let source = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                RepositoryError::NotFound(slug.to_string())
            } else {
                RepositoryError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let (data, body) = frontmatter::parse_with_body(&source)
            .map_err(|source| RepositoryError::FrontMatter { path, source })?;
        let content = self
            .compiler
            .compile(body)
            .map_err(|source| RepositoryError::Compile {
                slug: slug.to_string(),
                source,
            })?;

        debug!(slug, "compiled project body");
        Ok(ProjectRecord {
            slug: slug.to_string(),
            data,
            content: Some(content),
        })
    }

    /// Neighbours of `slug` in listing order.
    ///
    /// `next` is the newer project, `prev` the older one. An unknown slug has
    /// no neighbours rather than being an error.
    pub fn get_adjacent(&self, slug: &str) -> Result<Adjacent, RepositoryError> {
        let listing = self.list_all()?;
        let Some(index) = listing.iter().position(|p| p.slug == slug) else {
            return Ok(Adjacent::default());
        };
        Ok(Adjacent {
            prev: listing.get(index + 1).cloned(),
            next: index
                .checked_sub(1)
                .and_then(|i| listing.get(i))
                .cloned(),
        })
    }

    /// One page of the listing, optionally filtered to projects tagged `tag`.
    ///
    /// `page` is 1-based. Both `page` and `per_page` must be at least 1. A page
    /// past the end is empty, not an error.
    pub fn paginate(
        &self,
        page: usize,
        per_page: usize,
        tag: Option<&str>,
    ) -> Result<ProjectPage, RepositoryError> {
        if page == 0 {
            return Err(RepositoryError::InvalidPage("page must be at least 1"));
        }
        if per_page == 0 {
            return Err(RepositoryError::InvalidPage("per_page must be at least 1"));
        }

        let listing = self.list_all()?;
        let filtered: Vec<&ProjectRecord> = match tag {
            Some(tag) => listing.iter().filter(|p| p.data.has_tag(tag)).collect(),
            None => listing.iter().collect(),
        };

        let total = filtered.len();
        let start = (page - 1).saturating_mul(per_page);
        let end = start.saturating_add(per_page);
        let items = filtered
            .iter()
            .skip(start)
            .take(per_page)
            .map(|p| (*p).clone())
            .collect();

        Ok(ProjectPage {
            items,
            has_next: end < total,
            has_prev: page > 1,
            total,
        })
    }

    /// Featured projects, in listing order.
    pub fn list_featured(&self) -> Result<Vec<ProjectRecord>, RepositoryError> {
        Ok(self
            .list_all()?
            .iter()
            .filter(|p| p.data.featured)
            .cloned()
            .collect())
    }

    /// Every tag in the listing with its project count, sorted by name.
    pub fn list_tags(&self) -> Result<Vec<TagSummary>, RepositoryError> {
        let listing = self.list_all()?;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for project in listing.iter() {
            // A tag repeated within one project still counts that project once.
            let distinct: BTreeSet<&str> = project.data.tags.iter().map(String::as_str).collect();
            for tag in distinct {
                *counts.entry(tag).or_default() += 1;
            }
        }
        Ok(counts
            .into_iter()
            .map(|(name, count)| TagSummary {
                name: name.to_string(),
                count,
            })
            .collect())
    }

    fn load_listing(&self) -> Result<Vec<ProjectRecord>, RepositoryError> {
        let files = self.content_files()?;

        let loaded: Vec<(PathBuf, Result<ProjectRecord, RepositoryError>)> = files
            .into_par_iter()
            .map(|(slug, path)| {
                let record = read_listing_entry(&slug, &path);
                (path, record)
            })
            .collect();

        let mut projects = Vec::with_capacity(loaded.len());
        for (path, record) in loaded {
            match record {
                Ok(record) => projects.push(record),
                Err(err @ RepositoryError::FrontMatter { .. }) if self.skip_invalid => {
                    warn!(path = %path.display(), error = %err, "skipping project file");
                }
                Err(err) => return Err(err),
            }
        }

        projects.sort_by_key(|p| Reverse(p.data.sort_date()));
        info!(
            dir = %self.dir.display(),
            projects = projects.len(),
            "populated project listing"
        );
        Ok(projects)
    }

    /// `(slug, path)` for every content file, sorted by file name.
    fn content_files(&self) -> Result<Vec<(String, PathBuf)>, RepositoryError> {
        let io_err = |source| RepositoryError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if !path.is_file() {
                continue;
            }
            let Some(slug) = self.slug_for(&path) else {
                continue;
            };
            files.push((slug, path));
        }
        files.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(files)
    }

    /// File name with the content extension stripped, case preserved. Only
    /// stems that [`get_by_slug`](Self::get_by_slug) would accept are listed.
    fn slug_for(&self, path: &Path) -> Option<String> {
        let name = path.file_name()?.to_str()?;
        let stem = name.strip_suffix(&format!(".{}", self.extension))?;
        (!stem.starts_with('.') && is_plain_slug(stem)).then(|| stem.to_string())
    }
}

fn read_listing_entry(slug: &str, path: &Path) -> Result<ProjectRecord, RepositoryError> {
    let source = fs::read_to_string(path).map_err(|source| RepositoryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = frontmatter::parse(&source).map_err(|source| RepositoryError::FrontMatter {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ProjectRecord::new(slug, data))
}

/// A slug names a file directly inside the content directory.
fn is_plain_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use maud::{Markup, PreEscaped};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// The three-project example: b (newest, featured), a, c (oldest).
    fn example_repo() -> (TempDir, ProjectRepository) {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path(), "a", "A", Some("2024-01-01"), &["web"], false);
        write_project(tmp.path(), "b", "B", Some("2024-06-01"), &["web", "api"], true);
        write_project(tmp.path(), "c", "C", Some("2023-01-01"), &[], false);
        let repo = ProjectRepository::new(tmp.path());
        (tmp, repo)
    }

    #[test]
    fn listing_sorted_newest_first() {
        let (_tmp, repo) = example_repo();
        assert_eq!(slugs(&repo.list_all().unwrap()), vec!["b", "a", "c"]);
    }

    #[test]
    fn listing_has_no_bodies() {
        let (_tmp, repo) = example_repo();
        assert!(repo.list_all().unwrap().iter().all(|p| p.content.is_none()));
    }

    #[test]
    fn missing_and_invalid_dates_sort_last() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path(), "undated", "Undated", None, &[], false);
        write_project(tmp.path(), "garbled", "Garbled", Some("sometime"), &[], false);
        write_project(tmp.path(), "dated", "Dated", Some("1999-12-31"), &[], false);
        let repo = ProjectRepository::new(tmp.path());

        // Ties keep file-name order.
        assert_eq!(
            slugs(&repo.list_all().unwrap()),
            vec!["dated", "garbled", "undated"]
        );
    }

    #[test]
    fn only_matching_extension_is_listed() {
        let (tmp, _) = example_repo();
        fs::write(tmp.path().join("notes.txt"), "---\ntitle: Notes\n---\n").unwrap();
        fs::write(tmp.path().join("draft.md"), "---\ntitle: Draft\n---\n").unwrap();
        fs::create_dir(tmp.path().join("folder.mdx")).unwrap();
        let repo = ProjectRepository::new(tmp.path());
        assert_eq!(repo.list_all().unwrap().len(), 3);
    }

    #[test]
    fn custom_extension() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("one.md"), "---\ntitle: One\n---\n").unwrap();
        fs::write(tmp.path().join("two.mdx"), "---\ntitle: Two\n---\n").unwrap();
        let repo = ProjectRepository::new(tmp.path()).with_extension(".md");
        assert_eq!(slugs(&repo.list_all().unwrap()), vec!["one"]);
    }

    #[test]
    fn slug_preserves_case() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("MixedCase.mdx"), "---\ntitle: M\n---\n").unwrap();
        let repo = ProjectRepository::new(tmp.path());
        assert_eq!(slugs(&repo.list_all().unwrap()), vec!["MixedCase"]);
    }

    #[test]
    fn cache_transitions_once() {
        let (_tmp, repo) = example_repo();
        assert_eq!(repo.cache_state(), CacheState::Unpopulated);
        repo.list_tags().unwrap();
        assert_eq!(repo.cache_state(), CacheState::Populated { projects: 3 });
    }

    #[test]
    fn listing_is_cached_and_stale() {
        let (tmp, repo) = example_repo();
        let first = repo.list_all().unwrap();

        write_project(tmp.path(), "d", "D", Some("2025-01-01"), &[], false);
        let second = repo.list_all().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 3);

        // A fresh repository sees the new file.
        let fresh = ProjectRepository::new(tmp.path());
        assert_eq!(slugs(&fresh.list_all().unwrap())[0], "d");
    }

    #[test]
    fn concurrent_first_calls_share_one_listing() {
        let (_tmp, repo) = example_repo();
        let results: Vec<Arc<[ProjectRecord]>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(|| repo.list_all().unwrap())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for listing in &results[1..] {
            assert!(Arc::ptr_eq(&results[0], listing));
        }
    }

    #[test]
    fn unreadable_directory_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let repo = ProjectRepository::new(tmp.path().join("missing"));
        assert!(matches!(repo.list_all(), Err(RepositoryError::Io { .. })));
        assert_eq!(repo.cache_state(), CacheState::Unpopulated);
    }

    #[test]
    fn failed_population_is_retried() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("later");
        let repo = ProjectRepository::new(&dir);
        assert!(repo.list_all().is_err());

        fs::create_dir(&dir).unwrap();
        write_project(&dir, "x", "X", None, &[], false);
        assert_eq!(repo.list_all().unwrap().len(), 1);
    }

    #[test]
    fn corrupt_file_fails_listing_by_default() {
        let (tmp, _) = example_repo();
        fs::write(tmp.path().join("broken.mdx"), "no front-matter here").unwrap();
        let repo = ProjectRepository::new(tmp.path());

        let err = repo.list_all().unwrap_err();
        match err {
            RepositoryError::FrontMatter { path, .. } => assert!(path.ends_with("broken.mdx")),
            other => panic!("expected front-matter error, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_file_skipped_when_configured() {
        let (tmp, _) = example_repo();
        fs::write(tmp.path().join("broken.mdx"), "---\ndate: 2024-01-01\n---\n").unwrap();
        let repo = ProjectRepository::new(tmp.path()).skip_invalid(true);
        assert_eq!(slugs(&repo.list_all().unwrap()), vec!["b", "a", "c"]);
    }

    #[test]
    fn from_config_uses_content_section() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("work");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("one.md"), "---\ntitle: One\n---\n").unwrap();

        let content = ContentConfig {
            projects_dir: PathBuf::from("work"),
            extension: "md".to_string(),
            skip_invalid: false,
        };
        let repo = ProjectRepository::from_config(tmp.path(), &content);
        assert_eq!(slugs(&repo.list_all().unwrap()), vec!["one"]);
    }

    // =========================================================================
    // get_by_slug
    // =========================================================================

    #[test]
    fn get_by_slug_compiles_body() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("site.mdx"),
            "---\ntitle: Site\ntags: [web]\n---\n\n## Hello\n",
        )
        .unwrap();
        let repo = ProjectRepository::new(tmp.path());

        let project = repo.get_by_slug("site").unwrap();
        assert_eq!(project.data.title, "Site");
        let html = project.content.unwrap().into_string();
        assert!(html.contains("<h2>Hello</h2>"));
    }

    #[test]
    fn get_by_slug_bypasses_cache() {
        let (tmp, repo) = example_repo();
        repo.list_all().unwrap();

        write_project(tmp.path(), "a", "A renamed", Some("2024-01-01"), &["web"], false);
        assert_eq!(repo.get_by_slug("a").unwrap().data.title, "A renamed");
        let cached = repo.list_all().unwrap();
        assert_eq!(find_project(&cached, "a").data.title, "A");

        // Files added after population are still fetchable by slug.
        write_project(tmp.path(), "late", "Late", None, &[], false);
        assert!(repo.get_by_slug("late").is_ok());
    }

    #[test]
    fn get_by_slug_does_not_populate_cache() {
        let (_tmp, repo) = example_repo();
        repo.get_by_slug("a").unwrap();
        assert_eq!(repo.cache_state(), CacheState::Unpopulated);
    }

    #[test]
    fn get_by_slug_unknown_is_not_found() {
        let (_tmp, repo) = example_repo();
        assert!(matches!(
            repo.get_by_slug("nope"),
            Err(RepositoryError::NotFound(slug)) if slug == "nope"
        ));
    }

    #[test]
    fn get_by_slug_rejects_path_traversal() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("projects");
        fs::create_dir(&dir).unwrap();
        fs::write(tmp.path().join("secret.mdx"), "---\ntitle: Secret\n---\n").unwrap();
        let repo = ProjectRepository::new(&dir);

        for slug in ["../secret", "..", "", "a/b"] {
            assert!(
                matches!(repo.get_by_slug(slug), Err(RepositoryError::NotFound(_))),
                "slug {slug:?} should not resolve"
            );
        }
    }

    #[test]
    fn get_by_slug_surfaces_compile_errors() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("odd.mdx"),
            "---\ntitle: Odd\n---\n\n<Marquee />\n",
        )
        .unwrap();
        let repo = ProjectRepository::new(tmp.path());
        assert!(matches!(
            repo.get_by_slug("odd"),
            Err(RepositoryError::Compile { .. })
        ));
    }

    struct CountingCompiler(Arc<AtomicUsize>);

    impl BodyCompiler for CountingCompiler {
        fn compile(&self, body: &str) -> Result<Markup, CompileError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(PreEscaped(body.trim().to_string()))
        }
    }

    #[test]
    fn bodies_compiled_only_on_fetch() {
        let (_tmp, repo) = example_repo();
        let calls = Arc::new(AtomicUsize::new(0));
        let repo = ProjectRepository::new(repo.dir()).with_compiler(CountingCompiler(calls.clone()));

        repo.list_all().unwrap();
        repo.paginate(1, 10, None).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        repo.get_by_slug("a").unwrap();
        repo.get_by_slug("a").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[test]
    fn featured_subset_in_listing_order() {
        let (tmp, _) = example_repo();
        write_project(tmp.path(), "old-star", "Old star", Some("2020-01-01"), &[], true);
        let repo = ProjectRepository::new(tmp.path());
        assert_eq!(slugs(&repo.list_featured().unwrap()), vec!["b", "old-star"]);
    }

    #[test]
    fn tags_sorted_by_name_with_counts() {
        let (_tmp, repo) = example_repo();
        let tags = repo.list_tags().unwrap();
        assert_eq!(
            tags,
            vec![
                TagSummary {
                    name: "api".to_string(),
                    count: 1
                },
                TagSummary {
                    name: "web".to_string(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn tags_are_case_sensitive() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path(), "x", "X", None, &["Web"], false);
        write_project(tmp.path(), "y", "Y", None, &["web"], false);
        let repo = ProjectRepository::new(tmp.path());
        let names: Vec<String> = repo.list_tags().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Web", "web"]);
    }

    #[cfg(unix)]
    #[test]
    fn unfetchable_file_names_not_listed() {
        let (tmp, repo) = example_repo();
        fs::write(tmp.path().join("a\\b.mdx"), "---\ntitle: Odd\n---\n").unwrap();

        let listing = repo.list_all().unwrap();
        assert_eq!(slugs(&listing), vec!["b", "a", "c"]);
        for project in listing.iter() {
            repo.get_by_slug(&project.slug).unwrap();
        }
    }

    #[test]
    fn repeated_tag_counts_project_once() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path(), "x", "X", None, &["web", "web"], false);
        let repo = ProjectRepository::new(tmp.path());
        assert_eq!(repo.list_tags().unwrap()[0].count, 1);
    }

    #[test]
    fn first_page_of_example() {
        let (_tmp, repo) = example_repo();
        let page = repo.paginate(1, 2, None).unwrap();
        assert_eq!(slugs(&page.items), vec!["b", "a"]);
        assert!(page.has_next);
        assert!(!page.has_prev);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn last_page_has_no_next() {
        let (_tmp, repo) = example_repo();
        let page = repo.paginate(2, 2, None).unwrap();
        assert_eq!(slugs(&page.items), vec!["c"]);
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn exact_fit_last_page_has_no_next() {
        let (_tmp, repo) = example_repo();
        let page = repo.paginate(1, 3, None).unwrap();
        assert_eq!(page.items.len(), 3);
        assert!(!page.has_next);
    }

    #[test]
    fn page_past_end_is_empty() {
        let (_tmp, repo) = example_repo();
        let page = repo.paginate(9, 2, None).unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_next);
        assert!(page.has_prev);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn huge_page_number_does_not_overflow() {
        let (_tmp, repo) = example_repo();
        let page = repo.paginate(usize::MAX, usize::MAX, None).unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_next);
    }

    #[test]
    fn tag_filter_counts_filtered_total() {
        let (_tmp, repo) = example_repo();
        let page = repo.paginate(1, 1, Some("web")).unwrap();
        assert_eq!(slugs(&page.items), vec!["b"]);
        assert_eq!(page.total, 2);
        assert!(page.has_next);

        let none = repo.paginate(1, 5, Some("WEB")).unwrap();
        assert!(none.items.is_empty());
        assert_eq!(none.total, 0);
    }

    #[test]
    fn zero_page_or_size_rejected() {
        let (_tmp, repo) = example_repo();
        assert!(matches!(
            repo.paginate(0, 5, None),
            Err(RepositoryError::InvalidPage(_))
        ));
        assert!(matches!(
            repo.paginate(1, 0, None),
            Err(RepositoryError::InvalidPage(_))
        ));
    }

    #[test]
    fn adjacent_in_the_middle() {
        let (_tmp, repo) = example_repo();
        let adjacent = repo.get_adjacent("a").unwrap();
        assert_eq!(adjacent.prev.unwrap().slug, "c");
        assert_eq!(adjacent.next.unwrap().slug, "b");
    }

    #[test]
    fn adjacent_at_the_ends() {
        let (_tmp, repo) = example_repo();
        let newest = repo.get_adjacent("b").unwrap();
        assert!(newest.next.is_none());
        assert_eq!(newest.prev.unwrap().slug, "a");

        let oldest = repo.get_adjacent("c").unwrap();
        assert!(oldest.prev.is_none());
        assert_eq!(oldest.next.unwrap().slug, "a");
    }

    #[test]
    fn adjacent_unknown_slug_is_empty() {
        let (_tmp, repo) = example_repo();
        assert_eq!(repo.get_adjacent("zzz").unwrap(), Adjacent::default());
    }

    #[test]
    fn fixture_site_loads() {
        let tmp = setup_fixtures();
        let repo = ProjectRepository::new(tmp.path().join("content/projects"));
        let listing = repo.list_all().unwrap();
        assert_eq!(listing.len(), 4);
        assert!(find_project(&listing, "tidewater").data.featured);
        assert_eq!(find_project(&listing, "sketchbook").data.date, None);
        for project in listing.iter() {
            repo.get_by_slug(&project.slug).unwrap();
        }
    }
}
