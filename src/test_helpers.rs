//! Shared test utilities for the folio test suite.
//!
//! Provides fixture setup, a project-file writer, and lookup helpers that
//! panic with the available slugs on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_project(tmp.path(), "harbour", "Harbour", Some("2024-06-01"), &["web"], true);
//!
//! let repo = ProjectRepository::new(tmp.path());
//! let listing = repo.list_all().unwrap();
//! assert_eq!(slugs(&listing), vec!["harbour"]);
//! assert!(find_project(&listing, "harbour").data.featured);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::project::ProjectRecord;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `<dir>/<slug>.mdx` with the given front-matter and a short body.
pub fn write_project(
    dir: &Path,
    slug: &str,
    title: &str,
    date: Option<&str>,
    tags: &[&str],
    featured: bool,
) {
    let mut source = format!("---\ntitle: \"{title}\"\n");
    if let Some(date) = date {
        source.push_str(&format!("date: \"{date}\"\n"));
    }
    if !tags.is_empty() {
        let quoted: Vec<String> = tags.iter().map(|t| format!("\"{t}\"")).collect();
        source.push_str(&format!("tags: [{}]\n", quoted.join(", ")));
    }
    if featured {
        source.push_str("featured: true\n");
    }
    source.push_str(&format!("---\n\n# {title}\n\nAbout {slug}.\n"));
    std::fs::write(dir.join(format!("{slug}.mdx")), source).unwrap();
}

// =========================================================================
// Lookups and extractors
// =========================================================================

/// Find a project by slug. Panics if not found.
pub fn find_project<'a>(projects: &'a [ProjectRecord], slug: &str) -> &'a ProjectRecord {
    projects.iter().find(|p| p.slug == slug).unwrap_or_else(|| {
        let available = slugs(projects);
        panic!("project '{slug}' not found. Available: {available:?}")
    })
}

/// All slugs in order.
pub fn slugs(projects: &[ProjectRecord]) -> Vec<&str> {
    projects.iter().map(|p| p.slug.as_str()).collect()
}
