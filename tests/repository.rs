//! End-to-end checks against the fixture site through the public API.

use chrono::{TimeZone, Utc};
use folio::api::{self, ProjectsQuery};
use folio::config;
use folio::contact::{self, OutboxMailer};
use folio::generate;
use folio::repository::{CacheState, ProjectRepository, RepositoryError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn fixture_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    for entry in walkdir::WalkDir::new(&src).min_depth(1) {
        let entry = entry.unwrap();
        let dst = tmp.path().join(entry.path().strip_prefix(&src).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dst).unwrap();
        } else {
            fs::copy(entry.path(), &dst).unwrap();
        }
    }
    tmp
}

fn open(root: &Path) -> (config::SiteConfig, ProjectRepository) {
    let site_config = config::load_config(root).unwrap();
    let repo = ProjectRepository::from_config(root, &site_config.content);
    (site_config, repo)
}

fn slugs(repo: &ProjectRepository) -> Vec<String> {
    repo.list_all()
        .unwrap()
        .iter()
        .map(|p| p.slug.clone())
        .collect()
}

#[test]
fn listing_is_newest_first_with_undated_last() {
    let site = fixture_site();
    let (_, repo) = open(site.path());
    assert_eq!(
        slugs(&repo),
        vec!["harbour", "lighthouse", "tidewater", "sketchbook"]
    );
}

#[test]
fn derived_views_agree_with_listing() {
    let site = fixture_site();
    let (_, repo) = open(site.path());

    let featured: Vec<String> = repo
        .list_featured()
        .unwrap()
        .into_iter()
        .map(|p| p.slug)
        .collect();
    assert_eq!(featured, vec!["harbour", "tidewater"]);

    let tags: Vec<(String, usize)> = repo
        .list_tags()
        .unwrap()
        .into_iter()
        .map(|t| (t.name, t.count))
        .collect();
    assert_eq!(
        tags,
        vec![
            ("api".to_string(), 2),
            ("data".to_string(), 1),
            ("web".to_string(), 2)
        ]
    );

    let adjacent = repo.get_adjacent("lighthouse").unwrap();
    assert_eq!(adjacent.next.unwrap().slug, "harbour");
    assert_eq!(adjacent.prev.unwrap().slug, "tidewater");
}

#[test]
fn content_edits_need_a_new_repository() {
    let site = fixture_site();
    let (site_config, repo) = open(site.path());
    assert_eq!(repo.cache_state(), CacheState::Unpopulated);
    assert_eq!(repo.list_all().unwrap().len(), 4);

    fs::remove_file(site.path().join("content/projects/sketchbook.mdx")).unwrap();
    assert_eq!(repo.list_all().unwrap().len(), 4);
    assert_eq!(repo.cache_state(), CacheState::Populated { projects: 4 });

    // Single fetches go to disk.
    assert!(matches!(
        repo.get_by_slug("sketchbook"),
        Err(RepositoryError::NotFound(_))
    ));

    let fresh = ProjectRepository::from_config(site.path(), &site_config.content);
    assert_eq!(fresh.list_all().unwrap().len(), 3);
}

#[test]
fn detail_fetch_renders_components() {
    let site = fixture_site();
    let (_, repo) = open(site.path());
    let harbour = repo.get_by_slug("harbour").unwrap();
    let html = harbour.content.unwrap().into_string();
    assert!(html.contains(r#"class="mdx-img""#));
    assert!(html.contains(r#"class="full-width""#));
    assert!(html.contains(r#"target="_blank""#));
    assert_eq!(harbour.data.gallery.len(), 2);
    assert_eq!(harbour.data.kind.as_deref(), Some("Web app"));
}

#[test]
fn query_endpoint_pages_through_tag() {
    let site = fixture_site();
    let (site_config, repo) = open(site.path());

    let first = api::projects_endpoint(
        &repo,
        &ProjectsQuery::parse("?tag=web&perPage=1", &site_config.api),
    );
    assert_eq!(first.status, 200);
    assert_eq!(first.body["total"], 2);
    assert_eq!(first.body["projects"][0]["slug"], "harbour");
    assert_eq!(first.body["hasNextPage"], true);

    let second = api::projects_endpoint(
        &repo,
        &ProjectsQuery::parse("?tag=web&perPage=1&page=2", &site_config.api),
    );
    assert_eq!(second.body["projects"][0]["slug"], "lighthouse");
    assert_eq!(second.body["hasNextPage"], false);
    assert_eq!(second.body["hasPrevPage"], true);

    // Listing entries never carry a body.
    assert!(second.body["projects"][0].get("content").is_none());
}

#[test]
fn contact_submission_lands_in_outbox() {
    let site = fixture_site();
    let (site_config, _) = open(site.path());
    let outbox = site_config.outbox_dir(site.path());
    let mailer = OutboxMailer::new(&outbox);
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let loaded_at = now.timestamp_millis() - 60_000;
    let body = format!(
        r#"{{"name":"Sam","email":"sam@example.com","message":"Hello","timestamp":{loaded_at}}}"#
    );

    let response = contact::contact_endpoint(
        &body,
        now,
        &site_config.contact,
        &site_config.site.name,
        &mailer,
    );
    assert_eq!(response.status, 200);

    let files: Vec<_> = fs::read_dir(&outbox).unwrap().collect();
    assert_eq!(files.len(), 1);
    let written = fs::read_to_string(files[0].as_ref().unwrap().path()).unwrap();
    assert!(written.contains("hello@jamie.example"));
    assert!(written.contains("sam@example.com"));
}

#[test]
fn build_writes_every_project_page() {
    let site = fixture_site();
    let (site_config, repo) = open(site.path());
    let out = site.path().join("dist");

    let report = generate::generate(&repo, &site_config, site.path(), &out).unwrap();

    for slug in ["harbour", "lighthouse", "tidewater", "sketchbook"] {
        assert!(out.join(format!("projects/{slug}/index.html")).exists(), "{slug}");
    }
    assert!(report.pages.iter().any(|(_, path)| path == "index.html"));
}
