//! # Folio
//!
//! Content engine for a personal portfolio. Each project is one MDX file:
//! YAML front-matter for its metadata, Markdown (with a handful of layout
//! components) for its write-up. The file name without extension is the
//! project's slug.
//!
//! ```text
//! content/projects/
//! ├── harbour.mdx        # slug "harbour"
//! ├── lighthouse.mdx
//! └── tidewater.mdx
//! ```
//!
//! # Architecture
//!
//! ```text
//! files ──► ProjectRepository ──► listing (cached, newest first)
//!              │                    ├── featured / tags / adjacent / paginate
//!              │                    ├── api::projects_endpoint  → JSON
//!              │                    └── generate                → dist/
//!              └── get_by_slug ──► BodyCompiler → HTML
//! ```
//!
//! The listing is read once per [`repository::ProjectRepository`] and shared
//! as an `Arc<[ProjectRecord]>`. Every derived view (featured, tags,
//! neighbours, pages) is computed from that one snapshot, so they always
//! agree with each other. Single-project fetches read the file fresh and
//! never touch the cache.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`repository`] | Reads project files, caches the sorted listing, answers every query |
//! | [`project`] | Project metadata, records, pages and tag summaries |
//! | [`frontmatter`] | Splits a file into YAML front-matter and body |
//! | [`markdown`] | Compiles MDX bodies to HTML (`Img`, `ImgBox`, `FullWidth`, external links) |
//! | [`api`] | Transport-agnostic `GET /api/projects` handler |
//! | [`contact`] | Contact form validation, spam checks and mail relay |
//! | [`generate`] | Renders the static site and API snapshots using Maud |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Newest First, Undated Last
//!
//! The listing is sorted by `date` descending. Missing or unparsable dates
//! sort as the Unix epoch, so undated work collects at the end. Ties keep
//! file-name order because the sort is stable over a name-sorted file list.
//!
//! ## One Bad File Fails the Listing
//!
//! A file with broken front-matter makes `list_all` an error instead of
//! silently shrinking the portfolio. Sites that prefer to publish anyway set
//! `content.skip_invalid = true`, which logs and skips the file.
//!
//! ## No Server
//!
//! Handlers in [`api`] and [`contact`] return a status code and JSON body.
//! The CLI prints them, and `build` writes snapshots of the project endpoint
//! next to the HTML, so the output works on any static file host.

pub mod api;
pub mod config;
pub mod contact;
pub mod frontmatter;
pub mod generate;
pub mod markdown;
pub mod output;
pub mod project;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_helpers;
