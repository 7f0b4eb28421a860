//! Front-matter splitting and parsing.
//!
//! A content file starts with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Harbour
//! date: 2024-06-01
//! tags: [web, api]
//! ---
//!
//! Body in MDX...
//! ```
//!
//! [`split`] separates the block from the body without interpreting either;
//! [`parse`] deserializes the block into [`ProjectMeta`]. The listing only
//! needs `parse`, so bodies are never compiled just to build it.

use crate::project::ProjectMeta;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("missing front-matter block (file must start with a `---` line)")]
    Missing,
    #[error("front-matter block is not closed by a `---` line")]
    Unterminated,
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

const FENCE: &str = "---";

/// Split a document into its raw front-matter text and body.
///
/// The opening fence must be the first line (a UTF-8 BOM is tolerated). The
/// closing fence is the next line consisting of `---` alone; `...` is accepted
/// too, as in YAML document end markers.
pub fn split(source: &str) -> Result<(&str, &str), FrontMatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let rest = match source.split_once('\n') {
        Some((first, rest)) if first.trim_end() == FENCE => rest,
        None if source.trim_end() == FENCE => return Err(FrontMatterError::Unterminated),
        _ => return Err(FrontMatterError::Missing),
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == FENCE || trimmed == "..." {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((yaml, body));
        }
        offset += line.len();
    }
    Err(FrontMatterError::Unterminated)
}

/// Parse the front-matter of a document into project metadata.
pub fn parse(source: &str) -> Result<ProjectMeta, FrontMatterError> {
    let (yaml, _) = split(source)?;
    Ok(serde_yaml::from_str(yaml)?)
}

/// Parse front-matter and hand back the body alongside it.
pub fn parse_with_body(source: &str) -> Result<(ProjectMeta, &str), FrontMatterError> {
    let (yaml, body) = split(source)?;
    Ok((serde_yaml::from_str(yaml)?, body))
}
