//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives at
//! the site root (next to `content/`) and is layered on top of stock
//! defaults, so it only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! name = "Portfolio"
//! description = ""
//! base_url = "/"
//!
//! [content]
//! projects_dir = "content/projects"  # Relative to the site root
//! extension = "mdx"                  # Content file extension (no dot)
//! skip_invalid = false               # Skip unparsable files instead of failing
//!
//! [api]
//! default_page = 1
//! default_per_page = 5
//!
//! [pages]
//! per_page = 6                       # Projects per static list page
//!
//! [contact]
//! min_submission_seconds = 10        # Faster submissions are treated as spam
//! from_email = ""
//! to_email = ""
//! outbox_dir = "outbox"              # Relative to the site root
//!
//! [colors.light]
//! background = "#ffffff"
//! text = "#111111"
//! text_muted = "#666666"
//! border = "#e0e0e0"
//! link = "#333333"
//! link_hover = "#000000"
//!
//! [colors.dark]
//! background = "#0a0a0a"
//! text = "#eeeeee"
//! text_muted = "#999999"
//! border = "#333333"
//! link = "#cccccc"
//! link_hover = "#ffffff"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity used in page titles and email subjects.
    pub site: SiteInfo,
    /// Where project files live and how they are read.
    pub content: ContentConfig,
    /// Defaults for the project query endpoint.
    pub api: ApiConfig,
    /// Static list page settings.
    pub pages: PagesConfig,
    /// Contact relay settings.
    pub contact: ContactConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content.extension.is_empty() || self.content.extension.contains('.') {
            return Err(ConfigError::Validation(
                "content.extension must be a bare extension such as \"mdx\"".into(),
            ));
        }
        if self.api.default_page == 0 || self.api.default_per_page == 0 {
            return Err(ConfigError::Validation(
                "api.default_page and api.default_per_page must be at least 1".into(),
            ));
        }
        if self.pages.per_page == 0 {
            return Err(ConfigError::Validation(
                "pages.per_page must be at least 1".into(),
            ));
        }
        if self.site.name.trim().is_empty() {
            return Err(ConfigError::Validation("site.name must not be empty".into()));
        }
        if !self.site.base_url.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "site.base_url must end with '/', got {:?}",
                self.site.base_url
            )));
        }
        Ok(())
    }

    /// Absolute projects directory for a site rooted at `root`.
    pub fn projects_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.content.projects_dir)
    }

    /// Absolute outbox directory for a site rooted at `root`.
    pub fn outbox_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.contact.outbox_dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub name: String,
    pub description: String,
    /// Prefix for every generated link. Must end with `/`.
    pub base_url: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "Portfolio".to_string(),
            description: String::new(),
            base_url: "/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Project files directory, relative to the site root.
    pub projects_dir: PathBuf,
    /// Recognized content file extension, without the dot.
    pub extension: String,
    /// When true, files with broken front-matter are logged and left out of
    /// the listing instead of failing it.
    pub skip_invalid: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            projects_dir: PathBuf::from("content/projects"),
            extension: "mdx".to_string(),
            skip_invalid: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Page used when the query omits `page` or it does not parse.
    pub default_page: usize,
    /// Page size used when the query omits `perPage` or it does not parse.
    pub default_per_page: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_per_page: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagesConfig {
    pub per_page: usize,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self { per_page: 6 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactConfig {
    /// Submissions arriving sooner than this after the form loaded are spam.
    pub min_submission_seconds: u64,
    pub from_email: String,
    pub to_email: String,
    /// Directory the outbox mailer writes messages into, relative to the site root.
    pub outbox_dir: PathBuf,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            min_submission_seconds: 10,
            from_email: String::new(),
            to_email: String::new(),
            outbox_dir: PathBuf::from("outbox"),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Muted/secondary text color (dates, tags, captions).
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111111".to_string(),
            text_muted: "#666666".to_string(),
            border: "#e0e0e0".to_string(),
            link: "#333333".to_string(),
            link_hover: "#000000".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            border: "#333333".to_string(),
            link: "#cccccc".to_string(),
            link_hover: "#ffffff".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the site root.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# folio configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
name = "Portfolio"
description = ""
# Prefix for generated links. Must end with "/".
base_url = "/"

# ---------------------------------------------------------------------------
# Project content
# ---------------------------------------------------------------------------
[content]
# One file per project: <slug>.<extension>, front-matter first.
projects_dir = "content/projects"
extension = "mdx"
# Leave broken files out of the listing (with a warning) instead of failing.
skip_invalid = false

# ---------------------------------------------------------------------------
# Project query endpoint (infinite scroll)
# ---------------------------------------------------------------------------
[api]
# Used when page / perPage are missing or not numbers.
default_page = 1
default_per_page = 5

# ---------------------------------------------------------------------------
# Static list pages
# ---------------------------------------------------------------------------
[pages]
per_page = 6

# ---------------------------------------------------------------------------
# Contact relay
# ---------------------------------------------------------------------------
[contact]
# Submissions sent sooner than this after the form loaded count as spam.
min_submission_seconds = 10
from_email = ""
to_email = ""
# Accepted messages are written here as JSON for the mail sender to pick up.
outbox_dir = "outbox"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#111111"
text_muted = "#666666"    # Dates, tags, captions
border = "#e0e0e0"
link = "#333333"
link_hover = "#000000"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0a0a0a"
text = "#eeeeee"
text_muted = "#999999"
border = "#333333"
link = "#cccccc"
link_hover = "#ffffff"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-link-hover: {light_link_hover};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
        --color-link-hover: {dark_link_hover};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_link_hover = colors.light.link_hover,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_link_hover = colors.dark.link_hover,
    )
}
