//! Project body compilation: MDX-flavoured markdown to HTML.
//!
//! Bodies are markdown with a small set of embedded components. The
//! repository only talks to the [`BodyCompiler`] trait; [`MdxCompiler`] is the
//! implementation used by the CLI and the static generator.
//!
//! ## Components
//!
//! | Source | Output |
//! |--------|--------|
//! | `<Img src="…" caption="…" />` | `figure.mdx-img` with optional `figcaption` |
//! | `<ImgBox src="…" caption="…" color="…" />` | `div.img-box` on a colored backdrop |
//! | `<FullWidth>` … `</FullWidth>` | `div.full-width` breakout wrapper |
//! | `[text](url)` | anchor opening in a new tab |
//!
//! Component tags are recognised wherever pulldown-cmark reports raw HTML,
//! so a self-closing component needs to sit on its own line, separated from
//! surrounding paragraphs by blank lines, the same as any HTML block.
//! Lower-case tags are ordinary HTML and pass through untouched; an unknown
//! capitalised tag is an error rather than silently dropped markup.

use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, html as md_html};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CompileError {
    #[error("unknown component <{0}>")]
    UnknownComponent(String),
    #[error("component <{component}> requires a `{attribute}` attribute")]
    MissingAttribute {
        component: &'static str,
        attribute: &'static str,
    },
}

/// Turns a project body into renderable HTML.
pub trait BodyCompiler: Send + Sync {
    fn compile(&self, body: &str) -> Result<Markup, CompileError>;
}

/// Default compiler: CommonMark plus tables, footnotes and strikethrough, with
/// the portfolio components resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct MdxCompiler;

impl BodyCompiler for MdxCompiler {
    fn compile(&self, body: &str) -> Result<Markup, CompileError> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);

        let mut events = Vec::new();
        for event in Parser::new_ext(body, options) {
            events.push(match event {
                Event::Html(raw) => Event::Html(resolve_components(&raw)?.into()),
                Event::InlineHtml(raw) => Event::InlineHtml(resolve_components(&raw)?.into()),
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    ..
                }) => Event::Html(open_external_link(link_type, &dest_url, &title).into()),
                Event::End(TagEnd::Link) => Event::Html(CowStr::Borrowed("</a>")),
                other => other,
            });
        }

        let mut out = String::with_capacity(body.len() * 3 / 2);
        md_html::push_html(&mut out, events.into_iter());
        Ok(PreEscaped(out))
    }
}

static COMPONENT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Z][A-Za-z0-9]*)((?:\s+[^>]*?)?)\s*(/?)>").expect("valid regex")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][A-Za-z0-9_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|\{\s*([0-9]+)\s*\})"#)
        .expect("valid regex")
});

/// Replace every component tag in a raw HTML fragment with its rendering.
fn resolve_components(raw: &str) -> Result<String, CompileError> {
    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for caps in COMPONENT_TAG.captures_iter(raw) {
        let whole = caps.get(0).expect("group 0 always matches");
        out.push_str(&raw[last..whole.start()]);
        last = whole.end();

        let closing = !caps[1].is_empty();
        let name = &caps[2];
        let attrs = parse_attributes(caps.get(3).map_or("", |m| m.as_str()));

        let rendered = match (name, closing) {
            ("FullWidth", false) => r#"<div class="full-width">"#.to_string(),
            ("FullWidth", true) => "</div>".to_string(),
            ("Img", false) => render_img(&attrs)?.into_string(),
            ("ImgBox", false) => render_img_box(&attrs)?.into_string(),
            // Stray closers of self-closing components render nothing.
            ("Img" | "ImgBox", true) => String::new(),
            (other, _) => return Err(CompileError::UnknownComponent(other.to_string())),
        };
        out.push_str(&rendered);
    }
    out.push_str(&raw[last..]);
    Ok(out)
}

fn parse_attributes(source: &str) -> HashMap<String, String> {
    ATTRIBUTE
        .captures_iter(source)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            (caps[1].to_string(), value.to_string())
        })
        .collect()
}

fn render_img(attrs: &HashMap<String, String>) -> Result<Markup, CompileError> {
    let src = attrs.get("src").ok_or(CompileError::MissingAttribute {
        component: "Img",
        attribute: "src",
    })?;
    let caption = attrs.get("caption");
    let alt = attrs.get("alt").or(caption).map_or("", String::as_str);
    Ok(html! {
        figure.mdx-img {
            img src=(src) alt=(alt) width=[attrs.get("width")] height=[attrs.get("height")] loading="lazy";
            @if let Some(caption) = caption {
                figcaption { (caption) }
            }
        }
    })
}

fn render_img_box(attrs: &HashMap<String, String>) -> Result<Markup, CompileError> {
    let src = attrs.get("src").ok_or(CompileError::MissingAttribute {
        component: "ImgBox",
        attribute: "src",
    })?;
    let caption = attrs.get("caption");
    let alt = attrs.get("alt").or(caption).map_or("", String::as_str);
    let color = attrs.get("color").map_or("black", String::as_str);
    Ok(html! {
        div.img-box style={ "--box-color: " (color) ";" } {
            figure {
                @if let Some(caption) = caption {
                    figcaption { (caption) }
                }
                div.img-box-frame {
                    img src=(src) alt=(alt) loading="lazy";
                }
            }
        }
    })
}

/// Opening tag for a markdown link; every link opens in a new tab. Email
/// autolinks carry the bare address, so they get their `mailto:` back here.
fn open_external_link(link_type: LinkType, dest: &str, title: &str) -> String {
    let href = match link_type {
        LinkType::Email => format!("mailto:{dest}"),
        _ => dest.to_string(),
    };
    let title = if title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, escape(title))
    };
    format!(
        r#"<a href="{}"{title} target="_blank" rel="noopener noreferrer">"#,
        escape(&href)
    )
}

fn escape(text: &str) -> String {
    html! { (text) }.into_string()
}
