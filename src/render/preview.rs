//! Preview renderer: sanitized HTML keyed by structural class names.
//!
//! Markup carries no inline style values. The matching stylesheet is
//! produced separately by [`stylesheet`] from the same class names.

use super::sanitize::{escape_text, sanitize};
use super::units::{css_em, css_pt};
use super::{RenderOptions, RenderStats, RenderTarget, RenderedOutput, Renderer};
use crate::error::Result;
use crate::model::{Block, DocumentModel, Genre};
use crate::style::{Alignment, StyleKey, StyleRule, StyleTable};
use std::fmt::Write;

/// Class of the red band drawn above red-header documents.
const RED_BAND_CLASS: &str = "red-header-element";

/// HTML preview renderer.
#[derive(Debug, Clone, Default)]
pub struct PreviewRenderer {
    options: RenderOptions,
}

impl PreviewRenderer {
    /// Create a preview renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    fn markup(&self, doc: &DocumentModel) -> (String, RenderStats) {
        let mut stats = RenderStats {
            block_count: doc.block_count() as u32,
            ..Default::default()
        };
        let mut html = format!("<div class=\"{}\">", container_class(doc.genre));

        if doc.genre == Genre::RedHeader && self.options.red_header_band {
            let _ = write!(html, "<div class=\"{}\"></div>", RED_BAND_CLASS);
        }

        if let Some(title) = doc.title_unit(self.options.dedupe_title) {
            stats.title_unit = true;
            stats.add_unit(title, true);
            let _ = write!(
                html,
                "\n<h1 class=\"{}\">{}</h1>",
                StyleKey::Title.css_class(),
                escape_text(title)
            );
        }

        for block in &doc.blocks {
            html.push('\n');
            if let Some(body) = block.annotation_body() {
                // Preserved structural comments stay invisible
                let _ = write!(html, "<!--{}-->", comment_text(body));
                continue;
            }

            let key = StyleKey::for_block(block);
            let class = key.css_class();
            match block {
                Block::List { items } => {
                    let _ = write!(html, "<ul class=\"{}\">", class);
                    for item in items {
                        stats.add_list_item(item);
                        let _ = write!(html, "<li>{}</li>", escape_text(item));
                    }
                    html.push_str("</ul>");
                }
                _ => {
                    let tag = element_for(key);
                    stats.add_unit(block.text(), key.is_heading());
                    let _ = write!(
                        html,
                        "<{tag} class=\"{class}\">{}</{tag}>",
                        escape_text(block.text())
                    );
                }
            }
        }

        html.push_str("\n</div>");
        (html, stats)
    }
}

impl Renderer for PreviewRenderer {
    fn render(&self, doc: &DocumentModel, _styles: &StyleTable) -> Result<RenderedOutput> {
        let (html, stats) = self.markup(doc);
        let html = sanitize(&html);
        log::debug!("Preview rendered: {} units, {} bytes", stats.unit_count, html.len());
        Ok(RenderedOutput::new(
            RenderTarget::PreviewHtml,
            html.into_bytes(),
            stats,
        ))
    }
}

/// Comment body that cannot close the comment or open a tag.
fn comment_text(body: &str) -> String {
    let mut text = escape_text(body);
    while text.contains("--") {
        text = text.replace("--", "- -");
    }
    if text.ends_with('-') {
        text.push(' ');
    }
    text
}

fn container_class(genre: Genre) -> String {
    format!("{}-document-container", genre.slug())
}

fn element_for(key: StyleKey) -> &'static str {
    match key {
        StyleKey::Title | StyleKey::Heading1 => "h1",
        StyleKey::Heading2 | StyleKey::SectionHeading => "h2",
        StyleKey::Heading3 | StyleKey::SubHeading => "h3",
        StyleKey::RecipientLine | StyleKey::SenderLine | StyleKey::DateLine => "div",
        StyleKey::Body => "p",
        StyleKey::ListItem => "ul",
    }
}

/// CSS for a genre's preview, keyed by the preview class names.
pub fn stylesheet(styles: &StyleTable, genre: Genre) -> String {
    let scope = format!(".{}", container_class(genre));
    let body = styles.resolve(genre, StyleKey::Body);

    let mut css = String::new();
    let _ = writeln!(
        css,
        "{} {{\n  font-family: {};\n  font-size: {};\n  line-height: {};\n  color: #000000;\n}}",
        scope,
        font_stack(body),
        css_pt(body.size_pt()),
        css_pt(body.line_spacing_pt)
    );

    let mut seen = Vec::new();
    for key in StyleKey::ALL {
        let class = key.css_class();
        if seen.contains(&class) {
            continue;
        }
        seen.push(class);

        let rule = styles.resolve(genre, key);
        let selector = if key == StyleKey::ListItem {
            format!("{} .{} li", scope, class)
        } else {
            format!("{} .{}", scope, class)
        };
        let _ = writeln!(css, "{} {{\n{}}}", selector, declarations(rule));
    }

    if genre == Genre::RedHeader {
        let title = styles.resolve(genre, StyleKey::Title);
        let color = title.color.as_deref().unwrap_or("C00000");
        let _ = writeln!(
            css,
            "{} .{} {{\n  height: 2pt;\n  background-color: #{};\n  margin: 0 0 20pt 0;\n}}",
            scope, RED_BAND_CLASS, color
        );
    }

    css
}

fn declarations(rule: &StyleRule) -> String {
    let font_size = rule.size_pt();
    let mut out = String::new();
    let _ = writeln!(out, "  font-family: {};", font_stack(rule));
    let _ = writeln!(out, "  font-size: {};", css_pt(font_size));
    let _ = writeln!(
        out,
        "  font-weight: {};",
        if rule.bold { "bold" } else { "normal" }
    );
    let _ = writeln!(out, "  color: #{};", rule.color.as_deref().unwrap_or("000000"));
    let _ = writeln!(out, "  text-indent: {};", css_em(rule.first_line_indent_chars));
    let _ = writeln!(
        out,
        "  margin: {} 0 {} {};",
        css_pt(rule.space_before_pt),
        css_pt(rule.space_after_pt),
        css_em(rule.left_indent_chars)
    );
    let _ = writeln!(out, "  line-height: {};", css_pt(rule.line_spacing_pt));
    let _ = writeln!(out, "  text-align: {};", css_alignment(rule.alignment));
    out
}

fn font_stack(rule: &StyleRule) -> String {
    let generic = if rule.font.face() == crate::style::FontFace::Hei {
        "sans-serif"
    } else {
        "serif"
    };
    rule.font
        .families()
        .map(|f| format!("\"{}\"", f.replace('"', "")))
        .chain(std::iter::once(generic.to_string()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn css_alignment(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Start => "left",
        Alignment::Center => "center",
        Alignment::Justify => "justify",
        Alignment::End => "right",
    }
}

/// Wrap a sanitized fragment and its stylesheet into a complete page.
pub fn standalone_html(fragment: &str, css: &str, title: Option<&str>) -> String {
    let title = escape_text(title.unwrap_or("公文预览"));
    format!(
        "<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        title, css, fragment
    )
}
