//! Page-description renderer: DOCX packages.
//!
//! One paragraph per block and one per list item, each carrying explicit
//! East-Asian font, half-point size, twip indents and exact line spacing.
//! Title and heading paragraphs also reference named styles so the document
//! outline works in word processors.

use super::units::{self, PageGeometry};
use super::{RenderOptions, RenderStats, RenderTarget, RenderedOutput, Renderer};
use crate::error::{Error, Result};
use crate::model::{Block, DocumentModel};
use crate::style::{Alignment, StyleKey, StyleRule, StyleTable};
use docx_rs::{
    AlignmentType, Docx, LineSpacing, LineSpacingType, PageMargin, Paragraph, Run, RunFonts,
    SpecialIndentType, Style, StyleType,
};
use std::io::Cursor;

/// DOCX renderer.
#[derive(Debug, Clone, Default)]
pub struct DocxRenderer {
    options: RenderOptions,
}

impl DocxRenderer {
    /// Create a DOCX renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    fn build(&self, doc: &DocumentModel, styles: &StyleTable) -> (Docx, RenderStats) {
        let genre = doc.genre;
        let page = PageGeometry::official();
        let mut stats = RenderStats {
            block_count: doc.block_count() as u32,
            page_count: 0,
            ..Default::default()
        };

        let mut docx = Docx::new()
            .page_size(
                units::mm_to_twips(page.width_mm) as u32,
                units::mm_to_twips(page.height_mm) as u32,
            )
            .page_margin(
                PageMargin::new()
                    .top(units::mm_to_twips(page.top_mm))
                    .bottom(units::mm_to_twips(page.bottom_mm))
                    .left(units::mm_to_twips(page.left_mm))
                    .right(units::mm_to_twips(page.right_mm)),
            );

        for key in [
            StyleKey::Title,
            StyleKey::Heading1,
            StyleKey::Heading2,
            StyleKey::Heading3,
        ] {
            docx = docx.add_style(named_style(key, styles.resolve(genre, key)));
        }

        if let Some(title) = doc.title_unit(self.options.dedupe_title) {
            stats.title_unit = true;
            stats.add_unit(title, true);
            docx = docx.add_paragraph(styled_paragraph(
                title,
                styles.resolve(genre, StyleKey::Title),
                style_id(StyleKey::Title),
            ));
        }

        for block in &doc.blocks {
            if block.is_annotation() {
                continue;
            }
            let key = StyleKey::for_block(block);
            let rule = styles.resolve(genre, key);
            match block {
                Block::List { items } => {
                    for item in items {
                        stats.add_list_item(item);
                        let text = self.options.list_item_text(item);
                        docx = docx.add_paragraph(styled_paragraph(&text, rule, None));
                    }
                }
                _ => {
                    stats.add_unit(block.text(), key.is_heading());
                    docx = docx.add_paragraph(styled_paragraph(block.text(), rule, style_id(key)));
                }
            }
        }

        (docx, stats)
    }
}

impl Renderer for DocxRenderer {
    fn render(&self, doc: &DocumentModel, styles: &StyleTable) -> Result<RenderedOutput> {
        let (docx, stats) = self.build(doc, styles);

        let mut cursor = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut cursor)
            .map_err(|e| Error::Render(format!("DOCX packaging failed: {}", e)))?;

        let bytes = cursor.into_inner();
        log::debug!("DOCX rendered: {} units, {} bytes", stats.unit_count, bytes.len());
        Ok(RenderedOutput::new(RenderTarget::PageDescription, bytes, stats))
    }
}

/// Named paragraph style for title and markup headings.
fn style_id(key: StyleKey) -> Option<&'static str> {
    match key {
        StyleKey::Title => Some("Title"),
        StyleKey::Heading1 => Some("Heading1"),
        StyleKey::Heading2 => Some("Heading2"),
        StyleKey::Heading3 => Some("Heading3"),
        _ => None,
    }
}

fn named_style(key: StyleKey, rule: &StyleRule) -> Style {
    let (id, name) = match key {
        StyleKey::Title => ("Title", "Title"),
        StyleKey::Heading1 => ("Heading1", "heading 1"),
        StyleKey::Heading2 => ("Heading2", "heading 2"),
        _ => ("Heading3", "heading 3"),
    };
    let style = Style::new(id, StyleType::Paragraph)
        .name(name)
        .size(units::half_points(rule.size_pt()));
    if rule.bold {
        style.bold()
    } else {
        style
    }
}

fn styled_paragraph(text: &str, rule: &StyleRule, style: Option<&str>) -> Paragraph {
    let font_pt = rule.size_pt();
    let font = rule.font.primary.as_str();

    let mut run = Run::new()
        .add_text(text)
        .size(units::half_points(font_pt))
        .fonts(RunFonts::new().east_asia(font).ascii(font).hi_ansi(font));
    if rule.bold {
        run = run.bold();
    }
    if let Some(color) = rule.color.as_deref() {
        run = run.color(color);
    }

    let first_line = units::chars_to_twips(rule.first_line_indent_chars, font_pt);
    let left = units::chars_to_twips(rule.left_indent_chars, font_pt);

    let spacing = LineSpacing::new()
        .line_rule(LineSpacingType::Exact)
        .line(units::pt_to_twips(rule.line_spacing_pt) as _)
        .before(units::pt_to_twips(rule.space_before_pt) as _)
        .after(units::pt_to_twips(rule.space_after_pt) as _);

    let mut paragraph = Paragraph::new()
        .add_run(run)
        .align(alignment_type(rule.alignment))
        .line_spacing(spacing);

    if first_line > 0 || left > 0 {
        let special = (first_line > 0).then_some(SpecialIndentType::FirstLine(first_line));
        paragraph = paragraph.indent(Some(left), special, None, None);
    }
    if let Some(id) = style {
        paragraph = paragraph.style(id);
    }
    paragraph
}

fn alignment_type(alignment: Alignment) -> AlignmentType {
    match alignment {
        Alignment::Start => AlignmentType::Left,
        Alignment::Center => AlignmentType::Center,
        Alignment::Justify => AlignmentType::Both,
        Alignment::End => AlignmentType::Right,
    }
}
