//! Print renderer: PDF output.
//!
//! Lays out a [`PrintDefinition`] on A4 pages and serializes it with
//! `lopdf`. Text uses the non-embedded Adobe-GB1 CID fonts every PDF viewer
//! ships for Simplified Chinese, so no font files are needed. Line breaking
//! is greedy per character (ASCII words stay whole) with closing punctuation
//! kept off line starts and opening brackets kept off line ends.

use super::print::{CatalogStyle, PrintDefinition, PrintStyle};
use super::units;
use super::{RenderOptions, RenderStats, RenderTarget, RenderedOutput, Renderer};
use crate::error::Result;
use crate::model::DocumentModel;
use crate::style::{hex_rgb, Alignment, FontFace, StyleTable};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// Ascent of the CJK fonts as a fraction of the em.
const ASCENT: f32 = 0.88;

/// Page number size (四号).
const PAGE_NUMBER_SIZE: f32 = 14.0;

/// Gap between the text block and the page number.
const PAGE_NUMBER_GAP_MM: f32 = 7.0;

/// Characters that must not start a line.
const NO_LINE_START: &str = "，。、；：！？）》」』”’〕】…,.;:!?)]%";

/// Characters that must not end a line.
const NO_LINE_END: &str = "（《「『“‘〔【([";

const PRODUCER: &str = concat!("gongwen ", env!("CARGO_PKG_VERSION"));

/// PDF renderer.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    options: RenderOptions,
}

impl PdfRenderer {
    /// Create a PDF renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Build the print definition without laying it out.
    pub fn definition(&self, doc: &DocumentModel, styles: &StyleTable) -> PrintDefinition {
        PrintDefinition::build(doc, styles, &self.options)
    }
}

impl Renderer for PdfRenderer {
    fn render(&self, doc: &DocumentModel, styles: &StyleTable) -> Result<RenderedOutput> {
        let definition = self.definition(doc, styles);

        let mut stats = RenderStats {
            block_count: doc.block_count() as u32,
            title_unit: doc.title_unit(self.options.dedupe_title).is_some(),
            ..Default::default()
        };
        for unit in &definition.content {
            match unit.style {
                CatalogStyle::List => stats.add_list_item(&unit.text),
                CatalogStyle::Paragraph => stats.add_unit(&unit.text, false),
                _ => stats.add_unit(&unit.text, true),
            }
        }

        let pages = layout(&definition);
        stats.page_count = pages.len() as u32;

        let bytes = write_pdf(&definition, pages, self.options.compress)?;
        log::debug!(
            "PDF rendered: {} units on {} pages, {} bytes",
            stats.unit_count,
            stats.page_count,
            bytes.len()
        );
        Ok(RenderedOutput::new(RenderTarget::PrintDocument, bytes, stats))
    }
}

/// Resource name and base font for a typeface.
fn font_resource(face: FontFace) -> (&'static str, &'static str) {
    match face {
        FontFace::Song => ("F1", "STSong-Light"),
        FontFace::Hei => ("F2", "AdobeHeitiStd-Regular"),
        FontFace::Kai => ("F3", "AdobeKaitiStd-Regular"),
        FontFace::FangSong => ("F4", "AdobeFangsongStd-Regular"),
    }
}

const FACES: [FontFace; 4] = [FontFace::Song, FontFace::Hei, FontFace::Kai, FontFace::FangSong];

/// Horizontal advance of a character.
fn advance(c: char, size: f32) -> f32 {
    if c.is_ascii() {
        size * 0.5
    } else {
        size
    }
}

fn measure(text: &str, size: f32) -> f32 {
    text.chars().map(|c| advance(c, size)).sum()
}

/// One laid-out line.
#[derive(Debug, Clone, PartialEq)]
struct Line {
    text: String,
    width: f32,
    /// Last line of its paragraph
    last: bool,
}

/// Break units: ASCII alphanumeric runs, or single characters.
fn tokens(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut out = Vec::new();
    let mut word = String::new();

    let flush = |word: &mut String, out: &mut Vec<String>| {
        if word.is_empty() {
            return;
        }
        if measure(word, size) > max_width {
            out.extend(word.chars().map(String::from));
            word.clear();
        } else {
            out.push(std::mem::take(word));
        }
    };

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            word.push(c);
            continue;
        }
        flush(&mut word, &mut out);
        out.push(c.to_string());
    }
    flush(&mut word, &mut out);
    out
}

fn is_no_line_start(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if NO_LINE_START.contains(c))
}

/// Greedy line breaking.
fn break_lines(text: &str, size: f32, first_width: f32, width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;
    let mut avail = first_width;

    for token in tokens(text.trim(), size, width) {
        let w = measure(&token, size);

        if current.is_empty() && !lines.is_empty() && token.trim().is_empty() {
            continue;
        }
        if current.is_empty() || current_width + w <= avail + 0.01 || is_no_line_start(&token) {
            current.push_str(&token);
            current_width += w;
            continue;
        }

        let mut carry = String::new();
        if current.chars().count() > 1 {
            if let Some(last) = current.chars().last().filter(|c| NO_LINE_END.contains(*c)) {
                current.pop();
                carry.push(last);
            }
        }

        let text = current.trim_end().to_string();
        lines.push(Line {
            width: measure(&text, size),
            text,
            last: false,
        });

        avail = width;
        current = carry;
        if !(current.is_empty() && token.trim().is_empty()) {
            current.push_str(&token);
        }
        current_width = measure(&current, size);
    }

    if !current.trim().is_empty() {
        let text = current.trim_end().to_string();
        lines.push(Line {
            width: measure(&text, size),
            text,
            last: true,
        });
    } else if let Some(line) = lines.last_mut() {
        line.last = true;
    }

    lines
}

/// Page layout state.
struct Layout<'a> {
    def: &'a PrintDefinition,
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
    at_top: bool,
}

impl<'a> Layout<'a> {
    fn new(def: &'a PrintDefinition) -> Self {
        Self {
            def,
            pages: Vec::new(),
            ops: Vec::new(),
            y: def.page_size[1] - def.page_margins[1],
            at_top: true,
        }
    }

    fn text_left(&self) -> f32 {
        self.def.page_margins[0]
    }

    fn text_width(&self) -> f32 {
        self.def.page_size[0] - self.def.page_margins[0] - self.def.page_margins[2]
    }

    fn bottom(&self) -> f32 {
        self.def.page_margins[3]
    }

    fn new_page(&mut self) {
        let ops = std::mem::take(&mut self.ops);
        self.pages.push(ops);
        self.y = self.def.page_size[1] - self.def.page_margins[1];
        self.at_top = true;
    }

    fn place_unit(&mut self, text: &str, style: &PrintStyle) {
        if !self.at_top {
            self.y -= style.space_before();
        }

        let size = style.font_size;
        let left = self.text_left() + style.left_indent();
        let width = (self.text_width() - style.left_indent()).max(size);
        let first_width = (width - style.first_line_indent).max(size);
        let lines = break_lines(text, size, first_width, width);

        for (i, line) in lines.iter().enumerate() {
            if self.y - style.line_height < self.bottom() && !self.at_top {
                self.new_page();
            }
            let (x, avail) = if i == 0 {
                (left + style.first_line_indent, first_width)
            } else {
                (left, width)
            };
            let baseline = self.y - (style.line_height - size) / 2.0 - size * ASCENT;
            self.place_line(line, style, x, avail, baseline);
            self.y -= style.line_height;
            self.at_top = false;
        }

        self.y -= style.space_after();
    }

    fn place_line(&mut self, line: &Line, style: &PrintStyle, x: f32, avail: f32, baseline: f32) {
        let glyphs = line.text.chars().count();
        let slack = avail - line.width;
        let (x, spacing) = match style.alignment {
            Alignment::Start => (x, 0.0),
            Alignment::Center => (x + (slack / 2.0).max(0.0), 0.0),
            Alignment::End => (x + slack.max(0.0), 0.0),
            Alignment::Justify if !line.last && glyphs > 1 => (x, slack / (glyphs - 1) as f32),
            Alignment::Justify => (x, 0.0),
        };

        let (font, _) = font_resource(style.font.face());
        let (r, g, b) = style
            .color
            .as_deref()
            .and_then(hex_rgb)
            .unwrap_or((0.0, 0.0, 0.0));

        self.ops.push(Operation::new("BT", vec![]));
        self.ops
            .push(Operation::new("Tf", vec![font.into(), real(style.font_size)]));
        self.ops
            .push(Operation::new("rg", vec![real(r), real(g), real(b)]));
        if style.bold {
            // Pseudo-bold: fill and stroke the outlines
            self.ops
                .push(Operation::new("RG", vec![real(r), real(g), real(b)]));
            self.ops
                .push(Operation::new("w", vec![real(style.font_size * 0.03)]));
            self.ops.push(Operation::new("Tr", vec![2.into()]));
        } else {
            self.ops.push(Operation::new("Tr", vec![0.into()]));
        }
        self.ops.push(Operation::new("Tc", vec![real(spacing)]));
        self.ops
            .push(Operation::new("Td", vec![real(x), real(baseline)]));
        self.ops
            .push(Operation::new("Tj", vec![encode_text(&line.text)]));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.new_page();
        }
        self.pages
    }
}

/// Lay out every content unit, returning one operation list per page.
fn layout(def: &PrintDefinition) -> Vec<Vec<Operation>> {
    let mut layout = Layout::new(def);
    for unit in &def.content {
        let style = def.style_of(unit);
        layout.place_unit(&unit.text, style);
    }

    let mut pages = layout.finish();
    if def.page_numbers {
        for (i, ops) in pages.iter_mut().enumerate() {
            ops.extend(page_number(def, i + 1));
        }
    }
    pages
}

fn page_number(def: &PrintDefinition, number: usize) -> Vec<Operation> {
    let text = format!("— {} —", number);
    let width = measure(&text, PAGE_NUMBER_SIZE);
    let x = (def.page_size[0] - width) / 2.0;
    let y = def.page_margins[3]
        - units::mm_to_pt(PAGE_NUMBER_GAP_MM)
        - PAGE_NUMBER_SIZE * ASCENT;
    let (font, _) = font_resource(FontFace::Song);

    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), real(PAGE_NUMBER_SIZE)]),
        Operation::new("rg", vec![real(0.0), real(0.0), real(0.0)]),
        Operation::new("Tr", vec![0.into()]),
        Operation::new("Tc", vec![real(0.0)]),
        Operation::new("Td", vec![real(x), real(y.max(0.0))]),
        Operation::new("Tj", vec![encode_text(&text)]),
        Operation::new("ET", vec![]),
    ]
}

fn real(v: f32) -> Object {
    Object::Real((v * 100.0).round() / 100.0)
}

/// Text string for `UniGB-UTF16-H`: UTF-16BE code units.
fn encode_text(text: &str) -> Object {
    let bytes: Vec<u8> = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Info dictionary text string: UTF-16BE with a byte-order mark.
fn info_text(text: &str) -> Object {
    let mut bytes = vec![0xFE, 0xFF];
    bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn add_font(doc: &mut Document, base_font: &str) -> ObjectId {
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_font,
        "Flags" => 6,
        "FontBBox" => vec![(-25).into(), (-254).into(), 1000.into(), 880.into()],
        "ItalicAngle" => 0,
        "Ascent" => 880,
        "Descent" => -120,
        "CapHeight" => 880,
        "StemV" => 93,
    });

    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType0",
        "BaseFont" => base_font,
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("GB1"),
            "Supplement" => 4,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => 1000,
        // Half-width ASCII (CIDs 1-95)
        "W" => vec![1.into(), 95.into(), 500.into()],
    });

    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => Object::Name(format!("{}-UniGB-UTF16-H", base_font).into_bytes()),
        "Encoding" => "UniGB-UTF16-H",
        "DescendantFonts" => vec![cid_font_id.into()],
    })
}

fn info_dictionary(def: &PrintDefinition) -> Dictionary {
    let mut info = Dictionary::new();
    if let Some(title) = &def.info.title {
        info.set("Title", info_text(title));
    }
    if let Some(author) = &def.info.author {
        info.set("Author", info_text(author));
    }
    info.set("Subject", info_text(&def.info.subject));
    info.set("Producer", Object::string_literal(PRODUCER));
    if let Some(date) = def.info.creation_date {
        // Taken from the date line, never the clock, so output is reproducible
        let stamp = format!("D:{}000000", date.format("%Y%m%d"));
        info.set("CreationDate", Object::string_literal(stamp));
    }
    info
}

fn write_pdf(def: &PrintDefinition, pages: Vec<Vec<Operation>>, compress: bool) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for face in FACES {
        let (name, base_font) = font_resource(face);
        let font_id = add_font(&mut doc, base_font);
        fonts.set(name, font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let page_count = pages.len();
    let mut kids: Vec<Object> = Vec::with_capacity(page_count);
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), real(def.page_size[0]), real(def.page_size[1])],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(info_dictionary(def));
    doc.trailer.set("Info", info_id);

    if compress {
        doc.compress();
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Genre, Role};

    fn render(doc: &DocumentModel, options: RenderOptions) -> RenderedOutput {
        PdfRenderer::new(options)
            .render(doc, StyleTable::global())
            .unwrap()
    }

    #[test]
    fn test_empty_document() {
        let output = render(&DocumentModel::default(), RenderOptions::default());
        assert!(output.bytes.starts_with(b"%PDF-1.5"));
        assert_eq!(output.stats.page_count, 1);
        assert_eq!(output.stats.unit_count, 0);
        assert!(!output.stats.title_unit);
    }

    #[test]
    fn test_pagination() {
        let blocks = (0..120)
            .map(|i| Block::paragraph(format!("第{}段正文内容。", i)))
            .collect();
        let doc = DocumentModel::new(Some("标题".into()), Genre::Standard, blocks);
        let output = render(&doc, RenderOptions::default());
        assert!(output.stats.page_count > 1);
        assert_eq!(output.stats.unit_count, 121);
    }

    #[test]
    fn test_info_dictionary() {
        let doc = DocumentModel::new(
            Some("通知".into()),
            Genre::Notice,
            vec![
                Block::paragraph("正文：内容"),
                Block::paragraph("市政府办公厅").with_role(Role::SenderLine),
                Block::paragraph("2024年3月15日").with_role(Role::DateLine),
            ],
        );
        let output = render(&doc, RenderOptions::new().with_compression(false));
        let bytes = &output.bytes;
        let find = |needle: &[u8]| bytes.windows(needle.len()).any(|w| w == needle);
        assert!(find(b"D:20240315000000"));
        assert!(find(b"UniGB-UTF16-H"));
        assert!(find(b"STSong-Light"));
    }

    #[test]
    fn test_deterministic() {
        let doc = DocumentModel::new(None, Genre::Standard, vec![Block::paragraph("正文")]);
        let a = render(&doc, RenderOptions::default());
        let b = render(&doc, RenderOptions::default());
        assert_eq!(a.bytes, b.bytes);
    }

    #[test]
    fn test_break_lines_width() {
        let text = "一".repeat(30);
        let lines = break_lines(&text, 16.0, 16.0 * 26.0, 16.0 * 28.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text.chars().count(), 26);
        assert_eq!(lines[1].text.chars().count(), 4);
        assert!(!lines[0].last);
        assert!(lines[1].last);
    }

    #[test]
    fn test_break_lines_punctuation() {
        // The full stop would start line two; it hangs on line one instead
        let lines = break_lines("一二三。四", 10.0, 30.0, 30.0);
        assert_eq!(lines[0].text, "一二三。");
        assert_eq!(lines[1].text, "四");

        // An opening bracket moves down with the following text
        let lines = break_lines("一二《三》", 10.0, 30.0, 30.0);
        assert_eq!(lines[0].text, "一二");
        assert_eq!(lines[1].text, "《三》");
    }

    #[test]
    fn test_ascii_words_stay_whole() {
        let lines = break_lines("一二 GB9704", 10.0, 40.0, 40.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text, "GB9704");
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(
            encode_text("中A"),
            Object::String(vec![0x4E, 0x2D, 0x00, 0x41], StringFormat::Hexadecimal)
        );
    }
}
