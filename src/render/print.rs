//! Print document definition.
//!
//! A flowed description of the print output: page metadata, a page-wide
//! default style, a fixed catalog of named styles and one content unit per
//! block or list item. The PDF writer lays this out; it is also available as
//! JSON for external print pipelines.

use super::units::{self, PageGeometry};
use super::{JsonFormat, RenderOptions};
use crate::error::Result;
use crate::model::{Block, DocumentModel, Genre};
use crate::style::{Alignment, FontSpec, StyleKey, StyleRule, StyleTable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named style in the fixed print catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogStyle {
    Header,
    Heading1,
    Heading2,
    Heading3,
    Paragraph,
    List,
}

impl CatalogStyle {
    /// All catalog entries.
    pub const ALL: [CatalogStyle; 6] = [
        CatalogStyle::Header,
        CatalogStyle::Heading1,
        CatalogStyle::Heading2,
        CatalogStyle::Heading3,
        CatalogStyle::Paragraph,
        CatalogStyle::List,
    ];

    /// Catalog entry used for a style key.
    pub fn for_key(key: StyleKey) -> CatalogStyle {
        match key {
            StyleKey::Title => CatalogStyle::Header,
            StyleKey::Heading1 => CatalogStyle::Heading1,
            StyleKey::Heading2 | StyleKey::SectionHeading => CatalogStyle::Heading2,
            StyleKey::Heading3 | StyleKey::SubHeading => CatalogStyle::Heading3,
            StyleKey::Body
            | StyleKey::RecipientLine
            | StyleKey::SenderLine
            | StyleKey::DateLine => CatalogStyle::Paragraph,
            StyleKey::ListItem => CatalogStyle::List,
        }
    }

    /// Style key the catalog entry is built from.
    fn source_key(self) -> StyleKey {
        match self {
            CatalogStyle::Header => StyleKey::Title,
            CatalogStyle::Heading1 => StyleKey::Heading1,
            CatalogStyle::Heading2 => StyleKey::Heading2,
            CatalogStyle::Heading3 => StyleKey::Heading3,
            CatalogStyle::Paragraph => StyleKey::Body,
            CatalogStyle::List => StyleKey::ListItem,
        }
    }
}

/// Resolved print style, all lengths in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintStyle {
    pub font: FontSpec,
    pub font_size: f32,
    pub bold: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub alignment: Alignment,
    pub line_height: f32,
    pub first_line_indent: f32,
    /// Left, top, right, bottom
    pub margin: [f32; 4],
}

impl PrintStyle {
    /// Convert a style rule to print units.
    pub fn from_rule(rule: &StyleRule) -> Self {
        let size = rule.size_pt();
        Self {
            font: rule.font.clone(),
            font_size: size,
            bold: rule.bold,
            color: rule.color.clone(),
            alignment: rule.alignment,
            line_height: rule.line_spacing_pt.max(size),
            first_line_indent: units::chars_to_pt(rule.first_line_indent_chars, size),
            margin: [
                units::chars_to_pt(rule.left_indent_chars, size),
                rule.space_before_pt,
                0.0,
                rule.space_after_pt,
            ],
        }
    }

    /// Left indent in points.
    pub fn left_indent(&self) -> f32 {
        self.margin[0]
    }

    /// Space above in points.
    pub fn space_before(&self) -> f32 {
        self.margin[1]
    }

    /// Space below in points.
    pub fn space_after(&self) -> f32 {
        self.margin[3]
    }
}

/// Document information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrintInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    /// Genre label
    pub subject: String,
    /// Issue date from the date line
    pub creation_date: Option<NaiveDate>,
}

/// One flowed unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintContent {
    pub text: String,
    pub style: CatalogStyle,
    /// Full style when the unit's role differs from its catalog entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<PrintStyle>,
}

/// Complete print document definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintDefinition {
    pub info: PrintInfo,
    /// Width and height in points
    pub page_size: [f32; 2],
    /// Left, top, right, bottom in points
    pub page_margins: [f32; 4],
    pub default_style: PrintStyle,
    pub styles: BTreeMap<CatalogStyle, PrintStyle>,
    pub content: Vec<PrintContent>,
    /// Centred page numbers in the footer
    pub page_numbers: bool,
}

impl PrintDefinition {
    /// Build the definition for a document.
    pub fn build(doc: &DocumentModel, styles: &StyleTable, options: &RenderOptions) -> Self {
        let genre = doc.genre;
        let page = PageGeometry::official();

        let catalog: BTreeMap<CatalogStyle, PrintStyle> = CatalogStyle::ALL
            .into_iter()
            .map(|entry| {
                let rule = styles.resolve(genre, entry.source_key());
                (entry, PrintStyle::from_rule(rule))
            })
            .collect();

        let mut content = Vec::new();
        if let Some(title) = doc.title_unit(options.dedupe_title) {
            content.push(unit(title, StyleKey::Title, genre, styles, &catalog));
        }
        for block in &doc.blocks {
            if block.is_annotation() {
                continue;
            }
            let key = StyleKey::for_block(block);
            match block {
                Block::List { items } => content.extend(
                    items
                        .iter()
                        .map(|item| unit(&options.list_item_text(item), key, genre, styles, &catalog)),
                ),
                _ => content.push(unit(block.text(), key, genre, styles, &catalog)),
            }
        }

        let info = PrintInfo {
            title: doc.title.as_deref().map(str::trim).filter(|t| !t.is_empty()).map(String::from),
            author: doc
                .sender()
                .map(String::from)
                .or_else(|| options.author.clone()),
            subject: genre.label().to_string(),
            creation_date: doc.issue_date(),
        };

        Self {
            info,
            page_size: [units::mm_to_pt(page.width_mm), units::mm_to_pt(page.height_mm)],
            page_margins: [
                units::mm_to_pt(page.left_mm),
                units::mm_to_pt(page.top_mm),
                units::mm_to_pt(page.right_mm),
                units::mm_to_pt(page.bottom_mm),
            ],
            default_style: PrintStyle::from_rule(styles.resolve(genre, StyleKey::Body)),
            styles: catalog,
            content,
            page_numbers: options.page_numbers,
        }
    }

    /// Effective style of a content unit.
    pub fn style_of<'a>(&'a self, unit: &'a PrintContent) -> &'a PrintStyle {
        unit.overrides
            .as_ref()
            .or_else(|| self.styles.get(&unit.style))
            .unwrap_or(&self.default_style)
    }

    /// Serialize the definition to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        super::json::write_json(self, format)
    }
}

fn unit(
    text: &str,
    key: StyleKey,
    genre: Genre,
    styles: &StyleTable,
    catalog: &BTreeMap<CatalogStyle, PrintStyle>,
) -> PrintContent {
    let style = CatalogStyle::for_key(key);
    let resolved = PrintStyle::from_rule(styles.resolve(genre, key));
    let overrides = (catalog.get(&style) != Some(&resolved)).then_some(resolved);
    PrintContent {
        text: text.to_string(),
        style,
        overrides,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    fn sample() -> DocumentModel {
        DocumentModel::new(
            Some("关于防汛工作的情况报告".into()),
            Genre::SituationalReport,
            vec![
                Block::paragraph("市政府：").with_role(Role::RecipientLine),
                Block::paragraph("一、基本情况").with_role(Role::SectionHeading),
                Block::paragraph("正文内容。"),
                Block::list(vec!["甲".into(), "乙".into()]),
                Block::paragraph("深圳市水务局").with_role(Role::SenderLine),
                Block::paragraph("2024年3月15日").with_role(Role::DateLine),
            ],
        )
    }

    #[test]
    fn test_catalog_and_units() {
        let def = PrintDefinition::build(&sample(), StyleTable::global(), &RenderOptions::default());

        assert_eq!(def.styles.len(), 6);
        assert_eq!(def.content.len(), 8);
        assert_eq!(def.content[0].style, CatalogStyle::Header);
        assert_eq!(def.content[2].style, CatalogStyle::Heading2);
        assert!(def.content[2].overrides.is_none());
        assert_eq!(def.content[3].style, CatalogStyle::Paragraph);
        assert!(def.content[3].overrides.is_none());
        assert_eq!(def.content[4].text, "• 甲");
        assert_eq!(def.content[4].style, CatalogStyle::List);

        // Recipient, sender and date carry their own alignment and spacing
        assert!(def.content[1].overrides.is_some());
        let date = &def.content[7];
        assert_eq!(def.style_of(date).alignment, Alignment::End);
        assert_eq!(def.style_of(date).first_line_indent, 0.0);
    }

    #[test]
    fn test_info() {
        let def = PrintDefinition::build(&sample(), StyleTable::global(), &RenderOptions::default());
        assert_eq!(def.info.title.as_deref(), Some("关于防汛工作的情况报告"));
        assert_eq!(def.info.author.as_deref(), Some("深圳市水务局"));
        assert_eq!(def.info.subject, "情况报告");
        assert_eq!(def.info.creation_date, NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn test_page_metadata() {
        let def = PrintDefinition::build(
            &DocumentModel::default(),
            StyleTable::global(),
            &RenderOptions::new().with_author("办公厅"),
        );
        assert!(def.content.is_empty());
        assert_eq!(def.info.author.as_deref(), Some("办公厅"));
        assert!((def.page_size[0] - 595.28).abs() < 0.01);
        assert!((def.page_size[1] - 841.89).abs() < 0.01);
        assert_eq!(def.default_style.font_size, 16.0);
        assert_eq!(def.default_style.first_line_indent, 32.0);
    }

    #[test]
    fn test_json() {
        let def = PrintDefinition::build(&sample(), StyleTable::global(), &RenderOptions::default());
        let json = def.to_json(JsonFormat::Compact).unwrap();
        assert!(json.contains("\"style\":\"heading2\""));
        assert!(json.contains("\"page_size\""));
        let back: PrintDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back.content.len(), def.content.len());
    }
}
