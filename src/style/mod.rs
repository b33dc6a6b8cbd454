//! Typographic style table.
//!
//! One renderer-agnostic [`StyleRule`] per ([`Genre`], [`StyleKey`]) pair.
//! Sizes, indents and spacing are kept in semantic units (named font sizes,
//! character widths, points); each renderer converts them to its own units.
//!
//! [`Genre`]: crate::model::Genre

mod table;

pub use table::StyleTable;

use crate::model::{Block, Role};
use serde::{Deserialize, Serialize};

/// Style lookup key: a paragraph role or a block kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleKey {
    /// Synthesized title unit
    Title,
    Heading1,
    Heading2,
    Heading3,
    /// Promoted `一、` enumeration
    SectionHeading,
    /// Promoted `（一）` or `1.` enumeration
    SubHeading,
    Body,
    RecipientLine,
    SenderLine,
    DateLine,
    /// One item of a list group
    ListItem,
}

impl StyleKey {
    /// All keys, in declaration order.
    pub const ALL: [StyleKey; 11] = [
        StyleKey::Title,
        StyleKey::Heading1,
        StyleKey::Heading2,
        StyleKey::Heading3,
        StyleKey::SectionHeading,
        StyleKey::SubHeading,
        StyleKey::Body,
        StyleKey::RecipientLine,
        StyleKey::SenderLine,
        StyleKey::DateLine,
        StyleKey::ListItem,
    ];

    /// Key for a tagged block.
    ///
    /// Headings outside levels 1-3 can only come from a hand-edited model;
    /// they are styled as body text.
    pub fn for_block(block: &Block) -> StyleKey {
        match block {
            Block::Heading { level: 1, .. } => StyleKey::Heading1,
            Block::Heading { level: 2, .. } => StyleKey::Heading2,
            Block::Heading { level: 3, .. } => StyleKey::Heading3,
            Block::Heading { level, .. } => {
                log::warn!("Heading level {} is not supported, rendering as body", level);
                StyleKey::Body
            }
            Block::Paragraph { role, .. } => StyleKey::for_role(*role),
            Block::List { .. } => StyleKey::ListItem,
        }
    }

    /// Key for a paragraph role.
    pub fn for_role(role: Role) -> StyleKey {
        match role {
            Role::Body => StyleKey::Body,
            Role::RecipientLine => StyleKey::RecipientLine,
            Role::SenderLine => StyleKey::SenderLine,
            Role::DateLine => StyleKey::DateLine,
            Role::SectionHeading => StyleKey::SectionHeading,
            Role::SubHeading => StyleKey::SubHeading,
        }
    }

    /// Structural class name shared by the preview markup and its stylesheet.
    pub fn css_class(self) -> &'static str {
        match self {
            StyleKey::Title | StyleKey::Heading1 => "document-title",
            StyleKey::Heading2 | StyleKey::SectionHeading => "document-subtitle",
            StyleKey::Heading3 | StyleKey::SubHeading => "document-section-title",
            StyleKey::Body => "document-paragraph",
            StyleKey::RecipientLine => "document-recipient",
            StyleKey::SenderLine => "document-sender",
            StyleKey::DateLine => "document-date",
            StyleKey::ListItem => "document-list",
        }
    }

    /// Check if this key styles a heading-like unit.
    pub fn is_heading(self) -> bool {
        matches!(
            self,
            StyleKey::Title
                | StyleKey::Heading1
                | StyleKey::Heading2
                | StyleKey::Heading3
                | StyleKey::SectionHeading
                | StyleKey::SubHeading
        )
    }
}

/// Font family with its fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSpec {
    /// Preferred family
    pub primary: String,
    /// Substitutes, most preferred first
    #[serde(default)]
    pub fallbacks: Vec<String>,
}

impl FontSpec {
    /// Create a font spec without fallbacks.
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            fallbacks: Vec::new(),
        }
    }

    /// Add fallback families.
    pub fn with_fallbacks(mut self, fallbacks: &[&str]) -> Self {
        self.fallbacks.extend(fallbacks.iter().map(|s| s.to_string()));
        self
    }

    /// Primary family followed by the fallbacks.
    pub fn families(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallbacks.iter().map(String::as_str))
    }

    /// Coarse classification used to pick a built-in print font.
    pub fn face(&self) -> FontFace {
        let names: Vec<String> = self.families().map(|f| f.to_lowercase()).collect();
        let any = |needles: &[&str]| names.iter().any(|n| needles.iter().any(|x| n.contains(x)));
        if any(&["仿宋", "fangsong"]) {
            FontFace::FangSong
        } else if any(&["黑体", "simhei", "heiti"]) {
            FontFace::Hei
        } else if any(&["楷", "kaiti"]) {
            FontFace::Kai
        } else {
            FontFace::Song
        }
    }
}

/// Broad CJK typeface category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    /// 宋体 and 小标宋
    Song,
    /// 黑体
    Hei,
    /// 楷体
    Kai,
    /// 仿宋
    FangSong,
}

/// Named Chinese font size (字号).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSize {
    /// 初号, 42pt
    Chuhao,
    /// 小初, 36pt
    XiaoChu,
    /// 一号, 26pt
    Yihao,
    /// 小一, 24pt
    XiaoYi,
    /// 二号, 22pt
    Erhao,
    /// 小二, 18pt
    XiaoEr,
    /// 三号, 16pt
    Sanhao,
    /// 小三, 15pt
    XiaoSan,
    /// 四号, 14pt
    Sihao,
    /// 小四, 12pt
    XiaoSi,
    /// 五号, 10.5pt
    Wuhao,
    /// Explicit size in points
    Points(f32),
}

impl FontSize {
    /// Size in points.
    pub fn points(self) -> f32 {
        match self {
            FontSize::Chuhao => 42.0,
            FontSize::XiaoChu => 36.0,
            FontSize::Yihao => 26.0,
            FontSize::XiaoYi => 24.0,
            FontSize::Erhao => 22.0,
            FontSize::XiaoEr => 18.0,
            FontSize::Sanhao => 16.0,
            FontSize::XiaoSan => 15.0,
            FontSize::Sihao => 14.0,
            FontSize::XiaoSi => 12.0,
            FontSize::Wuhao => 10.5,
            FontSize::Points(pt) => pt.max(1.0),
        }
    }

    /// Chinese name, or the point value for explicit sizes.
    pub fn label(self) -> String {
        let name = match self {
            FontSize::Chuhao => "初号",
            FontSize::XiaoChu => "小初",
            FontSize::Yihao => "一号",
            FontSize::XiaoYi => "小一",
            FontSize::Erhao => "二号",
            FontSize::XiaoEr => "小二",
            FontSize::Sanhao => "三号",
            FontSize::XiaoSan => "小三",
            FontSize::Sihao => "四号",
            FontSize::XiaoSi => "小四",
            FontSize::Wuhao => "五号",
            FontSize::Points(pt) => return format!("{}pt", pt),
        };
        name.to_string()
    }
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Start,
    Center,
    Justify,
    End,
}

/// Typographic parameters for one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRule {
    /// Font family and fallbacks
    pub font: FontSpec,
    /// Font size
    pub size: FontSize,
    /// Bold weight
    #[serde(default)]
    pub bold: bool,
    /// Text colour as `RRGGBB`, black when absent
    #[serde(default)]
    pub color: Option<String>,
    /// First-line indent in character widths
    #[serde(default)]
    pub first_line_indent_chars: f32,
    /// Left indent of every line in character widths
    #[serde(default)]
    pub left_indent_chars: f32,
    /// Exact line spacing in points
    pub line_spacing_pt: f32,
    /// Space above in points
    #[serde(default)]
    pub space_before_pt: f32,
    /// Space below in points
    #[serde(default)]
    pub space_after_pt: f32,
    /// Horizontal alignment
    #[serde(default)]
    pub alignment: Alignment,
}

impl StyleRule {
    /// Font size in points.
    pub fn size_pt(&self) -> f32 {
        self.size.points()
    }

    /// Colour as `(r, g, b)` in 0..=1, if one is set and valid.
    pub fn rgb(&self) -> Option<(f32, f32, f32)> {
        hex_rgb(self.color.as_deref()?)
    }
}

/// Parse `RRGGBB` (optionally `#`-prefixed) into `(r, g, b)` in 0..=1.
pub fn hex_rgb(color: &str) -> Option<(f32, f32, f32)> {
    let hex = color.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let (r, g, b) = (channel(0)?, channel(2)?, channel(4)?);
    Some((r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_for_block() {
        assert_eq!(StyleKey::for_block(&Block::heading(2, "x")), StyleKey::Heading2);
        assert_eq!(
            StyleKey::for_block(&Block::paragraph("x").with_role(Role::DateLine)),
            StyleKey::DateLine
        );
        assert_eq!(
            StyleKey::for_block(&Block::list(vec!["a".into()])),
            StyleKey::ListItem
        );

        let odd = Block::Heading {
            level: 5,
            text: "x".into(),
        };
        assert_eq!(StyleKey::for_block(&odd), StyleKey::Body);
    }

    #[test]
    fn test_font_sizes() {
        assert_eq!(FontSize::Erhao.points(), 22.0);
        assert_eq!(FontSize::Sanhao.points(), 16.0);
        assert_eq!(FontSize::Wuhao.points(), 10.5);
        assert_eq!(FontSize::Sanhao.label(), "三号");
    }

    #[test]
    fn test_font_face() {
        let fs = FontSpec::new("仿宋_GB2312").with_fallbacks(&["FangSong"]);
        assert_eq!(fs.face(), FontFace::FangSong);
        assert_eq!(FontSpec::new("SimHei").face(), FontFace::Hei);
        assert_eq!(FontSpec::new("楷体_GB2312").face(), FontFace::Kai);
        assert_eq!(FontSpec::new("方正小标宋简体").face(), FontFace::Song);
        assert_eq!(fs.families().collect::<Vec<_>>(), ["仿宋_GB2312", "FangSong"]);
    }

    #[test]
    fn test_rgb() {
        let mut rule = StyleTable::standard()
            .resolve(crate::model::Genre::Standard, StyleKey::Body)
            .clone();
        assert_eq!(rule.rgb(), None);
        rule.color = Some("#FF0000".into());
        assert_eq!(rule.rgb(), Some((1.0, 0.0, 0.0)));
        rule.color = Some("red".into());
        assert_eq!(rule.rgb(), None);
    }
}
