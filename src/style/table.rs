//! Standard style table and JSON overrides.

use super::{hex_rgb, Alignment, FontSize, FontSpec, StyleKey, StyleRule};
use crate::error::{Error, Result};
use crate::model::Genre;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static GLOBAL: Lazy<StyleTable> = Lazy::new(StyleTable::standard);

// Unreachable through the public API; keeps `resolve` total without a panic.
static FALLBACK: Lazy<StyleRule> = Lazy::new(|| base_rule(StyleKey::Body));

/// Mapping from (genre, key) to a style rule.
///
/// Every lookup resolves: genre overrides first, then the base rule shared by
/// all genres. Tables are built once and read concurrently afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleTable {
    base: BTreeMap<StyleKey, StyleRule>,
    overrides: BTreeMap<Genre, BTreeMap<StyleKey, StyleRule>>,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl StyleTable {
    /// The standard table (GB/T 9704 conventions).
    pub fn standard() -> Self {
        let base = StyleKey::ALL
            .into_iter()
            .map(|key| (key, base_rule(key)))
            .collect();

        let mut table = Self {
            base,
            overrides: BTreeMap::new(),
        };

        let mut red_title = table.resolve(Genre::RedHeader, StyleKey::Title).clone();
        red_title.color = Some("C00000".to_string());
        table.set_override(Genre::RedHeader, StyleKey::Title, red_title.clone());
        table.set_override(Genre::RedHeader, StyleKey::Heading1, red_title);

        let mut recipient = table.resolve(Genre::SituationalReport, StyleKey::RecipientLine).clone();
        recipient.space_after_pt = 24.0;
        table.set_override(Genre::SituationalReport, StyleKey::RecipientLine, recipient);

        let mut minutes_body = table.resolve(Genre::MeetingMinutes, StyleKey::Body).clone();
        minutes_body.line_spacing_pt = 24.0;
        table.set_override(Genre::MeetingMinutes, StyleKey::Body, minutes_body);

        table
    }

    /// Process-wide standard table, built on first use.
    pub fn global() -> &'static StyleTable {
        &GLOBAL
    }

    /// Resolve the rule for a genre and key.
    pub fn resolve(&self, genre: Genre, key: StyleKey) -> &StyleRule {
        self.overrides
            .get(&genre)
            .and_then(|rules| rules.get(&key))
            .or_else(|| self.base.get(&key))
            .unwrap_or(&*FALLBACK)
    }

    /// All rules for a genre, in key order.
    pub fn rules_for(&self, genre: Genre) -> BTreeMap<StyleKey, StyleRule> {
        StyleKey::ALL
            .into_iter()
            .map(|key| (key, self.resolve(genre, key).clone()))
            .collect()
    }

    /// Check if a genre has its own rule for `key`.
    pub fn has_override(&self, genre: Genre, key: StyleKey) -> bool {
        self.overrides
            .get(&genre)
            .is_some_and(|rules| rules.contains_key(&key))
    }

    /// Layer JSON overrides over this table.
    ///
    /// The document maps genre slugs to style keys to partial rules:
    ///
    /// ```json
    /// { "standard": { "body": { "line_spacing_pt": 30 } },
    ///   "red-header": { "title": { "color": "FF0000" } } }
    /// ```
    ///
    /// `standard` changes the base shared by every genre. An unknown genre,
    /// key or field is a configuration error.
    pub fn with_overrides_json(mut self, json: &str) -> Result<Self> {
        let doc: BTreeMap<String, BTreeMap<StyleKey, RulePatch>> = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("style overrides: {}", e)))?;

        for (slug, patches) in doc {
            let genre = Genre::from_slug(&slug)
                .ok_or_else(|| Error::Config(format!("style overrides: unknown genre '{}'", slug)))?;

            for (key, patch) in patches {
                patch.validate(&slug, key)?;
                if genre == Genre::Standard {
                    if let Some(rule) = self.base.get_mut(&key) {
                        patch.apply(rule);
                    }
                } else {
                    let mut rule = self.resolve(genre, key).clone();
                    patch.apply(&mut rule);
                    self.set_override(genre, key, rule);
                }
                log::debug!("Applied style override for {}/{:?}", slug, key);
            }
        }

        Ok(self)
    }

    fn set_override(&mut self, genre: Genre, key: StyleKey, rule: StyleRule) {
        self.overrides.entry(genre).or_default().insert(key, rule);
    }
}

/// Partial rule used by JSON overrides.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RulePatch {
    font: Option<FontSpec>,
    size: Option<FontSize>,
    bold: Option<bool>,
    color: Option<String>,
    first_line_indent_chars: Option<f32>,
    left_indent_chars: Option<f32>,
    line_spacing_pt: Option<f32>,
    space_before_pt: Option<f32>,
    space_after_pt: Option<f32>,
    alignment: Option<Alignment>,
}

impl RulePatch {
    fn validate(&self, genre: &str, key: StyleKey) -> Result<()> {
        let lengths = [
            self.first_line_indent_chars,
            self.left_indent_chars,
            self.line_spacing_pt,
            self.space_before_pt,
            self.space_after_pt,
        ];
        if lengths.iter().flatten().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(Error::Config(format!(
                "style overrides: negative or non-finite length in {}/{:?}",
                genre, key
            )));
        }
        if self.line_spacing_pt == Some(0.0) {
            return Err(Error::Config(format!(
                "style overrides: zero line spacing in {}/{:?}",
                genre, key
            )));
        }
        if let Some(color) = self.color.as_deref() {
            if !color.trim().is_empty() && hex_rgb(color).is_none() {
                return Err(Error::Config(format!(
                    "style overrides: color '{}' in {}/{:?} is not RRGGBB",
                    color, genre, key
                )));
            }
        }
        Ok(())
    }

    fn apply(self, rule: &mut StyleRule) {
        if let Some(font) = self.font {
            rule.font = font;
        }
        if let Some(size) = self.size {
            rule.size = size;
        }
        if let Some(bold) = self.bold {
            rule.bold = bold;
        }
        if let Some(color) = self.color {
            // An empty string resets to black; stored as bare uppercase hex
            let hex = color.trim().trim_start_matches('#').to_ascii_uppercase();
            rule.color = Some(hex).filter(|c| !c.is_empty());
        }
        if let Some(v) = self.first_line_indent_chars {
            rule.first_line_indent_chars = v;
        }
        if let Some(v) = self.left_indent_chars {
            rule.left_indent_chars = v;
        }
        if let Some(v) = self.line_spacing_pt {
            rule.line_spacing_pt = v;
        }
        if let Some(v) = self.space_before_pt {
            rule.space_before_pt = v;
        }
        if let Some(v) = self.space_after_pt {
            rule.space_after_pt = v;
        }
        if let Some(alignment) = self.alignment {
            rule.alignment = alignment;
        }
    }
}

fn title_font() -> FontSpec {
    FontSpec::new("方正小标宋简体").with_fallbacks(&["小标宋", "SimSun", "宋体"])
}

fn hei_font() -> FontSpec {
    FontSpec::new("黑体").with_fallbacks(&["SimHei"])
}

fn kai_font() -> FontSpec {
    FontSpec::new("楷体_GB2312").with_fallbacks(&["楷体", "KaiTi"])
}

fn body_font() -> FontSpec {
    FontSpec::new("仿宋_GB2312").with_fallbacks(&["仿宋", "FangSong"])
}

fn base_rule(key: StyleKey) -> StyleRule {
    let body = StyleRule {
        font: body_font(),
        size: FontSize::Sanhao,
        bold: false,
        color: None,
        first_line_indent_chars: 2.0,
        left_indent_chars: 0.0,
        line_spacing_pt: 28.0,
        space_before_pt: 0.0,
        space_after_pt: 12.0,
        alignment: Alignment::Justify,
    };

    match key {
        StyleKey::Title | StyleKey::Heading1 => StyleRule {
            font: title_font(),
            size: FontSize::Erhao,
            bold: true,
            first_line_indent_chars: 0.0,
            line_spacing_pt: 33.0,
            space_after_pt: 30.0,
            alignment: Alignment::Center,
            ..body
        },
        StyleKey::Heading2 | StyleKey::SectionHeading => StyleRule {
            font: hei_font(),
            bold: true,
            first_line_indent_chars: 0.0,
            space_before_pt: 28.0,
            space_after_pt: 16.0,
            alignment: Alignment::Start,
            ..body
        },
        StyleKey::Heading3 | StyleKey::SubHeading => StyleRule {
            font: kai_font(),
            bold: true,
            first_line_indent_chars: 0.0,
            space_before_pt: 16.0,
            space_after_pt: 16.0,
            alignment: Alignment::Start,
            ..body
        },
        StyleKey::Body => body,
        StyleKey::RecipientLine => StyleRule {
            first_line_indent_chars: 0.0,
            space_after_pt: 20.0,
            alignment: Alignment::Start,
            ..body
        },
        StyleKey::SenderLine => StyleRule {
            first_line_indent_chars: 0.0,
            space_before_pt: 28.0,
            space_after_pt: 0.0,
            alignment: Alignment::End,
            ..body
        },
        StyleKey::DateLine => StyleRule {
            first_line_indent_chars: 0.0,
            space_after_pt: 0.0,
            alignment: Alignment::End,
            ..body
        },
        StyleKey::ListItem => StyleRule {
            first_line_indent_chars: 0.0,
            left_indent_chars: 2.0,
            space_after_pt: 5.0,
            ..body
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_coverage() {
        let table = StyleTable::standard();
        for genre in Genre::ALL {
            for key in StyleKey::ALL {
                let rule = table.resolve(genre, key);
                assert!(rule.size_pt() > 0.0);
                assert!(rule.line_spacing_pt > 0.0);
            }
        }
    }

    #[test]
    fn test_genre_overrides() {
        let table = StyleTable::standard();
        assert_eq!(
            table.resolve(Genre::RedHeader, StyleKey::Title).color.as_deref(),
            Some("C00000")
        );
        assert_eq!(table.resolve(Genre::Standard, StyleKey::Title).color, None);
        assert_eq!(
            table
                .resolve(Genre::SituationalReport, StyleKey::RecipientLine)
                .space_after_pt,
            24.0
        );
        assert!(table.has_override(Genre::MeetingMinutes, StyleKey::Body));
        assert!(!table.has_override(Genre::Notice, StyleKey::Body));
    }

    #[test]
    fn test_base_values() {
        let table = StyleTable::global();
        let body = table.resolve(Genre::Standard, StyleKey::Body);
        assert_eq!(body.size, FontSize::Sanhao);
        assert_eq!(body.first_line_indent_chars, 2.0);
        assert_eq!(body.line_spacing_pt, 28.0);
        assert_eq!(body.alignment, Alignment::Justify);

        let title = table.resolve(Genre::Standard, StyleKey::Title);
        assert_eq!(title.size.points(), 22.0);
        assert!(title.bold);
        assert_eq!(title.alignment, Alignment::Center);

        assert_eq!(
            table.resolve(Genre::Notice, StyleKey::SenderLine).alignment,
            Alignment::End
        );
    }

    #[test]
    fn test_overrides_json() {
        let table = StyleTable::standard()
            .with_overrides_json(
                r#"{
                    "standard": { "body": { "line_spacing_pt": 30 } },
                    "notice": { "title": { "color": "FF0000", "size": "xiao_er" } }
                }"#,
            )
            .unwrap();

        assert_eq!(table.resolve(Genre::Reply, StyleKey::Body).line_spacing_pt, 30.0);
        // Existing genre override is kept
        assert_eq!(
            table.resolve(Genre::MeetingMinutes, StyleKey::Body).line_spacing_pt,
            24.0
        );
        let title = table.resolve(Genre::Notice, StyleKey::Title);
        assert_eq!(title.color.as_deref(), Some("FF0000"));
        assert_eq!(title.size, FontSize::XiaoEr);
        assert!(title.bold);
    }

    #[test]
    fn test_invalid_overrides() {
        let table = StyleTable::standard();
        assert!(table.clone().with_overrides_json(r#"{"memo": {}}"#).is_err());
        assert!(table
            .clone()
            .with_overrides_json(r#"{"standard": {"footer": {}}}"#)
            .is_err());
        assert!(table
            .clone()
            .with_overrides_json(r#"{"standard": {"body": {"leading": 3}}}"#)
            .is_err());
        assert!(table
            .with_overrides_json(r#"{"standard": {"body": {"space_after_pt": -1}}}"#)
            .is_err());
    }

    #[test]
    fn test_color_overrides() {
        for color in ["red;}body{display:none", "red", "#12345", "GGHHII", "C00000\"\u{003e}"] {
            let json = format!(r#"{{"notice": {{"title": {{"color": {:?}}}}}}}"#, color);
            let err = StyleTable::standard().with_overrides_json(&json).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{}: {:?}", color, err);
        }

        let table = StyleTable::standard()
            .with_overrides_json(
                r##"{"notice": {"title": {"color": "#ff0000"}}, "red-header": {"title": {"color": ""}}}"##,
            )
            .unwrap();
        assert_eq!(
            table.resolve(Genre::Notice, StyleKey::Title).color.as_deref(),
            Some("FF0000")
        );
        assert_eq!(table.resolve(Genre::RedHeader, StyleKey::Title).color, None);
    }

    #[test]
    fn test_serializes() {
        let json = serde_json::to_string(StyleTable::global()).unwrap();
        assert!(json.contains("\"body\""));
        assert!(json.contains("C00000"));
    }
}
