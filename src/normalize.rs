//! Text normalization: markup decoration removal ahead of segmentation.
//!
//! Headings are rewritten into delimited heading markers, inline emphasis,
//! code, links and images are collapsed to their visible text, and HTML
//! comments are dropped unless they carry one of the preserved keywords.
//! Preserved comments are folded onto a single line.
//! List markers survive untouched so the segmenter can still see them.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization;

/// Opening delimiter of a heading marker.
const MARKER_OPEN: char = '\u{1E}';
/// Closing delimiter of a heading marker.
const MARKER_CLOSE: char = '\u{1F}';

static CODE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[^\n]*\n((?s:.*?))```").expect("Invalid code block regex"));
static CODE_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`\n]*)`").expect("Invalid code span regex"));
static BOLD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*([^\n]*?)\*\*|__([^\n_]+?)__").expect("Invalid bold regex")
});
// An opening `*` followed by a space is a bullet, not emphasis.
static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^\s*][^*\n]*?)\*").expect("Invalid italic regex"));
static HEADING_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(#{1,3})[ \t]+(.*?)[ \t#]*$").expect("Invalid heading regex"));
// Levels 4-6 have no marker and keep only their text.
static DEEP_HEADING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*#{4,6}[ \t]+(.*?)[ \t#]*$").expect("Invalid deep heading regex")
});
static BLOCKQUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?:[ \t]*>)+[ \t]?").expect("Invalid blockquote regex"));
static IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]\n]*\]\([^)\n]*\)").expect("Invalid image regex"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]\n]*)\]\([^)\n]*\)").expect("Invalid link regex"));
static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--((?s:.*?))-->").expect("Invalid comment regex"));

/// Options for text normalization.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Comments containing one of these keywords are kept verbatim
    pub preserved_comment_keywords: Vec<String>,
}

impl NormalizeOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable NFC normalization.
    pub fn with_unicode_normalization(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }

    /// Replace the preserved comment keywords.
    pub fn with_preserved_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preserved_comment_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            preserved_comment_keywords: ["红头文件", "发文机关", "发文日期", "主送机关"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Markup normalizer.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    /// Create a normalizer with the given options.
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    /// Get the options.
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize raw text.
    ///
    /// Never fails: malformed markup degrades to plain text. Normalizing
    /// already-normalized text returns it unchanged.
    pub fn normalize(&self, text: &str) -> String {
        // Line endings
        let mut result = text.replace("\r\n", "\n").replace('\r', "\n");

        if self.options.normalize_unicode {
            result = result.nfc().collect();
        }

        // Comments, deep headings and decoration repeat until stable, since
        // removing one construct can expose another (`***text***`, `> > quote`,
        // `#### > quote`). Every change shortens the text or folds a comment
        // onto one line, so the loop ends.
        loop {
            let next = strip_decoration(&strip_deep_headings(&self.filter_comments(&result)));
            if next == result {
                break;
            }
            result = next;
        }

        // Headings last; the marker prefix shields the line from every
        // earlier pattern
        HEADING_LINE
            .replace_all(&result, |caps: &Captures| {
                heading_marker(caps[1].len() as u8, caps[2].trim())
            })
            .into_owned()
    }

    fn filter_comments(&self, text: &str) -> String {
        COMMENT
            .replace_all(text, |caps: &Captures| {
                let body = &caps[1];
                let keep = self
                    .options
                    .preserved_comment_keywords
                    .iter()
                    .any(|k| !k.is_empty() && body.contains(k.as_str()));
                if !keep {
                    String::new()
                } else if body.contains('\n') {
                    let lines: Vec<&str> =
                        body.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
                    format!("<!-- {} -->", lines.join(" "))
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned()
    }
}

/// Normalize text with default options.
pub fn normalize(text: &str) -> String {
    Normalizer::default().normalize(text)
}

fn strip_deep_headings(text: &str) -> String {
    DEEP_HEADING_LINE
        .replace_all(text, |caps: &Captures| caps[1].trim().to_string())
        .into_owned()
}

fn strip_decoration(text: &str) -> String {
    // Bullet and numeric list markers are left alone for the segmenter.
    let result = BLOCKQUOTE.replace_all(text, "");
    let result = CODE_BLOCK.replace_all(&result, "$1");
    let result = CODE_SPAN.replace_all(&result, "$1");
    let result = BOLD.replace_all(&result, |caps: &Captures| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    });
    let result = ITALIC.replace_all(&result, "$1");
    let result = IMAGE.replace_all(&result, "");
    LINK.replace_all(&result, "$1").into_owned()
}

/// Build a heading marker line for `level` (1-3).
pub(crate) fn heading_marker(level: u8, text: &str) -> String {
    format!("{}{}{}{}", MARKER_OPEN, level.clamp(1, 3), MARKER_CLOSE, text)
}

/// Split a heading marker line into its level and text.
pub(crate) fn parse_heading_marker(line: &str) -> Option<(u8, &str)> {
    let rest = line.strip_prefix(MARKER_OPEN)?;
    let mut chars = rest.chars();
    let level = chars.next()?.to_digit(10)? as u8;
    let text = chars.as_str().strip_prefix(MARKER_CLOSE)?;
    if (1..=3).contains(&level) {
        Some((level, text))
    } else {
        None
    }
}
