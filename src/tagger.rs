//! Positional role assignment.
//!
//! Enumeration promotions apply anywhere in the document. The recipient,
//! sender and date rules only look at the first and the last two paragraphs,
//! found by index; annotation paragraphs do not count as positions.

use crate::classify::Vocabulary;
use crate::model::{Block, Genre, Role};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Sender lines are shorter than this many characters.
const SENDER_MAX_CHARS: usize = 50;

static SECTION_ENUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[一二三四五六七八九十]+、").expect("Invalid section regex"));
static SUB_ENUM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[（(][一二三四五六七八九十]+[）)]").expect("Invalid sub-section regex")
});
static NUMERIC_ENUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+\.").expect("Invalid numeric enumeration regex"));

static DATE_CJK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]{4})年([0-9]{1,2})月([0-9]{1,2})日$").expect("Invalid date regex")
});
static DATE_SEPARATED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]{4})[./-]([0-9]{1,2})[./-]([0-9]{1,2})$").expect("Invalid date regex")
});
static DATE_NUMERALS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([〇○零一二三四五六七八九]{4})年([一二三四五六七八九十]{1,3})月([一二三四五六七八九十]{1,3})日$")
        .expect("Invalid date regex")
});

/// Assign roles with the default vocabulary.
pub fn tag(blocks: &[Block], genre: Genre) -> Vec<Block> {
    tag_with(blocks, genre, &Vocabulary::default())
}

/// Assign roles to paragraph blocks.
///
/// Returns a new sequence of the same length and order. Headings and lists
/// pass through unchanged.
pub fn tag_with(blocks: &[Block], genre: Genre, vocabulary: &Vocabulary) -> Vec<Block> {
    let positions: Vec<usize> = blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.is_paragraph() && !b.is_annotation())
        .map(|(i, _)| i)
        .collect();

    let first = positions.first().copied();
    let tail = &positions[positions.len().saturating_sub(2)..];

    let tagged: Vec<Block> = blocks
        .iter()
        .enumerate()
        .map(|(i, block)| {
            if !block.is_paragraph() || block.is_annotation() {
                return block.clone();
            }
            let role = role_for(block.text(), genre, vocabulary, Some(i) == first, tail.contains(&i));
            block.with_role(role)
        })
        .collect();

    log::debug!(
        "Tagged {} paragraphs ({} headings promoted)",
        positions.len(),
        tagged
            .iter()
            .filter(|b| b.role().is_some_and(Role::is_heading))
            .count()
    );
    tagged
}

fn role_for(text: &str, genre: Genre, vocabulary: &Vocabulary, is_first: bool, in_tail: bool) -> Role {
    let text = text.trim();

    if let Some(role) = enumeration_role(text) {
        return role;
    }

    if is_first
        && genre == Genre::SituationalReport
        && (text.contains('：')
            || vocabulary
                .addressees
                .iter()
                .any(|a| !a.is_empty() && text.contains(a.as_str())))
    {
        return Role::RecipientLine;
    }

    if in_tail {
        if is_date_line(text) {
            return Role::DateLine;
        }
        if text.chars().count() < SENDER_MAX_CHARS && !text.contains('：') && !text.contains(':') {
            return Role::SenderLine;
        }
    }

    Role::Body
}

/// Heading role for an enumerated paragraph, if it starts with one.
pub fn enumeration_role(text: &str) -> Option<Role> {
    if SECTION_ENUM.is_match(text) {
        Some(Role::SectionHeading)
    } else if SUB_ENUM.is_match(text) || NUMERIC_ENUM.is_match(text) {
        Some(Role::SubHeading)
    } else {
        None
    }
}

/// Check if a paragraph ends with a full date.
pub fn is_date_line(text: &str) -> bool {
    let text = text.trim();
    DATE_CJK.is_match(text) || DATE_SEPARATED.is_match(text) || DATE_NUMERALS.is_match(text)
}

/// Parse the date a date line ends with.
///
/// Accepts `2024年3月15日`, `2024-03-15` (also `.` and `/`) and
/// `二〇二四年三月十五日`. Impossible calendar dates yield `None`.
pub fn parse_issue_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    for re in [&*DATE_CJK, &*DATE_SEPARATED] {
        if let Some(caps) = re.captures(text) {
            let year = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let day = caps[3].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }
    }

    let caps = DATE_NUMERALS.captures(text)?;
    let year = caps[1]
        .chars()
        .try_fold(0i32, |acc, c| Some(acc * 10 + digit_value(c)? as i32))?;
    let month = numeral_value(&caps[2])?;
    let day = numeral_value(&caps[3])?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn digit_value(c: char) -> Option<u32> {
    let value = match c {
        '〇' | '○' | '零' => 0,
        '一' => 1,
        '二' => 2,
        '三' => 3,
        '四' => 4,
        '五' => 5,
        '六' => 6,
        '七' => 7,
        '八' => 8,
        '九' => 9,
        _ => return None,
    };
    Some(value)
}

/// Value of a numeral from 一 to 三十九 (十, 十五, 二十, 二十三, ...).
fn numeral_value(s: &str) -> Option<u32> {
    let chars: Vec<char> = s.chars().collect();
    match chars.as_slice() {
        ['十'] => Some(10),
        ['十', unit] => Some(10 + digit_value(*unit)?),
        [tens, '十'] => Some(digit_value(*tens)? * 10),
        [tens, '十', unit] => Some(digit_value(*tens)? * 10 + digit_value(*unit)?),
        [unit] => digit_value(*unit),
        _ => None,
    }
}
