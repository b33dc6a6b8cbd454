//! Document-level types.

use super::{Block, Role};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Administrative-document genre (公文文种).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    /// Standard official document
    #[default]
    Standard,
    /// Situational report (情况报告)
    SituationalReport,
    /// Notice, decision, order or announcement (通知)
    Notice,
    /// Meeting minutes (会议纪要)
    MeetingMinutes,
    /// Red-header document (红头文件)
    RedHeader,
    /// Request for instructions (请示)
    Request,
    /// Official reply (批复)
    Reply,
}

impl Genre {
    /// All genres, in declaration order.
    pub const ALL: [Genre; 7] = [
        Genre::Standard,
        Genre::SituationalReport,
        Genre::Notice,
        Genre::MeetingMinutes,
        Genre::RedHeader,
        Genre::Request,
        Genre::Reply,
    ];

    /// Short identifier used in CSS class names and configuration files.
    pub fn slug(self) -> &'static str {
        match self {
            Genre::Standard => "standard",
            Genre::SituationalReport => "report",
            Genre::Notice => "notice",
            Genre::MeetingMinutes => "minutes",
            Genre::RedHeader => "red-header",
            Genre::Request => "request",
            Genre::Reply => "reply",
        }
    }

    /// Chinese name of the genre.
    pub fn label(self) -> &'static str {
        match self {
            Genre::Standard => "标准公文",
            Genre::SituationalReport => "情况报告",
            Genre::Notice => "通知",
            Genre::MeetingMinutes => "会议纪要",
            Genre::RedHeader => "红头文件",
            Genre::Request => "请示",
            Genre::Reply => "批复",
        }
    }

    /// Parse a genre from its slug or snake_case name.
    pub fn from_slug(s: &str) -> Option<Genre> {
        let s = s.trim().to_lowercase();
        Genre::ALL
            .into_iter()
            .find(|g| g.slug() == s || format!("{:?}", g).to_lowercase() == s.replace('_', ""))
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An analysed document: title, genre and tagged blocks.
///
/// Built fresh for every render request and discarded afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentModel {
    /// Caller-supplied title, used verbatim
    pub title: Option<String>,

    /// Assigned genre
    pub genre: Genre,

    /// Blocks in document order
    pub blocks: Vec<Block>,
}

impl DocumentModel {
    /// Create a new document model.
    pub fn new(title: Option<String>, genre: Genre, blocks: Vec<Block>) -> Self {
        Self {
            title,
            genre,
            blocks,
        }
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Title to typeset as a separate title unit, if any.
    ///
    /// Blank titles produce no unit. With `dedupe`, a title that repeats the
    /// leading level-1 heading is suppressed.
    pub fn title_unit(&self, dedupe: bool) -> Option<&str> {
        let title = self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        if dedupe {
            if let Some(Block::Heading { level: 1, text }) = self.blocks.first() {
                if text.trim() == title {
                    return None;
                }
            }
        }
        Some(title)
    }

    /// Text of the first paragraph carrying `role`.
    pub fn find_role(&self, role: Role) -> Option<&str> {
        self.blocks
            .iter()
            .find(|b| b.role() == Some(role))
            .map(|b| b.text())
    }

    /// Text of the sender line, if one was detected.
    pub fn sender(&self) -> Option<&str> {
        self.find_role(Role::SenderLine)
    }

    /// Text of the recipient line, if one was detected.
    pub fn recipient(&self) -> Option<&str> {
        self.find_role(Role::RecipientLine)
    }

    /// Issue date parsed from the date line, if one was detected.
    pub fn issue_date(&self) -> Option<NaiveDate> {
        self.find_role(Role::DateLine)
            .and_then(crate::tagger::parse_issue_date)
    }

    /// Plain text of the whole document, blocks separated by blank lines.
    pub fn plain_text(&self) -> String {
        let mut parts = Vec::with_capacity(self.blocks.len() + 1);
        if let Some(title) = self.title_unit(true) {
            parts.push(title.to_string());
        }
        parts.extend(
            self.blocks
                .iter()
                .filter(|b| !b.is_annotation())
                .map(|b| b.plain_text()),
        );
        parts.join("\n\n")
    }
}
