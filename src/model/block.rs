//! Block-level types.

use serde::{Deserialize, Serialize};

/// One structurally distinct unit of a document.
///
/// Blocks are produced by the segmenter and never edited afterwards; the
/// positional tagger builds a new sequence with refined roles instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A markup heading (`#`, `##`, `###`)
    Heading {
        /// Heading level (1-3)
        level: u8,
        /// Heading text
        text: String,
    },

    /// A paragraph of text
    Paragraph {
        /// Paragraph text
        text: String,
        /// Function of the paragraph within the document
        #[serde(default)]
        role: Role,
    },

    /// A group of consecutive list items
    List {
        /// Item texts, markers removed
        items: Vec<String>,
    },
}

impl Block {
    /// Create a heading block.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level: level.clamp(1, 3),
            text: text.into(),
        }
    }

    /// Create a body paragraph.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph {
            text: text.into(),
            role: Role::Body,
        }
    }

    /// Create a list block.
    pub fn list(items: Vec<String>) -> Self {
        Block::List { items }
    }

    /// Get the coarse kind of this block.
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Heading { level: 1, .. } => BlockKind::Heading1,
            Block::Heading { level: 2, .. } => BlockKind::Heading2,
            Block::Heading { level: 3, .. } => BlockKind::Heading3,
            Block::Heading { .. } => BlockKind::Paragraph,
            Block::Paragraph { .. } => BlockKind::Paragraph,
            Block::List { .. } => BlockKind::ListItemGroup,
        }
    }

    /// Get the text payload. List blocks have an empty payload.
    pub fn text(&self) -> &str {
        match self {
            Block::Heading { text, .. } | Block::Paragraph { text, .. } => text,
            Block::List { .. } => "",
        }
    }

    /// Get the list items, empty for non-list blocks.
    pub fn items(&self) -> &[String] {
        match self {
            Block::List { items } => items,
            _ => &[],
        }
    }

    /// Get the paragraph role, or `None` for headings and lists.
    pub fn role(&self) -> Option<Role> {
        match self {
            Block::Paragraph { role, .. } => Some(*role),
            _ => None,
        }
    }

    /// Return a copy of this block carrying `role`.
    ///
    /// Non-paragraph blocks are returned unchanged.
    pub fn with_role(&self, role: Role) -> Self {
        match self {
            Block::Paragraph { text, .. } => Block::Paragraph {
                text: text.clone(),
                role,
            },
            other => other.clone(),
        }
    }

    /// Check if this is a paragraph block.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph { .. })
    }

    /// Check if this paragraph is a preserved structural comment
    /// (e.g. `<!-- 发文机关：... -->`).
    pub fn is_annotation(&self) -> bool {
        self.annotation_body().is_some()
    }

    /// Inner text of an annotation paragraph.
    ///
    /// The paragraph must be exactly one comment: text between two comments
    /// (`<!-- a --> x <!-- b -->`) is ordinary content.
    pub fn annotation_body(&self) -> Option<&str> {
        let Block::Paragraph { text, .. } = self else {
            return None;
        };
        let body = text.trim().strip_prefix("<!--")?.strip_suffix("-->")?;
        if body.contains("-->") {
            None
        } else {
            Some(body)
        }
    }

    /// Plain text of the block, list items joined by newlines.
    pub fn plain_text(&self) -> String {
        match self {
            Block::List { items } => items.join("\n"),
            other => other.text().to_string(),
        }
    }
}

/// Coarse block kind as produced by segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading1,
    Heading2,
    Heading3,
    Paragraph,
    ListItemGroup,
}

/// Function of a paragraph, assigned by the positional tagger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Ordinary body text
    #[default]
    Body,
    /// Primary recipient line (主送机关)
    RecipientLine,
    /// Issuing authority line (发文机关署名)
    SenderLine,
    /// Issue date line (成文日期)
    DateLine,
    /// Chinese-numeral section heading (一、)
    SectionHeading,
    /// Parenthesized or numeric sub-heading ((一), 1.)
    SubHeading,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Role; 6] = [
        Role::Body,
        Role::RecipientLine,
        Role::SenderLine,
        Role::DateLine,
        Role::SectionHeading,
        Role::SubHeading,
    ];

    /// Check if this role turns the paragraph into a heading.
    pub fn is_heading(self) -> bool {
        matches!(self, Role::SectionHeading | Role::SubHeading)
    }
}
