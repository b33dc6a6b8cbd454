//! Rendered output with statistics.

use super::RenderTarget;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Output of one renderer.
#[derive(Debug, Clone)]
pub struct RenderedOutput {
    /// Target that produced this output
    pub target: RenderTarget,

    /// Payload: UTF-8 markup for previews, a binary package otherwise
    pub bytes: Vec<u8>,

    /// Rendering statistics
    pub stats: RenderStats,
}

impl RenderedOutput {
    /// Create a new rendered output.
    pub fn new(target: RenderTarget, bytes: Vec<u8>, stats: RenderStats) -> Self {
        Self {
            target,
            bytes,
            stats,
        }
    }

    /// Payload as text, for textual targets.
    pub fn as_str(&self) -> Option<&str> {
        if self.target.is_textual() {
            std::str::from_utf8(&self.bytes).ok()
        } else {
            None
        }
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// MIME type of the payload.
    pub fn mime_type(&self) -> &'static str {
        self.target.mime_type()
    }

    /// File extension for the payload, without the dot.
    pub fn extension(&self) -> &'static str {
        self.target.extension()
    }

    /// Consume the output and return the payload.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Write the payload to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Statistics collected while rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Blocks in the source model
    pub block_count: u32,

    /// Whether a title unit was emitted
    pub title_unit: bool,

    /// Paragraph-level units emitted, title and list items included
    pub unit_count: u32,

    /// Headings emitted, promoted enumerations included
    pub heading_count: u32,

    /// List items emitted
    pub list_item_count: u32,

    /// Non-whitespace characters emitted
    pub char_count: u32,

    /// Pages, for paginated targets
    pub page_count: u32,
}

impl RenderStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one emitted unit.
    pub fn add_unit(&mut self, text: &str, heading: bool) {
        self.unit_count += 1;
        if heading {
            self.heading_count += 1;
        }
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Record one emitted list item.
    pub fn add_list_item(&mut self, text: &str) {
        self.list_item_count += 1;
        self.add_unit(text, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counting() {
        let mut stats = RenderStats::new();
        stats.add_unit("一、 总体要求", true);
        stats.add_list_item("第一项");

        assert_eq!(stats.unit_count, 2);
        assert_eq!(stats.heading_count, 1);
        assert_eq!(stats.list_item_count, 1);
        assert_eq!(stats.char_count, 9);
    }

    #[test]
    fn test_output_accessors() {
        let html = RenderedOutput::new(
            RenderTarget::PreviewHtml,
            b"<p>x</p>".to_vec(),
            RenderStats::new(),
        );
        assert_eq!(html.as_str(), Some("<p>x</p>"));
        assert_eq!(html.extension(), "html");

        let pdf = RenderedOutput::new(RenderTarget::PrintDocument, b"%PDF".to_vec(), RenderStats::new());
        assert_eq!(pdf.as_str(), None);
        assert_eq!(pdf.mime_type(), "application/pdf");
    }

    #[test]
    fn test_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        let output = RenderedOutput::new(RenderTarget::PreviewHtml, b"<p></p>".to_vec(), RenderStats::new());
        output.save(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"<p></p>");
    }
}
