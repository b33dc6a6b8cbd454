//! Rendering options and configuration.

/// Options shared by the renderers.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Print centred page numbers in print output
    pub page_numbers: bool,

    /// Draw the red band above red-header previews
    pub red_header_band: bool,

    /// Marker prefixed to list items in paginated output
    pub list_marker: char,

    /// Author for document metadata, used when no sender line was detected
    pub author: Option<String>,

    /// Suppress the title unit when the first heading repeats it
    pub dedupe_title: bool,

    /// Compress PDF streams
    pub compress: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable page numbers.
    pub fn with_page_numbers(mut self, enabled: bool) -> Self {
        self.page_numbers = enabled;
        self
    }

    /// Enable or disable the red-header band.
    pub fn with_red_header_band(mut self, enabled: bool) -> Self {
        self.red_header_band = enabled;
        self
    }

    /// Set the list marker character.
    pub fn with_list_marker(mut self, marker: char) -> Self {
        self.list_marker = marker;
        self
    }

    /// Set the fallback author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Enable or disable title de-duplication.
    pub fn with_title_dedupe(mut self, enabled: bool) -> Self {
        self.dedupe_title = enabled;
        self
    }

    /// Enable or disable stream compression.
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Text of a list item with its marker.
    pub(crate) fn list_item_text(&self, item: &str) -> String {
        format!("{} {}", self.list_marker, item)
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page_numbers: true,
            red_header_band: true,
            list_marker: '•',
            author: None,
            dedupe_title: true,
            compress: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_page_numbers(false)
            .with_list_marker('-')
            .with_author("市政府办公厅");

        assert!(!options.page_numbers);
        assert!(options.dedupe_title);
        assert_eq!(options.author.as_deref(), Some("市政府办公厅"));
        assert_eq!(options.list_item_text("第一项"), "- 第一项");
    }
}
