//! # gongwen
//!
//! Typesetting pipeline for Chinese official documents (公文).
//!
//! Raw, loosely marked-up text is normalized, split into blocks, assigned a
//! genre, tagged with positional roles and rendered to one of three targets:
//! a sanitized HTML preview, a DOCX package or a PDF.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gongwen::{render, RenderTarget};
//!
//! fn main() -> gongwen::Result<()> {
//!     let raw = "市政府：\n\n一、基本情况\n\n正文内容。\n\n深圳市水务局\n\n2024年3月15日";
//!     let output = render(raw, Some("关于防汛工作的情况报告"), RenderTarget::PrintDocument)?;
//!     output.save("report.pdf")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Stages
//!
//! - **Normalizer**: strips decorative markup, keeps headings, list markers
//!   and structural comments
//! - **Segmenter**: headings, paragraphs and list groups
//! - **Classifier**: first-match rule cascade over seven genres
//! - **Tagger**: recipient, sender, date and enumeration roles by position
//! - **Renderers**: preview HTML, DOCX and PDF from one shared style table
//!
//! Analysis never fails. Only rendering returns errors.

pub mod classify;
pub mod error;
pub mod model;
pub mod normalize;
pub mod render;
pub mod segment;
pub mod style;
pub mod tagger;

// Re-export commonly used types
pub use classify::{GenreClassifier, Vocabulary};
pub use error::{Error, Result};
pub use model::{Block, BlockKind, DocumentModel, Genre, Role};
pub use normalize::{NormalizeOptions, Normalizer};
pub use render::{
    JsonFormat, RenderOptions, RenderStats, RenderTarget, RenderedOutput, Renderer,
};
pub use style::{Alignment, FontSize, FontSpec, StyleKey, StyleRule, StyleTable};

use rayon::prelude::*;
use std::sync::Arc;

/// Analyse raw text into a document model with default settings.
///
/// # Example
///
/// ```
/// use gongwen::{analyze, Genre, Role};
///
/// let doc = analyze("市政府：\n\n正文", Some("关于防汛工作的情况报告"));
/// assert_eq!(doc.genre, Genre::SituationalReport);
/// assert_eq!(doc.blocks[0].role(), Some(Role::RecipientLine));
/// ```
pub fn analyze(raw: &str, title: Option<&str>) -> DocumentModel {
    Gongwen::new().analyze(raw, title)
}

/// Render raw text to a target with default settings.
///
/// # Example
///
/// ```
/// use gongwen::{render, RenderTarget};
///
/// let output = render("", None, RenderTarget::PreviewHtml).unwrap();
/// assert!(output.as_str().unwrap().starts_with("<div"));
/// ```
pub fn render(raw: &str, title: Option<&str>, target: RenderTarget) -> Result<RenderedOutput> {
    Gongwen::new().render(raw, title, target)
}

/// Render raw text to a target with custom render options.
pub fn render_with(
    raw: &str,
    title: Option<&str>,
    target: RenderTarget,
    options: RenderOptions,
) -> Result<RenderedOutput> {
    Gongwen::new()
        .with_render_options(options)
        .render(raw, title, target)
}

/// One independent render request for [`Gongwen::render_batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Raw input text
    pub raw: String,
    /// Optional caller-supplied title
    pub title: Option<String>,
    /// Output target
    pub target: RenderTarget,
}

impl RenderRequest {
    /// Create a request without a title.
    pub fn new(raw: impl Into<String>, target: RenderTarget) -> Self {
        Self {
            raw: raw.into(),
            title: None,
            target,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Configured pipeline.
///
/// Holds only immutable configuration, so one instance can serve any number
/// of concurrent requests.
///
/// # Example
///
/// ```no_run
/// use gongwen::{Gongwen, RenderOptions, RenderTarget, StyleTable};
///
/// let styles = StyleTable::standard()
///     .with_overrides_json(r#"{"notice": {"body": {"line_spacing_pt": 30}}}"#)?;
/// let output = Gongwen::new()
///     .with_styles(styles)
///     .with_render_options(RenderOptions::new().with_page_numbers(false))
///     .render("正文", Some("关于开展检查的通知"), RenderTarget::PrintDocument)?;
/// output.save("notice.pdf")?;
/// # Ok::<(), gongwen::Error>(())
/// ```
pub struct Gongwen {
    normalizer: Normalizer,
    classifier: GenreClassifier,
    styles: Option<Arc<StyleTable>>,
    render_options: RenderOptions,
}

impl Gongwen {
    /// Create a pipeline with default settings.
    pub fn new() -> Self {
        Self {
            normalizer: Normalizer::default(),
            classifier: GenreClassifier::default(),
            styles: None,
            render_options: RenderOptions::default(),
        }
    }

    /// Set normalization options.
    pub fn with_normalize_options(mut self, options: NormalizeOptions) -> Self {
        self.normalizer = Normalizer::new(options);
        self
    }

    /// Set the classification and tagging vocabulary.
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.classifier = GenreClassifier::new(vocabulary);
        self
    }

    /// Set a custom style table.
    pub fn with_styles(mut self, styles: impl Into<Arc<StyleTable>>) -> Self {
        self.styles = Some(styles.into());
        self
    }

    /// Set render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Style table in use.
    pub fn styles(&self) -> &StyleTable {
        match &self.styles {
            Some(styles) => styles,
            None => StyleTable::global(),
        }
    }

    /// Render options in use.
    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }

    /// Analyse raw text into a document model.
    pub fn analyze(&self, raw: &str, title: Option<&str>) -> DocumentModel {
        let normalized = self.normalizer.normalize(raw);
        let blocks = segment::segment(&normalized);
        let genre = self.classifier.classify(title, &normalized);
        let blocks = tagger::tag_with(&blocks, genre, self.classifier.vocabulary());

        log::debug!("Analysed {} blocks as {:?}", blocks.len(), genre);
        DocumentModel::new(title.map(String::from), genre, blocks)
    }

    /// Analyse and render raw text.
    pub fn render(
        &self,
        raw: &str,
        title: Option<&str>,
        target: RenderTarget,
    ) -> Result<RenderedOutput> {
        let doc = self.analyze(raw, title);
        self.render_model(&doc, target)
    }

    /// Render an already analysed model.
    pub fn render_model(&self, doc: &DocumentModel, target: RenderTarget) -> Result<RenderedOutput> {
        render::render_model(doc, self.styles(), target, &self.render_options)
    }

    /// Render independent requests in parallel.
    ///
    /// Results keep the request order; a failed request never affects the
    /// others.
    pub fn render_batch(&self, requests: &[RenderRequest]) -> Vec<Result<RenderedOutput>> {
        requests
            .par_iter()
            .map(|req| self.render(&req.raw, req.title.as_deref(), req.target))
            .collect()
    }
}

impl Default for Gongwen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_report() {
        let doc = analyze(
            "市政府：\n\n一、基本情况\n\n正文内容。\n\n深圳市水务局\n\n2024年3月15日",
            Some("关于防汛工作的情况报告"),
        );
        assert_eq!(doc.genre, Genre::SituationalReport);
        let roles: Vec<_> = doc.blocks.iter().map(|b| b.role()).collect();
        assert_eq!(
            roles,
            vec![
                Some(Role::RecipientLine),
                Some(Role::SectionHeading),
                Some(Role::Body),
                Some(Role::SenderLine),
                Some(Role::DateLine),
            ]
        );
    }

    #[test]
    fn test_custom_styles() {
        let styles = StyleTable::standard()
            .with_overrides_json(r#"{"standard": {"body": {"line_spacing_pt": 30}}}"#)
            .unwrap();
        let gongwen = Gongwen::new().with_styles(styles);
        assert_eq!(
            gongwen
                .styles()
                .resolve(Genre::Standard, StyleKey::Body)
                .line_spacing_pt,
            30.0
        );
        assert!(gongwen.render("正文", None, RenderTarget::PrintDocument).is_ok());
    }

    #[test]
    fn test_render_batch_order() {
        let requests: Vec<_> = RenderTarget::ALL
            .into_iter()
            .map(|t| RenderRequest::new("正文", t).with_title("标题"))
            .collect();
        let results = Gongwen::new().render_batch(&requests);
        assert_eq!(results.len(), 3);
        for (req, result) in requests.iter().zip(&results) {
            assert_eq!(result.as_ref().unwrap().target, req.target);
        }
    }
}
