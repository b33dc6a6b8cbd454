//! Rendering of analysed documents to the output surfaces.
//!
//! Every back end implements [`Renderer`]: it reads a [`DocumentModel`] and
//! a [`StyleTable`] and returns a self-contained [`RenderedOutput`]. None of
//! them mutate the model, and a failure in one never affects another.

mod docx;
mod json;
mod options;
mod pdf;
mod preview;
mod print;
mod result;
mod sanitize;
pub mod units;

pub use docx::DocxRenderer;
pub use json::{to_json, JsonFormat};
pub use options::RenderOptions;
pub use pdf::PdfRenderer;
pub use preview::{standalone_html, stylesheet, PreviewRenderer};
pub use print::{CatalogStyle, PrintContent, PrintDefinition, PrintInfo, PrintStyle};
pub use result::{RenderStats, RenderedOutput};
pub use sanitize::{escape_text, sanitize};

use crate::error::Result;
use crate::model::DocumentModel;
use crate::style::StyleTable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderTarget {
    /// Sanitized HTML for on-screen display
    PreviewHtml,
    /// Paginated word-processor document (DOCX)
    PageDescription,
    /// Print-ready document (PDF)
    PrintDocument,
}

impl RenderTarget {
    /// All targets.
    pub const ALL: [RenderTarget; 3] = [
        RenderTarget::PreviewHtml,
        RenderTarget::PageDescription,
        RenderTarget::PrintDocument,
    ];

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            RenderTarget::PreviewHtml => "html",
            RenderTarget::PageDescription => "docx",
            RenderTarget::PrintDocument => "pdf",
        }
    }

    /// MIME type of the payload.
    pub fn mime_type(self) -> &'static str {
        match self {
            RenderTarget::PreviewHtml => "text/html; charset=utf-8",
            RenderTarget::PageDescription => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            RenderTarget::PrintDocument => "application/pdf",
        }
    }

    /// Check if the payload is text.
    pub fn is_textual(self) -> bool {
        matches!(self, RenderTarget::PreviewHtml)
    }

    /// Parse a target from a name or file extension.
    pub fn from_name(s: &str) -> Option<RenderTarget> {
        match s.trim().to_lowercase().as_str() {
            "preview" | "html" | "preview_html" => Some(RenderTarget::PreviewHtml),
            "docx" | "word" | "page_description" => Some(RenderTarget::PageDescription),
            "pdf" | "print" | "print_document" => Some(RenderTarget::PrintDocument),
            _ => None,
        }
    }
}

impl fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A rendering back end.
pub trait Renderer {
    /// Render a document with the given styles.
    fn render(&self, doc: &DocumentModel, styles: &StyleTable) -> Result<RenderedOutput>;
}

/// Render a model to `target`.
pub fn render_model(
    doc: &DocumentModel,
    styles: &StyleTable,
    target: RenderTarget,
    options: &RenderOptions,
) -> Result<RenderedOutput> {
    let options = options.clone();
    match target {
        RenderTarget::PreviewHtml => PreviewRenderer::new(options).render(doc, styles),
        RenderTarget::PageDescription => DocxRenderer::new(options).render(doc, styles),
        RenderTarget::PrintDocument => PdfRenderer::new(options).render(doc, styles),
    }
}
