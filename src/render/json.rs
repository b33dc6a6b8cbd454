//! JSON dumps of analysed documents and print definitions.

use crate::error::Result;
use crate::model::DocumentModel;
use serde::Serialize;

/// JSON output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Indented, one field per line
    #[default]
    Pretty,
    /// Single line
    Compact,
}

/// Dump an analysed document model as JSON.
pub fn to_json(doc: &DocumentModel, format: JsonFormat) -> Result<String> {
    let json = write_json(doc, format)?;
    log::debug!(
        "Dumped {} blocks of a {} document as JSON",
        doc.block_count(),
        doc.genre.slug()
    );
    Ok(json)
}

/// Serialize any value in the requested layout. Failures surface as
/// [`Error::Json`](crate::Error::Json), never as render failures.
pub(crate) fn write_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(json)
}
