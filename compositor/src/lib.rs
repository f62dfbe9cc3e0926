//! Final-output composition for the template editor.
//!
//! Two paths produce real document output from the same page model the
//! `editor` crate edits:
//!
//! - [`overlay`] applies a batch of positioned signature-text instructions
//!   directly onto the pages of an existing PDF. This is the simple path:
//!   no template involved, coordinates are PDF-native (origin bottom-left).
//! - [`compose`] stamps a full template plus a set of bound data values
//!   onto one or more pages. Template geometry is authored top-left, so the
//!   vertical flip to PDF space happens here, exactly once.
//!
//! Both paths mutate an in-memory [`lopdf::Document`]; nothing is persisted
//! until the caller saves it. Failures are hard errors, never placeholders:
//! a signature overlay that silently lands on the wrong page is worse than
//! one that fails loudly.

pub mod compose;
pub mod overlay;

mod page;

pub use compose::{apply_template, TemplateData};
pub use overlay::{apply_instructions, SignatureInstruction};

use std::path::Path;

use lopdf::Document;

/// Error type for both composition paths. Any error leaves the document
/// unmodified.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// An instruction or page selection referenced a page the document does
    /// not have.
    #[error("page index {index} out of range for document with {page_count} pages")]
    PageOutOfRange { index: u32, page_count: u32 },
    /// A color string was not a parseable `#RRGGBB` value.
    #[error("invalid color `{0}`")]
    InvalidColor(String),
    /// The underlying PDF library rejected the document structure.
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Load a base document from disk.
///
/// # Errors
///
/// Fails if the file cannot be read or is not a parseable PDF.
pub fn load_pdf(path: impl AsRef<Path>) -> Result<Document, ComposeError> {
    Ok(Document::load(path)?)
}

/// Persist a composed document to disk.
///
/// # Errors
///
/// Propagates I/O failure from the underlying save.
pub fn save_pdf(doc: &mut Document, path: impl AsRef<Path>) -> Result<(), ComposeError> {
    doc.save(path)?;
    Ok(())
}

/// Serialize a composed document to bytes for in-memory callers.
///
/// # Errors
///
/// Propagates serialization failure.
pub fn pdf_bytes(doc: &mut Document) -> Result<Vec<u8>, ComposeError> {
    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}
