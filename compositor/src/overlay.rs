//! Positioned signature-text overlay onto an existing PDF.
//!
//! The simple output path: a batch of [`SignatureInstruction`]s is applied
//! to one loaded document, appending text operations to each target page's
//! content stream. Coordinates are PDF-native (origin bottom-left); callers
//! coming from editor space must flip the y axis themselves.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use lopdf::content::Operation;
use lopdf::{Document, Object};
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::warn;

use crate::page::{self, FONT_NAME};
use crate::ComposeError;

fn default_font_size() -> f64 {
    12.0
}

fn default_color() -> String {
    "#000000".to_owned()
}

/// One text overlay applied directly to a document page.
///
/// Batches deserialize from JSON, so a signing service or the CLI can hand
/// over a prepared instruction file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureInstruction {
    pub signer_text: String,
    /// Horizontal position in PDF points, from the left page edge.
    pub x: f64,
    /// Vertical position in PDF points, from the *bottom* page edge.
    pub y: f64,
    /// Zero-based page index.
    pub page_index: u32,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    /// Text color as `#RRGGBB`.
    #[serde(default = "default_color")]
    pub color: String,
    /// Append signing date and time to the signer text.
    #[serde(default)]
    pub include_timestamp: bool,
}

/// Apply a batch of overlay instructions to one document, in order.
///
/// Every instruction is validated (page index in range, color parseable)
/// before any drawing starts, so a bad batch leaves the document untouched.
/// Coordinates outside the page are permitted but logged, since the text
/// may simply be invisible and the page's creator may intend bleed margins.
///
/// # Errors
///
/// [`ComposeError::PageOutOfRange`] or [`ComposeError::InvalidColor`] for a
/// bad instruction; [`ComposeError::Pdf`] if a page's content stream cannot
/// be rewritten.
pub fn apply_instructions(
    doc: &mut Document,
    instructions: &[SignatureInstruction],
) -> Result<(), ComposeError> {
    // Validate the whole batch up front.
    for instruction in instructions {
        page::page_id_for_index(doc, instruction.page_index)?;
        page::parse_color(&instruction.color)?;
    }

    let now = OffsetDateTime::now_utc();
    for instruction in instructions {
        let page_id = page::page_id_for_index(doc, instruction.page_index)?;
        let (page_w, page_h) = page::page_size(doc, page_id);
        if instruction.x < 0.0
            || instruction.x > page_w
            || instruction.y < 0.0
            || instruction.y > page_h
        {
            warn!(
                x = instruction.x,
                y = instruction.y,
                page_index = instruction.page_index,
                "overlay coordinates outside page bounds; text may be invisible"
            );
        }

        page::ensure_font(doc, page_id)?;
        let (r, g, b) = page::parse_color(&instruction.color)?;
        let text = display_text(instruction, now);
        let ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![FONT_NAME.into(), instruction.font_size.into()]),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new("Td", vec![instruction.x.into(), instruction.y.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ];
        page::append_operations(doc, page_id, ops)?;
    }
    Ok(())
}

/// Final display text for one instruction at the given signing moment.
fn display_text(instruction: &SignatureInstruction, now: OffsetDateTime) -> String {
    if !instruction.include_timestamp {
        return instruction.signer_text.clone();
    }
    let date = now
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default();
    let time = now
        .format(format_description!("[hour]:[minute]:[second] UTC"))
        .unwrap_or_default();
    format!("{} on {date} at {time}", instruction.signer_text)
}
