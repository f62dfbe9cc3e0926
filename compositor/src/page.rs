//! Shared PDF page plumbing for the two composition paths.

use lopdf::content::Content;
use lopdf::{dictionary, Document, Object, ObjectId};

use crate::ComposeError;

/// Resource name under which the overlay font is registered on each page.
pub const FONT_NAME: &str = "FcHelv";

/// Resolve a zero-based page index to the page's object id.
///
/// Instruction indices count from zero; `lopdf` numbers pages from one.
pub fn page_id_for_index(doc: &Document, index: u32) -> Result<ObjectId, ComposeError> {
    let pages = doc.get_pages();
    #[allow(clippy::cast_possible_truncation)]
    let page_count = pages.len() as u32;
    let number = index
        .checked_add(1)
        .filter(|n| *n <= page_count)
        .ok_or(ComposeError::PageOutOfRange { index, page_count })?;
    pages
        .get(&number)
        .copied()
        .ok_or(ComposeError::PageOutOfRange { index, page_count })
}

/// Width and height of a page from its MediaBox, falling back to A4 when
/// the box is missing or malformed.
pub fn page_size(doc: &Document, page_id: ObjectId) -> (f64, f64) {
    let media_box = doc
        .get_object(page_id)
        .ok()
        .and_then(|obj| obj.as_dict().ok())
        .and_then(|dict| dict.get(b"MediaBox").ok())
        .and_then(|obj| obj.as_array().ok())
        .map(|arr| arr.iter().filter_map(object_as_f64).collect::<Vec<_>>());
    match media_box.as_deref() {
        Some([x0, y0, x1, y1]) => (x1 - x0, y1 - y0),
        _ => (595.0, 842.0),
    }
}

fn object_as_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(n) => {
            #[allow(clippy::cast_precision_loss)]
            Some(*n as f64)
        }
        Object::Real(n) => Some(f64::from(*n)),
        _ => None,
    }
}

/// Register a built-in Helvetica font on the page's resource dictionary
/// under [`FONT_NAME`]. Idempotent per page.
pub fn ensure_font(doc: &mut Document, page_id: ObjectId) -> Result<(), ComposeError> {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources = doc.get_or_create_resources(page_id)?;
    let resources = resources.as_dict_mut()?;
    if !resources.has(b"Font") {
        resources.set("Font", lopdf::Dictionary::new());
    }
    let fonts = resources.get_mut(b"Font")?.as_dict_mut()?;
    if !fonts.has(FONT_NAME.as_bytes()) {
        fonts.set(FONT_NAME, Object::Reference(font_id));
    }
    Ok(())
}

/// Append operations to a page's existing content stream.
pub fn append_operations(
    doc: &mut Document,
    page_id: ObjectId,
    ops: Vec<lopdf::content::Operation>,
) -> Result<(), ComposeError> {
    let existing = doc.get_page_content(page_id)?;
    let mut content = Content::decode(&existing)?;
    content.operations.extend(ops);
    let encoded = content.encode()?;
    doc.change_page_content(page_id, encoded)?;
    Ok(())
}

/// Parse a `#RRGGBB` color string into unit-range RGB components.
pub fn parse_color(color: &str) -> Result<(f64, f64, f64), ComposeError> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ComposeError::InvalidColor(color.to_owned()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map(|v| f64::from(v) / 255.0)
    };
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Ok(r), Ok(g), Ok(b)) => Ok((r, g, b)),
        _ => Err(ComposeError::InvalidColor(color.to_owned())),
    }
}
