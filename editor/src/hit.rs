//! Hit-testing: which element (and which resize handle) is under a point.
//!
//! All tests run in document space; the caller converts raw pointer input
//! first. Each element type has its own bounding-box rule: generous slop
//! bands for text-like elements where pointer precision is coarse, exact
//! boxes for images and the table where resize precision matters.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{
    FIELD_SLOP_ABOVE, FIELD_SLOP_BELOW, FIELD_SLOP_X, HANDLE_SIZE_PX, SIGNATURE_FIELD_WIDTH,
    SIGNATURE_SLOP_ABOVE, SIGNATURE_SLOP_BELOW, SIGNATURE_SLOP_X, TITLE_BAND_BELOW,
};
use crate::model::{ElementRef, Field, Image, SignatureBlock, SignatureField, Table, Template, Title};
use crate::viewport::{Point, Viewport};

/// An axis-aligned rectangle in document space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Corner of a resizable element's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Corner {
    /// All corners in handle draw/test order.
    pub const ALL: [Self; 4] = [Self::Nw, Self::Ne, Self::Sw, Self::Se];

    /// The corner's position on a bounding box.
    #[must_use]
    pub fn of(self, bounds: Rect) -> Point {
        match self {
            Self::Nw => Point::new(bounds.x, bounds.y),
            Self::Ne => Point::new(bounds.x + bounds.width, bounds.y),
            Self::Sw => Point::new(bounds.x, bounds.y + bounds.height),
            Self::Se => Point::new(bounds.x + bounds.width, bounds.y + bounds.height),
        }
    }
}

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    Handle(Corner),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub target: ElementRef,
    pub part: HitPart,
}

// =============================================================
// Per-type bounding boxes
// =============================================================

/// Field hit box: the label baseline plus a fixed tolerance band.
#[must_use]
pub fn field_bounds(field: &Field) -> Rect {
    Rect::new(
        field.position.x - FIELD_SLOP_X,
        field.position.y - FIELD_SLOP_ABOVE,
        field.line_length + 2.0 * FIELD_SLOP_X,
        FIELD_SLOP_ABOVE + FIELD_SLOP_BELOW,
    )
}

/// Image hit box: exact bounds, since resize precision matters here.
#[must_use]
pub fn image_bounds(image: &Image) -> Rect {
    Rect::new(image.position.x, image.position.y, image.width, image.height)
}

/// Table hit box: exact derived bounds.
#[must_use]
pub fn table_bounds(table: &Table) -> Rect {
    Rect::new(table.position.x, table.position.y, table.width(), table.height())
}

/// Title hit box: full page width, a band from `font_size * 1.2` above the
/// baseline to a fixed tolerance below it.
#[must_use]
pub fn title_bounds(title: &Title, page_width: f64) -> Rect {
    let above = title.font_size * 1.2;
    Rect::new(0.0, title.position.y - above, page_width, above + TITLE_BAND_BELOW)
}

/// Signature field hit box, positioned at `base + relative`.
#[must_use]
pub fn signature_field_bounds(block: &SignatureBlock, field: &SignatureField) -> Rect {
    let abs = block.absolute(field);
    Rect::new(
        abs.x - SIGNATURE_SLOP_X,
        abs.y - SIGNATURE_SLOP_ABOVE,
        SIGNATURE_FIELD_WIDTH + SIGNATURE_SLOP_X,
        SIGNATURE_SLOP_ABOVE + SIGNATURE_SLOP_BELOW,
    )
}

/// Document-space half-extent of a corner handle at the given zoom, so the
/// handle keeps a constant size on screen.
#[must_use]
pub fn handle_half_extent(viewport: &Viewport) -> f64 {
    viewport.screen_dist_to_doc(HANDLE_SIZE_PX)
}

fn handle_at(doc_pt: Point, bounds: Rect, half: f64) -> Option<Corner> {
    Corner::ALL.into_iter().find(|corner| {
        let c = corner.of(bounds);
        (doc_pt.x - c.x).abs() <= half && (doc_pt.y - c.y).abs() <= half
    })
}

// =============================================================
// Hit test
// =============================================================

/// Test which element is under `doc_pt`.
///
/// Priority on overlap, first match wins: resize handles of the currently
/// selected resizable element (image or table), then field boxes, image
/// boxes, the title band, the table body, and finally signature fields.
/// At most one hit is returned.
#[must_use]
pub fn hit_test(
    doc_pt: Point,
    template: &Template,
    viewport: &Viewport,
    selected: Option<ElementRef>,
) -> Option<Hit> {
    let half = handle_half_extent(viewport);

    // Handles of the selected resizable element come first so a resize grab
    // near another element's box is never misread as a selection change.
    match selected {
        Some(target @ ElementRef::Image(id)) => {
            if let Some(image) = template.image(id) {
                if let Some(corner) = handle_at(doc_pt, image_bounds(image), half) {
                    return Some(Hit { target, part: HitPart::Handle(corner) });
                }
            }
        }
        Some(target @ ElementRef::Table) if template.table.enabled => {
            if let Some(corner) = handle_at(doc_pt, table_bounds(&template.table), half) {
                return Some(Hit { target, part: HitPart::Handle(corner) });
            }
        }
        _ => {}
    }

    for field in &template.fields {
        if field_bounds(field).contains(doc_pt) {
            return Some(Hit { target: ElementRef::Field(field.id), part: HitPart::Body });
        }
    }

    for image in &template.images {
        if image_bounds(image).contains(doc_pt) {
            return Some(Hit { target: ElementRef::Image(image.id), part: HitPart::Body });
        }
    }

    if let Some(title) = &template.title {
        if title_bounds(title, template.page_width).contains(doc_pt) {
            return Some(Hit { target: ElementRef::Title, part: HitPart::Body });
        }
    }

    if template.table.enabled && table_bounds(&template.table).contains(doc_pt) {
        return Some(Hit { target: ElementRef::Table, part: HitPart::Body });
    }

    if template.signature.enabled {
        for field in &template.signature.fields {
            if signature_field_bounds(&template.signature, field).contains(doc_pt) {
                return Some(Hit {
                    target: ElementRef::SignatureField(field.id),
                    part: HitPart::Body,
                });
            }
        }
    }

    None
}
