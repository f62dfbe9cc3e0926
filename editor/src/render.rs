//! Preview rendering: turns a template into an ordered list of draw commands.
//!
//! The renderer is a pure function of model + selection + viewport + image
//! cache: identical inputs produce an identical command sequence, which is
//! what makes preview output testable without a drawing backend. Commands
//! are emitted in screen space; all geometry is converted from document
//! space immediately before emission and never stored.
//!
//! Image content is asynchronous: a reference whose bytes have not arrived
//! yet (or failed to resolve) draws as a dashed placeholder box with a
//! neutral glyph, and the reference is reported in `image_requests` so the
//! host can ask the content service for it. A broken reference never aborts
//! the render.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashMap;

use crate::consts::{HANDLE_SIZE_PX, SIGNATURE_FIELD_WIDTH, TABLE_HEADER_HEIGHT, TABLE_ROW_HEIGHT};
use crate::hit::{self, Corner, Rect};
use crate::model::{Align, ElementRef, Template};
use crate::viewport::Viewport;

/// Selection accent color, shared by borders and handles.
const SELECTION_COLOR: &str = "#1E90FF";

/// Dash segment length for guides and placeholders, in screen pixels.
const DASH_PX: f64 = 4.0;

/// Vertical gap between a field baseline and its underline.
const UNDERLINE_DROP: f64 = 3.0;

/// Glyph drawn in the center of an image placeholder box.
const PLACEHOLDER_GLYPH: char = '\u{25a1}';

// =============================================================
// Image cache
// =============================================================

/// Resolution state of one image reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageState {
    /// A content request is in flight.
    Pending,
    /// Bytes arrived; intrinsic size in pixels.
    Ready { width: f64, height: f64 },
    /// The content service could not resolve the reference.
    Failed,
}

/// Cache of image content keyed by the canonical reference string.
///
/// The store never fetches anything itself; the host drives resolution via
/// the external content service and reports results back. An entry that
/// becomes irrelevant (element removed) is simply never read again.
#[derive(Debug, Default)]
pub struct ImageStore {
    entries: HashMap<String, ImageState>,
}

impl ImageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a reference, if any request was ever recorded.
    #[must_use]
    pub fn state(&self, key: &str) -> Option<ImageState> {
        self.entries.get(key).copied()
    }

    /// Record that a request has been issued. Returns `false` if the key was
    /// already tracked (no duplicate fetch should be issued).
    pub fn mark_pending(&mut self, key: &str) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(key.to_owned(), ImageState::Pending);
        true
    }

    /// Record resolved content with its intrinsic size.
    pub fn mark_ready(&mut self, key: &str, width: f64, height: f64) {
        self.entries.insert(key.to_owned(), ImageState::Ready { width, height });
    }

    /// Record a failed resolution; the element keeps its placeholder.
    pub fn mark_failed(&mut self, key: &str) {
        self.entries.insert(key.to_owned(), ImageState::Failed);
    }
}

// =============================================================
// Draw commands
// =============================================================

/// One backend-neutral draw call, in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<String>,
        stroke: Option<String>,
        line_width: f64,
    },
    DashedRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        stroke: String,
        line_width: f64,
        dash: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: String,
        line_width: f64,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        size: f64,
        family: String,
        align: Align,
        color: String,
    },
    /// Draw resolved image content identified by its cache key.
    Image {
        key: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// Dashed box with a neutral glyph for unresolved image content.
    Placeholder {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        glyph: char,
    },
    /// Square resize handle at fixed screen size, centered on (x, y).
    Handle { x: f64, y: f64, size: f64 },
}

/// Result of one render pass.
#[derive(Debug, Default)]
pub struct RenderOutput {
    /// Ordered draw calls for the scaled preview surface.
    pub commands: Vec<DrawCmd>,
    /// Image references that have no cache entry yet, deduplicated, in
    /// first-appearance order. The host should issue one content request
    /// per key and report back via the store.
    pub image_requests: Vec<String>,
}

// =============================================================
// Render
// =============================================================

/// Render the template to a draw-command list.
///
/// Layering: page background, margin guide, elements (title, fields,
/// images, table, signature block), then the selection affordance on top.
#[must_use]
pub fn render(
    template: &Template,
    selection: Option<ElementRef>,
    viewport: &Viewport,
    images: &ImageStore,
) -> RenderOutput {
    let mut out = RenderOutput::default();

    draw_page(&mut out, template, viewport);
    draw_title(&mut out, template, viewport);
    draw_fields(&mut out, template, viewport);
    draw_images(&mut out, template, viewport, images);
    draw_table(&mut out, template, viewport);
    draw_signature(&mut out, template, viewport);
    draw_selection(&mut out, template, selection, viewport);

    out
}

fn draw_page(out: &mut RenderOutput, template: &Template, viewport: &Viewport) {
    let s = viewport.scale;
    out.commands.push(DrawCmd::Rect {
        x: 0.0,
        y: 0.0,
        width: template.page_width * s,
        height: template.page_height * s,
        fill: Some("#FFFFFF".to_owned()),
        stroke: Some("#B0B0B0".to_owned()),
        line_width: 1.0,
    });

    let m = template.margins;
    out.commands.push(DrawCmd::DashedRect {
        x: m.left * s,
        y: m.top * s,
        width: (template.page_width - m.left - m.right) * s,
        height: (template.page_height - m.top - m.bottom) * s,
        stroke: "#D0D0D0".to_owned(),
        line_width: 1.0,
        dash: DASH_PX,
    });
}

fn draw_title(out: &mut RenderOutput, template: &Template, viewport: &Viewport) {
    let Some(title) = &template.title else {
        return;
    };
    let p = viewport.doc_to_screen(title.position);
    out.commands.push(DrawCmd::Text {
        text: title.text.clone(),
        x: p.x,
        y: p.y,
        size: title.font_size * viewport.scale,
        family: title.font_family.clone(),
        align: title.align,
        color: title.color.clone(),
    });
}

fn draw_fields(out: &mut RenderOutput, template: &Template, viewport: &Viewport) {
    for field in &template.fields {
        let p = viewport.doc_to_screen(field.position);
        out.commands.push(DrawCmd::Text {
            text: field.label.clone(),
            x: p.x,
            y: p.y,
            size: field.font_size * viewport.scale,
            family: field.font_family.clone(),
            align: Align::Left,
            color: "#000000".to_owned(),
        });
        if field.show_line {
            let y = (field.position.y + UNDERLINE_DROP) * viewport.scale;
            out.commands.push(DrawCmd::Line {
                x1: p.x,
                y1: y,
                x2: (field.position.x + field.line_length) * viewport.scale,
                y2: y,
                stroke: "#000000".to_owned(),
                line_width: 1.0,
            });
        }
    }
}

fn draw_images(out: &mut RenderOutput, template: &Template, viewport: &Viewport, images: &ImageStore) {
    for image in &template.images {
        let p = viewport.doc_to_screen(image.position);
        let w = image.width * viewport.scale;
        let h = image.height * viewport.scale;

        match images.state(&image.path) {
            Some(ImageState::Ready { .. }) => {
                out.commands.push(DrawCmd::Image {
                    key: image.path.clone(),
                    x: p.x,
                    y: p.y,
                    width: w,
                    height: h,
                });
            }
            Some(ImageState::Pending | ImageState::Failed) => {
                out.commands.push(DrawCmd::Placeholder {
                    x: p.x,
                    y: p.y,
                    width: w,
                    height: h,
                    glyph: PLACEHOLDER_GLYPH,
                });
            }
            None => {
                out.commands.push(DrawCmd::Placeholder {
                    x: p.x,
                    y: p.y,
                    width: w,
                    height: h,
                    glyph: PLACEHOLDER_GLYPH,
                });
                if !image.path.is_empty() && !out.image_requests.iter().any(|k| k == &image.path) {
                    out.image_requests.push(image.path.clone());
                }
            }
        }
    }
}

fn draw_table(out: &mut RenderOutput, template: &Template, viewport: &Viewport) {
    let table = &template.table;
    if !table.enabled {
        return;
    }
    let s = viewport.scale;
    let origin = viewport.doc_to_screen(table.position);
    let width = table.width() * s;
    let height = table.height() * s;
    let header_h = TABLE_HEADER_HEIGHT * s;

    // Header band beneath the grid lines.
    if let Some(fill) = &table.header_style.fill {
        out.commands.push(DrawCmd::Rect {
            x: origin.x,
            y: origin.y,
            width,
            height: header_h,
            fill: Some(fill.clone()),
            stroke: None,
            line_width: 0.0,
        });
    }

    out.commands.push(DrawCmd::Rect {
        x: origin.x,
        y: origin.y,
        width,
        height,
        fill: None,
        stroke: Some("#000000".to_owned()),
        line_width: 1.0,
    });

    // Column separators and header labels.
    let mut cx = table.position.x;
    for column in &table.columns {
        out.commands.push(DrawCmd::Text {
            text: column.name.clone(),
            x: (cx + 4.0) * s,
            y: (table.position.y + TABLE_HEADER_HEIGHT - 7.0) * s,
            size: table.header_style.font_size * s,
            family: "Helvetica".to_owned(),
            align: column.align,
            color: table.header_style.text_color.clone(),
        });
        cx += column.width;
        if cx < table.position.x + table.width() {
            out.commands.push(DrawCmd::Line {
                x1: cx * s,
                y1: origin.y,
                x2: cx * s,
                y2: origin.y + height,
                stroke: "#000000".to_owned(),
                line_width: 1.0,
            });
        }
    }

    // Horizontal rules: header separator plus one per body row boundary.
    for row in 0..table.row_count {
        let y = (table.position.y + TABLE_HEADER_HEIGHT + f64::from(row) * TABLE_ROW_HEIGHT) * s;
        out.commands.push(DrawCmd::Line {
            x1: origin.x,
            y1: y,
            x2: origin.x + width,
            y2: y,
            stroke: "#000000".to_owned(),
            line_width: 1.0,
        });
    }
}

fn draw_signature(out: &mut RenderOutput, template: &Template, viewport: &Viewport) {
    let block = &template.signature;
    if !block.enabled {
        return;
    }
    let s = viewport.scale;
    for field in &block.fields {
        let abs = block.absolute(field);
        out.commands.push(DrawCmd::Line {
            x1: abs.x * s,
            y1: abs.y * s,
            x2: (abs.x + SIGNATURE_FIELD_WIDTH * 0.75) * s,
            y2: abs.y * s,
            stroke: "#000000".to_owned(),
            line_width: 1.0,
        });
        out.commands.push(DrawCmd::Text {
            text: field.label.clone(),
            x: abs.x * s,
            y: (abs.y + 14.0) * s,
            size: 10.0 * s,
            family: "Helvetica".to_owned(),
            align: Align::Left,
            color: "#000000".to_owned(),
        });
    }
}

fn draw_selection(
    out: &mut RenderOutput,
    template: &Template,
    selection: Option<ElementRef>,
    viewport: &Viewport,
) {
    let Some(target) = selection else {
        return;
    };

    let (bounds, resizable) = match target {
        ElementRef::Title => match &template.title {
            Some(title) => (hit::title_bounds(title, template.page_width), false),
            None => return,
        },
        ElementRef::Field(id) => match template.field(id) {
            Some(field) => (hit::field_bounds(field), false),
            None => return,
        },
        ElementRef::Image(id) => match template.image(id) {
            Some(image) => (hit::image_bounds(image), true),
            None => return,
        },
        ElementRef::Table => {
            if !template.table.enabled {
                return;
            }
            (hit::table_bounds(&template.table), true)
        }
        ElementRef::SignatureField(id) => {
            if !template.signature.enabled {
                return;
            }
            match template.signature_field(id) {
                Some(field) => (hit::signature_field_bounds(&template.signature, field), false),
                None => return,
            }
        }
    };

    let s = viewport.scale;
    out.commands.push(DrawCmd::DashedRect {
        x: bounds.x * s,
        y: bounds.y * s,
        width: bounds.width * s,
        height: bounds.height * s,
        stroke: SELECTION_COLOR.to_owned(),
        line_width: 1.0,
        dash: DASH_PX,
    });

    if resizable {
        // Handles are emitted at fixed screen size regardless of zoom.
        for corner in Corner::ALL {
            let c = corner.of(Rect::new(bounds.x, bounds.y, bounds.width, bounds.height));
            let p = viewport.doc_to_screen(c);
            out.commands.push(DrawCmd::Handle { x: p.x, y: p.y, size: HANDLE_SIZE_PX * 2.0 });
        }
    }
}
