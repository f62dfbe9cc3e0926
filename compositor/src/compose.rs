//! Template-driven page composition: stamp a template plus bound data onto
//! document pages.
//!
//! Template geometry is authored in editor space (origin top-left, y grows
//! downward); PDF content streams use origin bottom-left. The flip
//! `y' = page_height - y` happens here and only here, at the boundary
//! between the two spaces. Positions are in points on both sides, so no
//! scaling is involved.

#[cfg(test)]
#[path = "compose_test.rs"]
mod compose_test;

use std::collections::HashMap;

use editor::consts::{TABLE_HEADER_HEIGHT, TABLE_ROW_HEIGHT};
use editor::model::{Align, Field, SignatureBlock, Table, Template, Title};
use lopdf::content::Operation;
use lopdf::{Document, Object};
use serde::Deserialize;
use tracing::warn;

use crate::page::{self, FONT_NAME};
use crate::ComposeError;

/// Approximate glyph advance as a fraction of font size, for alignment of
/// built-in Helvetica without font metrics.
const GLYPH_WIDTH_RATIO: f64 = 0.6;

/// Vertical gap between a field baseline and its underline, matching the
/// editor preview.
const UNDERLINE_DROP: f64 = 3.0;

/// Bound values for one composition run.
///
/// `values` resolves each field's `binding_key`; `rows` fills the table
/// body in order, one inner vector per row, one string per column.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateData {
    #[serde(default)]
    pub values: HashMap<String, String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// Stamp the template with its bound data onto the given pages.
///
/// `pages` holds zero-based page indices; all are validated against the
/// document before any drawing, so a bad index leaves the document
/// untouched. A field whose binding key has no value renders its label over
/// an empty line (and logs the missing key); that is an authoring gap, not
/// a composition failure.
///
/// # Errors
///
/// [`ComposeError::PageOutOfRange`] for a bad page index,
/// [`ComposeError::InvalidColor`] for an unparseable color in the template,
/// [`ComposeError::Pdf`] if a content stream cannot be rewritten.
pub fn apply_template(
    doc: &mut Document,
    template: &Template,
    data: &TemplateData,
    pages: &[u32],
) -> Result<(), ComposeError> {
    for index in pages {
        page::page_id_for_index(doc, *index)?;
    }
    validate_colors(template)?;

    for index in pages {
        let page_id = page::page_id_for_index(doc, *index)?;
        page::ensure_font(doc, page_id)?;
        let ops = template_operations(template, data)?;
        page::append_operations(doc, page_id, ops)?;
    }
    Ok(())
}

/// Check every color the template carries before any page is mutated.
fn validate_colors(template: &Template) -> Result<(), ComposeError> {
    if let Some(title) = &template.title {
        page::parse_color(&title.color)?;
    }
    if template.table.enabled {
        page::parse_color(&template.table.header_style.text_color)?;
        page::parse_color(&template.table.row_style.text_color)?;
    }
    Ok(())
}

fn template_operations(
    template: &Template,
    data: &TemplateData,
) -> Result<Vec<Operation>, ComposeError> {
    let page_h = template.page_height;
    let mut ops = Vec::new();

    if let Some(title) = &template.title {
        draw_title(&mut ops, title, page_h)?;
    }
    for field in &template.fields {
        draw_field(&mut ops, field, data, page_h);
    }
    if template.table.enabled {
        draw_table(&mut ops, &template.table, data, page_h)?;
    }
    if template.signature.enabled {
        draw_signature(&mut ops, &template.signature, page_h);
    }
    Ok(ops)
}

fn draw_title(ops: &mut Vec<Operation>, title: &Title, page_h: f64) -> Result<(), ComposeError> {
    let color = page::parse_color(&title.color)?;
    let x = aligned_x(title.position.x, &title.text, title.font_size, title.align);
    text_op(ops, &title.text, x, page_h - title.position.y, title.font_size, color);
    Ok(())
}

fn draw_field(ops: &mut Vec<Operation>, field: &Field, data: &TemplateData, page_h: f64) {
    let value = data.values.get(&field.binding_key).cloned().unwrap_or_else(|| {
        warn!(binding_key = %field.binding_key, "no bound value for field");
        String::new()
    });
    let text = if value.is_empty() {
        field.label.clone()
    } else {
        format!("{}: {}", field.label, value)
    };
    let y = page_h - field.position.y;
    text_op(ops, &text, field.position.x, y, field.font_size, (0.0, 0.0, 0.0));

    if field.show_line {
        let line_y = page_h - (field.position.y + UNDERLINE_DROP);
        line_op(ops, field.position.x, line_y, field.position.x + field.line_length, line_y);
    }
}

fn draw_table(
    ops: &mut Vec<Operation>,
    table: &Table,
    data: &TemplateData,
    page_h: f64,
) -> Result<(), ComposeError> {
    let header_color = page::parse_color(&table.header_style.text_color)?;
    let row_color = page::parse_color(&table.row_style.text_color)?;
    let top = table.position.y;
    let width = table.width();
    let height = table.height();

    // Outline and header separator.
    rect_op(ops, table.position.x, page_h - top - height, width, height);
    let header_bottom = page_h - (top + TABLE_HEADER_HEIGHT);
    line_op(ops, table.position.x, header_bottom, table.position.x + width, header_bottom);

    // Column separators and header labels.
    let mut cx = table.position.x;
    for column in &table.columns {
        text_op(
            ops,
            &column.name,
            cx + 4.0,
            page_h - (top + TABLE_HEADER_HEIGHT - 7.0),
            table.header_style.font_size,
            header_color,
        );
        cx += column.width;
        if cx < table.position.x + width {
            line_op(ops, cx, page_h - top - height, cx, page_h - top);
        }
    }

    // Body rows from the bound data, cropped to the configured row count.
    let row_count = usize::try_from(table.row_count).unwrap_or(usize::MAX);
    for (row_idx, row) in data.rows.iter().take(row_count).enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let row_top = top + TABLE_HEADER_HEIGHT + row_idx as f64 * TABLE_ROW_HEIGHT;
        let baseline = page_h - (row_top + TABLE_ROW_HEIGHT - 6.0);
        let mut cx = table.position.x;
        for (cell, column) in row.iter().zip(&table.columns) {
            text_op(ops, cell, cx + 4.0, baseline, table.row_style.font_size, row_color);
            cx += column.width;
        }
        // Rule under this row (the outline already closes the last one).
        if row_idx + 1 < row_count {
            let rule_y = page_h - (row_top + TABLE_ROW_HEIGHT);
            line_op(ops, table.position.x, rule_y, table.position.x + width, rule_y);
        }
    }
    Ok(())
}

fn draw_signature(ops: &mut Vec<Operation>, block: &SignatureBlock, page_h: f64) {
    for field in &block.fields {
        let abs = block.absolute(field);
        let y = page_h - abs.y;
        line_op(ops, abs.x, y, abs.x + 150.0, y);
        text_op(ops, &field.label, abs.x, page_h - (abs.y + 14.0), 10.0, (0.0, 0.0, 0.0));
    }
}

// --- Operation helpers ---

fn text_op(ops: &mut Vec<Operation>, text: &str, x: f64, y: f64, size: f64, rgb: (f64, f64, f64)) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![FONT_NAME.into(), size.into()]));
    ops.push(Operation::new("rg", vec![rgb.0.into(), rgb.1.into(), rgb.2.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
    ops.push(Operation::new("ET", vec![]));
}

fn line_op(ops: &mut Vec<Operation>, x1: f64, y1: f64, x2: f64, y2: f64) {
    ops.push(Operation::new("w", vec![1.0.into()]));
    ops.push(Operation::new("m", vec![x1.into(), y1.into()]));
    ops.push(Operation::new("l", vec![x2.into(), y2.into()]));
    ops.push(Operation::new("S", vec![]));
}

fn rect_op(ops: &mut Vec<Operation>, x: f64, y: f64, width: f64, height: f64) {
    ops.push(Operation::new("w", vec![1.0.into()]));
    ops.push(Operation::new("re", vec![x.into(), y.into(), width.into(), height.into()]));
    ops.push(Operation::new("S", vec![]));
}

/// Anchor-relative x for the given alignment, using an approximate text
/// width (built-in fonts ship no metrics here).
fn aligned_x(anchor: f64, text: &str, font_size: f64, align: Align) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let est_width = text.chars().count() as f64 * font_size * GLYPH_WIDTH_RATIO;
    match align {
        Align::Left => anchor,
        Align::Center => anchor - est_width / 2.0,
        Align::Right => anchor - est_width,
    }
}
