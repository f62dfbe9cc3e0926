//! Shared numeric constants for the editor crate.

// ── Page geometry ───────────────────────────────────────────────

/// Default page width in document points (A4 portrait).
pub const PAGE_WIDTH: f64 = 595.0;

/// Default page height in document points (A4 portrait).
pub const PAGE_HEIGHT: f64 = 842.0;

/// Default preview scale chosen to fit an A4 page into the editor viewport.
pub const DEFAULT_SCALE: f64 = 0.8;

// ── Element limits ──────────────────────────────────────────────

/// Minimum width/height of a resizable element, in document points.
pub const MIN_ELEMENT_SIZE: f64 = 20.0;

/// Minimum width of a single table column after a proportional rescale.
pub const MIN_COLUMN_WIDTH: f64 = 20.0;

/// Height of the table header band in document points.
pub const TABLE_HEADER_HEIGHT: f64 = 24.0;

/// Height of one table body row in document points.
pub const TABLE_ROW_HEIGHT: f64 = 20.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space half-extent in pixels for corner resize handles.
pub const HANDLE_SIZE_PX: f64 = 8.0;

/// Horizontal hit slop around a field's label/line band.
pub const FIELD_SLOP_X: f64 = 5.0;

/// Vertical hit slop above a field baseline.
pub const FIELD_SLOP_ABOVE: f64 = 15.0;

/// Vertical hit slop below a field baseline.
pub const FIELD_SLOP_BELOW: f64 = 20.0;

/// Vertical band below the title baseline that still counts as a title hit.
pub const TITLE_BAND_BELOW: f64 = 10.0;

/// Hit-box width of one signature field, in document points.
pub const SIGNATURE_FIELD_WIDTH: f64 = 200.0;

/// Horizontal hit slop around a signature field.
pub const SIGNATURE_SLOP_X: f64 = 5.0;

/// Vertical hit slop above a signature field baseline.
pub const SIGNATURE_SLOP_ABOVE: f64 = 10.0;

/// Vertical hit slop below a signature field baseline.
pub const SIGNATURE_SLOP_BELOW: f64 = 15.0;
