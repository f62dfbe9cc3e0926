//! Top-level editor engine: owns the template and runs the gesture loop.
//!
//! [`EditorCore`] is constructed per editing session by the host UI; there is
//! no process-wide editor state. Pointer handlers consume screen-space input,
//! convert it to document space, and return a list of [`Action`]s for the
//! host to process (redraw, persist, cursor change). All mutation happens in
//! place on the owned [`Template`]; failed operations leave it untouched.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use serde_json::Value;

use crate::consts::{MIN_COLUMN_WIDTH, MIN_ELEMENT_SIZE, TABLE_HEADER_HEIGHT, TABLE_ROW_HEIGHT};
use crate::hit::{self, Corner, Hit, HitPart, Rect};
use crate::input::{Cursor, InputState, UiState};
use crate::model::{Align, ElementKind, ElementRef, Template};
use crate::render::{self, ImageStore, RenderOutput};
use crate::viewport::{Point, Viewport};

/// Actions returned from engine calls for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The selection changed; properties panels should refresh.
    SelectionChanged(Option<ElementRef>),
    /// The template was mutated; hosts that autosave should persist.
    TemplateChanged,
    /// The preview surface must be redrawn.
    RenderNeeded,
    /// The pointer cursor affordance changed.
    SetCursor(Cursor),
}

/// Error returned by fallible host commands. Every failure is a no-op on
/// the model.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// The element reference does not resolve to a live element.
    #[error("unknown element reference")]
    UnknownElement,
    /// The operation needs an element that is present but not enabled.
    #[error("element is not enabled")]
    ElementDisabled,
    /// The property key is not defined for the target element type.
    #[error("unknown property `{0}`")]
    UnknownProperty(String),
    /// The value has the wrong type or is not a finite number.
    #[error("invalid value for property `{0}`")]
    InvalidValue(String),
    /// Template (de)serialization failed.
    #[error("template serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Core editing engine for one session.
pub struct EditorCore {
    pub template: Template,
    pub viewport: Viewport,
    pub ui: UiState,
    pub input: InputState,
    pub images: ImageStore,
    /// Set on pointer-up after a drag or resize so the click event the
    /// browser synthesizes right after is not misread as a new selection.
    suppress_click: bool,
}

impl Default for EditorCore {
    fn default() -> Self {
        Self {
            template: Template::new(),
            viewport: Viewport::default(),
            ui: UiState::default(),
            input: InputState::default(),
            images: ImageStore::new(),
            suppress_click: false,
        }
    }
}

impl EditorCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session on an existing template (loaded from persistence).
    #[must_use]
    pub fn with_template(template: Template) -> Self {
        Self { template, ..Self::default() }
    }

    // --- Queries ---

    /// The currently selected element, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ElementRef> {
        self.ui.selected
    }

    // --- Pointer events ---

    /// Pointer pressed on the preview surface.
    ///
    /// A body hit starts a drag and selects the element; a handle hit on
    /// the selected element starts a resize; a miss clears the selection.
    pub fn on_pointer_down(&mut self, screen_pt: Point) -> Vec<Action> {
        let Some(doc_pt) = self.to_doc(screen_pt) else {
            return Vec::new();
        };
        let mut actions = Vec::new();

        match hit::hit_test(doc_pt, &self.template, &self.viewport, self.ui.selected) {
            Some(Hit { target, part: HitPart::Handle(corner) }) => {
                if let Some(orig) = self.element_bounds(target) {
                    self.input = InputState::Resizing { target, corner, orig };
                    self.set_cursor(Cursor::for_corner(corner), &mut actions);
                }
            }
            Some(Hit { target, part: HitPart::Body }) => {
                if let Some(origin) = self.element_origin(target) {
                    let offset = Point::new(doc_pt.x - origin.x, doc_pt.y - origin.y);
                    self.input = InputState::Dragging { target, offset };
                    if self.ui.selected != Some(target) {
                        self.ui.selected = Some(target);
                        actions.push(Action::SelectionChanged(Some(target)));
                        actions.push(Action::RenderNeeded);
                    }
                    self.set_cursor(Cursor::Grabbing, &mut actions);
                }
            }
            None => {
                if self.ui.selected.is_some() {
                    self.ui.selected = None;
                    actions.push(Action::SelectionChanged(None));
                    actions.push(Action::RenderNeeded);
                }
            }
        }
        actions
    }

    /// Pointer moved. Advances the active drag/resize or, when idle,
    /// updates the hover cursor.
    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        let Some(doc_pt) = self.to_doc(screen_pt) else {
            return Vec::new();
        };
        let mut actions = Vec::new();

        match self.input {
            InputState::Idle => {
                let cursor =
                    match hit::hit_test(doc_pt, &self.template, &self.viewport, self.ui.selected) {
                        Some(Hit { part: HitPart::Handle(corner), .. }) => {
                            Cursor::for_corner(corner)
                        }
                        Some(Hit { part: HitPart::Body, .. }) => Cursor::Grab,
                        None => Cursor::Default,
                    };
                self.set_cursor(cursor, &mut actions);
            }
            InputState::Dragging { target, offset } => {
                let origin = Point::new(doc_pt.x - offset.x, doc_pt.y - offset.y);
                self.move_element(target, origin);
                actions.push(Action::RenderNeeded);
            }
            InputState::Resizing { target, corner, orig } => {
                self.resize_element(target, corner, orig, doc_pt);
                actions.push(Action::RenderNeeded);
            }
        }
        actions
    }

    /// Pointer released: commits the active gesture. Geometry was already
    /// mutated in place on each move, so this only resets the state machine
    /// and arms the click-suppression window.
    pub fn on_pointer_up(&mut self, _screen_pt: Point) -> Vec<Action> {
        if self.input == InputState::Idle {
            return Vec::new();
        }
        self.input = InputState::Idle;
        self.suppress_click = true;
        let mut actions = vec![Action::TemplateChanged, Action::RenderNeeded];
        self.set_cursor(Cursor::Default, &mut actions);
        actions
    }

    /// Click event from the host. Swallowed when it directly follows a
    /// drag/resize release; otherwise behaves as a plain selection.
    pub fn on_click(&mut self, screen_pt: Point) -> Vec<Action> {
        if self.suppress_click {
            self.suppress_click = false;
            return Vec::new();
        }
        let Some(doc_pt) = self.to_doc(screen_pt) else {
            return Vec::new();
        };
        let target = hit::hit_test(doc_pt, &self.template, &self.viewport, self.ui.selected)
            .map(|hit| hit.target);
        let mut actions = Vec::new();
        if self.ui.selected != target {
            self.ui.selected = target;
            actions.push(Action::SelectionChanged(target));
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    // --- Host commands ---

    /// Select an element explicitly (e.g. from an element list panel).
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownElement`] if the reference does not
    /// resolve; the previous selection is kept.
    pub fn select_element(&mut self, target: Option<ElementRef>) -> Result<Vec<Action>, EditorError> {
        if let Some(target) = target {
            if !self.template.contains(target) {
                return Err(EditorError::UnknownElement);
            }
        }
        let mut actions = Vec::new();
        if self.ui.selected != target {
            self.ui.selected = target;
            actions.push(Action::SelectionChanged(target));
            actions.push(Action::RenderNeeded);
        }
        Ok(actions)
    }

    /// Add an element of the given kind with default geometry and select it.
    pub fn add_element(&mut self, kind: ElementKind) -> (ElementRef, Vec<Action>) {
        let target = self.template.add_element(kind);
        self.ui.selected = Some(target);
        let actions = vec![
            Action::TemplateChanged,
            Action::SelectionChanged(Some(target)),
            Action::RenderNeeded,
        ];
        (target, actions)
    }

    /// Remove an element. Clears the selection if it pointed at the removed
    /// element.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownElement`] if nothing was removed.
    pub fn remove_element(&mut self, target: ElementRef) -> Result<Vec<Action>, EditorError> {
        if !self.template.remove_element(target) {
            return Err(EditorError::UnknownElement);
        }
        let mut actions = vec![Action::TemplateChanged, Action::RenderNeeded];
        if self.ui.selected == Some(target) {
            self.ui.selected = None;
            actions.push(Action::SelectionChanged(None));
        }
        Ok(actions)
    }

    /// Update one named property on an element from a JSON value.
    ///
    /// Numeric inputs must be finite; positions are clamped to the page and
    /// sizes to their minimums, so malformed geometry never reaches the
    /// model.
    ///
    /// # Errors
    ///
    /// [`EditorError::UnknownElement`] for a dead reference,
    /// [`EditorError::ElementDisabled`] for the disabled table,
    /// [`EditorError::UnknownProperty`] / [`EditorError::InvalidValue`] for
    /// bad keys or values. All failures leave the previous value intact.
    pub fn update_property(
        &mut self,
        target: ElementRef,
        key: &str,
        value: &Value,
    ) -> Result<Vec<Action>, EditorError> {
        let page_w = self.template.page_width;
        let page_h = self.template.page_height;

        match target {
            ElementRef::Title => {
                let title = self.template.title.as_mut().ok_or(EditorError::UnknownElement)?;
                match key {
                    "text" => title.text = string_value(key, value)?,
                    "font_family" => title.font_family = string_value(key, value)?,
                    "color" => title.color = string_value(key, value)?,
                    "x" => title.position.x = bounded(num_value(key, value)?, 0.0, page_w),
                    "y" => title.position.y = bounded(num_value(key, value)?, 0.0, page_h),
                    "font_size" => title.font_size = bounded(num_value(key, value)?, 4.0, 144.0),
                    "align" => title.align = align_value(key, value)?,
                    _ => return Err(EditorError::UnknownProperty(key.to_owned())),
                }
            }
            ElementRef::Field(id) => {
                let field = self.template.field_mut(id).ok_or(EditorError::UnknownElement)?;
                match key {
                    "label" => field.label = string_value(key, value)?,
                    "binding_key" => field.binding_key = string_value(key, value)?,
                    "font_family" => field.font_family = string_value(key, value)?,
                    "x" => field.position.x = bounded(num_value(key, value)?, 0.0, page_w),
                    "y" => field.position.y = bounded(num_value(key, value)?, 0.0, page_h),
                    "font_size" => field.font_size = bounded(num_value(key, value)?, 4.0, 144.0),
                    "show_line" => field.show_line = bool_value(key, value)?,
                    "line_length" => {
                        field.line_length =
                            bounded(num_value(key, value)?, MIN_ELEMENT_SIZE, page_w);
                    }
                    _ => return Err(EditorError::UnknownProperty(key.to_owned())),
                }
            }
            ElementRef::Image(id) => {
                let image = self.template.image_mut(id).ok_or(EditorError::UnknownElement)?;
                match key {
                    "path" => image.path = string_value(key, value)?,
                    "x" => {
                        image.position.x =
                            bounded(num_value(key, value)?, 0.0, page_w - image.width);
                    }
                    "y" => {
                        image.position.y =
                            bounded(num_value(key, value)?, 0.0, page_h - image.height);
                    }
                    "width" => {
                        image.width = bounded(
                            num_value(key, value)?,
                            MIN_ELEMENT_SIZE,
                            page_w - image.position.x,
                        );
                    }
                    "height" => {
                        image.height = bounded(
                            num_value(key, value)?,
                            MIN_ELEMENT_SIZE,
                            page_h - image.position.y,
                        );
                    }
                    _ => return Err(EditorError::UnknownProperty(key.to_owned())),
                }
            }
            ElementRef::Table => {
                if key == "enabled" {
                    self.template.table.enabled = bool_value(key, value)?;
                } else {
                    if !self.template.table.enabled {
                        return Err(EditorError::ElementDisabled);
                    }
                    let table = &mut self.template.table;
                    match key {
                        "x" => {
                            let extent = table.width();
                            table.position.x =
                                bounded(num_value(key, value)?, 0.0, page_w - extent);
                        }
                        "y" => {
                            let extent = table.height();
                            table.position.y =
                                bounded(num_value(key, value)?, 0.0, page_h - extent);
                        }
                        "row_count" => {
                            let n = value
                                .as_u64()
                                .ok_or_else(|| EditorError::InvalidValue(key.to_owned()))?;
                            table.row_count =
                                u32::try_from(n.max(1)).map_err(|_| {
                                    EditorError::InvalidValue(key.to_owned())
                                })?;
                        }
                        _ => return Err(EditorError::UnknownProperty(key.to_owned())),
                    }
                }
            }
            ElementRef::SignatureField(id) => {
                if !self.template.signature.enabled {
                    return Err(EditorError::ElementDisabled);
                }
                let base = self.template.signature.base_position;
                let field = self
                    .template
                    .signature_field_mut(id)
                    .ok_or(EditorError::UnknownElement)?;
                match key {
                    "label" => field.label = string_value(key, value)?,
                    "x" => {
                        let abs = bounded(base.x + num_value(key, value)?, 0.0, page_w);
                        field.relative_position.x = abs - base.x;
                    }
                    "y" => {
                        let abs = bounded(base.y + num_value(key, value)?, 0.0, page_h);
                        field.relative_position.y = abs - base.y;
                    }
                    _ => return Err(EditorError::UnknownProperty(key.to_owned())),
                }
            }
        }
        Ok(vec![Action::TemplateChanged, Action::RenderNeeded])
    }

    /// Serialize the template to JSON for persistence.
    ///
    /// # Errors
    ///
    /// Propagates serializer failure.
    pub fn export_template(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(&self.template)?)
    }

    /// Replace the session's template from persisted JSON. Resets selection
    /// and any in-flight gesture.
    ///
    /// # Errors
    ///
    /// Propagates deserialization failure; the current template is kept.
    pub fn import_template(&mut self, json: &str) -> Result<Vec<Action>, EditorError> {
        let template: Template = serde_json::from_str(json)?;
        self.template = template;
        self.ui.selected = None;
        self.input = InputState::Idle;
        Ok(vec![Action::SelectionChanged(None), Action::RenderNeeded])
    }

    /// Render the preview, recording content requests for images whose
    /// bytes have not been asked for yet.
    pub fn preview_render(&mut self) -> RenderOutput {
        let out = render::render(&self.template, self.ui.selected, &self.viewport, &self.images);
        for key in &out.image_requests {
            self.images.mark_pending(key);
        }
        out
    }

    /// Image content arrived from the content service.
    pub fn notify_image_ready(&mut self, key: &str, width: f64, height: f64) -> Vec<Action> {
        self.images.mark_ready(key, width, height);
        vec![Action::RenderNeeded]
    }

    /// Image content resolution failed; the placeholder stays.
    pub fn notify_image_failed(&mut self, key: &str) -> Vec<Action> {
        self.images.mark_failed(key);
        vec![Action::RenderNeeded]
    }

    // --- Geometry ---

    /// Origin of an element in document space. For a signature field this
    /// is the absolute position (`base + relative`).
    #[must_use]
    pub fn element_origin(&self, target: ElementRef) -> Option<Point> {
        match target {
            ElementRef::Title => self.template.title.as_ref().map(|t| t.position),
            ElementRef::Field(id) => self.template.field(id).map(|f| f.position),
            ElementRef::Image(id) => self.template.image(id).map(|i| i.position),
            ElementRef::Table => self.template.table.enabled.then_some(self.template.table.position),
            ElementRef::SignatureField(id) => self
                .template
                .signature_field(id)
                .map(|f| self.template.signature.absolute(f)),
        }
    }

    /// Exact bounds of a resizable element; `None` for other targets.
    fn element_bounds(&self, target: ElementRef) -> Option<Rect> {
        match target {
            ElementRef::Image(id) => self.template.image(id).map(hit::image_bounds),
            ElementRef::Table => {
                self.template.table.enabled.then(|| hit::table_bounds(&self.template.table))
            }
            _ => None,
        }
    }

    /// Extent used to keep a dragged element's box on the page.
    fn element_extent(&self, target: ElementRef) -> (f64, f64) {
        match target {
            ElementRef::Field(id) => self
                .template
                .field(id)
                .map_or((0.0, 0.0), |f| (f.line_length, 0.0)),
            ElementRef::Image(id) => self
                .template
                .image(id)
                .map_or((0.0, 0.0), |i| (i.width, i.height)),
            ElementRef::Table => {
                (self.template.table.width(), self.template.table.height())
            }
            ElementRef::Title | ElementRef::SignatureField(_) => (0.0, 0.0),
        }
    }

    /// Move an element's origin, clamping each axis to the page.
    fn move_element(&mut self, target: ElementRef, origin: Point) {
        if !origin.x.is_finite() || !origin.y.is_finite() {
            return;
        }
        let (ew, eh) = self.element_extent(target);
        let clamped = Point::new(
            bounded(origin.x, 0.0, self.template.page_width - ew),
            bounded(origin.y, 0.0, self.template.page_height - eh),
        );
        match target {
            ElementRef::Title => {
                if let Some(title) = self.template.title.as_mut() {
                    title.position = clamped;
                }
            }
            ElementRef::Field(id) => {
                if let Some(field) = self.template.field_mut(id) {
                    field.position = clamped;
                }
            }
            ElementRef::Image(id) => {
                if let Some(image) = self.template.image_mut(id) {
                    image.position = clamped;
                }
            }
            ElementRef::Table => {
                if self.template.table.enabled {
                    self.template.table.position = clamped;
                }
            }
            ElementRef::SignatureField(id) => {
                let base = self.template.signature.base_position;
                if let Some(field) = self.template.signature_field_mut(id) {
                    field.relative_position =
                        Point::new(clamped.x - base.x, clamped.y - base.y);
                }
            }
        }
    }

    /// Resize an element from a corner drag. The opposite corner stays
    /// fixed; minimum size and page bounds are enforced on every update.
    fn resize_element(&mut self, target: ElementRef, corner: Corner, orig: Rect, p: Point) {
        if !p.x.is_finite() || !p.y.is_finite() {
            return;
        }
        let page_w = self.template.page_width;
        let page_h = self.template.page_height;

        match target {
            ElementRef::Image(id) => {
                let rect = corner_resize(
                    orig,
                    corner,
                    p,
                    MIN_ELEMENT_SIZE,
                    MIN_ELEMENT_SIZE,
                    page_w,
                    page_h,
                );
                if let Some(image) = self.template.image_mut(id) {
                    image.position = Point::new(rect.x, rect.y);
                    image.width = rect.width;
                    image.height = rect.height;
                }
            }
            ElementRef::Table => {
                if !self.template.table.enabled {
                    return;
                }
                #[allow(clippy::cast_precision_loss)]
                let min_w = MIN_COLUMN_WIDTH * self.template.table.columns.len().max(1) as f64;
                let min_h = TABLE_HEADER_HEIGHT + TABLE_ROW_HEIGHT;
                let rect = corner_resize(orig, corner, p, min_w, min_h, page_w, page_h);

                let table = &mut self.template.table;
                table.position = Point::new(rect.x, rect.y);

                // Column widths rescale proportionally to the new total.
                let old_total: f64 = table.columns.iter().map(|c| c.width).sum();
                if old_total > 0.0 {
                    let ratio = rect.width / old_total;
                    for column in &mut table.columns {
                        column.width = (column.width * ratio).round().max(MIN_COLUMN_WIDTH);
                    }
                }

                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let rows = ((rect.height - TABLE_HEADER_HEIGHT) / TABLE_ROW_HEIGHT).floor() as u32;
                table.row_count = rows.max(1);
            }
            _ => {}
        }
    }

    // --- Internals ---

    fn to_doc(&self, screen_pt: Point) -> Option<Point> {
        let doc = self.viewport.screen_to_doc(screen_pt);
        (doc.x.is_finite() && doc.y.is_finite()).then_some(doc)
    }

    fn set_cursor(&mut self, cursor: Cursor, actions: &mut Vec<Action>) {
        if self.ui.cursor != cursor {
            self.ui.cursor = cursor;
            actions.push(Action::SetCursor(cursor));
        }
    }
}

// =============================================================
// Free helpers
// =============================================================

/// Clamp that tolerates an inverted range (degenerate page/extent cases)
/// instead of panicking.
fn bounded(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi.max(lo))
}

/// Compute new bounds for a corner drag: the corner opposite the dragged
/// one is fixed, and width/height/origin derive from the pointer delta.
fn corner_resize(
    orig: Rect,
    corner: Corner,
    p: Point,
    min_w: f64,
    min_h: f64,
    page_w: f64,
    page_h: f64,
) -> Rect {
    let right = orig.x + orig.width;
    let bottom = orig.y + orig.height;

    let (x, width) = match corner {
        Corner::Ne | Corner::Se => (orig.x, bounded(p.x - orig.x, min_w, page_w - orig.x)),
        Corner::Nw | Corner::Sw => {
            let w = bounded(right - p.x, min_w, right);
            (right - w, w)
        }
    };
    let (y, height) = match corner {
        Corner::Sw | Corner::Se => (orig.y, bounded(p.y - orig.y, min_h, page_h - orig.y)),
        Corner::Nw | Corner::Ne => {
            let h = bounded(bottom - p.y, min_h, bottom);
            (bottom - h, h)
        }
    };

    Rect::new(x, y, width, height)
}

fn string_value(key: &str, value: &Value) -> Result<String, EditorError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| EditorError::InvalidValue(key.to_owned()))
}

fn num_value(key: &str, value: &Value) -> Result<f64, EditorError> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EditorError::InvalidValue(key.to_owned()))
}

fn bool_value(key: &str, value: &Value) -> Result<bool, EditorError> {
    value.as_bool().ok_or_else(|| EditorError::InvalidValue(key.to_owned()))
}

fn align_value(key: &str, value: &Value) -> Result<Align, EditorError> {
    match value.as_str() {
        Some("left") => Ok(Align::Left),
        Some("center") => Ok(Align::Center),
        Some("right") => Ok(Align::Right),
        _ => Err(EditorError::InvalidValue(key.to_owned())),
    }
}
