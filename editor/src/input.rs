//! Input model: cursor affordances, UI state, and the gesture state machine.
//!
//! `InputState` is the active gesture being tracked between pointer-down and
//! pointer-up. Drag carries the grab offset so movement is relative to where
//! the element was grabbed, not an absolute snap to the pointer; resize
//! carries the geometry at gesture start so each move recomputes from a
//! stable anchor.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::hit::{Corner, Rect};
use crate::model::ElementRef;
use crate::viewport::Point;

/// Pointer cursor the host should display for the current hover target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    /// Over a draggable element body.
    Grab,
    /// Actively dragging.
    Grabbing,
    /// Over a NW or SE resize handle.
    ResizeNwSe,
    /// Over a NE or SW resize handle.
    ResizeNeSw,
}

impl Cursor {
    /// Cursor for a given resize corner.
    #[must_use]
    pub fn for_corner(corner: Corner) -> Self {
        match corner {
            Corner::Nw | Corner::Se => Self::ResizeNwSe,
            Corner::Ne | Corner::Sw => Self::ResizeNeSw,
        }
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct UiState {
    /// The currently selected element, if any. Only one element may be
    /// selected or manipulated at a time.
    pub selected: Option<ElementRef>,
    /// Cursor affordance for the current hover target.
    pub cursor: Cursor,
}

/// Internal state for the interaction state machine.
///
/// The three modes are exclusive: a pointer-down either starts a drag (body
/// hit), starts a resize (handle hit), or clears the selection (no hit).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is moving an element across the page.
    Dragging {
        /// The element being dragged.
        target: ElementRef,
        /// Grab offset: `pointer_doc_pos - element_origin` at gesture start.
        offset: Point,
    },
    /// The user is resizing an element by one of its four corner handles.
    Resizing {
        /// The element being resized (image or table).
        target: ElementRef,
        /// Which corner handle is being dragged.
        corner: Corner,
        /// Element bounds at the start of the resize; the corner opposite
        /// `corner` stays fixed while the gesture runs.
        orig: Rect,
    },
}
