//! Template editing engine for single-page document composition.
//!
//! This crate owns the full lifecycle of an editing session: a serializable
//! template model describing one printable page, coordinate mapping between
//! document points and the scaled preview surface, hit-testing of elements and
//! resize handles, the drag/resize gesture state machine, and a pure preview
//! renderer that emits backend-neutral draw commands. The host UI wires raw
//! pointer events to [`engine::EditorCore`] and processes the returned
//! [`engine::Action`]s; final output is produced by the `compositor` crate
//! from the same model.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::EditorCore`] and host command surface |
//! | [`model`] | Template model: title, fields, images, table, signature block |
//! | [`viewport`] | Document-space / screen-space scale mapping |
//! | [`input`] | Gesture state machine and cursor affordances |
//! | [`hit`] | Hit-testing elements and resize handles |
//! | [`render`] | Preview renderer emitting draw commands |
//! | [`consts`] | Shared numeric constants (page size, minimum sizes, etc.) |

pub mod consts;
pub mod engine;
pub mod hit;
pub mod input;
pub mod model;
pub mod render;
pub mod viewport;
