//! Editor interaction state
//!
//! - `EditorSelection`: what is selected or being edited, with checked
//!   transitions
//! - `GestureBuffer`: drag/resize frames buffered into one write per gesture

mod gesture;
mod selection;

pub use gesture::{GestureBuffer, GestureKind};
pub use selection::{
    allowed_transitions, validate_transition, EditorSelection, SelectionEvent, SelectionPhase,
};
