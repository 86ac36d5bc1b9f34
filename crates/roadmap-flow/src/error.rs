use crate::editor::SelectionPhase;

/// Rejected editor interactions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("illegal selection transition: {from:?} -> {to:?}")]
    IllegalTransition {
        from: SelectionPhase,
        to: SelectionPhase,
    },

    #[error("{action} needs a selection, but nothing is selected")]
    NothingSelected { action: &'static str },
}
