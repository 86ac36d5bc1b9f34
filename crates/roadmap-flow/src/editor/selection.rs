use crate::error::SelectionError;
use roadmap_model::{ConnectionId, NodeId};

/// What the editor has selected
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorSelection {
    #[default]
    None,
    /// Node highlighted on the canvas
    Selected(NodeId),
    /// Node open in the edit panel
    Editing(NodeId),
    /// Connection highlighted on the canvas
    EdgeSelected(ConnectionId),
}

/// Payload-free shape of [`EditorSelection`], used for transition rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionPhase {
    Idle,
    NodeSelected,
    Editing,
    EdgeSelected,
}

/// Canvas interaction that may change the selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    NodeClicked(NodeId),
    EdgeClicked(ConnectionId),
    PaneClicked,
    BeginEdit,
    FinishEdit,
    Deleted,
}

impl SelectionEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::NodeClicked(_) => "node click",
            Self::EdgeClicked(_) => "edge click",
            Self::PaneClicked => "pane click",
            Self::BeginEdit => "begin edit",
            Self::FinishEdit => "finish edit",
            Self::Deleted => "delete",
        }
    }
}

/// Phases reachable from `from`
pub fn allowed_transitions(from: SelectionPhase) -> Vec<SelectionPhase> {
    use SelectionPhase::*;
    match from {
        Idle => vec![Idle, NodeSelected, EdgeSelected],
        NodeSelected => vec![Idle, NodeSelected, Editing, EdgeSelected],
        Editing => vec![Idle, NodeSelected, Editing],
        EdgeSelected => vec![Idle, NodeSelected, EdgeSelected],
    }
}

/// Check a phase change against [`allowed_transitions`]
pub fn validate_transition(from: SelectionPhase, to: SelectionPhase) -> Result<(), SelectionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(SelectionError::IllegalTransition { from, to })
    }
}

impl EditorSelection {
    #[must_use]
    pub fn phase(&self) -> SelectionPhase {
        match self {
            Self::None => SelectionPhase::Idle,
            Self::Selected(_) => SelectionPhase::NodeSelected,
            Self::Editing(_) => SelectionPhase::Editing,
            Self::EdgeSelected(_) => SelectionPhase::EdgeSelected,
        }
    }

    /// Selected or edited node
    #[must_use]
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            Self::Selected(id) | Self::Editing(id) => Some(id),
            _ => None,
        }
    }

    /// Selected connection
    #[must_use]
    pub fn edge(&self) -> Option<&ConnectionId> {
        match self {
            Self::EdgeSelected(id) => Some(id),
            _ => None,
        }
    }

    /// Selection after `event`
    ///
    /// Clicking the node being edited keeps the panel open. Edges cannot be
    /// selected while a node is being edited.
    pub fn apply(&self, event: SelectionEvent) -> Result<Self, SelectionError> {
        let action = event.name();
        let next = match (self, event) {
            (Self::Editing(current), SelectionEvent::NodeClicked(id)) if *current == id => {
                self.clone()
            }
            (_, SelectionEvent::NodeClicked(id)) => Self::Selected(id),
            (_, SelectionEvent::EdgeClicked(id)) => Self::EdgeSelected(id),
            (_, SelectionEvent::PaneClicked) => Self::None,
            (Self::Selected(id) | Self::Editing(id), SelectionEvent::BeginEdit) => {
                Self::Editing(id.clone())
            }
            (Self::Editing(id), SelectionEvent::FinishEdit) => Self::Selected(id.clone()),
            (Self::None, SelectionEvent::Deleted) => {
                return Err(SelectionError::NothingSelected { action })
            }
            (_, SelectionEvent::Deleted) => Self::None,
            (Self::None, SelectionEvent::BeginEdit) => {
                return Err(SelectionError::NothingSelected { action })
            }
            (_, other) => {
                let to = if other == SelectionEvent::BeginEdit {
                    SelectionPhase::Editing
                } else {
                    SelectionPhase::NodeSelected
                };
                return Err(SelectionError::IllegalTransition {
                    from: self.phase(),
                    to,
                });
            }
        };

        validate_transition(self.phase(), next.phase())?;
        Ok(next)
    }
}
