//! One-at-a-time row selection and the action modal bound to it.

use crate::error::{PsaError, Result};
use crate::types::EntityId;

/// Lifecycle of an action modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Open,
    Submitting,
}

/// An action opened against the selected row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionModal<A> {
    pub action: A,
    pub phase: ModalPhase,
}

/// Selection state of a view.
///
/// `None -> Selected -> ActionOpen -> None`. A closed modal is represented by
/// the absence of `ActionOpen`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<A> {
    None,
    Selected(EntityId),
    ActionOpen(EntityId, ActionModal<A>),
}

impl<A> Default for Selection<A> {
    fn default() -> Self {
        Selection::None
    }
}

impl<A: Clone> Selection<A> {
    pub fn id(&self) -> Option<EntityId> {
        match self {
            Selection::None => None,
            Selection::Selected(id) | Selection::ActionOpen(id, _) => Some(*id),
        }
    }

    pub fn modal(&self) -> Option<&ActionModal<A>> {
        match self {
            Selection::ActionOpen(_, modal) => Some(modal),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.modal(), Some(m) if m.phase == ModalPhase::Submitting)
    }

    /// Select a row, replacing any previous selection.
    ///
    /// An open (not yet submitted) modal is discarded; a submitting one
    /// blocks reselection until its request settles.
    pub fn select(&mut self, id: EntityId) -> Result<()> {
        if self.is_submitting() {
            return Err(PsaError::MissingPrecondition(
                "a request for the selected row is still in flight".to_string(),
            ));
        }
        *self = Selection::Selected(id);
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Selection::None;
    }

    /// Open `action` against the selected row.
    pub fn open(&mut self, action: A) -> Result<EntityId> {
        match self {
            Selection::None => Err(PsaError::MissingPrecondition(
                "no row selected".to_string(),
            )),
            Selection::ActionOpen(_, modal) if modal.phase == ModalPhase::Submitting => {
                Err(PsaError::MissingPrecondition(
                    "a request for the selected row is still in flight".to_string(),
                ))
            }
            Selection::Selected(id) | Selection::ActionOpen(id, _) => {
                let id = *id;
                *self = Selection::ActionOpen(
                    id,
                    ActionModal {
                        action,
                        phase: ModalPhase::Open,
                    },
                );
                Ok(id)
            }
        }
    }

    /// Cancel closes the modal and keeps the row selected.
    pub fn cancel(&mut self) {
        if let Selection::ActionOpen(id, modal) = self
            && modal.phase == ModalPhase::Open
        {
            let id = *id;
            *self = Selection::Selected(id);
        }
    }

    /// Move the open modal to `Submitting`, returning the target id.
    pub fn begin_submit(&mut self) -> Result<EntityId> {
        match self {
            Selection::ActionOpen(id, modal) if modal.phase == ModalPhase::Open => {
                modal.phase = ModalPhase::Submitting;
                Ok(*id)
            }
            _ => Err(PsaError::MissingPrecondition(
                "no action is open".to_string(),
            )),
        }
    }

    /// Close the modal once its request settled, successfully or not.
    pub fn finish(&mut self) {
        if self.is_submitting() {
            *self = Selection::None;
        }
    }
}
