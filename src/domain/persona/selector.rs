//! Persona selection state machine.
//!
//! ```text
//!   (none) ──unconfirmed──▶ Neutral ──scam confirmed──▶ Targeted(scam_type)
//!     │                                                     ▲
//!     └──────────────────scam confirmed─────────────────────┘
//! ```
//!
//! A targeted persona is never swapped out once assigned.

use std::sync::Arc;

use crate::domain::session::DetectionState;

use super::{Persona, PersonaId, PersonaLibrary};

/// Result of a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaSelection {
    pub persona: Persona,
    /// The session's stored assignment must be updated.
    pub is_new_assignment: bool,
}

/// Picks the persona for each turn.
#[derive(Debug, Clone)]
pub struct PersonaSelector {
    library: Arc<PersonaLibrary>,
}

impl PersonaSelector {
    pub fn new(library: Arc<PersonaLibrary>) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &PersonaLibrary {
        &self.library
    }

    /// Selects a persona given the session's detection state and assignment.
    ///
    /// An assignment that is not in the library is treated as absent.
    pub fn select(&self, detection: &DetectionState, current: Option<&PersonaId>) -> PersonaSelection {
        let current = current.and_then(|id| self.library.get(id));
        let neutral_id = self.library.neutral_persona_id();

        let chosen = match current {
            Some(persona) if &persona.id != neutral_id => persona,
            Some(neutral) if !detection.is_scam() => neutral,
            _ if detection.is_scam() => self.targeted(detection.scam_type()),
            _ => self.neutral(),
        };

        PersonaSelection {
            is_new_assignment: current.map_or(true, |c| c.id != chosen.id),
            persona: chosen.clone(),
        }
    }

    fn targeted(&self, scam_type: &str) -> &Persona {
        self.library
            .best_for(scam_type)
            .unwrap_or_else(|| self.default_persona())
    }

    fn neutral(&self) -> &Persona {
        self.library
            .get(self.library.neutral_persona_id())
            .unwrap_or_else(|| self.default_persona())
    }

    fn default_persona(&self) -> &Persona {
        // validated libraries always contain the default
        self.library
            .get(self.library.default_persona_id())
            .unwrap_or(&self.library.personas()[0])
    }
}
