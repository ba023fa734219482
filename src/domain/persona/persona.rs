//! Persona value types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a persona in the library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaId(String);

impl PersonaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A deceptive identity the agent adopts for a whole session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: PersonaId,
    /// Name the persona uses in conversation.
    pub name: String,
    /// One-line description of who they are.
    pub role: String,
    /// Scam types this persona is suited to.
    #[serde(default)]
    pub scam_types: Vec<String>,
    /// Core character instructions.
    pub system_prompt: String,
    /// How the persona writes.
    #[serde(default)]
    pub style_guide: String,
    /// What the persona is trying to get out of the conversation.
    #[serde(default)]
    pub goal: String,
}

impl Persona {
    /// True if the persona lists `scam_type` (case-insensitive).
    pub fn handles(&self, scam_type: &str) -> bool {
        self.scam_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(scam_type.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_is_case_insensitive() {
        let persona = Persona {
            id: PersonaId::new("p"),
            name: "P".into(),
            role: "r".into(),
            scam_types: vec!["tech_support".into()],
            system_prompt: "s".into(),
            style_guide: String::new(),
            goal: String::new(),
        };
        assert!(persona.handles("TECH_SUPPORT"));
        assert!(!persona.handles("lottery"));
    }
}
