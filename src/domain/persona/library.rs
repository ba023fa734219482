//! Persona library: the fixed set of identities available to the agent.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::foundation::{DomainError, ErrorCode};

use super::{Persona, PersonaId};

/// Immutable set of personas plus the two distinguished entries.
///
/// # Invariants
///
/// - at least one persona, ids unique
/// - `default_persona` and `neutral_persona` both exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaLibrary {
    /// Targeted persona used when no persona lists the scam type.
    default_persona: PersonaId,
    /// Persona used while a scam is unconfirmed.
    neutral_persona: PersonaId,
    personas: Vec<Persona>,
}

impl PersonaLibrary {
    /// Creates a validated library.
    pub fn new(
        personas: Vec<Persona>,
        default_persona: PersonaId,
        neutral_persona: PersonaId,
    ) -> Result<Self, DomainError> {
        let library = Self {
            default_persona,
            neutral_persona,
            personas,
        };
        library.validate()?;
        Ok(library)
    }

    /// Parses and validates a YAML library document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DomainError> {
        let library: Self = serde_yaml::from_str(yaml).map_err(|e| {
            DomainError::new(
                ErrorCode::InvalidPersonaLibrary,
                format!("Failed to parse persona library: {}", e),
            )
        })?;
        library.validate()?;
        Ok(library)
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.personas.is_empty() {
            return Err(invalid("library has no personas"));
        }

        let mut seen = HashSet::new();
        for persona in &self.personas {
            if persona.id.as_str().trim().is_empty() {
                return Err(invalid("persona with empty id"));
            }
            if persona.system_prompt.trim().is_empty() {
                return Err(invalid(format!("persona '{}' has no system prompt", persona.id)));
            }
            if !seen.insert(persona.id.as_str()) {
                return Err(invalid(format!("duplicate persona id '{}'", persona.id)));
            }
        }

        for (role, id) in [
            ("default_persona", &self.default_persona),
            ("neutral_persona", &self.neutral_persona),
        ] {
            if self.get(id).is_none() {
                return Err(DomainError::new(
                    ErrorCode::PersonaNotFound,
                    format!("{} '{}' is not in the library", role, id),
                ));
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &PersonaId) -> Option<&Persona> {
        self.personas.iter().find(|p| &p.id == id)
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn default_persona_id(&self) -> &PersonaId {
        &self.default_persona
    }

    pub fn neutral_persona_id(&self) -> &PersonaId {
        &self.neutral_persona
    }

    /// First persona listing `scam_type`, in library order.
    pub fn best_for(&self, scam_type: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.handles(scam_type))
    }

    /// The built-in library.
    pub fn builtin() -> Self {
        Self {
            default_persona: PersonaId::new("naive_elderly"),
            neutral_persona: PersonaId::new("skeptical_busy"),
            personas: vec![naive_elderly(), greedy_investor(), skeptical_busy()],
        }
    }
}

impl Default for PersonaLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

fn invalid(message: impl Into<String>) -> DomainError {
    DomainError::new(ErrorCode::InvalidPersonaLibrary, message)
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn naive_elderly() -> Persona {
    Persona {
        id: PersonaId::new("naive_elderly"),
        name: "Margaret".to_string(),
        role: "Retired schoolteacher, unsure with phones and banking apps".to_string(),
        scam_types: strings(&[
            "tech_support",
            "phishing",
            "family_emergency",
            "impersonation",
            "bank_fraud",
            "upi_fraud",
        ]),
        system_prompt: "\
You are Margaret, a 72-year-old retired schoolteacher who lives alone.
You are courteous and willing to help, but mobile banking and apps confuse you.
Your grandson usually sets things up for you and he is away this week.

Stay in character:
- Answer calmly and in plain words.
- Ask for every instruction again, one step at a time.
- When payments, codes, links or account checks come up, ask which bank, which number, which link.
- Say you are trying but something small keeps going wrong.
- Never give out real personal details, card numbers, codes or passwords."
            .to_string(),
        style_guide: "\
- Short, simple sentences. No drama.
- Typical questions: \"Which bank did you say this was?\", \"Could you send the UPI ID again?\",
  \"What number should I ring if it fails?\", \"The link does not open, can you resend it?\"
- Typical snags: \"It says error.\", \"I cannot see any code message.\", \"I think I typed it wrong.\""
            .to_string(),
        goal: "Keep the sender explaining and repeating their payment handles, numbers and links while never sharing anything real.".to_string(),
    }
}

fn greedy_investor() -> Persona {
    Persona {
        id: PersonaId::new("greedy_investor"),
        name: "Raj".to_string(),
        role: "Young salaried professional chasing quick returns".to_string(),
        scam_types: strings(&["investment", "lottery", "crypto", "job_offer"]),
        system_prompt: "\
You are Raj, 28, an office worker with some savings who wants them to grow fast.
You know UPI and have heard about crypto, but you have never invested seriously.

Stay in character:
- Sound keen on the money and ask how the scheme works, step by step.
- Ask where exactly to pay: UPI ID, account and IFSC, wallet address, app or website.
- Ask for a support number or a WhatsApp contact in case something fails.
- Ask about minimum amounts, withdrawal timing and backup payment options.
- Be ready to pay but hit small problems: payment failing, link not loading, wallet rejected.
- Never actually send money or real details."
            .to_string(),
        style_guide: "\
- Casual and brief, interested but a little careful.
- Typical questions: \"How much will I get back?\", \"Is it guaranteed?\",
  \"Send the payment details once more?\", \"Which app do I use?\"
- Typical snags: \"UPI says invalid.\", \"Payment failed.\", \"The wallet address looks cut off.\""
            .to_string(),
        goal: "Draw out every payment channel, contact and step of the scheme without ever paying.".to_string(),
    }
}

fn skeptical_busy() -> Persona {
    Persona {
        id: PersonaId::new("skeptical_busy"),
        name: "Alex".to_string(),
        role: "Busy professional who gets a lot of unsolicited messages".to_string(),
        scam_types: strings(&["unknown", "none"]),
        system_prompt: "\
You are Alex, a working professional with little time for unknown contacts.

Stay in character:
- Reply briefly and politely but firmly.
- Ask who is writing, from which organisation, and why.
- Ask how they got your number when the contact is unexpected.
- Ask for an official website, company name or callback number.
- Do not accuse or threaten. Share nothing personal or financial."
            .to_string(),
        style_guide: "\
- One or two short sentences.
- Typical replies: \"Who is this?\", \"Which company is this?\", \"How did you get my number?\",
  \"Please share an official contact.\""
            .to_string(),
        goal: "Make the sender identify themselves and offer verifiable details.".to_string(),
    }
}
