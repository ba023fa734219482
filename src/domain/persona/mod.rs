//! Personas: deceptive identities and how one is chosen per session.

mod library;
#[allow(clippy::module_inception)]
mod persona;
mod selector;

pub use library::PersonaLibrary;
pub use persona::{Persona, PersonaId};
pub use selector::{PersonaSelection, PersonaSelector};
