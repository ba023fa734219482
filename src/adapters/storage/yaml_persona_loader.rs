//! YAML persona library loader.
//!
//! Reads a persona library document from disk at start-up, replacing the
//! built-in library.

use std::path::Path;
use tokio::fs;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::persona::PersonaLibrary;

/// Load and validate a persona library from a YAML file.
pub async fn load_persona_library(path: impl AsRef<Path>) -> Result<PersonaLibrary, DomainError> {
    let path = path.as_ref();

    let yaml = fs::read_to_string(path).await.map_err(|e| {
        DomainError::new(
            ErrorCode::InvalidPersonaLibrary,
            format!("Failed to read persona library: {}", e),
        )
        .with_detail("path", path.display().to_string())
    })?;

    PersonaLibrary::from_yaml_str(&yaml)
        .map_err(|e| e.with_detail("path", path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LIBRARY: &str = r#"
default_persona: uncle
neutral_persona: receptionist
personas:
  - id: uncle
    name: Uncle Ravi
    role: Retired clerk
    scam_types: [phishing, upi_fraud]
    system_prompt: You are Uncle Ravi.
    goal: Keep them talking.
  - id: receptionist
    name: Priya
    role: Front desk
    scam_types: [unknown]
    system_prompt: You are Priya.
"#;

    #[tokio::test]
    async fn loads_library_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("personas.yaml");
        tokio::fs::write(&path, LIBRARY).await.unwrap();

        let library = load_persona_library(&path).await.unwrap();
        assert_eq!(library.default_persona_id().as_str(), "uncle");
        assert_eq!(library.personas().len(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_persona_library(temp_dir.path().join("absent.yaml"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidPersonaLibrary);
    }

    #[tokio::test]
    async fn invalid_document_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.yaml");
        tokio::fs::write(&path, "personas: []\ndefault_persona: a\nneutral_persona: a\n")
            .await
            .unwrap();

        let err = load_persona_library(&path).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidPersonaLibrary);
    }
}
