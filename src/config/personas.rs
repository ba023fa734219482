//! Persona library source

use serde::Deserialize;
use std::path::PathBuf;

/// Optional YAML file replacing the built-in persona library.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonasConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}
