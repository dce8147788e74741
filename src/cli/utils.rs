//! Shared CLI utilities.

use anyhow::{Context, Result};
use quickargs::Registry;
use std::fs;
use std::path::Path;

/// Load a symbol registry (`dotted.name: function | class | module`).
/// Returns an empty registry when no file is given.
pub fn load_registry(path: Option<&Path>) -> Result<Registry> {
    let Some(path) = path else {
        return Ok(Registry::default());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed reading symbols file: {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Registry::default());
    }
    let registry: Registry = serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid symbols file: {}", path.display()))?;
    tracing::debug!(symbols = registry.len(), "loaded symbol registry");
    Ok(registry)
}
