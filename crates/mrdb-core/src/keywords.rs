use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Global product keywords matched by the entity tagger.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordsFile {
    pub keywords: Vec<String>,
}

/// Load and validate the global keyword list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_keywords(path: &Path) -> Result<KeywordsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::KeywordsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: KeywordsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::KeywordsFileParse)?;

    validate_keywords(&file)?;

    tracing::debug!(count = file.keywords.len(), path = %path.display(), "loaded keywords");
    Ok(file)
}

fn validate_keywords(file: &KeywordsFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for keyword in &file.keywords {
        if keyword.trim().is_empty() {
            return Err(ConfigError::Validation(
                "keyword must be non-empty".to_string(),
            ));
        }

        if !seen.insert(keyword.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate keyword: '{keyword}'"
            )));
        }
    }

    Ok(())
}
