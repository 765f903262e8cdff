//! Extraction vocabulary.
//!
//! The built-in vocabulary is baked into the binary from `vocabulary.toml`
//! at compile time. A replacement file with the same shape can be loaded
//! with [`ExtractionConfig::from_path`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Built-in vocabulary TOML, embedded at compile time.
const BUILTIN_VOCABULARY: &str = include_str!("vocabulary.toml");

/// Errors from loading an [`ExtractionConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The vocabulary file could not be read.
    #[error("Failed to read vocabulary file {}: {source}", path.display())]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The vocabulary is not valid TOML of the expected shape.
    #[error("Invalid vocabulary TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// A keyword list is empty or contains an empty entry.
    #[error("Vocabulary list '{0}' must be non-empty and contain no empty entries")]
    EmptyList(&'static str),
}

/// Immutable keyword and vocabulary data that drives field extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionConfig {
    /// Skill names, in the order they are reported.
    pub skills: Vec<String>,
    /// Case-sensitive markers of an education line.
    pub education_keywords: Vec<String>,
    /// Case-sensitive markers of a project line.
    pub project_keywords: Vec<String>,
    /// Words that mark a sentence as part of the profile summary.
    pub profile_cues: Vec<String>,
}

impl ExtractionConfig {
    /// Returns the built-in vocabulary.
    ///
    /// # Errors
    ///
    /// * If the embedded TOML fails to parse or validate
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml_str(BUILTIN_VOCABULARY)
    }

    /// Loads a vocabulary from a TOML file.
    ///
    /// # Errors
    ///
    /// * If the file cannot be read
    /// * If the contents fail to parse or validate
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded vocabulary from {}", path.display());
        Self::from_toml_str(&contents)
    }

    /// Parses a vocabulary from TOML text.
    ///
    /// # Errors
    ///
    /// * If the text is not valid TOML with the expected keys
    /// * If any list is empty
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let lists: [(&'static str, &[String]); 4] = [
            ("skills", &self.skills),
            ("education_keywords", &self.education_keywords),
            ("project_keywords", &self.project_keywords),
            ("profile_cues", &self.profile_cues),
        ];
        for (name, list) in lists {
            if list.is_empty() || list.iter().any(String::is_empty) {
                return Err(ConfigError::EmptyList(name));
            }
        }
        Ok(())
    }
}
