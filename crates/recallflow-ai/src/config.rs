//! Memory configuration file support
//!
//! Loads configuration from ~/.config/recallflow/memory.toml

use std::path::{Path, PathBuf};

use recallflow_traits::MemoryError;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::llm::DEFAULT_OPENAI_MODEL;

/// Default token budget of a condensed block.
pub const DEFAULT_TOKEN_BUDGET: usize = 50_000;
/// Text segments longer than this many characters are summarized.
pub const MAX_SUMMARY_CHARS: usize = 128;
/// Default proposition cap before condensation kicks in.
pub const DEFAULT_MAX_PROPOSITIONS: usize = 50;
/// Model whose encoding is used to measure entries.
pub const ENCODING_MODEL: &str = "gpt-4o";

const DEFAULT_SUMMARY_MAX_TOKENS: u32 = 256;

/// Memory configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default)]
    pub condensed: CondensedConfig,
    #[serde(default)]
    pub propositions: PropositionConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Condensed block settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CondensedConfig {
    pub name: String,
    /// Maximum total tokens across all stored entries
    pub token_budget: usize,
    /// Summary ceiling for a single text segment, in characters
    pub summary_max_chars: usize,
    /// Model name selecting the tokenizer encoding
    pub encoding_model: String,
}

impl Default for CondensedConfig {
    fn default() -> Self {
        Self {
            name: "condensed_memory".to_string(),
            token_budget: DEFAULT_TOKEN_BUDGET,
            summary_max_chars: MAX_SUMMARY_CHARS,
            encoding_model: ENCODING_MODEL.to_string(),
        }
    }
}

impl CondensedConfig {
    pub fn with_token_budget(mut self, token_budget: usize) -> Self {
        self.token_budget = token_budget;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), MemoryError> {
        if self.token_budget == 0 {
            return Err(MemoryError::invalid_config(
                "condensed.token_budget must be at least 1",
            ));
        }
        if self.summary_max_chars == 0 {
            return Err(MemoryError::invalid_config(
                "condensed.summary_max_chars must be at least 1",
            ));
        }
        if self.encoding_model.trim().is_empty() {
            return Err(MemoryError::invalid_config(
                "condensed.encoding_model must not be empty",
            ));
        }
        Ok(())
    }
}

/// Proposition block settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropositionConfig {
    pub name: String,
    /// Proposition count above which the list is condensed
    pub max_propositions: usize,
}

impl Default for PropositionConfig {
    fn default() -> Self {
        Self {
            name: "extracted_propositions".to_string(),
            max_propositions: DEFAULT_MAX_PROPOSITIONS,
        }
    }
}

impl PropositionConfig {
    pub fn with_max_propositions(mut self, max_propositions: usize) -> Self {
        self.max_propositions = max_propositions;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), MemoryError> {
        if self.max_propositions == 0 {
            return Err(MemoryError::invalid_config(
                "propositions.max_propositions must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Settings for the LLM-backed summarizer and extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat model used by `OpenAIClient::from_config`
    pub model: String,
    /// Completion cap for summarization calls
    pub summary_max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_OPENAI_MODEL.to_string(),
            summary_max_tokens: DEFAULT_SUMMARY_MAX_TOKENS,
        }
    }
}

impl MemoryConfig {
    /// Load configuration from the default path, falling back to defaults
    /// when no file exists there.
    pub fn load() -> Result<Self> {
        Self::load_or_default(Self::default_path().as_deref())
    }

    /// Load from `path` if a file exists there, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load_from_path(path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate configuration from a specific path
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("recallflow").join("memory.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), MemoryError> {
        self.condensed.validate()?;
        self.propositions.validate()?;
        if self.llm.summary_max_tokens == 0 {
            return Err(MemoryError::invalid_config(
                "llm.summary_max_tokens must be at least 1",
            ));
        }
        Ok(())
    }
}
