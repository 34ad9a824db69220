//! Configuration management for the CLI.

use crate::cli::BackendArgs;
use crate::error::{CliError, Result};
use reshape_synthesizer::SynthesizerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default model for the Ollama backend.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Model backend settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Synthesis pipeline settings
    #[serde(default)]
    pub synthesizer: SynthesizerConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Model backend settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Which backend to call
    #[serde(default)]
    pub kind: ProviderKind,

    /// Model name (backend default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Supported model backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions API
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    /// Local Ollama server
    Ollama,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl ProviderConfig {
    /// Model to request, falling back to the backend default.
    pub fn model_or_default(&self) -> &str {
        match (&self.model, self.kind) {
            (Some(model), _) => model.as_str(),
            (None, ProviderKind::OpenAi) => reshape_llm::openai::DEFAULT_MODEL,
            (None, ProviderKind::Ollama) => DEFAULT_OLLAMA_MODEL,
        }
    }
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".reshape").join("config.toml"))
    }

    /// Load configuration from an explicit file, the default file, or defaults.
    ///
    /// An explicit path must exist; the default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.synthesizer.validate().map_err(CliError::Config)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Apply command-line overrides.
    pub fn apply_overrides(&mut self, backend: &BackendArgs, max_retries: Option<u32>) {
        if let Some(provider) = backend.provider {
            let kind = provider.into();
            if kind != self.provider.kind {
                // A model or endpoint configured for another backend does not carry over
                self.provider = ProviderConfig {
                    kind,
                    ..Default::default()
                };
            }
        }
        if let Some(model) = &backend.model {
            self.provider.model = Some(model.clone());
        }
        if let Some(endpoint) = &backend.endpoint {
            self.provider.endpoint = Some(endpoint.clone());
        }
        if let Some(max_retries) = max_retries {
            self.synthesizer.max_retries = max_retries;
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
