//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Synthesis failed
    #[error("{0}")]
    Synthesis(#[from] reshape_synthesizer::SynthesisError),

    /// Model backend could not be set up
    #[error("Model backend error: {0}")]
    Llm(#[from] reshape_llm::LlmError),

    /// The schema file is not a usable target schema
    #[error("Invalid schema: {0}")]
    Schema(#[from] reshape_domain::SchemaError),

    /// The produced query failed when applied
    #[error("Query error: {0}")]
    Engine(#[from] reshape_domain::EngineError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Required fields have no counterpart in the data
    #[error("The data cannot satisfy the schema (missing: {0})")]
    Unsatisfiable(String),
}
