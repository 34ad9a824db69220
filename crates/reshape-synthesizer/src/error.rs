//! Error types for the Synthesizer

use reshape_domain::SchemaAnalysis;
use std::fmt;
use thiserror::Error;

/// Terminal failure kinds of a synthesis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required field has no counterpart in the input
    SchemaUnsatisfiable,
    /// A field's fragment never ran cleanly within the retry budget
    FragmentSynthesisExhausted,
    /// The assembled query never produced schema-valid output within the retry budget
    CompositeValidationExhausted,
    /// The input document is larger than the configured cap
    DocumentTooLarge,
    /// The synthesizer configuration is invalid
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::SchemaUnsatisfiable => "schema_unsatisfiable",
            ErrorKind::FragmentSynthesisExhausted => "fragment_synthesis_exhausted",
            ErrorKind::CompositeValidationExhausted => "composite_validation_exhausted",
            ErrorKind::DocumentTooLarge => "document_too_large",
            ErrorKind::Config => "config",
        };
        f.write_str(name)
    }
}

/// Errors that end a synthesis run
///
/// Model backend failures never appear here directly: they are fed to the
/// repair loop like any other failed check and only surface through the
/// exhaustion variants.
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// A required target field has no corresponding input field
    #[error(
        "The input does not contain the data required by the target schema (missing: {}):\n\n{}",
        .analysis.unsatisfied_required().join(", "),
        .analysis.to_pretty_json()
    )]
    SchemaUnsatisfiable {
        /// Full per-field analysis
        analysis: SchemaAnalysis,
    },

    /// A field's extraction fragment never compiled and ran cleanly
    #[error("Failed to create a working query for field '{field}' after {attempts} attempts: {last_error}")]
    FragmentSynthesisExhausted {
        /// Target field
        field: String,
        /// Candidates checked
        attempts: u32,
        /// Error from the last check
        last_error: String,
        /// Last candidate text
        last_query: String,
    },

    /// The composite query never produced schema-valid output
    #[error("Failed to produce schema-valid output after {attempts} attempts: {last_error}\nLast query: {last_query}")]
    CompositeValidationExhausted {
        /// Candidates checked
        attempts: u32,
        /// Error from the last check
        last_error: String,
        /// Last candidate text
        last_query: String,
    },

    /// Serialized input exceeds `max_document_chars`
    #[error("Input document too large: {0} chars (max: {1})")]
    DocumentTooLarge(usize, usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SynthesisError {
    /// The failure kind, for callers that branch on it
    pub fn kind(&self) -> ErrorKind {
        match self {
            SynthesisError::SchemaUnsatisfiable { .. } => ErrorKind::SchemaUnsatisfiable,
            SynthesisError::FragmentSynthesisExhausted { .. } => {
                ErrorKind::FragmentSynthesisExhausted
            }
            SynthesisError::CompositeValidationExhausted { .. } => {
                ErrorKind::CompositeValidationExhausted
            }
            SynthesisError::DocumentTooLarge(..) => ErrorKind::DocumentTooLarge,
            SynthesisError::Config(_) => ErrorKind::Config,
        }
    }
}
