//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the synthesis core and its
//! collaborators. Implementations live in other crates.

use crate::TargetSchema;
use serde_json::Value;
use thiserror::Error;

/// Trait for language-model backends
///
/// Implemented by the infrastructure layer (reshape-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Complete a two-part prompt and return the raw response text
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, Self::Error>;
}

/// Failure reported by a query engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The query text does not compile
    #[error("compile error: {0}")]
    Compile(String),

    /// The query compiled but failed while running
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Trait for the filter-query execution engine
///
/// Implemented by the infrastructure layer (reshape-engine)
pub trait QueryEngine {
    /// Compile `query` and run it over `document`, collecting every output
    fn compile_and_run(&self, query: &str, document: &Value) -> Result<Vec<Value>, EngineError>;

    /// Compile `query` and run it over `document`, returning only the first
    /// output
    ///
    /// Engines that evaluate lazily should override this so later outputs
    /// are never computed.
    fn compile_and_first(&self, query: &str, document: &Value) -> Result<Option<Value>, EngineError> {
        Ok(self.compile_and_run(query, document)?.into_iter().next())
    }
}

/// Trait for schema validation of produced values
///
/// Implemented by the infrastructure layer (reshape-engine)
pub trait SchemaValidator {
    /// Check `value` against `schema`; the error text describes the violation
    fn validate(&self, value: &Value, schema: &TargetSchema) -> Result<(), String>;
}
