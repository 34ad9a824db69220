//! Request and response types for synthesis

use reshape_domain::{QueryFragment, SchemaAnalysis, TargetSchema};
use serde::Serialize;
use serde_json::Value;

/// Request to synthesize a query reshaping `document` into `schema`
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// Input document, read-only throughout the run
    pub document: Value,

    /// Target schema
    pub schema: TargetSchema,

    /// Free-text hint given to every prompt
    pub hint: Option<String>,

    /// Overrides `SynthesizerConfig::max_retries` for this run
    pub max_retries: Option<u32>,
}

impl SynthesisRequest {
    /// Create a request with no hint and the configured retry budget
    pub fn new(document: Value, schema: TargetSchema) -> Self {
        Self {
            document,
            schema,
            hint: None,
            max_retries: None,
        }
    }

    /// Attach a hint
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Override the retry budget
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

/// Result of a successful synthesis run
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisOutcome {
    /// Verified composite query text
    pub query: String,

    /// First output of the query on the input, already schema-validated
    pub output: Value,

    /// Per-field satisfiability analysis
    pub analysis: SchemaAnalysis,

    /// Verified fragments, in schema order
    pub fragments: Vec<QueryFragment>,

    /// Matched fields the model chose not to extract
    pub skipped_fields: Vec<String>,

    /// Repair invocations spent on the composite query
    pub composite_repairs: u32,

    /// Metadata about the run
    pub metadata: SynthesisMetadata,
}

/// Metadata about a synthesis run
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisMetadata {
    /// Model used
    pub model_name: String,

    /// Model backend calls made across all stages
    pub model_calls: u32,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: u64,
}
