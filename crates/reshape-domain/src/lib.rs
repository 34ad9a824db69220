//! Reshape Domain Layer
//!
//! This crate holds the data model shared by every other layer: the target
//! schema, per-field match results, query fragments, and the trait interfaces
//! for the model backend, the query engine and the schema validator.
//!
//! ## Key Concepts
//!
//! - **Target schema**: declared fields (type, description, required flag) in declaration order
//! - **Input document**: any JSON value, read-only throughout a run
//! - **Field match**: the model's verdict on which input key corresponds to a target field
//! - **Fragment**: a jq expression extracting one target field
//! - **Composite query**: the single object-construction query assembled from fragments
//!
//! ## Architecture
//!
//! - Pure data and trait definitions only
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod query;
pub mod schema;
pub mod traits;

// Re-exports for convenience
pub use analysis::{FieldMatchResult, SchemaAnalysis};
pub use query::{CompositeQuery, QueryFragment, SKIP_SENTINEL};
pub use schema::{FieldDescriptor, FieldSpec, SchemaError, TargetSchema};
pub use traits::{EngineError, LlmProvider, QueryEngine, SchemaValidator};
