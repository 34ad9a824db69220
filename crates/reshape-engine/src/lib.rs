//! Reshape Engine
//!
//! Execution and validation collaborators for the synthesis core:
//!
//! - [`JaqEngine`]: compiles and runs jq queries (`QueryEngine`)
//! - [`JsonSchemaValidator`]: checks produced values against the target schema (`SchemaValidator`)
//!
//! # Examples
//!
//! ```
//! use reshape_domain::{QueryEngine, SchemaValidator, TargetSchema};
//! use reshape_engine::{JaqEngine, JsonSchemaValidator};
//! use serde_json::json;
//!
//! let schema = TargetSchema::from_json(&json!({
//!     "type": "object",
//!     "properties": {"date": {"type": "string"}},
//!     "required": ["date"]
//! })).unwrap();
//! let input = json!({"datetime": "2022-01-01"});
//!
//! let out = JaqEngine::new().compile_and_run(r#"{ "date": (.datetime) }"#, &input).unwrap();
//! assert!(JsonSchemaValidator::new().validate(&out[0], &schema).is_ok());
//! ```

#![warn(missing_docs)]

mod jq;
mod validator;

pub use jq::{JaqEngine, DEFAULT_MAX_OUTPUTS};
pub use validator::{JsonSchemaValidator, DEFAULT_MAX_REPORTED};
