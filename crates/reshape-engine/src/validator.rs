//! JSON-Schema validation of produced values

use reshape_domain::{SchemaValidator, TargetSchema};
use serde_json::Value;

/// Default number of violations reported in one message
pub const DEFAULT_MAX_REPORTED: usize = 5;

/// Validates values against the target schema with the `jsonschema` crate
///
/// The draft is picked from the schema's `$schema` keyword. All violations
/// (up to `max_reported`) are joined into one message, so a single repair
/// round can address several of them.
#[derive(Debug, Clone)]
pub struct JsonSchemaValidator {
    max_reported: usize,
}

impl JsonSchemaValidator {
    /// Create a validator reporting up to [`DEFAULT_MAX_REPORTED`] violations
    pub fn new() -> Self {
        Self {
            max_reported: DEFAULT_MAX_REPORTED,
        }
    }

    /// Set how many violations are reported per message
    pub fn with_max_reported(mut self, max_reported: usize) -> Self {
        self.max_reported = max_reported.max(1);
        self
    }
}

impl Default for JsonSchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, value: &Value, schema: &TargetSchema) -> Result<(), String> {
        let validator = jsonschema::validator_for(schema.as_json())
            .map_err(|e| format!("Target schema is not a valid JSON-Schema: {}", e))?;

        let violations: Vec<String> = validator
            .iter_errors(value)
            .take(self.max_reported)
            .map(|e| e.to_string())
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations.join("; "))
        }
    }
}
