//! Satisfiability analysis - per-field match records for one run

use serde::{Deserialize, Serialize};

/// Outcome of matching one target field against the input document
///
/// Created once per field and never mutated afterwards. `matched_key` is only
/// meaningful when `matched` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMatchResult {
    /// Target field name
    pub field: String,

    /// Whether the schema lists this field as required
    pub required: bool,

    /// Whether a corresponding input key was found
    pub matched: bool,

    /// The input key the model identified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_key: Option<String>,

    /// The model's justification text
    pub rationale: String,

    /// True when no parseable answer was obtained within the retry budget
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub parse_failed: bool,

    /// Model calls spent on this field
    pub model_calls: u32,
}

impl FieldMatchResult {
    /// A field whose corresponding input key was identified
    pub fn found(
        field: impl Into<String>,
        required: bool,
        key: impl Into<String>,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            required,
            matched: true,
            matched_key: Some(key.into()),
            rationale: rationale.into(),
            parse_failed: false,
            model_calls: 1,
        }
    }

    /// A field with no counterpart in the input document
    pub fn missing(field: impl Into<String>, required: bool, rationale: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            required,
            matched: false,
            matched_key: None,
            rationale: rationale.into(),
            parse_failed: false,
            model_calls: 1,
        }
    }

    /// True for a required field that was not matched
    pub fn blocks_validity(&self) -> bool {
        self.required && !self.matched
    }
}

/// Per-field results for a whole schema, in schema declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaAnalysis {
    /// One record per declared field
    pub results: Vec<FieldMatchResult>,

    /// False iff some required field went unmatched
    pub overall_valid: bool,
}

impl SchemaAnalysis {
    /// Build an analysis, deriving `overall_valid` from the records
    ///
    /// # Examples
    ///
    /// ```
    /// use reshape_domain::{FieldMatchResult, SchemaAnalysis};
    ///
    /// let analysis = SchemaAnalysis::from_results(vec![
    ///     FieldMatchResult::found("id", true, "call.id", "same concept"),
    ///     FieldMatchResult::missing("model", false, "nothing similar"),
    /// ]);
    /// assert!(analysis.overall_valid);
    /// ```
    pub fn from_results(results: Vec<FieldMatchResult>) -> Self {
        let overall_valid = !results.iter().any(FieldMatchResult::blocks_validity);
        Self {
            results,
            overall_valid,
        }
    }

    /// Look up the record for a field
    pub fn get(&self, field: &str) -> Option<&FieldMatchResult> {
        self.results.iter().find(|r| r.field == field)
    }

    /// Records of matched fields, in declaration order
    pub fn matched(&self) -> impl Iterator<Item = &FieldMatchResult> {
        self.results.iter().filter(|r| r.matched)
    }

    /// Names of required fields that blocked validity
    pub fn unsatisfied_required(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.blocks_validity())
            .map(|r| r.field.as_str())
            .collect()
    }

    /// Total model calls spent across all fields
    pub fn model_calls(&self) -> u32 {
        self.results.iter().map(|r| r.model_calls).sum()
    }

    /// Pretty JSON rendering used in diagnostics
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}
