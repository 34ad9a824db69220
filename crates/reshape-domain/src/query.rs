//! Query artifacts produced during synthesis

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exact fragment text meaning "do not extract this field"
pub const SKIP_SENTINEL: &str = "None";

/// A per-field extraction expression
///
/// `verified` is only set once the text has compiled and run cleanly against
/// the input; `repairs` counts the repair rounds it took to get there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFragment {
    /// Target field this fragment extracts
    pub field: String,

    /// Current query text
    pub query: String,

    /// Whether the text compiled and ran cleanly against the input
    pub verified: bool,

    /// Repair invocations consumed so far
    pub repairs: u32,
}

impl QueryFragment {
    /// A freshly synthesized, unverified fragment
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
            verified: false,
            repairs: 0,
        }
    }

    /// True when the text is the literal skip sentinel (not the string `"None"`)
    pub fn is_skip(&self) -> bool {
        self.query == SKIP_SENTINEL
    }
}

/// The single assembled query producing the whole target shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeQuery {
    /// Query text
    pub text: String,

    /// Fields present in the object expression, in schema order
    pub fields: Vec<String>,
}

impl fmt::Display for CompositeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
