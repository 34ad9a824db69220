//! Filter assembly: verified fragments into one object-construction query

use reshape_domain::{CompositeQuery, QueryFragment, TargetSchema};
use serde_json::Value;

/// Build the composite query from verified fragments
///
/// Entries follow the schema's declaration order regardless of the order of
/// `fragments`. Unverified fragments and skip sentinels are left out. Each
/// fragment is parenthesized so pipes and commas inside it stay scoped to its
/// own key.
pub fn assemble(schema: &TargetSchema, fragments: &[QueryFragment]) -> CompositeQuery {
    let mut entries = Vec::new();
    let mut fields = Vec::new();

    for spec in schema.fields() {
        let fragment = fragments
            .iter()
            .find(|f| f.field == spec.name && f.verified && !f.is_skip());

        if let Some(fragment) = fragment {
            let key = Value::String(spec.name.clone()).to_string();
            entries.push(format!("{}: ({})", key, fragment.query));
            fields.push(spec.name.clone());
        }
    }

    let text = if entries.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", entries.join(", "))
    };

    CompositeQuery { text, fields }
}
