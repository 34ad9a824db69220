//! Prompt templates for matching, fragment synthesis and repair

use reshape_domain::FieldSpec;
use serde_json::Value;

/// A system + user prompt pair sent to the model backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Standing instructions
    pub system: String,
    /// Task-specific content
    pub user: String,
}

/// Builds every prompt of a run from the shared document and hint
pub struct PromptBuilder<'a> {
    document: String,
    hint: Option<&'a str>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a prompt builder for one input document
    pub fn new(document: &Value) -> Self {
        Self {
            document: serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string()),
            hint: None,
        }
    }

    /// Attach the caller's free-text hint to every prompt
    pub fn with_hint(mut self, hint: Option<&'a str>) -> Self {
        self.hint = hint.map(str::trim).filter(|h| !h.is_empty());
        self
    }

    /// Serialized document as embedded in prompts
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Ask whether the input has a field corresponding to `field`
    pub fn field_match(&self, field: &FieldSpec) -> Prompt {
        let mut user = format!(
            "Is `{}` of type `{}` present in the input document?\n\nTarget field definition: {}\n",
            field.name,
            field.descriptor.type_label(),
            field.descriptor.raw
        );
        self.push_hint(&mut user);
        user.push_str("\nInput document:\n---\n");
        user.push_str(&self.document);
        user.push_str("\n---\n\n");
        user.push_str(ANSWER_FORMAT_REMINDER);

        Prompt {
            system: MATCH_INSTRUCTIONS.to_string(),
            user,
        }
    }

    /// Re-ask a field match after an unusable reply
    pub fn match_retry(&self, field: &FieldSpec, previous: &str, error: &str) -> Prompt {
        let mut prompt = self.field_match(field);
        prompt.user.push_str(&format!(
            "\n\nYour previous reply could not be used ({}).\nPrevious reply:\n---\n{}\n---\n\
             Reply again and finish with the ANSWER line.",
            error, previous
        ));
        prompt
    }

    /// Ask for a jq expression extracting one matched field
    pub fn fragment(&self, field: &FieldSpec, matched_key: Option<&str>) -> Prompt {
        let system = format!(
            "{}\n\nYou will extract data from the following JSON:\n\n{}",
            FRAGMENT_INSTRUCTIONS, self.document
        );

        let mut user = format!(
            "Write jq to extract the key `{}` of type `{}`.",
            field.name,
            field.descriptor.type_label()
        );
        if let Some(description) = &field.descriptor.description {
            user.push_str(&format!("\nField description: {}", description));
        }
        if let Some(key) = matched_key {
            user.push_str(&format!(
                "\nThe input field identified as corresponding to it is `{}`.",
                key
            ));
        }
        user.push('\n');
        self.push_hint(&mut user);

        Prompt { system, user }
    }

    /// Ask for a corrected version of a failing query
    pub fn repair(&self, query: &str, error: &str) -> Prompt {
        let mut user = format!(
            "The following query returned an error while extracting from the input document.\n\n\
             Query: {}\n\nError: {}\n",
            query, error
        );
        self.push_hint(&mut user);
        user.push_str("\nInput document:\n---\n");
        user.push_str(&self.document);
        user.push_str("\n---");

        Prompt {
            system: REPAIR_INSTRUCTIONS.to_string(),
            user,
        }
    }

    fn push_hint(&self, prompt: &mut String) {
        if let Some(hint) = self.hint {
            prompt.push_str(&format!("\nHint from the user: {}\n", hint));
        }
    }
}

const MATCH_INSTRUCTIONS: &str = r#"You validate JSON documents and find the data they contain.
You are given one target field and an input document. Compare the target field with every key in the document, nested keys included, one by one. For each candidate give a short side-by-side verdict, for example:

"id" | "id": The names are identical. True.
"time" | "timestamp": Same concept. True.
"addr" | "Address": Same concept under a different name. True.
"cats" | None: Nothing matching or remotely similar. False.
"input" | "input": The names match but the types are incompatible. False.

Names do not have to be identical. Judge by what the field means, and weigh any hint the user provides.
Come to one definitive conclusion."#;

const ANSWER_FORMAT_REMINDER: &str = r#"End your reply with exactly one final line of the form:
ANSWER: `<key>`
where <key> is the matching key as written in the document (use a dotted path for nested keys), or:
ANSWER: none
when no key corresponds to the target field."#;

const FRAGMENT_INSTRUCTIONS: &str = r#"You are a jq engineer who extracts data from JSON documents using jq.
Only reply with jq code. Do NOT use any natural language. Do NOT use markdown, i.e. no ```.

Rules:
- Extract only the requested key, and only as the requested type
- Do NOT extract values based on positional indices
- Do NOT invent default values
- If the key should not be extracted, reply with the bare word None (not a string)"#;

const REPAIR_INSTRUCTIONS: &str = r#"You are a jq engineer who extracts data from JSON documents using jq.
You are given a jq query, the error it produced and the document it ran against. Reply with a corrected query.
Only reply with jq code. Do NOT use any natural language. Do NOT use markdown, i.e. no ```."#;

#[cfg(test)]
mod tests {
    use super::*;
    use reshape_domain::TargetSchema;
    use serde_json::json;

    fn field(name: &str) -> FieldSpec {
        TargetSchema::from_json(&json!({
            "properties": {
                "id": {"type": ["string", "null"], "description": "A unique identifier for the record."},
                "date": {"type": "string"}
            },
            "required": ["id"]
        }))
        .unwrap()
        .field(name)
        .unwrap()
        .clone()
    }

    fn document() -> Value {
        json!({"call.id": "123", "datetime": "2022-01-01"})
    }

    #[test]
    fn test_match_prompt_includes_field_and_document() {
        let doc = document();
        let builder = PromptBuilder::new(&doc);
        let prompt = builder.field_match(&field("id"));

        assert!(prompt.user.contains("`id`"));
        assert!(prompt.user.contains(r#"`["string","null"]`"#));
        assert!(prompt.user.contains("call.id"));
        assert!(prompt.user.contains("ANSWER: none"));
        assert!(prompt.system.contains("definitive conclusion"));
    }

    #[test]
    fn test_hint_reaches_every_prompt() {
        let doc = document();
        let builder = PromptBuilder::new(&doc).with_hint(Some("ids may be dotted"));
        let f = field("id");

        assert!(builder.field_match(&f).user.contains("ids may be dotted"));
        assert!(builder.match_retry(&f, "??", "no ANSWER line").user.contains("ids may be dotted"));
        assert!(builder.fragment(&f, Some("call.id")).user.contains("ids may be dotted"));
        assert!(builder.repair(".x[", "boom").user.contains("ids may be dotted"));
    }

    #[test]
    fn test_blank_hint_is_ignored() {
        let doc = document();
        let builder = PromptBuilder::new(&doc).with_hint(Some("   "));
        assert!(!builder.field_match(&field("id")).user.contains("Hint from the user"));
    }

    #[test]
    fn test_fragment_prompt() {
        let doc = document();
        let builder = PromptBuilder::new(&doc);
        let prompt = builder.fragment(&field("id"), Some("call.id"));

        assert!(prompt.system.contains("\"datetime\""));
        assert!(prompt.system.contains("bare word None"));
        assert!(prompt.user.contains("extract the key `id`"));
        assert!(prompt.user.contains("A unique identifier for the record."));
        assert!(prompt.user.contains("`call.id`"));

        let without_key = builder.fragment(&field("date"), None);
        assert!(!without_key.user.contains("identified as corresponding"));
        assert!(!without_key.user.contains("Field description"));
    }

    #[test]
    fn test_match_retry_carries_previous_reply() {
        let doc = document();
        let builder = PromptBuilder::new(&doc);
        let prompt = builder.match_retry(&field("date"), "I think datetime", "no ANSWER line");
        assert!(prompt.user.contains("I think datetime"));
        assert!(prompt.user.contains("no ANSWER line"));
    }

    #[test]
    fn test_repair_prompt() {
        let doc = document();
        let builder = PromptBuilder::new(&doc);
        let prompt = builder.repair(".datetime[", "compile error: unexpected end");

        assert!(prompt.user.contains("Query: .datetime["));
        assert!(prompt.user.contains("Error: compile error: unexpected end"));
        assert!(prompt.user.contains("2022-01-01"));
        assert!(prompt.system.contains("corrected query"));
    }
}
