//! Field matching and schema satisfiability

use crate::backend::ModelGateway;
use crate::parser::parse_match_answer;
use crate::prompt::PromptBuilder;
use crate::repair_loop::RepairLoop;
use reshape_domain::{FieldMatchResult, FieldSpec, LlmProvider, SchemaAnalysis, TargetSchema};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Asks the model which input key, if any, corresponds to each target field
///
/// "No match" is a normal outcome. A reply without a usable `ANSWER:` line is
/// re-asked through the repair loop; if the budget runs out the field is
/// recorded as unmatched with `parse_failed` set, so analysis never fails.
pub(crate) struct FieldMatcher<'a, L> {
    gateway: &'a ModelGateway<L>,
    prompts: &'a PromptBuilder<'a>,
    repair_loop: RepairLoop,
}

impl<'a, L> FieldMatcher<'a, L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    pub(crate) fn new(
        gateway: &'a ModelGateway<L>,
        prompts: &'a PromptBuilder<'a>,
        repair_loop: RepairLoop,
    ) -> Self {
        Self {
            gateway,
            prompts,
            repair_loop,
        }
    }

    /// Match every declared field, in declaration order
    pub(crate) async fn analyze(&self, schema: &TargetSchema) -> SchemaAnalysis {
        let mut results = Vec::with_capacity(schema.fields().len());

        for field in schema.fields() {
            let result = self.match_field(field).await;
            debug!(
                "Field '{}': matched={} key={:?}",
                result.field, result.matched, result.matched_key
            );
            results.push(result);
        }

        let analysis = SchemaAnalysis::from_results(results);
        info!(
            "Satisfiability: {}/{} fields matched, overall_valid={}",
            analysis.matched().count(),
            analysis.results.len(),
            analysis.overall_valid
        );
        analysis
    }

    /// Match one field against the input document
    pub(crate) async fn match_field(&self, field: &FieldSpec) -> FieldMatchResult {
        let initial = self.gateway.complete(self.prompts.field_match(field)).await;

        let outcome = self
            .repair_loop
            .run(
                "field_match",
                initial,
                |reply| parse_match_answer(reply).map_err(|e| e.to_string()),
                |previous, error| {
                    self.gateway
                        .complete(self.prompts.match_retry(field, &previous, &error))
                },
            )
            .await;

        match outcome {
            Ok(verified) => {
                let mut result = match verified.value {
                    Some(key) => FieldMatchResult::found(
                        field.name.as_str(),
                        field.required,
                        key,
                        verified.text,
                    ),
                    None => {
                        FieldMatchResult::missing(field.name.as_str(), field.required, verified.text)
                    }
                };
                result.model_calls = verified.repairs + 1;
                result
            }
            Err(exhausted) => {
                warn!(
                    "No usable answer for field '{}' after {} attempts: {}",
                    field.name,
                    exhausted.attempts(),
                    exhausted.last_error
                );
                let mut result = FieldMatchResult::missing(
                    field.name.as_str(),
                    field.required,
                    format!(
                        "no usable answer after {} attempts ({}): {}",
                        exhausted.attempts(),
                        exhausted.last_error,
                        exhausted.last_text
                    ),
                );
                result.parse_failed = true;
                result.model_calls = exhausted.attempts();
                result
            }
        }
    }
}
