//! Per-field fragment synthesis and verification

use crate::backend::ModelGateway;
use crate::error::SynthesisError;
use crate::parser::clean_query_text;
use crate::prompt::PromptBuilder;
use crate::repair::RepairOracle;
use crate::repair_loop::RepairLoop;
use reshape_domain::{FieldSpec, LlmProvider, QueryEngine, QueryFragment, SKIP_SENTINEL};
use serde_json::Value;
use std::fmt::Display;
use tracing::{debug, info};

/// What synthesis produced for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FragmentOutcome {
    /// A fragment that compiled and ran cleanly against the input
    Verified(QueryFragment),
    /// The model answered with the skip sentinel; the field is left out
    Skipped,
}

/// Synthesizes a jq fragment for a matched field and repairs it until it runs
pub(crate) struct FragmentSynthesizer<'a, L, E> {
    gateway: &'a ModelGateway<L>,
    prompts: &'a PromptBuilder<'a>,
    oracle: &'a RepairOracle<'a, L>,
    engine: &'a E,
    document: &'a Value,
    repair_loop: RepairLoop,
}

impl<'a, L, E> FragmentSynthesizer<'a, L, E>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
    E: QueryEngine,
{
    pub(crate) fn new(
        gateway: &'a ModelGateway<L>,
        prompts: &'a PromptBuilder<'a>,
        oracle: &'a RepairOracle<'a, L>,
        engine: &'a E,
        document: &'a Value,
        repair_loop: RepairLoop,
    ) -> Self {
        Self {
            gateway,
            prompts,
            oracle,
            engine,
            document,
            repair_loop,
        }
    }

    pub(crate) async fn synthesize(
        &self,
        field: &FieldSpec,
        matched_key: Option<&str>,
    ) -> Result<FragmentOutcome, SynthesisError> {
        let initial = self
            .gateway
            .complete(self.prompts.fragment(field, matched_key))
            .await
            .map(|reply| clean_query_text(&reply));

        // The sentinel is checked before anything reaches the engine
        if matches!(&initial, Ok(text) if text == SKIP_SENTINEL) {
            info!("Model declined to extract field '{}', skipping", field.name);
            return Ok(FragmentOutcome::Skipped);
        }

        let oracle = self.oracle;
        let verified = self
            .repair_loop
            .run(
                "fragment",
                initial,
                |query| self.check(query),
                |query, error| async move { oracle.repair(&query, &error).await },
            )
            .await
            .map_err(|exhausted| SynthesisError::FragmentSynthesisExhausted {
                field: field.name.clone(),
                attempts: exhausted.attempts(),
                last_error: exhausted.last_error,
                last_query: exhausted.last_text,
            })?;

        debug!(
            "Fragment for '{}' verified after {} repairs: {}",
            field.name, verified.repairs, verified.text
        );

        Ok(FragmentOutcome::Verified(QueryFragment {
            field: field.name.clone(),
            query: verified.text,
            verified: true,
            repairs: verified.repairs,
        }))
    }

    fn check(&self, query: &str) -> Result<(), String> {
        if query.is_empty() {
            return Err("empty query".to_string());
        }
        self.engine
            .compile_and_run(query, self.document)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
