//! Repair oracle: ask the model to correct a failing query

use crate::backend::ModelGateway;
use crate::parser::clean_query_text;
use crate::prompt::PromptBuilder;
use reshape_domain::LlmProvider;
use std::fmt::Display;

/// Turns a failing query and its error into a replacement query
///
/// No judgment is made about whether the replacement is better; the next
/// check decides.
pub(crate) struct RepairOracle<'a, L> {
    gateway: &'a ModelGateway<L>,
    prompts: &'a PromptBuilder<'a>,
}

impl<'a, L> RepairOracle<'a, L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    pub(crate) fn new(gateway: &'a ModelGateway<L>, prompts: &'a PromptBuilder<'a>) -> Self {
        Self { gateway, prompts }
    }

    pub(crate) async fn repair(&self, query: &str, error: &str) -> Result<String, String> {
        let reply = self.gateway.complete(self.prompts.repair(query, error)).await?;
        Ok(clean_query_text(&reply))
    }
}
