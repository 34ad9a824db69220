//! Synthesize command implementation.

use crate::cli::InputArgs;
use crate::config::Config;
use crate::error::Result;
use crate::input::{load_data, load_schema};
use crate::output::Formatter;
use crate::provider::Backend;
use reshape_domain::QueryEngine;
use reshape_engine::JaqEngine;
use reshape_synthesizer::{SynthesisRequest, Synthesizer};

/// Execute the default command: synthesize a query and print it.
pub async fn execute_synthesize(
    args: InputArgs,
    apply: bool,
    config: &Config,
    api_key: Option<&str>,
    quiet: bool,
    formatter: &Formatter,
) -> Result<()> {
    let schema = load_schema(&args)?;
    let document = load_data(&args)?;

    let backend = Backend::from_config(&config.provider, api_key)?;
    let model_name = backend.model().to_string();
    let synthesizer =
        Synthesizer::new(backend, config.synthesizer.clone()).with_model_name(model_name);

    let mut request = SynthesisRequest::new(document, schema);
    if let Some(hint) = args.key_hints {
        request = request.with_hint(hint);
    }

    let outcome = synthesizer.synthesize(&request).await?;

    if !quiet {
        eprintln!("{}", formatter.outcome_summary(&outcome));
    }
    println!("{}", outcome.query);

    if apply {
        let outputs = JaqEngine::new().compile_and_run(&outcome.query, &request.document)?;
        for output in outputs {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
