//! Check command implementation.

use crate::cli::InputArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::input::{load_data, load_schema};
use crate::output::Formatter;
use crate::provider::Backend;
use reshape_synthesizer::{SynthesisRequest, Synthesizer};

/// Execute the check command: match every field and report.
///
/// Fails with `CliError::Unsatisfiable` after printing the report when a
/// required field has no counterpart in the data.
pub async fn execute_check(
    args: InputArgs,
    config: &Config,
    api_key: Option<&str>,
    formatter: &Formatter,
) -> Result<()> {
    let schema = load_schema(&args)?;
    let document = load_data(&args)?;

    let backend = Backend::from_config(&config.provider, api_key)?;
    let synthesizer = Synthesizer::new(backend, config.synthesizer.clone());

    let mut request = SynthesisRequest::new(document, schema);
    if let Some(hint) = args.key_hints {
        request = request.with_hint(hint);
    }

    let analysis = synthesizer.check_satisfiability(&request).await;
    println!("{}", formatter.format_analysis(&analysis)?);

    if analysis.overall_valid {
        Ok(())
    } else {
        Err(CliError::Unsatisfiable(
            analysis.unsatisfied_required().join(", "),
        ))
    }
}
