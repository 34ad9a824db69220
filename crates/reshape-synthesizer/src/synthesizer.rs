//! Core Synthesizer implementation

use crate::assembler::assemble;
use crate::backend::ModelGateway;
use crate::config::SynthesizerConfig;
use crate::error::SynthesisError;
use crate::fragment::{FragmentOutcome, FragmentSynthesizer};
use crate::matcher::FieldMatcher;
use crate::prompt::PromptBuilder;
use crate::repair::RepairOracle;
use crate::repair_loop::RepairLoop;
use crate::types::{SynthesisMetadata, SynthesisOutcome, SynthesisRequest};
use reshape_domain::{LlmProvider, QueryEngine, SchemaAnalysis, SchemaValidator, TargetSchema};
use reshape_engine::{JaqEngine, JsonSchemaValidator};
use serde_json::Value;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Pipeline stages; `Succeeded` and `Failed` are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Request accepted
    Start,
    /// Matching target fields against the input
    SchemaCheck,
    /// Synthesizing and verifying per-field fragments
    SynthesizeFragments,
    /// Building the composite query
    Assemble,
    /// Running and validating the composite query
    ValidateComposite,
    /// A verified query was produced
    Succeeded,
    /// The run ended with an error
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "START",
            Stage::SchemaCheck => "SCHEMA_CHECK",
            Stage::SynthesizeFragments => "SYNTHESIZE_FRAGMENTS",
            Stage::Assemble => "ASSEMBLE",
            Stage::ValidateComposite => "VALIDATE_COMPOSITE",
            Stage::Succeeded => "SUCCEEDED",
            Stage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    info!("{} -> {}", stage, next);
    *stage = next;
}

/// The Synthesizer turns an input document and a target schema into a jq
/// query that reshapes the one into the other
pub struct Synthesizer<L, E = JaqEngine, V = JsonSchemaValidator> {
    gateway: ModelGateway<L>,
    engine: E,
    validator: V,
    config: SynthesizerConfig,
    model_name: String,
}

impl<L> Synthesizer<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: fmt::Display,
{
    /// Create a new Synthesizer backed by jaq and the jsonschema validator
    pub fn new(llm_provider: L, config: SynthesizerConfig) -> Self {
        Self::with_collaborators(
            llm_provider,
            JaqEngine::new().with_max_outputs(config.max_query_outputs),
            JsonSchemaValidator::new(),
            config,
        )
    }
}

impl<L, E, V> Synthesizer<L, E, V>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: fmt::Display,
    E: QueryEngine,
    V: SchemaValidator,
{
    /// Create a new Synthesizer with explicit query engine and validator
    pub fn with_collaborators(
        llm_provider: L,
        engine: E,
        validator: V,
        config: SynthesizerConfig,
    ) -> Self {
        Self {
            gateway: ModelGateway::new(llm_provider, config.llm_timeout()),
            engine,
            validator,
            config,
            model_name: "llm".to_string(),
        }
    }

    /// Create a new Synthesizer with a specific model name
    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    /// The active configuration
    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Match every target field against the input
    ///
    /// Never fails: unsatisfiability is reported through
    /// `SchemaAnalysis::overall_valid`.
    pub async fn check_satisfiability(&self, request: &SynthesisRequest) -> SchemaAnalysis {
        let prompts = self.prompts(request);
        FieldMatcher::new(&self.gateway, &prompts, self.repair_loop(request))
            .analyze(&request.schema)
            .await
    }

    /// Run the whole pipeline and return only the verified query text
    pub async fn synthesize_query(&self, request: &SynthesisRequest) -> Result<String, SynthesisError> {
        self.synthesize(request).await.map(|outcome| outcome.query)
    }

    /// Run the whole pipeline
    pub async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<SynthesisOutcome, SynthesisError> {
        let start_time = Instant::now();
        let mut stage = Stage::Start;

        self.config.validate().map_err(SynthesisError::Config)?;

        let document_chars = request.document.to_string().chars().count();
        if document_chars > self.config.max_document_chars {
            return Err(SynthesisError::DocumentTooLarge(
                document_chars,
                self.config.max_document_chars,
            ));
        }

        info!(
            "Starting synthesis: {} target fields, document length {}",
            request.schema.fields().len(),
            document_chars
        );

        let prompts = self.prompts(request);
        let repair_loop = self.repair_loop(request);

        advance(&mut stage, Stage::SchemaCheck);
        let analysis = FieldMatcher::new(&self.gateway, &prompts, repair_loop)
            .analyze(&request.schema)
            .await;
        if !analysis.overall_valid {
            warn!(
                "Required fields missing from input: {}",
                analysis.unsatisfied_required().join(", ")
            );
            advance(&mut stage, Stage::Failed);
            return Err(SynthesisError::SchemaUnsatisfiable { analysis });
        }

        advance(&mut stage, Stage::SynthesizeFragments);
        let oracle = RepairOracle::new(&self.gateway, &prompts);
        let fragment_synthesizer = FragmentSynthesizer::new(
            &self.gateway,
            &prompts,
            &oracle,
            &self.engine,
            &request.document,
            repair_loop,
        );

        let mut fragments = Vec::new();
        let mut skipped_fields = Vec::new();
        for result in analysis.matched() {
            let Some(field) = request.schema.field(&result.field) else {
                continue;
            };
            match fragment_synthesizer
                .synthesize(field, result.matched_key.as_deref())
                .await
            {
                Ok(FragmentOutcome::Verified(fragment)) => fragments.push(fragment),
                Ok(FragmentOutcome::Skipped) => skipped_fields.push(field.name.clone()),
                Err(e) => {
                    advance(&mut stage, Stage::Failed);
                    return Err(e);
                }
            }
        }

        advance(&mut stage, Stage::Assemble);
        let composite = assemble(&request.schema, &fragments);
        debug!("Composite query: {}", composite);

        advance(&mut stage, Stage::ValidateComposite);
        let oracle = &oracle;
        let verified = repair_loop
            .run(
                "composite",
                Ok(composite.text.clone()),
                |query| self.check_composite(query, &request.document, &request.schema),
                |query, error| async move { oracle.repair(&query, &error).await },
            )
            .await;

        let verified = match verified {
            Ok(verified) => verified,
            Err(exhausted) => {
                advance(&mut stage, Stage::Failed);
                return Err(SynthesisError::CompositeValidationExhausted {
                    attempts: exhausted.attempts(),
                    last_error: exhausted.last_error,
                    last_query: exhausted.last_text,
                });
            }
        };
        advance(&mut stage, Stage::Succeeded);

        let model_calls = analysis.model_calls()
            + fragments.iter().map(|f| f.repairs + 1).sum::<u32>()
            + skipped_fields.len() as u32
            + verified.repairs;

        let metadata = SynthesisMetadata {
            model_name: self.model_name.clone(),
            model_calls,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Synthesis complete: {} fragments, {} skipped, {} composite repairs, {} model calls",
            fragments.len(),
            skipped_fields.len(),
            verified.repairs,
            model_calls
        );

        Ok(SynthesisOutcome {
            query: verified.text,
            output: verified.value,
            analysis,
            fragments,
            skipped_fields,
            composite_repairs: verified.repairs,
            metadata,
        })
    }

    /// Run the composite, take its first output and validate it
    fn check_composite(
        &self,
        query: &str,
        document: &Value,
        schema: &TargetSchema,
    ) -> Result<Value, String> {
        let output = self
            .engine
            .compile_and_first(query, document)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| "query produced no output".to_string())?;

        self.validator
            .validate(&output, schema)
            .map_err(|e| format!("output does not match the target schema: {}", e))?;
        Ok(output)
    }

    fn prompts<'r>(&self, request: &'r SynthesisRequest) -> PromptBuilder<'r> {
        PromptBuilder::new(&request.document).with_hint(request.hint.as_deref())
    }

    fn repair_loop(&self, request: &SynthesisRequest) -> RepairLoop {
        RepairLoop::new(request.max_retries.unwrap_or(self.config.max_retries))
            .with_delay(self.config.repair_delay())
    }
}
