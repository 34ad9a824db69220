//! Reshape Synthesizer
//!
//! Builds a jq query that reshapes an arbitrary JSON document into a target
//! JSON-Schema, with a language model proposing and repairing the pieces.
//!
//! # Architecture
//!
//! ```text
//! Document + Schema → Field Matcher → Satisfiability → Fragments → Assembly → Composite check → jq
//!                                                          ↑   ↓                    ↑   ↓
//!                                                       Repair Oracle            Repair Oracle
//! ```
//!
//! Every model reply is checked (parsed, compiled and run, or validated), and a
//! failed check is sent back to the model together with its error until it
//! passes or the retry budget runs out. Each loop gets a fresh budget of
//! `max_retries` repair invocations.
//!
//! # Example Usage
//!
//! ```no_run
//! use reshape_domain::TargetSchema;
//! use reshape_llm::MockProvider;
//! use reshape_synthesizer::{SynthesisRequest, Synthesizer, SynthesizerConfig};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = TargetSchema::from_json(&json!({
//!     "type": "object",
//!     "properties": {"id": {"type": "string"}},
//!     "required": ["id"]
//! }))?;
//! let document = json!({"call.id": "123"});
//!
//! let llm = MockProvider::scripted(["ANSWER: `call.id`", ".[\"call.id\"]"]);
//! let synthesizer = Synthesizer::new(llm, SynthesizerConfig::default());
//!
//! let request = SynthesisRequest::new(document, schema).with_hint("ids may be dotted");
//! let query = synthesizer.synthesize_query(&request).await?;
//!
//! println!("{}", query);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod assembler;
mod backend;
mod config;
mod error;
mod fragment;
mod matcher;
mod parser;
mod prompt;
mod repair;
mod repair_loop;
mod synthesizer;
mod types;

#[cfg(test)]
mod tests;

pub use assembler::assemble;
pub use config::SynthesizerConfig;
pub use error::{ErrorKind, SynthesisError};
pub use parser::{clean_query_text, parse_match_answer, ParseError};
pub use prompt::{Prompt, PromptBuilder};
pub use repair_loop::{Exhausted, RepairLoop, Verified};
pub use synthesizer::{Stage, Synthesizer};
pub use types::{SynthesisMetadata, SynthesisOutcome, SynthesisRequest};
