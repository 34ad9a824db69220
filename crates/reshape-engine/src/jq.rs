//! jq execution over the `jaq` interpreter

use jaq_interpret::{Ctx, Filter, FilterT, ParseCtx, RcIter, Val};
use reshape_domain::{EngineError, QueryEngine};
use serde_json::Value;
use std::ops::Range;
use tracing::debug;

/// jq engine backed by `jaq`
///
/// Queries are compiled against jaq's core natives and, unless disabled, its
/// standard library (`map`, `select`, `tostring`, ...).
///
/// # Examples
///
/// ```
/// use reshape_domain::QueryEngine;
/// use reshape_engine::JaqEngine;
/// use serde_json::json;
///
/// let engine = JaqEngine::new();
/// let out = engine
///     .compile_and_run(r#"{ "id": (.["call.id"]) }"#, &json!({"call.id": "123"}))
///     .unwrap();
/// assert_eq!(out, vec![json!({"id": "123"})]);
/// ```
#[derive(Debug, Clone)]
pub struct JaqEngine {
    with_std: bool,
    max_outputs: usize,
}

/// Outputs collected by [`JaqEngine::run`] before the query is rejected
pub const DEFAULT_MAX_OUTPUTS: usize = 1_000;

impl JaqEngine {
    /// Engine with core filters and the standard library
    pub fn new() -> Self {
        Self {
            with_std: true,
            max_outputs: DEFAULT_MAX_OUTPUTS,
        }
    }

    /// Engine restricted to core filters
    pub fn core_only() -> Self {
        Self {
            with_std: false,
            ..Self::new()
        }
    }

    /// Set the output cap for [`JaqEngine::run`]
    ///
    /// A query yielding more outputs fails with a runtime error, so
    /// generators such as `repeat(1)` terminate.
    pub fn with_max_outputs(mut self, max_outputs: usize) -> Self {
        self.max_outputs = max_outputs;
        self
    }

    /// Output cap in effect
    pub fn max_outputs(&self) -> usize {
        self.max_outputs
    }

    /// Parse and compile a query
    pub fn compile(&self, query: &str) -> Result<Filter, EngineError> {
        let mut defs = ParseCtx::new(Vec::new());
        defs.insert_natives(jaq_core::core());
        if self.with_std {
            defs.insert_defs(jaq_std::std());
        }

        let (parsed, errs) = jaq_parse::parse(query, jaq_parse::main());
        if !errs.is_empty() {
            return Err(EngineError::Compile(render_parse_errors(query, &errs)));
        }
        let main = parsed.ok_or_else(|| EngineError::Compile("empty query".to_string()))?;

        let filter = defs.compile(main);
        if !defs.errs.is_empty() {
            let rendered = defs
                .errs
                .iter()
                .map(|(e, span)| format!("{} `{}`", e, excerpt(query, span)))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(EngineError::Compile(rendered));
        }
        Ok(filter)
    }

    /// Run a compiled filter over a document, collecting up to
    /// `max_outputs` outputs
    pub fn run(&self, filter: &Filter, document: &Value) -> Result<Vec<Value>, EngineError> {
        let inputs = RcIter::new(core::iter::empty());
        let mut collected = Vec::new();
        for output in filter.run((Ctx::new([], &inputs), Val::from(document.clone()))) {
            if collected.len() == self.max_outputs {
                return Err(EngineError::Runtime(format!(
                    "query produced more than {} outputs",
                    self.max_outputs
                )));
            }
            let value = output.map_err(|e| EngineError::Runtime(e.to_string()))?;
            collected.push(Value::from(value));
        }
        Ok(collected)
    }

    /// Run a compiled filter over a document, pulling only its first output
    pub fn run_first(&self, filter: &Filter, document: &Value) -> Result<Option<Value>, EngineError> {
        let inputs = RcIter::new(core::iter::empty());
        let mut outputs = filter.run((Ctx::new([], &inputs), Val::from(document.clone())));
        let first = match outputs.next() {
            Some(Ok(value)) => Some(Value::from(value)),
            Some(Err(e)) => return Err(EngineError::Runtime(e.to_string())),
            None => None,
        };
        Ok(first)
    }
}

impl Default for JaqEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEngine for JaqEngine {
    fn compile_and_run(&self, query: &str, document: &Value) -> Result<Vec<Value>, EngineError> {
        let filter = self.compile(query)?;
        let outputs = self.run(&filter, document)?;
        debug!(outputs = outputs.len(), query_chars = query.len(), "jq query ran");
        Ok(outputs)
    }

    fn compile_and_first(&self, query: &str, document: &Value) -> Result<Option<Value>, EngineError> {
        let filter = self.compile(query)?;
        self.run_first(&filter, document)
    }
}

/// Query text covered by `span`, or the empty string when it falls outside
fn excerpt<'q>(query: &'q str, span: &Range<usize>) -> &'q str {
    query.get(span.clone()).unwrap_or("")
}

/// One line per parse error: position, offending token and what was expected
fn render_parse_errors(query: &str, errors: &[jaq_parse::Error]) -> String {
    errors
        .iter()
        .map(|e| {
            let span = e.span();
            let found = match e.found() {
                Some(token) => format!("`{}`", token),
                None => "end of input".to_string(),
            };
            let mut expected: Vec<String> = e
                .expected()
                .filter_map(|token| token.as_ref().map(|t| format!("`{}`", t)))
                .collect();
            expected.sort();
            let mut message = format!(
                "unexpected {} at position {} in `{}`",
                found,
                span.start,
                query.trim()
            );
            if !expected.is_empty() {
                message.push_str(&format!(", expected one of {}", expected.join(" ")));
            }
            message
        })
        .collect::<Vec<_>>()
        .join("; ")
}
