//! End-to-end tests for the Synthesizer

#[cfg(test)]
mod tests {
    use crate::{ErrorKind, SynthesisError, SynthesisRequest, Synthesizer, SynthesizerConfig};
    use reshape_domain::{QueryEngine, SchemaValidator, TargetSchema};
    use reshape_engine::JaqEngine;
    use reshape_llm::MockProvider;
    use serde_json::{json, Value};

    const HINT: &str = "The id is the call identifier, which may be nested or dotted. \
                        The date is the call date as written. The model is the model used, if any.";

    fn schema() -> TargetSchema {
        TargetSchema::from_json(&json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": ["string", "null"],
                    "description": "A unique identifier for the record."
                },
                "date": {
                    "type": "string",
                    "description": "A string describing the date."
                },
                "model": {
                    "type": "string",
                    "description": "A text field representing the model used."
                }
            },
            "required": ["id", "date"]
        }))
        .unwrap()
    }

    fn document() -> Value {
        json!({
            "call.id": "123",
            "datetime": "2022-01-01",
            "timestamp": 1640995200,
            "Address": "123 Main St",
            "user": {"name": "John Doe", "age": 30, "contact": "john@email.com"}
        })
    }

    fn synthesizer(provider: MockProvider) -> Synthesizer<MockProvider> {
        Synthesizer::new(provider, SynthesizerConfig::default()).with_model_name("mock")
    }

    #[tokio::test]
    async fn test_full_synthesis_flow() {
        let provider = MockProvider::scripted([
            "\"id\" | \"call.id\": Same concept. True.\nANSWER: `call.id`",
            "\"date\" | \"datetime\": Same concept. True.\nANSWER: `datetime`",
            "\"model\" | None: Nothing similar. False.\nANSWER: none",
            ".[\"call.id\"]",
            ".datetime",
        ]);
        let recorder = provider.clone();
        let request = SynthesisRequest::new(document(), schema()).with_hint(HINT);

        let outcome = synthesizer(provider).synthesize(&request).await.unwrap();

        let produced = JaqEngine::new()
            .compile_and_run(&outcome.query, &request.document)
            .unwrap();
        assert_eq!(produced, vec![json!({"id": "123", "date": "2022-01-01"})]);
        assert_eq!(outcome.output, json!({"id": "123", "date": "2022-01-01"}));

        assert!(outcome.analysis.overall_valid);
        assert_eq!(outcome.fragments.len(), 2);
        assert!(outcome.fragments.iter().all(|f| f.verified));
        assert!(outcome.skipped_fields.is_empty());
        assert_eq!(outcome.composite_repairs, 0);
        assert_eq!(outcome.metadata.model_name, "mock");
        assert_eq!(outcome.metadata.model_calls, 5);

        let calls = recorder.calls();
        assert_eq!(calls.len(), 5);
        assert!(calls.iter().all(|c| c.user.contains(HINT)));
        assert_eq!(recorder.remaining_script(), 0);
    }

    #[tokio::test]
    async fn test_unsatisfiable_schema_stops_before_fragments() {
        let document = json!({"call.id": "123", "timestamp": "not a date", "model": "gpt-4"});
        let provider = MockProvider::scripted([
            "ANSWER: `call.id`",
            "\"date\" | None: Nothing date-like. False.\nANSWER: none",
            "ANSWER: `model`",
        ]);
        let recorder = provider.clone();
        let request = SynthesisRequest::new(document, schema()).with_hint(HINT);

        let err = synthesizer(provider).synthesize_query(&request).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::SchemaUnsatisfiable);
        match &err {
            SynthesisError::SchemaUnsatisfiable { analysis } => {
                assert!(!analysis.overall_valid);
                assert_eq!(analysis.unsatisfied_required(), vec!["date"]);
                assert_eq!(analysis.results.len(), 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("Nothing date-like"));

        // Only the three matcher calls were made
        assert_eq!(recorder.call_count(), 3);
        assert!(recorder.calls().iter().all(|c| !c.system.contains("jq engineer")));
    }

    #[tokio::test]
    async fn test_check_satisfiability_reports_without_failing() {
        let provider = MockProvider::scripted(["ANSWER: none", "ANSWER: none", "ANSWER: none"]);
        let request = SynthesisRequest::new(json!({"weather": "sunny"}), schema());

        let analysis = synthesizer(provider).check_satisfiability(&request).await;

        assert!(!analysis.overall_valid);
        assert_eq!(analysis.unsatisfied_required(), vec!["id", "date"]);
    }

    #[tokio::test]
    async fn test_schema_without_required_fields_is_always_satisfiable() {
        let schema = TargetSchema::from_json(&json!({
            "type": "object",
            "properties": {"a": {"type": "string"}, "b": {"type": "number"}}
        }))
        .unwrap();
        let provider = MockProvider::new("ANSWER: none");
        let request = SynthesisRequest::new(document(), schema);
        let synthesizer = synthesizer(provider);

        assert!(synthesizer.check_satisfiability(&request).await.overall_valid);

        let outcome = synthesizer.synthesize(&request).await.unwrap();
        assert_eq!(outcome.query, "{}");
        assert_eq!(outcome.output, json!({}));
    }

    #[test]
    fn test_matching_is_idempotent() {
        let replies = ["ANSWER: `call.id`", "ANSWER: `datetime`", "ANSWER: none"];
        let provider = MockProvider::scripted(replies);
        let synthesizer = synthesizer(provider.clone());
        let request = SynthesisRequest::new(document(), schema()).with_hint(HINT);

        let first = tokio_test::block_on(synthesizer.check_satisfiability(&request));
        provider.push_responses(replies);
        let second = tokio_test::block_on(synthesizer.check_satisfiability(&request));

        assert_eq!(first, second);
        assert!(first.overall_valid);
    }

    #[tokio::test]
    async fn test_fragment_retry_bound_is_exact() {
        for max_retries in [0u32, 2, 5] {
            let provider = MockProvider::new(".[\"call.id\"");
            provider.push_responses(["ANSWER: `call.id`", "ANSWER: `datetime`", "ANSWER: none"]);
            let recorder = provider.clone();
            let request = SynthesisRequest::new(document(), schema()).with_max_retries(max_retries);

            let err = synthesizer(provider).synthesize(&request).await.unwrap_err();

            match err {
                SynthesisError::FragmentSynthesisExhausted {
                    field,
                    attempts,
                    last_query,
                    ..
                } => {
                    assert_eq!(field, "id");
                    assert_eq!(attempts, max_retries + 1);
                    assert_eq!(last_query, ".[\"call.id\"");
                }
                other => panic!("unexpected error: {:?}", other),
            }

            // three matcher calls, one synthesis call, then exactly max_retries repairs
            let repair_calls = recorder
                .calls()
                .iter()
                .filter(|c| c.system.contains("corrected query"))
                .count();
            assert_eq!(repair_calls, max_retries as usize);
            assert_eq!(recorder.call_count(), 4 + max_retries as usize);
        }
    }

    #[tokio::test]
    async fn test_broken_fragment_is_repaired() {
        let provider = MockProvider::scripted([
            "ANSWER: `call.id`",
            "ANSWER: `datetime`",
            "ANSWER: none",
            ".call.id[",
            ".[\"call.id\"]",
            "```jq\n.datetime\n```",
        ]);
        let request = SynthesisRequest::new(document(), schema());

        let outcome = synthesizer(provider).synthesize(&request).await.unwrap();

        assert_eq!(outcome.output, json!({"id": "123", "date": "2022-01-01"}));
        assert_eq!(outcome.fragments[0].repairs, 1);
        assert_eq!(outcome.fragments[1].repairs, 0);
        assert_eq!(outcome.metadata.model_calls, 6);
    }

    #[tokio::test]
    async fn test_backend_failure_is_repaired_like_any_error() {
        let provider = MockProvider::scripted([
            "ANSWER: `call.id`",
            "ANSWER: `datetime`",
            "ANSWER: none",
        ]);
        provider.push_error("upstream returned 502");
        provider.push_responses([".[\"call.id\"]", ".datetime"]);
        let recorder = provider.clone();
        let request = SynthesisRequest::new(document(), schema());

        let outcome = synthesizer(provider).synthesize(&request).await.unwrap();

        assert_eq!(outcome.output, json!({"id": "123", "date": "2022-01-01"}));
        let repair = &recorder.calls()[4];
        assert!(repair.user.contains("upstream returned 502"));
    }

    #[tokio::test]
    async fn test_none_sentinel_drops_field() {
        let provider = MockProvider::scripted([
            "ANSWER: `call.id`",
            "ANSWER: `datetime`",
            "ANSWER: `timestamp`",
            ".[\"call.id\"]",
            ".datetime",
            "None",
        ]);
        let request = SynthesisRequest::new(document(), schema());

        let outcome = synthesizer(provider).synthesize(&request).await.unwrap();

        assert_eq!(outcome.skipped_fields, vec!["model"]);
        assert!(!outcome.query.contains("\"model\""));
        assert!(!outcome.query.contains("None"));
        assert_eq!(outcome.output, json!({"id": "123", "date": "2022-01-01"}));
        assert_eq!(outcome.metadata.model_calls, 6);
    }

    #[tokio::test]
    async fn test_composite_follows_schema_order() {
        let schema = TargetSchema::from_json(&json!({
            "type": "object",
            "properties": {
                "date": {"type": "string"},
                "id": {"type": "string"}
            },
            "required": ["id"]
        }))
        .unwrap();
        let provider = MockProvider::scripted([
            "ANSWER: `datetime`",
            "ANSWER: `call.id`",
            ".datetime",
            ".[\"call.id\"]",
        ]);
        let request = SynthesisRequest::new(document(), schema);

        let outcome = synthesizer(provider).synthesize(&request).await.unwrap();

        assert_eq!(
            outcome.query,
            r#"{ "date": (.datetime), "id": (.["call.id"]) }"#
        );
        let fields: Vec<_> = outcome.fragments.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["date", "id"]);
    }

    fn integer_id_schema() -> TargetSchema {
        TargetSchema::from_json(&json!({
            "type": "object",
            "properties": {"id": {"type": "integer"}},
            "required": ["id"]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_composite_validation_failure_is_repaired() {
        let provider = MockProvider::scripted([
            "ANSWER: `call.id`",
            ".[\"call.id\"]",
            "{ \"id\": (.timestamp) }",
        ]);
        let recorder = provider.clone();
        let request = SynthesisRequest::new(document(), integer_id_schema());

        let outcome = synthesizer(provider).synthesize(&request).await.unwrap();

        assert_eq!(outcome.output, json!({"id": 1640995200}));
        assert_eq!(outcome.composite_repairs, 1);
        assert_eq!(outcome.query, "{ \"id\": (.timestamp) }");

        let repair = &recorder.calls()[2];
        assert!(repair.user.contains("does not match the target schema"));
    }

    #[tokio::test]
    async fn test_runaway_fragment_is_repaired() {
        let provider = MockProvider::scripted(["ANSWER: `call.id`", "repeat(1)", ".timestamp"]);
        let recorder = provider.clone();
        let config = SynthesizerConfig {
            max_query_outputs: 5,
            ..Default::default()
        };
        let request = SynthesisRequest::new(document(), integer_id_schema());

        let outcome = Synthesizer::new(provider, config)
            .synthesize(&request)
            .await
            .unwrap();

        assert_eq!(outcome.output, json!({"id": 1640995200}));
        assert_eq!(outcome.fragments[0].repairs, 1);
        assert!(recorder.calls()[2].user.contains("more than 5 outputs"));
    }

    #[tokio::test]
    async fn test_endless_composite_uses_first_output() {
        let provider = MockProvider::scripted([
            "ANSWER: `call.id`",
            ".[\"call.id\"]",
            "{ \"id\": (.timestamp) }, repeat(1)",
        ]);
        let request = SynthesisRequest::new(document(), integer_id_schema());

        let outcome = synthesizer(provider).synthesize(&request).await.unwrap();

        assert_eq!(outcome.output, json!({"id": 1640995200}));
        assert_eq!(outcome.composite_repairs, 1);
    }

    #[tokio::test]
    async fn test_composite_retry_bound_is_exact() {
        let stuck = "{ \"id\": (.[\"call.id\"]) }";
        let provider = MockProvider::new(stuck);
        provider.push_responses(["ANSWER: `call.id`", ".[\"call.id\"]"]);
        let recorder = provider.clone();
        let request = SynthesisRequest::new(document(), integer_id_schema()).with_max_retries(3);

        let err = synthesizer(provider).synthesize(&request).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CompositeValidationExhausted);
        match err {
            SynthesisError::CompositeValidationExhausted {
                attempts,
                last_query,
                last_error,
            } => {
                assert_eq!(attempts, 4);
                assert_eq!(last_query, stuck);
                assert!(last_error.contains("does not match the target schema"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(recorder.call_count(), 2 + 3);
    }

    #[tokio::test]
    async fn test_custom_validator_is_used() {
        struct RejectAll;
        impl SchemaValidator for RejectAll {
            fn validate(&self, _value: &Value, _schema: &TargetSchema) -> Result<(), String> {
                Err("rejected".to_string())
            }
        }

        let provider = MockProvider::new(".datetime");
        provider.push_responses(["ANSWER: `call.id`", "ANSWER: `datetime`", "ANSWER: none"]);
        let synthesizer = Synthesizer::with_collaborators(
            provider,
            JaqEngine::new(),
            RejectAll,
            SynthesizerConfig::quick(),
        );
        let request = SynthesisRequest::new(document(), schema());

        let err = synthesizer.synthesize(&request).await.unwrap_err();
        match err {
            SynthesisError::CompositeValidationExhausted { attempts, last_error, .. } => {
                assert_eq!(attempts, SynthesizerConfig::quick().max_retries + 1);
                assert!(last_error.contains("rejected"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_document_too_large() {
        let config = SynthesizerConfig {
            max_document_chars: 10,
            ..Default::default()
        };
        let provider = MockProvider::default();
        let recorder = provider.clone();
        let synthesizer = Synthesizer::new(provider, config);
        let request = SynthesisRequest::new(document(), schema());

        let err = synthesizer.synthesize(&request).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DocumentTooLarge);
        assert_eq!(recorder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_document_cap_counts_characters() {
        let optional = TargetSchema::from_json(&json!({
            "type": "object",
            "properties": {"note": {"type": "string"}}
        }))
        .unwrap();
        // 13 characters, 18 bytes
        let document = json!({"k": "ééééé"});
        let request = SynthesisRequest::new(document, optional);

        let at_cap = SynthesizerConfig {
            max_document_chars: 13,
            ..Default::default()
        };
        let outcome = Synthesizer::new(MockProvider::scripted(["ANSWER: none"]), at_cap)
            .synthesize(&request)
            .await
            .unwrap();
        assert_eq!(outcome.query, "{}");

        let below_cap = SynthesizerConfig {
            max_document_chars: 12,
            ..Default::default()
        };
        let err = Synthesizer::new(MockProvider::default(), below_cap)
            .synthesize(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::DocumentTooLarge(13, 12)));
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let config = SynthesizerConfig {
            llm_timeout_secs: 0,
            ..Default::default()
        };
        let synthesizer = Synthesizer::new(MockProvider::default(), config);
        let request = SynthesisRequest::new(document(), schema());

        let err = synthesizer.synthesize(&request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
