//! Integration tests for Hikaku
//!
//! End-to-end tests that verify the complete comparison works together.
//!
mod common;
use common::*;
use hikaku::error::{DocumentSide, WarningKind};
use hikaku::prelude::*;
use serde_json::json;
use std::fs;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_self_match_identity() {
        for doc in [weather_reference(), kitchen_sink()] {
            let report = compare_workflow(&doc, &doc).expect("Comparison failed");

            assert_eq!(report.structural.subtree_match_ratio, 1.0);
            assert_eq!(report.structural.weighted_accuracy, 1.0);
            assert!(report.structural.missing_patterns.is_empty());
            assert_eq!(report.semantic.tool_call_similarity, 1.0);
            assert!(report.semantic.missing_tools.is_empty());
            assert!(report.semantic.data_flow.missing_variables.is_empty());
            assert_eq!(report.overall, 1.0);
        }
    }

    #[test]
    fn test_concrete_weather_scenario() {
        let report =
            compare_workflow(&weather_generated(), &weather_reference()).expect("Comparison failed");

        assert!(report.structural.subtree_match_ratio < 1.0);
        let missing_tool_calls = report
            .structural
            .missing_patterns
            .iter()
            .filter(|pattern| pattern.kind == NodeKind::ToolCall)
            .count();
        assert_eq!(missing_tool_calls, 1);
        assert!(report.semantic.missing_tools.is_empty());
        assert_eq!(report.semantic.tool_call_similarity, 1.0);
        assert!(report.overall < 1.0);
        assert!(report.overall > 0.0);
    }

    #[test]
    fn test_schema_error_result() {
        let broken = workflow(
            "broken",
            sequence(vec![json!({ "type": "unknown_type" })]),
        );

        let error = compare_workflow(&weather_reference(), &broken).unwrap_err();
        match &error {
            CompareError::Schema { side, source } => {
                assert_eq!(*side, DocumentSide::Reference);
                assert_eq!(source.path(), "root.steps[0]");
            }
            other => panic!("Expected a schema error, got {:?}", other),
        }
        assert!(error.to_string().contains("reference"));

        let error = compare_workflow(&broken, &weather_reference()).unwrap_err();
        assert!(matches!(
            error.schema_error(),
            Some(SchemaError::UnknownKind { .. })
        ));
    }

    #[test]
    fn test_overall_weights() {
        let generated = weather_generated();
        let reference = weather_reference();

        let structural_only = Comparator::builder()
            .with_overall_weights(OverallWeights {
                structural: 1.0,
                semantic: 0.0,
            })
            .build()
            .compare(&generated, &reference)
            .expect("Comparison failed");
        assert_eq!(
            structural_only.overall,
            structural_only.structural.weighted_accuracy
        );

        let semantic_only = Comparator::builder()
            .with_overall_weights(OverallWeights {
                structural: 0.0,
                semantic: 2.0,
            })
            .build()
            .compare(&generated, &reference)
            .expect("Comparison failed");
        assert_eq!(semantic_only.overall, semantic_only.semantic.semantic_score);
    }

    #[test]
    fn test_builder_config_is_applied() {
        let comparator = Comparator::builder()
            .with_builder_config(BuilderConfig { max_depth: 3 })
            .build();
        let deep = container_chain(5, None);

        let error = comparator.compare(&deep, &deep).unwrap_err();
        assert!(matches!(
            error.schema_error(),
            Some(SchemaError::TooDeep { max_depth: 3, .. })
        ));
    }

    #[test]
    fn test_summary_contents() {
        let report =
            compare_workflow(&weather_generated(), &weather_reference()).expect("Comparison failed");
        let summary = &report.summary;

        assert!(summary.contains("STRUCTURAL ANALYSIS"));
        assert!(summary.contains("MISSING STRUCTURAL PATTERNS"));
        assert!(summary.contains("root.steps[2].ifFalse"));
        assert!(summary.contains("SEMANTIC ANALYSIS"));
        assert!(summary.contains("Variable Analysis"));
        assert!(summary.contains("OVERALL ASSESSMENT"));
        assert!(summary.contains(&format!("Overall Score: {:.3}", report.overall)));
        assert!(!summary.contains('\u{1b}'));
        assert_eq!(summary, &ReportFormatter::format(&report));
    }

    #[test]
    fn test_summary_truncates_long_lists() {
        let tools: Vec<_> = (0..7)
            .map(|i| tool_call(&format!("tool{}", i), json!({}), None))
            .collect();
        let reference = sequence(tools);
        let generated = sequence(vec![user_input("Hi", "hi")]);

        let report = compare_workflow(&generated, &reference).expect("Comparison failed");
        assert_eq!(report.semantic.missing_tools.len(), 7);
        assert!(report.summary.contains("Missing tools: 7"));
        assert!(report.summary.contains("... and 2 more"));
        assert!(!report.summary.contains("tool6\n"));
    }

    #[test]
    fn test_diagnostics_are_reported() {
        let doc = sequence(vec![tool_call("lookup", json!("oops"), None)]);
        let report = compare_workflow(&doc, &doc).expect("Malformed parameters are not fatal");

        assert_eq!(report.diagnostics.len(), 2);
        assert_eq!(report.semantic.tool_call_similarity, 0.0);
        assert!(report.summary.contains("DIAGNOSTICS"));
        assert!(report.summary.contains("[reference] root.steps[0]"));
    }

    #[test]
    fn test_mistyped_optional_fields_are_not_fatal() {
        let doc = sequence(vec![
            json!({ "type": "wait_for_event", "eventSource": "carrier", "timeout": 1.5 }),
            json!({ "type": "user_input", "prompt": "Name?", "description": 42, "outputVariable": "name" }),
        ]);
        let report = compare_workflow(&doc, &doc).expect("Mistyped optional fields are not fatal");

        assert_eq!(report.structural.weighted_accuracy, 1.0);
        assert_eq!(report.diagnostics.len(), 4);
        let timeout = report
            .diagnostics
            .iter()
            .find(|w| w.side == DocumentSide::Reference && w.path == "root.steps[0]")
            .expect("timeout should be reported");
        assert_eq!(
            timeout.kind,
            WarningKind::IgnoredField {
                field: "timeout",
                expected: "a non-negative integer"
            }
        );
        assert!(report.summary.contains("optional field 'description' is not a string"));
    }

    #[test]
    fn test_summary_counts_collapsed_misses() {
        let reference = sequence(vec![
            tool_call("a", json!({}), None),
            tool_call("b", json!({}), None),
            tool_call("c", json!({}), None),
        ]);
        let generated = sequence(vec![user_input("Hi", "hi")]);

        let report = compare_workflow(&generated, &reference).expect("Comparison failed");
        let tool_pattern = report
            .structural
            .missing_patterns
            .iter()
            .find(|pattern| pattern.kind == NodeKind::ToolCall)
            .expect("tool_call pattern should be missing");
        assert_eq!(tool_pattern.occurrences, 3);
        assert!(report.summary.contains("Missing tool_call Nodes: 3"));
        assert!(report.summary.contains("Missing sequence Nodes: 1"));
    }

    #[test]
    fn test_report_json_shape() {
        let report =
            compare_workflow(&weather_generated(), &weather_reference()).expect("Comparison failed");
        let value = serde_json::to_value(&report).expect("Report must serialize");

        assert!(value["structural"]["subtreeMatchRatio"].is_number());
        assert!(value["structural"]["weightedAccuracy"].is_number());
        assert!(value["structural"]["breakdown"]["byNodeCategory"]["action"].is_object());
        assert!(value["structural"]["breakdown"]["byDepth"]["2"].is_object());
        assert_eq!(
            value["structural"]["missingPatterns"][0]["kind"],
            json!("branch")
        );
        assert_eq!(
            value["structural"]["missingPatterns"][1]["path"],
            json!("root.steps[2].ifFalse")
        );
        assert!(value["semantic"]["toolCallSimilarity"].is_number());
        assert!(value["semantic"]["missingTools"].is_array());
        assert!(value["semantic"]["dataFlow"]["definitionSimilarity"].is_number());
        assert!(value["semantic"]["dataFlow"]["usageSimilarity"].is_number());
        assert!(value["semantic"]["dataFlow"]["missingVariables"].is_array());
        assert!(value["semantic"].get("diagnostics").is_none());
        assert!(value["overall"].is_number());
        assert!(value["diagnostics"].is_array());
        assert!(value["summary"].is_string());
    }

    #[test]
    fn test_documents_from_files() {
        let dir = std::env::temp_dir();
        let generated_path = dir.join("hikaku_generated_weather.json");
        let reference_path = dir.join("hikaku_reference_weather.json");
        fs::write(&generated_path, weather_generated().to_string()).expect("write failed");
        fs::write(&reference_path, weather_reference().to_string()).expect("write failed");

        let generated = WorkflowDocument::from_file(generated_path.to_str().unwrap())
            .expect("Failed to load generated document");
        let reference = WorkflowDocument::from_file(reference_path.to_str().unwrap())
            .expect("Failed to load reference document");
        assert_eq!(reference.name(), "weather");

        let report = Comparator::default()
            .compare_documents(&generated, &reference)
            .expect("Comparison failed");
        assert!(report.overall < 1.0);

        let _ = fs::remove_file(generated_path);
        let _ = fs::remove_file(reference_path);
    }

    #[test]
    fn test_document_errors() {
        let error = WorkflowDocument::from_json_str("{ not json").unwrap_err();
        assert!(matches!(error, CompareError::Document(_)));

        let error = WorkflowDocument::from_file("does/not/exist.json").unwrap_err();
        assert!(error.to_string().contains("does/not/exist.json"));
    }
}
