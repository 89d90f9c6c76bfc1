//! Tree builder tests
//!
//! Tests for turning raw workflow documents into typed trees.
//!
mod common;
use common::*;
use hikaku::prelude::*;
use hikaku::tree::{Condition, IgnoredField, Payload, Slot};
use serde_json::json;

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn test_builds_weather_tree_with_depths() {
        let tree = TreeBuilder::default()
            .build(&weather_reference())
            .expect("Failed to build tree");

        assert_eq!(tree.name, "weather");
        assert_eq!(tree.node_count(), 6);
        assert_eq!(tree.root.kind(), NodeKind::Sequence);
        assert_eq!(tree.root.depth(), 0);

        let branch = &tree.root.children()[2].node;
        assert_eq!(branch.kind(), NodeKind::Branch);
        assert_eq!(branch.depth(), 1);

        let if_false = branch.child(Slot::IfFalse).expect("ifFalse should exist");
        assert_eq!(if_false.kind(), NodeKind::ToolCall);
        assert_eq!(if_false.depth(), 2);
    }

    #[test]
    fn test_preorder_paths() {
        let tree = TreeBuilder::default()
            .build(&weather_reference())
            .expect("Failed to build tree");

        let paths: Vec<String> = tree.preorder().map(|(path, _)| path.to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "root",
                "root.steps[0]",
                "root.steps[1]",
                "root.steps[2]",
                "root.steps[2].ifTrue",
                "root.steps[2].ifFalse",
            ]
        );

        for (path, node) in tree.preorder() {
            assert_eq!(path.len(), node.depth());
        }
    }

    #[test]
    fn test_all_node_kinds_and_payloads() {
        let tree = TreeBuilder::default()
            .build(&kitchen_sink())
            .expect("Failed to build tree");

        let kinds: Vec<NodeKind> = tree.preorder().map(|(_, node)| node.kind()).collect();
        for kind in NodeKind::ALL {
            if kind != NodeKind::Branch {
                assert!(kinds.contains(&kind), "missing {}", kind);
            }
        }

        let wait = &tree.root.children()[1].node;
        match wait.payload() {
            Payload::WaitForEvent(event) => {
                assert_eq!(event.event_source.as_deref(), Some("shipping"));
                assert_eq!(event.timeout, Some(3600));
                assert_eq!(event.entity_id.as_deref(), Some("${orderId}"));
            }
            other => panic!("Expected wait_for_event, got {:?}", other),
        }
        assert!(wait.child(Slot::OnTimeout).is_some());

        let lp = &tree.root.children()[3].node;
        match lp.payload().condition() {
            Some(Condition::Logical { conditions, .. }) => assert_eq!(conditions.len(), 2),
            other => panic!("Expected logical condition, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_node_document() {
        let tree = TreeBuilder::default()
            .build(&sequence(vec![user_input("Name?", "name")]))
            .expect("Failed to build tree");

        assert_eq!(tree.name, "");
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn test_empty_tree() {
        let tree = TreeBuilder::default()
            .build(&workflow("empty", sequence(vec![])))
            .expect("Failed to build tree");
        assert!(tree.is_empty());

        let leaf = TreeBuilder::default()
            .build(&tool_call("ping", json!({}), None))
            .expect("Failed to build tree");
        assert!(!leaf.is_empty());
    }

    #[test]
    fn test_kind_alias_and_null_optional_fields() {
        let doc = json!({
            "kind": "branch",
            "condition": { "type": "comparison", "left": 1, "operator": "==", "right": 1 },
            "ifTrue": { "kind": "user_input", "prompt": "Ok?" },
            "ifFalse": null,
        });
        let tree = TreeBuilder::default().build(&doc).expect("Failed to build tree");

        assert_eq!(tree.root.children().len(), 1);
        assert_eq!(tree.root.children()[0].slot, Slot::IfTrue);
    }

    #[test]
    fn test_mistyped_optional_fields_are_ignored() {
        let doc = sequence(vec![
            json!({ "type": "wait_for_event", "eventSource": "carrier", "timeout": 1.5 }),
            json!({ "type": "user_input", "prompt": "Pick", "description": 42, "options": "a,b" }),
        ]);
        let tree = TreeBuilder::default().build(&doc).expect("Failed to build tree");

        let wait = &tree.root.children()[0].node;
        let Payload::WaitForEvent(event) = wait.payload() else {
            panic!("Expected a wait_for_event payload");
        };
        assert_eq!(event.timeout, None);
        assert_eq!(event.event_source.as_deref(), Some("carrier"));
        assert_eq!(
            wait.ignored_fields(),
            &[IgnoredField {
                field: "timeout",
                expected: "a non-negative integer"
            }]
        );

        let input = &tree.root.children()[1].node;
        assert_eq!(input.description(), None);
        let ignored: Vec<_> = input.ignored_fields().iter().map(|f| f.field).collect();
        assert_eq!(ignored, vec!["options", "description"]);

        assert!(tree.root.ignored_fields().is_empty());
    }

    #[test]
    fn test_display_tree() {
        let tree = TreeBuilder::default()
            .build(&weather_reference())
            .expect("Failed to build tree");

        let rendered = DisplayTree { node: &tree.root }.to_string();
        assert!(rendered.starts_with("sequence"));
        assert!(rendered.contains("├── steps[1]: tool_call getWeather -> weather"));
        assert!(rendered.contains("└── ifFalse: tool_call sendNotification"));
        assert!(rendered.contains("${weather.precipitation} > 0"));
    }
}

#[cfg(test)]
mod schema_error_tests {
    use super::*;

    #[test]
    fn test_unknown_kind_reports_path() {
        let doc = workflow(
            "broken",
            sequence(vec![user_input("Hi", "x"), json!({ "type": "unknown_type" })]),
        );
        let error = TreeBuilder::default()
            .build(&doc)
            .expect_err("Unknown kinds must be rejected");

        assert_eq!(
            error,
            SchemaError::UnknownKind {
                path: "root.steps[1]".to_string(),
                kind: "unknown_type".to_string(),
            }
        );
        assert_eq!(error.path(), "root.steps[1]");
        assert!(error.to_string().contains("unknown_type"));
    }

    #[test]
    fn test_branch_without_condition() {
        let doc = workflow(
            "broken",
            sequence(vec![json!({ "type": "branch", "ifTrue": user_input("Hi", "x") })]),
        );
        let error = TreeBuilder::default().build(&doc).unwrap_err();

        assert!(matches!(
            error,
            SchemaError::MissingField {
                kind: NodeKind::Branch,
                field: "condition",
                ..
            }
        ));
        assert_eq!(error.path(), "root.steps[0]");
    }

    #[test]
    fn test_missing_required_fields() {
        let no_tool = TreeBuilder::default()
            .build(&json!({ "type": "tool_call", "parameters": {} }))
            .unwrap_err();
        assert!(matches!(no_tool, SchemaError::MissingField { field: "toolName", .. }));

        let no_steps = TreeBuilder::default()
            .build(&json!({ "type": "sequence" }))
            .unwrap_err();
        assert!(matches!(no_steps, SchemaError::MissingField { field: "steps", .. }));

        let no_body = TreeBuilder::default()
            .build(&json!({
                "type": "loop",
                "condition": { "type": "comparison", "left": 1, "operator": "<", "right": 2 },
            }))
            .unwrap_err();
        assert!(matches!(no_body, SchemaError::MissingField { field: "body", .. }));

        let no_kind = TreeBuilder::default()
            .build(&sequence(vec![json!({ "prompt": "Hi" })]))
            .unwrap_err();
        assert_eq!(
            no_kind,
            SchemaError::MissingKind {
                path: "root.steps[0]".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_operator() {
        let doc = json!({
            "type": "branch",
            "condition": {
                "type": "logical",
                "operator": "or",
                "conditions": [
                    { "type": "comparison", "left": 1, "operator": "~=", "right": 2 }
                ]
            },
        });
        let error = TreeBuilder::default().build(&doc).unwrap_err();

        assert_eq!(
            error,
            SchemaError::UnknownOperator {
                path: "root.condition.conditions[0]".to_string(),
                operator: "~=".to_string(),
            }
        );
    }

    #[test]
    fn test_too_deep() {
        let doc = container_chain(10, None);
        let shallow = TreeBuilder::new(BuilderConfig { max_depth: 5 });

        let error = shallow.build(&doc).unwrap_err();
        assert!(matches!(error, SchemaError::TooDeep { max_depth: 5, .. }));
        assert_eq!(error.path().matches("steps[0]").count(), 6);

        assert!(TreeBuilder::default().build(&doc).is_ok());
    }

    #[test]
    fn test_mistyped_required_field_is_fatal() {
        let error = TreeBuilder::default()
            .build(&json!({ "type": "tool_call", "toolName": 7 }))
            .unwrap_err();
        assert!(matches!(error, SchemaError::InvalidField { ref field, .. } if field == "toolName"));
    }

    #[test]
    fn test_nested_conditions_count_toward_depth() {
        let mut condition = json!({ "type": "comparison", "left": 1, "operator": "==", "right": 1 });
        for _ in 0..5 {
            condition = json!({ "type": "logical", "operator": "not", "conditions": [condition] });
        }
        let doc = json!({
            "type": "branch",
            "condition": condition,
            "ifTrue": user_input("Ok?", "ok"),
        });

        let error = TreeBuilder::new(BuilderConfig { max_depth: 3 })
            .build(&doc)
            .unwrap_err();
        assert_eq!(
            error,
            SchemaError::TooDeep {
                path: "root.condition.conditions[0].conditions[0].conditions[0].conditions[0]"
                    .to_string(),
                max_depth: 3,
            }
        );

        assert!(TreeBuilder::new(BuilderConfig { max_depth: 5 }).build(&doc).is_ok());
    }

    #[test]
    fn test_non_object_child() {
        let error = TreeBuilder::default()
            .build(&sequence(vec![json!("not a node")]))
            .unwrap_err();
        assert_eq!(
            error,
            SchemaError::NotAnObject {
                path: "root.steps[0]".to_string()
            }
        );
    }
}
