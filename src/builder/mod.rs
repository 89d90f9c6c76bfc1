use crate::error::SchemaError;
use crate::tree::{
    ChildNode, NodeKind, NodePath, Payload, Slot, ToolCall, UserInput, WaitForEvent,
    WorkflowNode, WorkflowTree,
};
use serde_json::Value;
use tracing::debug;

mod parsing;

use parsing::NodeFields;

/// Limits applied while building a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Deepest allowed node depth (root = 0). Guards against self-referencing documents.
    pub max_depth: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self { max_depth: 128 }
    }
}

/// Converts raw workflow documents into typed [`WorkflowTree`]s.
///
/// The builder only establishes structure and typed payload fields. Tool
/// parameters and condition operands are stored as-is.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    config: BuilderConfig,
}

impl TreeBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    /// Builds a tree from a `{name, description, root}` document.
    ///
    /// A document without a `root` key is taken to be the root node itself.
    pub fn build(&self, document: &Value) -> Result<WorkflowTree, SchemaError> {
        let obj = document
            .as_object()
            .ok_or_else(|| SchemaError::NotAnObject {
                path: "document".to_string(),
            })?;

        let text = |field: &str| {
            obj.get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let root_value = obj.get("root").unwrap_or(document);

        let root = self.build_node(root_value, &NodePath::root(), 0)?;
        let tree = WorkflowTree {
            name: text("name"),
            description: text("description"),
            root,
        };

        debug!(
            workflow = %tree.name,
            nodes = tree.node_count(),
            "Built workflow tree"
        );
        Ok(tree)
    }

    fn build_node(
        &self,
        value: &Value,
        path: &NodePath,
        depth: usize,
    ) -> Result<WorkflowNode, SchemaError> {
        if depth > self.config.max_depth {
            return Err(SchemaError::TooDeep {
                path: path.to_string(),
                max_depth: self.config.max_depth,
            });
        }

        let obj = value.as_object().ok_or_else(|| SchemaError::NotAnObject {
            path: path.to_string(),
        })?;
        let kind_name = obj
            .get("type")
            .or_else(|| obj.get("kind"))
            .ok_or_else(|| SchemaError::MissingKind {
                path: path.to_string(),
            })?;
        let kind_name = kind_name.as_str().ok_or_else(|| SchemaError::InvalidField {
            path: path.to_string(),
            field: "type".to_string(),
            expected: "a string",
        })?;
        let kind = NodeKind::parse(kind_name).ok_or_else(|| SchemaError::UnknownKind {
            path: path.to_string(),
            kind: kind_name.to_string(),
        })?;

        let mut fields = NodeFields::new(obj, path, kind);
        let mut slots: Vec<(Slot, &Value)> = Vec::new();

        let payload = match kind {
            NodeKind::Sequence => {
                let steps = fields.required_array("steps")?;
                slots.extend(steps.iter().enumerate().map(|(i, s)| (Slot::Step(i), s)));
                Payload::Sequence
            }
            NodeKind::Parallel => {
                let branches = fields.required_array("branches")?;
                slots.extend(
                    branches
                        .iter()
                        .enumerate()
                        .map(|(i, b)| (Slot::Branch(i), b)),
                );
                Payload::Parallel
            }
            NodeKind::Branch => {
                let condition = fields.condition(depth, self.config.max_depth)?;
                if let Some(if_true) = fields.optional_child("ifTrue") {
                    slots.push((Slot::IfTrue, if_true));
                }
                if let Some(if_false) = fields.optional_child("ifFalse") {
                    slots.push((Slot::IfFalse, if_false));
                }
                Payload::Branch { condition }
            }
            NodeKind::Loop => {
                let condition = fields.condition(depth, self.config.max_depth)?;
                slots.push((Slot::Body, fields.required_child("body")?));
                Payload::Loop { condition }
            }
            NodeKind::ToolCall => Payload::ToolCall(ToolCall {
                tool_name: fields.required_str("toolName")?,
                parameters: fields.raw("parameters"),
                output_variable: fields.optional_str("outputVariable"),
            }),
            NodeKind::UserInput => Payload::UserInput(UserInput {
                prompt: fields.required_str("prompt")?,
                input_type: fields.optional_str("inputType"),
                options: fields.string_list("options"),
                output_variable: fields.optional_str("outputVariable"),
            }),
            NodeKind::WaitForEvent => {
                if let Some(on_timeout) = fields.optional_child("onTimeout") {
                    slots.push((Slot::OnTimeout, on_timeout));
                }
                Payload::WaitForEvent(WaitForEvent {
                    event_source: fields.optional_str("eventSource"),
                    event_type: fields.optional_str("eventType"),
                    entity_id: fields.optional_str("entityId"),
                    timeout: fields.optional_u64("timeout"),
                    output_variable: fields.optional_str("outputVariable"),
                })
            }
        };

        let description = fields.optional_str("description");
        let ignored_fields = fields.into_ignored();
        if !ignored_fields.is_empty() {
            debug!(path = %path, ?ignored_fields, "Ignored mistyped optional fields");
        }

        let children = slots
            .into_iter()
            .map(|(slot, child)| {
                let node = self.build_node(child, &path.child(slot), depth + 1)?;
                Ok(ChildNode { slot, node })
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;

        Ok(WorkflowNode {
            payload,
            depth,
            description,
            ignored_fields,
            children,
        })
    }
}
