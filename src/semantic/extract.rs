use super::pattern;
use crate::error::{DocumentSide, ExtractionWarning, WarningKind};
use crate::tree::{NodeKind, NodePath, Payload, WorkflowTree};
use ahash::AHashMap;
use itertools::Itertools;
use serde_json::{Map, Value};
use tracing::warn;

/// A `tool_call` node found in a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRecord {
    pub tool_name: String,
    pub path: NodePath,
    /// `None` when the node's parameters are not an object.
    pub parameters: Option<Map<String, Value>>,
}

/// Where and by what a variable is defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionSite {
    pub path: NodePath,
    pub kind: NodeKind,
    /// `tool_call.<toolName>`, `user_input` or `wait_for_event.<eventSource>`.
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageSite {
    pub path: NodePath,
    /// E.g. `tool_call.sendNotification.message` or `condition.left`.
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableBinding {
    pub name: String,
    pub definition: Option<DefinitionSite>,
    pub usages: Vec<UsageSite>,
}

/// Tool calls, variables and warnings collected from one tree.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub side: DocumentSide,
    pub tool_calls: Vec<ToolCallRecord>,
    /// Variables in order of first appearance.
    pub variables: Vec<VariableBinding>,
    pub warnings: Vec<ExtractionWarning>,
    index: AHashMap<String, usize>,
}

impl Extraction {
    /// Walks the tree once in pre-order and collects everything the semantic
    /// analyses need. Never fails; malformed items become warnings.
    pub fn extract(tree: &WorkflowTree, side: DocumentSide) -> Self {
        let mut extraction = Self {
            side,
            tool_calls: Vec::new(),
            variables: Vec::new(),
            warnings: Vec::new(),
            index: AHashMap::new(),
        };

        for (path, node) in tree.preorder() {
            for ignored in node.ignored_fields() {
                extraction.warn(
                    &path,
                    WarningKind::IgnoredField {
                        field: ignored.field,
                        expected: ignored.expected,
                    },
                );
            }

            match node.payload() {
                Payload::Sequence | Payload::Parallel => {}
                Payload::Branch { condition } | Payload::Loop { condition } => {
                    condition.for_each_operand(&mut |operand: &'static str, value: &Value| match value {
                        Value::String(text) => {
                            extraction.scan_text(text, &path, &format!("condition.{}", operand))
                        }
                        Value::Array(_) | Value::Object(_) => extraction.warn(
                            &path,
                            WarningKind::UnparseableOperand { operand },
                        ),
                        Value::Null | Value::Bool(_) | Value::Number(_) => {}
                    });
                }
                Payload::ToolCall(call) => {
                    let parameters = match &call.parameters {
                        Value::Object(map) => Some(map.clone()),
                        Value::Null => Some(Map::new()),
                        _ => {
                            extraction.warn(&path, WarningKind::MalformedParameters);
                            None
                        }
                    };
                    if let Some(map) = &parameters {
                        for (key, value) in map {
                            let context = format!("tool_call.{}.{}", call.tool_name, key);
                            extraction.scan_value(value, &path, &context);
                        }
                    }
                    extraction.tool_calls.push(ToolCallRecord {
                        tool_name: call.tool_name.clone(),
                        path: path.clone(),
                        parameters,
                    });
                }
                Payload::UserInput(input) => {
                    extraction.scan_text(&input.prompt, &path, "user_input.prompt");
                }
                Payload::WaitForEvent(wait) => {
                    if let Some(entity_id) = &wait.entity_id {
                        extraction.scan_text(entity_id, &path, "wait_for_event.entityId");
                    }
                }
            }

            if let Some(name) = node.output_variable() {
                let role = definition_role(node.payload());
                let binding = extraction.binding_mut(name);
                if binding.definition.is_none() {
                    binding.definition = Some(DefinitionSite {
                        path: path.clone(),
                        kind: node.kind(),
                        role,
                    });
                }
            }
        }

        extraction
    }

    pub fn variable(&self, name: &str) -> Option<&VariableBinding> {
        self.index.get(name).map(|&i| &self.variables[i])
    }

    /// The role a reference to `name` plays on this side: the defining role,
    /// or `unbound:<name>` when the variable is never defined here.
    pub fn role_of(&self, name: &str) -> String {
        self.variable(name)
            .and_then(|binding| binding.definition.as_ref())
            .map(|definition| definition.role.clone())
            .unwrap_or_else(|| format!("unbound:{}", name))
    }

    /// Names of all defined variables.
    pub fn defined_names(&self) -> impl Iterator<Item = &str> {
        self.variables
            .iter()
            .filter(|binding| binding.definition.is_some())
            .map(|binding| binding.name.as_str())
    }

    /// Tool names in order of first appearance.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tool_calls
            .iter()
            .map(|call| call.tool_name.as_str())
            .unique()
            .collect()
    }

    pub fn calls_of<'a>(&'a self, tool_name: &'a str) -> impl Iterator<Item = &'a ToolCallRecord> {
        self.tool_calls
            .iter()
            .filter(move |call| call.tool_name == tool_name)
    }

    fn binding_mut(&mut self, name: &str) -> &mut VariableBinding {
        let position = match self.index.get(name) {
            Some(&i) => i,
            None => {
                self.variables.push(VariableBinding {
                    name: name.to_string(),
                    definition: None,
                    usages: Vec::new(),
                });
                self.index.insert(name.to_string(), self.variables.len() - 1);
                self.variables.len() - 1
            }
        };
        &mut self.variables[position]
    }

    fn scan_value(&mut self, value: &Value, path: &NodePath, context: &str) {
        match value {
            Value::String(text) => self.scan_text(text, path, context),
            Value::Array(items) => {
                for item in items {
                    self.scan_value(item, path, context);
                }
            }
            Value::Object(map) => {
                for item in map.values() {
                    self.scan_value(item, path, context);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    fn scan_text(&mut self, text: &str, path: &NodePath, context: &str) {
        let result = pattern::scan(text);
        if result.ambiguous {
            self.warn(
                path,
                WarningKind::AmbiguousReference {
                    text: text.to_string(),
                },
            );
        }
        for reference in result.references {
            self.binding_mut(reference.name).usages.push(UsageSite {
                path: path.clone(),
                context: context.to_string(),
            });
        }
    }

    fn warn(&mut self, path: &NodePath, kind: WarningKind) {
        let warning = ExtractionWarning {
            side: self.side,
            path: path.to_string(),
            kind,
        };
        warn!(%warning, "Semantic extraction issue");
        self.warnings.push(warning);
    }
}

fn definition_role(payload: &Payload) -> String {
    match payload {
        Payload::ToolCall(call) => format!("tool_call.{}", call.tool_name),
        Payload::UserInput(_) => "user_input".to_string(),
        Payload::WaitForEvent(wait) => format!(
            "wait_for_event.{}",
            wait.event_source.as_deref().unwrap_or("unknown")
        ),
        Payload::Sequence | Payload::Parallel | Payload::Branch { .. } | Payload::Loop { .. } => {
            payload.kind().name().to_string()
        }
    }
}
