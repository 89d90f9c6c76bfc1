use crate::error::SchemaError;
use crate::tree::{
    ComparisonOperator, Condition, IgnoredField, LogicalOperator, NodeKind, NodePath,
};
use serde_json::{Map, Value};

/// Typed access to the fields of one raw node, reporting failures against its path.
///
/// Required fields fail hard. Optional fields of the wrong type are read as
/// absent and remembered in `ignored`.
pub(super) struct NodeFields<'a> {
    obj: &'a Map<String, Value>,
    path: &'a NodePath,
    kind: NodeKind,
    ignored: Vec<IgnoredField>,
}

impl<'a> NodeFields<'a> {
    pub(super) fn new(obj: &'a Map<String, Value>, path: &'a NodePath, kind: NodeKind) -> Self {
        Self {
            obj,
            path,
            kind,
            ignored: Vec::new(),
        }
    }

    pub(super) fn into_ignored(self) -> Vec<IgnoredField> {
        self.ignored
    }

    /// Returns a field, treating an explicit `null` as absent.
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.obj.get(field).filter(|v| !v.is_null())
    }

    fn missing(&self, field: &'static str) -> SchemaError {
        SchemaError::MissingField {
            path: self.path.to_string(),
            kind: self.kind,
            field,
        }
    }

    fn invalid(&self, field: &str, expected: &'static str) -> SchemaError {
        SchemaError::InvalidField {
            path: self.path.to_string(),
            field: field.to_string(),
            expected,
        }
    }

    fn ignore(&mut self, field: &'static str, expected: &'static str) {
        self.ignored.push(IgnoredField { field, expected });
    }

    pub(super) fn required_str(&self, field: &'static str) -> Result<String, SchemaError> {
        match self.get(field) {
            None => Err(self.missing(field)),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(self.invalid(field, "a string")),
        }
    }

    pub(super) fn optional_str(&mut self, field: &'static str) -> Option<String> {
        match self.get(field) {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.ignore(field, "a string");
                None
            }
        }
    }

    pub(super) fn optional_u64(&mut self, field: &'static str) -> Option<u64> {
        let value = self.get(field)?;
        let parsed = value.as_u64();
        if parsed.is_none() {
            self.ignore(field, "a non-negative integer");
        }
        parsed
    }

    pub(super) fn string_list(&mut self, field: &'static str) -> Vec<String> {
        match self.get(field) {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            Some(_) => {
                self.ignore(field, "an array");
                Vec::new()
            }
        }
    }

    pub(super) fn required_array(&self, field: &'static str) -> Result<&'a [Value], SchemaError> {
        match self.get(field) {
            None => Err(self.missing(field)),
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(self.invalid(field, "an array")),
        }
    }

    pub(super) fn required_child(&self, field: &'static str) -> Result<&'a Value, SchemaError> {
        self.get(field).ok_or_else(|| self.missing(field))
    }

    pub(super) fn optional_child(&self, field: &'static str) -> Option<&'a Value> {
        self.get(field)
    }

    /// Parameters are kept raw; their shape is checked during semantic extraction.
    pub(super) fn raw(&self, field: &'static str) -> Value {
        self.get(field).cloned().unwrap_or(Value::Null)
    }

    /// Parses the node's condition. Each nested logical level counts as one
    /// level below the node toward `max_depth`.
    pub(super) fn condition(&self, depth: usize, max_depth: usize) -> Result<Condition, SchemaError> {
        let raw = self.get("condition").ok_or_else(|| self.missing("condition"))?;
        parse_condition(raw, &format!("{}.condition", self.path), depth, max_depth)
    }
}

/// Parses a raw condition object. Operator sets are closed, so unknown operators fail.
pub(super) fn parse_condition(
    raw: &Value,
    path: &str,
    depth: usize,
    max_depth: usize,
) -> Result<Condition, SchemaError> {
    if depth > max_depth {
        return Err(SchemaError::TooDeep {
            path: path.to_string(),
            max_depth,
        });
    }

    let obj = raw.as_object().ok_or_else(|| SchemaError::NotAnObject {
        path: path.to_string(),
    })?;

    let condition_type = obj.get("type").and_then(Value::as_str).ok_or_else(|| {
        SchemaError::InvalidField {
            path: path.to_string(),
            field: "type".to_string(),
            expected: "'comparison' or 'logical'",
        }
    })?;
    let operator = obj.get("operator").and_then(Value::as_str).ok_or_else(|| {
        SchemaError::InvalidField {
            path: path.to_string(),
            field: "operator".to_string(),
            expected: "a string",
        }
    })?;
    let unknown_operator = || SchemaError::UnknownOperator {
        path: path.to_string(),
        operator: operator.to_string(),
    };

    match condition_type {
        "comparison" => Ok(Condition::Comparison {
            left: obj.get("left").cloned().unwrap_or(Value::Null),
            operator: ComparisonOperator::parse(operator).ok_or_else(unknown_operator)?,
            right: obj.get("right").cloned().unwrap_or(Value::Null),
        }),
        "logical" => {
            let operator = LogicalOperator::parse(operator).ok_or_else(unknown_operator)?;
            let conditions = match obj.get("conditions") {
                Some(Value::Array(items)) => items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let item_path = format!("{}.conditions[{}]", path, i);
                        parse_condition(item, &item_path, depth + 1, max_depth)
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                _ => {
                    return Err(SchemaError::InvalidField {
                        path: path.to_string(),
                        field: "conditions".to_string(),
                        expected: "an array",
                    });
                }
            };
            Ok(Condition::Logical {
                operator,
                conditions,
            })
        }
        _ => Err(SchemaError::InvalidField {
            path: path.to_string(),
            field: "type".to_string(),
            expected: "'comparison' or 'logical'",
        }),
    }
}
