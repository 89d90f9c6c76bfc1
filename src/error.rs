use crate::tree::NodeKind;
use serde::Serialize;
use thiserror::Error;

/// Errors that make a workflow document unusable as a tree.
///
/// Only structural problems are fatal. Optional payload fields of the wrong
/// type are dropped and reported as [`WarningKind::IgnoredField`].
///
/// Every variant carries the dotted path of the offending node
/// (for example `root.steps[2].ifFalse`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Node at '{path}' is not a JSON object")]
    NotAnObject { path: String },

    #[error("Node at '{path}' has no 'type' field")]
    MissingKind { path: String },

    #[error("Node at '{path}' has an unrecognized type: '{kind}'")]
    UnknownKind { path: String, kind: String },

    #[error("Node at '{path}' of type '{kind}' is missing required field '{field}'")]
    MissingField {
        path: String,
        kind: NodeKind,
        field: &'static str,
    },

    #[error("Field '{field}' of node at '{path}' is invalid: expected {expected}")]
    InvalidField {
        path: String,
        field: String,
        expected: &'static str,
    },

    #[error("Condition at '{path}' uses an unsupported operator: '{operator}'")]
    UnknownOperator { path: String, operator: String },

    #[error("Node at '{path}' exceeds the maximum nesting depth of {max_depth}")]
    TooDeep { path: String, max_depth: usize },
}

impl SchemaError {
    /// The path of the node that failed validation.
    pub fn path(&self) -> &str {
        match self {
            SchemaError::NotAnObject { path }
            | SchemaError::MissingKind { path }
            | SchemaError::UnknownKind { path, .. }
            | SchemaError::MissingField { path, .. }
            | SchemaError::InvalidField { path, .. }
            | SchemaError::UnknownOperator { path, .. }
            | SchemaError::TooDeep { path, .. } => path,
        }
    }
}

/// Errors surfaced by the comparison entry points.
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Failed to load workflow document: {0}")]
    Document(String),

    #[error("Invalid {side} workflow: {source}")]
    Schema {
        side: DocumentSide,
        #[source]
        source: SchemaError,
    },
}

impl CompareError {
    /// The schema error behind this failure, if any.
    pub fn schema_error(&self) -> Option<&SchemaError> {
        match self {
            CompareError::Schema { source, .. } => Some(source),
            CompareError::Document(_) => None,
        }
    }
}

/// Which of the two compared documents an error or warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentSide {
    Generated,
    Reference,
}

impl std::fmt::Display for DocumentSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentSide::Generated => write!(f, "generated"),
            DocumentSide::Reference => write!(f, "reference"),
        }
    }
}

/// What went wrong while extracting semantic information from a node.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum WarningKind {
    #[error("tool parameters are not an object")]
    MalformedParameters,

    #[error("condition operand '{operand}' is not a scalar value")]
    UnparseableOperand { operand: &'static str },

    #[error("ambiguous variable reference in '{text}'")]
    AmbiguousReference { text: String },

    #[error("optional field '{field}' is not {expected} and was ignored")]
    IgnoredField {
        field: &'static str,
        expected: &'static str,
    },
}

/// A non-fatal problem found during semantic extraction.
///
/// The affected item scores zero instead of aborting the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionWarning {
    pub side: DocumentSide,
    pub path: String,
    #[serde(flatten)]
    pub kind: WarningKind,
}

impl std::fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.side, self.path, self.kind)
    }
}
