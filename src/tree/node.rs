use super::{Condition, NodePath, Slot};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// The closed set of node kinds a workflow tree can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Sequence,
    Parallel,
    Branch,
    Loop,
    ToolCall,
    UserInput,
    WaitForEvent,
}

impl NodeKind {
    pub const ALL: [NodeKind; 7] = [
        NodeKind::Sequence,
        NodeKind::Parallel,
        NodeKind::Branch,
        NodeKind::Loop,
        NodeKind::ToolCall,
        NodeKind::UserInput,
        NodeKind::WaitForEvent,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// The name used for this kind in workflow documents.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Sequence => "sequence",
            NodeKind::Parallel => "parallel",
            NodeKind::Branch => "branch",
            NodeKind::Loop => "loop",
            NodeKind::ToolCall => "tool_call",
            NodeKind::UserInput => "user_input",
            NodeKind::WaitForEvent => "wait_for_event",
        }
    }

    /// Action nodes represent executable operations; the rest compose children.
    pub fn is_action(&self) -> bool {
        match self {
            NodeKind::ToolCall
            | NodeKind::UserInput
            | NodeKind::Branch
            | NodeKind::Loop
            | NodeKind::WaitForEvent => true,
            NodeKind::Sequence | NodeKind::Parallel => false,
        }
    }

    pub fn is_container(&self) -> bool {
        !self.is_action()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub tool_name: String,
    /// Raw parameter mapping. Expected to be an object, but not validated here.
    pub parameters: Value,
    pub output_variable: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserInput {
    pub prompt: String,
    pub input_type: Option<String>,
    pub options: Vec<String>,
    pub output_variable: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaitForEvent {
    pub event_source: Option<String>,
    pub event_type: Option<String>,
    pub entity_id: Option<String>,
    pub timeout: Option<u64>,
    pub output_variable: Option<String>,
}

/// Kind-specific data carried by a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Sequence,
    Parallel,
    Branch { condition: Condition },
    Loop { condition: Condition },
    ToolCall(ToolCall),
    UserInput(UserInput),
    WaitForEvent(WaitForEvent),
}

impl Payload {
    pub fn kind(&self) -> NodeKind {
        match self {
            Payload::Sequence => NodeKind::Sequence,
            Payload::Parallel => NodeKind::Parallel,
            Payload::Branch { .. } => NodeKind::Branch,
            Payload::Loop { .. } => NodeKind::Loop,
            Payload::ToolCall(_) => NodeKind::ToolCall,
            Payload::UserInput(_) => NodeKind::UserInput,
            Payload::WaitForEvent(_) => NodeKind::WaitForEvent,
        }
    }

    pub fn output_variable(&self) -> Option<&str> {
        match self {
            Payload::ToolCall(call) => call.output_variable.as_deref(),
            Payload::UserInput(input) => input.output_variable.as_deref(),
            Payload::WaitForEvent(wait) => wait.output_variable.as_deref(),
            Payload::Sequence
            | Payload::Parallel
            | Payload::Branch { .. }
            | Payload::Loop { .. } => None,
        }
    }

    pub fn condition(&self) -> Option<&Condition> {
        match self {
            Payload::Branch { condition } | Payload::Loop { condition } => Some(condition),
            _ => None,
        }
    }
}

/// An optional field that was present with the wrong type and treated as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IgnoredField {
    pub field: &'static str,
    pub expected: &'static str,
}

/// A child node together with the slot it occupies in its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildNode {
    pub slot: Slot,
    pub node: WorkflowNode,
}

/// One node of a workflow tree. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowNode {
    pub(crate) payload: Payload,
    pub(crate) depth: usize,
    pub(crate) description: Option<String>,
    pub(crate) ignored_fields: Vec<IgnoredField>,
    pub(crate) children: Vec<ChildNode>,
}

impl WorkflowNode {
    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn ignored_fields(&self) -> &[IgnoredField] {
        &self.ignored_fields
    }

    /// Children in slot order.
    pub fn children(&self) -> &[ChildNode] {
        &self.children
    }

    pub fn child(&self, slot: Slot) -> Option<&WorkflowNode> {
        self.children
            .iter()
            .find(|child| child.slot == slot)
            .map(|child| &child.node)
    }

    pub fn output_variable(&self) -> Option<&str> {
        self.payload.output_variable()
    }

    /// Walks this subtree in pre-order using an explicit stack.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            stack: vec![(NodePath::root(), self)],
        }
    }

    /// Number of nodes in this subtree, including itself.
    pub fn subtree_size(&self) -> usize {
        self.preorder().count()
    }
}

/// Pre-order iterator over a subtree, yielding each node with its path.
pub struct Preorder<'a> {
    stack: Vec<(NodePath, &'a WorkflowNode)>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = (NodePath, &'a WorkflowNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push((path.child(child.slot), &child.node));
        }
        Some((path, node))
    }
}

/// A built workflow document.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowTree {
    pub name: String,
    pub description: String,
    pub root: WorkflowNode,
}

impl WorkflowTree {
    /// A tree is empty when its root is a container without children.
    pub fn is_empty(&self) -> bool {
        self.root.kind().is_container() && self.root.children.is_empty()
    }

    pub fn preorder(&self) -> Preorder<'_> {
        self.root.preorder()
    }

    pub fn node_count(&self) -> usize {
        self.root.subtree_size()
    }
}

/// Renders a tree with box-drawing connectors, one node per line.
pub struct DisplayTree<'a> {
    pub node: &'a WorkflowNode,
}

impl<'a> fmt::Display for DisplayTree<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", NodeLabel(self.node))?;
        self.fmt_children(self.node, f, "")
    }
}

impl<'a> DisplayTree<'a> {
    fn fmt_children(
        &self,
        node: &WorkflowNode,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
    ) -> fmt::Result {
        let count = node.children.len();
        for (i, child) in node.children.iter().enumerate() {
            let is_last = i + 1 == count;
            let marker = if is_last { "└── " } else { "├── " };
            writeln!(f, "{}{}{}: {}", prefix, marker, child.slot, NodeLabel(&child.node))?;
            let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
            self.fmt_children(&child.node, f, &child_prefix)?;
        }
        Ok(())
    }
}

struct NodeLabel<'a>(&'a WorkflowNode);

impl<'a> fmt::Display for NodeLabel<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.0;
        write!(f, "{}", node.kind())?;
        match &node.payload {
            Payload::Sequence | Payload::Parallel => {}
            Payload::Branch { condition } | Payload::Loop { condition } => {
                write!(f, " [{}]", condition)?
            }
            Payload::ToolCall(call) => write!(f, " {}", call.tool_name)?,
            Payload::UserInput(input) => write!(f, " \"{}\"", input.prompt)?,
            Payload::WaitForEvent(wait) => {
                if let Some(event_type) = &wait.event_type {
                    write!(f, " {}", event_type)?;
                }
            }
        }
        if let Some(var) = node.output_variable() {
            write!(f, " -> {}", var)?;
        }
        Ok(())
    }
}
