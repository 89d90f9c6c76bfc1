use serde::{Serialize, Serializer};
use std::fmt;

/// The position a child occupies inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Step(usize),
    Branch(usize),
    IfTrue,
    IfFalse,
    Body,
    OnTimeout,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Step(i) => write!(f, "steps[{}]", i),
            Slot::Branch(i) => write!(f, "branches[{}]", i),
            Slot::IfTrue => write!(f, "ifTrue"),
            Slot::IfFalse => write!(f, "ifFalse"),
            Slot::Body => write!(f, "body"),
            Slot::OnTimeout => write!(f, "onTimeout"),
        }
    }
}

/// Address of a node as the sequence of slots walked from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<Slot>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns a new path extended by one slot.
    pub fn child(&self, slot: Slot) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(slot);
        Self(segments)
    }

    pub fn segments(&self) -> &[Slot] {
        &self.0
    }

    /// Number of slots walked, which equals the depth of the addressed node.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The path split into comparable string tokens, root first.
    pub fn tokens(&self) -> Vec<String> {
        std::iter::once("root".to_string())
            .chain(self.0.iter().map(|slot| slot.to_string()))
            .collect()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "root")?;
        for slot in &self.0 {
            write!(f, ".{}", slot)?;
        }
        Ok(())
    }
}

impl Serialize for NodePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
