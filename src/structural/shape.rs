use super::MatchPolicy;
use crate::tree::{NodeKind, NodePath, Slot, WorkflowNode};
use ahash::AHashMap;

/// A node of a tree flattened into pre-order, children addressed by arena index.
pub(super) struct FlatNode {
    pub kind: NodeKind,
    pub depth: usize,
    pub path: NodePath,
    pub children: Vec<(Slot, usize)>,
}

/// Flattens a subtree into pre-order. A parent always precedes its children.
pub(super) fn flatten(root: &WorkflowNode) -> Vec<FlatNode> {
    let mut arena: Vec<FlatNode> = Vec::new();
    let mut stack: Vec<(NodePath, &WorkflowNode, Option<(usize, Slot)>)> =
        vec![(NodePath::root(), root, None)];

    while let Some((path, node, parent)) = stack.pop() {
        let index = arena.len();
        if let Some((parent_index, slot)) = parent {
            arena[parent_index].children.push((slot, index));
        }
        for child in node.children().iter().rev() {
            stack.push((path.child(child.slot), &child.node, Some((index, child.slot))));
        }
        arena.push(FlatNode {
            kind: node.kind(),
            depth: node.depth(),
            path,
            children: Vec::new(),
        });
    }
    arena
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum SlotTag {
    Ordered,
    Unordered,
    IfTrue,
    IfFalse,
    Body,
    OnTimeout,
}

impl From<Slot> for SlotTag {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Step(_) => SlotTag::Ordered,
            Slot::Branch(_) => SlotTag::Unordered,
            Slot::IfTrue => SlotTag::IfTrue,
            Slot::IfFalse => SlotTag::IfFalse,
            Slot::Body => SlotTag::Body,
            Slot::OnTimeout => SlotTag::OnTimeout,
        }
    }
}

/// Canonical description of a subtree's shape at one level.
///
/// Children of a `parallel` node are sorted, so branch order is irrelevant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) struct ShapeKey {
    kind: NodeKind,
    children: Vec<(SlotTag, u32)>,
}

impl ShapeKey {
    fn new(kind: NodeKind, mut children: Vec<(SlotTag, u32)>) -> Self {
        if kind == NodeKind::Parallel {
            children.sort_unstable();
        }
        Self { kind, children }
    }

    /// The key built from a node's kind and its direct child kinds.
    pub(super) fn of_child_kinds(arena: &[FlatNode], index: usize) -> Self {
        let node = &arena[index];
        let children = node
            .children
            .iter()
            .map(|&(slot, child)| (SlotTag::from(slot), arena[child].kind as u32))
            .collect();
        Self::new(node.kind, children)
    }
}

/// Hash-conses shape keys into small integer ids shared across both trees.
#[derive(Default)]
pub(super) struct ShapeInterner {
    ids: AHashMap<ShapeKey, u32>,
}

impl ShapeInterner {
    fn intern(&mut self, key: ShapeKey) -> u32 {
        let next_id = self.ids.len() as u32;
        *self.ids.entry(key).or_insert(next_id)
    }

    /// Computes the shape id of every node in the arena under the given policy.
    ///
    /// Runs bottom-up over the pre-order arena, so no recursion is needed.
    pub(super) fn shapes(&mut self, arena: &[FlatNode], policy: MatchPolicy) -> Vec<u32> {
        let mut shapes = vec![0u32; arena.len()];
        for index in (0..arena.len()).rev() {
            let key = match policy {
                MatchPolicy::ChildKinds => ShapeKey::of_child_kinds(arena, index),
                MatchPolicy::FullShape => {
                    let node = &arena[index];
                    let children = node
                        .children
                        .iter()
                        .map(|&(slot, child)| (SlotTag::from(slot), shapes[child]))
                        .collect();
                    ShapeKey::new(node.kind, children)
                }
            };
            shapes[index] = self.intern(key);
        }
        shapes
    }
}
