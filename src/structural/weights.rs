use crate::tree::NodeKind;

/// How a subtree's depth scales its weight.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DepthWeighting {
    /// `1 / (depth + 1)`: shallow subtrees dominate.
    #[default]
    Reciprocal,
    /// Every depth weighs the same.
    Uniform,
    /// `ratio ^ depth`.
    Geometric { ratio: f64 },
}

/// Weights applied to each reference subtree when computing weighted accuracy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructuralWeights {
    pub action: f64,
    pub container: f64,
    pub depth: DepthWeighting,
}

impl Default for StructuralWeights {
    fn default() -> Self {
        Self {
            action: 2.0,
            container: 1.0,
            depth: DepthWeighting::Reciprocal,
        }
    }
}

impl StructuralWeights {
    pub fn node_weight(&self, kind: NodeKind) -> f64 {
        if kind.is_action() {
            self.action
        } else {
            self.container
        }
    }

    pub fn depth_weight(&self, depth: usize) -> f64 {
        match self.depth {
            DepthWeighting::Reciprocal => 1.0 / (depth as f64 + 1.0),
            DepthWeighting::Uniform => 1.0,
            DepthWeighting::Geometric { ratio } => ratio.powi(depth.min(i32::MAX as usize) as i32),
        }
    }

    pub fn subtree_weight(&self, kind: NodeKind, depth: usize) -> f64 {
        self.node_weight(kind) * self.depth_weight(depth)
    }
}

/// What two subtrees must share to count as a structural match.
///
/// Both policies compare children under the same order rules: ordered for
/// `sequence`, as a multiset for `parallel`, and slot by slot for `branch`,
/// `loop` and `wait_for_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Same kind and same direct child kinds.
    #[default]
    ChildKinds,
    /// Same kind and the same complete descendant shape.
    FullShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StructuralConfig {
    pub weights: StructuralWeights,
    pub match_policy: MatchPolicy,
}
