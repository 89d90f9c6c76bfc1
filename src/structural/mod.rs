//! Topology-based similarity between two workflow trees.
//!
//! Every reference subtree is looked up among the generated subtrees. A
//! generated subtree can satisfy at most one reference subtree; reference
//! subtrees are processed in pre-order and take the earliest unused generated
//! candidate in pre-order. This first-found policy is deterministic and linear;
//! it does not search for an optimal bipartite assignment.

use crate::tree::{NodeKind, NodePath, WorkflowTree};
use ahash::AHashMap;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

mod shape;
mod weights;

pub use weights::{DepthWeighting, MatchPolicy, StructuralConfig, StructuralWeights};

use shape::{FlatNode, ShapeInterner, ShapeKey, flatten};

/// Subtrees at or below this depth count as deep structures in the breakdown.
const DEEP_STRUCTURE_DEPTH: usize = 2;

/// Match statistics for one slice of the reference subtrees.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub matched: usize,
    pub total: usize,
    pub subtree_match_ratio: f64,
    pub weighted_accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub action: Breakdown,
    pub container: Breakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralBreakdown {
    pub by_node_category: CategoryBreakdown,
    pub by_depth: BTreeMap<usize, Breakdown>,
    pub deep_structures_matched: usize,
    pub shallow_structures_matched: usize,
}

/// A reference subtree with no structural counterpart in the generated tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingPattern {
    pub kind: NodeKind,
    pub depth: usize,
    pub path: NodePath,
    pub child_kinds: Vec<NodeKind>,
    /// How many unmatched subtrees share this kind and child-kind signature.
    pub occurrences: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralReport {
    pub subtree_match_ratio: f64,
    pub weighted_accuracy: f64,
    pub match_count: usize,
    pub miss_count: usize,
    pub total_subtrees: usize,
    pub breakdown: StructuralBreakdown,
    pub missing_patterns: Vec<MissingPattern>,
}

impl StructuralReport {
    /// The report for an empty reference tree, where nothing can be matched.
    fn vacuous(score: f64) -> Self {
        Self {
            subtree_match_ratio: score,
            weighted_accuracy: score,
            match_count: 0,
            miss_count: 0,
            total_subtrees: 0,
            breakdown: StructuralBreakdown {
                by_node_category: CategoryBreakdown {
                    action: Tally::default().finish(),
                    container: Tally::default().finish(),
                },
                by_depth: BTreeMap::new(),
                deep_structures_matched: 0,
                shallow_structures_matched: 0,
            },
            missing_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Clone)]
struct Tally {
    matched: usize,
    total: usize,
    matched_weight: f64,
    total_weight: f64,
}

impl Tally {
    fn record(&mut self, matched: bool, weight: f64) {
        self.total += 1;
        self.total_weight += weight;
        if matched {
            self.matched += 1;
            self.matched_weight += weight;
        }
    }

    /// An empty slice is vacuously fully matched.
    fn finish(&self) -> Breakdown {
        let ratio = if self.total == 0 {
            1.0
        } else {
            self.matched as f64 / self.total as f64
        };
        let accuracy = if self.total_weight > 0.0 {
            self.matched_weight / self.total_weight
        } else {
            ratio
        };
        Breakdown {
            matched: self.matched,
            total: self.total,
            subtree_match_ratio: ratio,
            weighted_accuracy: accuracy,
        }
    }
}

/// Computes subtree match ratio and weighted accuracy between two trees.
#[derive(Debug, Clone, Default)]
pub struct StructuralComparator {
    config: StructuralConfig,
}

impl StructuralComparator {
    pub fn new(config: StructuralConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StructuralConfig {
        &self.config
    }

    pub fn compare(&self, generated: &WorkflowTree, reference: &WorkflowTree) -> StructuralReport {
        if reference.is_empty() {
            let score = if generated.is_empty() { 1.0 } else { 0.0 };
            debug!(score, "Reference tree is empty");
            return StructuralReport::vacuous(score);
        }

        let generated_arena = flatten(&generated.root);
        let reference_arena = flatten(&reference.root);

        let mut interner = ShapeInterner::default();
        let generated_shapes = interner.shapes(&generated_arena, self.config.match_policy);
        let reference_shapes = interner.shapes(&reference_arena, self.config.match_policy);

        // Pre-order queues of unused generated subtrees, per shape.
        let mut candidates: AHashMap<u32, VecDeque<usize>> = AHashMap::new();
        for (index, shape) in generated_shapes.iter().enumerate() {
            candidates.entry(*shape).or_default().push_back(index);
        }

        let mut overall = Tally::default();
        let mut actions = Tally::default();
        let mut containers = Tally::default();
        let mut by_depth: BTreeMap<usize, Tally> = BTreeMap::new();
        let mut deep_matched = 0;
        let mut shallow_matched = 0;
        let mut misses = Vec::new();

        for (index, node) in reference_arena.iter().enumerate() {
            let weight = self.config.weights.subtree_weight(node.kind, node.depth);
            let matched = candidates
                .get_mut(&reference_shapes[index])
                .and_then(VecDeque::pop_front)
                .is_some();

            overall.record(matched, weight);
            if node.kind.is_action() {
                actions.record(matched, weight);
            } else {
                containers.record(matched, weight);
            }
            by_depth
                .entry(node.depth)
                .or_default()
                .record(matched, weight);

            if matched {
                if node.depth >= DEEP_STRUCTURE_DEPTH {
                    deep_matched += 1;
                } else {
                    shallow_matched += 1;
                }
            } else {
                misses.push(index);
            }
        }

        let summary = overall.finish();
        debug!(
            matched = summary.matched,
            total = summary.total,
            weighted_accuracy = summary.weighted_accuracy,
            "Structural comparison finished"
        );

        StructuralReport {
            subtree_match_ratio: summary.subtree_match_ratio,
            weighted_accuracy: summary.weighted_accuracy,
            match_count: summary.matched,
            miss_count: misses.len(),
            total_subtrees: summary.total,
            breakdown: StructuralBreakdown {
                by_node_category: CategoryBreakdown {
                    action: actions.finish(),
                    container: containers.finish(),
                },
                by_depth: by_depth
                    .into_iter()
                    .map(|(depth, tally)| (depth, tally.finish()))
                    .collect(),
                deep_structures_matched: deep_matched,
                shallow_structures_matched: shallow_matched,
            },
            missing_patterns: dedupe_misses(&reference_arena, &misses),
        }
    }
}

/// Collapses unmatched subtrees sharing a kind and child-kind signature,
/// keeping the first one found in pre-order.
fn dedupe_misses(arena: &[FlatNode], misses: &[usize]) -> Vec<MissingPattern> {
    let mut seen: AHashMap<ShapeKey, usize> = AHashMap::new();
    let mut patterns: Vec<MissingPattern> = Vec::new();

    for &index in misses {
        let key = ShapeKey::of_child_kinds(arena, index);
        if let Some(&position) = seen.get(&key) {
            patterns[position].occurrences += 1;
            continue;
        }
        let node = &arena[index];
        seen.insert(key, patterns.len());
        patterns.push(MissingPattern {
            kind: node.kind,
            depth: node.depth,
            path: node.path.clone(),
            child_kinds: node
                .children
                .iter()
                .map(|&(_, child)| arena[child].kind)
                .collect(),
            occurrences: 1,
        });
    }
    patterns
}
