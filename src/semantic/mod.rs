//! Tool-usage and data-flow similarity between two workflow trees.
//!
//! Both trees go through one [`Extraction`] pass each. Tool calls are then
//! compared by parameter names and by parameter values, where a `${...}`
//! reference is compared by the role of the variable it names rather than by
//! spelling. Variables are compared by where they are defined and in which
//! contexts they are consumed.

use crate::error::{DocumentSide, ExtractionWarning};
use crate::tree::WorkflowTree;
use serde::Serialize;
use std::collections::BTreeMap;
use std::hash::Hash;
use tracing::debug;

pub mod dataflow;
pub mod extract;
pub mod pattern;
pub mod tools;

pub use dataflow::{DataFlowAnalysis, VariableAlignment};
pub use extract::{Extraction, ToolCallRecord, VariableBinding};
pub use tools::ToolWeights;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SemanticConfig {
    pub tool_weights: ToolWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticReport {
    pub tool_call_similarity: f64,
    pub tool_similarities: BTreeMap<String, f64>,
    pub missing_tools: Vec<String>,
    pub extra_tools: Vec<String>,
    pub data_flow: DataFlowAnalysis,
    /// Mean of tool, definition and usage similarity.
    pub semantic_score: f64,
    /// Serialized once, at the top of the merged report.
    #[serde(skip_serializing)]
    pub diagnostics: Vec<ExtractionWarning>,
}

#[derive(Debug, Clone, Default)]
pub struct SemanticComparator {
    config: SemanticConfig,
}

impl SemanticComparator {
    pub fn new(config: SemanticConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SemanticConfig {
        &self.config
    }

    /// Never fails. Malformed items are reported in `diagnostics` and score 0.
    pub fn compare(&self, generated: &WorkflowTree, reference: &WorkflowTree) -> SemanticReport {
        let generated = Extraction::extract(generated, DocumentSide::Generated);
        let reference = Extraction::extract(reference, DocumentSide::Reference);

        let tool_analysis = tools::analyze(&generated, &reference, &self.config.tool_weights);
        let data_flow = dataflow::analyze(&generated, &reference);

        let semantic_score = (tool_analysis.similarity
            + data_flow.definition_similarity
            + data_flow.usage_similarity)
            / 3.0;

        debug!(
            tool_calls = reference.tool_calls.len(),
            variables = reference.variables.len(),
            missing_tools = tool_analysis.missing_tools.len(),
            semantic_score,
            "Semantic comparison finished"
        );

        let mut diagnostics = reference.warnings;
        diagnostics.extend(generated.warnings);

        SemanticReport {
            tool_call_similarity: tool_analysis.similarity,
            tool_similarities: tool_analysis.per_tool,
            missing_tools: tool_analysis.missing_tools,
            extra_tools: tool_analysis.extra_tools,
            data_flow,
            semantic_score,
            diagnostics,
        }
    }
}

/// `|a ∩ b| / |a ∪ b|`, with two empty sets counted as identical.
pub(crate) fn jaccard<T: Eq + Hash>(a: &ahash::AHashSet<T>, b: &ahash::AHashSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
