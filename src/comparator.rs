use crate::builder::{BuilderConfig, TreeBuilder};
use crate::document::WorkflowDocument;
use crate::error::{CompareError, DocumentSide, ExtractionWarning};
use crate::report::ReportFormatter;
use crate::semantic::{SemanticComparator, SemanticConfig, SemanticReport};
use crate::structural::{StructuralComparator, StructuralConfig, StructuralReport};
use crate::tree::WorkflowTree;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Weights of the two analyses in the overall score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverallWeights {
    pub structural: f64,
    pub semantic: f64,
}

impl Default for OverallWeights {
    fn default() -> Self {
        Self {
            structural: 0.5,
            semantic: 0.5,
        }
    }
}

impl OverallWeights {
    /// Weighted average of the two scores. Non-positive weights fall back to
    /// an unweighted mean.
    pub fn combine(&self, structural: f64, semantic: f64) -> f64 {
        let total = self.structural + self.semantic;
        if total <= 0.0 || self.structural < 0.0 || self.semantic < 0.0 {
            return (structural + semantic) / 2.0;
        }
        (self.structural * structural + self.semantic * semantic) / total
    }
}

/// The merged result of one comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub structural: StructuralReport,
    pub semantic: SemanticReport,
    pub overall: f64,
    /// Extraction warnings from both documents.
    pub diagnostics: Vec<ExtractionWarning>,
    pub summary: String,
}

/// Builds both trees and runs the structural and semantic comparators.
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    builder: TreeBuilder,
    structural: StructuralComparator,
    semantic: SemanticComparator,
    weights: OverallWeights,
}

#[derive(Debug, Clone, Default)]
pub struct ComparatorBuilder {
    builder_config: BuilderConfig,
    structural_config: StructuralConfig,
    semantic_config: SemanticConfig,
    weights: OverallWeights,
}

impl ComparatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder_config(mut self, config: BuilderConfig) -> Self {
        self.builder_config = config;
        self
    }

    pub fn with_structural_config(mut self, config: StructuralConfig) -> Self {
        self.structural_config = config;
        self
    }

    pub fn with_semantic_config(mut self, config: SemanticConfig) -> Self {
        self.semantic_config = config;
        self
    }

    pub fn with_overall_weights(mut self, weights: OverallWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn build(self) -> Comparator {
        Comparator {
            builder: TreeBuilder::new(self.builder_config),
            structural: StructuralComparator::new(self.structural_config),
            semantic: SemanticComparator::new(self.semantic_config),
            weights: self.weights,
        }
    }
}

impl Comparator {
    pub fn builder() -> ComparatorBuilder {
        ComparatorBuilder::new()
    }

    /// Compares a generated workflow against its reference.
    ///
    /// Fails only when either document cannot be built into a tree.
    pub fn compare(&self, generated: &Value, reference: &Value) -> Result<Report, CompareError> {
        let generated_tree = self.build_tree(generated, DocumentSide::Generated)?;
        let reference_tree = self.build_tree(reference, DocumentSide::Reference)?;
        Ok(self.compare_trees(&generated_tree, &reference_tree))
    }

    pub fn compare_documents(
        &self,
        generated: &WorkflowDocument,
        reference: &WorkflowDocument,
    ) -> Result<Report, CompareError> {
        self.compare(generated.as_value(), reference.as_value())
    }

    /// Compares two already built trees. Never fails.
    pub fn compare_trees(&self, generated: &WorkflowTree, reference: &WorkflowTree) -> Report {
        let (structural, semantic) = self.run_comparators(generated, reference);
        let overall = self
            .weights
            .combine(structural.weighted_accuracy, semantic.semantic_score);

        debug!(
            structural = structural.weighted_accuracy,
            semantic = semantic.semantic_score,
            overall,
            "Comparison finished"
        );

        let mut report = Report {
            diagnostics: semantic.diagnostics.clone(),
            structural,
            semantic,
            overall,
            summary: String::new(),
        };
        report.summary = ReportFormatter::format(&report);
        report
    }

    fn build_tree(&self, document: &Value, side: DocumentSide) -> Result<WorkflowTree, CompareError> {
        self.builder
            .build(document)
            .map_err(|source| CompareError::Schema { side, source })
    }

    #[cfg(feature = "parallel")]
    fn run_comparators(
        &self,
        generated: &WorkflowTree,
        reference: &WorkflowTree,
    ) -> (StructuralReport, SemanticReport) {
        rayon::join(
            || self.structural.compare(generated, reference),
            || self.semantic.compare(generated, reference),
        )
    }

    #[cfg(not(feature = "parallel"))]
    fn run_comparators(
        &self,
        generated: &WorkflowTree,
        reference: &WorkflowTree,
    ) -> (StructuralReport, SemanticReport) {
        (
            self.structural.compare(generated, reference),
            self.semantic.compare(generated, reference),
        )
    }
}

/// Compares two workflow documents with the default configuration.
pub fn compare_workflow(generated: &Value, reference: &Value) -> Result<Report, CompareError> {
    Comparator::default().compare(generated, reference)
}
