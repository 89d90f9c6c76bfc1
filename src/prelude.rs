//! Prelude module for convenient imports
//!
//! Re-exports the types most callers need to build trees, compare workflows
//! and read the resulting report.
//!
//! # Example
//!
//! ```rust,no_run
//! use hikaku::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let generated = WorkflowDocument::from_file("path/to/generated.json")?;
//! let reference = WorkflowDocument::from_file("path/to/reference.json")?;
//!
//! let report = Comparator::default().compare_documents(&generated, &reference)?;
//! println!("{}", report.summary);
//! # Ok(())
//! # }
//! ```

// Comparison entry points
pub use crate::comparator::{Comparator, ComparatorBuilder, OverallWeights, Report, compare_workflow};
pub use crate::document::WorkflowDocument;

// Configuration
pub use crate::builder::{BuilderConfig, TreeBuilder};
pub use crate::semantic::{SemanticComparator, SemanticConfig, SemanticReport, ToolWeights};
pub use crate::structural::{
    DepthWeighting, MatchPolicy, StructuralComparator, StructuralConfig, StructuralReport,
    StructuralWeights,
};

// Tree types
pub use crate::tree::{DisplayTree, NodeKind, NodePath, WorkflowNode, WorkflowTree};

// Error types
pub use crate::error::{CompareError, ExtractionWarning, SchemaError};

// Report formatting
pub use crate::report::ReportFormatter;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
