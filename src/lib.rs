//! # Hikaku - Workflow Similarity Scoring
//!
//! **Hikaku** scores how closely a generated workflow document matches a
//! labeled reference workflow. Both documents are trees of control-flow
//! containers (`sequence`, `parallel`) and actions (`tool_call`, `user_input`,
//! `branch`, `loop`, `wait_for_event`).
//!
//! ## Core Workflow
//!
//! 1.  **Build**: The `TreeBuilder` turns each JSON document into a typed
//!     `WorkflowTree`, rejecting unknown node kinds, missing required fields and
//!     over-deep nesting with a `SchemaError`.
//! 2.  **Structural comparison**: The `StructuralComparator` matches reference
//!     subtrees against generated subtrees and reports a subtree match ratio and
//!     a depth-weighted accuracy.
//! 3.  **Semantic comparison**: The `SemanticComparator` compares tool calls and
//!     the way variables flow from their definitions into `${...}` references.
//! 4.  **Report**: The `Comparator` merges both analyses into a `Report` with an
//!     overall score and a plain-text summary.
//!
//! ## Quick Start
//!
//! ```rust
//! use hikaku::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let reference = json!({
//!         "name": "weather",
//!         "root": {
//!             "type": "sequence",
//!             "steps": [
//!                 { "type": "user_input", "prompt": "Where?", "outputVariable": "loc" },
//!                 {
//!                     "type": "tool_call",
//!                     "toolName": "getWeather",
//!                     "parameters": { "location": "${loc}" },
//!                     "outputVariable": "weather"
//!                 }
//!             ]
//!         }
//!     });
//!
//!     let report = compare_workflow(&reference, &reference)?;
//!     assert_eq!(report.overall, 1.0);
//!
//!     // Custom weighting goes through the builder.
//!     let comparator = Comparator::builder()
//!         .with_overall_weights(OverallWeights { structural: 0.7, semantic: 0.3 })
//!         .build();
//!     let report = comparator.compare(&reference, &reference)?;
//!     println!("{}", report.summary);
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod comparator;
pub mod document;
pub mod error;
pub mod prelude;
pub mod report;
pub mod semantic;
pub mod structural;
pub mod tree;
