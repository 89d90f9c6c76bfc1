use crate::comparator::Report;
use crate::structural::{Breakdown, MissingPattern};
use itertools::Itertools;
use std::fmt::Write;

const RULE_WIDTH: usize = 80;
/// Longer lists are cut after this many entries.
const LIST_LIMIT: usize = 5;

/// Renders a [`Report`] as a plain-text summary.
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format(report: &Report) -> String {
        let mut out = String::new();
        let heavy = "=".repeat(RULE_WIDTH);

        let _ = writeln!(out, "{}", heavy);
        let _ = writeln!(out, "WORKFLOW COMPARISON ANALYSIS");
        let _ = writeln!(out, "{}", heavy);
        let _ = writeln!(out);

        Self::write_structural(&mut out, report);
        Self::write_missing_patterns(&mut out, &report.structural.missing_patterns);
        Self::write_semantic(&mut out, report);
        Self::write_diagnostics(&mut out, report);

        Self::section(&mut out, "OVERALL ASSESSMENT");
        let _ = writeln!(
            out,
            "Structural Score: {}",
            Self::score(report.structural.weighted_accuracy)
        );
        let _ = writeln!(
            out,
            "Semantic Score: {}",
            Self::score(report.semantic.semantic_score)
        );
        let _ = writeln!(out, "Overall Score: {}", Self::score(report.overall));
        let _ = writeln!(out);
        let _ = write!(out, "{}", heavy);
        out
    }

    fn section(out: &mut String, title: &str) {
        let _ = writeln!(out, "{}", title);
        let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    }

    fn score(value: f64) -> String {
        format!("{:.3}", value)
    }

    fn ratio(numerator: usize, denominator: usize) -> String {
        if denominator == 0 {
            return "0/0".to_string();
        }
        format!(
            "{}/{} ({:.1}%)",
            numerator,
            denominator,
            numerator as f64 / denominator as f64 * 100.0
        )
    }

    fn write_structural(out: &mut String, report: &Report) {
        let structural = &report.structural;
        Self::section(out, "STRUCTURAL ANALYSIS");
        let _ = writeln!(
            out,
            "Subtree match ratio: {}",
            Self::score(structural.subtree_match_ratio)
        );
        let _ = writeln!(
            out,
            "Weighted subtree match accuracy: {}",
            Self::score(structural.weighted_accuracy)
        );
        let _ = writeln!(
            out,
            "Matched Subtrees: {}",
            Self::ratio(structural.match_count, structural.total_subtrees)
        );
        let _ = writeln!(
            out,
            "Missing Subtrees: {}",
            Self::ratio(structural.miss_count, structural.total_subtrees)
        );
        let _ = writeln!(out);

        let breakdown = &structural.breakdown;
        let _ = writeln!(out, "Node Category Analysis");
        Self::write_category(out, "Action Nodes", &breakdown.by_node_category.action);
        Self::write_category(out, "Container Nodes", &breakdown.by_node_category.container);
        let _ = writeln!(
            out,
            "  Deep Structures (>=2): {} matched",
            breakdown.deep_structures_matched
        );
        let _ = writeln!(
            out,
            "  Shallow Structures (<2): {} matched",
            breakdown.shallow_structures_matched
        );
        let _ = writeln!(out);

        if !breakdown.by_depth.is_empty() {
            let _ = writeln!(out, "Depth Analysis");
            for (depth, slice) in &breakdown.by_depth {
                let _ = writeln!(
                    out,
                    "  Depth {}: {} matched, weighted {}",
                    depth,
                    Self::ratio(slice.matched, slice.total),
                    Self::score(slice.weighted_accuracy)
                );
            }
            let _ = writeln!(out);
        }
    }

    fn write_category(out: &mut String, label: &str, slice: &Breakdown) {
        let _ = writeln!(
            out,
            "  {}: {} matched",
            label,
            Self::ratio(slice.matched, slice.total)
        );
        let missing = slice.total - slice.matched;
        if missing > 0 {
            let _ = writeln!(out, "    └─ {} missing", missing);
        }
    }

    fn write_missing_patterns(out: &mut String, patterns: &[MissingPattern]) {
        if patterns.is_empty() {
            return;
        }
        Self::section(out, "MISSING STRUCTURAL PATTERNS");

        let by_kind = patterns.iter().into_group_map_by(|pattern| pattern.kind);
        for (kind, misses) in by_kind.into_iter().sorted_by_key(|(kind, _)| *kind) {
            let total: usize = misses.iter().map(|miss| miss.occurrences).sum();
            let _ = writeln!(out, "Missing {} Nodes: {}", kind, total);
            for (i, miss) in misses.iter().take(LIST_LIMIT).enumerate() {
                let last = i + 1 == misses.len().min(LIST_LIMIT) && misses.len() <= LIST_LIMIT;
                let children = if miss.child_kinds.is_empty() {
                    "leaf".to_string()
                } else {
                    format!("children [{}]", miss.child_kinds.iter().join(", "))
                };
                let _ = writeln!(
                    out,
                    "  {} {} at depth {}, {}{}",
                    if last { "└─" } else { "├─" },
                    miss.path,
                    miss.depth,
                    children,
                    if miss.occurrences > 1 {
                        format!(" (x{})", miss.occurrences)
                    } else {
                        String::new()
                    }
                );
            }
            if misses.len() > LIST_LIMIT {
                let _ = writeln!(out, "  └─ ... and {} more", misses.len() - LIST_LIMIT);
            }
            let _ = writeln!(out);
        }
    }

    fn write_semantic(out: &mut String, report: &Report) {
        let semantic = &report.semantic;
        Self::section(out, "SEMANTIC ANALYSIS");
        let _ = writeln!(
            out,
            "Average tool call similarity: {}",
            Self::score(semantic.tool_call_similarity)
        );
        if !semantic.tool_similarities.is_empty() {
            let _ = writeln!(out, "Tool-specific similarities:");
            for (tool, similarity) in &semantic.tool_similarities {
                let _ = writeln!(out, "  └─ {}: {}", tool, Self::score(*similarity));
            }
        }
        Self::write_list(out, "Missing tools", &semantic.missing_tools);
        Self::write_list(out, "Extra tools", &semantic.extra_tools);
        let _ = writeln!(out);

        let data_flow = &semantic.data_flow;
        let _ = writeln!(out, "Variable Analysis");
        let _ = writeln!(
            out,
            "Variable definition similarity: {}",
            Self::score(data_flow.definition_similarity)
        );
        let _ = writeln!(
            out,
            "Variable usage similarity: {}",
            Self::score(data_flow.usage_similarity)
        );
        let paired = data_flow
            .alignments
            .iter()
            .filter_map(|alignment| match (&alignment.reference, &alignment.generated) {
                (Some(reference), Some(generated)) => {
                    Some((reference, generated, alignment.usage_similarity))
                }
                _ => None,
            })
            .collect_vec();
        if !paired.is_empty() {
            let _ = writeln!(out, "Variable-specific usage similarities:");
            for (reference, generated, similarity) in paired {
                let label = if reference == generated {
                    reference.clone()
                } else {
                    format!("{} ~ {}", reference, generated)
                };
                let _ = writeln!(out, "  └─ {}: {}", label, Self::score(similarity));
            }
        }
        Self::write_list(out, "Missing variables", &data_flow.missing_variables);
        let _ = writeln!(out);
    }

    fn write_diagnostics(out: &mut String, report: &Report) {
        if report.diagnostics.is_empty() {
            return;
        }
        Self::section(out, "DIAGNOSTICS");
        for warning in &report.diagnostics {
            let _ = writeln!(out, "  {}", warning);
        }
        let _ = writeln!(out);
    }

    fn write_list(out: &mut String, label: &str, items: &[String]) {
        if items.is_empty() {
            return;
        }
        let _ = writeln!(out, "{}: {}", label, items.len());
        for item in items.iter().take(LIST_LIMIT) {
            let _ = writeln!(out, "  └─ {}", item);
        }
        if items.len() > LIST_LIMIT {
            let _ = writeln!(out, "  └─ ... and {} more", items.len() - LIST_LIMIT);
        }
    }
}
