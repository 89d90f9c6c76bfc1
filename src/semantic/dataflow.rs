use super::extract::{Extraction, VariableBinding};
use super::jaccard;
use ahash::{AHashMap, AHashSet};
use serde::Serialize;

/// A reference variable paired with a generated one, or either side alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableAlignment {
    pub reference: Option<String>,
    pub generated: Option<String>,
    /// Multiset Jaccard of the two usage contexts; 0 for an unpaired variable.
    pub usage_similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFlowAnalysis {
    pub definition_similarity: f64,
    pub usage_similarity: f64,
    pub missing_variables: Vec<String>,
    pub alignments: Vec<VariableAlignment>,
}

/// Compares where variables are defined and how they are consumed.
pub fn analyze(generated: &Extraction, reference: &Extraction) -> DataFlowAnalysis {
    let definition_similarity = jaccard(
        &reference.defined_names().collect::<AHashSet<_>>(),
        &generated.defined_names().collect::<AHashSet<_>>(),
    );

    let pairs = align(&reference.variables, &generated.variables);
    let mut generated_paired = vec![false; generated.variables.len()];
    let mut alignments = Vec::new();
    let mut missing_variables = Vec::new();

    for (reference_index, binding) in reference.variables.iter().enumerate() {
        match pairs[reference_index] {
            Some(generated_index) => {
                generated_paired[generated_index] = true;
                let counterpart = &generated.variables[generated_index];
                alignments.push(VariableAlignment {
                    reference: Some(binding.name.clone()),
                    generated: Some(counterpart.name.clone()),
                    usage_similarity: usage_jaccard(binding, counterpart),
                });
            }
            None => {
                missing_variables.push(binding.name.clone());
                alignments.push(VariableAlignment {
                    reference: Some(binding.name.clone()),
                    generated: None,
                    usage_similarity: 0.0,
                });
            }
        }
    }

    for (binding, paired) in generated.variables.iter().zip(&generated_paired) {
        if !paired {
            alignments.push(VariableAlignment {
                reference: None,
                generated: Some(binding.name.clone()),
                usage_similarity: 0.0,
            });
        }
    }

    let usage_similarity = if alignments.is_empty() {
        1.0
    } else {
        alignments.iter().map(|a| a.usage_similarity).sum::<f64>() / alignments.len() as f64
    };

    DataFlowAnalysis {
        definition_similarity,
        usage_similarity,
        missing_variables,
        alignments,
    }
}

/// Pairs each reference variable with at most one generated variable.
///
/// Three passes, each only over variables still unpaired: identical names,
/// then the same definition role, then the same defining node kind. Within a
/// pass the earliest unpaired generated variable wins.
fn align(reference: &[VariableBinding], generated: &[VariableBinding]) -> Vec<Option<usize>> {
    let mut pairs: Vec<Option<usize>> = vec![None; reference.len()];
    let mut taken = vec![false; generated.len()];

    let by_name: AHashMap<&str, usize> = generated
        .iter()
        .enumerate()
        .map(|(i, binding)| (binding.name.as_str(), i))
        .collect();
    for (i, binding) in reference.iter().enumerate() {
        if let Some(&j) = by_name.get(binding.name.as_str()) {
            pairs[i] = Some(j);
            taken[j] = true;
        }
    }

    let passes: [fn(&VariableBinding, &VariableBinding) -> bool; 2] = [same_role, same_kind];
    for matches in passes {
        for (i, binding) in reference.iter().enumerate() {
            if pairs[i].is_some() {
                continue;
            }
            let candidate = generated
                .iter()
                .enumerate()
                .find(|&(j, other)| !taken[j] && matches(binding, other))
                .map(|(j, _)| j);
            if let Some(j) = candidate {
                pairs[i] = Some(j);
                taken[j] = true;
            }
        }
    }
    pairs
}

fn same_role(a: &VariableBinding, b: &VariableBinding) -> bool {
    match (&a.definition, &b.definition) {
        (Some(x), Some(y)) => x.role == y.role,
        _ => false,
    }
}

fn same_kind(a: &VariableBinding, b: &VariableBinding) -> bool {
    match (&a.definition, &b.definition) {
        (Some(x), Some(y)) => x.kind == y.kind,
        _ => false,
    }
}

/// `sum(min) / sum(max)` over usage-context counts. Two unused variables are
/// identical.
fn usage_jaccard(a: &VariableBinding, b: &VariableBinding) -> f64 {
    let left = context_counts(a);
    let right = context_counts(b);

    let (mut intersection, mut union) = (0usize, 0usize);
    for context in left.keys().chain(right.keys()).collect::<AHashSet<_>>() {
        let l = left.get(context).copied().unwrap_or(0);
        let r = right.get(context).copied().unwrap_or(0);
        intersection += l.min(r);
        union += l.max(r);
    }

    if union == 0 {
        1.0
    } else {
        intersection as f64 / union as f64
    }
}

fn context_counts(binding: &VariableBinding) -> AHashMap<&str, usize> {
    let mut counts = AHashMap::new();
    for usage in &binding.usages {
        *counts.entry(usage.context.as_str()).or_default() += 1;
    }
    counts
}
