use super::extract::{Extraction, ToolCallRecord};
use super::{jaccard, pattern};
use ahash::AHashSet;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Blend weights for scoring one reference call against one generated call.
///
/// Weights are normalized by their sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolWeights {
    /// Jaccard overlap of parameter names.
    pub key_overlap: f64,
    /// Fraction of shared parameters whose values match.
    pub value_match: f64,
    /// Token edit-distance similarity of the two node paths.
    pub path: f64,
}

impl Default for ToolWeights {
    fn default() -> Self {
        Self {
            key_overlap: 0.5,
            value_match: 0.5,
            path: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallAnalysis {
    pub similarity: f64,
    /// Per tool name over the union of both sides; missing or extra tools score 0.
    pub per_tool: BTreeMap<String, f64>,
    pub missing_tools: Vec<String>,
    pub extra_tools: Vec<String>,
}

/// Compares tool usage between two extractions.
pub fn analyze(
    generated: &Extraction,
    reference: &Extraction,
    weights: &ToolWeights,
) -> ToolCallAnalysis {
    let reference_names = reference.tool_names();
    let generated_names = generated.tool_names();
    let generated_set: BTreeSet<&str> = generated_names.iter().copied().collect();
    let reference_set: BTreeSet<&str> = reference_names.iter().copied().collect();

    let mut per_tool = BTreeMap::new();
    let mut missing_tools = Vec::new();
    let mut extra_tools = Vec::new();

    for name in &reference_names {
        if !generated_set.contains(name) {
            missing_tools.push(name.to_string());
            per_tool.insert(name.to_string(), 0.0);
            continue;
        }
        let scores: Vec<f64> = reference
            .calls_of(name)
            .map(|reference_call| {
                generated
                    .calls_of(name)
                    .map(|generated_call| {
                        score_call(reference_call, reference, generated_call, generated, weights)
                    })
                    .fold(0.0, f64::max)
            })
            .collect();
        per_tool.insert(name.to_string(), mean(&scores));
    }

    for name in &generated_names {
        if !reference_set.contains(name) {
            extra_tools.push(name.to_string());
            per_tool.insert(name.to_string(), 0.0);
        }
    }

    let similarity = if per_tool.is_empty() {
        1.0
    } else {
        per_tool.values().sum::<f64>() / per_tool.len() as f64
    };

    ToolCallAnalysis {
        similarity,
        per_tool,
        missing_tools,
        extra_tools,
    }
}

fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

fn score_call(
    reference_call: &ToolCallRecord,
    reference: &Extraction,
    generated_call: &ToolCallRecord,
    generated: &Extraction,
    weights: &ToolWeights,
) -> f64 {
    let (Some(reference_params), Some(generated_params)) =
        (&reference_call.parameters, &generated_call.parameters)
    else {
        return 0.0;
    };

    let total_weight = weights.key_overlap + weights.value_match + weights.path;
    if total_weight <= 0.0 {
        return 0.0;
    }

    let key_score = jaccard(
        &reference_params.keys().collect::<AHashSet<_>>(),
        &generated_params.keys().collect::<AHashSet<_>>(),
    );
    let value_score = value_similarity(reference_params, reference, generated_params, generated);
    let path_score = if weights.path > 0.0 {
        path_similarity(&reference_call.path.tokens(), &generated_call.path.tokens())
    } else {
        0.0
    };

    (weights.key_overlap * key_score + weights.value_match * value_score + weights.path * path_score)
        / total_weight
}

/// Fraction of shared parameter names whose values match once every variable
/// reference is replaced by the role of the variable it names.
fn value_similarity(
    reference_params: &Map<String, Value>,
    reference: &Extraction,
    generated_params: &Map<String, Value>,
    generated: &Extraction,
) -> f64 {
    let shared: Vec<&String> = reference_params
        .keys()
        .filter(|key| generated_params.contains_key(*key))
        .collect();

    if shared.is_empty() {
        return if reference_params.is_empty() && generated_params.is_empty() {
            1.0
        } else {
            0.0
        };
    }

    let matching = shared
        .iter()
        .filter(|key| {
            normalize(&reference_params[key.as_str()], reference)
                == normalize(&generated_params[key.as_str()], generated)
        })
        .count();
    matching as f64 / shared.len() as f64
}

fn normalize(value: &Value, extraction: &Extraction) -> Value {
    match value {
        Value::String(text) => Value::String(pattern::substitute(text, |name| {
            extraction.role_of(name)
        })),
        Value::Array(items) => Value::Array(items.iter().map(|v| normalize(v, extraction)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), normalize(v, extraction)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// `1 - levenshtein / max_len` over path tokens.
fn path_similarity(reference: &[String], generated: &[String]) -> f64 {
    let max_len = reference.len().max(generated.len());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - token_levenshtein(reference, generated) as f64 / max_len as f64
}

fn token_levenshtein(a: &[String], b: &[String]) -> usize {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    for (i, token_a) in a.iter().enumerate() {
        let mut current = Vec::with_capacity(b.len() + 1);
        current.push(i + 1);
        for (j, token_b) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(token_a != token_b);
            current.push(substitution.min(previous[j + 1] + 1).min(current[j] + 1));
        }
        previous = current;
    }
    previous[b.len()]
}
