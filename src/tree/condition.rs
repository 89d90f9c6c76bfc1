use serde_json::Value;
use std::fmt;

/// Operators allowed in a comparison condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    GreaterThan,
    SmallerThan,
    GreaterThanOrEqual,
    SmallerThanOrEqual,
    In,
    NotIn,
}

impl ComparisonOperator {
    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol {
            "==" => Some(Self::Equal),
            "!=" => Some(Self::NotEqual),
            ">" => Some(Self::GreaterThan),
            "<" => Some(Self::SmallerThan),
            ">=" => Some(Self::GreaterThanOrEqual),
            "<=" => Some(Self::SmallerThanOrEqual),
            "in" => Some(Self::In),
            "not_in" => Some(Self::NotIn),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterThan => ">",
            Self::SmallerThan => "<",
            Self::GreaterThanOrEqual => ">=",
            Self::SmallerThanOrEqual => "<=",
            Self::In => "in",
            Self::NotIn => "not_in",
        }
    }
}

/// Operators allowed in a logical condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
    Not,
}

impl LogicalOperator {
    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "not" => Some(Self::Not),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        }
    }
}

/// A condition attached to a `branch` or `loop` node.
///
/// Operands are kept as raw JSON values; they may embed variable references.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Comparison {
        left: Value,
        operator: ComparisonOperator,
        right: Value,
    },
    Logical {
        operator: LogicalOperator,
        conditions: Vec<Condition>,
    },
}

impl Condition {
    /// Visits every comparison operand in this condition, left before right.
    pub fn for_each_operand<'a>(&'a self, visit: &mut impl FnMut(&'static str, &'a Value)) {
        match self {
            Condition::Comparison { left, right, .. } => {
                visit("left", left);
                visit("right", right);
            }
            Condition::Logical { conditions, .. } => {
                for condition in conditions {
                    condition.for_each_operand(visit);
                }
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Comparison {
                left,
                operator,
                right,
            } => {
                fmt_operand(f, left)?;
                write!(f, " {} ", operator.symbol())?;
                fmt_operand(f, right)
            }
            Condition::Logical {
                operator: LogicalOperator::Not,
                conditions,
            } => {
                write!(f, "NOT ")?;
                match conditions.first() {
                    Some(inner) => write!(f, "({})", inner),
                    None => write!(f, "()"),
                }
            }
            Condition::Logical {
                operator,
                conditions,
            } => {
                write!(f, "(")?;
                for (i, condition) in conditions.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", operator.symbol())?;
                    }
                    write!(f, "{}", condition)?;
                }
                write!(f, ")")
            }
        }
    }
}

fn fmt_operand(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) => write!(f, "{}", s),
        other => write!(f, "{}", other),
    }
}
