use crate::validators::{self, RegexPolicy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operators available to conditional nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "==", alias = "equals", alias = "eq")]
    Equal,
    #[serde(rename = "!=", alias = "notEquals", alias = "neq")]
    NotEqual,
    #[serde(rename = "<", alias = "lessThan", alias = "lt")]
    LessThan,
    #[serde(rename = "<=", alias = "lessThanOrEqual", alias = "lte")]
    LessThanOrEqual,
    #[serde(rename = ">", alias = "greaterThan", alias = "gt")]
    GreaterThan,
    #[serde(rename = ">=", alias = "greaterThanOrEqual", alias = "gte")]
    GreaterThanOrEqual,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "startsWith")]
    StartsWith,
    #[serde(rename = "endsWith")]
    EndsWith,
    #[serde(rename = "regex")]
    Regex,
    #[serde(rename = "validDocumentA", alias = "validCpf")]
    ValidDocumentA,
    #[serde(rename = "validDocumentB", alias = "validCnpj")]
    ValidDocumentB,
    #[serde(rename = "validEmail")]
    ValidEmail,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::Contains => "contains",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::Regex => "regex",
            Operator::ValidDocumentA => "validDocumentA",
            Operator::ValidDocumentB => "validDocumentB",
            Operator::ValidEmail => "validEmail",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Parses both sides as floats. Anything unparseable becomes NaN, which makes every
/// ordered comparison false.
fn numeric(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn both_numeric(left: &str, right: &str) -> Option<(f64, f64)> {
    let (l, r) = (numeric(left), numeric(right));
    (l.is_finite() && r.is_finite()).then_some((l, r))
}

/// Evaluates `left <operator> right`. Never panics and never errors: malformed input
/// simply evaluates to `false`.
///
/// The validity operators (`validDocumentA`, `validDocumentB`, `validEmail`) only look
/// at `left`.
pub fn evaluate_condition(left: &str, operator: Operator, right: &str) -> bool {
    match operator {
        Operator::Equal => match both_numeric(left, right) {
            Some((l, r)) => l == r,
            None => left == right,
        },
        Operator::NotEqual => match both_numeric(left, right) {
            Some((l, r)) => l != r,
            None => left != right,
        },
        Operator::LessThan => numeric(left) < numeric(right),
        Operator::LessThanOrEqual => numeric(left) <= numeric(right),
        Operator::GreaterThan => numeric(left) > numeric(right),
        Operator::GreaterThanOrEqual => numeric(left) >= numeric(right),
        Operator::Contains => left.contains(right),
        Operator::StartsWith => left.starts_with(right),
        Operator::EndsWith => left.ends_with(right),
        Operator::Regex => validators::regex_matches(right, left, RegexPolicy::FailClosed),
        Operator::ValidDocumentA => validators::is_valid_document_a(left),
        Operator::ValidDocumentB => validators::is_valid_document_b(left),
        Operator::ValidEmail => validators::is_valid_email(left),
    }
}
