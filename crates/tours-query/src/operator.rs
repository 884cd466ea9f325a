use std::str::FromStr;

use bson::{Bson, Document};

/// Sigil marking a reserved operator key in a filter document.
pub const OPERATOR_SIGIL: char = '$';

/// Comparison operators accepted in bracket notation (`price[gte]=500`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Gte,
    Gt,
    Lte,
    Lt,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Gte => "gte",
            Operator::Gt => "gt",
            Operator::Lte => "lte",
            Operator::Lt => "lt",
        }
    }

    /// The key the engine understands, e.g. `$gte`.
    pub fn prefixed(&self) -> String {
        format!("{OPERATOR_SIGIL}{}", self.as_str())
    }
}

impl FromStr for Operator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gte" => Ok(Operator::Gte),
            "gt" => Ok(Operator::Gt),
            "lte" => Ok(Operator::Lte),
            "lt" => Ok(Operator::Lt),
            _ => Err(()),
        }
    }
}

/// Rewrite every operator key below the top level to its `$` form.
///
/// Top-level keys are field names and values are data, so neither is touched.
/// Keys are matched whole: `gtex` or `budget` stay as they are.
pub fn prefix_operators(criteria: &Document) -> Document {
    criteria
        .iter()
        .map(|(field, value)| (field.clone(), rewrite_value(value, prefix_key)))
        .collect()
}

/// Inverse of [`prefix_operators`].
pub fn strip_operator_prefix(criteria: &Document) -> Document {
    criteria
        .iter()
        .map(|(field, value)| (field.clone(), rewrite_value(value, strip_key)))
        .collect()
}

fn rewrite_value(value: &Bson, rename: fn(&str) -> String) -> Bson {
    match value {
        Bson::Document(doc) => Bson::Document(
            doc.iter()
                .map(|(k, v)| (rename(k), rewrite_value(v, rename)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn prefix_key(key: &str) -> String {
    match key.parse::<Operator>() {
        Ok(op) => op.prefixed(),
        Err(()) => key.to_string(),
    }
}

fn strip_key(key: &str) -> String {
    match key.strip_prefix(OPERATOR_SIGIL) {
        Some(word) if word.parse::<Operator>().is_ok() => word.to_string(),
        _ => key.to_string(),
    }
}
