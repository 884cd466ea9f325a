use bson::{Bson, Document};

use crate::error::FilterParseError;
use crate::expression::Expression;

/// Parse a BSON filter document into an Expression tree.
///
/// Follows MongoDB query semantics:
/// - Top-level document is an implicit AND of all entries
/// - An empty document matches everything
/// - `{ "field": value }` is implicit `$eq`
/// - `{ "field": { "$gt": v } }` uses operator sub-documents
/// - `{ "$or": [...] }` / `{ "$and": [...] }` for explicit logical ops
/// - `{ "field": { "$in": [...] } }` and `{ "field": { "$exists": true } }`
pub fn parse_filter(doc: &Document) -> Result<Expression, FilterParseError> {
    let mut children = Vec::new();

    for (key, value) in doc {
        match key.as_str() {
            "$and" => children.push(parse_logical_array(value, Expression::And)?),
            "$or" => children.push(parse_logical_array(value, Expression::Or)?),
            k if k.starts_with('$') => {
                return Err(FilterParseError(format!("unknown top-level operator: {k}")));
            }
            _ => children.push(parse_field_condition(key, value)?),
        }
    }

    Ok(match children.len() {
        0 => Expression::All,
        1 => children.remove(0),
        _ => Expression::And(children),
    })
}

/// Parse a `$and` or `$or` array value into a logical expression.
fn parse_logical_array(
    value: &Bson,
    make: fn(Vec<Expression>) -> Expression,
) -> Result<Expression, FilterParseError> {
    let arr = match value {
        Bson::Array(a) => a,
        _ => return Err(FilterParseError("$and/$or value must be an array".into())),
    };

    let mut children = Vec::with_capacity(arr.len());
    for elem in arr {
        match elem {
            Bson::Document(sub_doc) => children.push(parse_filter(sub_doc)?),
            _ => {
                return Err(FilterParseError(
                    "$and/$or array elements must be documents".into(),
                ));
            }
        }
    }

    if children.is_empty() {
        return Err(FilterParseError("$and/$or array must not be empty".into()));
    }

    Ok(make(children))
}

/// Parse a field condition: either implicit $eq or an operator sub-document.
fn parse_field_condition(field: &str, value: &Bson) -> Result<Expression, FilterParseError> {
    // Any $ key makes it an operator doc, whatever the key order
    if let Bson::Document(sub_doc) = value {
        if sub_doc.keys().any(|k| k.starts_with('$')) {
            return parse_operator_doc(field, sub_doc);
        }
    }

    Ok(Expression::Eq(field.to_string(), value.clone()))
}

/// Parse an operator sub-document like `{ "$gt": 21, "$lte": 100 }`.
fn parse_operator_doc(field: &str, doc: &Document) -> Result<Expression, FilterParseError> {
    let mut conditions = Vec::with_capacity(doc.len());

    for (op_key, op_value) in doc {
        let field = field.to_string();
        let expr = match op_key.as_str() {
            "$eq" => Expression::Eq(field, op_value.clone()),
            "$ne" => Expression::Ne(field, op_value.clone()),
            "$gt" => Expression::Gt(field, op_value.clone()),
            "$gte" => Expression::Gte(field, op_value.clone()),
            "$lt" => Expression::Lt(field, op_value.clone()),
            "$lte" => Expression::Lte(field, op_value.clone()),
            "$in" => match op_value {
                Bson::Array(values) => Expression::In(field, values.clone()),
                _ => return Err(FilterParseError("$in value must be an array".into())),
            },
            "$exists" => match op_value {
                Bson::Boolean(b) => Expression::Exists(field, *b),
                Bson::String(s) if s == "true" => Expression::Exists(field, true),
                Bson::String(s) if s == "false" => Expression::Exists(field, false),
                _ => return Err(FilterParseError("$exists value must be a boolean".into())),
            },
            k => return Err(FilterParseError(format!("unknown field operator: {k}"))),
        };
        conditions.push(expr);
    }

    match conditions.len() {
        0 => Err(FilterParseError("empty operator document".into())),
        1 => Ok(conditions.remove(0)),
        _ => Ok(Expression::And(conditions)),
    }
}
