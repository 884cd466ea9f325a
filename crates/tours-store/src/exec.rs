use std::cmp::Ordering;

use bson::oid::ObjectId;
use bson::{Bson, DateTime, Document};
use tours_query::{Expression, Projection, Sort, SortDirection};

/// Resolve a dotted path. Missing fields and explicit nulls are both `None`.
pub(crate) fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = doc.get(first)?;
    for segment in segments {
        current = match current {
            Bson::Document(sub) => sub.get(segment)?,
            _ => return None,
        };
    }
    match current {
        Bson::Null => None,
        value => Some(value),
    }
}

pub(crate) fn matches(expr: &Expression, doc: &Document) -> bool {
    match expr {
        Expression::All => true,
        Expression::And(children) => children.iter().all(|c| matches(c, doc)),
        Expression::Or(children) => children.iter().any(|c| matches(c, doc)),
        Expression::Eq(field, value) => field_eq(get_path(doc, field), value),
        Expression::Ne(field, value) => !field_eq(get_path(doc, field), value),
        Expression::Gt(field, value) => field_cmp(doc, field, value, Ordering::is_gt),
        Expression::Gte(field, value) => field_cmp(doc, field, value, Ordering::is_ge),
        Expression::Lt(field, value) => field_cmp(doc, field, value, Ordering::is_lt),
        Expression::Lte(field, value) => field_cmp(doc, field, value, Ordering::is_le),
        Expression::In(field, values) => {
            let actual = get_path(doc, field);
            values.iter().any(|v| field_eq(actual, v))
        }
        Expression::Exists(field, expected) => doc_has_path(doc, field) == *expected,
    }
}

fn doc_has_path(doc: &Document, path: &str) -> bool {
    let mut current = doc;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        match current.get(segment) {
            None => return false,
            Some(_) if segments.peek().is_none() => return true,
            Some(Bson::Document(sub)) => current = sub,
            Some(_) => return false,
        }
    }
    false
}

/// Equality with array fan-out: an array field matches if any element does,
/// and a list of values against a scalar field matches if any value does.
fn field_eq(actual: Option<&Bson>, expected: &Bson) -> bool {
    match (actual, expected) {
        (actual, Bson::Array(options)) if !matches!(actual, Some(Bson::Array(_))) => {
            options.iter().any(|option| field_eq(actual, option))
        }
        (None, Bson::Null) => true,
        (None, _) => false,
        (Some(Bson::Array(items)), expected) if !matches!(expected, Bson::Array(_)) => {
            items.iter().any(|item| field_eq(Some(item), expected))
        }
        (Some(actual), expected) => {
            compare_coerced(actual, expected) == Some(Ordering::Equal)
        }
    }
}

fn field_cmp(doc: &Document, field: &str, value: &Bson, accept: fn(Ordering) -> bool) -> bool {
    match get_path(doc, field) {
        Some(Bson::Array(items)) => items
            .iter()
            .any(|item| compare_coerced(item, value).is_some_and(accept)),
        Some(actual) => compare_coerced(actual, value).is_some_and(accept),
        None => false,
    }
}

/// Compare a stored value against a filter value.
///
/// Query-string filters arrive as strings, so a string filter value is cast
/// to the stored value's type before comparing. `None` means the two values
/// cannot be compared.
pub(crate) fn compare_coerced(actual: &Bson, expected: &Bson) -> Option<Ordering> {
    match (actual, expected) {
        (_, Bson::String(s)) if !matches!(actual, Bson::String(_)) => {
            let cast = coerce_string(s, actual)?;
            compare_two_values(actual, &cast)
        }
        _ => compare_two_values(actual, expected),
    }
}

fn coerce_string(s: &str, like: &Bson) -> Option<Bson> {
    let s = s.trim();
    match like {
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => {
            s.parse::<f64>().ok().map(Bson::Double)
        }
        Bson::Boolean(_) => s.parse::<bool>().ok().map(Bson::Boolean),
        Bson::DateTime(_) => DateTime::parse_rfc3339_str(s)
            .ok()
            .or_else(|| parse_date_only(s))
            .map(Bson::DateTime),
        Bson::ObjectId(_) => ObjectId::parse_str(s).ok().map(Bson::ObjectId),
        _ => None,
    }
}

/// `YYYY-MM-DD` at midnight UTC.
fn parse_date_only(s: &str) -> Option<DateTime> {
    DateTime::parse_rfc3339_str(format!("{s}T00:00:00Z")).ok()
}

fn compare_two_values(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        (Bson::String(a), Bson::String(b)) => Some(a.cmp(b)),
        (Bson::Boolean(a), Bson::Boolean(b)) => Some(a.cmp(b)),
        (Bson::DateTime(a), Bson::DateTime(b)) => {
            Some(a.timestamp_millis().cmp(&b.timestamp_millis()))
        }
        (Bson::ObjectId(a), Bson::ObjectId(b)) => Some(a.bytes().cmp(&b.bytes())),
        (Bson::Int32(a), Bson::Int32(b)) => Some(a.cmp(b)),
        (Bson::Int64(a), Bson::Int64(b)) => Some(a.cmp(b)),
        (Bson::Int32(a), Bson::Int64(b)) => Some((*a as i64).cmp(b)),
        (Bson::Int64(a), Bson::Int32(b)) => Some(a.cmp(&(*b as i64))),
        (a, b) => match (as_f64(a), as_f64(b)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => (a == b).then_some(Ordering::Equal),
        },
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(*n as f64),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

/// Sort ordering: missing and null values sort first, then values by type
/// rank, then by value within a rank.
pub(crate) fn compare_field_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => sort_cmp(a, b),
    }
}

/// Cross-type order: null < numbers < strings < documents < arrays
/// < binary < ObjectId < bool < date < everything else.
fn type_rank(value: &Bson) -> u8 {
    match value {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => 2,
        Bson::String(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::MaxKey => u8::MAX,
        _ => 10,
    }
}

/// Total order over BSON values, safe to hand to `sort_by`.
fn sort_cmp(a: &Bson, b: &Bson) -> Ordering {
    let by_rank = type_rank(a).cmp(&type_rank(b));
    if by_rank.is_ne() {
        return by_rank;
    }
    match (a, b) {
        (Bson::String(a), Bson::String(b)) => a.cmp(b),
        (Bson::Document(a), Bson::Document(b)) => a
            .iter()
            .zip(b)
            .map(|((ka, va), (kb, vb))| ka.cmp(kb).then_with(|| sort_cmp(va, vb)))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.len().cmp(&b.len())),
        (Bson::Array(a), Bson::Array(b)) => a
            .iter()
            .zip(b)
            .map(|(x, y)| sort_cmp(x, y))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.len().cmp(&b.len())),
        (Bson::Binary(a), Bson::Binary(b)) => a.bytes.cmp(&b.bytes),
        (Bson::ObjectId(a), Bson::ObjectId(b)) => a.bytes().cmp(&b.bytes()),
        (Bson::Boolean(a), Bson::Boolean(b)) => a.cmp(b),
        (Bson::DateTime(a), Bson::DateTime(b)) => {
            a.timestamp_millis().cmp(&b.timestamp_millis())
        }
        // numbers share one rank, and total_cmp keeps NaN in order
        (a, b) => match (as_f64(a), as_f64(b)) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            _ => Ordering::Equal,
        },
    }
}

/// Stable multi-key sort.
pub(crate) fn sort_documents(docs: &mut [Document], sorts: &[Sort]) {
    if sorts.is_empty() {
        return;
    }
    docs.sort_by(|a, b| {
        for sort in sorts {
            let ord = compare_field_values(get_path(a, &sort.field), get_path(b, &sort.field));
            let ord = match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

pub(crate) fn project(doc: Document, projection: &Projection) -> Document {
    match projection {
        Projection::Include { fields, exclude_id } => {
            let paths: Vec<&str> = fields.iter().map(String::as_str).collect();
            let mut out = include_paths(&doc, &paths);
            if *exclude_id {
                out.remove("_id");
            } else if let Some(id) = doc.get("_id") {
                // _id leads the projected document
                let mut with_id = Document::new();
                with_id.insert("_id", id.clone());
                for (key, value) in out {
                    with_id.insert(key, value);
                }
                out = with_id;
            }
            out
        }
        Projection::Exclude(fields) => {
            let mut out = doc;
            for field in fields {
                remove_path(&mut out, field);
            }
            out
        }
    }
}

/// Copy the listed (possibly dotted) paths, keeping the source field order.
fn include_paths(src: &Document, paths: &[&str]) -> Document {
    let mut out = Document::new();
    for (key, value) in src {
        let mut whole = false;
        let mut children = Vec::new();
        for path in paths {
            match path.split_once('.') {
                None if *path == key => whole = true,
                Some((head, rest)) if head == key => children.push(rest),
                _ => {}
            }
        }

        if whole {
            out.insert(key.clone(), value.clone());
        } else if !children.is_empty() {
            match value {
                Bson::Document(sub) => {
                    out.insert(key.clone(), include_paths(sub, &children));
                }
                Bson::Array(items) => {
                    let projected = items
                        .iter()
                        .filter_map(|item| match item {
                            Bson::Document(sub) => {
                                Some(Bson::Document(include_paths(sub, &children)))
                            }
                            _ => None,
                        })
                        .collect();
                    out.insert(key.clone(), Bson::Array(projected));
                }
                _ => {}
            }
        }
    }
    out
}

fn remove_path(doc: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            doc.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Bson::Document(sub)) = doc.get_mut(head) {
                remove_path(sub, rest);
            }
        }
    }
}
