use std::collections::BTreeMap;

use bson::{Bson, Document};

/// Keys that steer the query instead of filtering on a field.
pub const CONTROL_KEYS: [&str; 4] = ["page", "sort", "limit", "fields"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    List(Vec<String>),
    Nested(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Single(s) => Some(s),
            _ => None,
        }
    }

    /// Flattens a scalar or list into comma-joined text. Nested values have no text form.
    pub fn joined(&self) -> Option<String> {
        match self {
            ParamValue::Single(s) => Some(s.clone()),
            ParamValue::List(items) => Some(items.join(",")),
            ParamValue::Nested(_) => None,
        }
    }

    fn to_bson(&self) -> Bson {
        match self {
            ParamValue::Single(s) => Bson::String(s.clone()),
            ParamValue::List(items) => {
                Bson::Array(items.iter().cloned().map(Bson::String).collect())
            }
            ParamValue::Nested(map) => Bson::Document(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_bson()))
                    .collect::<Document>(),
            ),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Single(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Single(s)
    }
}

/// Query-string parameters of a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParameters {
    entries: BTreeMap<String, ParamValue>,
}

impl RawParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw (still percent-encoded) query string.
    ///
    /// Handles:
    /// - `key=value` → `Single`
    /// - `key=a&key=b` → `List`
    /// - `key[]=a` → appended to a `List`
    /// - `key[op]=value`, `key[a][b]=value` → `Nested`
    ///
    /// Undecodable input yields an empty set of parameters.
    pub fn from_query_string(query: &str) -> Self {
        let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query) {
            Ok(pairs) => pairs,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring undecodable query string");
                return Self::new();
            }
        };

        let mut params = Self::new();
        for (key, value) in pairs {
            let path = split_key(&key);
            if path.is_empty() {
                continue;
            }
            insert_path(&mut params.entries, &path, value);
        }
        params
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style `insert`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of these parameters without the control keys.
    pub fn without_control_keys(&self) -> Self {
        let mut copy = self.clone();
        for key in CONTROL_KEYS {
            copy.remove(key);
        }
        copy
    }

    /// Field filters as a BSON document, operator keys not yet rewritten.
    pub fn to_document(&self) -> Document {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_bson()))
            .collect()
    }
}

impl FromIterator<(String, ParamValue)> for RawParameters {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// `a[b][c]` → `["a", "b", "c"]`, `a[]` → `["a", ""]`.
fn split_key(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return if key.is_empty() {
            Vec::new()
        } else {
            vec![key.to_string()]
        };
    };
    if open == 0 || !key.ends_with(']') {
        return vec![key.to_string()];
    }

    let mut path = vec![key[..open].to_string()];
    let mut rest = &key[open..];
    while let Some(stripped) = rest.strip_prefix('[') {
        match stripped.find(']') {
            Some(close) => {
                path.push(stripped[..close].to_string());
                rest = &stripped[close + 1..];
            }
            None => return vec![key.to_string()],
        }
    }
    if !rest.is_empty() {
        return vec![key.to_string()];
    }
    path
}

fn insert_path(map: &mut BTreeMap<String, ParamValue>, path: &[String], value: String) {
    let (head, tail) = match path.split_first() {
        Some(split) => split,
        None => return,
    };

    // `key[]=value` appends to a list.
    if tail.is_empty() || (tail.len() == 1 && tail[0].is_empty()) {
        append_value(map, head, value);
        return;
    }

    let entry = map
        .entry(head.clone())
        .or_insert_with(|| ParamValue::Nested(BTreeMap::new()));
    if !matches!(entry, ParamValue::Nested(_)) {
        *entry = ParamValue::Nested(BTreeMap::new());
    }
    if let ParamValue::Nested(inner) = entry {
        insert_path(inner, tail, value);
    }
}

fn append_value(map: &mut BTreeMap<String, ParamValue>, key: &str, value: String) {
    let next = match map.remove(key) {
        Some(ParamValue::Single(first)) => ParamValue::List(vec![first, value]),
        Some(ParamValue::List(mut items)) => {
            items.push(value);
            ParamValue::List(items)
        }
        None | Some(ParamValue::Nested(_)) => ParamValue::Single(value),
    };
    map.insert(key.to_string(), next);
}
