//! JSON ↔ BSON conversion for request and response bodies.

use bson::{Bson, Document};
use serde_json::{Map, Number, Value};

/// Convert a JSON body into a document. Only objects qualify.
pub fn json_to_document(value: Value) -> Option<Document> {
    match json_to_bson(value) {
        Bson::Document(doc) => Some(doc),
        _ => None,
    }
}

pub fn json_to_bson(value: Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => match i32::try_from(i) {
                Ok(small) => Bson::Int32(small),
                Err(_) => Bson::Int64(i),
            },
            None => Bson::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Bson::String(s),
        Value::Array(items) => Bson::Array(items.into_iter().map(json_to_bson).collect()),
        Value::Object(map) => Bson::Document(
            map.into_iter()
                .map(|(k, v)| (k, json_to_bson(v)))
                .collect(),
        ),
    }
}

/// Render a document for a response: ObjectIds become hex strings and
/// datetimes become RFC 3339 strings.
pub fn document_to_json(doc: Document) -> Value {
    Value::Object(
        doc.into_iter()
            .map(|(k, v)| (k, bson_to_json(v)))
            .collect::<Map<String, Value>>(),
    )
}

pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(n) => Value::from(n),
        Bson::Int64(n) => Value::from(n),
        Bson::Double(n) => Number::from_f64(n).map_or(Value::Null, Value::Number),
        Bson::String(s) => Value::String(s),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Value::from(dt.timestamp_millis()),
        },
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(doc) => document_to_json(doc),
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use bson::{DateTime, doc};
    use serde_json::json;

    #[test]
    fn numbers_pick_the_narrowest_type() {
        let doc = json_to_document(json!({ "price": 497, "big": 5_000_000_000_i64, "rating": 4.8 }))
            .unwrap();
        assert_eq!(doc.get("price"), Some(&Bson::Int32(497)));
        assert_eq!(doc.get("big"), Some(&Bson::Int64(5_000_000_000)));
        assert_eq!(doc.get("rating"), Some(&Bson::Double(4.8)));
    }

    #[test]
    fn non_objects_are_not_documents() {
        assert!(json_to_document(json!([1, 2])).is_none());
        assert!(json_to_document(json!("tour")).is_none());
    }

    #[test]
    fn response_rendering() {
        let oid = ObjectId::new();
        let rendered = document_to_json(doc! {
            "_id": oid,
            "createdAt": DateTime::from_millis(0),
            "images": ["a.jpg", "b.jpg"],
            "guide": { "name": "Ana" },
        });
        assert_eq!(
            rendered,
            json!({
                "_id": oid.to_hex(),
                "createdAt": "1970-01-01T00:00:00Z",
                "images": ["a.jpg", "b.jpg"],
                "guide": { "name": "Ana" },
            })
        );
    }
}
