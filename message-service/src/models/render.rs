//! Rendering of schemaless store documents into response JSON.
//!
//! The store-assigned `_id` is dropped from top-level documents, datetimes
//! become RFC 3339 strings, and every other BSON value uses relaxed extended
//! JSON.

use mongodb::bson::{Bson, Document};
use serde_json::{Map, Value};

pub fn documents_to_json(documents: Vec<Document>) -> anyhow::Result<Value> {
    documents
        .into_iter()
        .map(document_to_json)
        .collect::<anyhow::Result<Vec<_>>>()
        .map(Value::Array)
}

fn document_to_json(document: Document) -> anyhow::Result<Value> {
    let mut map = Map::with_capacity(document.len());
    for (key, value) in document {
        if key == "_id" {
            continue;
        }
        map.insert(key, bson_to_json(value)?);
    }
    Ok(Value::Object(map))
}

fn bson_to_json(value: Bson) -> anyhow::Result<Value> {
    match value {
        Bson::DateTime(dt) => Ok(Value::String(dt.try_to_rfc3339_string()?)),
        Bson::Document(nested) => {
            let mut map = Map::with_capacity(nested.len());
            for (key, value) in nested {
                map.insert(key, bson_to_json(value)?);
            }
            Ok(Value::Object(map))
        }
        Bson::Array(items) => items
            .into_iter()
            .map(bson_to_json)
            .collect::<anyhow::Result<Vec<_>>>()
            .map(Value::Array),
        other => Ok(other.into_relaxed_extjson()),
    }
}
