//! Firestore REST value encoding
//!
//! Firestore documents are sent as `{"fields": {name: Value}}` where each
//! `Value` is a single-key object naming its type, e.g.
//! `{"stringValue": "On Shopee"}` or `{"integerValue": "12"}`.

use crate::seed::{FieldValue, Record};
use serde_json::{Map, Value, json};

/// Encode one scalar as a Firestore `Value`
pub fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => json!({ "nullValue": null }),
        FieldValue::Boolean(b) => json!({ "booleanValue": b }),
        // int64 travels as a decimal string
        FieldValue::Integer(i) => json!({ "integerValue": i.to_string() }),
        FieldValue::Double(d) => json!({ "doubleValue": d }),
        FieldValue::String(s) => json!({ "stringValue": s }),
    }
}

/// Encode a record as a Firestore `fields` map
pub fn encode_fields(record: &Record) -> Value {
    let fields: Map<String, Value> = record
        .iter()
        .map(|(name, value)| (name.to_string(), encode_value(value)))
        .collect();
    Value::Object(fields)
}
