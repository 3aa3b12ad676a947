//! Event field extraction.
//!
//! Turns the JSON event that triggered a promotion into the flat
//! [`FieldMap`] consumed by the field substitution engine. Keys are dotted
//! paths such as `data.image.tag`.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Flat, ordered map from dotted field key to string value.
pub type FieldMap = BTreeMap<String, String>;

/// Standard event attributes that never end up in a field map.
const SKIPPED_ATTRIBUTES: &[&str] = &["type", "time", "datacontenttype", "dataschema", "subject"];

/// Builds the field map of an event.
///
/// The `data` object is flattened below the `data.` prefix. Every other
/// top-level attribute (including `id`, `source`, `specversion` and extension
/// attributes) is added at the root, except the standard attributes `type`,
/// `time`, `datacontenttype`, `dataschema` and `subject`.
///
/// # Examples
///
/// ```
/// use git_promotion::fields::from_event;
/// use serde_json::json;
///
/// let event = json!({
///     "id": "1234",
///     "type": "promotion.triggered",
///     "data": { "image": { "tag": "2.6.0" }, "replicas": 3 }
/// });
/// let fields = from_event(&event);
/// assert_eq!(fields["data.image.tag"], "2.6.0");
/// assert_eq!(fields["data.replicas"], "3");
/// assert_eq!(fields["id"], "1234");
/// assert!(!fields.contains_key("type"));
/// ```
pub fn from_event(event: &Value) -> FieldMap {
    let mut fields = FieldMap::new();
    let Some(attributes) = event.as_object() else {
        return fields;
    };

    for (name, value) in attributes {
        if name == "data" {
            match value {
                Value::Object(data) => flatten_into(&mut fields, "data", data),
                other => insert_scalar(&mut fields, "data".to_string(), other),
            }
        } else if !SKIPPED_ATTRIBUTES.contains(&name.as_str()) {
            match value {
                Value::Object(nested) => flatten_into(&mut fields, name, nested),
                other => insert_scalar(&mut fields, name.clone(), other),
            }
        }
    }
    fields
}

fn flatten_into(fields: &mut FieldMap, prefix: &str, object: &Map<String, Value>) {
    for (key, value) in object {
        let dotted = format!("{}.{}", prefix, key);
        match value {
            Value::Object(nested) => flatten_into(fields, &dotted, nested),
            other => insert_scalar(fields, dotted, other),
        }
    }
}

fn insert_scalar(fields: &mut FieldMap, key: String, value: &Value) {
    let rendered = match value {
        Value::Null => return,
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // arrays keep their JSON form; objects are flattened by the caller
        other => other.to_string(),
    };
    fields.insert(key, rendered);
}
