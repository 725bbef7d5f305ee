//! Conversions from loosely-typed metric maps.

use crate::point::{FieldMap, TagMap};
use serde_json::Value;

/// Partition a loose map into its string half and its numeric half.
///
/// Strings become tag candidates, numbers become field values. Values that
/// are neither (booleans, nulls, arrays, objects) are dropped. Handy when a
/// collector hands over one flat JSON object mixing labels and readings.
pub fn split_tags_fields(map: impl IntoIterator<Item = (String, Value)>) -> (TagMap, FieldMap) {
    let mut tags = TagMap::new();
    let mut fields = FieldMap::new();

    for (key, value) in map {
        match value {
            Value::String(s) => {
                tags.insert(key, s);
            }
            Value::Number(n) => {
                if let Some(f) = n.as_f64() {
                    fields.insert(key, f);
                }
            }
            _ => {}
        }
    }

    (tags, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_mixed_map() {
        let map = json!({
            "host": "gpu-rig",
            "sensor": "edge",
            "temperature": 61.5,
            "fan": 1200,
        });

        let (tags, fields) = split_tags_fields(map.as_object().unwrap().clone());

        assert_eq!(tags.len(), 2);
        assert_eq!(tags.get("host").map(String::as_str), Some("gpu-rig"));
        assert_eq!(tags.get("sensor").map(String::as_str), Some("edge"));

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("temperature"), Some(&61.5));
        assert_eq!(fields.get("fan"), Some(&1200.0));
    }

    #[test]
    fn test_split_drops_other_value_types() {
        let map = json!({
            "enabled": true,
            "note": null,
            "parts": [1, 2],
            "nested": {"a": 1},
            "kept": 3.5,
        });

        let (tags, fields) = split_tags_fields(map.as_object().unwrap().clone());

        assert!(tags.is_empty());
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("kept"), Some(&3.5));
    }

    #[test]
    fn test_split_empty_map() {
        let (tags, fields) = split_tags_fields(serde_json::Map::new());
        assert!(tags.is_empty());
        assert!(fields.is_empty());
    }
}
