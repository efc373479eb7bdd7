//! Deep merge of a release schema with a locally built overlay
//!
//! Rules, applied at every level:
//! - object + object: merged key by key; base key order is kept and keys
//!   only the overlay has are appended in overlay order
//! - `required` array + array: union, base order first, no duplicates
//! - any other array: the overlay array replaces the base array
//! - everything else: the overlay value wins
//!
//! Arrays such as `oneOf`, `anyOf` and `enum` are never merged element by
//! element.

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::document::SchemaDocument;

/// Keyword whose arrays are unioned instead of replaced
const UNION_KEYWORD: &str = "required";

/// Merge `overlay` onto `base`, returning a new document.
///
/// An empty overlay (non-object, or an object without keys) stands for a
/// local build that produced nothing; the base is returned unchanged.
pub fn merge(base: &SchemaDocument, overlay: &SchemaDocument) -> SchemaDocument {
    if overlay.is_empty() {
        info!("Local schema is empty, using release schema as-is");
        return base.clone();
    }

    info!(
        base_definitions = base.definition_count(),
        overlay_definitions = overlay.definition_count(),
        "Merging release schema and local schema"
    );
    let merged = SchemaDocument::new(merge_values(base.as_value(), overlay.as_value(), None));
    debug!(merged_definitions = merged.definition_count(), "merge complete");
    merged
}

fn merge_values(base: &Value, overlay: &Value, key: Option<&str>) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            Value::Object(merge_objects(base_map, overlay_map))
        }
        (Value::Array(base_items), Value::Array(overlay_items)) if key == Some(UNION_KEYWORD) => {
            Value::Array(union(base_items, overlay_items))
        }
        _ => overlay.clone(),
    }
}

fn merge_objects(base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = Map::with_capacity(base.len() + overlay.len());
    for (key, base_value) in base {
        let value = match overlay.get(key) {
            Some(overlay_value) => merge_values(base_value, overlay_value, Some(key.as_str())),
            None => base_value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    for (key, overlay_value) in overlay {
        if !base.contains_key(key) {
            merged.insert(key.clone(), overlay_value.clone());
        }
    }
    merged
}

fn union(base: &[Value], overlay: &[Value]) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(base.len() + overlay.len());
    for item in base.iter().chain(overlay) {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}
