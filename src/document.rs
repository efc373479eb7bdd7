//! Schema document model
//!
//! A schema document is an arbitrary JSON tree that loosely follows
//! Draft-07. Everything the engine consumes is presence-tested, so the
//! document is kept as a `serde_json::Value` and wrapped only to give the
//! `definitions` table a name.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::checksum::Checksum;
use crate::config::OutputFormat;
use crate::error::{Result, SchemaError};

/// Root key holding the definition table
pub const DEFINITIONS_KEY: &str = "definitions";

/// `serde_json` refuses to parse documents nested deeper than this. The
/// walker itself has no depth limit; documents built in memory may be deeper.
pub const PARSE_DEPTH_LIMIT: usize = 128;

/// A whole schema document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDocument(Value);

impl Default for SchemaDocument {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for SchemaDocument {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl SchemaDocument {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// `{}`: the stand-in for a local build that produced nothing
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// True for non-object roots and for objects without keys
    pub fn is_empty(&self) -> bool {
        self.0.as_object().map(Map::is_empty).unwrap_or(true)
    }

    /// The `definitions` table, if the root has one
    pub fn definitions(&self) -> Option<&Map<String, Value>> {
        self.0.get(DEFINITIONS_KEY)?.as_object()
    }

    pub fn definitions_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.0.get_mut(DEFINITIONS_KEY)?.as_object_mut()
    }

    pub fn definition(&self, name: &str) -> Option<&Value> {
        self.definitions()?.get(name)
    }

    pub fn has_definition(&self, name: &str) -> bool {
        self.definition(name).is_some()
    }

    pub fn definition_count(&self) -> usize {
        self.definitions().map(Map::len).unwrap_or(0)
    }

    /// Object-valued definitions in document order; other entries are skipped
    pub fn object_definitions(&self) -> impl Iterator<Item = (&str, &Map<String, Value>)> {
        self.definitions()
            .into_iter()
            .flat_map(|defs| defs.iter())
            .filter_map(|(name, def)| def.as_object().map(|obj| (name.as_str(), obj)))
    }

    pub fn checksum(&self) -> Checksum {
        Checksum::of_json(&self.0)
    }

    /// Load a document that must be a JSON object.
    ///
    /// Files nested deeper than [`PARSE_DEPTH_LIMIT`] are rejected as
    /// invalid documents rather than generic JSON errors.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content).map_err(|e| {
            if e.to_string().contains("recursion limit exceeded") {
                SchemaError::InvalidDocument {
                    path: path.display().to_string(),
                    reason: format!("nesting exceeds the parser limit of {} levels", PARSE_DEPTH_LIMIT),
                }
            } else {
                SchemaError::Json(e)
            }
        })?;
        if !value.is_object() {
            return Err(SchemaError::InvalidDocument {
                path: path.display().to_string(),
                reason: "root is not a JSON object".to_string(),
            });
        }
        debug!(path = %path.display(), "loaded schema document");
        Ok(Self(value))
    }

    /// Load a document that may legitimately be missing.
    ///
    /// Missing, unreadable or malformed files degrade to the empty document.
    pub fn load_or_empty(path: &Path) -> Self {
        if !path.exists() {
            warn!(path = %path.display(), "schema document not found, using empty document");
            return Self::empty();
        }
        match Self::load(path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unusable schema document, using empty document");
                Self::empty()
            }
        }
    }

    /// Write the document, creating parent directories as needed
    pub fn save(&self, path: &Path, format: OutputFormat) -> Result<()> {
        write_json(path, &self.0, format)
    }
}

/// Serialize any report or document to a file
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, format: OutputFormat) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let content = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        OutputFormat::Compact => serde_json::to_string(value)?,
    };
    fs::write(path, content)?;
    Ok(())
}

/// Presence test used by every rule that asks "does this key carry a value".
///
/// Absent keys, `null`, `false`, `0` and `""` are not present; empty arrays
/// and objects are.
pub fn is_present(obj: &Map<String, Value>, key: &str) -> bool {
    match obj.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// The `properties` mapping of a definition, when it is an object
pub fn properties_of(def: &Map<String, Value>) -> Option<&Map<String, Value>> {
    def.get("properties")?.as_object()
}

/// True when some `allOf` branch carries a present `properties` key
pub fn all_of_has_properties(def: &Map<String, Value>) -> bool {
    def.get("allOf")
        .and_then(Value::as_array)
        .map(|branches| {
            branches
                .iter()
                .filter_map(Value::as_object)
                .any(|branch| is_present(branch, "properties"))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_presence_rules() {
        let obj = json!({
            "a": null, "b": false, "c": 0, "d": "",
            "e": [], "f": {}, "g": "x", "h": true, "i": 3
        });
        let obj = obj.as_object().unwrap();
        for key in ["a", "b", "c", "d", "missing"] {
            assert!(!is_present(obj, key), "{} should be absent", key);
        }
        for key in ["e", "f", "g", "h", "i"] {
            assert!(is_present(obj, key), "{} should be present", key);
        }
    }

    #[test]
    fn test_definitions_access() {
        let doc = SchemaDocument::new(json!({
            "definitions": {"A": {"type": "object"}, "B": "not an object"}
        }));
        assert_eq!(doc.definition_count(), 2);
        assert!(doc.has_definition("A"));
        assert!(!doc.has_definition("C"));
        let names: Vec<_> = doc.object_definitions().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["A"]);
    }

    #[test]
    fn test_empty_document() {
        assert!(SchemaDocument::empty().is_empty());
        assert!(SchemaDocument::new(Value::Null).is_empty());
        assert!(!SchemaDocument::new(json!({"definitions": {}})).is_empty());
        assert_eq!(SchemaDocument::new(json!([1, 2])).definition_count(), 0);
    }

    #[test]
    fn test_all_of_properties() {
        let def = json!({"allOf": [{"$ref": "#/definitions/Base"}, {"properties": {"a": {}}}]});
        assert!(all_of_has_properties(def.as_object().unwrap()));
        let def = json!({"allOf": [{"$ref": "#/definitions/Base"}]});
        assert!(!all_of_has_properties(def.as_object().unwrap()));
    }

    #[test]
    fn test_load_and_save_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        let doc = SchemaDocument::new(json!({"definitions": {"A": {"title": "A"}}}));
        doc.save(&path, OutputFormat::Pretty).unwrap();
        assert_eq!(SchemaDocument::load(&path).unwrap(), doc);
    }

    #[test]
    fn test_load_rejects_non_object_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("array.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(
            SchemaDocument::load(&path),
            Err(SchemaError::InvalidDocument { .. })
        ));
        assert!(SchemaDocument::load_or_empty(&path).is_empty());
    }

    #[test]
    fn test_too_deep_document_names_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep.json");
        let depth = PARSE_DEPTH_LIMIT + 10;
        fs::write(&path, format!("{{\"a\": {}{}}}", "[".repeat(depth), "]".repeat(depth))).unwrap();

        match SchemaDocument::load(&path) {
            Err(SchemaError::InvalidDocument { reason, .. }) => {
                assert!(reason.contains(&PARSE_DEPTH_LIMIT.to_string()), "{}", reason)
            }
            other => panic!("expected InvalidDocument, got {:?}", other),
        }
        assert!(SchemaDocument::load_or_empty(&path).is_empty());
    }

    #[test]
    fn test_missing_optional_document_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let doc = SchemaDocument::load_or_empty(&dir.path().join("absent.json"));
        assert_eq!(doc, SchemaDocument::empty());
    }
}
