//! Per-definition statistics over a final document

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::augment::EXPRESSION_MARKER;
use crate::document::{is_present, SchemaDocument};
use crate::verify::is_event_property;

pub const NO_PROPERTIES_ISSUE: &str = "No properties defined for object type";

/// Zero-property definitions listed in the summary sample
const EMPTY_SAMPLE_SIZE: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionStats {
    pub name: String,
    pub prop_count: usize,
    pub nested_count: usize,
    pub enum_count: usize,
    pub default_count: usize,
    pub event_count: usize,
    pub expression_fields: usize,
    pub desc_count: usize,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_components: usize,
    pub total_properties: usize,
    pub total_enums: usize,
    pub total_defaults: usize,
    pub expression_hints: usize,
    pub components_with_issues: usize,
    /// Definitions with no visible properties that raised no issue,
    /// usually composed through `allOf`/`anyOf`
    pub empty_sample: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    pub summary: StatsSummary,
    pub definitions: Vec<DefinitionStats>,
}

pub fn definition_stats(name: &str, def: &Map<String, Value>) -> DefinitionStats {
    let mut stats = DefinitionStats {
        name: name.to_string(),
        ..Default::default()
    };

    let props = def.get("properties").and_then(Value::as_object);
    stats.prop_count = props.map(Map::len).unwrap_or(0);

    let composed = ["allOf", "anyOf", "oneOf", "$ref"].iter().any(|key| is_present(def, key));
    let object_typed = def.get("type").and_then(Value::as_str) == Some("object");
    if stats.prop_count == 0 && !composed && object_typed {
        stats.issues.push(NO_PROPERTIES_ISSUE.to_string());
    }

    for (key, prop) in props.into_iter().flatten() {
        let Some(prop) = prop.as_object() else {
            continue;
        };
        let nested_object = prop.get("type").and_then(Value::as_str) == Some("object")
            && is_present(prop, "properties");
        if is_present(prop, "$ref") || nested_object {
            stats.nested_count += 1;
        }
        if is_present(prop, "enum") {
            stats.enum_count += 1;
        }
        if prop.contains_key("default") {
            stats.default_count += 1;
        }
        if is_event_property(key) {
            stats.event_count += 1;
        }
        if let Some(description) = prop.get("description").and_then(Value::as_str).filter(|d| !d.is_empty()) {
            stats.desc_count += 1;
            if description.contains(EXPRESSION_MARKER) {
                stats.expression_fields += 1;
            }
        }
    }

    stats
}

pub fn collect_stats(document: &SchemaDocument) -> StatsReport {
    let definitions: Vec<_> = document
        .object_definitions()
        .map(|(name, def)| definition_stats(name, def))
        .collect();

    let summary = StatsSummary {
        total_components: definitions.len(),
        total_properties: definitions.iter().map(|s| s.prop_count).sum(),
        total_enums: definitions.iter().map(|s| s.enum_count).sum(),
        total_defaults: definitions.iter().map(|s| s.default_count).sum(),
        expression_hints: definitions.iter().map(|s| s.expression_fields).sum(),
        components_with_issues: definitions.iter().filter(|s| !s.issues.is_empty()).count(),
        empty_sample: definitions
            .iter()
            .filter(|s| s.prop_count == 0 && s.issues.is_empty())
            .take(EMPTY_SAMPLE_SIZE)
            .map(|s| s.name.clone())
            .collect(),
    };

    info!(
        components = summary.total_components,
        properties = summary.total_properties,
        enums = summary.total_enums,
        defaults = summary.total_defaults,
        expression_hints = summary.expression_hints,
        with_issues = summary.components_with_issues,
        "Completeness summary"
    );

    StatsReport { summary, definitions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_tallies() {
        let def = json!({
            "type": "object",
            "properties": {
                "api": {"$ref": "#/definitions/Api"},
                "style": {"type": "object", "properties": {"color": {}}},
                "level": {"enum": ["info", "danger"], "default": "info"},
                "onClick": {"type": "object"},
                "visibleOn": {"description": "Show (Supports Expressions)"},
                "label": {"description": "Text"},
                "raw": true
            }
        });
        let stats = definition_stats("Button", def.as_object().unwrap());
        assert_eq!(stats.prop_count, 7);
        assert_eq!(stats.nested_count, 2);
        assert_eq!(stats.enum_count, 1);
        assert_eq!(stats.default_count, 1);
        assert_eq!(stats.event_count, 1);
        assert_eq!(stats.desc_count, 2);
        assert_eq!(stats.expression_fields, 1);
        assert!(stats.issues.is_empty());
    }

    #[test]
    fn test_empty_object_issue() {
        let empty_object = json!({"type": "object"});
        let stats = definition_stats("Blank", empty_object.as_object().unwrap());
        assert_eq!(stats.issues, vec![NO_PROPERTIES_ISSUE]);

        let composed = json!({"type": "object", "anyOf": [{}]});
        assert!(definition_stats("Union", composed.as_object().unwrap()).issues.is_empty());

        let scalar = json!({"type": "string"});
        assert!(definition_stats("Text", scalar.as_object().unwrap()).issues.is_empty());
    }

    #[test]
    fn test_summary_totals_and_sample() {
        let document = SchemaDocument::new(json!({"definitions": {
            "A": {"properties": {"x": {"enum": [1]}, "y": {"default": null}}},
            "B": {"type": "object"},
            "C": {"allOf": []},
            "D": {"type": "string"},
            "skipped": 42
        }}));
        let report = collect_stats(&document);
        assert_eq!(report.definitions.len(), 4);
        assert_eq!(report.summary.total_components, 4);
        assert_eq!(report.summary.total_properties, 2);
        assert_eq!(report.summary.total_enums, 1);
        assert_eq!(report.summary.total_defaults, 1);
        assert_eq!(report.summary.components_with_issues, 1);
        assert_eq!(report.summary.empty_sample, vec!["C", "D"]);
    }

    #[test]
    fn test_sample_is_capped() {
        let defs: serde_json::Map<String, Value> = (0..8)
            .map(|i| (format!("Empty{}", i), json!({"allOf": [{}]})))
            .collect();
        let report = collect_stats(&SchemaDocument::new(json!({"definitions": defs})));
        assert_eq!(report.summary.empty_sample.len(), EMPTY_SAMPLE_SIZE);
        assert_eq!(report.summary.empty_sample[0], "Empty0");
    }

    #[test]
    fn test_report_uses_camel_case() {
        let report = collect_stats(&SchemaDocument::new(json!({"definitions": {"A": {}}})));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["summary"]["totalComponents"], 1);
        assert_eq!(value["definitions"][0]["propCount"], 0);
    }
}
