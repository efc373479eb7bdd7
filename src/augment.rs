//! Metadata augmentation
//!
//! Enriches every definition of a merged document with:
//! 1. injected property defaults from the default table
//! 2. an expression-capability marker on conventional expression fields
//! 3. a `title` equal to the definition name when none is set
//!
//! and finally guarantees a generic `Event` payload definition exists.
//!
//! Every rule is presence-gated: properties are never created, existing
//! definitions are never replaced, and running the pass twice yields the
//! same document as running it once.

use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::config::AugmentConfig;
use crate::document::{is_present, SchemaDocument};

/// Marker appended to the description of expression-capable properties
pub const EXPRESSION_MARKER: &str = "(Supports Expressions)";

/// Property names that conventionally accept an expression
pub const EXPRESSION_FIELDS: &[&str] = &["visibleOn", "disabledOn", "hiddenOn", "className"];

/// Name of the synthetic event payload definition
pub const EVENT_DEFINITION: &str = "Event";

pub fn is_expression_field(name: &str) -> bool {
    EXPRESSION_FIELDS.contains(&name)
}

/// Generic event payload: an action type plus free-form arguments.
///
/// Inserted after the titling pass, so it carries its own title.
pub fn event_definition() -> Value {
    json!({
        "type": "object",
        "title": EVENT_DEFINITION,
        "properties": {
            "actionType": {"type": "string", "description": "Action Type"},
            "args": {"type": "object", "description": "Action Arguments"}
        }
    })
}

/// Default-injection table: definition name -> (property, default) pairs.
///
/// The built-in table is empty; entries come from configuration. The table
/// is fixed once the [`Augmenter`] is constructed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AugmentRules {
    defaults: Vec<(String, Vec<(String, Value)>)>,
}

impl AugmentRules {
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Built-in rules extended with the configured defaults
    pub fn from_config(config: &AugmentConfig) -> Self {
        config.defaults.iter().fold(Self::builtin(), |rules, rule| {
            rules.with_default(&rule.definition, &rule.property, rule.value.clone())
        })
    }

    /// Add a rule; a later rule for the same property replaces the earlier one
    pub fn with_default(mut self, definition: &str, property: &str, value: Value) -> Self {
        let index = match self.defaults.iter().position(|(name, _)| name == definition) {
            Some(index) => index,
            None => {
                self.defaults.push((definition.to_string(), Vec::new()));
                self.defaults.len() - 1
            }
        };
        let props = &mut self.defaults[index].1;
        match props.iter_mut().find(|(name, _)| name == property) {
            Some(entry) => entry.1 = value,
            None => props.push((property.to_string(), value)),
        }
        self
    }

    pub fn defaults_for(&self, definition: &str) -> &[(String, Value)] {
        self.defaults
            .iter()
            .find(|(name, _)| name == definition)
            .map(|(_, props)| props.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty()
    }
}

/// What one augmentation run changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AugmentStats {
    pub definitions: usize,
    pub defaults_injected: usize,
    pub hints_added: usize,
    pub titles_added: usize,
    pub event_inserted: bool,
}

/// Applies the augmentation rules to whole documents
#[derive(Debug, Clone, Default)]
pub struct Augmenter {
    rules: AugmentRules,
}

impl Augmenter {
    pub fn new() -> Self {
        Self::with_rules(AugmentRules::builtin())
    }

    pub fn with_rules(rules: AugmentRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &AugmentRules {
        &self.rules
    }

    /// Augment a document, returning it with the enrichments applied
    pub fn augment(&self, document: SchemaDocument) -> SchemaDocument {
        self.augment_with_stats(document).0
    }

    pub fn augment_with_stats(&self, mut document: SchemaDocument) -> (SchemaDocument, AugmentStats) {
        info!("Augmenting schema with metadata and types");
        let mut stats = AugmentStats::default();

        let Some(definitions) = document.definitions_mut() else {
            warn!("No definitions found in schema, skipping augmentation");
            return (document, stats);
        };

        for (name, def) in definitions.iter_mut() {
            let Some(def) = def.as_object_mut() else {
                debug!(definition = %name, "skipping non-object definition");
                continue;
            };
            stats.definitions += 1;
            stats.defaults_injected += self.inject_defaults(name, def);
            stats.hints_added += add_expression_hints(def);
            if !is_present(def, "title") {
                def.insert("title".to_string(), Value::String(name.clone()));
                stats.titles_added += 1;
            }
        }

        if !definitions.contains_key(EVENT_DEFINITION) {
            definitions.insert(EVENT_DEFINITION.to_string(), event_definition());
            stats.event_inserted = true;
        }

        info!(
            definitions = stats.definitions,
            defaults = stats.defaults_injected,
            hints = stats.hints_added,
            titles = stats.titles_added,
            event_inserted = stats.event_inserted,
            "Augmentation complete"
        );
        (document, stats)
    }

    fn inject_defaults(&self, name: &str, def: &mut Map<String, Value>) -> usize {
        let rules = self.rules.defaults_for(name);
        if rules.is_empty() {
            return 0;
        }
        let Some(props) = def.get_mut("properties").and_then(Value::as_object_mut) else {
            return 0;
        };
        let mut injected = 0;
        for (property, value) in rules {
            if let Some(prop) = props.get_mut(property).and_then(Value::as_object_mut) {
                prop.insert("default".to_string(), value.clone());
                injected += 1;
            }
        }
        injected
    }
}

/// Append the expression marker to existing expression fields.
///
/// Descriptions that already carry the marker are left alone, as are
/// properties whose description is not a string.
fn add_expression_hints(def: &mut Map<String, Value>) -> usize {
    let Some(props) = def.get_mut("properties").and_then(Value::as_object_mut) else {
        return 0;
    };
    let mut added = 0;
    for field in EXPRESSION_FIELDS {
        let Some(prop) = props.get_mut(*field).and_then(Value::as_object_mut) else {
            continue;
        };
        let description = match prop.get("description") {
            None | Some(Value::Null) => EXPRESSION_MARKER.to_string(),
            Some(Value::String(text)) if text.contains(EXPRESSION_MARKER) => continue,
            Some(Value::String(text)) if text.is_empty() => EXPRESSION_MARKER.to_string(),
            Some(Value::String(text)) => format!("{} {}", text, EXPRESSION_MARKER),
            Some(_) => continue,
        };
        prop.insert("description".to_string(), Value::String(description));
        added += 1;
    }
    added
}

/// Augment with the built-in rules
pub fn augment(document: SchemaDocument) -> SchemaDocument {
    Augmenter::new().augment(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DefaultRule;

    fn doc(value: Value) -> SchemaDocument {
        SchemaDocument::new(value)
    }

    #[test]
    fn test_no_definitions_is_noop() {
        let input = doc(json!({"type": "object"}));
        assert_eq!(augment(input.clone()), input);

        let input = doc(json!({"definitions": ["not", "a", "map"]}));
        assert_eq!(augment(input.clone()), input);
    }

    #[test]
    fn test_expression_hint_appended() {
        let out = augment(doc(json!({"definitions": {"Button": {
            "title": "Button",
            "properties": {
                "visibleOn": {"type": "string", "description": "Show when true"},
                "disabledOn": {"type": "string"},
                "label": {"type": "string", "description": "Text"}
            }
        }}})));
        let props = &out.definition("Button").unwrap()["properties"];
        assert_eq!(props["visibleOn"]["description"], "Show when true (Supports Expressions)");
        assert_eq!(props["disabledOn"]["description"], EXPRESSION_MARKER);
        assert_eq!(props["label"]["description"], "Text");
    }

    #[test]
    fn test_augment_is_idempotent() {
        let input = doc(json!({"definitions": {"Button": {
            "properties": {"visibleOn": {"description": "Show"}, "className": {}}
        }}}));
        let once = augment(input);
        let twice = augment(once.clone());
        assert_eq!(once, twice);
        assert_eq!(
            twice.definition("Button").unwrap()["properties"]["visibleOn"]["description"],
            "Show (Supports Expressions)"
        );
    }

    #[test]
    fn test_never_fabricates_properties() {
        let out = augment(doc(json!({"definitions": {
            "Plain": {"type": "object", "properties": {"label": {"type": "string"}}},
            "Bare": {"type": "string"}
        }})));
        let plain = out.definition("Plain").unwrap();
        assert!(plain["properties"].get("visibleOn").is_none());
        assert_eq!(plain["properties"].as_object().unwrap().len(), 1);
        assert!(out.definition("Bare").unwrap().get("properties").is_none());
    }

    #[test]
    fn test_auto_title() {
        let out = augment(doc(json!({"definitions": {
            "Untitled": {"type": "object"},
            "EmptyTitle": {"title": ""},
            "Titled": {"title": "Kept"}
        }})));
        assert_eq!(out.definition("Untitled").unwrap()["title"], "Untitled");
        assert_eq!(out.definition("EmptyTitle").unwrap()["title"], "EmptyTitle");
        assert_eq!(out.definition("Titled").unwrap()["title"], "Kept");
    }

    #[test]
    fn test_event_definition_inserted_once() {
        let out = augment(doc(json!({"definitions": {"Form": {}}})));
        assert_eq!(out.definition(EVENT_DEFINITION).unwrap(), &event_definition());
        assert_eq!(out.definition_count(), 2);
    }

    #[test]
    fn test_inserted_event_needs_no_second_pass() {
        let once = augment(doc(json!({"definitions": {"Form": {"title": "Form"}}})));
        assert_eq!(once.definition(EVENT_DEFINITION).unwrap()["title"], EVENT_DEFINITION);

        let (twice, stats) = Augmenter::new().augment_with_stats(once.clone());
        assert_eq!(twice, once);
        assert_eq!(stats.titles_added, 0);
        assert!(!stats.event_inserted);
    }

    #[test]
    fn test_existing_event_definition_untouched() {
        let custom = json!({"type": "string", "title": "Custom"});
        let out = augment(doc(json!({"definitions": {"Event": custom.clone()}})));
        assert_eq!(out.definition(EVENT_DEFINITION).unwrap(), &custom);
    }

    #[test]
    fn test_default_injection_only_on_existing_properties() {
        let rules = AugmentRules::from_config(&AugmentConfig {
            defaults: vec![
                DefaultRule {
                    definition: "Tpl".to_string(),
                    property: "className".to_string(),
                    value: json!("my-tpl-class"),
                },
                DefaultRule {
                    definition: "Tpl".to_string(),
                    property: "missing".to_string(),
                    value: json!(1),
                },
            ],
        });
        let (out, stats) = Augmenter::with_rules(rules).augment_with_stats(doc(json!({
            "definitions": {"Tpl": {"properties": {"className": {"type": "string"}}}}
        })));
        let props = &out.definition("Tpl").unwrap()["properties"];
        assert_eq!(props["className"]["default"], "my-tpl-class");
        assert!(props.get("missing").is_none());
        assert_eq!(stats.defaults_injected, 1);
    }

    #[test]
    fn test_later_rule_replaces_earlier() {
        let rules = AugmentRules::builtin()
            .with_default("Tpl", "tpl", json!("a"))
            .with_default("Tpl", "tpl", json!("b"));
        assert_eq!(rules.defaults_for("Tpl"), &[("tpl".to_string(), json!("b"))]);
        assert!(rules.defaults_for("Other").is_empty());
    }

    #[test]
    fn test_stats_report_changes() {
        let (_, stats) = Augmenter::new().augment_with_stats(doc(json!({"definitions": {
            "A": {"properties": {"hiddenOn": {}}},
            "B": "skipped"
        }})));
        assert_eq!(
            stats,
            AugmentStats {
                definitions: 1,
                defaults_injected: 0,
                hints_added: 1,
                titles_added: 1,
                event_inserted: true,
            }
        );
    }
}
