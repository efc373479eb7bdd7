//! Integrity and completeness audit
//!
//! Two independent passes over a finished document:
//!
//! - **Integrity**: every `$ref` reachable from the root is resolved against
//!   `definitions`; dangling internal references are reported with the path
//!   of the node that carries them. Event-shaped references seen along the
//!   way feed the unused-event estimate.
//! - **Completeness**: every object-valued definition is scored 0-100 from
//!   four criteria worth 25 points each.

use std::collections::HashSet;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::document::{all_of_has_properties, is_present, properties_of, SchemaDocument};
use crate::reference::{is_event_shaped, ReferenceResolver};
use crate::walk::walk;

/// Points awarded per satisfied criterion
pub const CRITERION_POINTS: u8 = 25;

/// Definitions scoring below this are listed as incomplete
pub const INCOMPLETE_THRESHOLD: u8 = 75;

/// Keywords that give a definition a structural shape
const STRUCTURAL_KEYWORDS: &[&str] = &["type", "allOf", "anyOf", "oneOf", "enum"];

pub const MISSING_STRUCTURE: &str = "Missing structural definition (type/allOf/anyOf/enum)";
pub const MISSING_METADATA: &str = "Missing description/title";
pub const MISSING_OBJECT_PROPERTIES: &str = "Object with no properties";
pub const MISSING_CONTENT: &str = "Missing content (properties/enum/allOf properties)";
pub const MISSING_AUGMENTATION: &str = "No augmentation detected (defaults/events/hints)";

/// Caveat carried by every report next to the unused-event list
pub const HEURISTIC_NOTE: &str = "Event definitions are recognised by name only (ending in \
'Event' or containing 'Action'); an unused event may still be referenced outside the schema, \
for example in documentation.";

/// A `$ref` whose target is missing from `definitions`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenReference {
    /// Path of the node carrying the `$ref`
    pub path: String,
    pub reference: String,
}

impl fmt::Display for BrokenReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.path, self.reference)
    }
}

impl Serialize for BrokenReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Completeness score and tallies for one definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentScore {
    pub name: String,
    pub completeness: u8,
    pub missing: Vec<String>,
    pub prop_count: usize,
    pub nested_refs: usize,
    pub enum_count: usize,
    pub default_count: usize,
    pub event_count: usize,
}

impl ComponentScore {
    pub fn is_perfect(&self) -> bool {
        self.completeness == 4 * CRITERION_POINTS
    }
}

/// Entry of the incomplete-components list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncompleteComponent {
    pub name: String,
    pub score: u8,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub total_components: usize,
    pub broken_reference_count: usize,
    pub unused_event_count: usize,
    pub event_definition_count: usize,
    pub perfect_score_count: usize,
    pub average_property_count: f64,
}

/// Full audit output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub summary: AuditSummary,
    pub broken_references: Vec<BrokenReference>,
    pub unused_events: Vec<String>,
    pub incomplete_components: Vec<IncompleteComponent>,
    pub all_scores: Vec<ComponentScore>,
    pub heuristic_note: &'static str,
}

/// Result of the integrity pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityFindings {
    pub broken_references: Vec<BrokenReference>,
    /// Event-shaped definition names that some traversed `$ref` points at
    pub referenced_events: HashSet<String>,
}

/// Walk the whole document and resolve every `$ref`
pub fn check_integrity(document: &SchemaDocument) -> IntegrityFindings {
    let resolver = ReferenceResolver::new(document.definitions());
    let mut findings = IntegrityFindings::default();

    for (node, path) in walk(document.as_value(), "root") {
        let Some(reference) = node.get("$ref") else {
            continue;
        };
        let check = resolver.check(reference);
        if let Some(target) = check.target() {
            if is_event_shaped(target) {
                findings.referenced_events.insert(target.to_string());
            }
        }
        if check.is_broken() {
            findings.broken_references.push(BrokenReference {
                path,
                reference: reference.as_str().unwrap_or_default().to_string(),
            });
        }
    }
    findings
}

/// Event-shaped definitions that no traversed reference points at, in
/// definition order
pub fn unused_events(document: &SchemaDocument, referenced: &HashSet<String>) -> Vec<String> {
    event_definitions(document)
        .filter(|name| !referenced.contains(*name))
        .map(str::to_string)
        .collect()
}

fn event_definitions(document: &SchemaDocument) -> impl Iterator<Item = &str> {
    document
        .definitions()
        .into_iter()
        .flat_map(|defs| defs.keys())
        .map(String::as_str)
        .filter(|name| is_event_shaped(name))
}

/// Score one definition against the completeness rubric
pub fn score_definition(name: &str, def: &Map<String, Value>) -> ComponentScore {
    let mut score = ComponentScore {
        name: name.to_string(),
        completeness: 0,
        missing: Vec::new(),
        prop_count: 0,
        nested_refs: 0,
        enum_count: 0,
        default_count: 0,
        event_count: 0,
    };

    // Structural definition
    if STRUCTURAL_KEYWORDS.iter().any(|key| is_present(def, key)) {
        score.completeness += CRITERION_POINTS;
    } else {
        score.missing.push(MISSING_STRUCTURE.to_string());
    }

    // Human-facing metadata
    if is_present(def, "description") || is_present(def, "title") {
        score.completeness += CRITERION_POINTS;
    } else {
        score.missing.push(MISSING_METADATA.to_string());
    }

    // Content
    let props = properties_of(def);
    let has_properties = props.map(|p| !p.is_empty()).unwrap_or(false);
    if has_properties || is_present(def, "enum") || all_of_has_properties(def) {
        score.completeness += CRITERION_POINTS;
    } else if def.get("type").and_then(Value::as_str) == Some("object") {
        score.missing.push(MISSING_OBJECT_PROPERTIES.to_string());
    } else {
        score.missing.push(MISSING_CONTENT.to_string());
    }

    if let Some(props) = props {
        score.prop_count = props.len();
        for prop in props.values().filter_map(Value::as_object) {
            if is_present(prop, "$ref") {
                score.nested_refs += 1;
            }
            if is_present(prop, "enum") {
                score.enum_count += 1;
            }
            if prop.contains_key("default") {
                score.default_count += 1;
            }
        }
        if props.contains_key("onEvent") {
            score.event_count = 1;
        }
    }

    // Augmentation evidence
    if score.default_count > 0 || score.event_count > 0 {
        score.completeness += CRITERION_POINTS;
    } else {
        score.missing.push(MISSING_AUGMENTATION.to_string());
    }

    score
}

/// Run both passes and assemble the report
pub fn audit(document: &SchemaDocument) -> AuditReport {
    info!("Performing integrity check (reference validation)");
    let integrity = check_integrity(document);
    info!(count = integrity.broken_references.len(), "broken references found");
    for broken in integrity.broken_references.iter().take(5) {
        warn!(%broken, "broken reference");
    }

    let unused = unused_events(document, &integrity.referenced_events);
    let event_definition_count = event_definitions(document).count();

    info!("Calculating completeness scores");
    let all_scores: Vec<ComponentScore> = document
        .object_definitions()
        .map(|(name, def)| score_definition(name, def))
        .collect();

    let incomplete_components = all_scores
        .iter()
        .filter(|s| s.completeness < INCOMPLETE_THRESHOLD)
        .map(|s| IncompleteComponent {
            name: s.name.clone(),
            score: s.completeness,
            missing: s.missing.clone(),
        })
        .collect();

    let average_property_count = if all_scores.is_empty() {
        0.0
    } else {
        all_scores.iter().map(|s| s.prop_count).sum::<usize>() as f64 / all_scores.len() as f64
    };

    let summary = AuditSummary {
        total_components: all_scores.len(),
        broken_reference_count: integrity.broken_references.len(),
        unused_event_count: unused.len(),
        event_definition_count,
        perfect_score_count: all_scores.iter().filter(|s| s.is_perfect()).count(),
        average_property_count,
    };
    info!(
        components = summary.total_components,
        perfect = summary.perfect_score_count,
        unused_events = summary.unused_event_count,
        "Deep validation summary"
    );

    AuditReport {
        summary,
        broken_references: integrity.broken_references,
        unused_events: unused,
        incomplete_components,
        all_scores,
        heuristic_note: HEURISTIC_NOTE,
    }
}
