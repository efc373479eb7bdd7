//! Targeted component verification
//!
//! Resolves friendly component names ("Button", "CRUD") to definitions and
//! runs a narrow per-definition check: nested references, enumerations,
//! defaults, event handlers and the two core expression fields. Each result
//! carries a deduction-based score.

use std::sync::OnceLock;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::augment::EXPRESSION_MARKER;
use crate::config::VerifyConfig;
use crate::document::{all_of_has_properties, is_present, SchemaDocument};
use crate::reference::{RefCheck, ReferenceResolver};

pub const NOT_FOUND_WARNING: &str = "Definition not found in schema";
pub const SHALLOW_WARNING: &str = "Component uses allOf, shallow check only";

/// Expression fields every renderer is expected to expose
const CORE_EXPRESSION_FIELDS: &[&str] = &["visibleOn", "disabledOn"];

/// Fuzzy suggestions offered for unresolved names
const MAX_SUGGESTIONS: usize = 3;

/// Property count of a verified definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyCount {
    Exact(usize),
    /// Properties live in `allOf` branches and were not flattened
    Indeterminate,
}

impl PropertyCount {
    fn is_positive(&self) -> bool {
        matches!(self, PropertyCount::Exact(n) if *n > 0)
    }
}

impl Serialize for PropertyCount {
    // Reports encode the indeterminate case as -1
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropertyCount::Exact(n) => serializer.serialize_u64(*n as u64),
            PropertyCount::Indeterminate => serializer.serialize_i64(-1),
        }
    }
}

/// Verification outcome for one requested component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub component: String,
    pub resolved_definition: Option<String>,
    pub prop_count: PropertyCount,
    pub nested_refs: usize,
    pub enum_count: usize,
    pub event_count: usize,
    pub default_count: usize,
    pub expression_fields: usize,
    pub warnings: Vec<String>,
    pub completeness_score: u8,
    /// Close definition names, only for unresolved components
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl VerificationResult {
    fn unresolved(component: &str) -> Self {
        Self {
            component: component.to_string(),
            resolved_definition: None,
            prop_count: PropertyCount::Exact(0),
            nested_refs: 0,
            enum_count: 0,
            event_count: 0,
            default_count: 0,
            expression_fields: 0,
            warnings: Vec::new(),
            completeness_score: 0,
            suggestions: Vec::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_definition.is_some()
    }
}

/// Friendly component name -> candidate definition names, tried in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<(String, Vec<String>)>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AliasTable {
    pub fn builtin() -> Self {
        let entries: &[(&str, &[&str])] = &[
            ("Button", &["Action", "Button", "ActionSchema"]),
            ("Form", &["Form", "FormSchema"]),
            ("CRUD", &["CRUD", "CRUDSchema", "CRUDCommon"]),
            ("Dialog", &["Dialog", "DialogSchema", "DialogAction"]),
            ("Table", &["Table", "TableSchema"]),
        ];
        Self {
            entries: entries
                .iter()
                .map(|(name, candidates)| {
                    (name.to_string(), candidates.iter().map(|c| c.to_string()).collect())
                })
                .collect(),
        }
    }

    /// Built-in aliases with configured ones layered on top
    pub fn from_config(config: &VerifyConfig) -> Self {
        config.aliases.iter().fold(Self::builtin(), |table, alias| {
            table.with_alias(&alias.name, alias.candidates.clone())
        })
    }

    /// Add an alias, replacing any existing entry for `name`
    pub fn with_alias(mut self, name: &str, candidates: Vec<String>) -> Self {
        match self.entries.iter_mut().find(|(existing, _)| existing == name) {
            Some(entry) => entry.1 = candidates,
            None => self.entries.push((name.to_string(), candidates)),
        }
        self
    }

    pub fn candidates(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, candidates)| candidates.as_slice())
    }
}

/// Event handler properties look like `onClick`, `onEvent`, ...
pub fn is_event_property(name: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^on[A-Z]").expect("event property pattern is valid"))
        .is_match(name)
}

/// Verifies requested components against a document
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    aliases: AliasTable,
}

impl Verifier {
    pub fn new() -> Self {
        Self::with_aliases(AliasTable::builtin())
    }

    pub fn with_aliases(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    /// One result per requested name, in request order
    pub fn verify<S: AsRef<str>>(&self, document: &SchemaDocument, names: &[S]) -> Vec<VerificationResult> {
        let results: Vec<_> = names
            .iter()
            .map(|name| self.verify_one(document, name.as_ref()))
            .collect();
        info!(
            requested = results.len(),
            resolved = results.iter().filter(|r| r.is_resolved()).count(),
            "Targeted component verification complete"
        );
        results
    }

    /// Resolve a friendly name to a definition name.
    ///
    /// Alias candidates (or the name itself) are tried first, then a
    /// case-insensitive match on the name, then on `<name>Schema`. Ties go
    /// to the first definition in document order.
    ///
    /// The two case-insensitive passes are separate: with `PageSchema`
    /// listed before `Page`, the name `page` resolves to `Page`. A single
    /// scan accepting either form would pick `PageSchema`.
    pub fn resolve(&self, document: &SchemaDocument, name: &str) -> Option<String> {
        let defs = document.definitions()?;

        let alias_hit = match self.aliases.candidates(name) {
            Some(candidates) => candidates.iter().find(|c| defs.contains_key(c.as_str())).cloned(),
            None => defs.contains_key(name).then(|| name.to_string()),
        };
        if alias_hit.is_some() {
            return alias_hit;
        }

        let lower = name.to_lowercase();
        let suffixed = format!("{}schema", lower);
        defs.keys()
            .find(|key| key.to_lowercase() == lower)
            .or_else(|| defs.keys().find(|key| key.to_lowercase() == suffixed))
            .cloned()
    }

    fn verify_one(&self, document: &SchemaDocument, component: &str) -> VerificationResult {
        let mut result = VerificationResult::unresolved(component);

        let Some(resolved) = self.resolve(document, component) else {
            debug!(component, "definition not found");
            result.warnings.push(NOT_FOUND_WARNING.to_string());
            result.suggestions = suggest(document, component);
            return result;
        };

        let empty = Map::new();
        let def = document
            .definition(&resolved)
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        debug!(component, definition = %resolved, "resolved component");
        result.resolved_definition = Some(resolved);

        let resolver = ReferenceResolver::new(document.definitions());
        if let Some(props) = def.get("properties").and_then(Value::as_object) {
            check_properties(&mut result, props, &resolver);
        } else if is_present(def, "allOf") {
            result.warnings.push(SHALLOW_WARNING.to_string());
            if all_of_has_properties(def) {
                result.prop_count = PropertyCount::Indeterminate;
            }
        }

        result.completeness_score = score(&result, is_present(def, "allOf"));
        result
    }
}

fn check_properties(result: &mut VerificationResult, props: &Map<String, Value>, resolver: &ReferenceResolver<'_>) {
    result.prop_count = PropertyCount::Exact(props.len());

    for (key, prop) in props {
        let Some(prop) = prop.as_object() else {
            continue;
        };

        if let Some(reference) = nested_ref(prop) {
            result.nested_refs += 1;
            if let RefCheck::Broken { .. } = resolver.check(reference) {
                result.warnings.push(format!(
                    "Broken ref in prop '{}': {}",
                    key,
                    reference.as_str().unwrap_or_default()
                ));
            }
        }

        if is_present(prop, "enum") {
            result.enum_count += 1;
            if prop.get("enum").and_then(Value::as_array).map(Vec::is_empty).unwrap_or(false) {
                result.warnings.push(format!("Empty enum in prop '{}'", key));
            }
        }

        if prop.contains_key("default") {
            result.default_count += 1;
        }

        if is_event_property(key) {
            result.event_count += 1;
        }

        if CORE_EXPRESSION_FIELDS.contains(&key.as_str()) {
            result.expression_fields += 1;
            let hinted = prop
                .get("description")
                .and_then(Value::as_str)
                .map(|d| d.contains(EXPRESSION_MARKER))
                .unwrap_or(false);
            if !hinted {
                result.warnings.push(format!("Expression field '{}' missing hint", key));
            }
        }
    }

    for field in CORE_EXPRESSION_FIELDS {
        if !props.contains_key(*field) {
            result.warnings.push(format!("Missing {}", field));
        }
    }
}

/// `$ref` of a property, directly or through an array's `items`
fn nested_ref(prop: &Map<String, Value>) -> Option<&Value> {
    if is_present(prop, "$ref") {
        return prop.get("$ref");
    }
    prop.get("items")
        .and_then(Value::as_object)
        .filter(|items| is_present(items, "$ref"))
        .and_then(|items| items.get("$ref"))
}

/// 100, minus 50 for an empty non-composed definition, minus 10 for fewer
/// than two expression fields, minus 5 per warning; never below zero
fn score(result: &VerificationResult, has_all_of: bool) -> u8 {
    let mut score: i64 = 100;
    if result.prop_count == PropertyCount::Exact(0) && !has_all_of {
        score -= 50;
    }
    if result.expression_fields < 2 && result.prop_count.is_positive() {
        score -= 10;
    }
    score -= 5 * result.warnings.len() as i64;
    score.clamp(0, 100) as u8
}

/// Closest definition names by fuzzy match, best first
fn suggest(document: &SchemaDocument, component: &str) -> Vec<String> {
    let Some(defs) = document.definitions() else {
        return Vec::new();
    };
    let matcher = SkimMatcherV2::default().ignore_case();
    let mut scored: Vec<(i64, &String)> = defs
        .keys()
        .filter_map(|key| matcher.fuzzy_match(key, component).map(|s| (s, key)))
        .collect();
    // Stable sort keeps document order among equal scores
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, key)| key.clone())
        .collect()
}
