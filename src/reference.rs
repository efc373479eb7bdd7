//! Reference resolution against the `definitions` table
//!
//! Only internal references of the form `#/definitions/<Name>` are checked.
//! Anything else (absolute URLs, external files, JSON pointers into other
//! sections) is not applicable and never reported as broken.

use serde_json::{Map, Value};

/// Prefix of an internal definition reference
pub const REF_PREFIX: &str = "#/definitions/";

/// Outcome of checking one `$ref` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefCheck<'a> {
    /// Not a string, or not an internal reference
    NotApplicable,
    Valid { target: &'a str },
    Broken { target: &'a str },
}

impl<'a> RefCheck<'a> {
    pub fn is_broken(&self) -> bool {
        matches!(self, RefCheck::Broken { .. })
    }

    /// Target definition name for internal references
    pub fn target(&self) -> Option<&'a str> {
        match self {
            RefCheck::NotApplicable => None,
            RefCheck::Valid { target } | RefCheck::Broken { target } => Some(target),
        }
    }
}

/// Name of the definition an internal reference points at
pub fn internal_target(reference: &str) -> Option<&str> {
    reference.strip_prefix(REF_PREFIX)
}

/// Resolves references against one document's definition table
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'d> {
    definitions: Option<&'d Map<String, Value>>,
}

impl<'d> ReferenceResolver<'d> {
    /// A missing table behaves like an empty one: every internal ref is broken
    pub fn new(definitions: Option<&'d Map<String, Value>>) -> Self {
        Self { definitions }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.map(|d| d.contains_key(name)).unwrap_or(false)
    }

    pub fn check<'v>(&self, value: &'v Value) -> RefCheck<'v> {
        let Some(reference) = value.as_str() else {
            return RefCheck::NotApplicable;
        };
        match internal_target(reference) {
            None => RefCheck::NotApplicable,
            Some(target) if self.contains(target) => RefCheck::Valid { target },
            Some(target) => RefCheck::Broken { target },
        }
    }
}

/// Naming heuristic for definitions that model an event or action payload.
///
/// Matches names ending in `Event` or containing `Action`. This is a guess
/// from the name alone; nothing in the schema structure backs it.
pub fn is_event_shaped(name: &str) -> bool {
    name.ends_with("Event") || name.contains("Action")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defs() -> Value {
        json!({"Present": {"type": "object"}})
    }

    #[test]
    fn test_internal_references() {
        let defs = defs();
        let resolver = ReferenceResolver::new(defs.as_object());
        assert_eq!(
            resolver.check(&json!("#/definitions/Present")),
            RefCheck::Valid { target: "Present" }
        );
        let missing = json!("#/definitions/Missing");
        let check = resolver.check(&missing);
        assert!(check.is_broken());
        assert_eq!(check.target(), Some("Missing"));
    }

    #[test]
    fn test_external_references_are_ignored() {
        let defs = defs();
        let resolver = ReferenceResolver::new(defs.as_object());
        for value in [
            json!("https://example.com/schema.json#/definitions/Missing"),
            json!("other.json#/definitions/Missing"),
            json!("#/properties/foo"),
            json!(42),
            json!({"$ref": "#/definitions/Missing"}),
        ] {
            assert_eq!(resolver.check(&value), RefCheck::NotApplicable, "{}", value);
        }
    }

    #[test]
    fn test_missing_table_breaks_internal_refs() {
        let resolver = ReferenceResolver::new(None);
        assert!(resolver.check(&json!("#/definitions/Anything")).is_broken());
    }

    #[test]
    fn test_event_heuristic() {
        assert!(is_event_shaped("ClickEvent"));
        assert!(is_event_shaped("ActionSchema"));
        assert!(is_event_shaped("DialogAction"));
        assert!(!is_event_shaped("Eventful"));
        assert!(!is_event_shaped("Form"));
    }
}
