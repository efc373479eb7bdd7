//! Iterative tree walker
//!
//! Visits every object and array node of a JSON tree exactly once, in
//! pre-order: a node is yielded before its children, array elements in
//! index order, object entries in map order. Scalars are never yielded.
//!
//! The walker keeps its own work stack so that arbitrarily deep documents
//! never exhaust the call stack.

use serde_json::Value;

/// Start a fresh walk over `root`, labelling the root path with `label`
pub fn walk<'a>(root: &'a Value, label: &str) -> Walk<'a> {
    Walk {
        stack: vec![(root, label.to_string())],
    }
}

/// Lazy pre-order traversal; see [`walk`]
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<(&'a Value, String)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (&'a Value, String);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, path)) = self.stack.pop() {
            match node {
                Value::Object(map) => {
                    // Push in reverse so the first key is popped first
                    let children: Vec<_> = map
                        .iter()
                        .filter(|(_, child)| is_container(child))
                        .collect();
                    for (key, child) in children.into_iter().rev() {
                        self.stack.push((child, format!("{}.{}", path, key)));
                    }
                    return Some((node, path));
                }
                Value::Array(items) => {
                    for (i, child) in items.iter().enumerate().rev() {
                        if is_container(child) {
                            self.stack.push((child, format!("{}[{}]", path, i)));
                        }
                    }
                    return Some((node, path));
                }
                _ => continue,
            }
        }
        None
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}
