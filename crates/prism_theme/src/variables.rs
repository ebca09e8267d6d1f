//! Output variable naming and the flat projection
//!
//! Every resolved leaf is published under a deterministic kebab-cased
//! identifier in one flat namespace. The name is a pure function of the
//! originating document and path; a collision between two distinct paths
//! is a document-authoring error and is logged, never silently resolved.

use std::fmt::Write as _;

use indexmap::IndexMap;
use prism_core::Value;
use tracing::warn;

use crate::document::DocumentKind;

/// Derive the style-scope identifier for a resolved leaf.
pub fn variable_name_for(kind: DocumentKind, path: &[String]) -> String {
    let mut name = String::from(prefix(kind));
    for segment in path {
        name.push('-');
        push_kebab(&mut name, segment);
    }
    name
}

fn prefix(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Tokens => "token",
        DocumentKind::Brand => "brand",
        DocumentKind::Mapping => "component",
    }
}

/// Lowercase the segment and collapse every non-alphanumeric run into a
/// single dash.
fn push_kebab(out: &mut String, segment: &str) {
    let mut pending_dash = false;
    for c in segment.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash {
                out.push('-');
                pending_dash = false;
            }
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = !out.ends_with('-');
        }
    }
}

/// The flat projection of every currently-defined output path.
/// Insertion order is the document walk order, so emission is
/// deterministic across passes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariableSet {
    vars: IndexMap<String, Value>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, value: Value) {
        if self.vars.contains_key(&name) {
            warn!(variable = %name, "two document paths emit the same output variable");
        }
        self.vars.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Names whose value differs between `self` and `next`, including
    /// variables that were added or removed.
    pub fn diff(&self, next: &VariableSet) -> Vec<String> {
        let mut changed = Vec::new();
        for (name, value) in &next.vars {
            if self.vars.get(name) != Some(value) {
                changed.push(name.clone());
            }
        }
        for name in self.vars.keys() {
            if !next.vars.contains_key(name) {
                changed.push(name.clone());
            }
        }
        changed
    }

    /// Render the projection as CSS custom property declarations.
    pub fn css_declarations(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.vars {
            let _ = writeln!(out, "--{name}: {value};");
        }
        out
    }
}
