//! Document index over the three source documents
//!
//! The engine reads three JSON trees: raw tokens, the brand/theme tree,
//! and the component-mapping tree. This module flattens them behind one
//! lookup: `lookup(collection, path)` descends to a leaf and returns its
//! declared type and raw value.
//!
//! Brand documents exist in more than one historical root shape (the
//! current `themes.<mode>.layers…` nesting, and an older export that
//! roots at the mode with a singular `layer`). Lookups try an ordered
//! list of shape candidates so no caller ever needs to know which shape
//! a loaded document uses.

use serde_json::Value as Json;

use crate::reference::Collection;

/// Which of the three source documents an operation targets.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum DocumentKind {
    Tokens,
    Brand,
    Mapping,
}

/// A leaf addressed by [`DocumentSet::lookup`]: its declared type (when
/// the document wraps values in `{ type, value }` nodes) and the raw
/// value, which may be a literal or a reference string.
#[derive(Clone, Copy, Debug)]
pub struct Leaf<'doc> {
    pub kind: Option<&'doc str>,
    pub raw: &'doc Json,
}

/// Owner of the three source documents.
#[derive(Clone, Debug)]
pub struct DocumentSet {
    tokens: Json,
    brand: Json,
    mapping: Json,
}

/// One root-shape candidate: rewrites a requested path into the path to
/// try against the stored brand document, or `None` when the shape does
/// not apply to this path.
type ShapeProbe = fn(&[String]) -> Option<Vec<String>>;

/// Ordered shape candidates for historical brand documents. Order
/// matters: the current shape is tried first.
const BRAND_SHAPE_PROBES: &[ShapeProbe] = &[shape_current, shape_mode_rooted, shape_legacy_singular];

fn shape_current(path: &[String]) -> Option<Vec<String>> {
    Some(path.to_vec())
}

/// Older exports root the tree at the mode, without the `themes` wrapper.
fn shape_mode_rooted(path: &[String]) -> Option<Vec<String>> {
    let (head, rest) = path.split_first()?;
    (head == "themes").then(|| rest.to_vec())
}

/// Oldest exports additionally nest a singular `layer`.
fn shape_legacy_singular(path: &[String]) -> Option<Vec<String>> {
    let (head, rest) = path.split_first()?;
    (head == "themes").then(|| {
        rest.iter()
            .map(|segment| {
                if segment == "layers" {
                    "layer".to_string()
                } else {
                    segment.clone()
                }
            })
            .collect()
    })
}

impl DocumentSet {
    pub fn new(tokens: Json, brand: Json, mapping: Json) -> Self {
        Self {
            tokens,
            brand,
            mapping,
        }
    }

    pub fn document(&self, kind: DocumentKind) -> &Json {
        match kind {
            DocumentKind::Tokens => &self.tokens,
            DocumentKind::Brand => &self.brand,
            DocumentKind::Mapping => &self.mapping,
        }
    }

    /// Replace one document wholesale.
    pub fn replace(&mut self, kind: DocumentKind, next: Json) {
        match kind {
            DocumentKind::Tokens => self.tokens = next,
            DocumentKind::Brand => self.brand = next,
            DocumentKind::Mapping => self.mapping = next,
        }
    }

    /// Descend to the leaf a reference addresses. O(depth) pointer
    /// descent per shape candidate; no caching at this layer.
    pub fn lookup(&self, collection: Collection, path: &[String]) -> Option<Leaf<'_>> {
        match collection {
            Collection::Tokens => descend(&self.tokens, path.iter().map(String::as_str)),
            Collection::Brand => self.lookup_brand(path),
        }
    }

    fn lookup_brand(&self, path: &[String]) -> Option<Leaf<'_>> {
        for probe in BRAND_SHAPE_PROBES {
            if let Some(candidate) = probe(path) {
                if let Some(leaf) = descend(&self.brand, candidate.iter().map(String::as_str)) {
                    return Some(leaf);
                }
            }
        }
        None
    }

    /// Visit every leaf of one document in its stored shape, depth-first.
    /// `serde_json` maps iterate in sorted key order, so the walk (and
    /// therefore variable emission) is deterministic.
    pub fn for_each_leaf<F>(&self, kind: DocumentKind, mut visit: F)
    where
        F: FnMut(&[String], Leaf<'_>),
    {
        let mut path = Vec::new();
        walk(self.document(kind), &mut path, &mut visit);
    }
}

fn walk<'doc, F>(node: &'doc Json, path: &mut Vec<String>, visit: &mut F)
where
    F: FnMut(&[String], Leaf<'doc>),
{
    if let Some(object) = node.as_object() {
        if object.contains_key("value") {
            visit(path, leaf_of(node));
            return;
        }
        for (key, child) in object {
            path.push(key.clone());
            walk(child, path, visit);
            path.pop();
        }
        return;
    }
    if !path.is_empty() {
        visit(path, leaf_of(node));
    }
}

fn descend<'doc, 'seg>(
    root: &'doc Json,
    segments: impl Iterator<Item = &'seg str>,
) -> Option<Leaf<'doc>> {
    let mut node = root;
    for segment in segments {
        node = node.as_object()?.get(segment)?;
    }
    Some(leaf_of(node))
}

fn leaf_of(node: &Json) -> Leaf<'_> {
    if let Some(object) = node.as_object() {
        if let Some(value) = object.get("value") {
            return Leaf {
                kind: object.get("type").and_then(Json::as_str),
                raw: value,
            };
        }
    }
    Leaf { kind: None, raw: node }
}
