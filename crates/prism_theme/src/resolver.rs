//! Leaf resolution
//!
//! Resolving a leaf follows its reference chain until a literal
//! terminates it, consulting the override layer at token identities.
//! Resolution is a pure function of the document set and override map it
//! is constructed over: it never mutates either, and identical inputs
//! always produce identical outputs.
//!
//! Cycles are detected with a visiting set keyed by
//! `collection:dotted.path`; a hard depth cap backs that up against
//! pathological documents.

use std::collections::HashSet;

use prism_core::Value;
use serde_json::Value as Json;
use thiserror::Error;
use tracing::trace;

use crate::document::DocumentSet;
use crate::overrides::Overrides;
use crate::reference::{parse_reference, Collection};

/// Hard cap on reference-chain length.
pub const MAX_RESOLVE_DEPTH: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The chain points at nothing, or terminates in a non-scalar.
    /// Recoverable: callers treat the leaf as unset.
    #[error("nothing resolvable at `{0}`")]
    UnresolvedPath(String),

    /// The chain re-entered a node it is still resolving. Fatal for this
    /// branch; the document is malformed and no safe value exists.
    #[error("reference cycle through `{0}`")]
    CyclicReference(String),

    /// Secondary guard against runaway chains the cycle check cannot
    /// catch (e.g. generated documents with thousands of hops).
    #[error("reference chain exceeds {MAX_RESOLVE_DEPTH} hops at `{0}`")]
    TooDeep(String),
}

/// Pure resolver over a snapshot of documents and overrides.
pub struct Resolver<'a> {
    documents: &'a DocumentSet,
    overrides: &'a Overrides,
}

impl<'a> Resolver<'a> {
    pub fn new(documents: &'a DocumentSet, overrides: &'a Overrides) -> Self {
        Self {
            documents,
            overrides,
        }
    }

    /// Resolve the leaf at `collection.path` to its terminal literal.
    pub fn resolve(&self, collection: Collection, path: &[String]) -> Result<Value, ResolveError> {
        let mut visiting = HashSet::new();
        self.resolve_at(collection, path, &mut visiting, 0)
    }

    /// Resolve a token by its identity string, e.g. `size/md`.
    pub fn resolve_token(&self, token: &str) -> Result<Value, ResolveError> {
        let path: Vec<String> = token.split('/').map(str::to_string).collect();
        self.resolve(Collection::Tokens, &path)
    }

    /// Resolve a raw leaf value that is not itself addressable by a
    /// collection path (theme and mapping leaves enumerated by the
    /// store). A reference string recurses; anything else is a literal.
    pub fn resolve_raw(&self, raw: &Json) -> Result<Value, ResolveError> {
        if let Some(reference) = raw.as_str().and_then(parse_reference) {
            let mut visiting = HashSet::new();
            return self.resolve_at(reference.collection, &reference.path, &mut visiting, 1);
        }
        literal_value(raw).ok_or_else(|| ResolveError::UnresolvedPath(raw.to_string()))
    }

    fn resolve_at(
        &self,
        collection: Collection,
        path: &[String],
        visiting: &mut HashSet<String>,
        depth: usize,
    ) -> Result<Value, ResolveError> {
        let dotted = path.join(".");
        if depth >= MAX_RESOLVE_DEPTH {
            return Err(ResolveError::TooDeep(format!("{collection}.{dotted}")));
        }

        let leaf = self
            .documents
            .lookup(collection, path)
            .ok_or_else(|| ResolveError::UnresolvedPath(format!("{collection}.{dotted}")))?;

        if let Some(reference) = leaf.raw.as_str().and_then(parse_reference) {
            let key = format!("{collection}:{dotted}");
            if !visiting.insert(key.clone()) {
                return Err(ResolveError::CyclicReference(key));
            }
            trace!(from = %key, to = %reference.path.join("."), "following reference");
            return self.resolve_at(reference.collection, &reference.path, visiting, depth + 1);
        }

        // Literal. Overrides apply here, at the token identity the chain
        // ultimately landed on; referencing leaves are never overridden.
        if collection == Collection::Tokens {
            let token = path.join("/");
            if let Some(value) = self.overrides.get(&token) {
                return Ok(value.clone());
            }
        }

        literal_value(leaf.raw)
            .ok_or_else(|| ResolveError::UnresolvedPath(format!("{collection}.{dotted}")))
    }
}

/// Scalar JSON leaves become values; null, booleans, arrays and objects
/// do not terminate a resolution.
pub(crate) fn literal_value(raw: &Json) -> Option<Value> {
    match raw {
        Json::Number(n) => n.as_f64().map(Value::Number),
        Json::String(s) => Some(Value::Text(s.clone())),
        _ => None,
    }
}
