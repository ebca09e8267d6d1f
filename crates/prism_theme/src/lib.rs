//! Prism Theme Engine
//!
//! Token resolution and live style-variable synthesis: three layered JSON
//! documents (raw tokens, a brand/theme tree, a component mapping) plus a
//! persisted override map project into one flat, internally consistent
//! set of style variables.
//!
//! # Overview
//!
//! The engine provides:
//! - **Reference resolution**: leaves point at other leaves with
//!   `{tokens.size.md}`-style references; chains terminate in literals,
//!   with cycle and depth detection
//! - **Override precedence**: user edits outrank document literals at
//!   token identities and persist across sessions
//! - **Derived outputs**: elevation composition and accessibility
//!   on-tone selection, recomputed when their inputs change
//! - **Minimal change propagation**: subscribers receive the exact set
//!   of output variables a mutation changed
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use prism_theme::{DocumentSet, JsonFileStore, Overrides, StyleStore};
//! use prism_core::Value;
//!
//! let documents = DocumentSet::new(tokens, brand, mapping);
//! let overrides = Overrides::with_backend(Box::new(JsonFileStore::new(config_dir)));
//! let mut store = StyleStore::new(documents, overrides);
//!
//! let subscription = store.subscribe(|change| {
//!     apply_to_style_scope(&change.changed_variable_names);
//! });
//!
//! store.set_override("size/md", Value::Number(24.0));
//! ```
//!
//! # Architecture
//!
//! Resolution is a pure function of (documents, overrides): the
//! [`Resolver`] never mutates its inputs, and the [`StyleStore`]
//! re-derives the full projection on every mutation, diffing against the
//! previous pass so consumers only hear about what actually changed. A
//! failed leaf keeps its last known-good value; failures never cross
//! output paths.
//!
//! Drag gestures go through the preview channel
//! ([`StyleStore::preview_override`]): the in-progress value is visible
//! immediately, and the authoritative override commits after a short
//! quiescence window ([`StyleStore::tick`]).

pub mod contrast;
pub mod document;
pub mod elevation;
pub mod overrides;
pub mod persist;
pub mod reference;
pub mod resolver;
pub mod store;
pub mod variables;

// Re-export commonly used types
pub use contrast::{select_on_tone, DEFAULT_ON_TONES};
pub use document::{DocumentKind, DocumentSet, Leaf};
pub use elevation::{AxisSpec, ElevationAxis, ElevationSpec, ELEVATION_LEVELS, SIZE_SCALE};
pub use overrides::{OverrideChange, Overrides};
pub use persist::{JsonFileStore, MemoryStore, OverrideStore, PersistError, OVERRIDE_STORAGE_KEY};
pub use reference::{
    parse_reference, parse_reference_strict, Collection, Reference, ReferenceSyntaxError,
};
pub use resolver::{ResolveError, Resolver, MAX_RESOLVE_DEPTH};
pub use store::{StyleStore, SubscriptionId, ThemeChange, DEFAULT_DEBOUNCE};
pub use variables::{variable_name_for, VariableSet};
