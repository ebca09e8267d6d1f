//! Reactive style store
//!
//! `StyleStore` owns the three documents and the override layer, keeps
//! the flat output projection current, and tells subscribers exactly
//! which variables changed after each settled resolution pass.
//!
//! The store is an explicitly owned context object: callers hold it and
//! pass it where it is needed. There is one writer; mutations are
//! synchronous and a pass always settles before the mutating call
//! returns. The only asynchrony is interaction-driven debouncing: a drag
//! gesture previews values through a per-variable pending slot and
//! commits once the gesture goes quiet (see [`StyleStore::preview_override`]
//! and [`StyleStore::tick`]).

use std::time::{Duration, Instant};

use prism_core::{Color, Value};
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value as Json;
use tracing::{debug, warn};

use crate::contrast::{select_on_tone, DEFAULT_ON_TONES};
use crate::document::{DocumentKind, DocumentSet};
use crate::elevation::{self, ElevationAxis, ElevationSpec, ELEVATION_LEVELS};
use crate::overrides::Overrides;
use crate::reference::Collection;
use crate::resolver::{ResolveError, Resolver};
use crate::variables::{variable_name_for, VariableSet};

/// Default quiescence window for coalescing mutation bursts.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(120);

/// Payload delivered to subscribers after each settled resolution pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThemeChange {
    pub changed_variable_names: Vec<String>,
}

/// Handle returned by [`StyleStore::subscribe`].
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct SubscriptionId(u64);

type SubscriberFn = Box<dyn Fn(&ThemeChange)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Resolving,
}

/// A debounced override waiting for its quiescence window to elapse.
struct PendingEdit {
    value: Value,
    deadline: Instant,
}

/// An optimistic value shown while its edit is still in flight. The
/// guard keeps authoritative notifications from reverting it within the
/// window.
struct PreviewSlot {
    value: Value,
    guard_until: Instant,
}

pub struct StyleStore {
    documents: DocumentSet,
    overrides: Overrides,
    variables: VariableSet,
    subscribers: Vec<(u64, SubscriberFn)>,
    next_subscription: u64,
    pending: FxHashMap<String, PendingEdit>,
    previews: FxHashMap<String, PreviewSlot>,
    /// Changed names withheld while their guard was active; delivered
    /// with the next pass after the guard clears.
    suppressed: FxHashSet<String>,
    debounce: Duration,
    phase: Phase,
}

impl StyleStore {
    /// Build the store and run the initial resolution pass. Subscribers
    /// attached afterwards only hear about changes, never the initial
    /// projection.
    pub fn new(documents: DocumentSet, overrides: Overrides) -> Self {
        let mut store = Self {
            documents,
            overrides,
            variables: VariableSet::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
            pending: FxHashMap::default(),
            previews: FxHashMap::default(),
            suppressed: FxHashSet::default(),
            debounce: DEFAULT_DEBOUNCE,
            phase: Phase::Idle,
        };
        store.variables = store.resolve_all();
        store
    }

    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }

    // ---- read contract ----

    pub fn documents(&self) -> &DocumentSet {
        &self.documents
    }

    /// The settled projection from the last resolution pass.
    pub fn variables(&self) -> &VariableSet {
        &self.variables
    }

    pub fn overrides(&self) -> &FxHashMap<String, Value> {
        self.overrides.all()
    }

    /// Resolve a single leaf against current documents and overrides.
    pub fn resolve(&self, collection: Collection, path: &[String]) -> Result<Value, ResolveError> {
        Resolver::new(&self.documents, &self.overrides).resolve(collection, path)
    }

    /// Resolve a token by identity, e.g. `size/md`.
    pub fn resolve_token(&self, token: &str) -> Result<Value, ResolveError> {
        Resolver::new(&self.documents, &self.overrides).resolve_token(token)
    }

    /// What a widget should display right now: the optimistic preview if
    /// one is in flight, otherwise the authoritative value.
    pub fn display_value(&self, name: &str) -> Option<Value> {
        self.previews
            .get(name)
            .map(|slot| slot.value.clone())
            .or_else(|| self.variables.get(name).cloned())
    }

    // ---- subscriptions ----

    pub fn subscribe(&mut self, callback: impl Fn(&ThemeChange) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&mut self, subscription: SubscriptionId) {
        self.subscribers.retain(|(id, _)| *id != subscription.0);
    }

    // ---- mutations ----

    /// Replace one source document wholesale and re-resolve everything.
    pub fn set_document(&mut self, kind: DocumentKind, next: Json) {
        self.documents.replace(kind, next);
        self.settle_at(Instant::now());
    }

    pub fn set_override(&mut self, token: &str, value: Value) {
        let _ = self.overrides.set(token, value);
        self.settle_at(Instant::now());
    }

    pub fn clear_override(&mut self, token: &str) {
        let _ = self.overrides.remove(token);
        self.settle_at(Instant::now());
    }

    /// Revert a batch of overrides in one pass.
    pub fn clear_overrides(&mut self, tokens: &[String]) {
        for token in tokens {
            let _ = self.overrides.remove(token);
        }
        self.settle_at(Instant::now());
    }

    /// Revert every override.
    pub fn clear_all_overrides(&mut self) {
        let _ = self.overrides.clear();
        self.settle_at(Instant::now());
    }

    /// Bulk-load a saved override set.
    pub fn replace_overrides(&mut self, entries: FxHashMap<String, Value>) {
        let _ = self.overrides.replace_all(entries);
        self.settle_at(Instant::now());
    }

    // ---- debounced edits ----

    /// Record an in-progress edit from a drag gesture: the token's output
    /// variable shows `value` through the preview channel immediately,
    /// and the override commits once no further preview arrives for the
    /// debounce window. Repeated calls for the same token overwrite the
    /// pending edit and push the deadline out.
    pub fn preview_override(&mut self, token: &str, value: Value, now: Instant) {
        let deadline = now + self.debounce;
        self.previews.insert(
            token_variable_name(token),
            PreviewSlot {
                value: value.clone(),
                guard_until: deadline,
            },
        );
        self.pending.insert(
            token.to_string(),
            PendingEdit { value, deadline },
        );
    }

    /// Commit every pending edit whose quiescence window has elapsed.
    /// Returns `true` while pending edits or live previews remain and
    /// the caller should keep ticking.
    pub fn tick(&mut self, now: Instant) -> bool {
        let due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, edit)| edit.deadline <= now)
            .map(|(token, _)| token.clone())
            .collect();

        if !due.is_empty() {
            for token in &due {
                if let Some(edit) = self.pending.remove(token) {
                    let _ = self.overrides.set(token.clone(), edit.value);
                }
                // The commit is authoritative now; clear the guard so the
                // settling pass reports this variable.
                let name = token_variable_name(token);
                self.previews.remove(&name);
                self.suppressed.remove(&name);
            }
            self.settle_at(now);
        }

        self.previews.retain(|_, slot| slot.guard_until > now);
        !self.pending.is_empty() || !self.previews.is_empty()
    }

    // ---- resolution ----

    /// Re-resolve every output variable, diff against the settled
    /// projection, and notify subscribers of the changed names. Names
    /// whose preview guard is still active are withheld and re-delivered
    /// once the guard clears.
    fn settle_at(&mut self, now: Instant) {
        debug_assert_eq!(self.phase, Phase::Idle);
        self.phase = Phase::Resolving;
        let next = self.resolve_all();
        let mut changed = self.variables.diff(&next);
        self.variables = next;
        self.phase = Phase::Idle;

        changed.retain(|name| {
            if self.guard_active(name, now) {
                self.suppressed.insert(name.clone());
                false
            } else {
                true
            }
        });

        let released: Vec<String> = self
            .suppressed
            .iter()
            .filter(|name| !self.guard_active(name, now))
            .cloned()
            .collect();
        for name in released {
            self.suppressed.remove(&name);
            if !changed.contains(&name) {
                changed.push(name);
            }
        }

        if changed.is_empty() {
            return;
        }
        debug!(count = changed.len(), "style variables changed");
        let change = ThemeChange {
            changed_variable_names: changed,
        };
        for (_, callback) in &self.subscribers {
            callback(&change);
        }
    }

    fn guard_active(&self, name: &str, now: Instant) -> bool {
        self.previews
            .get(name)
            .is_some_and(|slot| slot.guard_until > now)
    }

    fn resolve_all(&self) -> VariableSet {
        let resolver = Resolver::new(&self.documents, &self.overrides);
        let mut next = VariableSet::new();

        // Raw tokens.
        self.documents.for_each_leaf(DocumentKind::Tokens, |path, _| {
            let name = variable_name_for(DocumentKind::Tokens, path);
            match resolver.resolve(Collection::Tokens, path) {
                Ok(value) => next.insert(name, value),
                Err(err) => self.keep_previous(&mut next, name, &err),
            }
        });

        // Theme tree, minus elevation subtrees (composed below) and
        // on-tone candidate lists (selection inputs, not outputs).
        self.documents.for_each_leaf(DocumentKind::Brand, |path, _| {
            if path.iter().any(|segment| segment == "elevations") {
                return;
            }
            if path.last().is_some_and(|segment| segment == "on-tones") {
                return;
            }
            let name = variable_name_for(DocumentKind::Brand, path);
            let is_surface = path.last().is_some_and(|segment| segment == "surface");
            match resolver.resolve(Collection::Brand, path) {
                Ok(value) => {
                    if is_surface {
                        self.compose_on_tone(&resolver, &mut next, path, &value);
                    }
                    next.insert(name, value);
                }
                Err(err) => {
                    if is_surface {
                        // The derived on-tone rides along with its surface.
                        let tone_name =
                            variable_name_for(DocumentKind::Brand, &sibling(path, "on-surface"));
                        if let Some(previous) = self.variables.get(&tone_name) {
                            next.insert(tone_name, previous.clone());
                        }
                    }
                    self.keep_previous(&mut next, name, &err);
                }
            }
        });

        self.compose_elevations(&resolver, &mut next);

        // Component mapping: leaves point into brand or tokens; their
        // resolved values surface as component-scoped variables.
        self.documents
            .for_each_leaf(DocumentKind::Mapping, |path, leaf| {
                let name = variable_name_for(DocumentKind::Mapping, path);
                match resolver.resolve_raw(leaf.raw) {
                    Ok(value) => next.insert(name, value),
                    Err(err) => self.keep_previous(&mut next, name, &err),
                }
            });

        next
    }

    /// A failed leaf keeps its last known-good value; the failure stays
    /// local to this one output path.
    fn keep_previous(&self, next: &mut VariableSet, name: String, err: &ResolveError) {
        warn!(variable = %name, error = %err, "resolution failed; keeping last known value");
        if let Some(previous) = self.variables.get(&name) {
            next.insert(name, previous.clone());
        }
    }

    /// Emit the text/icon color companion for a resolved surface color.
    fn compose_on_tone(
        &self,
        resolver: &Resolver<'_>,
        next: &mut VariableSet,
        surface_path: &[String],
        surface_value: &Value,
    ) {
        let Some(surface) = surface_value.as_color() else {
            return;
        };
        let name = variable_name_for(DocumentKind::Brand, &sibling(surface_path, "on-surface"));
        let candidates = self.on_tone_candidates(resolver, &sibling(surface_path, "on-tones"));
        let tone = select_on_tone(surface, &candidates);
        next.insert(name, Value::Text(tone.to_css_string()));
    }

    /// Layer-specific on-tone alternates, if the document provides them.
    fn on_tone_candidates(&self, resolver: &Resolver<'_>, path: &[String]) -> Vec<Color> {
        let listed = self
            .documents
            .lookup(Collection::Brand, path)
            .and_then(|leaf| leaf.raw.as_array().cloned());
        let Some(entries) = listed else {
            return DEFAULT_ON_TONES.to_vec();
        };
        let colors: Vec<Color> = entries
            .iter()
            .filter_map(|entry| resolver.resolve_raw(entry).ok())
            .filter_map(|value| value.as_color())
            .collect();
        if colors.is_empty() {
            DEFAULT_ON_TONES.to_vec()
        } else {
            colors
        }
    }

    fn compose_elevations(&self, resolver: &Resolver<'_>, next: &mut VariableSet) {
        let mut groups = Vec::new();
        collect_elevation_groups(
            self.documents.document(DocumentKind::Brand),
            &mut Vec::new(),
            &mut groups,
        );

        for (group_path, levels) in groups {
            let mut specs: Vec<(usize, String, ElevationSpec)> = Vec::new();
            for (key, node) in &levels {
                let Some(level) = parse_level_key(key) else {
                    warn!(key = %key, "ignoring unrecognized elevation level key");
                    continue;
                };
                match serde_json::from_value::<ElevationSpec>(node.clone()) {
                    Ok(spec) => specs.push((level, key.clone(), spec)),
                    Err(err) => warn!(key = %key, "malformed elevation spec: {err}"),
                }
            }
            specs.sort_by_key(|(level, _, _)| *level);
            let base = specs
                .iter()
                .find(|(level, _, _)| *level == 0)
                .map(|(_, _, spec)| spec.clone());

            for (level, key, spec) in &specs {
                let base_spec = base.as_ref().unwrap_or(spec);
                for axis in ElevationAxis::ALL {
                    let name = level_variable(&group_path, key, axis.suffix());
                    match elevation::resolve_axis(resolver, base_spec, spec, *level, axis) {
                        Ok(value) => next.insert(name, value),
                        Err(err) => self.keep_previous(next, name, &err),
                    }
                }
                let name = level_variable(&group_path, key, "shadow-color");
                match elevation::shadow_color(resolver, spec) {
                    Ok(value) => next.insert(name, value),
                    Err(err) => self.keep_previous(next, name, &err),
                }
            }
        }
    }
}

/// The path next to `path`'s leaf with the final segment replaced.
fn sibling(path: &[String], last: &str) -> Vec<String> {
    let mut out = path.to_vec();
    if let Some(tail) = out.last_mut() {
        *tail = last.to_string();
    }
    out
}

/// Output-variable name for a token identity such as `size/md`.
fn token_variable_name(token: &str) -> String {
    let path: Vec<String> = token.split('/').map(str::to_string).collect();
    variable_name_for(DocumentKind::Tokens, &path)
}

fn level_variable(group_path: &[String], level_key: &str, suffix: &str) -> String {
    let mut path = group_path.to_vec();
    path.push(level_key.to_string());
    path.push(suffix.to_string());
    variable_name_for(DocumentKind::Brand, &path)
}

fn parse_level_key(key: &str) -> Option<usize> {
    let level: usize = key.strip_prefix("level-")?.parse().ok()?;
    (level < ELEVATION_LEVELS).then_some(level)
}

/// Collect every `elevations` subtree of the brand document along with
/// its path, without descending into the subtrees themselves.
fn collect_elevation_groups(
    node: &Json,
    path: &mut Vec<String>,
    out: &mut Vec<(Vec<String>, serde_json::Map<String, Json>)>,
) {
    let Some(object) = node.as_object() else {
        return;
    };
    for (key, child) in object {
        if key == "elevations" {
            if let Some(levels) = child.as_object() {
                let mut group_path = path.clone();
                group_path.push(key.clone());
                out.push((group_path, levels.clone()));
            }
            continue;
        }
        path.push(key.clone());
        collect_elevation_groups(child, path, out);
        path.pop();
    }
}
