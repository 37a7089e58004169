//! Entity registry: which nodes have already been materialized.
//!
//! The [`EntityRegistry`] is owned by a single population run. It decides
//! whether an entity's `type` and name triples still need to be emitted, so
//! that repeated mentions of the same normalized name share one node.

use std::collections::HashMap;

use crate::ident::{EntityId, EntityKind};

/// Per-kind set of materialized fragments, with the display name recorded at
/// first creation.
#[derive(Default)]
pub struct EntityRegistry {
    seen: HashMap<EntityKind, HashMap<String, String>>,
}

impl EntityRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `(kind, fragment)` to its identifier.
    ///
    /// Returns `true` alongside the identifier on the first call for a given
    /// pair; the caller then emits the node triples. Later calls return
    /// `false`. The display name of later calls is ignored.
    pub fn ensure(&mut self, kind: EntityKind, fragment: &str, display_name: &str) -> (EntityId, bool) {
        let by_fragment = self.seen.entry(kind).or_default();
        let is_new = if by_fragment.contains_key(fragment) {
            false
        } else {
            by_fragment.insert(fragment.to_string(), display_name.to_string());
            true
        };
        (EntityId::new(kind, fragment), is_new)
    }

    /// Whether `(kind, fragment)` has been materialized.
    pub fn contains(&self, kind: EntityKind, fragment: &str) -> bool {
        self.seen
            .get(&kind)
            .is_some_and(|by_fragment| by_fragment.contains_key(fragment))
    }

    /// Display name recorded when `id` was first materialized.
    pub fn display_name(&self, id: &EntityId) -> Option<&str> {
        self.seen
            .get(&id.kind())?
            .get(id.fragment())
            .map(String::as_str)
    }

    /// Number of materialized entities of `kind`.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.seen.get(&kind).map_or(0, HashMap::len)
    }

    /// Total number of materialized entities.
    pub fn len(&self) -> usize {
        self.seen.values().map(HashMap::len).sum()
    }

    /// Whether nothing has been materialized yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("films", &self.count(EntityKind::Film))
            .field("actors", &self.count(EntityKind::Actor))
            .field("directors", &self.count(EntityKind::Director))
            .field("genres", &self.count(EntityKind::Genre))
            .finish()
    }
}
