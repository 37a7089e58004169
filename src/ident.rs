//! Entity kinds, identifiers and the identifier normalizer.
//!
//! Every graph node is named `<Kind>_<fragment>`, where the fragment is a
//! sanitized form of the free-text name taken from the film table. The
//! identifier is a pure function of `(kind, raw name)`: it does not depend on
//! row position or on any other row.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Characters that never survive normalization.
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\s-]").expect("static regex is valid"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex is valid"));

/// The four kinds of entity the film graph knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Film,
    Actor,
    Director,
    Genre,
}

impl EntityKind {
    /// All kinds, in declaration order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Film,
        EntityKind::Actor,
        EntityKind::Director,
        EntityKind::Genre,
    ];

    /// Identifier prefix for this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            EntityKind::Film => "Film",
            EntityKind::Actor => "Actor",
            EntityKind::Director => "Director",
            EntityKind::Genre => "Genre",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Canonical identifier of a graph node: `<Kind>_<fragment>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    kind: EntityKind,
    fragment: String,
}

impl EntityId {
    /// Build an identifier from an already-normalized fragment.
    pub fn new(kind: EntityKind, fragment: impl Into<String>) -> Self {
        Self {
            kind,
            fragment: fragment.into(),
        }
    }

    /// The kind of entity this identifier names.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// The normalized fragment (without the kind prefix).
    pub fn fragment(&self) -> &str {
        &self.fragment
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.kind.prefix(), self.fragment)
    }
}

/// Normalize free text into an identifier fragment.
///
/// Removes every character outside `[A-Za-z0-9_\s-]`, trims the result and
/// collapses internal whitespace runs into a single `_`. Returns `None` when
/// nothing is left. Case is preserved, so `"Tom Hanks"` and `"tom hanks"`
/// yield different fragments.
pub fn normalize(raw: &str) -> Option<String> {
    let stripped = DISALLOWED.replace_all(raw, "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(WHITESPACE_RUN.replace_all(trimmed, "_").into_owned())
}

/// How free-text names are turned into identifier fragments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifierPolicy {
    /// Lowercase fragments so that differently-cased spellings share a node.
    /// Display-name literals keep their original casing either way.
    pub fold_case: bool,
}

impl IdentifierPolicy {
    /// Case-sensitive normalization (the default).
    pub const CASE_SENSITIVE: Self = Self { fold_case: false };

    /// Case-insensitive normalization.
    pub const FOLD_CASE: Self = Self { fold_case: true };

    /// Normalize `raw` under this policy.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let fragment = normalize(raw)?;
        if self.fold_case {
            Some(fragment.to_ascii_lowercase())
        } else {
            Some(fragment)
        }
    }

    /// Normalize `raw` and build the identifier for `kind`.
    pub fn identify(&self, kind: EntityKind, raw: &str) -> Option<EntityId> {
        self.normalize(raw).map(|fragment| EntityId::new(kind, fragment))
    }
}
