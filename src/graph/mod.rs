//! Film graph: the abstract triple set produced by population.
//!
//! A [`Triple`] links an entity subject to either another entity, a class
//! (for `type` triples) or a typed literal. The [`FilmGraph`] stores the set
//! of triples and indexes relationship edges for traversal.
//!
//! Predicate names here are conceptual; the wire names used in serialized RDF
//! are declared by the [`Schema`](crate::schema::Schema).

pub mod index;

pub use index::FilmGraph;

use serde::{Deserialize, Serialize};

use crate::ident::{EntityId, EntityKind};

/// Every predicate the population engine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Predicate {
    /// Entity → class.
    Type,
    /// Film → title string.
    Title,
    /// Actor/Director/Genre → name string.
    Name,
    /// Film → release year integer.
    ReleaseYear,
    /// Film → duration in minutes.
    Duration,
    /// Film → Actor.
    HasActor,
    /// Film → Director.
    DirectedBy,
    /// Film → Genre.
    HasGenre,
}

impl Predicate {
    pub const ALL: [Predicate; 8] = [
        Predicate::Type,
        Predicate::Title,
        Predicate::Name,
        Predicate::ReleaseYear,
        Predicate::Duration,
        Predicate::HasActor,
        Predicate::DirectedBy,
        Predicate::HasGenre,
    ];

    /// Conceptual name of the predicate.
    pub fn name(self) -> &'static str {
        match self {
            Predicate::Type => "type",
            Predicate::Title => "titre",
            Predicate::Name => "nom",
            Predicate::ReleaseYear => "releaseYear",
            Predicate::Duration => "duration",
            Predicate::HasActor => "hasActor",
            Predicate::DirectedBy => "directedBy",
            Predicate::HasGenre => "hasGenre",
        }
    }

    /// Whether this predicate links two entities.
    pub fn is_relation(self) -> bool {
        matches!(
            self,
            Predicate::HasActor | Predicate::DirectedBy | Predicate::HasGenre
        )
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Datatype of a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralType {
    String,
    Integer,
}

impl std::fmt::Display for LiteralType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LiteralType::String => f.write_str("string"),
            LiteralType::Integer => f.write_str("integer"),
        }
    }
}

/// A typed literal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Literal {
    String(String),
    Integer(i64),
}

impl Literal {
    pub fn datatype(&self) -> LiteralType {
        match self {
            Literal::String(_) => LiteralType::String,
            Literal::Integer(_) => LiteralType::Integer,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            Literal::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Literal::Integer(n) => Some(*n),
            Literal::String(_) => None,
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::String(s) => write!(f, "{s:?}"),
            Literal::Integer(n) => write!(f, "{n}"),
        }
    }
}

/// Object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Entity(EntityId),
    Class(EntityKind),
    Literal(Literal),
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Entity(id) => write!(f, "{id}"),
            Term::Class(kind) => write!(f, "{kind}"),
            Term::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

/// A (subject, predicate, object) fact in the film graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    pub subject: EntityId,
    pub predicate: Predicate,
    pub object: Term,
}

impl Triple {
    /// `subject type kind` for the subject's own kind.
    pub fn type_of(subject: EntityId) -> Self {
        let kind = subject.kind();
        Self {
            subject,
            predicate: Predicate::Type,
            object: Term::Class(kind),
        }
    }

    /// Entity → entity edge.
    pub fn relation(subject: EntityId, predicate: Predicate, object: EntityId) -> Self {
        Self {
            subject,
            predicate,
            object: Term::Entity(object),
        }
    }

    /// Entity → string literal.
    pub fn string(subject: EntityId, predicate: Predicate, value: impl Into<String>) -> Self {
        Self {
            subject,
            predicate,
            object: Term::Literal(Literal::String(value.into())),
        }
    }

    /// Entity → integer literal.
    pub fn integer(subject: EntityId, predicate: Predicate, value: i64) -> Self {
        Self {
            subject,
            predicate,
            object: Term::Literal(Literal::Integer(value)),
        }
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.predicate, self.object)
    }
}
