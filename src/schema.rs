//! The film ontology: a constant schema descriptor.
//!
//! Declares the four entity classes, the three object properties linking a
//! film to its cast, director and genres, and the four datatype properties.
//! Each declaration carries the wire local name and French label used when
//! the ontology is serialized.
//!
//! The population engine reads the schema to find which property names an
//! entity and which property links a film to a related entity. It does not
//! validate at runtime; [`Schema::check_graph`] does that separately.

use crate::error::SchemaError;
use crate::graph::{FilmGraph, LiteralType, Predicate, Term, Triple};
use crate::ident::EntityKind;

/// Default namespace of the film ontology.
pub const FILM_NS: &str = "http://example.org/film#";

/// Result type for schema checks.
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// An entity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassDecl {
    pub kind: EntityKind,
    pub local_name: &'static str,
    pub label: &'static str,
    pub comment: &'static str,
}

/// A property linking two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectPropertyDecl {
    pub predicate: Predicate,
    pub local_name: &'static str,
    pub label: &'static str,
    pub domain: EntityKind,
    pub range: EntityKind,
}

/// A property linking an entity to a literal.
///
/// `domains` lists every class the property applies to; a property shared by
/// several classes (such as `nom`) is serialized without `rdfs:domain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatatypePropertyDecl {
    pub predicate: Predicate,
    pub local_name: &'static str,
    pub label: &'static str,
    pub domains: &'static [EntityKind],
    pub range: LiteralType,
}

/// Immutable description of the graph's intended shape.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub classes: &'static [ClassDecl],
    pub object_properties: &'static [ObjectPropertyDecl],
    pub datatype_properties: &'static [DatatypePropertyDecl],
}

/// The film ontology.
pub static FILM_SCHEMA: Schema = Schema {
    classes: &[
        ClassDecl {
            kind: EntityKind::Film,
            local_name: "Film",
            label: "Film",
            comment: "Un film cinématographique",
        },
        ClassDecl {
            kind: EntityKind::Actor,
            local_name: "Acteur",
            label: "Acteur",
            comment: "Une personne jouant dans un film",
        },
        ClassDecl {
            kind: EntityKind::Director,
            local_name: "Realisateur",
            label: "Réalisateur",
            comment: "La personne qui réalise un film",
        },
        ClassDecl {
            kind: EntityKind::Genre,
            local_name: "Genre",
            label: "Genre",
            comment: "Le genre cinématographique d'un film",
        },
    ],
    object_properties: &[
        ObjectPropertyDecl {
            predicate: Predicate::HasActor,
            local_name: "hasActor",
            label: "a pour acteur",
            domain: EntityKind::Film,
            range: EntityKind::Actor,
        },
        ObjectPropertyDecl {
            predicate: Predicate::DirectedBy,
            local_name: "directedBy",
            label: "réalisé par",
            domain: EntityKind::Film,
            range: EntityKind::Director,
        },
        ObjectPropertyDecl {
            predicate: Predicate::HasGenre,
            local_name: "hasGenre",
            label: "a pour genre",
            domain: EntityKind::Film,
            range: EntityKind::Genre,
        },
    ],
    datatype_properties: &[
        DatatypePropertyDecl {
            predicate: Predicate::Title,
            local_name: "titre",
            label: "titre",
            domains: &[EntityKind::Film],
            range: LiteralType::String,
        },
        DatatypePropertyDecl {
            predicate: Predicate::Name,
            local_name: "nom",
            label: "nom",
            domains: &[EntityKind::Actor, EntityKind::Director, EntityKind::Genre],
            range: LiteralType::String,
        },
        DatatypePropertyDecl {
            predicate: Predicate::ReleaseYear,
            local_name: "releaseYear",
            label: "année de sortie",
            domains: &[EntityKind::Film],
            range: LiteralType::Integer,
        },
        DatatypePropertyDecl {
            predicate: Predicate::Duration,
            local_name: "duration",
            label: "durée en minutes",
            domains: &[EntityKind::Film],
            range: LiteralType::Integer,
        },
    ],
};

impl Schema {
    /// The film ontology.
    pub fn film() -> &'static Schema {
        &FILM_SCHEMA
    }

    pub fn class(&self, kind: EntityKind) -> Option<&ClassDecl> {
        self.classes.iter().find(|c| c.kind == kind)
    }

    pub fn object_property(&self, predicate: Predicate) -> Option<&ObjectPropertyDecl> {
        self.object_properties.iter().find(|p| p.predicate == predicate)
    }

    pub fn datatype_property(&self, predicate: Predicate) -> Option<&DatatypePropertyDecl> {
        self.datatype_properties.iter().find(|p| p.predicate == predicate)
    }

    /// Wire local name of a predicate. `type` has none: it maps to `rdf:type`.
    pub fn local_name(&self, predicate: Predicate) -> Option<&'static str> {
        if let Some(p) = self.object_property(predicate) {
            return Some(p.local_name);
        }
        self.datatype_property(predicate).map(|p| p.local_name)
    }

    /// The string property that carries an entity's display name
    /// (`titre` for films, `nom` for everything else).
    pub fn label_property(&self, kind: EntityKind) -> Option<Predicate> {
        self.datatype_properties
            .iter()
            .find(|p| p.range == LiteralType::String && p.domains.contains(&kind))
            .map(|p| p.predicate)
    }

    /// The object property linking `domain` entities to `range` entities.
    pub fn relation_between(&self, domain: EntityKind, range: EntityKind) -> Option<Predicate> {
        self.object_properties
            .iter()
            .find(|p| p.domain == domain && p.range == range)
            .map(|p| p.predicate)
    }

    /// Check one triple against the declared domain and range of its predicate.
    pub fn check_triple(&self, triple: &Triple) -> SchemaResult<()> {
        let violation = |message: String| SchemaError::Violation {
            subject: triple.subject.to_string(),
            predicate: triple.predicate.to_string(),
            message,
        };
        let subject_kind = triple.subject.kind();

        if triple.predicate == Predicate::Type {
            return match &triple.object {
                Term::Class(kind) if *kind == subject_kind && self.class(*kind).is_some() => Ok(()),
                Term::Class(kind) => Err(violation(format!(
                    "typed as {kind} but identifier names a {subject_kind}"
                ))),
                other => Err(violation(format!("type object {other} is not a class"))),
            };
        }

        if let Some(decl) = self.object_property(triple.predicate) {
            if subject_kind != decl.domain {
                return Err(violation(format!(
                    "domain is {}, subject is a {subject_kind}",
                    decl.domain
                )));
            }
            return match &triple.object {
                Term::Entity(object) if object.kind() == decl.range => Ok(()),
                other => Err(violation(format!(
                    "range is {}, object is {other}",
                    decl.range
                ))),
            };
        }

        if let Some(decl) = self.datatype_property(triple.predicate) {
            if !decl.domains.contains(&subject_kind) {
                return Err(violation(format!(
                    "property does not apply to a {subject_kind}"
                )));
            }
            return match &triple.object {
                Term::Literal(lit) if lit.datatype() == decl.range => Ok(()),
                other => Err(violation(format!(
                    "range is {}, object is {other}",
                    decl.range
                ))),
            };
        }

        Err(violation("predicate is not declared by the schema".into()))
    }

    /// Check every triple of `graph`, and that every relationship edge points
    /// at a materialized entity.
    pub fn check_graph(&self, graph: &FilmGraph) -> SchemaResult<()> {
        for triple in graph.triples() {
            self.check_triple(triple)?;
            if let Term::Entity(object) = &triple.object {
                if !graph.has_entity(&triple.subject) || !graph.has_entity(object) {
                    return Err(SchemaError::DanglingReference {
                        subject: triple.subject.to_string(),
                        object: object.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for Schema {
    fn default() -> Self {
        FILM_SCHEMA
    }
}
