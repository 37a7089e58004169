//! In-memory film graph with a relationship index.
//!
//! Triples are kept as a set (insertion order preserved for output). Entity
//! → entity edges are mirrored into a `petgraph` directed graph so that
//! "films of this actor" and "actors of this film" are adjacency lookups
//! rather than scans.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::ident::{EntityId, EntityKind};

use super::{Literal, Predicate, Term, Triple};

/// Set of triples produced by one population run.
#[derive(Default)]
pub struct FilmGraph {
    /// Triples in insertion order.
    triples: Vec<Triple>,
    /// Membership index over `triples`.
    seen: HashSet<Triple>,
    /// Relationship edges: nodes are entities, edges carry the predicate.
    relations: DiGraph<EntityId, Predicate>,
    /// EntityId → NodeIndex for O(1) node lookups.
    node_index: HashMap<EntityId, NodeIndex>,
}

impl FilmGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, id: &EntityId) -> NodeIndex {
        if let Some(idx) = self.node_index.get(id) {
            return *idx;
        }
        let idx = self.relations.add_node(id.clone());
        self.node_index.insert(id.clone(), idx);
        idx
    }

    /// Insert a triple. Returns `false` if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.seen.contains(&triple) {
            return false;
        }
        if let Term::Entity(object) = &triple.object {
            let subj_idx = self.ensure_node(&triple.subject);
            let obj_idx = self.ensure_node(object);
            self.relations.add_edge(subj_idx, obj_idx, triple.predicate);
        }
        self.seen.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    /// Whether the exact triple is present.
    pub fn contains(&self, triple: &Triple) -> bool {
        self.seen.contains(triple)
    }

    /// Number of triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Whether the graph holds no triples.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// All triples in insertion order.
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// All triples as an unordered set.
    pub fn triple_set(&self) -> &HashSet<Triple> {
        &self.seen
    }

    /// Triples whose subject is `subject`.
    pub fn triples_from(&self, subject: &EntityId) -> Vec<&Triple> {
        self.triples.iter().filter(|t| &t.subject == subject).collect()
    }

    /// Number of triples with the given predicate.
    pub fn count_predicate(&self, predicate: Predicate) -> usize {
        self.triples.iter().filter(|t| t.predicate == predicate).count()
    }

    /// Number of entity → entity edges.
    pub fn relation_count(&self) -> usize {
        self.relations.edge_count()
    }

    /// Entities typed as `kind`, in creation order.
    pub fn entities_of_kind(&self, kind: EntityKind) -> Vec<&EntityId> {
        self.triples
            .iter()
            .filter(|t| t.predicate == Predicate::Type && t.object == Term::Class(kind))
            .map(|t| &t.subject)
            .collect()
    }

    /// Whether `id` has a `type` triple.
    pub fn has_entity(&self, id: &EntityId) -> bool {
        self.seen.contains(&Triple::type_of(id.clone()))
    }

    /// Literal values of `subject` for a datatype predicate.
    pub fn literals_of(&self, subject: &EntityId, predicate: Predicate) -> Vec<&Literal> {
        self.triples
            .iter()
            .filter(|t| &t.subject == subject && t.predicate == predicate)
            .filter_map(|t| match &t.object {
                Term::Literal(lit) => Some(lit),
                _ => None,
            })
            .collect()
    }

    /// Display label of an entity: its title for films, its name otherwise.
    pub fn label_of(&self, id: &EntityId) -> Option<&str> {
        let predicate = match id.kind() {
            EntityKind::Film => Predicate::Title,
            _ => Predicate::Name,
        };
        self.literals_of(id, predicate)
            .into_iter()
            .find_map(Literal::as_str)
    }

    /// Objects reached from `subject` through `predicate`.
    pub fn objects_of(&self, subject: &EntityId, predicate: Predicate) -> Vec<&EntityId> {
        let Some(&idx) = self.node_index.get(subject) else {
            return vec![];
        };
        self.relations
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| *e.weight() == predicate)
            .filter_map(|e| self.relations.node_weight(e.target()))
            .collect()
    }

    /// Subjects pointing at `object` through `predicate`.
    pub fn subjects_of(&self, predicate: Predicate, object: &EntityId) -> Vec<&EntityId> {
        let Some(&idx) = self.node_index.get(object) else {
            return vec![];
        };
        self.relations
            .edges_directed(idx, Direction::Incoming)
            .filter(|e| *e.weight() == predicate)
            .filter_map(|e| self.relations.node_weight(e.source()))
            .collect()
    }
}

impl std::fmt::Debug for FilmGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilmGraph")
            .field("triples", &self.len())
            .field("relations", &self.relation_count())
            .finish()
    }
}
