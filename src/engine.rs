//! Graph population engine.
//!
//! Turns film table rows into the film graph. One call to
//! [`PopulationEngine::populate`] is one population run: it creates a fresh
//! [`EntityRegistry`], walks the rows in order and discards the registry when
//! done, so runs never share state.
//!
//! Population never fails. A row without a usable title is skipped and
//! reported as [`RowOutcome::Skipped`]; an unusable year or duration only
//! drops that property; an actor or genre token that normalizes to nothing
//! only drops that entity.

use serde::Serialize;

use crate::graph::{FilmGraph, Predicate, Triple};
use crate::ident::{EntityId, EntityKind, IdentifierPolicy};
use crate::registry::EntityRegistry;
use crate::schema::Schema;
use crate::split::{DEFAULT_SEPARATOR, split_multi};
use crate::table::FilmRecord;

/// Configuration for a population run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationConfig {
    /// Separator of the multi-valued `Acteurs` and `Genre` fields.
    pub separator: char,
    /// How names become identifier fragments.
    pub identifiers: IdentifierPolicy,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            identifiers: IdentifierPolicy::default(),
        }
    }
}

/// Why a row produced no triples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The title is absent or normalizes to an empty fragment.
    EmptyTitle,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyTitle => f.write_str("empty title"),
        }
    }
}

/// What happened to one input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// The row contributed to the film node `film`. `merged` is set when an
    /// earlier row already created that node (titles normalizing identically).
    Ingested { film: EntityId, merged: bool },
    /// The row was dropped.
    Skipped { reason: SkipReason },
}

impl RowOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, RowOutcome::Skipped { .. })
    }
}

/// Counts gathered during a population run. For reporting only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PopulationReport {
    pub rows: usize,
    pub skipped_rows: usize,
    pub films: usize,
    pub actors: usize,
    pub directors: usize,
    pub genres: usize,
    pub triples: usize,
    pub has_actor_edges: usize,
    pub directed_by_edges: usize,
    pub has_genre_edges: usize,
}

impl PopulationReport {
    /// Total entity → entity edges.
    pub fn relation_edges(&self) -> usize {
        self.has_actor_edges + self.directed_by_edges + self.has_genre_edges
    }
}

impl std::fmt::Display for PopulationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Rows: {} ({} skipped)", self.rows, self.skipped_rows)?;
        writeln!(f, "Triples: {}", self.triples)?;
        writeln!(f, "  Films: {}", self.films)?;
        writeln!(f, "  Actors: {}", self.actors)?;
        writeln!(f, "  Directors: {}", self.directors)?;
        writeln!(f, "  Genres: {}", self.genres)?;
        write!(
            f,
            "Edges: {} hasActor, {} directedBy, {} hasGenre",
            self.has_actor_edges, self.directed_by_edges, self.has_genre_edges
        )
    }
}

/// Result of one population run.
#[derive(Debug)]
pub struct Population {
    pub graph: FilmGraph,
    pub report: PopulationReport,
    /// One outcome per input row, in input order.
    pub outcomes: Vec<RowOutcome>,
}

/// Populates the film graph from table rows according to a schema.
#[derive(Debug, Clone, Copy)]
pub struct PopulationEngine<'s> {
    schema: &'s Schema,
    config: PopulationConfig,
}

impl<'s> PopulationEngine<'s> {
    pub fn new(schema: &'s Schema, config: PopulationConfig) -> Self {
        Self { schema, config }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    /// Run one population pass over `rows`.
    pub fn populate(&self, rows: &[FilmRecord]) -> Population {
        let mut run = Run {
            engine: self,
            registry: EntityRegistry::new(),
            graph: FilmGraph::new(),
        };

        let outcomes: Vec<RowOutcome> = rows
            .iter()
            .enumerate()
            .map(|(index, row)| run.ingest_row(index, row))
            .collect();

        let Run {
            registry, graph, ..
        } = run;
        let report = PopulationReport {
            rows: rows.len(),
            skipped_rows: outcomes.iter().filter(|o| o.is_skipped()).count(),
            films: registry.count(EntityKind::Film),
            actors: registry.count(EntityKind::Actor),
            directors: registry.count(EntityKind::Director),
            genres: registry.count(EntityKind::Genre),
            triples: graph.len(),
            has_actor_edges: graph.count_predicate(Predicate::HasActor),
            directed_by_edges: graph.count_predicate(Predicate::DirectedBy),
            has_genre_edges: graph.count_predicate(Predicate::HasGenre),
        };
        tracing::debug!(?registry, triples = report.triples, "population run finished");

        Population {
            graph,
            report,
            outcomes,
        }
    }
}

/// Populate `rows` with the default configuration.
pub fn populate(rows: &[FilmRecord], schema: &Schema) -> Population {
    PopulationEngine::new(schema, PopulationConfig::default()).populate(rows)
}

/// State of one population run.
struct Run<'e, 's> {
    engine: &'e PopulationEngine<'s>,
    registry: EntityRegistry,
    graph: FilmGraph,
}

impl Run<'_, '_> {
    fn ingest_row(&mut self, index: usize, row: &FilmRecord) -> RowOutcome {
        let policy = self.engine.config.identifiers;
        let Some((raw_title, fragment)) = row
            .title
            .as_deref()
            .and_then(|title| policy.normalize(title).map(|fragment| (title, fragment)))
        else {
            tracing::debug!(row = index, "skipping row without a usable title");
            return RowOutcome::Skipped {
                reason: SkipReason::EmptyTitle,
            };
        };

        let (film, is_new) = self.materialize(EntityKind::Film, &fragment, raw_title);
        if !is_new {
            tracing::debug!(row = index, %film, "title already materialized, merging row");
        }

        if let Some(year) = row.year.as_deref().and_then(parse_year) {
            self.graph
                .insert(Triple::integer(film.clone(), Predicate::ReleaseYear, year));
        }
        if let Some(minutes) = row.duration.filter(|m| *m > 0) {
            self.graph
                .insert(Triple::integer(film.clone(), Predicate::Duration, minutes));
        }

        if let Some(director) = row.director.as_deref() {
            self.link(&film, EntityKind::Director, director);
        }
        let separator = self.engine.config.separator;
        for actor in split_multi(row.actors.as_deref(), separator) {
            self.link(&film, EntityKind::Actor, actor);
        }
        for genre in split_multi(row.genres.as_deref(), separator) {
            self.link(&film, EntityKind::Genre, genre);
        }

        RowOutcome::Ingested {
            film,
            merged: !is_new,
        }
    }

    /// Resolve an entity through the registry, emitting its `type` and label
    /// triples the first time it is seen.
    fn materialize(&mut self, kind: EntityKind, fragment: &str, display_name: &str) -> (EntityId, bool) {
        let (id, is_new) = self.registry.ensure(kind, fragment, display_name);
        if is_new {
            self.graph.insert(Triple::type_of(id.clone()));
            if let Some(label) = self.engine.schema.label_property(kind) {
                self.graph
                    .insert(Triple::string(id.clone(), label, display_name.trim()));
            }
            tracing::trace!(%id, "materialized entity");
        }
        (id, is_new)
    }

    /// Link `film` to the entity named `raw` of `kind`.
    fn link(&mut self, film: &EntityId, kind: EntityKind, raw: &str) {
        let Some(fragment) = self.engine.config.identifiers.normalize(raw) else {
            tracing::debug!(%film, %kind, raw, "name normalizes to nothing, skipping");
            return;
        };
        let Some(relation) = self.engine.schema.relation_between(EntityKind::Film, kind) else {
            return;
        };
        let (entity, _) = self.materialize(kind, &fragment, raw);
        self.graph
            .insert(Triple::relation(film.clone(), relation, entity));
    }
}

/// A year is present only if it is a non-negative integer written in digits.
fn parse_year(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
