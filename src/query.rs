//! SPARQL queries over a populated film graph.
//!
//! [`FilmStore`] loads the graph (through an [`RdfExporter`], so IRIs match
//! the serialized files) into an in-memory oxigraph store and answers the
//! catalogue questions a front end asks: the film list, one film's details,
//! title search, the genre list, films of a genre and recommendations.

use std::collections::{HashMap, HashSet};

use oxigraph::model::{GraphName, Term};
use oxigraph::sparql::{QueryResults, QuerySolution};
use oxigraph::store::Store;
use serde::Serialize;

use crate::error::QueryError;
use crate::export::RdfExporter;
use crate::graph::FilmGraph;

/// Result type for query operations.
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// One film of the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilmSummary {
    pub iri: String,
    pub title: String,
    pub year: Option<i64>,
    pub duration: Option<i64>,
    pub genres: Vec<String>,
    pub directors: Vec<String>,
}

/// A film with its cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilmDetails {
    #[serde(flatten)]
    pub film: FilmSummary,
    pub actors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreSummary {
    pub iri: String,
    pub name: String,
}

/// What a recommended film shares with the reference film.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationReason {
    SharedActor,
    SharedGenre,
    SharedDirector,
}

impl RecommendationReason {
    fn relation(self) -> &'static str {
        match self {
            RecommendationReason::SharedActor => "hasActor",
            RecommendationReason::SharedGenre => "hasGenre",
            RecommendationReason::SharedDirector => "directedBy",
        }
    }
}

impl std::fmt::Display for RecommendationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationReason::SharedActor => f.write_str("same actor"),
            RecommendationReason::SharedGenre => f.write_str("same genre"),
            RecommendationReason::SharedDirector => f.write_str("same director"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub iri: String,
    pub title: String,
    pub year: Option<i64>,
    pub reason: RecommendationReason,
}

/// Quote a value as a SPARQL string literal.
fn sparql_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn iri_of(solution: &QuerySolution, var: &str) -> Option<String> {
    match solution.get(var)? {
        Term::NamedNode(node) => Some(node.as_str().to_string()),
        _ => None,
    }
}

fn text_of(solution: &QuerySolution, var: &str) -> Option<String> {
    match solution.get(var)? {
        Term::Literal(lit) => Some(lit.value().to_string()),
        _ => None,
    }
}

fn integer_of(solution: &QuerySolution, var: &str) -> Option<i64> {
    text_of(solution, var)?.parse().ok()
}

fn push_unique(values: &mut Vec<String>, value: Option<String>) {
    if let Some(value) = value {
        if !values.contains(&value) {
            values.push(value);
        }
    }
}

/// Fold one-row-per-binding results into one entry per film, keeping the
/// order in which films first appear.
fn group_films(rows: &[QuerySolution]) -> Vec<(FilmSummary, Vec<String>)> {
    let mut films: Vec<(FilmSummary, Vec<String>)> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let (Some(iri), Some(title)) = (iri_of(row, "uri"), text_of(row, "titre")) else {
            continue;
        };
        let idx = *position.entry(iri.clone()).or_insert_with(|| {
            films.push((
                FilmSummary {
                    iri,
                    title,
                    year: None,
                    duration: None,
                    genres: Vec::new(),
                    directors: Vec::new(),
                },
                Vec::new(),
            ));
            films.len() - 1
        });

        let (film, actors) = &mut films[idx];
        film.year = film.year.or_else(|| integer_of(row, "annee"));
        film.duration = film.duration.or_else(|| integer_of(row, "duree"));
        push_unique(&mut film.genres, text_of(row, "genre"));
        push_unique(&mut film.directors, text_of(row, "realisateur"));
        push_unique(actors, text_of(row, "acteur"));
    }
    films
}

/// In-memory SPARQL view of a film graph.
pub struct FilmStore {
    store: Store,
    namespace: String,
}

impl FilmStore {
    /// Load `graph` into a fresh store using the exporter's IRIs. The
    /// ontology declarations are loaded too when the exporter includes them.
    pub fn from_graph(graph: &FilmGraph, exporter: &RdfExporter<'_>) -> QueryResult<Self> {
        let store = Store::new().map_err(|e| QueryError::Store {
            message: format!("failed to create oxigraph store: {e}"),
        })?;
        let triples = exporter.rdf_triples(graph)?;
        for triple in &triples {
            let quad = triple.clone().in_graph(GraphName::DefaultGraph);
            store.insert(&quad).map_err(|e| QueryError::Store {
                message: format!("insert failed: {e}"),
            })?;
        }
        tracing::debug!(triples = triples.len(), "film store loaded");
        Ok(Self {
            store,
            namespace: exporter.namespace().to_string(),
        })
    }

    fn prologue(&self) -> String {
        format!(
            "PREFIX ns: <{}>\nPREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>\n",
            self.namespace
        )
    }

    fn select(&self, body: &str) -> QueryResult<Vec<QuerySolution>> {
        let sparql = format!("{}{body}", self.prologue());
        let results = self.store.query(sparql.as_str()).map_err(|e| QueryError::Sparql {
            message: e.to_string(),
        })?;
        match results {
            QueryResults::Solutions(solutions) => solutions
                .map(|s| {
                    s.map_err(|e| QueryError::Sparql {
                        message: format!("solution error: {e}"),
                    })
                })
                .collect(),
            _ => Err(QueryError::Sparql {
                message: "expected SELECT solutions".into(),
            }),
        }
    }

    /// Number of triples in the store.
    pub fn len(&self) -> QueryResult<usize> {
        self.store.len().map_err(|e| QueryError::Store {
            message: e.to_string(),
        })
    }

    pub fn is_empty(&self) -> QueryResult<bool> {
        self.len().map(|n| n == 0)
    }

    /// Every film ordered by title.
    pub fn films(&self) -> QueryResult<Vec<FilmSummary>> {
        let rows = self.select(
            "SELECT ?uri ?titre ?annee ?duree ?genre ?realisateur WHERE {
               ?uri rdf:type ns:Film .
               ?uri ns:titre ?titre .
               OPTIONAL { ?uri ns:releaseYear ?annee }
               OPTIONAL { ?uri ns:duration ?duree }
               OPTIONAL { ?uri ns:hasGenre ?g . ?g ns:nom ?genre }
               OPTIONAL { ?uri ns:directedBy ?d . ?d ns:nom ?realisateur }
             }
             ORDER BY ?titre",
        )?;
        Ok(group_films(&rows).into_iter().map(|(film, _)| film).collect())
    }

    /// The film at `iri` with its cast, if the store has it.
    pub fn film_details(&self, iri: &str) -> QueryResult<Option<FilmDetails>> {
        let rows = self.select(&format!(
            "SELECT ?uri ?titre ?annee ?duree ?genre ?realisateur ?acteur WHERE {{
               BIND(<{iri}> AS ?uri)
               ?uri ns:titre ?titre .
               OPTIONAL {{ ?uri ns:releaseYear ?annee }}
               OPTIONAL {{ ?uri ns:duration ?duree }}
               OPTIONAL {{ ?uri ns:hasGenre ?g . ?g ns:nom ?genre }}
               OPTIONAL {{ ?uri ns:directedBy ?d . ?d ns:nom ?realisateur }}
               OPTIONAL {{ ?uri ns:hasActor ?a . ?a ns:nom ?acteur }}
             }}
             ORDER BY ?acteur"
        ))?;
        Ok(group_films(&rows)
            .into_iter()
            .next()
            .map(|(film, actors)| FilmDetails { film, actors }))
    }

    /// Films whose title contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> QueryResult<Vec<FilmSummary>> {
        let rows = self.select(&format!(
            "SELECT ?uri ?titre ?annee ?duree ?genre ?realisateur WHERE {{
               ?uri rdf:type ns:Film .
               ?uri ns:titre ?titre .
               OPTIONAL {{ ?uri ns:releaseYear ?annee }}
               OPTIONAL {{ ?uri ns:duration ?duree }}
               OPTIONAL {{ ?uri ns:hasGenre ?g . ?g ns:nom ?genre }}
               OPTIONAL {{ ?uri ns:directedBy ?d . ?d ns:nom ?realisateur }}
               FILTER(CONTAINS(LCASE(STR(?titre)), LCASE({})))
             }}
             ORDER BY ?titre",
            sparql_string(term)
        ))?;
        Ok(group_films(&rows).into_iter().map(|(film, _)| film).collect())
    }

    /// IRI of the film titled exactly `title`.
    pub fn find_film(&self, title: &str) -> QueryResult<String> {
        let rows = self.select(&format!(
            "SELECT ?uri WHERE {{
               ?uri rdf:type ns:Film .
               ?uri ns:titre ?titre .
               FILTER(STR(?titre) = {})
             }}
             ORDER BY ?uri
             LIMIT 1",
            sparql_string(title)
        ))?;
        rows.first()
            .and_then(|row| iri_of(row, "uri"))
            .ok_or_else(|| QueryError::UnknownFilm {
                title: title.to_string(),
            })
    }

    /// Every genre ordered by name.
    pub fn genres(&self) -> QueryResult<Vec<GenreSummary>> {
        let rows = self.select(
            "SELECT DISTINCT ?uri ?nom WHERE {
               ?uri rdf:type ns:Genre .
               ?uri ns:nom ?nom .
             }
             ORDER BY ?nom",
        )?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                Some(GenreSummary {
                    iri: iri_of(row, "uri")?,
                    name: text_of(row, "nom")?,
                })
            })
            .collect())
    }

    /// Films linked to the genre at `genre_iri`, ordered by title.
    pub fn films_by_genre(&self, genre_iri: &str) -> QueryResult<Vec<FilmSummary>> {
        let rows = self.select(&format!(
            "SELECT ?uri ?titre ?annee ?duree ?realisateur WHERE {{
               ?uri ns:hasGenre <{genre_iri}> .
               ?uri ns:titre ?titre .
               OPTIONAL {{ ?uri ns:releaseYear ?annee }}
               OPTIONAL {{ ?uri ns:duration ?duree }}
               OPTIONAL {{ ?uri ns:directedBy ?d . ?d ns:nom ?realisateur }}
             }}
             ORDER BY ?titre"
        ))?;
        Ok(group_films(&rows).into_iter().map(|(film, _)| film).collect())
    }

    fn related(&self, iri: &str, reason: RecommendationReason) -> QueryResult<Vec<Recommendation>> {
        let relation = reason.relation();
        let rows = self.select(&format!(
            "SELECT DISTINCT ?uri ?titre ?annee WHERE {{
               <{iri}> ns:{relation} ?shared .
               ?uri ns:{relation} ?shared .
               ?uri ns:titre ?titre .
               OPTIONAL {{ ?uri ns:releaseYear ?annee }}
               FILTER(?uri != <{iri}>)
             }}
             ORDER BY ?titre"
        ))?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                Some(Recommendation {
                    iri: iri_of(row, "uri")?,
                    title: text_of(row, "titre")?,
                    year: integer_of(row, "annee"),
                    reason,
                })
            })
            .collect())
    }

    /// Films sharing an actor, then a genre, then the director with the film
    /// at `iri`. Each film appears once, under the first reason found; the
    /// film itself never appears.
    pub fn recommend(&self, iri: &str) -> QueryResult<Vec<Recommendation>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for reason in [
            RecommendationReason::SharedActor,
            RecommendationReason::SharedGenre,
            RecommendationReason::SharedDirector,
        ] {
            for rec in self.related(iri, reason)? {
                if seen.insert(rec.iri.clone()) {
                    out.push(rec);
                }
            }
        }
        tracing::debug!(film = iri, recommendations = out.len(), "recommendations computed");
        Ok(out)
    }
}

impl std::fmt::Debug for FilmStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilmStore")
            .field("namespace", &self.namespace)
            .field("triples", &self.len().unwrap_or(0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::populate;
    use crate::schema::{FILM_NS, Schema};
    use crate::table::FilmRecord;

    fn store() -> FilmStore {
        let rows = vec![
            FilmRecord::new("Alien")
                .with_actors("Sigourney Weaver; Tom Skerritt")
                .with_director("Ridley Scott")
                .with_genres("Horror; Science Fiction")
                .with_year("1979")
                .with_duration(117),
            FilmRecord::new("Aliens")
                .with_actors("Sigourney Weaver; Michael Biehn")
                .with_director("James Cameron")
                .with_genres("Action; Science Fiction")
                .with_year("1986")
                .with_duration(137),
            FilmRecord::new("Gladiator")
                .with_actors("Russell Crowe")
                .with_director("Ridley Scott")
                .with_genres("Action; Drama")
                .with_year("2000"),
            FilmRecord::new("Amélie \"Poulain\"")
                .with_actors("Audrey Tautou")
                .with_director("Jean-Pierre Jeunet")
                .with_genres("Comedy"),
        ];
        let population = populate(&rows, Schema::film());
        let exporter = RdfExporter::new(Schema::film(), FILM_NS).with_ontology(true);
        FilmStore::from_graph(&population.graph, &exporter).unwrap()
    }

    fn iri(local: &str) -> String {
        format!("{FILM_NS}{local}")
    }

    #[test]
    fn sparql_string_escapes() {
        assert_eq!(sparql_string("plain"), "\"plain\"");
        assert_eq!(sparql_string("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
    }

    #[test]
    fn lists_all_films_by_title() {
        let films = store().films().unwrap();
        let titles: Vec<_> = films.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["Alien", "Aliens", "Amélie \"Poulain\"", "Gladiator"]);

        let alien = &films[0];
        assert_eq!(alien.iri, iri("Film_Alien"));
        assert_eq!(alien.year, Some(1979));
        assert_eq!(alien.duration, Some(117));
        assert_eq!(alien.directors, vec!["Ridley Scott"]);
        assert_eq!(alien.genres.len(), 2);

        assert_eq!(films[3].duration, None);
    }

    #[test]
    fn details_include_cast() {
        let store = store();
        let details = store.film_details(&iri("Film_Alien")).unwrap().unwrap();
        assert_eq!(details.film.title, "Alien");
        assert_eq!(details.actors, vec!["Sigourney Weaver", "Tom Skerritt"]);
        assert!(store.film_details(&iri("Film_Nope")).unwrap().is_none());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let store = store();
        let hits = store.search("ALIEN").unwrap();
        assert_eq!(hits.len(), 2);
        assert!(store.search("zzz").unwrap().is_empty());
        assert_eq!(store.search("\"poulain\"").unwrap().len(), 1);
    }

    #[test]
    fn find_film_by_exact_title() {
        let store = store();
        assert_eq!(store.find_film("Gladiator").unwrap(), iri("Film_Gladiator"));
        let err = store.find_film("gladiator").unwrap_err();
        assert!(matches!(err, QueryError::UnknownFilm { .. }));
    }

    #[test]
    fn genres_and_films_by_genre() {
        let store = store();
        let genres = store.genres().unwrap();
        let names: Vec<_> = genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Action", "Comedy", "Drama", "Horror", "Science Fiction"]);

        let action = store.films_by_genre(&iri("Genre_Action")).unwrap();
        let titles: Vec<_> = action.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["Aliens", "Gladiator"]);
    }

    #[test]
    fn recommendations_merge_in_reason_order() {
        let recs = store().recommend(&iri("Film_Alien")).unwrap();
        let got: Vec<_> = recs.iter().map(|r| (r.title.as_str(), r.reason)).collect();
        assert_eq!(
            got,
            vec![
                ("Aliens", RecommendationReason::SharedActor),
                ("Gladiator", RecommendationReason::SharedDirector),
            ]
        );
    }

    #[test]
    fn recommendations_exclude_self_and_unrelated() {
        let recs = store().recommend(&iri("Film_Amlie_Poulain")).unwrap();
        assert!(recs.is_empty());
    }
}
