//! End-to-end integration tests for cinegraph.
//!
//! These tests run the full pipeline from a CSV table through population,
//! schema checking, serialization and SPARQL queries.

use cinegraph::config::CinegraphConfig;
use cinegraph::engine::{PopulationEngine, RowOutcome, populate};
use cinegraph::export::{GraphFormat, RdfExporter};
use cinegraph::graph::{FilmGraph, Predicate, Term, Triple};
use cinegraph::ident::{EntityId, EntityKind};
use cinegraph::query::{FilmStore, RecommendationReason};
use cinegraph::schema::{FILM_NS, Schema};
use cinegraph::table::{FilmRecord, load_table, read_table};

const TABLE: &str = "\
Film,Acteurs,Realisateur,Genre,Annee,Duree,Poster
Alien,Sigourney Weaver; Tom Skerritt,Ridley Scott,Horror; Science Fiction,1979,117,https://img/alien.jpg
Gladiator,Russell Crowe; Joaquin Phoenix,Ridley Scott,Action; Drama,2000,155.0,
Blade Runner,Harrison Ford; Rutger Hauer,Ridley Scott,Science Fiction,1982,117,
Cast Away,Tom Hanks; ; Rita Wilson,Robert Zemeckis,Drama,2000,0,
,Nobody,Nobody,Drama,1999,90,
Untitled Year,,,,unknown,,
";

fn alien() -> FilmRecord {
    FilmRecord::new("Alien")
        .with_actors("Sigourney Weaver; Tom Skerritt")
        .with_director("Ridley Scott")
        .with_genres("Horror; Science Fiction")
        .with_year("1979")
        .with_duration(117)
}

fn id(kind: EntityKind, fragment: &str) -> EntityId {
    EntityId::new(kind, fragment)
}

fn checked(graph: &FilmGraph) -> &FilmGraph {
    Schema::film()
        .check_graph(graph)
        .expect("populated graph conforms to the schema");
    graph
}

#[test]
fn alien_end_to_end() {
    let pop = populate(&[alien()], Schema::film());
    let graph = checked(&pop.graph);
    let film = id(EntityKind::Film, "Alien");

    assert!(graph.contains(&Triple::type_of(film.clone())));
    assert!(graph.contains(&Triple::string(film.clone(), Predicate::Title, "Alien")));
    assert!(graph.contains(&Triple::integer(film.clone(), Predicate::ReleaseYear, 1979)));
    assert!(graph.contains(&Triple::integer(film.clone(), Predicate::Duration, 117)));

    for (kind, fragment, name, relation) in [
        (EntityKind::Actor, "Sigourney_Weaver", "Sigourney Weaver", Predicate::HasActor),
        (EntityKind::Actor, "Tom_Skerritt", "Tom Skerritt", Predicate::HasActor),
        (EntityKind::Director, "Ridley_Scott", "Ridley Scott", Predicate::DirectedBy),
        (EntityKind::Genre, "Horror", "Horror", Predicate::HasGenre),
        (EntityKind::Genre, "Science_Fiction", "Science Fiction", Predicate::HasGenre),
    ] {
        let entity = id(kind, fragment);
        assert!(graph.contains(&Triple::type_of(entity.clone())));
        assert!(graph.contains(&Triple::string(entity.clone(), Predicate::Name, name)));
        assert!(graph.contains(&Triple::relation(film.clone(), relation, entity)));
    }

    assert_eq!(pop.report.films, 1);
    assert_eq!(pop.report.actors, 2);
    assert_eq!(pop.report.directors, 1);
    assert_eq!(pop.report.genres, 2);
    assert_eq!(pop.report.relation_edges(), 5);
    assert_eq!(graph.relation_count(), 5);
    assert_eq!(graph.len(), 4 + 3 * 5);
}

#[test]
fn population_is_deterministic() {
    let rows = read_table(TABLE.as_bytes()).unwrap();
    let first = populate(&rows, Schema::film());
    let second = populate(&rows, Schema::film());
    assert_eq!(first.graph.triple_set(), second.graph.triple_set());
    assert_eq!(first.report, second.report);

    let mut reversed = rows.clone();
    reversed.reverse();
    let third = populate(&reversed, Schema::film());
    assert_eq!(first.graph.triple_set(), third.graph.triple_set());
}

#[test]
fn identifiers_depend_only_on_the_name() {
    let a = populate(&[alien()], Schema::film());
    let b = populate(
        &[
            FilmRecord::new("Something Else").with_director("Ridley Scott"),
            FilmRecord::new("Alien").with_year("1980"),
        ],
        Schema::film(),
    );
    let scott = id(EntityKind::Director, "Ridley_Scott");
    let film = id(EntityKind::Film, "Alien");
    assert!(a.graph.has_entity(&scott) && b.graph.has_entity(&scott));
    assert!(a.graph.has_entity(&film) && b.graph.has_entity(&film));
}

#[test]
fn table_to_graph() {
    let rows = read_table(TABLE.as_bytes()).unwrap();
    assert_eq!(rows.len(), 6);
    let pop = populate(&rows, Schema::film());
    let graph = checked(&pop.graph);

    // One director node for three films, one edge per film.
    let scott = id(EntityKind::Director, "Ridley_Scott");
    assert_eq!(
        graph
            .triples_from(&scott)
            .iter()
            .filter(|t| t.predicate == Predicate::Name)
            .count(),
        1
    );
    assert_eq!(graph.subjects_of(Predicate::DirectedBy, &scott).len(), 3);

    // Empty list items are dropped.
    let cast_away = id(EntityKind::Film, "Cast_Away");
    let actors = graph.objects_of(&cast_away, Predicate::HasActor);
    assert_eq!(actors.len(), 2);

    // Duration 0 is omitted, 155.0 is read as 155.
    assert!(graph.literals_of(&cast_away, Predicate::Duration).is_empty());
    let gladiator = id(EntityKind::Film, "Gladiator");
    assert_eq!(
        graph.literals_of(&gladiator, Predicate::Duration)[0].as_integer(),
        Some(155)
    );

    // Non-numeric year is omitted, the film itself survives.
    let untitled = id(EntityKind::Film, "Untitled_Year");
    assert!(graph.has_entity(&untitled));
    assert!(graph.literals_of(&untitled, Predicate::ReleaseYear).is_empty());

    // The row with an empty title contributes nothing.
    assert!(pop.outcomes[4].is_skipped());
    assert!(!graph.has_entity(&id(EntityKind::Actor, "Nobody")));
    assert_eq!(pop.report.skipped_rows, 1);
    assert_eq!(pop.report.films, 5);

    // Shared entities are materialized once.
    assert_eq!(pop.report.directors, 2);
    assert_eq!(
        graph.entities_of_kind(EntityKind::Genre).len(),
        pop.report.genres
    );
}

#[test]
fn literal_omission() {
    let pop = populate(
        &[
            FilmRecord::new("Short").with_duration(0),
            FilmRecord::new("Feature").with_duration(120),
        ],
        Schema::film(),
    );
    let graph = checked(&pop.graph);
    assert!(
        graph
            .literals_of(&id(EntityKind::Film, "Short"), Predicate::Duration)
            .is_empty()
    );
    let durations = graph.literals_of(&id(EntityKind::Film, "Feature"), Predicate::Duration);
    assert_eq!(durations.len(), 1);
    assert_eq!(durations[0].as_integer(), Some(120));
}

#[test]
fn merged_titles_are_reported() {
    let pop = populate(
        &[
            FilmRecord::new("Alien").with_year("1979"),
            FilmRecord::new("Alien!").with_director("Ridley Scott"),
        ],
        Schema::film(),
    );
    checked(&pop.graph);
    assert!(matches!(
        pop.outcomes[1],
        RowOutcome::Ingested { merged: true, .. }
    ));
    assert_eq!(pop.report.films, 1);
    assert_eq!(
        pop.graph
            .objects_of(&id(EntityKind::Film, "Alien"), Predicate::DirectedBy)
            .len(),
        1
    );
}

#[test]
fn config_drives_population_and_output() {
    let dir = tempfile::TempDir::new().unwrap();
    let config_path = dir.path().join("cinegraph.toml");
    std::fs::write(
        &config_path,
        r#"
[table]
separator = "|"

[identifiers]
fold_case = true

[output]
formats = ["ntriples"]
include_ontology = false
"#,
    )
    .unwrap();
    let config = CinegraphConfig::load_or_default(Some(config_path.as_path())).unwrap();

    let rows = vec![
        FilmRecord::new("Heat").with_actors("Al Pacino | Robert De Niro"),
        FilmRecord::new("The Irishman").with_actors("ROBERT DE NIRO|al pacino"),
    ];
    let pop = PopulationEngine::new(Schema::film(), config.population()).populate(&rows);
    checked(&pop.graph);
    assert_eq!(pop.report.actors, 2);
    assert_eq!(pop.report.has_actor_edges, 4);
    // The first spelling seen names the node.
    assert_eq!(
        pop.graph.label_of(&id(EntityKind::Actor, "al_pacino")),
        Some("Al Pacino")
    );

    let exporter = RdfExporter::new(Schema::film(), config.output.namespace.clone())
        .with_ontology(config.output.include_ontology);
    let format = config.output.formats[0];
    let path = dir.path().join(format!("{}.{}", config.output.basename, format.extension()));
    exporter.write_file(&pop.graph, format, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), pop.graph.len());
}

#[test]
fn csv_file_to_recommendations() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = dir.path().join("films_clean.csv");
    std::fs::write(&input, TABLE).unwrap();

    let rows = load_table(&input).unwrap();
    let pop = populate(&rows, Schema::film());
    checked(&pop.graph);

    let exporter = RdfExporter::new(Schema::film(), FILM_NS).with_ontology(true);
    for format in [GraphFormat::Turtle, GraphFormat::RdfXml, GraphFormat::NTriples] {
        let path = dir.path().join(format!("films.{}", format.extension()));
        exporter.write_file(&pop.graph, format, &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    let store = FilmStore::from_graph(&pop.graph, &exporter).unwrap();
    assert_eq!(store.films().unwrap().len(), 5);

    let alien = store.find_film("Alien").unwrap();
    let recs = store.recommend(&alien).unwrap();
    let got: Vec<_> = recs.iter().map(|r| (r.title.as_str(), r.reason)).collect();
    assert_eq!(
        got,
        vec![
            ("Blade Runner", RecommendationReason::SharedGenre),
            ("Gladiator", RecommendationReason::SharedDirector),
        ]
    );

    let drama = store
        .genres()
        .unwrap()
        .into_iter()
        .find(|g| g.name == "Drama")
        .unwrap();
    let titles: Vec<_> = store
        .films_by_genre(&drama.iri)
        .unwrap()
        .into_iter()
        .map(|f| f.title)
        .collect();
    assert_eq!(titles, vec!["Cast Away", "Gladiator"]);
}

#[test]
fn schema_rejects_foreign_triples() {
    let mut graph = populate(&[alien()], Schema::film()).graph;
    let weaver = id(EntityKind::Actor, "Sigourney_Weaver");
    graph.insert(Triple {
        subject: weaver,
        predicate: Predicate::HasGenre,
        object: Term::Entity(id(EntityKind::Genre, "Horror")),
    });
    assert!(Schema::film().check_graph(&graph).is_err());
}
