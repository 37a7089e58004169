// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # cinegraph
//!
//! Populates a typed film knowledge graph from a tabular film dataset.
//!
//! Each table row names a film with its cast, director, genres, release
//! year and duration. The population engine turns rows into triples over a
//! fixed ontology of four classes (Film, Actor, Director, Genre), merging
//! repeated mentions of a name into one node.
//!
//! ## Architecture
//!
//! - **Identifiers** (`ident`, `split`): name normalization and multi-value splitting
//! - **Schema** (`schema`): the constant film ontology and its checks
//! - **Graph** (`graph`): triple set with a petgraph relation index
//! - **Population** (`engine`, `registry`): rows → triples, per-run dedup
//! - **I/O** (`table`, `export`, `query`): CSV in, RDF out, SPARQL over oxigraph
//!
//! ## Library usage
//!
//! ```no_run
//! use cinegraph::engine::populate;
//! use cinegraph::schema::Schema;
//! use cinegraph::table::FilmRecord;
//!
//! let rows = vec![
//!     FilmRecord::new("Alien")
//!         .with_actors("Sigourney Weaver; Tom Skerritt")
//!         .with_director("Ridley Scott")
//!         .with_year("1979"),
//! ];
//! let population = populate(&rows, Schema::film());
//! println!("{}", population.report);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod graph;
pub mod ident;
pub mod query;
pub mod registry;
pub mod schema;
pub mod split;
pub mod table;
