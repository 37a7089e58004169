//! Rich diagnostic error types for cinegraph.
//!
//! Each outer layer (table loading, schema validation, export, querying,
//! configuration) defines its own error type with miette `#[diagnostic]`
//! derives. The population engine itself never fails: malformed field values
//! degrade to omitted triples or skipped rows instead of errors.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for cinegraph.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, sources) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum CinegraphError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Table errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TableError {
    #[error("cannot open film table: {path}")]
    #[diagnostic(
        code(cinegraph::table::open),
        help(
            "The finalized film table could not be opened. Run the data preparation \
             step first, or pass the right file with --input."
        )
    )]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("film table is missing the required column \"{column}\"")]
    #[diagnostic(
        code(cinegraph::table::missing_column),
        help(
            "The table header must contain Film, Acteurs, Realisateur, Genre, Annee \
             and Duree. Poster is optional."
        )
    )]
    MissingColumn { column: String },

    #[error("malformed CSV in film table: {message}")]
    #[diagnostic(
        code(cinegraph::table::malformed),
        help("Check the CSV quoting and encoding (UTF-8) of the film table.")
    )]
    Malformed { message: String },
}

// ---------------------------------------------------------------------------
// Schema errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SchemaError {
    #[error("schema violation on ({subject}, {predicate}): {message}")]
    #[diagnostic(
        code(cinegraph::schema::violation),
        help(
            "An emitted triple does not match the declared domain or range of its \
             property. This indicates a bug in graph population."
        )
    )]
    Violation {
        subject: String,
        predicate: String,
        message: String,
    },

    #[error("dangling reference: {subject} points to {object}, which has no type triple")]
    #[diagnostic(
        code(cinegraph::schema::dangling),
        help("Every entity referenced by a relationship edge must be materialized as a node.")
    )]
    DanglingReference { subject: String, object: String },
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("invalid IRI \"{iri}\": {message}")]
    #[diagnostic(
        code(cinegraph::export::iri),
        help("Check the `output.namespace` setting; it must be an absolute IRI such as http://example.org/film#.")
    )]
    Iri { iri: String, message: String },

    #[error("invalid literal: {message}")]
    #[diagnostic(code(cinegraph::export::literal))]
    Literal { message: String },

    #[error("I/O error while writing graph: {source}")]
    #[diagnostic(
        code(cinegraph::export::io),
        help("Check that the output directory exists and is writable.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {message}")]
    #[diagnostic(code(cinegraph::export::json))]
    Json { message: String },
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum QueryError {
    #[error("RDF store error: {message}")]
    #[diagnostic(
        code(cinegraph::query::store),
        help("The in-memory oxigraph store could not be created or loaded.")
    )]
    Store { message: String },

    #[error("SPARQL query failed: {message}")]
    #[diagnostic(
        code(cinegraph::query::sparql),
        help("The generated SPARQL query was rejected. This is a bug; please report it.")
    )]
    Sparql { message: String },

    #[error("no film titled \"{title}\"")]
    #[diagnostic(
        code(cinegraph::query::unknown_film),
        help("Titles match exactly. Use `cinegraph search <term>` to find the exact title.")
    )]
    UnknownFilm { title: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Export(#[from] ExportError),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(cinegraph::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(cinegraph::config::parse),
        help("Check the TOML syntax. Known sections are [table], [identifiers] and [output].")
    )]
    Parse { path: String, message: String },
}

/// Convenience alias for functions returning cinegraph results.
pub type CinegraphResult<T> = std::result::Result<T, CinegraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_error_converts_to_cinegraph_error() {
        let err = TableError::MissingColumn {
            column: "Film".into(),
        };
        let top: CinegraphError = err.into();
        assert!(matches!(
            top,
            CinegraphError::Table(TableError::MissingColumn { .. })
        ));
    }

    #[test]
    fn query_error_wraps_export_error() {
        let export = ExportError::Json {
            message: "boom".into(),
        };
        let query: QueryError = export.into();
        assert!(matches!(query, QueryError::Export(ExportError::Json { .. })));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = SchemaError::Violation {
            subject: "Film_Alien".into(),
            predicate: "nom".into(),
            message: "domain mismatch".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Film_Alien"));
        assert!(msg.contains("nom"));
        assert!(msg.contains("domain mismatch"));
    }
}
