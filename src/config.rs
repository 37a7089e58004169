//! TOML configuration for the cinegraph CLI.
//!
//! ```toml
//! [table]
//! separator = ";"
//!
//! [identifiers]
//! fold_case = false
//!
//! [output]
//! namespace = "http://example.org/film#"
//! directory = "."
//! basename = "films"
//! formats = ["turtle", "rdfxml"]
//! include_ontology = true
//! ```
//!
//! Every key is optional; a missing file means all defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::PopulationConfig;
use crate::error::ConfigError;
use crate::export::GraphFormat;
use crate::ident::IdentifierPolicy;
use crate::schema::FILM_NS;
use crate::split::DEFAULT_SEPARATOR;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Full configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CinegraphConfig {
    pub table: TableConfig,
    pub identifiers: IdentifierPolicy,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Separator of the multi-valued columns.
    pub separator: char,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Namespace IRI prefixed to every class, property and entity.
    pub namespace: String,
    /// Directory the serialized graphs are written to.
    pub directory: PathBuf,
    /// File stem of the serialized graphs (`films.ttl`, `films.owl`, ...).
    pub basename: String,
    /// Formats written by `cinegraph build`.
    pub formats: Vec<GraphFormat>,
    /// Prefix the instance data with the ontology declarations.
    pub include_ontology: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            namespace: FILM_NS.to_string(),
            directory: PathBuf::from("."),
            basename: "films".to_string(),
            formats: vec![GraphFormat::Turtle, GraphFormat::RdfXml],
            include_ontology: true,
        }
    }
}

impl CinegraphConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, path)
    }

    /// Load from `path` if given and present, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    fn parse(content: &str, path: &Path) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Settings for the population engine.
    pub fn population(&self) -> PopulationConfig {
        PopulationConfig {
            separator: self.table.separator,
            identifiers: self.identifiers,
        }
    }
}
