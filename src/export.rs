//! Serialization of the film graph.
//!
//! [`RdfExporter`] maps the abstract triple set onto RDF terms under a
//! namespace and writes it as Turtle, N-Triples or RDF/XML through
//! `oxigraph`'s serializer. Entities become `<namespace><identifier>`,
//! classes and properties use the schema's wire names, literals are typed
//! `xsd:string` / `xsd:integer`.
//!
//! The JSON export types give a label-resolved view of the same triples.

use std::io::Write;
use std::path::Path;

use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::vocab::{rdf, rdfs, xsd};
use oxigraph::model::{Literal as RdfLiteral, NamedNode, Triple as RdfTriple};
use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::graph::{FilmGraph, Literal, LiteralType, Predicate, Term, Triple};
use crate::ident::{EntityId, EntityKind};
use crate::schema::Schema;

/// Result type for export operations.
pub type ExportResult<T> = std::result::Result<T, ExportError>;

const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

/// Language of the ontology labels and comments.
const SCHEMA_LANG: &str = "fr";

/// Concrete textual graph formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    #[value(name = "turtle")]
    Turtle,
    #[value(name = "ntriples")]
    NTriples,
    #[value(name = "rdfxml")]
    RdfXml,
}

impl GraphFormat {
    fn rdf_format(self) -> RdfFormat {
        match self {
            GraphFormat::Turtle => RdfFormat::Turtle,
            GraphFormat::NTriples => RdfFormat::NTriples,
            GraphFormat::RdfXml => RdfFormat::RdfXml,
        }
    }

    /// File extension used when writing this format.
    pub fn extension(self) -> &'static str {
        match self {
            GraphFormat::Turtle => "ttl",
            GraphFormat::NTriples => "nt",
            GraphFormat::RdfXml => "owl",
        }
    }
}

impl std::fmt::Display for GraphFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphFormat::Turtle => f.write_str("Turtle"),
            GraphFormat::NTriples => f.write_str("N-Triples"),
            GraphFormat::RdfXml => f.write_str("RDF/XML"),
        }
    }
}

fn named(iri: impl Into<String>) -> ExportResult<NamedNode> {
    let iri = iri.into();
    NamedNode::new(iri.clone()).map_err(|e| ExportError::Iri {
        iri,
        message: e.to_string(),
    })
}

fn lang_literal(value: &str) -> ExportResult<RdfLiteral> {
    RdfLiteral::new_language_tagged_literal(value, SCHEMA_LANG).map_err(|e| ExportError::Literal {
        message: e.to_string(),
    })
}

/// Maps the film graph onto RDF under a namespace.
#[derive(Debug, Clone)]
pub struct RdfExporter<'s> {
    schema: &'s Schema,
    namespace: String,
    include_ontology: bool,
}

impl<'s> RdfExporter<'s> {
    /// Exporter for instance data only.
    pub fn new(schema: &'s Schema, namespace: impl Into<String>) -> Self {
        Self {
            schema,
            namespace: namespace.into(),
            include_ontology: false,
        }
    }

    /// Also emit the ontology declarations before the instance data.
    pub fn with_ontology(mut self, include: bool) -> Self {
        self.include_ontology = include;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    fn local(&self, name: &str) -> ExportResult<NamedNode> {
        named(format!("{}{name}", self.namespace))
    }

    pub fn entity_iri(&self, id: &EntityId) -> ExportResult<NamedNode> {
        self.local(&id.to_string())
    }

    pub fn class_iri(&self, kind: EntityKind) -> ExportResult<NamedNode> {
        let name = self.schema.class(kind).map_or(kind.prefix(), |c| c.local_name);
        self.local(name)
    }

    pub fn predicate_iri(&self, predicate: Predicate) -> ExportResult<NamedNode> {
        if predicate == Predicate::Type {
            return Ok(rdf::TYPE.into_owned());
        }
        let name = self.schema.local_name(predicate).unwrap_or(predicate.name());
        self.local(name)
    }

    fn literal(lit: &Literal) -> RdfLiteral {
        match lit {
            Literal::String(s) => RdfLiteral::new_typed_literal(s.as_str(), xsd::STRING),
            Literal::Integer(n) => RdfLiteral::new_typed_literal(n.to_string(), xsd::INTEGER),
        }
    }

    /// Convert one film-graph triple to RDF.
    pub fn to_rdf(&self, triple: &Triple) -> ExportResult<RdfTriple> {
        let subject = self.entity_iri(&triple.subject)?;
        let predicate = self.predicate_iri(triple.predicate)?;
        Ok(match &triple.object {
            Term::Entity(id) => RdfTriple::new(subject, predicate, self.entity_iri(id)?),
            Term::Class(kind) => RdfTriple::new(subject, predicate, self.class_iri(*kind)?),
            Term::Literal(lit) => RdfTriple::new(subject, predicate, Self::literal(lit)),
        })
    }

    /// Class and property declarations of the schema.
    pub fn ontology_triples(&self) -> ExportResult<Vec<RdfTriple>> {
        let owl_class = named(format!("{OWL_NS}Class"))?;
        let owl_object_property = named(format!("{OWL_NS}ObjectProperty"))?;
        let owl_datatype_property = named(format!("{OWL_NS}DatatypeProperty"))?;
        let rdf_type = rdf::TYPE.into_owned();
        let label = rdfs::LABEL.into_owned();
        let comment = rdfs::COMMENT.into_owned();
        let domain = rdfs::DOMAIN.into_owned();
        let range = rdfs::RANGE.into_owned();

        let mut out = Vec::new();
        for class in self.schema.classes {
            let iri = self.class_iri(class.kind)?;
            out.push(RdfTriple::new(iri.clone(), rdf_type.clone(), owl_class.clone()));
            out.push(RdfTriple::new(iri.clone(), label.clone(), lang_literal(class.label)?));
            out.push(RdfTriple::new(iri, comment.clone(), lang_literal(class.comment)?));
        }
        for prop in self.schema.object_properties {
            let iri = self.local(prop.local_name)?;
            out.push(RdfTriple::new(iri.clone(), rdf_type.clone(), owl_object_property.clone()));
            out.push(RdfTriple::new(iri.clone(), label.clone(), lang_literal(prop.label)?));
            out.push(RdfTriple::new(iri.clone(), domain.clone(), self.class_iri(prop.domain)?));
            out.push(RdfTriple::new(iri, range.clone(), self.class_iri(prop.range)?));
        }
        for prop in self.schema.datatype_properties {
            let iri = self.local(prop.local_name)?;
            out.push(RdfTriple::new(iri.clone(), rdf_type.clone(), owl_datatype_property.clone()));
            out.push(RdfTriple::new(iri.clone(), label.clone(), lang_literal(prop.label)?));
            if let [only] = prop.domains {
                out.push(RdfTriple::new(iri.clone(), domain.clone(), self.class_iri(*only)?));
            }
            let datatype = match prop.range {
                LiteralType::String => xsd::STRING.into_owned(),
                LiteralType::Integer => xsd::INTEGER.into_owned(),
            };
            out.push(RdfTriple::new(iri, range.clone(), datatype));
        }
        Ok(out)
    }

    /// Everything this exporter writes for `graph`, in output order.
    pub fn rdf_triples(&self, graph: &FilmGraph) -> ExportResult<Vec<RdfTriple>> {
        let mut out = if self.include_ontology {
            self.ontology_triples()?
        } else {
            Vec::new()
        };
        out.reserve(graph.len());
        for triple in graph.triples() {
            out.push(self.to_rdf(triple)?);
        }
        Ok(out)
    }

    /// Serialize `graph` into `writer`, returning the writer.
    pub fn write<W: Write>(&self, graph: &FilmGraph, format: GraphFormat, writer: W) -> ExportResult<W> {
        let triples = self.rdf_triples(graph)?;
        let mut serializer = RdfSerializer::from_format(format.rdf_format());
        for (prefix, iri) in [
            ("ns", self.namespace.as_str()),
            ("rdf", RDF_NS),
            ("rdfs", RDFS_NS),
            ("owl", OWL_NS),
            ("xsd", XSD_NS),
        ] {
            serializer = serializer.with_prefix(prefix, iri).map_err(|e| ExportError::Iri {
                iri: iri.to_string(),
                message: e.to_string(),
            })?;
        }

        let mut out = serializer.for_writer(writer);
        for triple in &triples {
            out.serialize_triple(triple)
                .map_err(|e| ExportError::Io { source: e })?;
        }
        let writer = out.finish().map_err(|e| ExportError::Io { source: e })?;
        tracing::debug!(%format, triples = triples.len(), "graph serialized");
        Ok(writer)
    }

    /// Serialize `graph` to a file.
    pub fn write_file(&self, graph: &FilmGraph, format: GraphFormat, path: &Path) -> ExportResult<()> {
        let file = std::fs::File::create(path).map_err(|e| ExportError::Io { source: e })?;
        let mut writer = self.write(graph, format, std::io::BufWriter::new(file))?;
        writer.flush().map_err(|e| ExportError::Io { source: e })
    }
}

/// Serialize instance data under the default film namespace.
pub fn write_graph<W: Write>(
    graph: &FilmGraph,
    schema: &Schema,
    format: GraphFormat,
    writer: W,
) -> ExportResult<W> {
    RdfExporter::new(schema, crate::schema::FILM_NS).write(graph, format, writer)
}

/// Kind of object in an exported triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Entity,
    Class,
    Literal,
}

/// Exported triple with identifiers and values rendered as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripleExport {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub object_kind: ObjectKind,
    /// Literal datatype; absent for entities and classes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype: Option<LiteralType>,
}

impl From<&Triple> for TripleExport {
    fn from(t: &Triple) -> Self {
        let (object, object_kind, datatype) = match &t.object {
            Term::Entity(id) => (id.to_string(), ObjectKind::Entity, None),
            Term::Class(kind) => (kind.to_string(), ObjectKind::Class, None),
            Term::Literal(Literal::String(s)) => (s.clone(), ObjectKind::Literal, Some(LiteralType::String)),
            Term::Literal(Literal::Integer(n)) => (n.to_string(), ObjectKind::Literal, Some(LiteralType::Integer)),
        };
        Self {
            subject: t.subject.to_string(),
            predicate: t.predicate.to_string(),
            object,
            object_kind,
            datatype,
        }
    }
}

/// All triples of `graph` in export form.
pub fn export_triples(graph: &FilmGraph) -> Vec<TripleExport> {
    graph.triples().iter().map(TripleExport::from).collect()
}

/// Pretty-printed JSON array of the graph's triples.
pub fn to_json(graph: &FilmGraph) -> ExportResult<String> {
    serde_json::to_string_pretty(&export_triples(graph)).map_err(|e| ExportError::Json {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FILM_NS;

    fn sample_graph() -> FilmGraph {
        let alien = EntityId::new(EntityKind::Film, "Alien");
        let scott = EntityId::new(EntityKind::Director, "Ridley_Scott");
        let mut g = FilmGraph::new();
        g.insert(Triple::type_of(alien.clone()));
        g.insert(Triple::string(alien.clone(), Predicate::Title, "Alien"));
        g.insert(Triple::integer(alien.clone(), Predicate::ReleaseYear, 1979));
        g.insert(Triple::type_of(scott.clone()));
        g.insert(Triple::string(scott.clone(), Predicate::Name, "Ridley Scott"));
        g.insert(Triple::relation(alien, Predicate::DirectedBy, scott));
        g
    }

    fn exporter() -> RdfExporter<'static> {
        RdfExporter::new(Schema::film(), FILM_NS)
    }

    #[test]
    fn iris_use_namespace_and_wire_names() {
        let ex = exporter();
        let director = EntityId::new(EntityKind::Director, "Ridley_Scott");
        assert_eq!(
            ex.entity_iri(&director).unwrap().as_str(),
            "http://example.org/film#Director_Ridley_Scott"
        );
        assert_eq!(
            ex.class_iri(EntityKind::Actor).unwrap().as_str(),
            "http://example.org/film#Acteur"
        );
        assert_eq!(
            ex.predicate_iri(Predicate::Title).unwrap().as_str(),
            "http://example.org/film#titre"
        );
        assert_eq!(
            ex.predicate_iri(Predicate::Type).unwrap().as_str(),
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#type"
        );
    }

    #[test]
    fn invalid_namespace_is_reported() {
        let ex = RdfExporter::new(Schema::film(), "not an iri ");
        let err = ex.entity_iri(&EntityId::new(EntityKind::Film, "Alien")).unwrap_err();
        assert!(matches!(err, ExportError::Iri { .. }));
    }

    #[test]
    fn ontology_declarations() {
        let triples = exporter().ontology_triples().unwrap();
        // 4 classes × 3 + 3 object properties × 4 + 4 datatype properties × 3 + 3 single domains
        assert_eq!(triples.len(), 12 + 12 + 12 + 3);
    }

    #[test]
    fn ntriples_output() {
        let graph = sample_graph();
        let bytes = exporter().write(&graph, GraphFormat::NTriples, Vec::new()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), graph.len());
        assert!(text.contains(
            "<http://example.org/film#Film_Alien> <http://example.org/film#releaseYear> \"1979\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        ));
        assert!(text.contains(
            "<http://example.org/film#Film_Alien> <http://example.org/film#directedBy> <http://example.org/film#Director_Ridley_Scott>"
        ));
    }

    #[test]
    fn turtle_output_with_ontology() {
        let graph = sample_graph();
        let bytes = exporter()
            .with_ontology(true)
            .write(&graph, GraphFormat::Turtle, Vec::new())
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("@prefix ns: <http://example.org/film#>"));
        assert!(text.contains("Réalisateur"));
        assert!(text.contains("Film_Alien"));
    }

    #[test]
    fn rdfxml_output() {
        let bytes = exporter()
            .write(&sample_graph(), GraphFormat::RdfXml, Vec::new())
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("rdf:RDF"));
        assert!(text.contains("Ridley Scott"));
    }

    #[test]
    fn write_file_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("films.ttl");
        exporter()
            .write_file(&sample_graph(), GraphFormat::Turtle, &path)
            .unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Ridley Scott"));
    }

    #[test]
    fn json_export() {
        let graph = sample_graph();
        let exported = export_triples(&graph);
        assert_eq!(exported.len(), graph.len());
        let year = exported
            .iter()
            .find(|t| t.predicate == "releaseYear")
            .unwrap();
        assert_eq!(year.object, "1979");
        assert_eq!(year.datatype, Some(LiteralType::Integer));

        let json = to_json(&graph).unwrap();
        let parsed: Vec<TripleExport> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, exported);
    }

    #[test]
    fn format_extensions() {
        assert_eq!(GraphFormat::Turtle.extension(), "ttl");
        assert_eq!(GraphFormat::NTriples.extension(), "nt");
        assert_eq!(GraphFormat::RdfXml.extension(), "owl");
    }
}
