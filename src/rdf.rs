//! Small in-memory RDF graphs of rendered resources and their serialization.
#![allow(rustdoc::bare_urls)]
use crate::error::RenderError;
use crate::ns::{PREFIXES, RDF_TYPE, XSD_STRING};
use crate::profile::media;
use crate::resource::Value;
use serde_json::{json, Map, Value as Json};
use sophia::api::prefix::Prefix;
use sophia::api::serializer::{Stringifier, TripleSerializer};
use sophia::api::term::{BnodeId, IriRef, LanguageTag, SimpleTerm};
use sophia::api::MownStr;
use sophia::iri::Iri;
use sophia::turtle::serializer::nt::NtSerializer;
use sophia::turtle::serializer::turtle::{TurtleConfig, TurtleSerializer};
#[cfg(feature = "rdfxml")]
use sophia::xml::serializer::RdfXmlSerializer;

/// RDF serializations offered to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    Turtle,
    NTriples,
    RdfXml,
    JsonLd,
    /// Written as Turtle, which is a subset of Notation3.
    N3,
}

impl RdfFormat {
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            media::TURTLE => Some(RdfFormat::Turtle),
            media::N_TRIPLES => Some(RdfFormat::NTriples),
            media::RDF_XML => Some(RdfFormat::RdfXml),
            media::JSON_LD => Some(RdfFormat::JsonLd),
            media::N3 => Some(RdfFormat::N3),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Iri(String),
    Blank(String),
    Literal { text: String, lang: Option<String> },
}

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        match value {
            Value::Iri(iri) => Node::Iri(iri.clone()),
            Value::Literal { text, lang } => Node::Literal { text: text.clone(), lang: lang.clone() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub subject: Node,
    pub predicate: String,
    pub object: Node,
}

/// Triples in insertion order. Serializations only depend on this order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GraphBuilder {
    statements: Vec<Statement>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, subject: Node, predicate: &str, object: Node) -> &mut Self {
        let statement = Statement { subject, predicate: predicate.to_owned(), object };
        // graphs are sets
        if !self.statements.contains(&statement) {
            self.statements.push(statement);
        }
        self
    }

    pub fn iri(&mut self, subject: &str, predicate: &str, object: &str) -> &mut Self {
        self.add(Node::Iri(subject.to_owned()), predicate, Node::Iri(object.to_owned()))
    }

    pub fn literal(&mut self, subject: &str, predicate: &str, text: &str, lang: Option<&str>) -> &mut Self {
        self.add(Node::Iri(subject.to_owned()), predicate, Node::Literal { text: text.to_owned(), lang: lang.map(str::to_owned) })
    }

    pub fn value(&mut self, subject: &str, predicate: &str, value: &Value) -> &mut Self {
        self.add(Node::Iri(subject.to_owned()), predicate, value.into())
    }

    pub fn typed(&mut self, subject: &str, class: &str) -> &mut Self {
        self.iri(subject, RDF_TYPE, class)
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn serialize(&self, format: RdfFormat) -> Result<String, RenderError> {
        match format {
            RdfFormat::Turtle | RdfFormat::N3 => self.serialize_turtle(),
            RdfFormat::NTriples => self.serialize_nt(),
            RdfFormat::RdfXml => self.serialize_rdfxml(),
            RdfFormat::JsonLd => Ok(serde_json::to_string_pretty(&self.to_json_ld())?),
        }
    }

    fn sophia_triples(&self) -> Vec<[SimpleTerm<'_>; 3]> {
        self.statements.iter().map(|s| [term(&s.subject), iri_term(&s.predicate), term(&s.object)]).collect()
    }

    /// Turtle using the known prefixes.
    fn serialize_turtle(&self) -> Result<String, RenderError> {
        let prefixes = PREFIXES.iter().map(|(p, iri)| (Prefix::new_unchecked(Box::from(*p)), Iri::new_unchecked(Box::from(*iri)))).collect();
        let config = TurtleConfig::new().with_pretty(true).with_own_prefix_map(prefixes);
        Ok(TurtleSerializer::new_stringifier_with_config(config)
            .serialize_graph(&self.sophia_triples())
            .map_err(|e| RenderError::Serialize(e.to_string()))?
            .to_string())
    }

    fn serialize_nt(&self) -> Result<String, RenderError> {
        Ok(NtSerializer::new_stringifier().serialize_graph(&self.sophia_triples()).map_err(|e| RenderError::Serialize(e.to_string()))?.to_string())
    }

    #[cfg(feature = "rdfxml")]
    fn serialize_rdfxml(&self) -> Result<String, RenderError> {
        Ok(RdfXmlSerializer::new_stringifier().serialize_graph(&self.sophia_triples()).map_err(|e| RenderError::Serialize(e.to_string()))?.to_string())
    }

    #[cfg(not(feature = "rdfxml"))]
    fn serialize_rdfxml(&self) -> Result<String, RenderError> {
        Err(RenderError::Serialize("RDF/XML support is not enabled, compile with feature rdfxml".to_owned()))
    }

    /// Expanded JSON-LD with one node object per subject in order of first appearance.
    pub fn to_json_ld(&self) -> Json {
        let mut nodes: Vec<(String, Map<String, Json>)> = Vec::new();
        for s in &self.statements {
            let id = match &s.subject {
                Node::Iri(iri) => iri.clone(),
                Node::Blank(b) => format!("_:{b}"),
                // literals are never subjects
                Node::Literal { .. } => continue,
            };
            let index = match nodes.iter().position(|(i, _)| *i == id) {
                Some(index) => index,
                None => {
                    let mut node = Map::new();
                    node.insert("@id".to_owned(), json!(id));
                    nodes.push((id, node));
                    nodes.len() - 1
                }
            };
            let node = &mut nodes[index].1;
            let (key, object) = match (&s.object, s.predicate.as_str()) {
                (Node::Iri(o), RDF_TYPE) => ("@type".to_owned(), json!(o)),
                (Node::Iri(o), _) => (s.predicate.clone(), json!({"@id": o})),
                (Node::Blank(b), _) => (s.predicate.clone(), json!({"@id": format!("_:{b}")})),
                (Node::Literal { text, lang: Some(lang) }, _) => (s.predicate.clone(), json!({"@value": text, "@language": lang})),
                (Node::Literal { text, lang: None }, _) => (s.predicate.clone(), json!({"@value": text})),
            };
            match node.get_mut(&key) {
                Some(Json::Array(values)) => values.push(object),
                _ => {
                    node.insert(key, json!([object]));
                }
            }
        }
        Json::Array(nodes.into_iter().map(|(_, node)| Json::Object(node)).collect())
    }
}

fn iri_term(iri: &str) -> SimpleTerm<'_> {
    SimpleTerm::Iri(IriRef::new_unchecked(MownStr::from(iri)))
}

fn term(node: &Node) -> SimpleTerm<'_> {
    match node {
        Node::Iri(iri) => iri_term(iri),
        Node::Blank(b) => SimpleTerm::BlankNode(BnodeId::new_unchecked(MownStr::from(b.as_str()))),
        Node::Literal { text, lang: Some(lang) } => SimpleTerm::LiteralLanguage(MownStr::from(text.as_str()), LanguageTag::new_unchecked(MownStr::from(lang.as_str()))),
        Node::Literal { text, lang: None } => SimpleTerm::LiteralDatatype(MownStr::from(text.as_str()), IriRef::new_unchecked(MownStr::from(XSD_STRING))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ns::skos;

    fn graph() -> GraphBuilder {
        let mut g = GraphBuilder::new();
        g.typed("http://x.org/voc", skos::CONCEPT_SCHEME)
            .literal("http://x.org/voc", skos::PREF_LABEL, "Animals", Some("en"))
            .literal("http://x.org/voc", skos::PREF_LABEL, "Animals", Some("en"))
            .iri("http://x.org/voc", skos::HAS_TOP_CONCEPT, "http://x.org/cat");
        g
    }

    #[test]
    fn test_set_semantics() {
        assert_eq!(graph().len(), 3);
    }

    #[test]
    fn test_format() {
        assert_eq!(RdfFormat::from_media_type(media::N3), Some(RdfFormat::N3));
        assert_eq!(RdfFormat::from_media_type(media::HTML), None);
    }

    #[test]
    fn test_nt() {
        let nt = graph().serialize(RdfFormat::NTriples).unwrap();
        assert!(nt.contains("<http://x.org/voc> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/2004/02/skos/core#ConceptScheme>"));
        assert!(nt.contains("\"Animals\"@en"));
        assert_eq!(nt.lines().filter(|l| !l.trim().is_empty()).count(), 3);
    }

    #[test]
    fn test_turtle_uses_prefixes() {
        let ttl = graph().serialize(RdfFormat::Turtle).unwrap();
        assert!(ttl.contains("skos:"));
        assert!(ttl.contains("Animals"));
    }

    #[test]
    fn test_json_ld() {
        let mut g = graph();
        g.add(Node::Blank("r0".into()), RDF_TYPE, Node::Iri("http://x.org/C".into()));
        let json = g.to_json_ld();
        let nodes = json.as_array().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0]["@id"], "http://x.org/voc");
        assert_eq!(nodes[0]["@type"], json!([skos::CONCEPT_SCHEME]));
        assert_eq!(nodes[0][skos::PREF_LABEL], json!([{"@value": "Animals", "@language": "en"}]));
        assert_eq!(nodes[0][skos::HAS_TOP_CONCEPT], json!([{"@id": "http://x.org/cat"}]));
        assert_eq!(nodes[1]["@id"], "_:r0");
    }

    #[test]
    fn test_deterministic() {
        for format in [RdfFormat::Turtle, RdfFormat::NTriples, RdfFormat::JsonLd] {
            assert_eq!(graph().serialize(format).unwrap(), graph().serialize(format).unwrap());
        }
    }
}
