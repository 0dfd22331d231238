//! IRIs of the vocabularies used to describe and render resources.
#![allow(rustdoc::bare_urls)]

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

pub mod skos {
    pub const NS: &str = "http://www.w3.org/2004/02/skos/core#";
    pub const CONCEPT_SCHEME: &str = "http://www.w3.org/2004/02/skos/core#ConceptScheme";
    pub const CONCEPT: &str = "http://www.w3.org/2004/02/skos/core#Concept";
    pub const COLLECTION: &str = "http://www.w3.org/2004/02/skos/core#Collection";
    pub const ORDERED_COLLECTION: &str = "http://www.w3.org/2004/02/skos/core#OrderedCollection";
    pub const PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
    pub const ALT_LABEL: &str = "http://www.w3.org/2004/02/skos/core#altLabel";
    pub const DEFINITION: &str = "http://www.w3.org/2004/02/skos/core#definition";
    pub const BROADER: &str = "http://www.w3.org/2004/02/skos/core#broader";
    pub const NARROWER: &str = "http://www.w3.org/2004/02/skos/core#narrower";
    pub const HAS_TOP_CONCEPT: &str = "http://www.w3.org/2004/02/skos/core#hasTopConcept";
    pub const TOP_CONCEPT_OF: &str = "http://www.w3.org/2004/02/skos/core#topConceptOf";
    pub const IN_SCHEME: &str = "http://www.w3.org/2004/02/skos/core#inScheme";
    pub const MEMBER: &str = "http://www.w3.org/2004/02/skos/core#member";
}

pub mod dct {
    pub const NS: &str = "http://purl.org/dc/terms/";
    pub const TITLE: &str = "http://purl.org/dc/terms/title";
    pub const DESCRIPTION: &str = "http://purl.org/dc/terms/description";
    pub const CREATED: &str = "http://purl.org/dc/terms/created";
    pub const MODIFIED: &str = "http://purl.org/dc/terms/modified";
    pub const ISSUED: &str = "http://purl.org/dc/terms/issued";
    pub const CREATOR: &str = "http://purl.org/dc/terms/creator";
    pub const PUBLISHER: &str = "http://purl.org/dc/terms/publisher";
    pub const LICENSE: &str = "http://purl.org/dc/terms/license";
    pub const CONFORMS_TO: &str = "http://purl.org/dc/terms/conformsTo";
    pub const FORMAT: &str = "http://purl.org/dc/terms/format";
}

pub mod dcat {
    pub const NS: &str = "http://www.w3.org/ns/dcat#";
    pub const DATASET: &str = "http://www.w3.org/ns/dcat#Dataset";
    pub const KEYWORD: &str = "http://www.w3.org/ns/dcat#keyword";
    pub const THEME: &str = "http://www.w3.org/ns/dcat#theme";
}

pub mod reg {
    pub const NS: &str = "http://purl.org/linked-data/registry#";
    pub const REGISTER: &str = "http://purl.org/linked-data/registry#Register";
    pub const CONTAINED_ITEM_CLASS: &str = "http://purl.org/linked-data/registry#containedItemClass";
}

pub mod rdfs {
    pub const MEMBER: &str = "http://www.w3.org/2000/01/rdf-schema#member";
}

pub mod altr {
    pub const NS: &str = "http://www.w3.org/ns/dx/conneg/altr#";
    pub const HAS_REPRESENTATION: &str = "http://www.w3.org/ns/dx/conneg/altr#hasRepresentation";
    pub const REPRESENTATION: &str = "http://www.w3.org/ns/dx/conneg/altr#Representation";
    pub const HAS_DEFAULT_REPRESENTATION: &str = "http://www.w3.org/ns/dx/conneg/altr#hasDefaultRepresentation";
}

/// Prefixes used for Turtle output and for shortening predicates in HTML.
pub const PREFIXES: [(&str, &str); 9] = [
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("skos", skos::NS),
    ("dcterms", dct::NS),
    ("dcat", dcat::NS),
    ("reg", reg::NS),
    ("altr", altr::NS),
];

/// If the namespace is known, returns a prefixed name, for example "skos:prefLabel".
/// Otherwise, returns the full IRI.
pub fn prefixed(iri: &str) -> String {
    for (prefix, ns) in PREFIXES {
        if let Some(local) = iri.strip_prefix(ns) {
            if !local.is_empty() && !local.contains(['/', '#']) {
                return format!("{prefix}:{local}");
            }
        }
    }
    iri.to_owned()
}

/// Last path or fragment segment of an IRI, for example "Concept" for skos:Concept.
pub fn suffix(iri: &str) -> &str {
    let trimmed = iri.trim_end_matches(['/', '#']);
    trimmed.rsplit(['/', '#']).next().filter(|s| !s.is_empty()).unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed() {
        assert_eq!(prefixed(skos::PREF_LABEL), "skos:prefLabel");
        assert_eq!(prefixed("http://purl.org/dc/terms/"), "http://purl.org/dc/terms/");
        assert_eq!(prefixed("http://example.org/x"), "http://example.org/x");
    }

    #[test]
    fn test_suffix() {
        assert_eq!(suffix(skos::CONCEPT), "Concept");
        assert_eq!(suffix("http://example.org/voc/animals/"), "animals");
        assert_eq!(suffix("urn:x"), "urn:x");
    }
}
