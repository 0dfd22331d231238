//! Vocabularies from a local RDF Turtle file, optionally zstd compressed.
use super::VocabSource;
use crate::error::SourceError;
use crate::hierarchy::HierarchyRow;
use crate::ns::{self, skos, RDF_TYPE};
use crate::resource::{iris, pick_literal, ConceptRef, Property, Value, LABEL_PREDICATES};
use multimap::MultiMap;
use sophia::api::graph::Graph;
use sophia::api::source::TripleSource;
use sophia::api::term::{Term, TermKind};
use sophia::api::triple::Triple;
use sophia::inmem::graph::FastGraph;
use sophia::turtle::parser::turtle;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::Instant;

/// Triples indexed by subject and by object IRI.
pub struct FileSource {
    path: String,
    by_subject: MultiMap<String, Property>,
    /// object IRI -> (predicate, subject)
    by_object: MultiMap<String, (String, String)>,
    triples: usize,
}

fn value<T: Term>(term: T) -> Option<Value> {
    match term.kind() {
        TermKind::Iri => term.iri().map(|iri| Value::Iri(iri.as_str().to_owned())),
        TermKind::Literal => {
            term.lexical_form().map(|text| Value::Literal { text: text.to_string(), lang: term.language_tag().map(|l| l.as_str().to_owned()) })
        }
        // blank nodes, quoted triples and variables are not shown
        _ => None,
    }
}

impl FileSource {
    /// Loads the file at the given path. Files ending in ".zst" are decompressed first.
    pub fn load(path: &str) -> Result<Self, SourceError> {
        let t = Instant::now();
        let file = File::open(path).map_err(|source| SourceError::Io { path: path.to_owned(), source })?;
        let reader: Box<dyn BufRead> = if path.ends_with(".zst") {
            let decoder = zstd::stream::read::Decoder::new(file).map_err(|source| SourceError::Io { path: path.to_owned(), source })?;
            Box::new(BufReader::new(decoder))
        } else {
            Box::new(BufReader::new(file))
        };
        let graph: FastGraph =
            turtle::parse_bufread(reader).collect_triples().map_err(|e| SourceError::Parse { path: path.to_owned(), reason: e.to_string() })?;
        let source = Self::from_graph(path, &graph);
        log::debug!("~ {} triples loaded from {path} in {:?}", source.triples, t.elapsed());
        Ok(source)
    }

    /// Parses Turtle from a string, `name` is only used in messages.
    pub fn from_turtle(name: &str, turtle: &str) -> Result<Self, SourceError> {
        let graph: FastGraph =
            turtle::parse_str(turtle).collect_triples().map_err(|e| SourceError::Parse { path: name.to_owned(), reason: e.to_string() })?;
        Ok(Self::from_graph(name, &graph))
    }

    fn from_graph(path: &str, graph: &FastGraph) -> Self {
        let mut by_subject = MultiMap::new();
        let mut by_object = MultiMap::new();
        let mut triples = 0;
        // the in-memory graph never fails
        for t in graph.triples().flatten() {
            triples += 1;
            let (Some(Value::Iri(subject)), Some(Value::Iri(predicate)), Some(object)) = (value(t.s()), value(t.p()), value(t.o())) else {
                continue;
            };
            if let Value::Iri(o) = &object {
                by_object.insert(o.clone(), (predicate.clone(), subject.clone()));
            }
            by_subject.insert(subject, Property::new(predicate, object));
        }
        FileSource { path: path.to_owned(), by_subject, by_object, triples }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn properties(&self, uri: &str) -> &[Property] {
        self.by_subject.get_vec(uri).map(Vec::as_slice).unwrap_or_default()
    }

    /// Subjects of (s, predicate, object) in order of appearance.
    fn subjects_of<'a>(&'a self, predicate: &'a str, object: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.by_object.get_vec(object).into_iter().flatten().filter(move |(p, _)| p == predicate).map(|(_, s)| s.as_str())
    }

    fn label(&self, uri: &str, lang: &str) -> String {
        pick_literal(self.properties(uri), &LABEL_PREDICATES, lang).unwrap_or_else(|| ns::suffix(uri)).to_owned()
    }

    /// Direct narrower concepts, stated either way round, without duplicates.
    fn children(&self, uri: &str) -> Vec<String> {
        let mut children: Vec<String> = iris(self.properties(uri), skos::NARROWER).map(str::to_owned).collect();
        for s in self.subjects_of(skos::BROADER, uri) {
            if !children.iter().any(|c| c == s) {
                children.push(s.to_owned());
            }
        }
        children
    }

    fn top_concepts(&self, scheme: &str) -> Vec<String> {
        let mut top: Vec<String> = iris(self.properties(scheme), skos::HAS_TOP_CONCEPT).map(str::to_owned).collect();
        for s in self.subjects_of(skos::TOP_CONCEPT_OF, scheme) {
            if !top.iter().any(|c| c == s) {
                top.push(s.to_owned());
            }
        }
        top
    }

    fn refs(&self, uris: impl IntoIterator<Item = String>, lang: &str) -> Vec<ConceptRef> {
        let mut refs: Vec<ConceptRef> = uris.into_iter().map(|uri| ConceptRef { label: self.label(&uri, lang), uri }).collect();
        refs.sort();
        refs
    }
}

impl VocabSource for FileSource {
    fn schemes(&self, lang: &str) -> Result<Vec<ConceptRef>, SourceError> {
        let schemes: BTreeSet<String> = self.subjects_of(RDF_TYPE, skos::CONCEPT_SCHEME).map(str::to_owned).collect();
        Ok(schemes.into_iter().map(|uri| ConceptRef { label: self.label(&uri, lang), uri }).collect())
    }

    fn describe(&self, uri: &str) -> Result<Vec<Property>, SourceError> {
        let mut properties = self.properties(uri).to_vec();
        properties.sort_by(|a, b| (&a.predicate, a.value.text(), a.value.lang()).cmp(&(&b.predicate, b.value.text(), b.value.lang())));
        properties.dedup();
        Ok(properties)
    }

    fn subjects(&self, predicate: &str, object: &str) -> Result<Vec<String>, SourceError> {
        Ok(self.subjects_of(predicate, object).map(str::to_owned).collect())
    }

    fn labels(&self, uris: &[&str], lang: &str) -> Result<HashMap<String, String>, SourceError> {
        Ok(uris
            .iter()
            .filter_map(|uri| pick_literal(self.properties(uri), &LABEL_PREDICATES, lang).map(|l| ((*uri).to_owned(), l.to_owned())))
            .collect())
    }

    /// Concepts in the scheme, top concepts of it and everything below those.
    fn concepts_in(&self, scheme: &str, lang: &str) -> Result<Vec<ConceptRef>, SourceError> {
        let mut uris: BTreeSet<String> = self.subjects_of(skos::IN_SCHEME, scheme).map(str::to_owned).collect();
        uris.extend(self.hierarchy_rows(scheme, lang)?.into_iter().map(|r| r.concept_uri));
        Ok(self.refs(uris, lang))
    }

    fn collections_in(&self, scheme: &str, lang: &str) -> Result<Vec<ConceptRef>, SourceError> {
        let concepts: HashSet<String> = self.concepts_in(scheme, lang)?.into_iter().map(|c| c.uri).collect();
        let mut collections: BTreeSet<String> = BTreeSet::new();
        for class in [skos::COLLECTION, skos::ORDERED_COLLECTION] {
            for c in self.subjects_of(RDF_TYPE, class) {
                let props = self.properties(c);
                if iris(props, skos::IN_SCHEME).any(|s| s == scheme) || iris(props, skos::MEMBER).any(|m| concepts.contains(m)) {
                    collections.insert(c.to_owned());
                }
            }
        }
        Ok(self.refs(collections, lang))
    }

    /// Breadth-first walk from the scheme. The rows are sorted by length, parent and label
    /// like the results of the aggregate query of SPARQL endpoints.
    fn hierarchy_rows(&self, scheme: &str, lang: &str) -> Result<Vec<HierarchyRow>, SourceError> {
        let mut rows = Vec::new();
        let mut visited = HashSet::<String>::new();
        let mut level: Vec<(String, String)> = self.top_concepts(scheme).into_iter().map(|c| (c, scheme.to_owned())).collect();
        let mut length = 1;
        while !level.is_empty() {
            let mut batch = Vec::new();
            let mut next = Vec::new();
            for (concept, parent) in level {
                if !visited.insert(concept.clone()) {
                    continue;
                }
                for child in self.children(&concept) {
                    next.push((child, concept.clone()));
                }
                batch.push(HierarchyRow::new(length, concept.as_str(), self.label(&concept, lang), Some(parent)));
            }
            batch.sort_by(|a, b| (&a.parent_uri, &a.pref_label).cmp(&(&b.parent_uri, &b.pref_label)));
            rows.extend(batch);
            level = next;
            length += 1;
        }
        Ok(rows)
    }

    fn triple_count(&self) -> Option<usize> {
        Some(self.triples)
    }
}
