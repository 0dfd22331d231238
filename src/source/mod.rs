//! Where vocabularies come from. Each kind of source answers a few primitive questions
//! and resources are assembled from those answers in the same way for all of them.
use crate::cache::VocabEntry;
use crate::config::{SourceConfig, SourceKind};
use crate::error::SourceError;
use crate::hierarchy::{build_hierarchy, concept_link, HierarchyRow};
use crate::ns::{self, dct, skos, RDF_TYPE};
use crate::resource::{iris, pick_literal, LABEL_PREDICATES, Collection, Concept, ConceptRef, Property, RegisterItem, RegisterListing, Resource, Vocabulary};
use std::collections::{HashMap, HashSet};

pub mod file;
pub mod sparql;

pub use file::FileSource;
pub use sparql::SparqlSource;

/// Primitive queries every source answers. Labels are chosen for the given language where possible.
pub trait VocabSource {
    /// All concept schemes with their labels.
    fn schemes(&self, lang: &str) -> Result<Vec<ConceptRef>, SourceError>;

    /// All (predicate, object) pairs with the IRI as subject. Empty if the IRI is unknown.
    fn describe(&self, uri: &str) -> Result<Vec<Property>, SourceError>;

    /// Subjects of the triples with the given predicate and object.
    fn subjects(&self, predicate: &str, object: &str) -> Result<Vec<String>, SourceError>;

    /// Labels of the given IRIs, missing for IRIs without one.
    fn labels(&self, uris: &[&str], lang: &str) -> Result<HashMap<String, String>, SourceError>;

    fn concepts_in(&self, scheme: &str, lang: &str) -> Result<Vec<ConceptRef>, SourceError>;

    fn collections_in(&self, scheme: &str, lang: &str) -> Result<Vec<ConceptRef>, SourceError>;

    /// Flat broader/narrower rows of the scheme with their path length from the scheme.
    fn hierarchy_rows(&self, scheme: &str, lang: &str) -> Result<Vec<HierarchyRow>, SourceError>;

    /// Number of triples held in memory, if the source holds any.
    fn triple_count(&self) -> Option<usize> {
        None
    }
}

pub enum Source {
    File(FileSource),
    Sparql(SparqlSource),
}

impl Source {
    pub fn from_config(config: &SourceConfig) -> Result<Self, SourceError> {
        match config.kind {
            SourceKind::File => {
                let path = config.path.as_deref().ok_or_else(|| SourceError::Config("file source without path".to_owned()))?;
                Ok(Source::File(FileSource::load(path)?))
            }
            SourceKind::Sparql => {
                let endpoint = config.endpoint.as_deref().ok_or_else(|| SourceError::Config("sparql source without endpoint".to_owned()))?;
                Ok(Source::Sparql(SparqlSource::new(endpoint)))
            }
        }
    }

    fn inner(&self) -> &dyn VocabSource {
        match self {
            Source::File(s) => s,
            Source::Sparql(s) => s,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Source::File(s) => s.path(),
            Source::Sparql(s) => s.endpoint(),
        }
    }

    pub fn schemes(&self, lang: &str) -> Result<Vec<ConceptRef>, SourceError> {
        self.inner().schemes(lang)
    }

    pub fn triple_count(&self) -> Option<usize> {
        self.inner().triple_count()
    }

    /// Labelled references to the given IRIs in label order, without duplicates.
    fn refs(&self, uris: Vec<String>, lang: &str) -> Result<Vec<ConceptRef>, SourceError> {
        let mut seen = HashSet::new();
        let uris: Vec<String> = uris.into_iter().filter(|u| seen.insert(u.clone())).collect();
        let borrowed: Vec<&str> = uris.iter().map(String::as_str).collect();
        let mut labels = self.inner().labels(&borrowed, lang)?;
        let mut refs: Vec<ConceptRef> = uris
            .into_iter()
            .map(|uri| {
                let label = labels.remove(&uri).unwrap_or_else(|| ns::suffix(&uri).to_owned());
                ConceptRef { label, uri }
            })
            .collect();
        refs.sort();
        Ok(refs)
    }

    /// IRIs linked by `predicate` from `uri` together with the IRIs linking to `uri` by `inverse`.
    fn linked(&self, properties: &[Property], uri: &str, predicate: &str, inverse: &str) -> Result<Vec<String>, SourceError> {
        let mut linked: Vec<String> = iris(properties, predicate).map(str::to_owned).collect();
        linked.extend(self.inner().subjects(inverse, uri)?);
        Ok(linked)
    }

    pub fn get_vocabulary(&self, entry: &VocabEntry, lang: &str) -> Result<Vocabulary, SourceError> {
        let source = self.inner();
        let properties = source.describe(&entry.uri)?;
        let top = self.linked(&properties, &entry.uri, skos::HAS_TOP_CONCEPT, skos::TOP_CONCEPT_OF)?;
        let rows = source.hierarchy_rows(&entry.uri, lang)?;
        log::debug!("{} hierarchy rows for {}", rows.len(), entry.uri);
        Ok(Vocabulary {
            id: entry.id.clone(),
            uri: entry.uri.clone(),
            title: pick_literal(&properties, &LABEL_PREDICATES, lang).unwrap_or(&entry.title).to_owned(),
            description: pick_literal(&properties, &[dct::DESCRIPTION, skos::DEFINITION], lang).map(str::to_owned),
            top_concepts: self.refs(top, lang)?,
            concepts: source.concepts_in(&entry.uri, lang)?,
            collections: source.collections_in(&entry.uri, lang)?,
            hierarchy: build_hierarchy(&rows, &entry.uri),
            properties,
        })
    }

    /// A concept or a collection, None if the source knows nothing about the IRI.
    pub fn get_object(&self, vocab_id: &str, uri: &str, lang: &str) -> Result<Option<Resource>, SourceError> {
        let properties = self.inner().describe(uri)?;
        if properties.is_empty() {
            return Ok(None);
        }
        let is_collection = iris(&properties, RDF_TYPE).any(|t| t == skos::COLLECTION || t == skos::ORDERED_COLLECTION);
        Ok(Some(if is_collection {
            Resource::Collection(self.collection(vocab_id, uri, properties, lang)?)
        } else {
            Resource::Concept(self.concept(vocab_id, uri, properties, lang)?)
        }))
    }

    pub fn get_concept(&self, vocab_id: &str, uri: &str, lang: &str) -> Result<Option<Concept>, SourceError> {
        let properties = self.inner().describe(uri)?;
        if properties.is_empty() {
            return Ok(None);
        }
        self.concept(vocab_id, uri, properties, lang).map(Some)
    }

    pub fn get_collection(&self, vocab_id: &str, uri: &str, lang: &str) -> Result<Option<Collection>, SourceError> {
        let properties = self.inner().describe(uri)?;
        if properties.is_empty() {
            return Ok(None);
        }
        self.collection(vocab_id, uri, properties, lang).map(Some)
    }

    fn concept(&self, vocab_id: &str, uri: &str, properties: Vec<Property>, lang: &str) -> Result<Concept, SourceError> {
        let broader = self.linked(&properties, uri, skos::BROADER, skos::NARROWER)?;
        let narrower = self.linked(&properties, uri, skos::NARROWER, skos::BROADER)?;
        Ok(Concept {
            vocab_id: vocab_id.to_owned(),
            uri: uri.to_owned(),
            pref_label: pick_literal(&properties, &LABEL_PREDICATES, lang).unwrap_or_else(|| ns::suffix(uri)).to_owned(),
            definition: pick_literal(&properties, &[skos::DEFINITION], lang).map(str::to_owned),
            broader: self.refs(broader, lang)?,
            narrower: self.refs(narrower, lang)?,
            properties,
        })
    }

    fn collection(&self, vocab_id: &str, uri: &str, properties: Vec<Property>, lang: &str) -> Result<Collection, SourceError> {
        let members = iris(&properties, skos::MEMBER).map(str::to_owned).collect();
        Ok(Collection {
            vocab_id: vocab_id.to_owned(),
            uri: uri.to_owned(),
            label: pick_literal(&properties, &LABEL_PREDICATES, lang).unwrap_or_else(|| ns::suffix(uri)).to_owned(),
            members: self.refs(members, lang)?,
            properties,
        })
    }

    /// Register of all concepts of a vocabulary. `base` is the server root used for the register IRI.
    pub fn list_concepts(&self, entry: &VocabEntry, base: &str, lang: &str) -> Result<RegisterListing, SourceError> {
        let items = self
            .inner()
            .concepts_in(&entry.uri, lang)?
            .into_iter()
            .map(|c| RegisterItem { path: concept_link("", &entry.id, &c.uri), uri: c.uri, label: c.label })
            .collect();
        Ok(RegisterListing {
            uri: format!("{base}/vocab/{}/concept/", entry.id),
            label: format!("Concepts of {}", entry.title),
            item_class: skos::CONCEPT.to_owned(),
            items,
        })
    }
}
