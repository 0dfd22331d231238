//! Read-only snapshot of the known vocabularies, built once at startup and shared by all requests.
use crate::error::SourceError;
use crate::ns::{self, skos};
use crate::resource::{Collection, Concept, RegisterItem, RegisterListing, Resource};
use crate::source::Source;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabEntry {
    /// Short identifier used in URLs, unique within the cache.
    pub id: String,
    pub uri: String,
    pub title: String,
    source: usize,
}

pub struct VocabCache {
    sources: Vec<Source>,
    entries: Vec<VocabEntry>,
    language: String,
}

/// Last segment of the IRI, with a numeric suffix if already taken.
fn unique_id(uri: &str, taken: &[VocabEntry]) -> String {
    let base = ns::suffix(uri).to_owned();
    let mut id = base.clone();
    let mut n = 2;
    while taken.iter().any(|e| e.id == id) {
        id = format!("{base}-{n}");
        n += 1;
    }
    id
}

impl VocabCache {
    /// Collects the concept schemes of all sources. A failing source is logged and left out.
    pub fn build(sources: Vec<Source>, language: &str) -> Self {
        let mut entries: Vec<VocabEntry> = Vec::new();
        for (index, source) in sources.iter().enumerate() {
            match source.schemes(language) {
                Ok(schemes) => {
                    log::info!("{} vocabularies from {}", schemes.len(), source.name());
                    for scheme in schemes {
                        if entries.iter().any(|e| e.uri == scheme.uri) {
                            log::warn!("vocabulary {} from {} already loaded from another source", scheme.uri, source.name());
                            continue;
                        }
                        let id = unique_id(&scheme.uri, &entries);
                        entries.push(VocabEntry { id, uri: scheme.uri, title: scheme.label, source: index });
                    }
                }
                Err(e) => log::error!("Cannot list vocabularies of {}: {e}", source.name()),
            }
        }
        entries.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()).then_with(|| a.id.cmp(&b.id)));
        VocabCache { sources, entries, language: language.to_owned() }
    }

    pub fn lookup(&self, id: &str) -> Option<&VocabEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entries(&self) -> &[VocabEntry] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id.as_str()).collect()
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    fn source(&self, entry: &VocabEntry) -> &Source {
        &self.sources[entry.source]
    }

    /// Register of all vocabularies.
    pub fn register(&self, base: &str, title: &str) -> Resource {
        let items = self.entries.iter().map(|e| RegisterItem { uri: e.uri.clone(), label: e.title.clone(), path: format!("/vocab/{}", e.id) }).collect();
        Resource::RegisterListing(RegisterListing { uri: format!("{base}/"), label: title.to_owned(), item_class: skos::CONCEPT_SCHEME.to_owned(), items })
    }

    pub fn get_vocabulary(&self, id: &str) -> Result<Option<Resource>, SourceError> {
        match self.lookup(id) {
            Some(entry) => Ok(Some(Resource::Vocabulary(self.source(entry).get_vocabulary(entry, &self.language)?))),
            None => Ok(None),
        }
    }

    pub fn list_concepts(&self, id: &str, base: &str) -> Result<Option<Resource>, SourceError> {
        match self.lookup(id) {
            Some(entry) => Ok(Some(Resource::RegisterListing(self.source(entry).list_concepts(entry, base, &self.language)?))),
            None => Ok(None),
        }
    }

    /// Concept or collection of a vocabulary.
    pub fn get_object(&self, id: &str, uri: &str) -> Result<Option<Resource>, SourceError> {
        match self.lookup(id) {
            Some(entry) => self.source(entry).get_object(&entry.id, uri, &self.language),
            None => Ok(None),
        }
    }

    pub fn get_concept(&self, id: &str, uri: &str) -> Result<Option<Concept>, SourceError> {
        match self.lookup(id) {
            Some(entry) => self.source(entry).get_concept(&entry.id, uri, &self.language),
            None => Ok(None),
        }
    }

    pub fn get_collection(&self, id: &str, uri: &str) -> Result<Option<Collection>, SourceError> {
        match self.lookup(id) {
            Some(entry) => self.source(entry).get_collection(&entry.id, uri, &self.language),
            None => Ok(None),
        }
    }

    /// Number of triples held in memory by file sources.
    pub fn triple_count(&self) -> Option<usize> {
        self.sources.iter().filter_map(Source::triple_count).reduce(|a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FileSource;

    const TTL: &str = r#"
@prefix skos: <http://www.w3.org/2004/02/skos/core#> .
@prefix ex: <http://example.org/> .
ex:zoo a skos:ConceptScheme ; skos:prefLabel "Zoo"@en .
<http://example.org/a/animals> a skos:ConceptScheme ; skos:prefLabel "Animals"@en .
<http://example.org/b/animals> a skos:ConceptScheme ; skos:prefLabel "Animals"@en .
"#;

    fn cache() -> VocabCache {
        let file = FileSource::from_turtle("test.ttl", TTL).unwrap();
        VocabCache::build(vec![Source::File(file)], "en")
    }

    #[test]
    fn test_unique_ids() {
        let c = cache();
        let mut ids = c.ids();
        ids.sort();
        assert_eq!(ids, vec!["animals", "animals-2", "zoo"]);
        assert_eq!(c.entries()[2].title, "Zoo");
    }

    #[test]
    fn test_lookup() {
        let c = cache();
        assert_eq!(c.lookup("zoo").map(|e| e.uri.as_str()), Some("http://example.org/zoo"));
        assert!(c.lookup("nope").is_none());
        assert!(c.get_vocabulary("nope").unwrap().is_none());
        assert_eq!(c.triple_count(), Some(6));
    }

    #[test]
    fn test_register() {
        let c = cache();
        let Resource::RegisterListing(r) = c.register("http://localhost", "Vocabularies") else { panic!("not a register") };
        assert_eq!(r.uri, "http://localhost/");
        assert_eq!(r.items.len(), 3);
        assert!(r.items.iter().any(|i| i.path == "/vocab/zoo"));
    }

    #[test]
    fn test_concept_and_collection() {
        let ttl = r#"
@prefix skos: <http://www.w3.org/2004/02/skos/core#> .
<http://example.org/zoo> a skos:ConceptScheme ; skos:hasTopConcept <http://example.org/zoo/cat> .
<http://example.org/zoo/cat> a skos:Concept ; skos:prefLabel "cat"@en , "Katze"@de ; skos:broader <http://example.org/zoo/animal> .
<http://example.org/zoo/animal> skos:prefLabel "animal"@en .
<http://example.org/zoo/pets> a skos:Collection ; skos:member <http://example.org/zoo/cat> .
"#;
        let c = VocabCache::build(vec![Source::File(FileSource::from_turtle("zoo.ttl", ttl).unwrap())], "en");
        let concept = c.get_concept("zoo", "http://example.org/zoo/cat").unwrap().unwrap();
        assert_eq!(concept.pref_label, "cat");
        assert_eq!(concept.broader[0].label, "animal");
        let collection = c.get_collection("zoo", "http://example.org/zoo/pets").unwrap().unwrap();
        assert_eq!(collection.label, "pets");
        assert_eq!(collection.members.len(), 1);
        assert!(matches!(c.get_object("zoo", "http://example.org/zoo/pets").unwrap(), Some(Resource::Collection(_))));
        assert!(c.get_object("zoo", "http://example.org/zoo/none").unwrap().is_none());
    }
}
