//! Vocabularies from a remote SPARQL endpoint, queried with blocking HTTP requests.
use super::VocabSource;
use crate::error::SourceError;
use crate::hierarchy::HierarchyRow;
use crate::ns;
use crate::resource::{pick_literal, ConceptRef, Property, Value, LABEL_PREDICATES};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::{Duration, Instant};

const PREFIXES: &str = "PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
PREFIX dcterms: <http://purl.org/dc/terms/>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
";
/// IRIs per VALUES block when asking for labels.
const LABEL_BATCH: usize = 200;

/// One bound variable of a result row.
#[derive(Debug, Clone, Deserialize)]
struct Binding {
    #[serde(rename = "type")]
    kind: String,
    value: String,
    #[serde(rename = "xml:lang")]
    lang: Option<String>,
}

type Row = HashMap<String, Binding>;

#[derive(Deserialize)]
struct Results {
    bindings: Vec<Row>,
}

#[derive(Deserialize)]
struct Response {
    results: Results,
}

impl Binding {
    fn value(&self) -> Option<Value> {
        match self.kind.as_str() {
            "uri" => Some(Value::Iri(self.value.clone())),
            "literal" | "typed-literal" => Some(Value::Literal { text: self.value.clone(), lang: self.lang.clone() }),
            _ => None,
        }
    }
}

fn uri_of(row: &Row, var: &str) -> Option<String> {
    row.get(var).filter(|b| b.kind == "uri").map(|b| b.value.clone())
}

/// Parses a SPARQL 1.1 JSON results document into its rows.
fn parse_results(endpoint: &str, body: &str) -> Result<Vec<Row>, SourceError> {
    serde_json::from_str::<Response>(body).map(|r| r.results.bindings).map_err(|source| SourceError::Results { endpoint: endpoint.to_owned(), source })
}

/// `<iri>` for use in a query, None if the string could break out of the IRI reference.
fn iri_ref(uri: &str) -> Option<String> {
    if uri.is_empty() || uri.chars().any(|c| c.is_whitespace() || c.is_control() || "<>\"{}|^`\\".contains(c)) {
        return None;
    }
    Some(format!("<{uri}>"))
}

/// Language tag reduced to the characters a tag may contain.
fn lang_tag(lang: &str) -> String {
    lang.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '-').collect()
}

/// A hierarchy row, None if a required variable is missing or malformed.
fn hierarchy_row(row: &Row) -> Option<HierarchyRow> {
    let length = row.get("length")?.value.parse::<u32>().ok()?;
    let concept = uri_of(row, "c")?;
    let label = row.get("pl").map_or_else(|| ns::suffix(&concept).to_owned(), |b| b.value.clone());
    Some(HierarchyRow::new(length, concept, label, uri_of(row, "parent")))
}

fn hierarchy_query(scheme: &str, lang: &str) -> String {
    format!(
        "{PREFIXES}SELECT (COUNT(?mid) AS ?length) ?c ?pl ?parent
WHERE {{
  ?cs (skos:hasTopConcept|^skos:topConceptOf|skos:narrower|^skos:broader)* ?mid .
  ?mid (skos:hasTopConcept|^skos:topConceptOf|skos:narrower|^skos:broader)+ ?c .
  ?c (skos:topConceptOf|^skos:hasTopConcept|skos:broader|^skos:narrower) ?parent .
  OPTIONAL {{ ?c skos:prefLabel ?pl . FILTER(LANG(?pl) = \"{lang}\" || LANG(?pl) = \"\") }}
  FILTER(?cs = {scheme})
}}
GROUP BY ?c ?pl ?parent
ORDER BY ?length ?parent ?pl",
        lang = lang_tag(lang)
    )
}

pub struct SparqlSource {
    endpoint: String,
    agent: ureq::Agent,
}

impl SparqlSource {
    pub fn new(endpoint: &str) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(Duration::from_secs(60)).build();
        SparqlSource { endpoint: endpoint.to_owned(), agent }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn select(&self, query: &str) -> Result<Vec<Row>, SourceError> {
        let t = Instant::now();
        log::trace!("{query}");
        let request_error = |reason: String| SourceError::Request { endpoint: self.endpoint.clone(), reason };
        let body = self
            .agent
            .get(&self.endpoint)
            .query("query", query)
            .set("Accept", "application/sparql-results+json")
            .call()
            .map_err(|e| request_error(e.to_string()))?
            .into_string()
            .map_err(|e| request_error(e.to_string()))?;
        let rows = parse_results(&self.endpoint, &body)?;
        log::debug!("{} rows from {} in {:?}", rows.len(), self.endpoint, t.elapsed());
        Ok(rows)
    }

    /// Bound IRIs of `var` without duplicates.
    fn select_uris(&self, query: &str, var: &str) -> Result<Vec<String>, SourceError> {
        let uris: BTreeSet<String> = self.select(query)?.iter().filter_map(|row| uri_of(row, var)).collect();
        Ok(uris.into_iter().collect())
    }

    /// Label properties of the given IRIs.
    fn label_properties(&self, uris: &[&str]) -> Result<BTreeMap<String, Vec<Property>>, SourceError> {
        let mut labels: BTreeMap<String, Vec<Property>> = BTreeMap::new();
        let refs: Vec<String> = uris.iter().filter_map(|u| iri_ref(u)).collect();
        for batch in refs.chunks(LABEL_BATCH) {
            let query = format!("{PREFIXES}SELECT ?s ?p ?label WHERE {{ VALUES ?s {{ {} }} VALUES ?p {{ skos:prefLabel dcterms:title rdfs:label }} ?s ?p ?label }}", batch.join(" "));
            for row in self.select(&query)? {
                if let (Some(s), Some(p), Some(label)) = (uri_of(&row, "s"), uri_of(&row, "p"), row.get("label").and_then(Binding::value)) {
                    labels.entry(s).or_default().push(Property::new(p, label));
                }
            }
        }
        Ok(labels)
    }

    fn refs(&self, uris: &[String], lang: &str) -> Result<Vec<ConceptRef>, SourceError> {
        let borrowed: Vec<&str> = uris.iter().map(String::as_str).collect();
        let mut labels = self.labels(&borrowed, lang)?;
        let mut refs: Vec<ConceptRef> = uris
            .iter()
            .map(|uri| ConceptRef { label: labels.remove(uri).unwrap_or_else(|| ns::suffix(uri).to_owned()), uri: uri.clone() })
            .collect();
        refs.sort();
        Ok(refs)
    }
}

impl VocabSource for SparqlSource {
    fn schemes(&self, lang: &str) -> Result<Vec<ConceptRef>, SourceError> {
        let uris = self.select_uris(&format!("{PREFIXES}SELECT DISTINCT ?s WHERE {{ ?s a skos:ConceptScheme }}"), "s")?;
        let borrowed: Vec<&str> = uris.iter().map(String::as_str).collect();
        let mut labels = self.labels(&borrowed, lang)?;
        Ok(uris.into_iter().map(|uri| ConceptRef { label: labels.remove(&uri).unwrap_or_else(|| ns::suffix(&uri).to_owned()), uri }).collect())
    }

    fn describe(&self, uri: &str) -> Result<Vec<Property>, SourceError> {
        let Some(subject) = iri_ref(uri) else { return Ok(Vec::new()) };
        let mut properties: Vec<Property> = self
            .select(&format!("SELECT ?p ?o WHERE {{ {subject} ?p ?o }}"))?
            .iter()
            .filter_map(|row| Some(Property::new(uri_of(row, "p")?, row.get("o")?.value()?)))
            .collect();
        properties.sort_by(|a, b| (&a.predicate, a.value.text(), a.value.lang()).cmp(&(&b.predicate, b.value.text(), b.value.lang())));
        properties.dedup();
        Ok(properties)
    }

    fn subjects(&self, predicate: &str, object: &str) -> Result<Vec<String>, SourceError> {
        let (Some(p), Some(o)) = (iri_ref(predicate), iri_ref(object)) else { return Ok(Vec::new()) };
        self.select_uris(&format!("SELECT DISTINCT ?s WHERE {{ ?s {p} {o} }}"), "s")
    }

    fn labels(&self, uris: &[&str], lang: &str) -> Result<HashMap<String, String>, SourceError> {
        Ok(self
            .label_properties(uris)?
            .into_iter()
            .filter_map(|(uri, props)| pick_literal(&props, &LABEL_PREDICATES, lang).map(str::to_owned).map(|l| (uri, l)))
            .collect())
    }

    fn concepts_in(&self, scheme: &str, lang: &str) -> Result<Vec<ConceptRef>, SourceError> {
        let Some(s) = iri_ref(scheme) else { return Ok(Vec::new()) };
        let mut uris: BTreeSet<String> = self.select_uris(&format!("{PREFIXES}SELECT DISTINCT ?c WHERE {{ ?c skos:inScheme {s} }}"), "c")?.into_iter().collect();
        uris.extend(self.hierarchy_rows(scheme, lang)?.into_iter().map(|r| r.concept_uri));
        self.refs(&uris.into_iter().collect::<Vec<_>>(), lang)
    }

    fn collections_in(&self, scheme: &str, lang: &str) -> Result<Vec<ConceptRef>, SourceError> {
        let Some(s) = iri_ref(scheme) else { return Ok(Vec::new()) };
        let query = format!(
            "{PREFIXES}SELECT DISTINCT ?c WHERE {{
  VALUES ?t {{ skos:Collection skos:OrderedCollection }}
  ?c a ?t .
  {{ ?c skos:inScheme {s} }} UNION {{ ?c skos:member ?m . ?m skos:inScheme {s} }}
}}"
        );
        let uris = self.select_uris(&query, "c")?;
        self.refs(&uris, lang)
    }

    fn hierarchy_rows(&self, scheme: &str, lang: &str) -> Result<Vec<HierarchyRow>, SourceError> {
        let Some(s) = iri_ref(scheme) else { return Ok(Vec::new()) };
        let rows = self.select(&hierarchy_query(&s, lang))?;
        let typed: Vec<HierarchyRow> = rows.iter().filter_map(hierarchy_row).collect();
        if typed.len() < rows.len() {
            log::warn!("{} incomplete hierarchy rows for {scheme} from {} ignored", rows.len() - typed.len(), self.endpoint);
        }
        Ok(typed)
    }
}
