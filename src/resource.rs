//! The resources a vocabulary server answers with. They are assembled per request and dropped afterwards.
use crate::hierarchy::HierarchyNode;
use crate::ns::{dct, reg, skos, RDFS_LABEL};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Iri(String),
    Literal { text: String, lang: Option<String> },
}

impl Value {
    pub fn literal(text: impl Into<String>, lang: Option<&str>) -> Self {
        Value::Literal { text: text.into(), lang: lang.map(str::to_owned) }
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Value::Iri(iri) => Some(iri),
            Value::Literal { .. } => None,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Value::Iri(iri) => iri,
            Value::Literal { text, .. } => text,
        }
    }

    pub fn lang(&self) -> Option<&str> {
        match self {
            Value::Literal { lang, .. } => lang.as_deref(),
            Value::Iri(_) => None,
        }
    }
}

/// A (predicate, object) pair of the resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    pub predicate: String,
    pub value: Value,
}

impl Property {
    pub fn new(predicate: impl Into<String>, value: Value) -> Self {
        Property { predicate: predicate.into(), value }
    }
}

/// Predicates that give a human readable name, in order of preference.
pub const LABEL_PREDICATES: [&str; 3] = [skos::PREF_LABEL, dct::TITLE, RDFS_LABEL];

/// The first literal of the given predicates, tried in order.
/// Within a predicate, prefers the language, then untagged literals, then any other language.
pub fn pick_literal<'a>(properties: &'a [Property], predicates: &[&str], lang: &str) -> Option<&'a str> {
    for predicate in predicates {
        let literals: Vec<&Value> =
            properties.iter().filter(|p| p.predicate == *predicate).map(|p| &p.value).filter(|v| matches!(v, Value::Literal { .. })).collect();
        let best = literals
            .iter()
            .find(|v| v.lang().is_some_and(|l| l.eq_ignore_ascii_case(lang)))
            .or_else(|| literals.iter().find(|v| v.lang().is_none()))
            .or_else(|| literals.first())
            .copied();
        if let Some(v) = best {
            return Some(v.text());
        }
    }
    None
}

/// All IRI values of a predicate in order of appearance.
pub fn iris<'a>(properties: &'a [Property], predicate: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    properties.iter().filter(move |p| p.predicate == predicate).filter_map(|p| p.value.as_iri())
}

/// A link target with its display label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ConceptRef {
    pub label: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub id: String,
    pub uri: String,
    pub title: String,
    pub description: Option<String>,
    pub properties: Vec<Property>,
    pub top_concepts: Vec<ConceptRef>,
    pub concepts: Vec<ConceptRef>,
    pub collections: Vec<ConceptRef>,
    pub hierarchy: Vec<HierarchyNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concept {
    pub vocab_id: String,
    pub uri: String,
    pub pref_label: String,
    pub definition: Option<String>,
    pub properties: Vec<Property>,
    pub broader: Vec<ConceptRef>,
    pub narrower: Vec<ConceptRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub vocab_id: String,
    pub uri: String,
    pub label: String,
    pub properties: Vec<Property>,
    pub members: Vec<ConceptRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterItem {
    pub uri: String,
    pub label: String,
    /// Root relative link to the page of the item.
    pub path: String,
}

/// A list of vocabularies or of the concepts of one vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterListing {
    pub uri: String,
    pub label: String,
    pub item_class: String,
    pub items: Vec<RegisterItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Vocabulary(Vocabulary),
    Concept(Concept),
    Collection(Collection),
    RegisterListing(RegisterListing),
}

impl Resource {
    pub fn uri(&self) -> &str {
        match self {
            Resource::Vocabulary(v) => &v.uri,
            Resource::Concept(c) => &c.uri,
            Resource::Collection(c) => &c.uri,
            Resource::RegisterListing(r) => &r.uri,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Resource::Vocabulary(v) => &v.title,
            Resource::Concept(c) => &c.pref_label,
            Resource::Collection(c) => &c.label,
            Resource::RegisterListing(r) => &r.label,
        }
    }

    pub fn properties(&self) -> &[Property] {
        match self {
            Resource::Vocabulary(v) => &v.properties,
            Resource::Concept(c) => &c.properties,
            Resource::Collection(c) => &c.properties,
            Resource::RegisterListing(_) => &[],
        }
    }

    /// Class of the resource in the SKOS or registry vocabulary.
    pub fn class(&self) -> &'static str {
        match self {
            Resource::Vocabulary(_) => skos::CONCEPT_SCHEME,
            Resource::Concept(_) => skos::CONCEPT,
            Resource::Collection(_) => skos::COLLECTION,
            Resource::RegisterListing(_) => reg::REGISTER,
        }
    }

    /// Profile tokens this kind of resource can be rendered in.
    pub fn supported_profiles(&self) -> &'static [&'static str] {
        match self {
            Resource::Vocabulary(_) => &["skos", "dcat", "dd"],
            Resource::Concept(_) | Resource::Collection(_) => &["skos", "dd"],
            Resource::RegisterListing(_) => &["reg", "dd"],
        }
    }

    pub fn default_profile(&self) -> &'static str {
        match self {
            Resource::RegisterListing(_) => "reg",
            _ => "skos",
        }
    }
}
