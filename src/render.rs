//! Turn a resource into a response body for a negotiated profile, media type and language.
//!
//! Rendering is a pure function of the resource, the outcome and the context,
//! so the same inputs always give the same bytes.
use crate::error::{RegistryError, RenderError};
use crate::hierarchy::{self, concept_link};
use crate::negotiate::NegotiationOutcome;
use crate::ns::{self, altr, dcat, dct, reg, skos, RDFS_LABEL};
use crate::profile::{media, ProfileDescriptor, ProfileRegistry, ALT};
use crate::rdf::{GraphBuilder, Node, RdfFormat};
use crate::resource::{pick_literal, ConceptRef, Property, Resource, Value, LABEL_PREDICATES};
use serde::Serialize;
use serde_json::json;
use tinytemplate::TinyTemplate;
use url::form_urlencoded::byte_serialize;

static HEADER: &str = std::include_str!("../data/templates/header.html");
static FOOTER: &str = std::include_str!("../data/templates/footer.html");
static PROPERTIES: &str = std::include_str!("../data/templates/properties.html");
static VOCABULARY: &str = std::include_str!("../data/templates/vocabulary.html");
static CONCEPT: &str = std::include_str!("../data/templates/concept.html");
static COLLECTION: &str = std::include_str!("../data/templates/collection.html");
static REGISTER: &str = std::include_str!("../data/templates/register.html");
static ALTERNATES: &str = std::include_str!("../data/templates/alternates.html");
static ABOUT: &str = std::include_str!("../data/templates/about.html");

const DESCRIPTION_PREDICATES: [&str; 2] = [dct::DESCRIPTION, skos::DEFINITION];
/// Copied unchanged into the DCAT view of a vocabulary.
const DCAT_PREDICATES: [&str; 8] = [dct::CREATED, dct::MODIFIED, dct::ISSUED, dct::CREATOR, dct::PUBLISHER, dct::LICENSE, dcat::KEYWORD, dcat::THEME];

/// Request independent settings and the request target that alternate representation links point to.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Absolute URL of the server root without trailing slash, may be empty for root relative links.
    pub base: &'a str,
    pub site_title: &'a str,
    /// Root relative path and non-negotiation query parameters of the request, for example "/object?vocab_id=x&uri=y".
    pub target: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub body: Vec<u8>,
    pub content_type: String,
    pub profile_uri: String,
    pub language: String,
}

enum Family {
    Html,
    Json,
    Rdf(RdfFormat),
}

impl Family {
    fn of(media_type: &str) -> Option<Self> {
        match media_type {
            media::HTML => Some(Family::Html),
            media::JSON => Some(Family::Json),
            mt => RdfFormat::from_media_type(mt).map(Family::Rdf),
        }
    }
}

/// Appends query parameters to a target that may already have a query string.
fn with_query(target: &str, params: &[(&str, &str)]) -> String {
    let mut s = target.to_owned();
    for (i, (k, v)) in params.iter().enumerate() {
        let sep = if i == 0 && !target.contains('?') { '?' } else { '&' };
        let v: String = byte_serialize(v.as_bytes()).collect();
        s += &format!("{sep}{k}={v}");
    }
    s
}

/// Value of an HTTP Link header listing every representation of a resource.
pub fn link_header(resource: &Resource, outcome: &NegotiationOutcome, registry: &ProfileRegistry, target: &str) -> String {
    let mut links = Vec::new();
    let tokens = resource.supported_profiles().iter().copied().chain(std::iter::once(ALT));
    for profile in tokens.filter_map(|t| registry.get(t).ok()) {
        for mt in &profile.media_types {
            let rel = if profile.token == outcome.profile && *mt == outcome.media_type { "self" } else { "alternate" };
            let href = with_query(target, &[("_profile", profile.token.as_str()), ("_mediatype", mt.as_str())]);
            links.push(format!("<{href}>; rel=\"{rel}\"; type=\"{mt}\"; profile=\"{}\"", profile.uri));
        }
    }
    links.join(", ")
}

/// Renders the resource in the profile and media type of the outcome.
/// Fails if the outcome names a profile or media type the registry does not know, which negotiation never produces.
pub fn render(resource: &Resource, outcome: &NegotiationOutcome, registry: &ProfileRegistry, ctx: &RenderContext<'_>) -> Result<Rendered, RenderError> {
    let profile = registry.get(&outcome.profile)?;
    let media_type = profile.media_type(&outcome.media_type)?.to_owned();
    let unsupported = || RegistryError::UnknownMediaType { token: profile.token.clone(), media_type: media_type.clone() };
    let family = Family::of(&media_type).ok_or_else(unsupported)?;
    let lang = outcome.language.as_str();
    let body = if outcome.is_profiles_list_request {
        match family {
            Family::Html => html_alternates(resource, registry, lang, ctx)?,
            Family::Json => serde_json::to_string_pretty(&json_alternates(resource, registry))?,
            Family::Rdf(format) => alternates_graph(resource, registry).serialize(format)?,
        }
    } else {
        match (profile.token.as_str(), family) {
            ("dd", _) => serde_json::to_string_pretty(&drop_down_list(resource, lang))?,
            (_, Family::Rdf(format)) => graph(resource, &profile.token, lang).serialize(format)?,
            (_, Family::Html) => html(resource, profile, lang, ctx)?,
            (_, Family::Json) => return Err(unsupported().into()),
        }
    };
    Ok(Rendered { body: body.into_bytes(), content_type: media_type, profile_uri: profile.uri.clone(), language: outcome.language.clone() })
}

/// Keeps untagged literals, and for each predicate only the tagged literals in the language if there are any.
fn in_language<'a>(properties: &'a [Property], lang: &str) -> impl Iterator<Item = &'a Property> + 'a {
    let lang = lang.to_owned();
    properties.iter().filter(move |p| match p.value.lang() {
        None => true,
        Some(l) => {
            l.eq_ignore_ascii_case(&lang)
                || !properties.iter().any(|q| q.predicate == p.predicate && q.value.lang().is_some_and(|ql| ql.eq_ignore_ascii_case(&lang)))
        }
    })
}

fn display_label<'a>(resource: &'a Resource, lang: &str) -> &'a str {
    pick_literal(resource.properties(), &LABEL_PREDICATES, lang).unwrap_or(resource.label())
}

fn add_refs(g: &mut GraphBuilder, subject: &str, predicate: &str, refs: &[ConceptRef], lang: &str) {
    for r in refs {
        g.iri(subject, predicate, &r.uri).literal(&r.uri, skos::PREF_LABEL, &r.label, Some(lang));
    }
}

/// Triples of the resource in the given profile.
fn graph(resource: &Resource, profile: &str, lang: &str) -> GraphBuilder {
    let mut g = GraphBuilder::new();
    let uri = resource.uri();
    if let ("dcat", Resource::Vocabulary(_)) = (profile, resource) {
        let properties: Vec<&Property> = in_language(resource.properties(), lang).collect();
        g.typed(uri, dcat::DATASET);
        let first = |predicates: &[&str]| predicates.iter().find_map(|pred| properties.iter().find(|p| p.predicate == *pred && matches!(p.value, Value::Literal { .. })));
        // a missing title or description is left out
        if let Some(title) = first(&LABEL_PREDICATES[..]) {
            g.value(uri, dct::TITLE, &title.value);
        }
        if let Some(description) = first(&DESCRIPTION_PREDICATES[..]) {
            g.value(uri, dct::DESCRIPTION, &description.value);
        }
        for p in properties.iter().filter(|p| DCAT_PREDICATES.contains(&p.predicate.as_str())) {
            g.value(uri, &p.predicate, &p.value);
        }
        return g;
    }
    g.typed(uri, resource.class());
    for p in in_language(resource.properties(), lang) {
        g.value(uri, &p.predicate, &p.value);
    }
    match resource {
        Resource::Vocabulary(v) => {
            for c in &v.top_concepts {
                g.iri(uri, skos::HAS_TOP_CONCEPT, &c.uri);
            }
            for c in &v.concepts {
                g.typed(&c.uri, skos::CONCEPT).literal(&c.uri, skos::PREF_LABEL, &c.label, Some(lang)).iri(&c.uri, skos::IN_SCHEME, uri);
            }
            for node in &v.hierarchy {
                if let Some(parent) = &node.parent_uri {
                    g.iri(&node.concept_uri, skos::BROADER, parent);
                }
            }
            for c in &v.collections {
                g.typed(&c.uri, skos::COLLECTION).literal(&c.uri, skos::PREF_LABEL, &c.label, Some(lang));
            }
        }
        Resource::Concept(c) => {
            add_refs(&mut g, uri, skos::BROADER, &c.broader, lang);
            add_refs(&mut g, uri, skos::NARROWER, &c.narrower, lang);
        }
        Resource::Collection(c) => add_refs(&mut g, uri, skos::MEMBER, &c.members, lang),
        Resource::RegisterListing(r) => {
            g.literal(uri, RDFS_LABEL, &r.label, None).iri(uri, reg::CONTAINED_ITEM_CLASS, &r.item_class);
            for item in &r.items {
                g.iri(uri, ns::rdfs::MEMBER, &item.uri).typed(&item.uri, &r.item_class).literal(&item.uri, RDFS_LABEL, &item.label, None);
            }
        }
    }
    g
}

#[derive(Serialize, Debug, PartialEq, Eq)]
struct DropDownEntry<'a> {
    uri: &'a str,
    label: &'a str,
    parent: Option<&'a str>,
}

/// Flat list for drop-down lists, without going through a graph.
fn drop_down_list<'a>(resource: &'a Resource, lang: &str) -> Vec<DropDownEntry<'a>> {
    match resource {
        Resource::Vocabulary(v) => {
            let mut entries: Vec<DropDownEntry> =
                v.hierarchy.iter().map(|n| DropDownEntry { uri: &n.concept_uri, label: &n.pref_label, parent: n.parent_uri.as_deref() }).collect();
            for c in &v.concepts {
                if !v.hierarchy.iter().any(|n| n.concept_uri == c.uri) {
                    entries.push(DropDownEntry { uri: &c.uri, label: &c.label, parent: None });
                }
            }
            entries
        }
        Resource::Concept(c) => {
            let mut entries = vec![DropDownEntry { uri: &c.uri, label: display_label(resource, lang), parent: c.broader.first().map(|b| b.uri.as_str()) }];
            entries.extend(c.narrower.iter().map(|n| DropDownEntry { uri: &n.uri, label: &n.label, parent: Some(&c.uri) }));
            entries
        }
        Resource::Collection(c) => c.members.iter().map(|m| DropDownEntry { uri: &m.uri, label: &m.label, parent: None }).collect(),
        Resource::RegisterListing(r) => r.items.iter().map(|i| DropDownEntry { uri: &i.uri, label: &i.label, parent: None }).collect(),
    }
}

fn alternate_profiles<'r>(resource: &Resource, registry: &'r ProfileRegistry) -> Vec<&'r ProfileDescriptor> {
    resource.supported_profiles().iter().copied().chain(std::iter::once(ALT)).filter_map(|t| registry.get(t).ok()).collect()
}

fn json_alternates(resource: &Resource, registry: &ProfileRegistry) -> serde_json::Value {
    let profiles: Vec<serde_json::Value> = alternate_profiles(resource, registry)
        .into_iter()
        .map(|p| {
            json!({
                "token": p.token,
                "uri": p.uri,
                "label": p.label,
                "comment": p.comment,
                "media_types": p.media_types,
                "default_media_type": p.default_media_type,
                "is_default": p.token == resource.default_profile(),
            })
        })
        .collect();
    json!({"uri": resource.uri(), "default_profile": resource.default_profile(), "profiles": profiles})
}

/// One blank node per representation in the alternates vocabulary.
fn alternates_graph(resource: &Resource, registry: &ProfileRegistry) -> GraphBuilder {
    let mut g = GraphBuilder::new();
    let uri = resource.uri();
    for (i, p) in alternate_profiles(resource, registry).into_iter().enumerate() {
        let rep = Node::Blank(format!("rep{i}"));
        let predicate = if p.token == resource.default_profile() { altr::HAS_DEFAULT_REPRESENTATION } else { altr::HAS_REPRESENTATION };
        g.add(Node::Iri(uri.to_owned()), predicate, rep.clone());
        g.add(rep.clone(), ns::RDF_TYPE, Node::Iri(altr::REPRESENTATION.to_owned()));
        g.add(rep.clone(), dct::CONFORMS_TO, Node::Iri(p.uri.clone()));
        g.add(rep.clone(), RDFS_LABEL, Node::Literal { text: p.label.clone(), lang: None });
        for mt in &p.media_types {
            g.add(rep.clone(), dct::FORMAT, Node::Literal { text: mt.clone(), lang: None });
        }
    }
    g
}

// HTML

/// Fields shared by the header and footer of every page.
#[derive(Serialize, Debug)]
struct Chrome<'a> {
    site_title: &'a str,
    base: &'a str,
    title: &'a str,
    language: &'a str,
    alternates: String,
    profile_uri: &'a str,
    profile_label: &'a str,
}

impl<'a> Chrome<'a> {
    fn new(ctx: &RenderContext<'a>, title: &'a str, language: &'a str, profile: &'a ProfileDescriptor) -> Self {
        Chrome {
            site_title: ctx.site_title,
            base: ctx.base,
            title,
            language,
            alternates: format!("{}{}", ctx.base, with_query(ctx.target, &[("_profile", ALT)])),
            profile_uri: &profile.uri,
            profile_label: &profile.label,
        }
    }
}

#[derive(Serialize, Debug)]
struct Link {
    label: String,
    href: String,
}

#[derive(Serialize, Debug)]
struct ValueView<'a> {
    text: &'a str,
    lang: Option<&'a str>,
    is_iri: bool,
}

#[derive(Serialize, Debug)]
struct PropertyView<'a> {
    predicate: &'a str,
    name: String,
    values: Vec<ValueView<'a>>,
}

/// Groups the properties by predicate in order of first appearance, leaving out the ones a page shows elsewhere.
fn property_views<'a>(properties: &'a [Property], lang: &str, hidden: &[&str]) -> Vec<PropertyView<'a>> {
    let mut views: Vec<PropertyView> = Vec::new();
    for p in in_language(properties, lang).filter(|p| !hidden.contains(&p.predicate.as_str())) {
        let value = ValueView { text: p.value.text(), lang: p.value.lang(), is_iri: p.value.as_iri().is_some() };
        match views.iter_mut().find(|v| v.predicate == p.predicate) {
            Some(view) => view.values.push(value),
            None => views.push(PropertyView { predicate: &p.predicate, name: ns::prefixed(&p.predicate), values: vec![value] }),
        }
    }
    views
}

fn concept_links(refs: &[ConceptRef], base: &str, vocab_id: &str) -> Vec<Link> {
    refs.iter().map(|r| Link { label: r.label.clone(), href: concept_link(base, vocab_id, &r.uri) }).collect()
}

fn vocab_href(base: &str, vocab_id: &str) -> String {
    let id: String = byte_serialize(vocab_id.as_bytes()).collect();
    format!("{base}/vocab/{id}")
}

#[derive(Serialize)]
struct VocabularyView<'a> {
    #[serde(flatten)]
    chrome: Chrome<'a>,
    uri: &'a str,
    description: Option<&'a str>,
    properties: Vec<PropertyView<'a>>,
    top_concepts: Vec<Link>,
    collections: Vec<Link>,
    hierarchy: String,
    concept_count: usize,
    concepts_href: String,
}

#[derive(Serialize)]
struct ConceptView<'a> {
    #[serde(flatten)]
    chrome: Chrome<'a>,
    uri: &'a str,
    vocab_id: &'a str,
    vocab_href: String,
    definition: Option<&'a str>,
    broader: Vec<Link>,
    narrower: Vec<Link>,
    properties: Vec<PropertyView<'a>>,
}

#[derive(Serialize)]
struct CollectionView<'a> {
    #[serde(flatten)]
    chrome: Chrome<'a>,
    uri: &'a str,
    vocab_id: &'a str,
    vocab_href: String,
    members: Vec<Link>,
    properties: Vec<PropertyView<'a>>,
}

#[derive(Serialize)]
struct RegisterView<'a> {
    #[serde(flatten)]
    chrome: Chrome<'a>,
    item_class: &'a str,
    count: usize,
    items: Vec<Link>,
}

#[derive(Serialize)]
struct AlternateProfileView<'a> {
    uri: &'a str,
    label: &'a str,
    comment: &'a str,
    is_default: bool,
    formats: Vec<Link>,
}

#[derive(Serialize)]
struct AlternatesView<'a> {
    #[serde(flatten)]
    chrome: Chrome<'a>,
    uri: &'a str,
    profiles: Vec<AlternateProfileView<'a>>,
}

/// All page templates with their formatters.
pub(crate) fn templates() -> Result<TinyTemplate<'static>, RenderError> {
    let mut tt = TinyTemplate::new();
    for (name, text) in [
        ("header", HEADER),
        ("footer", FOOTER),
        ("properties", PROPERTIES),
        ("vocabulary", VOCABULARY),
        ("concept", CONCEPT),
        ("collection", COLLECTION),
        ("register", REGISTER),
        ("alternates", ALTERNATES),
        ("about", ABOUT),
    ] {
        tt.add_template(name, text)?;
    }
    Ok(tt)
}

pub(crate) fn render_template<C: Serialize>(name: &str, context: &C) -> Result<String, RenderError> {
    Ok(templates()?.render(name, context)?)
}

fn html(resource: &Resource, profile: &ProfileDescriptor, lang: &str, ctx: &RenderContext<'_>) -> Result<String, RenderError> {
    let title = display_label(resource, lang);
    let chrome = Chrome::new(ctx, title, lang, profile);
    let base = ctx.base;
    match resource {
        Resource::Vocabulary(v) => {
            let hidden = [skos::PREF_LABEL, dct::TITLE, dct::DESCRIPTION, skos::HAS_TOP_CONCEPT];
            let view = VocabularyView {
                chrome,
                uri: &v.uri,
                description: pick_literal(&v.properties, &DESCRIPTION_PREDICATES, lang).or(v.description.as_deref()),
                properties: property_views(&v.properties, lang, &hidden),
                top_concepts: concept_links(&v.top_concepts, base, &v.id),
                collections: concept_links(&v.collections, base, &v.id),
                hierarchy: hierarchy::to_html(&v.hierarchy, base, &v.id),
                concept_count: v.concepts.len(),
                concepts_href: format!("{}/concept/", vocab_href(base, &v.id)),
            };
            render_template("vocabulary", &view)
        }
        Resource::Concept(c) => {
            let hidden = [skos::PREF_LABEL, skos::DEFINITION, skos::BROADER, skos::NARROWER];
            let view = ConceptView {
                chrome,
                uri: &c.uri,
                vocab_id: &c.vocab_id,
                vocab_href: vocab_href(base, &c.vocab_id),
                definition: pick_literal(&c.properties, &[skos::DEFINITION], lang).or(c.definition.as_deref()),
                broader: concept_links(&c.broader, base, &c.vocab_id),
                narrower: concept_links(&c.narrower, base, &c.vocab_id),
                properties: property_views(&c.properties, lang, &hidden),
            };
            render_template("concept", &view)
        }
        Resource::Collection(c) => {
            let view = CollectionView {
                chrome,
                uri: &c.uri,
                vocab_id: &c.vocab_id,
                vocab_href: vocab_href(base, &c.vocab_id),
                members: concept_links(&c.members, base, &c.vocab_id),
                properties: property_views(&c.properties, lang, &[skos::PREF_LABEL, skos::MEMBER]),
            };
            render_template("collection", &view)
        }
        Resource::RegisterListing(r) => {
            let items = r.items.iter().map(|i| Link { label: i.label.clone(), href: format!("{base}{}", i.path) }).collect();
            render_template("register", &RegisterView { chrome, item_class: &r.item_class, count: r.items.len(), items })
        }
    }
}

fn html_alternates(resource: &Resource, registry: &ProfileRegistry, lang: &str, ctx: &RenderContext<'_>) -> Result<String, RenderError> {
    let alt = registry.get(ALT)?;
    let profiles = alternate_profiles(resource, registry)
        .into_iter()
        .map(|p| AlternateProfileView {
            uri: &p.uri,
            label: &p.label,
            comment: &p.comment,
            is_default: p.token == resource.default_profile(),
            formats: p
                .media_types
                .iter()
                .map(|mt| Link { label: mt.clone(), href: format!("{}{}", ctx.base, with_query(ctx.target, &[("_profile", p.token.as_str()), ("_mediatype", mt.as_str())])) })
                .collect(),
        })
        .collect();
    let view = AlternatesView { chrome: Chrome::new(ctx, display_label(resource, lang), lang, alt), uri: resource.uri(), profiles };
    render_template("alternates", &view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{build_hierarchy, HierarchyRow};
    use crate::negotiate::{negotiate, RequestHints};
    use crate::resource::{Concept, RegisterItem, RegisterListing, Vocabulary};

    const V: &str = "http://example.org/voc";

    fn registry() -> ProfileRegistry {
        ProfileRegistry::builtin(&["en".to_owned(), "de".to_owned()], "en")
    }

    fn ctx() -> RenderContext<'static> {
        RenderContext { base: "http://localhost:8080", site_title: "Vocabularies", target: "/vocab/voc" }
    }

    fn vocabulary(properties: Vec<Property>) -> Resource {
        let rows = [HierarchyRow::new(1, "http://example.org/a", "Alpha", Some(V)), HierarchyRow::new(2, "http://example.org/b", "Beta", Some("http://example.org/a"))];
        let concepts = vec![
            ConceptRef { label: "Alpha".into(), uri: "http://example.org/a".into() },
            ConceptRef { label: "Beta".into(), uri: "http://example.org/b".into() },
            ConceptRef { label: "Loose".into(), uri: "http://example.org/l".into() },
        ];
        Resource::Vocabulary(Vocabulary {
            id: "voc".into(),
            uri: V.into(),
            title: "voc".into(),
            description: None,
            properties,
            top_concepts: concepts[..1].to_vec(),
            concepts,
            collections: vec![],
            hierarchy: build_hierarchy(&rows, V),
        })
    }

    fn titled() -> Resource {
        vocabulary(vec![
            Property::new(skos::PREF_LABEL, Value::literal("Animals", Some("en"))),
            Property::new(skos::PREF_LABEL, Value::literal("Tiere", Some("de"))),
            Property::new(dct::CREATED, Value::literal("2020-01-01", None)),
        ])
    }

    fn outcome(profile: &str, media_type: &str) -> NegotiationOutcome {
        NegotiationOutcome { profile: profile.into(), media_type: media_type.into(), language: "en".into(), is_profiles_list_request: false }
    }

    fn body(r: Rendered) -> String {
        String::from_utf8(r.body).unwrap()
    }

    #[test]
    fn test_default_html_contains_title() {
        let r = registry();
        let v = titled();
        let o = negotiate(&r, v.supported_profiles(), v.default_profile(), &RequestHints::default());
        assert_eq!(o.profile, "skos");
        assert_eq!(o.media_type, media::HTML);
        let rendered = render(&v, &o, &r, &ctx()).unwrap();
        assert_eq!(rendered.content_type, media::HTML);
        assert_eq!(rendered.profile_uri, "http://www.w3.org/2004/02/skos/core");
        let html = body(rendered);
        assert!(html.contains("<h1>Animals</h1>"));
        assert!(html.contains("Beta"));
        assert!(!html.contains("Tiere"));
    }

    #[test]
    fn test_german_title() {
        let mut o = outcome("skos", media::HTML);
        o.language = "de".into();
        assert!(body(render(&titled(), &o, &registry(), &ctx()).unwrap()).contains("<h1>Tiere</h1>"));
    }

    #[test]
    fn test_skos_nt() {
        let nt = body(render(&titled(), &outcome("skos", media::N_TRIPLES), &registry(), &ctx()).unwrap());
        assert!(nt.contains(&format!("<{V}> <{}> <{}>", ns::RDF_TYPE, skos::CONCEPT_SCHEME)));
        assert!(nt.contains("\"Animals\"@en"));
        assert!(!nt.contains("Tiere"));
        assert!(nt.contains(&format!("<http://example.org/b> <{}> <http://example.org/a>", skos::BROADER)));
    }

    #[test]
    fn test_dcat_omits_missing_title() {
        let nt = body(render(&vocabulary(vec![]), &outcome("dcat", media::N_TRIPLES), &registry(), &ctx()).unwrap());
        assert!(nt.contains(dcat::DATASET));
        assert!(!nt.contains(dct::TITLE));
        let nt = body(render(&titled(), &outcome("dcat", media::N_TRIPLES), &registry(), &ctx()).unwrap());
        assert!(nt.contains(&format!("<{V}> <{}> \"Animals\"@en", dct::TITLE)));
        assert!(nt.contains(dct::CREATED));
    }

    #[test]
    fn test_drop_down_list() {
        let rendered = render(&titled(), &outcome("dd", media::JSON), &registry(), &ctx()).unwrap();
        assert_eq!(rendered.content_type, media::JSON);
        let json: serde_json::Value = serde_json::from_slice(&rendered.body).unwrap();
        assert_eq!(
            json,
            json!([
                {"uri": "http://example.org/a", "label": "Alpha", "parent": null},
                {"uri": "http://example.org/b", "label": "Beta", "parent": "http://example.org/a"},
                {"uri": "http://example.org/l", "label": "Loose", "parent": null},
            ])
        );
    }

    #[test]
    fn test_concept_drop_down_list() {
        let c = Resource::Concept(Concept {
            vocab_id: "voc".into(),
            uri: "http://example.org/a".into(),
            pref_label: "Alpha".into(),
            definition: None,
            properties: vec![],
            broader: vec![],
            narrower: vec![ConceptRef { label: "Beta".into(), uri: "http://example.org/b".into() }],
        });
        let entries = drop_down_list(&c, "en");
        assert_eq!(entries[0], DropDownEntry { uri: "http://example.org/a", label: "Alpha", parent: None });
        assert_eq!(entries[1].parent, Some("http://example.org/a"));
    }

    #[test]
    fn test_alternates_json() {
        let mut o = outcome(ALT, media::JSON);
        o.is_profiles_list_request = true;
        let json: serde_json::Value = serde_json::from_slice(&render(&titled(), &o, &registry(), &ctx()).unwrap().body).unwrap();
        let tokens: Vec<&str> = json["profiles"].as_array().unwrap().iter().map(|p| p["token"].as_str().unwrap()).collect();
        assert_eq!(tokens, vec!["skos", "dcat", "dd", "alt"]);
        assert_eq!(json["default_profile"], "skos");
    }

    #[test]
    fn test_alternates_html() {
        let mut o = outcome(ALT, media::HTML);
        o.is_profiles_list_request = true;
        let html = body(render(&titled(), &o, &registry(), &ctx()).unwrap());
        assert!(html.contains("Alternate Profiles of Animals"));
        assert!(html.contains("/vocab/voc?_profile=dd&amp;_mediatype=application%2Fjson"));
    }

    #[test]
    fn test_invalid_outcome() {
        let r = registry();
        assert!(matches!(render(&titled(), &outcome("nope", media::HTML), &r, &ctx()), Err(RenderError::Registry(RegistryError::UnknownProfile(_)))));
        assert!(matches!(render(&titled(), &outcome("dd", media::HTML), &r, &ctx()), Err(RenderError::Registry(RegistryError::UnknownMediaType { .. }))));
    }

    #[test]
    fn test_register_turtle() {
        let listing = Resource::RegisterListing(RegisterListing {
            uri: "http://localhost:8080/".into(),
            label: "Vocabularies".into(),
            item_class: skos::CONCEPT_SCHEME.into(),
            items: vec![RegisterItem { uri: V.into(), label: "Animals".into(), path: "/vocab/voc".into() }],
        });
        let nt = body(render(&listing, &outcome("reg", media::N_TRIPLES), &registry(), &ctx()).unwrap());
        assert!(nt.contains(reg::REGISTER));
        assert!(nt.contains(&format!("<{V}> <{}> \"Animals\"", RDFS_LABEL)));
        let html = body(render(&listing, &outcome("reg", media::HTML), &registry(), &ctx()).unwrap());
        assert!(html.contains("http://localhost:8080/vocab/voc"));
    }

    #[test]
    fn test_link_header() {
        let r = registry();
        let v = titled();
        let o = outcome("skos", media::TURTLE);
        let link = link_header(&v, &o, &r, "/object?vocab_id=voc");
        assert!(link.contains("</object?vocab_id=voc&_profile=skos&_mediatype=text%2Fturtle>; rel=\"self\"; type=\"text/turtle\""));
        assert!(link.contains("_profile=alt"));
        assert_eq!(link.matches("rel=\"self\"").count(), 1);
    }

    #[test]
    fn test_byte_identical() {
        let r = registry();
        for mt in [media::HTML, media::TURTLE, media::JSON_LD, media::N_TRIPLES] {
            let a = render(&titled(), &outcome("skos", mt), &r, &ctx()).unwrap();
            let b = render(&titled(), &outcome("skos", mt), &r, &ctx()).unwrap();
            assert_eq!(a, b);
        }
    }
}
