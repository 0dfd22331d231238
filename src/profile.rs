//! Profiles are named alternate representations of a resource, each with its own media types and languages.
//! The registry is built once at startup and only read afterwards.
use crate::error::RegistryError;

/// Media types that the renderer knows how to produce.
pub mod media {
    pub const HTML: &str = "text/html";
    pub const JSON: &str = "application/json";
    pub const TURTLE: &str = "text/turtle";
    pub const RDF_XML: &str = "application/rdf+xml";
    pub const JSON_LD: &str = "application/ld+json";
    pub const N_TRIPLES: &str = "application/n-triples";
    pub const N3: &str = "text/n3";

    /// Short names accepted in the media type query parameter, for example "ttl" for Turtle.
    pub fn from_alias(alias: &str) -> Option<&'static str> {
        let mt = match alias.trim().to_ascii_lowercase().as_str() {
            "html" | "text/html" => HTML,
            "json" | "application/json" => JSON,
            "turtle" | "ttl" | "text/turtle" => TURTLE,
            "xml" | "rdf" | "rdfxml" | "application/rdf+xml" => RDF_XML,
            "jsonld" | "json-ld" | "application/ld+json" => JSON_LD,
            "nt" | "ntriples" | "n-triples" | "application/n-triples" => N_TRIPLES,
            "n3" | "text/n3" => N3,
            _ => return None,
        };
        Some(mt)
    }
}

/// Reserved tokens that request the list of alternate representations instead of the resource itself.
pub const ALTERNATES_TOKENS: [&str; 2] = ["alt", "alternates"];
/// Token of the alternates view profile.
pub const ALT: &str = "alt";
pub const ALT_URI: &str = "http://www.w3.org/ns/dx/conneg/altr";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDescriptor {
    pub token: String,
    pub uri: String,
    pub label: String,
    pub comment: String,
    /// Ordered by preference, used to break ties between equally acceptable media types.
    pub media_types: Vec<String>,
    pub default_media_type: String,
    pub languages: Vec<String>,
    pub default_language: String,
}

impl ProfileDescriptor {
    pub fn supports_media_type(&self, media_type: &str) -> bool {
        self.media_types.iter().any(|m| m.eq_ignore_ascii_case(media_type))
    }

    /// Returns the registered spelling of the given media type or an error if this profile does not offer it.
    pub fn media_type(&self, media_type: &str) -> Result<&str, RegistryError> {
        self.media_types
            .iter()
            .find(|m| m.eq_ignore_ascii_case(media_type))
            .map(String::as_str)
            .ok_or_else(|| RegistryError::UnknownMediaType { token: self.token.clone(), media_type: media_type.to_owned() })
    }
}

/// Token to descriptor table in registration order.
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    profiles: Vec<ProfileDescriptor>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: ProfileDescriptor) -> Result<(), RegistryError> {
        if self.profiles.iter().any(|p| p.token == descriptor.token) {
            return Err(RegistryError::DuplicateToken(descriptor.token));
        }
        self.profiles.push(descriptor);
        Ok(())
    }

    pub fn get(&self, token: &str) -> Result<&ProfileDescriptor, RegistryError> {
        self.profiles.iter().find(|p| p.token == token).ok_or_else(|| RegistryError::UnknownProfile(token.to_owned()))
    }

    /// Looks up a profile by its token or by its URI, ignoring surrounding angle brackets.
    pub fn find(&self, token_or_uri: &str) -> Option<&ProfileDescriptor> {
        let key = token_or_uri.trim().trim_start_matches('<').trim_end_matches('>');
        self.profiles.iter().find(|p| p.token == key || p.uri == key)
    }

    pub fn all(&self) -> impl Iterator<Item = &ProfileDescriptor> {
        self.profiles.iter()
    }

    /// The profiles every deployment offers.
    pub fn builtin(languages: &[String], default_language: &str) -> Self {
        let rdf_types = || {
            let mut v = vec![media::HTML, media::TURTLE];
            if cfg!(feature = "rdfxml") {
                v.push(media::RDF_XML);
            }
            v.extend([media::JSON_LD, media::N_TRIPLES]);
            v
        };
        let with_n3 = || {
            let mut v = rdf_types();
            v.push(media::N3);
            v
        };
        let alt_types = || {
            let mut v = rdf_types();
            v.insert(1, media::JSON);
            v
        };
        let languages: Vec<String> = if languages.is_empty() { vec![default_language.to_owned()] } else { languages.to_vec() };
        let describe = |token: &str, uri: &str, label: &str, comment: &str, media_types: Vec<&str>| ProfileDescriptor {
            token: token.to_owned(),
            uri: uri.to_owned(),
            label: label.to_owned(),
            comment: comment.to_owned(),
            default_media_type: media_types[0].to_owned(),
            media_types: media_types.into_iter().map(str::to_owned).collect(),
            languages: languages.clone(),
            default_language: default_language.to_owned(),
        };
        let mut registry = ProfileRegistry::new();
        let builtin = [
            describe("skos", "http://www.w3.org/2004/02/skos/core", "SKOS", "Simple Knowledge Organization System view of a vocabulary item.", with_n3()),
            describe("dcat", "https://www.w3.org/TR/vocab-dcat/", "DCAT", "Data Catalog Vocabulary view, describing a vocabulary as a dataset.", with_n3()),
            describe("dd", "https://w3id.org/profile/dd", "Drop-Down List", "A flat list of URIs, labels and parents suitable for drop-down lists.", vec![media::JSON]),
            describe("reg", "http://purl.org/linked-data/registry", "Registry", "A register of items with their labels.", rdf_types()),
            describe(ALT, ALT_URI, "Alternates", "The representations available for this resource.", alt_types()),
        ];
        for descriptor in builtin {
            // tokens above are distinct
            let _ = registry.register(descriptor);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ProfileRegistry {
        ProfileRegistry::builtin(&["en".to_owned(), "de".to_owned()], "en")
    }

    #[test]
    fn test_duplicate_token() {
        let mut r = registry();
        let skos = r.get("skos").unwrap().clone();
        assert_eq!(r.register(skos), Err(RegistryError::DuplicateToken("skos".to_owned())));
    }

    #[test]
    fn test_unknown_profile() {
        assert_eq!(registry().get("nope"), Err(RegistryError::UnknownProfile("nope".to_owned())));
    }

    #[test]
    fn test_find_by_uri() {
        let r = registry();
        assert_eq!(r.find("<http://www.w3.org/2004/02/skos/core>").map(|p| p.token.as_str()), Some("skos"));
        assert_eq!(r.find("dcat").map(|p| p.token.as_str()), Some("dcat"));
        assert!(r.find("http://example.org/other").is_none());
    }

    #[test]
    fn test_media_type() {
        let r = registry();
        let dd = r.get("dd").unwrap();
        assert_eq!(dd.media_type("Application/JSON"), Ok(media::JSON));
        assert!(matches!(dd.media_type(media::TURTLE), Err(RegistryError::UnknownMediaType { .. })));
    }

    #[test]
    fn test_defaults_listed_first() {
        for p in registry().all() {
            assert_eq!(p.media_types[0], p.default_media_type);
            assert_eq!(p.default_language, "en");
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(media::from_alias("ttl"), Some(media::TURTLE));
        assert_eq!(media::from_alias(" JSON-LD "), Some(media::JSON_LD));
        assert_eq!(media::from_alias("pdf"), None);
    }
}
