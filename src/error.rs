//! Error types. Negotiation and hierarchy building never fail, so only registry misuse,
//! data source access and rendering have error variants.
use thiserror::Error;

/// Misuse of the profile registry, raised only when negotiation is bypassed.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Profile token '{0}' is already registered")]
    DuplicateToken(String),

    #[error("Unknown profile '{0}'")]
    UnknownProfile(String),

    #[error("Profile '{token}' does not support media type '{media_type}'")]
    UnknownMediaType { token: String, media_type: String },
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Cannot open vocabulary file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse vocabulary file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("SPARQL request to {endpoint} failed: {reason}")]
    Request { endpoint: String, reason: String },

    #[error("Invalid SPARQL results from {endpoint}: {source}")]
    Results {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid source configuration: {0}")]
    Config(String),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("RDF serialization failed: {0}")]
    Serialize(String),

    #[error("Template error: {0}")]
    Template(#[from] tinytemplate::error::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
