use crate::error::SourceError;
use config::{Environment, File, FileFormat};
use serde::Deserialize;

static DEFAULT: &str = std::include_str!("../data/default.toml");

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    File,
    Sparql,
}

/// Where vocabularies are read from.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Turtle file, required for kind "file".
    pub path: Option<String>,
    /// SPARQL endpoint URL, required for kind "sparql".
    pub endpoint: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub title: String,
    /// Absolute URL of the server root, used in links and resource IRIs of registers.
    pub base: String,
    pub port: u16,
    pub log_level: Option<String>,
    /// Languages offered by all profiles, the first one is the default unless `default_language` is set.
    pub languages: Vec<String>,
    pub default_language: Option<String>,
    pub sources: Vec<SourceConfig>,
}

impl Config {
    /// Embedded defaults, overridden by data/config.toml if it exists, overridden by VOCVIEW_* environment variables.
    pub fn new() -> Result<Config, config::ConfigError> {
        let mut config: Config = config::Config::builder()
            .add_source(File::from_str(DEFAULT, FileFormat::Toml))
            .add_source(File::new("data/config.toml", FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix("vocview").try_parsing(true).list_separator(" ").with_list_parse_key("languages"))
            .build()?
            .try_deserialize()?;
        config.normalize();
        Ok(config)
    }

    /// Parses a TOML document layered over the embedded defaults.
    pub fn from_toml(toml: &str) -> Result<Config, config::ConfigError> {
        let mut config: Config =
            config::Config::builder().add_source(File::from_str(DEFAULT, FileFormat::Toml)).add_source(File::from_str(toml, FileFormat::Toml)).build()?.try_deserialize()?;
        config.normalize();
        Ok(config)
    }

    fn normalize(&mut self) {
        while self.base.ends_with('/') {
            self.base.pop();
        }
        self.languages.retain(|l| !l.trim().is_empty());
        if self.languages.is_empty() {
            self.languages.push(self.default_language.clone().unwrap_or_else(|| "en".to_owned()));
        }
    }

    pub fn default_language(&self) -> &str {
        self.default_language.as_deref().or(self.languages.first().map(String::as_str)).unwrap_or("en")
    }

    /// Checks that every source has the location its kind needs.
    pub fn validate(&self) -> Result<(), SourceError> {
        for (i, source) in self.sources.iter().enumerate() {
            let missing = match source.kind {
                SourceKind::File => source.path.is_none().then_some("path"),
                SourceKind::Sparql => source.endpoint.is_none().then_some("endpoint"),
            };
            if let Some(field) = missing {
                return Err(SourceError::Config(format!("source {} of kind {:?} has no {field}", i + 1, source.kind)));
            }
        }
        Ok(())
    }
}
