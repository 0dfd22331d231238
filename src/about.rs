use crate::cache::VocabCache;
use crate::error::RenderError;
use crate::profile::ProfileRegistry;
use crate::render::render_template;
use serde::Serialize;
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize, Debug)]
pub struct ProfileLink {
    pub href: String,
    pub label: String,
}

/// Statistics shown on the about page.
#[derive(Serialize, Debug)]
pub struct About {
    pub version: &'static str,
    pub num_vocabularies: usize,
    pub num_sources: usize,
    pub num_triples: Option<usize>,
    pub profiles: Vec<ProfileLink>,
}

#[derive(Serialize)]
struct AboutPage<'a> {
    #[serde(flatten)]
    about: &'a About,
    site_title: &'a str,
    base: &'a str,
    title: &'a str,
    language: &'a str,
    alternates: String,
    profile_uri: &'a str,
    profile_label: &'a str,
}

impl About {
    pub fn new(cache: &VocabCache, registry: &ProfileRegistry) -> About {
        About {
            version: VERSION,
            num_vocabularies: cache.entries().len(),
            num_sources: cache.sources().len(),
            num_triples: cache.triple_count(),
            profiles: registry.all().map(|p| ProfileLink { href: p.uri.clone(), label: format!("{} ({})", p.label, p.token) }).collect(),
        }
    }

    pub fn to_html(&self, base: &str, site_title: &str, language: &str) -> Result<String, RenderError> {
        let page = AboutPage {
            about: self,
            site_title,
            base,
            title: "About",
            language,
            alternates: format!("{base}/?_profile=alt"),
            profile_uri: "",
            profile_label: "",
        };
        render_template("about", &page)
    }
}
