//! Resolve profile, media type and language of a response from request hints.
//!
//! The three axes are resolved independently and in a fixed order:
//! query parameter, then header, then the default of the resource or profile.
//! Unknown or malformed hints are treated as absent, so [negotiate] never fails.
use crate::profile::{ProfileDescriptor, ProfileRegistry, ALT, ALTERNATES_TOKENS, ALT_URI};
use std::collections::HashMap;

/// Everything in a request that can influence the chosen representation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHints {
    /// `_profile` or `_view` query parameter
    pub profile: Option<String>,
    /// `_mediatype` or `_format` query parameter
    pub media_type: Option<String>,
    /// `_lang` query parameter
    pub language: Option<String>,
    pub accept: Option<String>,
    pub accept_profile: Option<String>,
    pub accept_language: Option<String>,
}

impl RequestHints {
    /// Collects the hints from decoded query parameters and a header lookup function.
    pub fn from_request<'a>(query: &HashMap<String, String>, header: impl Fn(&str) -> Option<&'a str>) -> Self {
        let param = |names: &[&str]| names.iter().find_map(|n| query.get(*n)).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        RequestHints {
            profile: param(&["_profile", "_view"]),
            media_type: param(&["_mediatype", "_format"]),
            language: param(&["_lang"]),
            accept: header("Accept").map(str::to_owned),
            accept_profile: header("Accept-Profile").map(str::to_owned),
            accept_language: header("Accept-Language").map(str::to_owned),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiationOutcome {
    pub profile: String,
    pub media_type: String,
    pub language: String,
    /// The client asked for the list of available representations instead of the resource.
    pub is_profiles_list_request: bool,
}

/// One entry of a comma separated header value with its quality, for example `text/turtle;q=0.5`.
#[derive(Debug, Clone, PartialEq)]
struct Weighted<'a> {
    value: &'a str,
    q: f32,
}

/// Splits a header like Accept into entries with their q-values.
/// Entries with an unparseable q-value are skipped, q is clamped to [0,1].
fn weighted(header: &str) -> Vec<Weighted<'_>> {
    let mut entries = Vec::new();
    for item in header.split(',') {
        let mut parts = item.split(';');
        let value = parts.next().unwrap_or_default().trim();
        if value.is_empty() {
            continue;
        }
        let mut q = Some(1.0_f32);
        for param in parts {
            if let Some((k, v)) = param.split_once('=') {
                if k.trim().eq_ignore_ascii_case("q") {
                    q = v.trim().parse::<f32>().ok().filter(|q| q.is_finite()).map(|q| q.clamp(0.0, 1.0));
                }
            }
        }
        if let Some(q) = q {
            entries.push(Weighted { value, q });
        }
    }
    entries
}

/// Entries ordered by descending q, equal q-values keep header order.
fn by_preference(header: &str) -> Vec<Weighted<'_>> {
    let mut entries = weighted(header);
    entries.sort_by(|a, b| b.q.total_cmp(&a.q));
    entries
}

fn is_alternates(token: &str) -> bool {
    let token = token.trim().trim_start_matches('<').trim_end_matches('>');
    ALTERNATES_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(token)) || token == ALT_URI
}

enum ProfileChoice<'r> {
    Alternates,
    Profile(&'r ProfileDescriptor),
}

fn resolve_profile<'r>(registry: &'r ProfileRegistry, supported: &[&str], default: &str, hints: &RequestHints) -> Option<ProfileChoice<'r>> {
    let supported_descriptor = |key: &str| registry.find(key).filter(|p| supported.contains(&p.token.as_str()));
    if let Some(requested) = &hints.profile {
        if is_alternates(requested) {
            return Some(ProfileChoice::Alternates);
        }
        if let Some(p) = supported_descriptor(requested) {
            return Some(ProfileChoice::Profile(p));
        }
    }
    if let Some(header) = &hints.accept_profile {
        for entry in by_preference(header).into_iter().filter(|e| e.q > 0.0) {
            if is_alternates(entry.value) {
                return Some(ProfileChoice::Alternates);
            }
            if let Some(p) = supported_descriptor(entry.value) {
                return Some(ProfileChoice::Profile(p));
            }
        }
    }
    registry.get(default).ok().map(ProfileChoice::Profile)
}

/// Specificity of the match of a media range against a concrete media type, higher is more specific.
fn range_match(range: &str, media_type: &str) -> Option<u8> {
    let (rt, rs) = range.split_once('/')?;
    let (mt, ms) = media_type.split_once('/')?;
    let (rt, rs) = (rt.trim(), rs.trim());
    if rt == "*" && rs == "*" {
        Some(0)
    } else if rt.eq_ignore_ascii_case(mt) && rs == "*" {
        Some(1)
    } else if rt.eq_ignore_ascii_case(mt) && rs.eq_ignore_ascii_case(ms) {
        Some(2)
    } else {
        None
    }
}

/// The supported media type with the highest q-value in the Accept header.
/// Ties are broken by the order of the profile's media types.
fn best_accepted<'p>(accept: &str, profile: &'p ProfileDescriptor) -> Option<&'p str> {
    let ranges = weighted(accept);
    let mut best: Option<(&str, f32)> = None;
    for mt in &profile.media_types {
        let q = ranges
            .iter()
            .filter_map(|r| range_match(r.value, mt).map(|s| (s, r.q)))
            // most specific range decides; among equally specific ones the first listed
            .fold(None::<(u8, f32)>, |acc, (s, q)| match acc {
                Some((best_s, _)) if best_s >= s => acc,
                _ => Some((s, q)),
            })
            .map(|(_, q)| q);
        if let Some(q) = q.filter(|q| *q > 0.0) {
            if best.map_or(true, |(_, best_q)| q > best_q) {
                best = Some((mt.as_str(), q));
            }
        }
    }
    best.map(|(mt, _)| mt)
}

fn resolve_media_type(profile: &ProfileDescriptor, hints: &RequestHints) -> String {
    if let Some(requested) = &hints.media_type {
        let requested = crate::profile::media::from_alias(requested).unwrap_or(requested.as_str());
        if let Ok(mt) = profile.media_type(requested) {
            return mt.to_owned();
        }
    }
    if let Some(mt) = hints.accept.as_deref().and_then(|accept| best_accepted(accept, profile)) {
        return mt.to_owned();
    }
    profile.default_media_type.clone()
}

/// Matches a language range against a tag: equal, range is a prefix of the tag or the tag is a prefix of the range.
fn language_match(range: &str, tag: &str) -> bool {
    let (range, tag) = (range.to_ascii_lowercase(), tag.to_ascii_lowercase());
    range == tag || tag.starts_with(&format!("{range}-")) || range.starts_with(&format!("{tag}-"))
}

fn resolve_language(profile: &ProfileDescriptor, hints: &RequestHints) -> String {
    if let Some(requested) = &hints.language {
        if let Some(lang) = profile.languages.iter().find(|l| l.eq_ignore_ascii_case(requested.trim())) {
            return lang.clone();
        }
    }
    if let Some(header) = &hints.accept_language {
        for entry in by_preference(header).into_iter().filter(|e| e.q > 0.0) {
            if entry.value == "*" {
                break;
            }
            if let Some(lang) = profile.languages.iter().find(|l| language_match(entry.value, l)) {
                return lang.clone();
            }
        }
    }
    profile.default_language.clone()
}

/// Determines profile, media type and language for a resource that supports the given profile tokens.
///
/// The default token should be registered, otherwise the first registered profile is used as a last resort.
pub fn negotiate(registry: &ProfileRegistry, supported: &[&str], default: &str, hints: &RequestHints) -> NegotiationOutcome {
    let choice = resolve_profile(registry, supported, default, hints);
    let (profile, is_profiles_list_request) = match choice {
        Some(ProfileChoice::Alternates) => (registry.get(ALT).ok().or_else(|| registry.get(default).ok()), true),
        Some(ProfileChoice::Profile(p)) => (Some(p), false),
        None => {
            log::warn!("default profile '{default}' is not registered");
            (registry.all().next(), false)
        }
    };
    match profile {
        Some(profile) => NegotiationOutcome {
            profile: if is_profiles_list_request { ALT.to_owned() } else { profile.token.clone() },
            media_type: resolve_media_type(profile, hints),
            language: resolve_language(profile, hints),
            is_profiles_list_request,
        },
        // empty registry
        None => NegotiationOutcome {
            profile: if is_profiles_list_request { ALT.to_owned() } else { default.to_owned() },
            media_type: crate::profile::media::HTML.to_owned(),
            language: String::new(),
            is_profiles_list_request,
        },
    }
}
