//! HTTP routes. Every resource route negotiates profile, media type and language from the request,
//! source access runs on the blocking thread pool.
use crate::about::About;
use crate::cache::VocabCache;
use crate::config::Config;
use crate::error::SourceError;
use crate::negotiate::{negotiate, RequestHints};
use crate::profile::ProfileRegistry;
use crate::render::{link_header, render, RenderContext};
use crate::resource::Resource;
use actix_web::error::BlockingError;
use actix_web::http::header;
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use std::collections::HashMap;
use std::time::Instant;
use url::form_urlencoded;

const CSS: &str = std::include_str!("../data/vocview.css");
const CSS_ETAG: u32 = const_fnv1a_hash::fnv1a_hash_str_32(CSS);

/// Shared read-only state of all workers.
pub struct AppState {
    pub config: Config,
    pub registry: ProfileRegistry,
    pub cache: VocabCache,
}

impl AppState {
    pub fn new(config: Config, cache: VocabCache) -> Self {
        let registry = ProfileRegistry::builtin(&config.languages, config.default_language());
        AppState { config, registry, cache }
    }
}

type Lookup = Result<Result<Option<Resource>, SourceError>, BlockingError>;

/// Request path with the query parameters that do not influence negotiation.
fn target(path: &str, query: &[(String, String)]) -> String {
    let kept: Vec<&(String, String)> = query.iter().filter(|(k, _)| !k.starts_with('_')).collect();
    if kept.is_empty() {
        return path.to_owned();
    }
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (k, v) in kept {
        serializer.append_pair(k, v);
    }
    format!("{path}?{}", serializer.finish())
}

fn respond(state: &AppState, req: &HttpRequest, resource: &Resource) -> HttpResponse {
    let t = Instant::now();
    let query: Vec<(String, String)> = form_urlencoded::parse(req.query_string().as_bytes()).into_owned().collect();
    let params: HashMap<String, String> = query.iter().cloned().collect();
    let hints = RequestHints::from_request(&params, |name| req.headers().get(name).and_then(|v| v.to_str().ok()));
    let outcome = negotiate(&state.registry, resource.supported_profiles(), resource.default_profile(), &hints);
    let target = target(req.path(), &query);
    let ctx = RenderContext { base: &state.config.base, site_title: &state.config.title, target: &target };
    match render(resource, &outcome, &state.registry, &ctx) {
        Ok(rendered) => {
            log::debug!("{} as {} {} ({}) in {:?}", resource.uri(), outcome.profile, rendered.content_type, rendered.language, t.elapsed());
            HttpResponse::Ok()
                .content_type(rendered.content_type.as_str())
                .insert_header(("Content-Profile", format!("<{}>", rendered.profile_uri)))
                .insert_header((header::CONTENT_LANGUAGE, rendered.language.as_str()))
                .insert_header((header::LINK, link_header(resource, &outcome, &state.registry, &target)))
                .body(rendered.body)
        }
        Err(e) => {
            log::error!("Cannot render {} as {} {}: {e}", resource.uri(), outcome.profile, outcome.media_type);
            HttpResponse::InternalServerError().body(format!("Cannot render {}: {e}", resource.uri()))
        }
    }
}

fn unknown_vocabulary(state: &AppState, id: &str) -> HttpResponse {
    HttpResponse::NotFound().content_type("text/plain").body(format!("No vocabulary with id '{id}'. Valid ids: {}", state.cache.ids().join(", ")))
}

/// Turns the result of a blocking source call into a response, `missing` describes what was not found.
fn lookup_response(state: &AppState, req: &HttpRequest, lookup: Lookup, missing: &str) -> HttpResponse {
    match lookup {
        Ok(Ok(Some(resource))) => respond(state, req, &resource),
        Ok(Ok(None)) => HttpResponse::NotFound().content_type("text/plain").body(format!("{missing} not found")),
        Ok(Err(e)) => {
            log::error!("{e}");
            HttpResponse::BadGateway().content_type("text/plain").body(e.to_string())
        }
        Err(e) => {
            log::error!("{e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/")]
async fn index(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let register = state.cache.register(&state.config.base, &state.config.title);
    respond(&state, &req, &register)
}

#[get("/vocab/{id}")]
async fn vocabulary(state: web::Data<AppState>, id: web::Path<String>, req: HttpRequest) -> impl Responder {
    let id = id.into_inner();
    if state.cache.lookup(&id).is_none() {
        return unknown_vocabulary(&state, &id);
    }
    let shared = state.clone();
    let lookup_id = id.clone();
    let lookup = web::block(move || shared.cache.get_vocabulary(&lookup_id)).await;
    lookup_response(&state, &req, lookup, &format!("Vocabulary {id}"))
}

#[get("/vocab/{id}/concept/")]
async fn concepts(state: web::Data<AppState>, id: web::Path<String>, req: HttpRequest) -> impl Responder {
    let id = id.into_inner();
    if state.cache.lookup(&id).is_none() {
        return unknown_vocabulary(&state, &id);
    }
    let shared = state.clone();
    let lookup_id = id.clone();
    let lookup = web::block(move || shared.cache.list_concepts(&lookup_id, &shared.config.base)).await;
    lookup_response(&state, &req, lookup, &format!("Vocabulary {id}"))
}

#[get("/object")]
async fn object(state: web::Data<AppState>, query: web::Query<HashMap<String, String>>, req: HttpRequest) -> impl Responder {
    let (Some(id), Some(uri)) = (query.get("vocab_id").cloned(), query.get("uri").cloned()) else {
        return HttpResponse::BadRequest().content_type("text/plain").body("Query parameters vocab_id and uri are required");
    };
    if state.cache.lookup(&id).is_none() {
        return unknown_vocabulary(&state, &id);
    }
    let shared = state.clone();
    let (lookup_id, lookup_uri) = (id.clone(), uri.clone());
    let lookup = web::block(move || shared.cache.get_object(&lookup_id, &lookup_uri)).await;
    lookup_response(&state, &req, lookup, &format!("Concept or collection {uri} of vocabulary {id}"))
}

#[get("/about")]
async fn about(state: web::Data<AppState>) -> impl Responder {
    match About::new(&state.cache, &state.registry).to_html(&state.config.base, &state.config.title, state.config.default_language()) {
        Ok(body) => HttpResponse::Ok().content_type("text/html; charset=utf-8").body(body),
        Err(e) => {
            log::error!("{e}");
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

#[get("/vocview.css")]
async fn css(req: HttpRequest) -> impl Responder {
    let etag = format!("\"{CSS_ETAG:x}\"");
    if req.headers().get(header::IF_NONE_MATCH).and_then(|v| v.to_str().ok()) == Some(etag.as_str()) {
        return HttpResponse::NotModified().finish();
    }
    HttpResponse::Ok().content_type("text/css").insert_header((header::ETAG, etag)).insert_header((header::CACHE_CONTROL, "public, max-age=86400")).body(CSS)
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index).service(vocabulary).service(concepts).service(object).service(about).service(css);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target() {
        let query = vec![("vocab_id".to_owned(), "rocks".to_owned()), ("_profile".to_owned(), "alt".to_owned()), ("uri".to_owned(), "http://x.org/a#b".to_owned())];
        assert_eq!(target("/object", &query), "/object?vocab_id=rocks&uri=http%3A%2F%2Fx.org%2Fa%23b");
        assert_eq!(target("/", &[("_mediatype".to_owned(), "text/turtle".to_owned())]), "/");
    }
}
