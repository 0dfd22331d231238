use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use sophia::api::graph::Graph;
use sophia::api::source::TripleSource;
use sophia::api::term::Term;
use sophia::api::triple::Triple;
use sophia::inmem::graph::FastGraph;
use sophia::turtle::parser::turtle;
use vocview::cache::VocabCache;
use vocview::config::Config;
use vocview::ns::{skos, RDF_TYPE};
use vocview::server::{routes, AppState};
use vocview::source::{FileSource, Source};

const ROCKS: &str = "http://example.org/def/rock-types/";

fn state() -> web::Data<AppState> {
    let config = Config::from_toml("").unwrap();
    let file = FileSource::load("data/vocabs.ttl").unwrap();
    let cache = VocabCache::build(vec![Source::File(file)], config.default_language());
    web::Data::new(AppState::new(config, cache))
}

/// Status, selected headers and body of a GET request.
async fn get(uri: &str, headers: &[(&str, &str)]) -> (StatusCode, header::HeaderMap, String) {
    let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
    let mut req = test::TestRequest::get().uri(uri);
    for (name, value) in headers {
        req = req.insert_header((*name, *value));
    }
    let resp = test::call_service(&app, req.to_request()).await;
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = test::read_body(resp).await;
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

fn header_value<'a>(headers: &'a header::HeaderMap, name: &str) -> &'a str {
    headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or_default()
}

fn object_path(uri: &str) -> String {
    format!("/object?vocab_id=rock-types&uri={}", url::form_urlencoded::byte_serialize(uri.as_bytes()).collect::<String>())
}

#[actix_web::test]
async fn test_register() {
    let (status, headers, body) = get("/", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(header_value(&headers, "Content-Profile"), "<http://purl.org/linked-data/registry>");
    assert!(body.contains("Rock Types"));
    assert!(body.contains("http://localhost:8080/vocab/colours"));
    // register items are sorted by title
    assert!(body.find("Colours").unwrap() < body.find("Rock Types").unwrap());
}

#[actix_web::test]
async fn test_vocabulary_html() {
    let (status, headers, body) = get("/vocab/rock-types", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert!(header_value(&headers, "Content-Type").starts_with("text/html"));
    assert_eq!(header_value(&headers, "Content-Profile"), "<http://www.w3.org/2004/02/skos/core>");
    assert_eq!(header_value(&headers, "Content-Language"), "en");
    assert!(header_value(&headers, "Link").contains("</vocab/rock-types?_profile=skos&_mediatype=text%2Fhtml>; rel=\"self\""));
    assert!(body.contains("<h1>Rock Types</h1>"));
    assert!(body.contains("<ul class='hierarchy'>"));
    assert!(body.contains("building stones"));
}

#[actix_web::test]
async fn test_unoffered_language_falls_back() {
    let (_, headers, body) = get("/vocab/rock-types", &[("Accept-Language", "de")]).await;
    assert_eq!(header_value(&headers, "Content-Language"), "en");
    assert!(body.contains("<h1>Rock Types</h1>"));
    // only configured languages are offered
    let (_, _, body) = get("/vocab/rock-types?_lang=de", &[]).await;
    assert!(!body.contains("Gesteinsarten"));
}

#[actix_web::test]
async fn test_vocabulary_turtle_parses() {
    let (status, headers, body) = get("/vocab/rock-types", &[("Accept", "text/turtle")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(header_value(&headers, "Content-Type"), "text/turtle");
    let graph: FastGraph = turtle::parse_str(&body).collect_triples().unwrap();
    let is_scheme = graph.triples().flatten().any(|t| {
        t.s().iri().is_some_and(|s| s.as_str() == ROCKS)
            && t.p().iri().is_some_and(|p| p.as_str() == RDF_TYPE)
            && t.o().iri().is_some_and(|o| o.as_str() == skos::CONCEPT_SCHEME)
    });
    assert!(is_scheme);
}

#[actix_web::test]
async fn test_drop_down_list_order() {
    let (status, _, body) = get("/vocab/rock-types?_profile=dd", &[]).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    let labels: Vec<&str> = json.as_array().unwrap().iter().map(|e| e["label"].as_str().unwrap()).collect();
    assert_eq!(labels, vec![
        "igneous rock",
        "plutonic rock",
        "granite",
        "volcanic rock",
        "basalt",
        "metamorphic rock",
        "marble",
        "sedimentary rock",
        "limestone",
        "sandstone"
    ]);
}

#[actix_web::test]
async fn test_alternates() {
    let (status, _, body) = get("/vocab/rock-types?_profile=alt&_mediatype=application/json", &[]).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["default_profile"], "skos");
    let (_, headers, _) = get("/vocab/rock-types", &[("Accept-Profile", "<http://www.w3.org/ns/dx/conneg/altr>")]).await;
    assert_eq!(header_value(&headers, "Content-Profile"), "<http://www.w3.org/ns/dx/conneg/altr>");
}

#[actix_web::test]
async fn test_unknown_vocabulary() {
    let (status, _, body) = get("/vocab/minerals", &[]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("colours"));
    assert!(body.contains("rock-types"));
    let (status, _, _) = get("/object?vocab_id=minerals&uri=http%3A%2F%2Fx.org%2Fa", &[]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_concept_register() {
    let (status, _, body) = get("/vocab/rock-types/concept/", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("10 items"));
    assert!(body.contains(&object_path(&format!("{ROCKS}basalt")).replace('&', "&amp;")));
}

#[actix_web::test]
async fn test_concept() {
    let (status, _, body) = get(&object_path(&format!("{ROCKS}granite")), &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>granite</h1>"));
    assert!(body.contains("plutonic rock"));
    assert!(body.contains("granitic rock"));

    let (_, headers, body) = get(&format!("{}&_profile=dd", object_path(&format!("{ROCKS}plutonic"))), &[]).await;
    assert_eq!(header_value(&headers, "Content-Type"), "application/json");
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json[0]["parent"], format!("{ROCKS}igneous"));
    assert_eq!(json[1]["uri"], format!("{ROCKS}granite"));
}

#[actix_web::test]
async fn test_collection() {
    let (status, _, body) = get(&object_path(&format!("{ROCKS}building-stones")), &[("Accept", "application/n-triples")]).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&format!("<{ROCKS}building-stones> <{}> <{ROCKS}marble>", skos::MEMBER)));
}

#[actix_web::test]
async fn test_object_errors() {
    let (status, _, _) = get("/object?vocab_id=rock-types", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _, _) = get(&object_path(&format!("{ROCKS}obsidian")), &[]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_about() {
    let (status, _, body) = get("/about", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<tr><td>Vocabularies</td><td>2</td></tr>"));
}

#[actix_web::test]
async fn test_css_etag() {
    let (status, headers, _) = get("/vocview.css", &[]).await;
    assert_eq!(status, StatusCode::OK);
    let etag = header_value(&headers, "ETag").to_owned();
    assert!(!etag.is_empty());
    let (status, _, _) = get("/vocview.css", &[("If-None-Match", etag.as_str())]).await;
    assert_eq!(status, StatusCode::NOT_MODIFIED);
}
