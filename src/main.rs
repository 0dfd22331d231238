use actix_web::{middleware, web, App, HttpServer};
use std::time::Instant;
use vocview::cache::VocabCache;
use vocview::config::Config;
use vocview::server::{routes, AppState};
use vocview::source::Source;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let t = Instant::now();
    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Cannot load configuration: {e}. Check data/config.toml and VOCVIEW_* environment variables.");
            std::process::exit(1);
        }
    };
    // RUST_LOG overrides the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_deref().unwrap_or("info"))).init();
    if let Err(e) = config.validate() {
        log::error!("{e}");
        std::process::exit(1);
    }
    let sources: Vec<Source> = config
        .sources
        .iter()
        .filter_map(|c| Source::from_config(c).map_err(|e| log::error!("{e}")).ok())
        .collect();
    if sources.is_empty() {
        log::warn!("No vocabulary source could be loaded, serving an empty register");
    }
    let cache = VocabCache::build(sources, config.default_language());
    log::info!("{} vocabularies loaded in {:?}", cache.entries().len(), t.elapsed());
    let port = config.port;
    log::info!("Serving {} at {} on port {port}", config.title, config.base);
    let state = web::Data::new(AppState::new(config, cache));
    HttpServer::new(move || App::new().wrap(middleware::Logger::default()).app_data(state.clone()).configure(routes)).bind(("0.0.0.0", port))?.run().await
}
