use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web};
use anyhow::{Context, Result};
use log::{info, warn};
use reqwest::Client;

use subrates::clock::SystemClock;
use subrates::config::Config;
use subrates::fetcher::QuoteFetcher;
use subrates::http::{self, AppState};
use subrates::quote::DolarApiSource;
use subrates::store::PgSnapshotStore;
use subrates::RateCache;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    info!(
        "Quotes from {}, rates keyed by day in {}",
        config.quotes_base_url, config.timezone
    );

    let client = Client::builder()
        .timeout(config.quotes_timeout)
        .build()
        .context("Can't build HTTP client")?;
    let source = DolarApiSource::new(client, config.quotes_base_url.clone(), config.quotes_timeout);
    let clock = Arc::new(SystemClock);
    let fetcher = QuoteFetcher::new(Arc::new(source), clock.clone());

    let mut cache = RateCache::new(Arc::new(fetcher), clock, config.timezone);
    if let Some(url) = &config.database_url {
        let store = PgSnapshotStore::connect(url, config.database_max_connections).await?;
        cache = cache.with_store(Arc::new(store));
    }
    let cache = Arc::new(cache);
    if let Err(e) = cache.restore().await {
        warn!("Can't restore persisted exchange rates: {:#}", e);
    }

    let state = web::Data::new(AppState { cache });

    info!("Listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(http::configure)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("Can't bind {}:{}", config.host, config.port))?
    .run()
    .await?;

    Ok(())
}
