use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use log::{error, info};

use zoning_api::config::AppConfig;
use zoning_api::geocode::GoogleGeocoder;
use zoning_api::imagery::GoogleStaticMaps;
use zoning_api::inference::ModelCache;
use zoning_api::pipeline::ZonePipeline;
use zoning_api::routes;

fn build_pipeline(config: &AppConfig) -> io::Result<ZonePipeline> {
    let client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(io::Error::other)?;

    let geocoder = GoogleGeocoder::new(client.clone(), &config.geocode_url, &config.maps_key);
    let imagery = GoogleStaticMaps::new(client, &config.staticmap_url, &config.maps_key);

    Ok(ZonePipeline::new(
        Arc::new(geocoder),
        Arc::new(imagery),
        ModelCache::onnx(&config.model_path),
    ))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {e:#}");
        io::Error::new(io::ErrorKind::InvalidInput, format!("{e:#}"))
    })?;

    let pipeline = web::Data::new(build_pipeline(&config)?);
    let bind_address = config.bind_address();

    info!("Starting zoning prediction API on http://{}", bind_address);
    info!("Workers: {}", config.workers);
    info!("Model: {} (loaded on first prediction)", config.model_path.display());
    info!("Endpoints:");
    info!("   POST /api/predict      - zoning prediction for an address");
    info!("   GET  /api/health       - health check");
    info!("   GET  /api/model-info   - model contract");

    let cors_origin = config.cors_origin.clone();
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST"])
            .allowed_header(actix_web::http::header::CONTENT_TYPE)
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .wrap(cors)
            .app_data(pipeline.clone())
            .configure(routes::configure)
    })
    .workers(config.workers)
    .bind(&bind_address)?
    .run()
    .await
}
