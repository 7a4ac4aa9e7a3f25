use actix_web::error::InternalError;
use actix_web::{get, post, web, HttpResponse, Responder};

use crate::error::ZoneError;
use crate::models::{ErrorBody, HealthStatus, PredictRequest};
use crate::pipeline::ZonePipeline;

const JSON_LIMIT: usize = 64 * 1024;

#[post("/api/predict")]
pub async fn predict(
    pipeline: web::Data<ZonePipeline>,
    req: web::Json<PredictRequest>,
) -> Result<HttpResponse, ZoneError> {
    let result = pipeline.predict(&req).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[get("/api/health")]
pub async fn health_check(pipeline: web::Data<ZonePipeline>) -> impl Responder {
    HttpResponse::Ok().json(HealthStatus::ok(pipeline.model().is_loaded()))
}

#[get("/api/model-info")]
pub async fn model_info(pipeline: web::Data<ZonePipeline>) -> impl Responder {
    HttpResponse::Ok().json(pipeline.model().info())
}

async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(ErrorBody::new("Not found"))
}

/// A body we cannot read as `{ "address": <string> }` is treated the same as
/// one without an address.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| {
            log::warn!("Rejected predict body: {err}");
            let response = HttpResponse::BadRequest().json(ErrorBody::new("Missing address"));
            InternalError::from_response(err, response).into()
        })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(predict)
        .service(health_check)
        .service(model_info)
        .default_service(web::route().to(not_found));
}
