use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorBody;

pub type ZoneResult<T> = Result<T, ZoneError>;

/// Every way a prediction request can fail.
///
/// `Validation` and `Geocode` are caller problems (400); everything else is
/// ours or a dependency's (500).
#[derive(Error, Debug)]
pub enum ZoneError {
    #[error("Missing address")]
    Validation,

    #[error("geocoding failed: {0}")]
    Geocode(String),

    #[error("image fetch failed: {0}")]
    ImageFetch(String),

    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("model load failed: {0}")]
    ModelLoad(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

impl ZoneError {
    pub fn geocode(msg: impl Into<String>) -> Self {
        Self::Geocode(msg.into())
    }

    pub fn image_fetch(msg: impl Into<String>) -> Self {
        Self::ImageFetch(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation | Self::Geocode(_))
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Validation => ErrorBody::new("Missing address"),
            Self::Geocode(_) => ErrorBody::new("Invalid address"),
            _ => ErrorBody::with_detail("Prediction failed", self.to_string()),
        }
    }
}

impl ResponseError for ZoneError {
    fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}
