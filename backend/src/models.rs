use serde::{Deserialize, Serialize};

use crate::error::{ZoneError, ZoneResult};

/// Body of `POST /api/predict`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PredictRequest {
    #[serde(default)]
    pub address: Option<String>,
}

impl PredictRequest {
    pub fn validate(&self) -> ZoneResult<&str> {
        match self.address.as_deref() {
            Some(address) if !address.is_empty() => Ok(address),
            _ => Err(ZoneError::Validation),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Zoning categories the model was trained on. Output index 0 is `Six`,
/// index 1 is `Eight`.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(into = "u8")]
pub enum ZoneClass {
    Six,
    Eight,
}

impl From<ZoneClass> for u8 {
    fn from(zone: ZoneClass) -> u8 {
        match zone {
            ZoneClass::Six => 6,
            ZoneClass::Eight => 8,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PredictionResult {
    pub zones: ZoneClass,
    pub confidence: f32,
}

impl PredictionResult {
    /// Strict greater-than on index 0: ties go to `Eight`. Confidence is the
    /// max over the whole vector.
    pub fn from_probabilities(probs: &[f32]) -> ZoneResult<Self> {
        if probs.len() < 2 {
            return Err(ZoneError::inference(format!(
                "expected at least 2 probabilities, got {}",
                probs.len()
            )));
        }

        let zones = if probs[0] > probs[1] {
            ZoneClass::Six
        } else {
            ZoneClass::Eight
        };
        let confidence = probs.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        Ok(PredictionResult { zones, confidence })
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn new(error: &str) -> Self {
        ErrorBody {
            error: error.to_string(),
            detail: None,
        }
    }

    pub fn with_detail(error: &str, detail: impl Into<String>) -> Self {
        ErrorBody {
            error: error.to_string(),
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub model_loaded: bool,
    pub timestamp: String,
}

impl HealthStatus {
    pub fn ok(model_loaded: bool) -> Self {
        HealthStatus {
            status: "ok",
            model_loaded,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub model_path: String,
    pub input_shape: Vec<usize>,
    pub classes: Vec<u8>,
    pub loaded: bool,
}
