use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info};

use crate::error::{ZoneError, ZoneResult};
use crate::geocode::Geocoder;
use crate::imagery::ImageryProvider;
use crate::inference::{infer, ModelCache};
use crate::models::{PredictRequest, PredictionResult};
use crate::preprocess::preprocess;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validated,
    Geocoded,
    ImageFetched,
    Preprocessed,
    ModelReady,
    Predicted,
    Responded,
    Failed,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Responded | Stage::Failed)
    }

    /// The only forward move allowed from `self`. Terminal stages have none.
    pub fn next(self) -> Option<Stage> {
        use Stage::*;
        match self {
            Received => Some(Validated),
            Validated => Some(Geocoded),
            Geocoded => Some(ImageFetched),
            ImageFetched => Some(Preprocessed),
            Preprocessed => Some(ModelReady),
            ModelReady => Some(Predicted),
            Predicted => Some(Responded),
            Responded | Failed => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Per-request progress through the stages, with transition logging.
#[derive(Debug)]
pub struct RequestTrace {
    id: u64,
    stage: Stage,
    failed_at: Option<Stage>,
    started: Instant,
}

impl RequestTrace {
    fn new(id: u64) -> Self {
        debug!("request #{id}: {}", Stage::Received);
        Self {
            id,
            stage: Stage::Received,
            failed_at: None,
            started: Instant::now(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The stage that was being attempted when the request failed.
    pub fn failed_at(&self) -> Option<Stage> {
        self.failed_at
    }

    fn advance(&mut self) {
        if let Some(next) = self.stage.next() {
            debug!("request #{}: {} -> {}", self.id, self.stage, next);
            self.stage = next;
        }
    }

    fn fail(&mut self, err: ZoneError) -> ZoneError {
        let attempted = self.stage.next().unwrap_or(self.stage);
        error!("request #{} failed reaching {}: {}", self.id, attempted, err);
        self.failed_at = Some(attempted);
        self.stage = Stage::Failed;
        err
    }
}

/// Address in, zoning prediction out. One linear pass per request; no stage
/// is retried.
pub struct ZonePipeline {
    geocoder: Arc<dyn Geocoder>,
    imagery: Arc<dyn ImageryProvider>,
    model: ModelCache,
    next_id: AtomicU64,
}

impl ZonePipeline {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        imagery: Arc<dyn ImageryProvider>,
        model: ModelCache,
    ) -> Self {
        Self {
            geocoder,
            imagery,
            model,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn model(&self) -> &ModelCache {
        &self.model
    }

    pub async fn predict(&self, request: &PredictRequest) -> ZoneResult<PredictionResult> {
        let mut trace = RequestTrace::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        match self.run(request, &mut trace).await {
            Ok(result) => {
                trace.advance();
                info!(
                    "request #{}: zone={} confidence={:.3} in {} ms",
                    trace.id,
                    u8::from(result.zones),
                    result.confidence,
                    trace.started.elapsed().as_millis()
                );
                Ok(result)
            }
            Err(err) => Err(trace.fail(err)),
        }
    }

    async fn run(
        &self,
        request: &PredictRequest,
        trace: &mut RequestTrace,
    ) -> ZoneResult<PredictionResult> {
        let address = request.validate()?;
        trace.advance();

        let coord = self.geocoder.geocode(address).await?;
        trace.advance();

        let bytes = self.imagery.fetch_satellite_image(coord).await?;
        trace.advance();

        let tensor = preprocess(&bytes)?;
        trace.advance();

        let model = self.model.get().await?;
        trace.advance();

        let result = infer(model, tensor).await?;
        trace.advance();

        Ok(result)
    }
}
