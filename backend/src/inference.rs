use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use actix_web::web;
use log::{info, warn};
use tokio::sync::OnceCell;
use tract_onnx::prelude::*;

use crate::error::{ZoneError, ZoneResult};
use crate::models::{ModelInfo, PredictionResult};
use crate::preprocess::{InputTensor, INPUT_SHAPE};

/// A loaded classifier. Shared read-only by every in-flight request.
pub trait ZoneModel: Send + Sync {
    /// Raw model output for one batch.
    fn predict(&self, input: &InputTensor) -> anyhow::Result<tract_ndarray::ArrayD<f32>>;
}

/// Reads a model artifact from storage. Blocking; always called off the async
/// workers.
pub trait ModelSource: Send + Sync {
    fn load(&self, path: &Path) -> anyhow::Result<Arc<dyn ZoneModel>>;
}

pub struct TractZoneModel {
    model: TypedRunnableModel<TypedModel>,
}

impl TractZoneModel {
    pub fn load<P: AsRef<Path>>(model_path: P) -> TractResult<Self> {
        let [n, h, w, c] = INPUT_SHAPE;
        let model = tract_onnx::onnx()
            .model_for_path(model_path)?
            .with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), tvec!(n, h, w, c)))?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self { model })
    }
}

impl ZoneModel for TractZoneModel {
    fn predict(&self, input: &InputTensor) -> anyhow::Result<tract_ndarray::ArrayD<f32>> {
        let tensor: Tensor = input.as_array().clone().into();
        let outputs = self.model.run(tvec!(tensor.into()))?;

        let first = outputs
            .first()
            .ok_or_else(|| anyhow::anyhow!("model produced no outputs"))?;
        Ok(first.to_array_view::<f32>()?.to_owned())
    }
}

/// Loads ONNX exports with tract.
pub struct OnnxModelSource;

impl ModelSource for OnnxModelSource {
    fn load(&self, path: &Path) -> anyhow::Result<Arc<dyn ZoneModel>> {
        Ok(Arc::new(TractZoneModel::load(path)?))
    }
}

/// Lazily loaded, process-lifetime model handle.
///
/// The first `get` performs the load; concurrent callers wait on the same
/// load instead of starting their own. A failed load leaves the cache empty
/// so the next request tries again.
pub struct ModelCache {
    source: Arc<dyn ModelSource>,
    path: PathBuf,
    model: OnceCell<Arc<dyn ZoneModel>>,
}

impl ModelCache {
    pub fn new(source: Arc<dyn ModelSource>, path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            path: path.into(),
            model: OnceCell::new(),
        }
    }

    pub fn onnx(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(OnnxModelSource), path)
    }

    pub async fn get(&self) -> ZoneResult<Arc<dyn ZoneModel>> {
        let model = self
            .model
            .get_or_try_init(|| async {
                let source = Arc::clone(&self.source);
                let path = self.path.clone();
                let start = Instant::now();
                info!("Loading zoning model from {}", path.display());

                let loaded = web::block(move || source.load(&path))
                    .await
                    .map_err(|e| ZoneError::model_load(format!("loader task failed: {e}")))?
                    .map_err(|e| {
                        warn!("Model load failed: {e:#}");
                        ZoneError::model_load(format!("{e:#}"))
                    })?;

                info!("Model loaded in {} ms", start.elapsed().as_millis());
                Ok::<_, ZoneError>(loaded)
            })
            .await?;

        Ok(Arc::clone(model))
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            model_path: self.path.display().to_string(),
            input_shape: INPUT_SHAPE.to_vec(),
            classes: vec![6, 8],
            loaded: self.is_loaded(),
        }
    }
}

/// Runs the forward pass on the blocking pool and classifies the first batch
/// element.
pub async fn infer(model: Arc<dyn ZoneModel>, tensor: InputTensor) -> ZoneResult<PredictionResult> {
    let output = web::block(move || model.predict(&tensor))
        .await
        .map_err(|e| ZoneError::inference(format!("inference task failed: {e}")))?
        .map_err(|e| ZoneError::inference(format!("{e:#}")))?;

    classify_output(&output)
}

pub fn classify_output(output: &tract_ndarray::ArrayD<f32>) -> ZoneResult<PredictionResult> {
    if output.ndim() < 2 || output.shape()[0] == 0 {
        return Err(ZoneError::inference(format!(
            "unexpected output shape {:?}",
            output.shape()
        )));
    }

    let probs: Vec<f32> = output
        .index_axis(tract_ndarray::Axis(0), 0)
        .iter()
        .copied()
        .collect();

    PredictionResult::from_probabilities(&probs)
}
