mod mask;
mod modnet;
mod preprocess;
mod rvm;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use mask::PersonMask;
pub use modnet::Modnet;
pub use rvm::RobustVideoMatting;
pub use types::{QualityLevel, SegmentationError, SegmentationModel};

use anyhow::{Context, Result};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::path::Path;

/// Supported ONNX segmentation architectures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ModelKind {
    #[default]
    Rvm,
    Modnet,
}

/// Load a segmentation model of the given kind
pub fn create_model(kind: ModelKind, model_path: &Path) -> Result<Box<dyn SegmentationModel>> {
    let model: Box<dyn SegmentationModel> = match kind {
        ModelKind::Rvm => Box::new(RobustVideoMatting::new(model_path)?),
        ModelKind::Modnet => Box::new(Modnet::new(model_path)?),
    };
    Ok(model)
}

/// Build an ONNX Runtime session with the execution providers enabled at compile time
fn load_session(path: &Path) -> Result<Session> {
    let builder = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(4)?;

    #[cfg(feature = "tensorrt")]
    let builder = builder.with_execution_providers([
        ort::execution_providers::TensorRTExecutionProvider::default().build(),
    ])?;

    #[cfg(feature = "cuda")]
    let builder = builder.with_execution_providers([
        ort::execution_providers::CUDAExecutionProvider::default().build(),
    ])?;

    let session = builder
        .commit_from_file(path)
        .with_context(|| format!("Failed to load model from {}", path.display()))?;

    tracing::debug!(
        "Model inputs: {:?}",
        session.inputs.iter().map(|i| i.name.as_str()).collect::<Vec<_>>()
    );

    Ok(session)
}
