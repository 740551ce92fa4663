use super::mask::PersonMask;
use super::preprocess::{Normalization, Preprocessor};
use super::types::{QualityLevel, SegmentationError, SegmentationModel};
use anyhow::Result;
use image::RgbImage;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;

/// RobustVideoMatting segmentation model
///
/// RVM is recurrent, but each photo is segmented on its own: the hidden
/// states (r1-r4) are zero on every call, so nothing carries over between
/// invocations.
pub struct RobustVideoMatting {
    session: Session,
}

impl RobustVideoMatting {
    /// Create a new RVM model from an ONNX file
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let path = model_path.as_ref();

        tracing::info!("Loading RVM model from {}", path.display());
        let session = super::load_session(path)?;
        anyhow::ensure!(
            session.inputs.len() == 6 && session.outputs.len() >= 2,
            "{} does not look like an RVM model ({} inputs, {} outputs)",
            path.display(),
            session.inputs.len(),
            session.outputs.len()
        );
        tracing::info!("RVM model loaded successfully");

        Ok(Self { session })
    }

    /// Input side length and downsample ratio for a quality level
    ///
    /// The downsample ratio sets the resolution of the recurrent hidden
    /// states relative to the input.
    fn settings(quality: QualityLevel) -> (u32, f32) {
        match quality {
            QualityLevel::Fast => (256, 0.25),
            QualityLevel::Balanced => (512, 0.25),
            QualityLevel::Accurate => (512, 0.5),
        }
    }

    fn zero_state() -> Result<Tensor<f32>, SegmentationError> {
        Ok(Tensor::from_array(([1usize, 1, 1, 1], vec![0.0f32]))?)
    }
}

impl SegmentationModel for RobustVideoMatting {
    fn segment(
        &mut self,
        image: &RgbImage,
        quality: QualityLevel,
    ) -> Result<PersonMask, SegmentationError> {
        let _span = tracing::debug_span!("rvm_segment").entered();

        let (width, height) = self.input_size(quality);
        let (_, downsample_ratio) = Self::settings(quality);

        let input_tensor = Preprocessor::new(width, height, Normalization::UnitRange).preprocess(image)?;

        // RVM expects: src, r1i, r2i, r3i, r4i, downsample_ratio
        let _infer_span = tracing::debug_span!("inference").entered();
        let outputs = self.session.run(ort::inputs![
            Tensor::from_array(input_tensor)?,
            Self::zero_state()?,
            Self::zero_state()?,
            Self::zero_state()?,
            Self::zero_state()?,
            Tensor::from_array(([1usize], vec![downsample_ratio]))?
        ])?;
        drop(_infer_span);

        // Outputs: fgr, pha, r1o, r2o, r3o, r4o; only pha (the matte) is needed
        let (shape, pha) = outputs[1].try_extract_tensor::<f32>()?;

        Preprocessor::postprocess_matte(shape, pha)
    }

    fn input_size(&self, quality: QualityLevel) -> (u32, u32) {
        let (side, _) = Self::settings(quality);
        (side, side)
    }

    fn name(&self) -> &'static str {
        "rvm"
    }
}
