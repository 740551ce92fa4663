use super::mask::PersonMask;
use super::preprocess::{Normalization, Preprocessor};
use super::types::{QualityLevel, SegmentationError, SegmentationModel};
use anyhow::Result;
use image::RgbImage;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;

/// MODNet portrait matting model
///
/// Single input `[1, 3, H, W]` in [-1, 1], single matte output `[1, 1, H, W]`.
/// H and W must be multiples of 32.
pub struct Modnet {
    session: Session,
}

impl Modnet {
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let path = model_path.as_ref();

        tracing::info!("Loading MODNet model from {}", path.display());
        let session = super::load_session(path)?;
        anyhow::ensure!(
            session.inputs.len() == 1 && !session.outputs.is_empty(),
            "{} does not look like a MODNet model ({} inputs, {} outputs)",
            path.display(),
            session.inputs.len(),
            session.outputs.len()
        );
        tracing::info!("MODNet model loaded successfully");

        Ok(Self { session })
    }
}

impl SegmentationModel for Modnet {
    fn segment(
        &mut self,
        image: &RgbImage,
        quality: QualityLevel,
    ) -> Result<PersonMask, SegmentationError> {
        let _span = tracing::debug_span!("modnet_segment").entered();

        let (width, height) = self.input_size(quality);
        let input_tensor = Preprocessor::new(width, height, Normalization::Symmetric).preprocess(image)?;

        let _infer_span = tracing::debug_span!("inference").entered();
        let outputs = self
            .session
            .run(ort::inputs![Tensor::from_array(input_tensor)?])?;
        drop(_infer_span);

        let (shape, matte) = outputs[0].try_extract_tensor::<f32>()?;

        Preprocessor::postprocess_matte(shape, matte)
    }

    fn input_size(&self, quality: QualityLevel) -> (u32, u32) {
        let side = match quality {
            QualityLevel::Fast => 256,
            QualityLevel::Balanced => 384,
            QualityLevel::Accurate => 512,
        };
        (side, side)
    }

    fn name(&self) -> &'static str {
        "modnet"
    }
}
