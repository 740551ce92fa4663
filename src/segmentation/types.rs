use super::mask::PersonMask;
use image::RgbImage;
use thiserror::Error;

/// Inference quality requested from a segmentation model
///
/// Higher quality runs the model at a larger input resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum QualityLevel {
    Fast,
    Balanced,
    #[default]
    Accurate,
}

#[derive(Debug, Error)]
pub enum SegmentationError {
    #[error("no segmentation model is loaded")]
    Unavailable,

    #[error("cannot segment an empty {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },

    #[error("model produced no person mask")]
    NoObservation,

    #[error("unexpected model output: {0}")]
    UnexpectedOutput(String),

    #[error("inference failed: {0}")]
    Inference(#[from] ort::Error),
}

/// Trait for segmentation models
/// Allows swapping between different backends (RVM, MODNet, ...)
pub trait SegmentationModel {
    /// Segment the person in an image
    ///
    /// # Arguments
    /// * `image` - Input RGB image
    /// * `quality` - Requested quality level
    ///
    /// # Returns
    /// * 8-bit person mask at the model's native output resolution
    fn segment(
        &mut self,
        image: &RgbImage,
        quality: QualityLevel,
    ) -> Result<PersonMask, SegmentationError>;

    /// Get the model's input dimensions for a quality level
    ///
    /// Returns (width, height)
    fn input_size(&self, quality: QualityLevel) -> (u32, u32);

    /// Short human-readable model name used in logs
    fn name(&self) -> &'static str;
}
