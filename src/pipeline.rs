use crate::compositing::{BlurTarget, CompositeError, Compositor};
use crate::segmentation::{PersonMask, QualityLevel, SegmentationError, SegmentationModel};
use image::{GrayImage, RgbImage, RgbaImage};
use std::time::Instant;
use thiserror::Error;

/// Blur radius applied to the background when none is configured
pub const DEFAULT_BLUR_RADIUS: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub quality: QualityLevel,
    pub blur_radius: f32,
    pub blur_target: BlurTarget,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            quality: QualityLevel::Accurate,
            blur_radius: DEFAULT_BLUR_RADIUS,
            blur_target: BlurTarget::Background,
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("mask acquisition failed: {0}")]
    MaskAcquisition(#[source] SegmentationError),

    #[error("filter output could not be materialized: {0}")]
    Materialization(#[source] CompositeError),
}

/// Result of one pipeline run
///
/// On failure `foreground` is `None` and `background` holds the unmodified
/// source image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    pub foreground: Option<RgbaImage>,
    pub background: Option<RgbImage>,
    /// Person mask scaled to the source, present only on success
    pub mask: Option<GrayImage>,
}

impl PipelineOutput {
    fn fallback(source: &RgbImage) -> Self {
        Self {
            foreground: None,
            background: Some(source.clone()),
            mask: None,
        }
    }
}

/// Image to (foreground, blurred background) pipeline
///
/// Segmentation and compositing are injected; no state is kept between
/// calls to [`SegmentationPipeline::process`].
pub struct SegmentationPipeline {
    model: Option<Box<dyn SegmentationModel>>,
    compositor: Box<dyn Compositor>,
    config: PipelineConfig,
}

impl SegmentationPipeline {
    /// Create a pipeline; without a model every run falls back to the source image
    pub fn new(
        model: Option<Box<dyn SegmentationModel>>,
        compositor: Box<dyn Compositor>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            model,
            compositor,
            config,
        }
    }

    /// Split an image into a cut-out person and a blurred background
    ///
    /// Never fails: segmentation or filter errors are logged and degrade to
    /// `(None, source)`. A missing image yields `(None, None)`.
    pub fn process(&mut self, image: Option<&RgbImage>) -> PipelineOutput {
        let Some(source) = image else {
            return PipelineOutput::default();
        };

        match self.try_process(source) {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!("{}; returning the source image as background", err);
                PipelineOutput::fallback(source)
            }
        }
    }

    fn try_process(&mut self, source: &RgbImage) -> Result<PipelineOutput, PipelineError> {
        let _span = tracing::debug_span!("process").entered();
        let (width, height) = source.dimensions();

        let segment_start = Instant::now();
        let mask = self
            .acquire_mask(source)
            .map_err(PipelineError::MaskAcquisition)?;
        tracing::debug!(
            "Mask {}x{} acquired in {:.1}ms",
            mask.dimensions().0,
            mask.dimensions().1,
            segment_start.elapsed().as_secs_f64() * 1000.0
        );

        let scaled = mask.scaled_to(width, height);

        let composite_start = Instant::now();
        let foreground = self
            .compositor
            .blend_with_mask(source, scaled.as_gray())
            .map_err(PipelineError::Materialization)?;

        let guide = match self.config.blur_target {
            BlurTarget::Background => scaled.inverted(),
            BlurTarget::Foreground => scaled.clone(),
        };
        let background = self
            .compositor
            .masked_variable_blur(source, guide.as_gray(), self.config.blur_radius)
            .map_err(PipelineError::Materialization)?;
        tracing::debug!(
            "Composited in {:.1}ms",
            composite_start.elapsed().as_secs_f64() * 1000.0
        );

        // Both outputs must cover the source extent
        for dimensions in [foreground.dimensions(), background.dimensions()] {
            if dimensions != (width, height) {
                return Err(PipelineError::Materialization(
                    CompositeError::DimensionMismatch {
                        image_width: width,
                        image_height: height,
                        mask_width: dimensions.0,
                        mask_height: dimensions.1,
                    },
                ));
            }
        }

        Ok(PipelineOutput {
            foreground: Some(foreground),
            background: Some(background),
            mask: Some(scaled.into_gray()),
        })
    }

    fn acquire_mask(&mut self, source: &RgbImage) -> Result<PersonMask, SegmentationError> {
        let model = self.model.as_mut().ok_or(SegmentationError::Unavailable)?;

        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(SegmentationError::EmptyImage { width, height });
        }

        let (input_width, input_height) = model.input_size(self.config.quality);
        tracing::debug!(
            "Segmenting {}x{} with {} at {}x{}",
            width,
            height,
            model.name(),
            input_width,
            input_height
        );
        let mask = model.segment(source, self.config.quality)?;
        if mask.is_empty() {
            return Err(SegmentationError::NoObservation);
        }

        Ok(mask)
    }
}
