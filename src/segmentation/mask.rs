use super::types::SegmentationError;
use image::{imageops, GrayImage, Luma};

/// Single-channel person confidence mask: 0 = background, 255 = person
#[derive(Debug, Clone, PartialEq)]
pub struct PersonMask {
    buffer: GrayImage,
}

impl PersonMask {
    pub fn new(buffer: GrayImage) -> Self {
        Self { buffer }
    }

    /// Build a mask from a row-major float matte with values in [0, 1]
    ///
    /// Values outside the range are clamped.
    pub fn from_matte(matte: &[f32], width: u32, height: u32) -> Result<Self, SegmentationError> {
        if width == 0 || height == 0 {
            return Err(SegmentationError::NoObservation);
        }

        let expected = width as usize * height as usize;
        if matte.len() != expected {
            return Err(SegmentationError::UnexpectedOutput(format!(
                "matte has {} values, expected {}x{}={}",
                matte.len(),
                width,
                height,
                expected
            )));
        }

        let buffer = GrayImage::from_fn(width, height, |x, y| {
            let idx = (y * width + x) as usize;
            let value = (matte[idx] * 255.0).round().clamp(0.0, 255.0) as u8;
            Luma([value])
        });

        Ok(Self::new(buffer))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.width() == 0 || self.buffer.height() == 0
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.buffer
    }

    pub fn into_gray(self) -> GrayImage {
        self.buffer
    }

    /// Horizontal and vertical factors that map this mask onto a target size
    pub fn scale_factors(&self, target_width: u32, target_height: u32) -> (f32, f32) {
        let (width, height) = self.dimensions();
        (
            target_width as f32 / width as f32,
            target_height as f32 / height as f32,
        )
    }

    /// Resample the mask so it aligns pixel for pixel with a `width` x `height` image
    ///
    /// The x and y axes are scaled independently, with no offset.
    pub fn scaled_to(&self, width: u32, height: u32) -> PersonMask {
        let _span = tracing::debug_span!("rescale_mask").entered();

        if self.dimensions() == (width, height) {
            return self.clone();
        }

        let (scale_x, scale_y) = self.scale_factors(width, height);
        tracing::debug!(
            "Scaling mask {}x{} -> {}x{} (sx={:.3}, sy={:.3})",
            self.buffer.width(),
            self.buffer.height(),
            width,
            height,
            scale_x,
            scale_y
        );

        let buffer = imageops::resize(&self.buffer, width, height, imageops::FilterType::Triangle);
        Self::new(buffer)
    }

    /// Mask with every confidence flipped (person becomes 0)
    pub fn inverted(&self) -> PersonMask {
        let mut buffer = self.buffer.clone();
        imageops::invert(&mut buffer);
        Self::new(buffer)
    }
}
