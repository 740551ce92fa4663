use super::mask::PersonMask;
use super::types::SegmentationError;
use image::{imageops, RgbImage};
use ndarray::Array4;

/// How pixel values are mapped into the model's input range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// [0, 255] -> [0, 1]
    UnitRange,
    /// [0, 255] -> [-1, 1]
    Symmetric,
}

/// Preprocessor for converting RGB images to model input tensors
pub struct Preprocessor {
    target_width: u32,
    target_height: u32,
    normalization: Normalization,
}

impl Preprocessor {
    pub fn new(target_width: u32, target_height: u32, normalization: Normalization) -> Self {
        Self {
            target_width,
            target_height,
            normalization,
        }
    }

    /// Preprocess an RGB image into a normalized NCHW tensor
    ///
    /// Steps:
    /// 1. Resize to target dimensions
    /// 2. Convert to float and normalize
    /// 3. Transpose from HWC to NCHW format
    ///
    /// Returns: Array4<f32> with shape [1, 3, height, width]
    pub fn preprocess(&self, image: &RgbImage) -> Result<Array4<f32>, SegmentationError> {
        let _span = tracing::debug_span!("preprocess").entered();

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SegmentationError::EmptyImage { width, height });
        }

        // Resize if needed
        let resized = if image.dimensions() != (self.target_width, self.target_height) {
            imageops::resize(
                image,
                self.target_width,
                self.target_height,
                imageops::FilterType::Lanczos3,
            )
        } else {
            image.clone()
        };

        let (width, height) = resized.dimensions();
        let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

        for (x, y, pixel) in resized.enumerate_pixels() {
            for channel in 0..3 {
                tensor[[0, channel, y as usize, x as usize]] = self.normalize(pixel[channel]);
            }
        }

        Ok(tensor)
    }

    fn normalize(&self, value: u8) -> f32 {
        let unit = value as f32 / 255.0;
        match self.normalization {
            Normalization::UnitRange => unit,
            Normalization::Symmetric => (unit - 0.5) / 0.5,
        }
    }

    /// Turn a raw matte tensor into a person mask at model resolution
    ///
    /// Accepts `[1, 1, H, W]`, `[1, H, W]` or `[H, W]` shaped output.
    pub fn postprocess_matte(shape: &[i64], matte: &[f32]) -> Result<PersonMask, SegmentationError> {
        let _span = tracing::debug_span!("postprocess").entered();

        if shape.len() < 2 {
            return Err(SegmentationError::UnexpectedOutput(format!(
                "matte shape {:?} has fewer than two dimensions",
                shape
            )));
        }

        // Leading dimensions must be singleton batch / channel axes
        let (leading, spatial) = shape.split_at(shape.len() - 2);
        if leading.iter().any(|&d| d != 1) {
            return Err(SegmentationError::UnexpectedOutput(format!(
                "matte shape {:?} is not a single-channel image",
                shape
            )));
        }

        let height = u32::try_from(spatial[0]).map_err(|_| {
            SegmentationError::UnexpectedOutput(format!("invalid matte height {}", spatial[0]))
        })?;
        let width = u32::try_from(spatial[1]).map_err(|_| {
            SegmentationError::UnexpectedOutput(format!("invalid matte width {}", spatial[1]))
        })?;

        PersonMask::from_matte(matte, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_preprocess_shape_and_layout() {
        let mut image = RgbImage::new(4, 2);
        image.put_pixel(1, 0, Rgb([255, 0, 51]));

        let tensor = Preprocessor::new(4, 2, Normalization::UnitRange)
            .preprocess(&image)
            .unwrap();

        assert_eq!(tensor.shape(), &[1, 3, 2, 4]);
        assert_eq!(tensor[[0, 0, 0, 1]], 1.0);
        assert_eq!(tensor[[0, 1, 0, 1]], 0.0);
        assert!((tensor[[0, 2, 0, 1]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_preprocess_resizes_to_target() {
        let image = RgbImage::new(100, 30);
        let tensor = Preprocessor::new(32, 64, Normalization::UnitRange)
            .preprocess(&image)
            .unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 64, 32]);
    }

    #[test]
    fn test_symmetric_normalization() {
        let image = RgbImage::from_pixel(1, 1, Rgb([0, 255, 0]));
        let tensor = Preprocessor::new(1, 1, Normalization::Symmetric)
            .preprocess(&image)
            .unwrap();
        assert_eq!(tensor[[0, 0, 0, 0]], -1.0);
        assert_eq!(tensor[[0, 1, 0, 0]], 1.0);
    }

    #[test]
    fn test_preprocess_rejects_empty_image() {
        let err = Preprocessor::new(8, 8, Normalization::UnitRange)
            .preprocess(&RgbImage::new(0, 5))
            .unwrap_err();
        assert!(matches!(err, SegmentationError::EmptyImage { width: 0, height: 5 }));
    }

    #[test]
    fn test_postprocess_accepts_nchw() {
        let mask = Preprocessor::postprocess_matte(&[1, 1, 2, 3], &[0.0, 1.0, 0.0, 1.0, 0.0, 1.0])
            .unwrap();
        assert_eq!(mask.dimensions(), (3, 2));
        assert_eq!(mask.as_gray().get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn test_postprocess_rejects_multichannel() {
        let err = Preprocessor::postprocess_matte(&[1, 3, 2, 2], &[0.0; 12]).unwrap_err();
        assert!(matches!(err, SegmentationError::UnexpectedOutput(_)));
    }

    #[test]
    fn test_postprocess_rejects_flat_output() {
        let err = Preprocessor::postprocess_matte(&[4], &[0.0; 4]).unwrap_err();
        assert!(matches!(err, SegmentationError::UnexpectedOutput(_)));
    }
}
