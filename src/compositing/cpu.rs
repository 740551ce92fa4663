use super::{check_extent, CompositeError, Compositor};
use image::{imageops, GrayImage, Rgb, RgbImage, Rgba, RgbaImage};

/// Compositor running on the CPU with `image` filters
///
/// The variable blur is approximated by a stack of Gaussian blurs with
/// evenly spaced radii; each pixel interpolates between the two levels
/// around its effective radius.
pub struct CpuCompositor {
    levels: usize,
}

impl CpuCompositor {
    pub fn new(levels: usize) -> Self {
        Self {
            levels: levels.max(1),
        }
    }
}

impl Default for CpuCompositor {
    fn default() -> Self {
        Self::new(4)
    }
}

impl Compositor for CpuCompositor {
    fn blend_with_mask(&self, image: &RgbImage, mask: &GrayImage) -> Result<RgbaImage, CompositeError> {
        let _span = tracing::debug_span!("blend_with_mask").entered();
        check_extent(image, mask)?;

        Ok(RgbaImage::from_fn(image.width(), image.height(), |x, y| {
            let alpha = mask.get_pixel(x, y)[0];
            if alpha == 0 {
                return Rgba([0, 0, 0, 0]);
            }
            let Rgb([r, g, b]) = *image.get_pixel(x, y);
            Rgba([r, g, b, alpha])
        }))
    }

    fn masked_variable_blur(
        &self,
        image: &RgbImage,
        mask: &GrayImage,
        radius: f32,
    ) -> Result<RgbImage, CompositeError> {
        let _span = tracing::debug_span!("masked_variable_blur").entered();
        check_extent(image, mask)?;

        if !radius.is_finite() || radius < 0.0 {
            return Err(CompositeError::InvalidRadius(radius));
        }

        let peak = mask.pixels().map(|p| p[0]).max().unwrap_or(0);
        if radius == 0.0 || peak == 0 {
            return Ok(image.clone());
        }

        // Only build as many levels as the strongest mask value reaches
        let top = ((peak as f32 / 255.0) * self.levels as f32).ceil() as usize;
        let mut stack = Vec::with_capacity(top + 1);
        stack.push(image.clone());
        for level in 1..=top {
            let sigma = radius * level as f32 / self.levels as f32;
            stack.push(imageops::blur(image, sigma));
        }
        tracing::debug!("Built {} blur levels up to radius {:.1}", top, radius);

        Ok(RgbImage::from_fn(image.width(), image.height(), |x, y| {
            let position = mask.get_pixel(x, y)[0] as f32 / 255.0 * self.levels as f32;
            let lower = (position.floor() as usize).min(top);
            let upper = (lower + 1).min(top);
            let weight = position - lower as f32;

            let a = stack[lower].get_pixel(x, y);
            let b = stack[upper].get_pixel(x, y);
            Rgb([
                lerp(a[0], b[0], weight),
                lerp(a[1], b[1], weight),
                lerp(a[2], b[2], weight),
            ])
        }))
    }
}

fn lerp(a: u8, b: u8, weight: f32) -> u8 {
    let value = a as f32 + (b as f32 - a as f32) * weight;
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::testing::checkerboard;
    use image::Luma;

    /// Largest red-channel jump between horizontal neighbours in the middle half of row `y`
    fn max_step(image: &RgbImage, y: u32) -> u8 {
        let quarter = image.width() / 4;
        (quarter + 1..image.width() - quarter)
            .map(|x| image.get_pixel(x, y)[0].abs_diff(image.get_pixel(x - 1, y)[0]))
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_blend_uses_mask_as_alpha() {
        let image = RgbImage::from_pixel(3, 1, Rgb([10, 20, 30]));
        let mask = GrayImage::from_raw(3, 1, vec![0, 128, 255]).unwrap();

        let blended = CpuCompositor::default().blend_with_mask(&image, &mask).unwrap();

        assert_eq!(*blended.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*blended.get_pixel(1, 0), Rgba([10, 20, 30, 128]));
        assert_eq!(*blended.get_pixel(2, 0), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_blend_rejects_misaligned_mask() {
        let image = RgbImage::new(4, 4);
        let mask = GrayImage::new(2, 2);
        let err = CpuCompositor::default().blend_with_mask(&image, &mask).unwrap_err();
        assert!(matches!(err, CompositeError::DimensionMismatch { mask_width: 2, .. }));
    }

    #[test]
    fn test_blend_rejects_empty_image() {
        let err = CpuCompositor::default()
            .blend_with_mask(&RgbImage::new(0, 0), &GrayImage::new(0, 0))
            .unwrap_err();
        assert!(matches!(err, CompositeError::EmptyImage));
    }

    #[test]
    fn test_blur_with_black_mask_is_identity() {
        let image = checkerboard(16, 16);
        let mask = GrayImage::new(16, 16);
        let blurred = CpuCompositor::default().masked_variable_blur(&image, &mask, 10.0).unwrap();
        assert_eq!(blurred, image);
    }

    #[test]
    fn test_blur_with_zero_radius_is_identity() {
        let image = checkerboard(16, 16);
        let mask = GrayImage::from_pixel(16, 16, Luma([255]));
        let blurred = CpuCompositor::default().masked_variable_blur(&image, &mask, 0.0).unwrap();
        assert_eq!(blurred, image);
    }

    #[test]
    fn test_blur_with_white_mask_smooths() {
        let image = checkerboard(32, 32);
        let mask = GrayImage::from_pixel(32, 32, Luma([255]));
        let blurred = CpuCompositor::default().masked_variable_blur(&image, &mask, 10.0).unwrap();

        assert_eq!(blurred.dimensions(), image.dimensions());
        // The checkerboard alternates 240/10; blurred, neighbours are close
        assert_eq!(max_step(&image, 16), 230);
        assert!(max_step(&blurred, 16) < 20);
        // Values settle around the mean instead of the two extremes
        assert!(blurred.pixels().all(|p| (90..=160).contains(&p[0])));
    }

    #[test]
    fn test_blur_follows_mask() {
        let image = checkerboard(40, 20);
        let mask = GrayImage::from_fn(40, 20, |x, _| Luma([if x < 20 { 255 } else { 0 }]));
        let blurred = CpuCompositor::default().masked_variable_blur(&image, &mask, 6.0).unwrap();

        // Unmasked half is untouched
        for y in 0..20 {
            for x in 20..40 {
                assert_eq!(blurred.get_pixel(x, y), image.get_pixel(x, y));
            }
        }
        // Masked half is smoothed
        assert_ne!(blurred.get_pixel(5, 5), image.get_pixel(5, 5));
    }

    #[test]
    fn test_blur_rejects_bad_radius() {
        let image = checkerboard(4, 4);
        let mask = GrayImage::new(4, 4);
        let compositor = CpuCompositor::default();
        assert!(matches!(
            compositor.masked_variable_blur(&image, &mask, -1.0),
            Err(CompositeError::InvalidRadius(_))
        ));
        assert!(matches!(
            compositor.masked_variable_blur(&image, &mask, f32::NAN),
            Err(CompositeError::InvalidRadius(_))
        ));
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0, 200, 0.0), 0);
        assert_eq!(lerp(0, 200, 0.5), 100);
        assert_eq!(lerp(200, 0, 1.0), 0);
    }
}
