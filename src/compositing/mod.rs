mod cpu;

pub use cpu::CpuCompositor;

use image::{GrayImage, RgbImage, RgbaImage};
use thiserror::Error;

/// Which side of the person mask the variable blur is applied to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum BlurTarget {
    /// Blur what the mask marks as background; the person stays sharp
    #[default]
    Background,
    /// Blur what the mask marks as person
    Foreground,
}

#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("mask is {mask_width}x{mask_height} but image is {image_width}x{image_height}")]
    DimensionMismatch {
        image_width: u32,
        image_height: u32,
        mask_width: u32,
        mask_height: u32,
    },

    #[error("cannot composite an empty image")]
    EmptyImage,

    #[error("invalid blur radius {0}")]
    InvalidRadius(f32),
}

/// Trait for mask-driven image filters
pub trait Compositor {
    /// Keep image pixels where the mask is opaque, transparent elsewhere
    ///
    /// The mask becomes the alpha channel of the result.
    fn blend_with_mask(&self, image: &RgbImage, mask: &GrayImage) -> Result<RgbaImage, CompositeError>;

    /// Blur an image with a per-pixel strength taken from the mask
    ///
    /// White mask regions are blurred by the full `radius`, black regions
    /// are left untouched.
    fn masked_variable_blur(
        &self,
        image: &RgbImage,
        mask: &GrayImage,
        radius: f32,
    ) -> Result<RgbImage, CompositeError>;
}

/// Check that a mask is aligned with a non-empty image
pub(crate) fn check_extent(image: &RgbImage, mask: &GrayImage) -> Result<(), CompositeError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CompositeError::EmptyImage);
    }
    if image.dimensions() != mask.dimensions() {
        return Err(CompositeError::DimensionMismatch {
            image_width: image.width(),
            image_height: image.height(),
            mask_width: mask.width(),
            mask_height: mask.height(),
        });
    }
    Ok(())
}
