//! Deterministic models and fixtures for unit tests.

use super::{PersonMask, QualityLevel, SegmentationError, SegmentationModel};
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::cell::Cell;
use std::rc::Rc;

/// Returns the same mask for every image and counts calls
pub struct FixedMaskModel {
    mask: GrayImage,
    calls: Rc<Cell<usize>>,
}

impl FixedMaskModel {
    pub fn new(mask: GrayImage) -> Self {
        Self {
            mask,
            calls: Rc::new(Cell::new(0)),
        }
    }

    /// Handle to the call count that stays readable after the model is boxed
    pub fn call_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.calls)
    }

    /// Left half background, right half person
    pub fn half(width: u32, height: u32) -> Self {
        Self::new(GrayImage::from_fn(width, height, |x, _| {
            Luma([if x >= width / 2 { 255 } else { 0 }])
        }))
    }
}

impl SegmentationModel for FixedMaskModel {
    fn segment(
        &mut self,
        _image: &RgbImage,
        _quality: QualityLevel,
    ) -> Result<PersonMask, SegmentationError> {
        self.calls.set(self.calls.get() + 1);
        Ok(PersonMask::new(self.mask.clone()))
    }

    fn input_size(&self, _quality: QualityLevel) -> (u32, u32) {
        self.mask.dimensions()
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Always fails with `NoObservation`
pub struct FailingModel;

impl SegmentationModel for FailingModel {
    fn segment(
        &mut self,
        _image: &RgbImage,
        _quality: QualityLevel,
    ) -> Result<PersonMask, SegmentationError> {
        Err(SegmentationError::NoObservation)
    }

    fn input_size(&self, _quality: QualityLevel) -> (u32, u32) {
        (1, 1)
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Non-uniform test photo so blurring is observable
pub fn checkerboard(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            Rgb([240, 200, 10])
        } else {
            Rgb([10, 40, 230])
        }
    })
}
