mod file_picker;

pub use file_picker::{CropRect, FilePicker};

use anyhow::Result;
use image::RgbImage;

/// A photo chosen by the user
///
/// `edited` is the user-adjusted (cropped) variant when one exists.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub name: String,
    pub original: Option<RgbImage>,
    pub edited: Option<RgbImage>,
}

impl Selection {
    /// The bitmap to process: the edited variant if present, else the original
    pub fn preferred(&self) -> Option<&RgbImage> {
        self.edited.as_ref().or(self.original.as_ref())
    }
}

/// Trait for photo selection surfaces
pub trait PhotoPicker {
    /// Wait for the next selection; `None` once the user is done
    fn pick(&mut self) -> Result<Option<Selection>>;
}
