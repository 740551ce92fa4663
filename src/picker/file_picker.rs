use super::{PhotoPicker, Selection};
use anyhow::Result;
use image::{imageops, RgbImage};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Crop rectangle applied to produce the edited variant of a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected crop as x,y,width,height, got {0:?}")]
pub struct ParseCropError(String);

impl FromStr for CropRect {
    type Err = ParseCropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|part| part.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseCropError(s.to_string()))?;

        match parts[..] {
            [x, y, width, height] if width > 0 && height > 0 => Ok(Self {
                x,
                y,
                width,
                height,
            }),
            _ => Err(ParseCropError(s.to_string())),
        }
    }
}

impl CropRect {
    /// Crop `image`, or `None` when the rectangle does not fit inside it
    pub fn apply(&self, image: &RgbImage) -> Option<RgbImage> {
        let (width, height) = image.dimensions();
        let fits_x = self.x.checked_add(self.width).is_some_and(|end| end <= width);
        let fits_y = self.y.checked_add(self.height).is_some_and(|end| end <= height);
        if !fits_x || !fits_y {
            tracing::warn!(
                "Crop {}x{}+{}+{} exceeds {}x{} image, using original",
                self.width,
                self.height,
                self.x,
                self.y,
                width,
                height
            );
            return None;
        }

        Some(imageops::crop_imm(image, self.x, self.y, self.width, self.height).to_image())
    }
}

/// Picks photos from a list of files, one selection per file
pub struct FilePicker {
    paths: VecDeque<PathBuf>,
    crop: Option<CropRect>,
}

impl FilePicker {
    pub fn new(paths: Vec<PathBuf>, crop: Option<CropRect>) -> Self {
        tracing::info!("{} photo(s) queued", paths.len());
        Self {
            paths: paths.into(),
            crop,
        }
    }
}

impl PhotoPicker for FilePicker {
    fn pick(&mut self) -> Result<Option<Selection>> {
        let Some(path) = self.paths.pop_front() else {
            return Ok(None);
        };

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        // An unreadable file is a selection without a bitmap
        let original = match image::open(&path) {
            Ok(decoded) => Some(decoded.to_rgb8()),
            Err(err) => {
                tracing::warn!("Failed to read {}: {}", path.display(), err);
                None
            }
        };

        let edited = match (&self.crop, &original) {
            (Some(crop), Some(image)) => crop.apply(image),
            _ => None,
        };

        Ok(Some(Selection {
            name,
            original,
            edited,
        }))
    }
}
