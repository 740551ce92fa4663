mod png_dir;

pub use png_dir::PngDirectory;

use crate::pipeline::PipelineOutput;
use anyhow::Result;
use image::{GrayImage, RgbImage, RgbaImage};

/// The two image slots shown to the user, plus the optional mask preview
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplaySlots {
    pub front: Option<RgbaImage>,
    pub back: Option<RgbImage>,
    pub mask: Option<GrayImage>,
}

impl From<PipelineOutput> for DisplaySlots {
    fn from(output: PipelineOutput) -> Self {
        Self {
            front: output.foreground,
            back: output.background,
            mask: output.mask,
        }
    }
}

/// Trait for display destinations
pub trait DisplaySink {
    /// Show the slots produced for the selection called `name`
    fn show(&mut self, name: &str, slots: &DisplaySlots) -> Result<()>;
}
