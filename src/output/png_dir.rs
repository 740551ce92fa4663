use super::{DisplaySink, DisplaySlots};
use anyhow::{Context, Result};
use image::{ImageBuffer, PixelWithColorType};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes display slots as PNG files into a directory
///
/// Slot `front` of selection `photo` lands in `photo_foreground.png`, `back`
/// in `photo_background.png`. An empty slot removes its file so the
/// directory always mirrors the latest slots.
pub struct PngDirectory {
    dir: PathBuf,
    save_mask: bool,
}

impl PngDirectory {
    pub fn new<P: AsRef<Path>>(dir: P, save_mask: bool) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        tracing::info!("Writing results to {}", dir.display());

        Ok(Self { dir, save_mask })
    }

    pub fn slot_path(&self, name: &str, slot: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.png", name, slot))
    }

    fn write_slot<P>(&self, name: &str, slot: &str, image: Option<&ImageBuffer<P, Vec<u8>>>) -> Result<()>
    where
        P: PixelWithColorType<Subpixel = u8>,
    {
        let path = self.slot_path(name, slot);

        match image {
            Some(image) => {
                image
                    .save(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!("Wrote {}", path.display());
            }
            None if path.exists() => {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to clear stale {}", path.display()))?;
                tracing::debug!("Cleared {}", path.display());
            }
            None => {}
        }

        Ok(())
    }
}

impl DisplaySink for PngDirectory {
    fn show(&mut self, name: &str, slots: &DisplaySlots) -> Result<()> {
        self.write_slot(name, "foreground", slots.front.as_ref())?;
        self.write_slot(name, "background", slots.back.as_ref())?;
        if self.save_mask {
            self.write_slot(name, "mask", slots.mask.as_ref())?;
        }
        Ok(())
    }
}
