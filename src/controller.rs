use crate::output::{DisplaySink, DisplaySlots};
use crate::picker::Selection;
use crate::pipeline::SegmentationPipeline;
use anyhow::{Context, Result};
use image::RgbImage;

/// Connects photo selections to the pipeline and the display slots
pub struct Controller<S: DisplaySink> {
    pipeline: SegmentationPipeline,
    sink: S,
    current: Option<RgbImage>,
}

impl<S: DisplaySink> Controller<S> {
    pub fn new(pipeline: SegmentationPipeline, sink: S) -> Self {
        Self {
            pipeline,
            sink,
            current: None,
        }
    }

    /// The image most recently handed to the pipeline
    #[cfg(test)]
    pub fn current(&self) -> Option<&RgbImage> {
        self.current.as_ref()
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Handle a finished selection
    ///
    /// The preferred bitmap replaces the current image, is processed, and
    /// both results are routed to the display slots. A selection without a
    /// bitmap clears both slots.
    pub fn on_selection(&mut self, selection: Selection) -> Result<()> {
        let name = &selection.name;
        self.current = selection.preferred().cloned();

        match &self.current {
            Some(image) => tracing::info!("Processing {} ({}x{})", name, image.width(), image.height()),
            None => tracing::warn!("Selection {} returned no image", name),
        }

        let output = self.pipeline.process(self.current.as_ref());
        if self.current.is_some() && output.foreground.is_none() {
            tracing::info!("No person extracted from {}", name);
        }

        self.sink
            .show(name, &DisplaySlots::from(output))
            .with_context(|| format!("Failed to display results for {}", name))
    }
}
