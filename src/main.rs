mod compositing;
mod controller;
mod output;
mod picker;
mod pipeline;
mod segmentation;

use anyhow::{Context, Result};
use clap::Parser;
use compositing::{BlurTarget, CpuCompositor};
use controller::Controller;
use output::{DisplaySink, PngDirectory};
use picker::{CropRect, FilePicker, PhotoPicker};
use pipeline::{PipelineConfig, SegmentationPipeline, DEFAULT_BLUR_RADIUS};
use segmentation::{ModelKind, QualityLevel, SegmentationModel};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Photos to process
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory receiving the foreground and background images
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Path to segmentation model (ONNX file)
    /// If not provided, runs in passthrough mode without segmentation
    #[arg(long)]
    model: Option<PathBuf>,

    /// Segmentation model architecture
    #[arg(long, value_enum, default_value_t = ModelKind::Rvm)]
    model_kind: ModelKind,

    /// Segmentation quality
    #[arg(long, value_enum, default_value_t = QualityLevel::Accurate)]
    quality: QualityLevel,

    /// Variable blur radius
    #[arg(long, default_value_t = DEFAULT_BLUR_RADIUS)]
    blur_radius: f32,

    /// Which side of the person mask gets blurred
    #[arg(long, value_enum, default_value_t = BlurTarget::Background)]
    blur_target: BlurTarget,

    /// Crop applied to every photo before processing, as x,y,width,height
    #[arg(long)]
    crop: Option<CropRect>,

    /// Also write the person mask scaled to the photo
    #[arg(long)]
    save_mask: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("portrait-fx starting");
    tracing::info!("Quality: {:?}", args.quality);
    tracing::info!("Blur: radius={} target={:?}", args.blur_radius, args.blur_target);

    // Initialize segmentation model if provided
    let model: Option<Box<dyn SegmentationModel>> = if let Some(model_path) = &args.model {
        tracing::info!("Loading {:?} segmentation model from {}", args.model_kind, model_path.display());
        let model = segmentation::create_model(args.model_kind, model_path)
            .context("Failed to load segmentation model")?;
        tracing::info!("Segmentation model loaded successfully");
        Some(model)
    } else {
        tracing::info!("Running in passthrough mode (no segmentation)");
        None
    };

    let config = PipelineConfig {
        quality: args.quality,
        blur_radius: args.blur_radius,
        blur_target: args.blur_target,
    };
    let pipeline = SegmentationPipeline::new(model, Box::new(CpuCompositor::default()), config);

    let sink = PngDirectory::new(&args.output_dir, args.save_mask)
        .context("Failed to initialize output directory")?;
    let mut picker = FilePicker::new(args.inputs, args.crop);
    let mut controller = Controller::new(pipeline, sink);

    run_pipeline(&mut picker, &mut controller)?;

    Ok(())
}

fn run_pipeline<P, S>(picker: &mut P, controller: &mut Controller<S>) -> Result<()>
where
    P: PhotoPicker,
    S: DisplaySink,
{
    let mut photo_count = 0u64;
    let mut total_time = Duration::ZERO;

    while let Some(selection) = picker.pick().context("Failed to pick photo")? {
        let start = Instant::now();
        controller.on_selection(selection)?;
        let elapsed = start.elapsed();

        total_time += elapsed;
        photo_count += 1;
        tracing::info!("Photo {} done in {:.1}ms", photo_count, elapsed.as_secs_f64() * 1000.0);
    }

    if photo_count > 0 {
        tracing::info!(
            "Processed {} photo(s), average {:.1}ms",
            photo_count,
            total_time.as_secs_f64() * 1000.0 / photo_count as f64
        );
    }

    Ok(())
}
