// This binary is a small command-line harness around the `flora_vision`
// library: point it at an image file and it prints the recognition report
// as pretty JSON.

use anyhow::{Context, Result};
use flora_vision::pipeline::{PipelineConfig, PixelBuffer, PlantDatabase, RecognitionPipeline};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    // --- 1. Argument Parsing & Setup ---
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: flora_vision <input_image_path>");
        return Ok(());
    }
    let input_path = &args[1];

    // --- 2. Image Loading ---
    let image = image::open(input_path)
        .with_context(|| format!("failed to open image at {input_path}"))?
        .to_rgba8();
    let (width, height) = image.dimensions();

    // --- 3. Pipeline Initialization ---
    let pipeline = RecognitionPipeline::new(PipelineConfig::default(), PlantDatabase::builtin())?;

    // --- 4. Analysis & Reporting ---
    let frame = PixelBuffer::new(width, height, image.as_raw())?;
    let report = pipeline.analyze(&frame);
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
