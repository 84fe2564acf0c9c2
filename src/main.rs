// SPDX-License-Identifier: GPL-3.0-or-later
// src/main.rs
//
// Command-line entry point: crop one picture, apply a filter and save it.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;

use kekstagram::config::AppConfig;
use kekstagram::constant::EXPORT_EXT;
use kekstagram::{
    FileType, Filter, FilterPreference, ImageSource, InputSurface, ResizeForm, Resizer,
    UploadFlow,
};

/// Crop a picture to a square and apply a photo filter.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    /// Picture to crop (GIF, JPEG, PNG or SVG).
    pub file: PathBuf,

    /// Left edge of the crop square in image pixels.
    #[arg(short, long)]
    pub x: Option<i64>,

    /// Top edge of the crop square in image pixels.
    #[arg(short, long)]
    pub y: Option<i64>,

    /// Side of the crop square in image pixels.
    #[arg(short, long)]
    pub size: Option<i64>,

    /// Filter to apply: none, chrome, sepia or marvin.
    #[arg(short, long)]
    pub filter: Option<Filter>,

    /// Where to write the result (PNG).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the framing preview to this path.
    #[arg(long)]
    pub preview: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = AppConfig::load();
    run(args, config).await
}

async fn run(args: Args, config: AppConfig) -> anyhow::Result<()> {
    let kind = FileType::from_path(&args.file)
        .with_context(|| format!("Unsupported file type: {}", args.file.display()))?;

    let input = InputSurface::new();
    let container = input.create_container("upload-resize");
    let preference = if config.remember_filter {
        FilterPreference::default_location()
    } else {
        None
    };
    let mut flow = UploadFlow::new(container, preference, config.default_filter);

    flow.select_file(kind.mime(), ImageSource::Path(args.file.clone()))
        .await
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    let resizer = flow
        .resizer_mut()
        .context("Crop engine missing after upload")?;

    // Mirror the engine's square into the form, like the crop form fields do.
    let mirrored = Rc::new(Cell::new(ResizeForm::default()));
    let sink = Rc::clone(&mirrored);
    resizer.on_change(move |change| sink.set(ResizeForm::from_constraint(&change.region)));
    resizer.run_frame()?;

    let suggested = mirrored.get();
    let form = ResizeForm::new(
        args.x.unwrap_or(suggested.x),
        args.y.unwrap_or(suggested.y),
        args.size.unwrap_or(suggested.size),
    );

    if let Some(path) = &args.preview {
        write_preview(resizer, form, path)?;
    }

    flow.submit_resize(form)
        .with_context(|| format!("Crop {form} rejected"))?;

    if let Some(filter) = args.filter {
        flow.change_filter(filter);
    }
    log::info!("Applying filter {}", flow.filter());

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&config, &args.file));
    let result = flow.submit_filter()?;
    result
        .save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    log::info!(
        "Saved {}x{} crop to {}",
        result.width(),
        result.height(),
        output.display()
    );
    Ok(())
}

/// Frame `form` on the engine and save the rendered surface to `path`.
///
/// The form is checked against the picture first, so nothing is drawn for
/// a crop that submission would reject.
fn write_preview(resizer: &mut Resizer, form: ResizeForm, path: &Path) -> anyhow::Result<()> {
    let (width, height) = resizer.natural_size().context("Picture not decoded yet")?;
    form.validate(width, height)
        .with_context(|| format!("Crop {form} rejected"))?;

    form.apply(resizer)?;
    resizer.run_frame()?;
    let surface = resizer.surface().context("Crop surface already released")?;
    surface
        .to_rgba_image()
        .save(path)
        .with_context(|| format!("Failed to write preview {}", path.display()))?;
    log::info!("Preview written to {}", path.display());
    Ok(())
}

/// `<stem>-crop.png` in the configured output dir, else next to the input.
fn default_output(config: &AppConfig, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("upload");
    let name = format!("{stem}-crop.{EXPORT_EXT}");

    match &config.output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}
