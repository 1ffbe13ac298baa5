use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{ImageBuffer, RgbImage};
use log::info;

use crate::extract::DominantColor;
use crate::palettes::classification_overlay;
use crate::quantize::Quantization;

/// A horizontal strip of `tile`x`tile` squares, one per color, left to right.
pub fn dominant_palette(colors: &[DominantColor], tile: u32) -> RgbImage {
    let tile = tile.max(1);
    let width = tile * colors.len() as u32;
    ImageBuffer::from_fn(width, tile, |x, _| colors[(x / tile) as usize].rgb())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPaths {
    pub classification: PathBuf,
    pub quantized: PathBuf,
    pub palette: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            classification: dir.join("classification.png"),
            quantized: dir.join("quantized.png"),
            palette: dir.join("palette.png"),
        }
    }
}

/// Writes the classification overlay, posterized image and palette strip as PNGs.
pub fn write_outputs(out_dir: &Path, result: &Quantization, swatch_size: u32) -> Result<OutputPaths> {
    std::fs::create_dir_all(out_dir).with_context(|| format!("creating output directory {}", out_dir.display()))?;
    let paths = OutputPaths::in_dir(out_dir);

    classification_overlay(&result.leaf_ordinal_image())
        .save(&paths.classification)
        .with_context(|| format!("writing {}", paths.classification.display()))?;
    result
        .quantized_image()
        .save(&paths.quantized)
        .with_context(|| format!("writing {}", paths.quantized.display()))?;
    dominant_palette(&result.colors, swatch_size)
        .save(&paths.palette)
        .with_context(|| format!("writing {}", paths.palette.display()))?;

    info!("Outputs saved to {}", out_dir.display());
    Ok(paths)
}
