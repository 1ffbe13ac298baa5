//! Dominant color extraction by recursive principal-axis splitting.
//!
//! Pixels start in a single class. The class whose color covariance has the
//! largest eigenvalue is repeatedly cut in two by the plane through its mean
//! orthogonal to its principal eigenvector, until the requested number of
//! classes exists. Each class mean is one dominant color.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

pub mod error;
pub mod extract;
pub mod labels;
pub mod linalg;
pub mod palettes;
pub mod quantize;
pub mod render;
pub mod split;
pub mod stats;
pub mod tree;

pub use error::QuantizeError;
pub use extract::{dominant_colors, quantized_image, DominantColor};
pub use labels::LabelMap;
pub use quantize::{find_dominant_colors, Quantization, MAX_COLORS};
pub use tree::{ClassId, ColorTree, NodeId};

#[derive(Debug, Clone)]
pub struct Config {
    /// Worker threads for each full-image scan.
    pub num_threads: usize,
    /// Order colors by pixel count instead of leaf discovery order.
    pub sort_by_prominence: bool,
    /// Edge length of each square in the palette strip.
    pub swatch_size: u32,
}

pub fn default_config() -> Config {
    Config { num_threads: num_cpus::get().max(1), sort_by_prominence: false, swatch_size: 64 }
}

impl Default for Config {
    fn default() -> Self { default_config() }
}

#[derive(Debug, Clone)]
pub struct Params {
    pub in_image_name: PathBuf,
    pub out_dir: PathBuf,
    pub count: usize,
    pub write_images: bool,
    pub config: Config,
}

/// Loads `params.in_image_name`, extracts its dominant colors and, unless
/// disabled, writes the classification, quantized and palette images.
pub fn process(params: Params) -> Result<Vec<DominantColor>> {
    let Params { in_image_name, out_dir, count, write_images, config } = params;
    info!("Input image: {}", in_image_name.display());

    let img = image::open(&in_image_name)
        .with_context(|| format!("Unable to open the file: {}", in_image_name.display()))?
        .to_rgb8();
    let result = find_dominant_colors(&img, count, &config)?;

    if write_images {
        render::write_outputs(&out_dir, &result, config.swatch_size)?;
    }
    Ok(result.colors)
}
