// CLI entry for dominant_colors
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueHint};
use dominant_colors::{default_config, process, Config, Params};

#[derive(Parser, Debug)]
#[command(name = "dominant_colors", version, about = "Find the dominant colors of an image")]
struct Cli {
    /// Directory for classification.png, quantized.png and palette.png
    #[arg(short = 'o', long = "out-dir", default_value = ".", value_hint = ValueHint::DirPath)]
    out_dir: PathBuf,

    /// Number of threads per image scan
    #[arg(long = "threads")]
    threads: Option<usize>,

    /// Sort colors by pixel count, most common first
    #[arg(long = "sort", action = ArgAction::SetTrue)]
    sort: bool,

    /// Edge length of each palette swatch in pixels
    #[arg(long = "swatch-size")]
    swatch_size: Option<u32>,

    /// Only print the colors, skip writing images
    #[arg(long = "no-images", action = ArgAction::SetTrue)]
    no_images: bool,

    /// Input image path
    #[arg(value_hint = ValueHint::FilePath)]
    image: PathBuf,

    /// Number of colors (1-255)
    #[arg(value_parser = clap::value_parser!(u16).range(1..=255))]
    count: u16,
}

fn build_config(cli: &Cli) -> Config {
    let mut cfg = default_config();
    if let Some(v) = cli.threads { cfg.num_threads = v.max(1); }
    if let Some(v) = cli.swatch_size { cfg.swatch_size = v.max(1); }
    if cli.sort { cfg.sort_by_prominence = true; }
    cfg
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let cfg = build_config(&cli);
    let params = Params {
        in_image_name: cli.image,
        out_dir: cli.out_dir,
        count: cli.count as usize,
        write_images: !cli.no_images,
        config: cfg,
    };
    for c in process(params)? {
        println!("{}  {:>3} {:>3} {:>3}  {}", c.hex(), c.color.red, c.color.green, c.color.blue, c.pixel_count);
    }
    Ok(())
}
