use image::RgbImage;
use log::{debug, info, warn};

use crate::error::{QuantizeError, Result};
use crate::extract::{self, DominantColor};
use crate::labels::LabelMap;
use crate::split;
use crate::stats;
use crate::tree::{ColorTree, ROOT_CLASS};
use crate::Config;

/// Largest color count whose leaves still fit an 8-bit label image.
pub const MAX_COLORS: usize = 255;

/// Finished partition of an image.
#[derive(Clone, Debug)]
pub struct Quantization {
    pub colors: Vec<DominantColor>,
    pub labels: LabelMap,
    pub tree: ColorTree,
    /// Splits performed; `colors.len() == splits + 1`.
    pub splits: usize,
}

impl Quantization {
    pub fn quantized_image(&self) -> RgbImage { extract::quantized_image(&self.labels, &self.tree) }
    pub fn leaf_ordinal_image(&self) -> image::GrayImage { extract::leaf_ordinal_image(&self.labels, &self.tree) }
}

/// Partitions `image` into `count` color classes by repeatedly splitting the
/// class with the largest principal eigenvalue.
///
/// Classes that cannot be split are set aside; if none remain splittable the
/// run ends early with fewer than `count` colors.
pub fn find_dominant_colors(image: &RgbImage, count: usize, config: &Config) -> Result<Quantization> {
    if !(1..=MAX_COLORS).contains(&count) {
        return Err(QuantizeError::InvalidColorCount { count });
    }
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(QuantizeError::EmptyImage { width, height });
    }
    let threads = config.num_threads.max(1);
    info!("Finding {} dominant colors in {}x{} image ({} threads)", count, width, height, threads);

    let mut labels = LabelMap::for_image(image, ROOT_CLASS);
    let mut tree = ColorTree::new();
    let root = tree.root();
    stats::compute_stats(image, &labels, &mut tree, root, threads)?;

    let mut splits = 0usize;
    while splits + 1 < count {
        let Some(target) = tree.max_eigenvalue_leaf() else {
            warn!("No splittable classes left: stopping at {} colors", splits + 1);
            break;
        };
        let id_base = tree.next_class_id();
        match split::split(image, &mut labels, id_base, id_base + 1, &mut tree, target, threads) {
            Ok(outcome) => {
                let left = stats::compute_stats(image, &labels, &mut tree, outcome.left, threads)?;
                let right = stats::compute_stats(image, &labels, &mut tree, outcome.right, threads)?;
                splits += 1;
                debug!(
                    "split class {} (eigenvalue {:.4}) into {} ({} px) and {} ({} px)",
                    tree.node(target).classid,
                    outcome.eigenvalue,
                    id_base,
                    left.pixel_count,
                    id_base + 1,
                    right.pixel_count
                );
            }
            Err(QuantizeError::DegenerateSplit { classid, pixels }) => {
                warn!("Class {} ({} px) has no spread along its principal axis; keeping it whole", classid, pixels);
                tree.mark_terminal(target);
            }
            Err(e) => return Err(e),
        }
    }

    let colors = extract::dominant_colors(&tree, config.sort_by_prominence);
    info!("Found {} colors after {} splits", colors.len(), splits);
    Ok(Quantization { colors, labels, tree, splits })
}
