//! Reads the finished class tree back out as colors and images.

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use palette::Srgb;

use crate::labels::LabelMap;
use crate::linalg::Vec3;
use crate::tree::{ClassId, ColorTree};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DominantColor {
    pub color: Srgb<u8>,
    pub classid: ClassId,
    pub pixel_count: usize,
}

impl DominantColor {
    pub fn rgb(&self) -> Rgb<u8> { Rgb([self.color.red, self.color.green, self.color.blue]) }

    /// `#rrggbb`
    pub fn hex(&self) -> String { format!("#{:x}", self.color) }
}

/// Scales a normalized mean back to 8-bit channels, rounding to nearest.
pub fn denormalize(mean: Vec3) -> Srgb<u8> { Srgb::new(mean.x, mean.y, mean.z).into_format::<u8>() }

/// One color per leaf, in breadth-first leaf order unless `sort_by_prominence`
/// asks for descending pixel count. Leaves without statistics are skipped.
pub fn dominant_colors(tree: &ColorTree, sort_by_prominence: bool) -> Vec<DominantColor> {
    let mut colors: Vec<DominantColor> = tree
        .leaves()
        .into_iter()
        .filter_map(|id| {
            let node = tree.node(id);
            node.stats.map(|s| DominantColor {
                color: denormalize(s.mean),
                classid: node.classid,
                pixel_count: s.pixel_count,
            })
        })
        .collect();
    if sort_by_prominence {
        colors.sort_by(|a, b| b.pixel_count.cmp(&a.pixel_count));
    }
    colors
}

/// Posterizes the source: each pixel takes the mean color of its leaf.
/// Pixels whose label matches no leaf stay black.
pub fn quantized_image(labels: &LabelMap, tree: &ColorTree) -> RgbImage {
    let mut lookup: Vec<Option<Rgb<u8>>> = vec![None; tree.next_class_id() as usize];
    for color in dominant_colors(tree, false) {
        lookup[color.classid as usize] = Some(color.rgb());
    }
    let (w, h) = labels.dimensions();
    ImageBuffer::from_fn(w, h, |x, y| {
        lookup.get(labels.get(x, y) as usize).copied().flatten().unwrap_or(Rgb([0, 0, 0]))
    })
}

/// 8-bit label image holding each pixel's 1-based leaf position in
/// breadth-first order. Unmatched labels become 0.
pub fn leaf_ordinal_image(labels: &LabelMap, tree: &ColorTree) -> GrayImage {
    let mut lookup = vec![0u8; tree.next_class_id() as usize];
    for (i, id) in tree.leaves().into_iter().enumerate() {
        lookup[tree.node(id).classid as usize] = u8::try_from(i + 1).unwrap_or(u8::MAX);
    }
    let (w, h) = labels.dimensions();
    ImageBuffer::from_fn(w, h, |x, y| Luma([lookup.get(labels.get(x, y) as usize).copied().unwrap_or(0)]))
}
