use image::{GrayImage, ImageBuffer, Rgb, RgbImage};
use log::warn;

/// Fixed colors for visualizing classes. Index 0 is reserved for "no class".
pub const CLASSIFICATION_PALETTE: [(u8, u8, u8); 18] = [
    (0, 0, 0),
    (0, 0, 255),
    (0, 255, 0),
    (255, 0, 0),
    (0, 255, 255),
    (255, 255, 0),
    (255, 0, 255),
    (128, 128, 128),
    (128, 255, 128),
    (32, 32, 32),
    (128, 128, 255),
    (255, 128, 128),
    (255, 255, 255),
    (128, 128, 32),
    (128, 32, 128),
    (32, 128, 128),
    (32, 32, 128),
    (32, 128, 32),
];

/// Paints every label of an 8-bit label image with a distinguishable color.
/// Labels past the end of [`CLASSIFICATION_PALETTE`] are left black.
pub fn classification_overlay(labels: &GrayImage) -> RgbImage {
    let (w, h) = labels.dimensions();
    let mut overflow = false;
    let out = ImageBuffer::from_fn(w, h, |x, y| {
        let label = labels.get_pixel(x, y)[0] as usize;
        match CLASSIFICATION_PALETTE.get(label) {
            Some(&(r, g, b)) => Rgb([r, g, b]),
            None => {
                overflow = true;
                Rgb([0, 0, 0])
            }
        }
    });
    if overflow {
        warn!("More classes than predefined overlay colors ({}); extra classes drawn black", CLASSIFICATION_PALETTE.len() - 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn labels_map_to_palette_entries() {
        let labels: GrayImage = ImageBuffer::from_fn(3, 1, |x, _| Luma([[1, 2, 40][x as usize]]));
        let out = classification_overlay(&labels);
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 255]);
        assert_eq!(out.get_pixel(1, 0).0, [0, 255, 0]);
        assert_eq!(out.get_pixel(2, 0).0, [0, 0, 0]);
    }
}
