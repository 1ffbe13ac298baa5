//! Divides one class in two along the principal axis of its color covariance.

use std::thread;

use image::{Pixel, Rgb, RgbImage};

use crate::error::{QuantizeError, Result};
use crate::labels::LabelMap;
use crate::linalg::Vec3;
use crate::stats;
use crate::tree::{ClassId, ColorTree, NodeId};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitOutcome {
    pub left: NodeId,
    pub right: NodeId,
    /// Principal eigenvalue of the class that was split.
    pub eigenvalue: f64,
    pub left_pixels: usize,
    pub right_pixels: usize,
}

fn relabel(pixels: &[u8], labels: &mut [ClassId], from: ClassId, axis: Vec3, threshold: f64, ids: (ClassId, ClassId)) -> (usize, usize) {
    let (mut left, mut right) = (0, 0);
    for (p, label) in pixels.chunks_exact(3).zip(labels.iter_mut()) {
        if *label != from {
            continue;
        }
        let projected = axis.dot(Vec3::from_rgb(Rgb::<u8>::from_slice(p)));
        if projected <= threshold {
            *label = ids.0;
            left += 1;
        } else {
            *label = ids.1;
            right += 1;
        }
    }
    (left, right)
}

/// Splits `node` into classes `new_id_left` and `new_id_right`.
///
/// Every pixel of the class is projected onto the principal eigenvector of
/// the class covariance and sent left when the projection does not exceed
/// the projection of the class mean. On success `node` gains two children
/// whose statistics are not yet computed.
///
/// A class with no spread, or one whose projections all land on one side,
/// yields [`QuantizeError::DegenerateSplit`]; the label map and tree are left
/// as they were.
pub fn split(
    image: &RgbImage,
    labels: &mut LabelMap,
    new_id_left: ClassId,
    new_id_right: ClassId,
    tree: &mut ColorTree,
    node: NodeId,
    num_threads: usize,
) -> Result<SplitOutcome> {
    let classid = tree.node(node).classid;
    let cached = tree.node(node).stats;
    let class = match cached {
        Some(s) => s,
        None => stats::compute_stats(image, labels, tree, node, num_threads)?,
    };

    let (eigenvalue, axis) = class.covariance.symmetric_eigen().principal();
    if !(eigenvalue > 0.0) {
        return Err(QuantizeError::DegenerateSplit { classid, pixels: class.pixel_count });
    }
    let threshold = axis.dot(class.mean);
    let ids = (new_id_left, new_id_right);

    let band = labels.band_len(num_threads);
    let len = labels.as_slice().len();
    let raw = &image.as_raw()[..len * 3];
    let (left_pixels, right_pixels) = if band >= len {
        relabel(raw, labels.as_mut_slice(), classid, axis, threshold, ids)
    } else {
        thread::scope(|s| {
            let handles: Vec<_> = raw
                .chunks(band * 3)
                .zip(labels.as_mut_slice().chunks_mut(band))
                .map(|(px, lb)| s.spawn(move || relabel(px, lb, classid, axis, threshold, ids)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .fold((0, 0), |(l, r), (bl, br)| (l + bl, r + br))
        })
    };

    if left_pixels == 0 || right_pixels == 0 {
        for label in labels.as_mut_slice().iter_mut() {
            if *label == new_id_left || *label == new_id_right {
                *label = classid;
            }
        }
        return Err(QuantizeError::DegenerateSplit { classid, pixels: left_pixels + right_pixels });
    }

    let (left, right) = tree.attach_children(node, new_id_left, new_id_right);
    Ok(SplitOutcome { left, right, eigenvalue, left_pixels, right_pixels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    fn prepared(image: &RgbImage) -> (LabelMap, ColorTree) {
        let labels = LabelMap::for_image(image, 1);
        let mut tree = ColorTree::new();
        stats::compute_stats(image, &labels, &mut tree, 0, 1).unwrap();
        (labels, tree)
    }

    #[test]
    fn black_and_white_halves_separate() {
        let image: RgbImage = ImageBuffer::from_fn(4, 2, |x, _| if x < 2 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) });
        let (mut labels, mut tree) = prepared(&image);

        let outcome = split(&image, &mut labels, 2, 3, &mut tree, 0, 1).unwrap();
        assert_eq!((outcome.left_pixels, outcome.right_pixels), (4, 4));
        assert_eq!(tree.node(0).children(), Some((outcome.left, outcome.right)));

        // Both sides are pure; which one is "left" depends on the eigenvector sign.
        let black = labels.get(0, 0);
        let white = labels.get(3, 0);
        assert_ne!(black, white);
        for y in 0..2 {
            assert_eq!(labels.get(1, y), black);
            assert_eq!(labels.get(2, y), white);
        }
        assert_eq!(labels.count(1), 0);
    }

    #[test]
    fn uniform_class_is_degenerate_and_untouched() {
        let image: RgbImage = ImageBuffer::from_fn(3, 3, |_, _| Rgb([10, 200, 30]));
        let (mut labels, mut tree) = prepared(&image);
        let before = labels.clone();

        let err = split(&image, &mut labels, 2, 3, &mut tree, 0, 1).unwrap_err();
        assert_eq!(err, QuantizeError::DegenerateSplit { classid: 1, pixels: 9 });
        assert_eq!(labels, before);
        assert!(tree.node(0).is_leaf());
    }

    #[test]
    fn threaded_relabel_matches_single_thread() {
        let image: RgbImage = ImageBuffer::from_fn(7, 9, |x, y| Rgb([(x * 30) as u8, (y * 25) as u8, ((x + y) * 10) as u8]));
        let (mut single, mut tree_a) = prepared(&image);
        let (mut multi, mut tree_b) = prepared(&image);

        let a = split(&image, &mut single, 2, 3, &mut tree_a, 0, 1).unwrap();
        let b = split(&image, &mut multi, 2, 3, &mut tree_b, 0, 4).unwrap();
        assert_eq!(single, multi);
        assert_eq!((a.left_pixels, a.right_pixels), (b.left_pixels, b.right_pixels));
    }
}
