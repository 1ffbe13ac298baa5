//! Per-class mean and covariance over the normalized pixel colors.

use std::thread;

use image::{Pixel, Rgb, RgbImage};

use crate::error::{QuantizeError, Result};
use crate::labels::LabelMap;
use crate::linalg::{Mat3, Vec3};
use crate::tree::{ClassId, ColorTree, NodeId};

/// Statistics of every pixel currently labeled with one class.
///
/// `covariance` is the centered second moment `sum(x x^T) - n * mean mean^T`,
/// i.e. it is *not* divided by the pixel count. Larger classes therefore
/// report proportionally larger eigenvalues.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassStats {
    pub mean: Vec3,
    pub covariance: Mat3,
    pub pixel_count: usize,
}

impl ClassStats {
    pub fn principal_eigenvalue(&self) -> f64 { self.covariance.symmetric_eigen().max_value() }
}

#[derive(Default, Clone, Copy)]
struct LocalAccum {
    count: usize,
    sum: Vec3,
    sum_outer: Mat3,
}

impl LocalAccum {
    fn merge(self, o: Self) -> Self {
        Self { count: self.count + o.count, sum: self.sum.add(o.sum), sum_outer: self.sum_outer.add(o.sum_outer) }
    }
}

fn accumulate(pixels: &[u8], labels: &[ClassId], classid: ClassId) -> LocalAccum {
    let mut acc = LocalAccum::default();
    for (p, &label) in pixels.chunks_exact(3).zip(labels) {
        if label != classid {
            continue;
        }
        let v = Vec3::from_rgb(Rgb::<u8>::from_slice(p));
        acc.count += 1;
        acc.sum = acc.sum.add(v);
        acc.sum_outer = acc.sum_outer.add(Mat3::outer(v));
    }
    acc
}

/// Scans the whole image and returns the statistics of class `classid`.
///
/// Row bands are accumulated on up to `num_threads` threads and merged in
/// band order, so the result only depends on the thread count, not on
/// scheduling.
pub fn class_stats(image: &RgbImage, labels: &LabelMap, classid: ClassId, num_threads: usize) -> Result<ClassStats> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(QuantizeError::EmptyImage { width, height });
    }
    debug_assert_eq!(labels.dimensions(), image.dimensions());

    let band = labels.band_len(num_threads);
    let raw = &image.as_raw()[..labels.as_slice().len() * 3];

    let total = if band >= labels.as_slice().len() {
        accumulate(raw, labels.as_slice(), classid)
    } else {
        thread::scope(|s| {
            let handles: Vec<_> = raw
                .chunks(band * 3)
                .zip(labels.as_slice().chunks(band))
                .map(|(px, lb)| s.spawn(move || accumulate(px, lb, classid)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .fold(LocalAccum::default(), LocalAccum::merge)
        })
    };

    if total.count == 0 {
        return Err(QuantizeError::DegenerateSplit { classid, pixels: 0 });
    }

    let n = total.count as f64;
    let covariance = total.sum_outer.sub(Mat3::outer(total.sum).scale(1.0 / n));
    let mean = total.sum.scale(1.0 / n);
    Ok(ClassStats { mean, covariance, pixel_count: total.count })
}

/// Recomputes the statistics of `node` from its current pixel membership and
/// stores them on the node.
pub fn compute_stats(image: &RgbImage, labels: &LabelMap, tree: &mut ColorTree, node: NodeId, num_threads: usize) -> Result<ClassStats> {
    let classid = tree.node(node).classid;
    let stats = class_stats(image, labels, classid, num_threads)?;
    tree.node_mut(node).stats = Some(stats);
    Ok(stats)
}
