use std::collections::BTreeSet;

use image::RgbImage;

use crate::tree::ClassId;

/// Per-pixel class membership, row-major, same dimensions as the source image.
///
/// Only the splitter writes to it; statistics and result extraction read it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelMap {
    width: u32,
    height: u32,
    labels: Vec<ClassId>,
}

impl LabelMap {
    pub fn filled(width: u32, height: u32, classid: ClassId) -> Self {
        Self { width, height, labels: vec![classid; width as usize * height as usize] }
    }

    /// Every pixel of `image` starts out in class `classid`.
    pub fn for_image(image: &RgbImage, classid: ClassId) -> Self {
        Self::filled(image.width(), image.height(), classid)
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }
    pub fn dimensions(&self) -> (u32, u32) { (self.width, self.height) }

    pub fn get(&self, x: u32, y: u32) -> ClassId {
        self.labels[y as usize * self.width as usize + x as usize]
    }

    pub fn as_slice(&self) -> &[ClassId] { &self.labels }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [ClassId] { &mut self.labels }

    pub fn count(&self, classid: ClassId) -> usize {
        self.labels.iter().filter(|&&l| l == classid).count()
    }

    pub fn distinct(&self) -> BTreeSet<ClassId> { self.labels.iter().copied().collect() }

    /// Number of pixels handed to each worker so that at most `num_threads`
    /// bands of whole rows cover the map.
    pub(crate) fn band_len(&self, num_threads: usize) -> usize {
        let threads = num_threads.clamp(1, self.height.max(1) as usize);
        let rows = (self.height as usize).div_ceil(threads);
        (rows * self.width as usize).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_cover_all_rows() {
        let map = LabelMap::filled(5, 7, 1);
        assert_eq!(map.band_len(1), 35);
        assert_eq!(map.band_len(2), 20);
        assert_eq!(map.band_len(3), 15);
        // More threads than rows degrades to one row per band.
        assert_eq!(map.band_len(64), 5);
        assert_eq!(map.band_len(0), 35);
    }

    #[test]
    fn indexing_is_row_major() {
        let mut map = LabelMap::filled(3, 2, 1);
        map.as_mut_slice()[4] = 9;
        assert_eq!(map.get(1, 1), 9);
        assert_eq!(map.count(1), 5);
        assert_eq!(map.distinct().into_iter().collect::<Vec<_>>(), vec![1, 9]);
    }
}
