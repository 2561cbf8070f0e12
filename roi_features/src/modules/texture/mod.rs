//! Texture matrices over the grey-level quantized ROI.
//!
//! Intensities map to levels `1..=G` with
//! `level = 1 + floor((I - min) * G / (max - min + 1))`; cells outside the
//! ROI are level 0 and never take part in a pair, run, zone or neighborhood.

mod glcm;
mod gldm;
mod glrlm;
mod glszm;
mod ngtdm;
mod size_matrix;

pub use glcm::GlcmModule;
pub use gldm::GldmModule;
pub use glrlm::GlrlmModule;
pub use glszm::GlszmModule;
pub use ngtdm::NgtdmModule;

use common::Buffer2;

use crate::accumulator::RoiAccumulator;
use crate::modules::RoiRaster;

/// Four principal directions: 0, 45, 90 and 135 degrees (y grows downwards).
pub(crate) const DIRECTIONS: [(i64, i64); 4] = [(1, 0), (1, -1), (0, -1), (-1, -1)];

/// Quantized ROI over its bounding box plus a one-cell empty border.
pub(crate) struct LevelGrid {
    levels: Buffer2<u16>,
    pub grey_levels: usize,
    pub pixel_count: usize,
}

impl LevelGrid {
    pub fn new(acc: &RoiAccumulator, grey_levels: u32) -> Self {
        let raster = RoiRaster::new(acc);
        let min = acc.min() as u64;
        let span = acc.max() as u64 - min + 1;
        let g = grey_levels as u64;

        let cells = raster.cells();
        let mut levels = Buffer2::new_default(cells.width(), cells.height());
        for y in 0..cells.height() {
            for x in 0..cells.width() {
                if let Some(intensity) = cells[(x, y)] {
                    levels[(x, y)] = (1 + (intensity as u64 - min) * g / span) as u16;
                }
            }
        }

        Self {
            levels,
            grey_levels: grey_levels as usize,
            pixel_count: acc.count(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.levels.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.levels.height()
    }

    /// Level at local coordinates; 0 outside the ROI or the grid.
    #[inline]
    pub fn level(&self, x: i64, y: i64) -> usize {
        self.levels.get_checked(x, y).copied().unwrap_or(0) as usize
    }
}

/// `-sum(p * ln p)` over the positive entries.
pub(crate) fn entropy<'a>(probs: impl IntoIterator<Item = &'a f64>) -> f64 {
    probs
        .into_iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.ln())
        .sum()
}
