//! Tile-loader boundary: decoded image tiles delivered to the streaming phase.

use common::Buffer2;

use crate::error::LoaderError;
use crate::types::{Label, PixIntens};

/// Tile grid of one image pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLayout {
    pub image_width: usize,
    pub image_height: usize,
    pub tile_width: usize,
    pub tile_height: usize,
}

impl TileLayout {
    pub fn tiles_across(&self) -> usize {
        self.image_width.div_ceil(self.tile_width)
    }

    pub fn tiles_down(&self) -> usize {
        self.image_height.div_ceil(self.tile_height)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles_across() * self.tiles_down()
    }

    /// Top-left image coordinate of tile `index` (row-major tile order).
    pub fn tile_origin(&self, index: usize) -> (usize, usize) {
        let across = self.tiles_across();
        (
            (index % across) * self.tile_width,
            (index / across) * self.tile_height,
        )
    }
}

/// Co-registered label and intensity planes of one tile. Edge tiles may be
/// smaller than the nominal tile size.
#[derive(Debug, Clone)]
pub struct Tile {
    pub origin_x: usize,
    pub origin_y: usize,
    pub labels: Buffer2<Label>,
    pub intensities: Buffer2<PixIntens>,
}

impl Tile {
    #[inline]
    pub fn width(&self) -> usize {
        self.labels.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.labels.height()
    }
}

/// Source of decoded tiles. `load_tile` is called concurrently.
pub trait TileLoader: Sync {
    fn layout(&self) -> TileLayout;

    fn load_tile(&self, index: usize) -> Result<Tile, LoaderError>;
}

/// Loader over planes already held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryImage {
    labels: Buffer2<Label>,
    intensities: Buffer2<PixIntens>,
    layout: TileLayout,
}

impl InMemoryImage {
    pub fn new(
        labels: Buffer2<Label>,
        intensities: Buffer2<PixIntens>,
        tile_width: usize,
        tile_height: usize,
    ) -> Self {
        assert_eq!(
            (labels.width(), labels.height()),
            (intensities.width(), intensities.height()),
            "label and intensity planes must have the same size"
        );
        assert!(tile_width > 0 && tile_height > 0, "tile size must be positive");
        let layout = TileLayout {
            image_width: labels.width(),
            image_height: labels.height(),
            tile_width,
            tile_height,
        };
        Self {
            labels,
            intensities,
            layout,
        }
    }
}

impl TileLoader for InMemoryImage {
    fn layout(&self) -> TileLayout {
        self.layout
    }

    fn load_tile(&self, index: usize) -> Result<Tile, LoaderError> {
        let count = self.layout.tile_count();
        if index >= count {
            return Err(LoaderError::TileOutOfRange { tile: index, count });
        }
        let (origin_x, origin_y) = self.layout.tile_origin(index);
        let (w, h) = (self.layout.tile_width, self.layout.tile_height);
        Ok(Tile {
            origin_x,
            origin_y,
            labels: self.labels.crop(origin_x, origin_y, w, h),
            intensities: self.intensities.crop(origin_x, origin_y, w, h),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_counts_partial_tiles() {
        let layout = TileLayout {
            image_width: 10,
            image_height: 7,
            tile_width: 4,
            tile_height: 4,
        };
        assert_eq!(layout.tiles_across(), 3);
        assert_eq!(layout.tiles_down(), 2);
        assert_eq!(layout.tile_count(), 6);
        assert_eq!(layout.tile_origin(4), (4, 4));
    }

    #[test]
    fn test_in_memory_edge_tile_is_clipped() {
        let labels = Buffer2::new(5, 3, (0..15).collect());
        let intensities = Buffer2::new(5, 3, (100..115).collect());
        let image = InMemoryImage::new(labels, intensities, 4, 2);

        let tile = image.load_tile(3).unwrap();
        assert_eq!((tile.origin_x, tile.origin_y), (4, 2));
        assert_eq!((tile.width(), tile.height()), (1, 1));
        assert_eq!(tile.labels.pixels(), &[14]);
        assert_eq!(tile.intensities.pixels(), &[114]);
    }

    #[test]
    fn test_in_memory_out_of_range() {
        let image = InMemoryImage::new(Buffer2::new_default(4, 4), Buffer2::new_default(4, 4), 2, 2);
        assert!(matches!(
            image.load_tile(4),
            Err(LoaderError::TileOutOfRange { tile: 4, count: 4 })
        ));
    }
}
