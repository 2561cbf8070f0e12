//! Streaming phase: decode tiles in parallel and feed every foreground pixel
//! to the registry.

use common::parallel::try_par_sum_limited;

use crate::error::LoaderError;
use crate::loader::{Tile, TileLoader};
use crate::registry::RoiRegistry;
use crate::types::BACKGROUND;

/// Scans all tiles with at most `max_tiles_in_flight` decoded at once.
/// Returns the number of foreground observations recorded.
pub fn scan_image<L: TileLoader + ?Sized>(
    loader: &L,
    registry: &RoiRegistry,
    max_tiles_in_flight: usize,
) -> Result<u64, LoaderError> {
    let tiles: Vec<usize> = (0..loader.layout().tile_count()).collect();
    let observed = try_par_sum_limited(&tiles, max_tiles_in_flight, |&index| {
        let tile = loader.load_tile(index)?;
        Ok(scan_tile(&tile, registry))
    })?;
    tracing::debug!(
        tiles = tiles.len(),
        observations = observed,
        rois = registry.len(),
        "Image scanned"
    );
    Ok(observed)
}

fn scan_tile(tile: &Tile, registry: &RoiRegistry) -> u64 {
    let mut observed = 0;
    for y in 0..tile.height() {
        let labels = tile.labels.row(y);
        let intensities = tile.intensities.row(y);
        for (x, (&label, &intensity)) in labels.iter().zip(intensities).enumerate() {
            if label == BACKGROUND {
                continue;
            }
            let gx = (tile.origin_x + x) as u32;
            let gy = (tile.origin_y + y) as u32;
            observed += registry.observe(gx, gy, label, intensity) as u64;
        }
    }
    observed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SyntheticPlate;
    use crate::types::Aabb;

    #[test]
    fn test_scan_counts_foreground_across_tiles() {
        let mut plate = SyntheticPlate::new(20, 12);
        plate
            .randomize_intensities(7, 500)
            .paint_rect(1, 2, 2, 6, 5)
            .paint_disc(2, 14, 6, 3);
        let foreground = plate.labels.iter().filter(|&&l| l != 0).count() as u64;

        // 7x5 tiles cut both ROIs into several pieces
        let registry = RoiRegistry::new();
        let observed = scan_image(&plate.image(7, 5), &registry, 3).unwrap();

        assert_eq!(observed, foreground);
        let rois = registry.into_rois();
        assert_eq!(rois.len(), 2);
        let rect = rois.iter().find(|r| r.label() == 1).unwrap();
        assert_eq!(rect.count(), 30);
        assert_eq!(rect.aabb(), Aabb::new(2, 7, 2, 6));
        let total: usize = rois.iter().map(|r| r.count()).sum();
        assert_eq!(total as u64, foreground);
    }

    #[test]
    fn test_scan_propagates_tile_errors() {
        struct Broken;
        impl TileLoader for Broken {
            fn layout(&self) -> crate::loader::TileLayout {
                crate::loader::TileLayout {
                    image_width: 8,
                    image_height: 8,
                    tile_width: 4,
                    tile_height: 4,
                }
            }
            fn load_tile(&self, index: usize) -> Result<Tile, LoaderError> {
                Err(LoaderError::TileFetch {
                    tile: index,
                    reason: "corrupt strip".to_string(),
                })
            }
        }

        let registry = RoiRegistry::new();
        let err = scan_image(&Broken, &registry, 2).unwrap_err();
        assert!(matches!(err, LoaderError::TileFetch { .. }));
    }
}
