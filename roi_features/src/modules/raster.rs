use common::Buffer2;

use crate::accumulator::RoiAccumulator;
use crate::types::PixIntens;

/// ROI pixels rasterized over their bounding box plus a one-pixel empty border.
///
/// Coordinates passed in and out are image coordinates.
#[derive(Debug, Clone)]
pub struct RoiRaster {
    origin_x: i64,
    origin_y: i64,
    cells: Buffer2<Option<PixIntens>>,
}

impl RoiRaster {
    pub fn new(acc: &RoiAccumulator) -> Self {
        let aabb = acc.aabb();
        let origin_x = aabb.x_min as i64 - 1;
        let origin_y = aabb.y_min as i64 - 1;
        let mut cells = Buffer2::new_filled(
            aabb.width() as usize + 2,
            aabb.height() as usize + 2,
            None,
        );
        for p in acc.pixels() {
            let lx = (p.x as i64 - origin_x) as usize;
            let ly = (p.y as i64 - origin_y) as usize;
            cells[(lx, ly)] = Some(p.intensity);
        }
        Self {
            origin_x,
            origin_y,
            cells,
        }
    }

    #[inline]
    pub fn at(&self, x: i64, y: i64) -> Option<PixIntens> {
        self.cells
            .get_checked(x - self.origin_x, y - self.origin_y)
            .copied()
            .flatten()
    }

    #[inline]
    pub fn is_set(&self, x: i64, y: i64) -> bool {
        self.at(x, y).is_some()
    }

    /// Image coordinates of the top-left border cell.
    pub fn origin(&self) -> (i64, i64) {
        (self.origin_x, self.origin_y)
    }

    /// Width including the border.
    pub fn width(&self) -> usize {
        self.cells.width()
    }

    /// Height including the border.
    pub fn height(&self) -> usize {
        self.cells.height()
    }

    /// Border-local view; `(0, 0)` is the top-left border cell.
    pub fn cells(&self) -> &Buffer2<Option<PixIntens>> {
        &self.cells
    }
}
