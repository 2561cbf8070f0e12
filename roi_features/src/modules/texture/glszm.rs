use common::Buffer2;

use super::size_matrix::{emphasis_features, SizeMatrix};
use super::LevelGrid;
use crate::accumulator::RoiAccumulator;
use crate::gate::code::GLSZM;
use crate::reduction::{FeatureModule, ReduceContext, StageInfo};
use crate::roi::Derived;

/// Grey-level size-zone features. A zone is an 8-connected set of pixels
/// sharing one level.
pub struct GlszmModule;

const INFO: StageInfo = StageInfo::new("glszm", GLSZM);

impl FeatureModule for GlszmModule {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn compute(&self, acc: &RoiAccumulator, derived: &mut Derived, ctx: &ReduceContext<'_>) {
        let grid = LevelGrid::new(acc, ctx.config.texture.grey_levels);
        let features = emphasis_features(&size_zones(&grid), grid.pixel_count);
        derived.values.set_all(GLSZM, &features);
    }
}

/// Zones keyed by level and pixel count.
pub(crate) fn size_zones(grid: &LevelGrid) -> SizeMatrix {
    let mut zones = SizeMatrix::new();
    let mut visited: Buffer2<bool> = Buffer2::new_default(grid.width(), grid.height());
    let mut stack: Vec<(i64, i64)> = Vec::new();

    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let level = grid.level(x as i64, y as i64);
            if level == 0 || visited[(x, y)] {
                continue;
            }

            visited[(x, y)] = true;
            stack.push((x as i64, y as i64));
            let mut area = 0;
            while let Some((cx, cy)) = stack.pop() {
                area += 1;
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        let (nx, ny) = (cx + dx, cy + dy);
                        // level() is 0 off-grid, so the indices below are in range
                        if grid.level(nx, ny) != level || visited[(nx as usize, ny as usize)] {
                            continue;
                        }
                        visited[(nx as usize, ny as usize)] = true;
                        stack.push((nx, ny));
                    }
                }
            }
            zones.add(level, area);
        }
    }
    zones
}
