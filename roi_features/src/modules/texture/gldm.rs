use super::size_matrix::{emphasis_features, SizeMatrix};
use super::LevelGrid;
use crate::accumulator::RoiAccumulator;
use crate::gate::code::GLDM;
use crate::reduction::{FeatureModule, ReduceContext, StageInfo};
use crate::roi::Derived;

/// Grey-level dependence features. A neighbor in the 8-neighborhood depends
/// on the centre when their levels are equal; every ROI pixel contributes one
/// entry with size `1 + dependent neighbors`.
pub struct GldmModule;

const INFO: StageInfo = StageInfo::new("gldm", GLDM);

/// Positions of the GLDM features inside the shared 16-feature layout. The
/// normalized grey-level non-uniformity and the zone percentage have no
/// dependence counterpart.
const LAYOUT: [usize; 14] = [0, 1, 2, 4, 5, 7, 8, 9, 10, 11, 12, 13, 14, 15];

impl FeatureModule for GldmModule {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn compute(&self, acc: &RoiAccumulator, derived: &mut Derived, ctx: &ReduceContext<'_>) {
        let grid = LevelGrid::new(acc, ctx.config.texture.grey_levels);
        let all = emphasis_features(&dependences(&grid), grid.pixel_count);
        let features: Vec<f64> = LAYOUT.iter().map(|&k| all[k]).collect();
        derived.values.set_all(GLDM, &features);
    }
}

/// One entry per ROI pixel, keyed by level and dependence size.
pub(crate) fn dependences(grid: &LevelGrid) -> SizeMatrix {
    let mut matrix = SizeMatrix::new();
    for y in 0..grid.height() as i64 {
        for x in 0..grid.width() as i64 {
            let level = grid.level(x, y);
            if level == 0 {
                continue;
            }
            let mut size = 1;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if (dx, dy) != (0, 0) && grid.level(x + dx, y + dy) == level {
                        size += 1;
                    }
                }
            }
            matrix.add(level, size);
        }
    }
    matrix
}
